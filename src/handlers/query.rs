//! Query and template handlers.

use crate::db::QueryExecutor;
use crate::error::DbResult;
use crate::models::{QuerySpec, ResultDocument};
use crate::render::Template;
use serde::Deserialize;

/// Input for rendering a query result through a named template.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateInput {
    pub template: String,
    #[serde(flatten)]
    pub query: QuerySpec,
}

/// Rendered text and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub content_type: &'static str,
    pub body: String,
}

/// Handler for query execution and rendering.
pub struct QueryHandler {
    executor: QueryExecutor,
}

impl QueryHandler {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Run a read query against the datasource bound to `identity`.
    pub async fn query(&self, identity: &str, spec: &QuerySpec) -> DbResult<ResultDocument> {
        self.executor.execute(identity, spec).await
    }

    /// Run a read query and render its result.
    ///
    /// The template is resolved first so an unknown name never reaches the
    /// database.
    pub async fn render(&self, identity: &str, input: &TemplateInput) -> DbResult<RenderOutput> {
        let template = Template::from_name(&input.template)?;
        let document = self.executor.execute(identity, &input.query).await?;
        Ok(RenderOutput {
            content_type: template.content_type(),
            body: template.render(&document)?,
        })
    }
}
