//! Request handlers.
//!
//! This module contains the operations exposed over HTTP:
//! - `datasource`: register a datasource, list registered identities
//! - `query`: run a read query, render a result through a template

pub mod datasource;
pub mod query;

pub use datasource::{DataSourceHandler, RegisterInput};
pub use query::{QueryHandler, RenderOutput, TemplateInput};
