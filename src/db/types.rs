//! Driver-agnostic type mappings.
//!
//! This module maps driver type names onto a small set of logical categories and
//! derives the portable column facts (type code, value class, display size,
//! precision, scale) the projector reports.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Driver-specific decoders handle the actual value extraction
//!
//! SQLite is dynamically typed, so its decoder ignores the declared type and
//! follows the storage class of each value instead.

use crate::models::DriverKind;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};
use std::any::type_name;

// =============================================================================
// Type Classification
// =============================================================================

/// Portable SQL type codes, numbered as in `java.sql.Types`.
pub mod type_codes {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const BIGINT: i32 = -5;
    pub const LONGVARBINARY: i32 = -4;
    pub const VARBINARY: i32 = -3;
    pub const BINARY: i32 = -2;
    pub const LONGVARCHAR: i32 = -1;
    pub const NULL: i32 = 0;
    pub const CHAR: i32 = 1;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const INTEGER: i32 = 4;
    pub const SMALLINT: i32 = 5;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const VARCHAR: i32 = 12;
    pub const BOOLEAN: i32 = 16;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const OTHER: i32 = 1111;
    pub const ARRAY: i32 = 2003;
    pub const BLOB: i32 = 2004;
    pub const TIME_WITH_TIMEZONE: i32 = 2013;
    pub const TIMESTAMP_WITH_TIMEZONE: i32 = 2014;
}

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Array,
    Null,
}

/// Lower-case type name without length/precision arguments or `UNSIGNED`.
fn base_type_name(type_name: &str) -> String {
    let lower = type_name.trim().to_ascii_lowercase();
    let without_args = match lower.find('(') {
        Some(idx) => &lower[..idx],
        None => lower.as_str(),
    };
    without_args.trim_end_matches(" unsigned").trim().to_string()
}

impl TypeCategory {
    /// Classify a driver type name into a logical category.
    pub fn of(type_name: &str, driver: DriverKind) -> Self {
        if type_name.ends_with("[]") || type_name.starts_with('_') {
            return Self::Array;
        }

        match base_type_name(type_name).as_str() {
            "bool" | "boolean" => Self::Boolean,
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "int2"
            | "int4" | "int8" | "serial" | "bigserial" | "smallserial" | "year" => Self::Integer,
            "real" | "float" | "float4" | "float8" | "double" | "double precision" => Self::Float,
            // SQLite's NUMERIC affinity stores floats
            "numeric" if driver == DriverKind::SQLite => Self::Float,
            "decimal" | "numeric" | "money" => Self::Decimal,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::Timestamp,
            // MySQL TIMESTAMP is stored in UTC
            "timestamp" if driver == DriverKind::MySQL => Self::TimestampTz,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::TimestampTz,
            "json" | "jsonb" => Self::Json,
            "uuid" => Self::Uuid,
            "bytea" | "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary"
            | "varbinary" => Self::Binary,
            "null" => Self::Null,
            _ => Self::Text,
        }
    }
}

/// Portable column facts derived from a driver type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeProfile {
    pub type_code: i32,
    /// Fully qualified name of the Rust type values decode into.
    pub class_name: &'static str,
    pub display_size: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
}

impl TypeProfile {
    fn new(type_code: i32, class_name: &'static str) -> Self {
        Self {
            type_code,
            class_name,
            display_size: None,
            precision: None,
            scale: None,
        }
    }

    fn sized(mut self, display_size: i32, precision: i32, scale: i32) -> Self {
        self.display_size = Some(display_size);
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

/// Derive the portable column facts for a driver type name.
pub fn type_profile(type_name: &str, driver: DriverKind) -> TypeProfile {
    let base = base_type_name(type_name);
    let unsigned = type_name.to_ascii_lowercase().contains("unsigned");

    match TypeCategory::of(type_name, driver) {
        TypeCategory::Integer => match base.as_str() {
            "tinyint" => TypeProfile::new(type_codes::TINYINT, type_name_of::<i64>()).sized(4, 3, 0),
            "smallint" | "int2" | "smallserial" | "year" => {
                TypeProfile::new(type_codes::SMALLINT, type_name_of::<i64>()).sized(6, 5, 0)
            }
            "bigint" | "int8" | "bigserial" if unsigned => {
                TypeProfile::new(type_codes::BIGINT, type_name_of::<u64>()).sized(20, 20, 0)
            }
            "bigint" | "int8" | "bigserial" => {
                TypeProfile::new(type_codes::BIGINT, type_name_of::<i64>()).sized(20, 19, 0)
            }
            // SQLite integers are always 64-bit
            _ if driver == DriverKind::SQLite => {
                TypeProfile::new(type_codes::BIGINT, type_name_of::<i64>()).sized(20, 19, 0)
            }
            _ => TypeProfile::new(type_codes::INTEGER, type_name_of::<i64>()).sized(11, 10, 0),
        },
        TypeCategory::Float => match base.as_str() {
            "real" | "float" | "float4" => {
                let mut profile = TypeProfile::new(type_codes::REAL, type_name_of::<f64>());
                profile.display_size = Some(15);
                profile.precision = Some(8);
                profile
            }
            _ => {
                let mut profile = TypeProfile::new(type_codes::DOUBLE, type_name_of::<f64>());
                profile.display_size = Some(25);
                profile.precision = Some(17);
                profile
            }
        },
        TypeCategory::Decimal => {
            let code = if base == "decimal" {
                type_codes::DECIMAL
            } else {
                type_codes::NUMERIC
            };
            TypeProfile::new(code, type_name_of::<String>())
        }
        TypeCategory::Boolean => {
            TypeProfile::new(type_codes::BOOLEAN, type_name_of::<bool>()).sized(1, 1, 0)
        }
        TypeCategory::Text => {
            let code = match base.as_str() {
                "char" | "bpchar" | "character" => type_codes::CHAR,
                "text" | "tinytext" | "mediumtext" | "longtext" => type_codes::LONGVARCHAR,
                "bit" => type_codes::BIT,
                _ => type_codes::VARCHAR,
            };
            TypeProfile::new(code, type_name_of::<String>())
        }
        TypeCategory::Binary => {
            let code = match base.as_str() {
                "binary" => type_codes::BINARY,
                "varbinary" => type_codes::VARBINARY,
                "bytea" => type_codes::LONGVARBINARY,
                _ => type_codes::BLOB,
            };
            TypeProfile::new(code, type_name_of::<Vec<u8>>())
        }
        TypeCategory::Json => TypeProfile::new(type_codes::OTHER, type_name_of::<JsonValue>()),
        TypeCategory::Uuid => {
            let mut profile = TypeProfile::new(type_codes::OTHER, type_name_of::<uuid::Uuid>());
            profile.display_size = Some(36);
            profile
        }
        TypeCategory::Date => {
            TypeProfile::new(type_codes::DATE, type_name_of::<chrono::NaiveDate>()).sized(10, 10, 0)
        }
        TypeCategory::Time => {
            TypeProfile::new(type_codes::TIME, type_name_of::<chrono::NaiveTime>()).sized(15, 15, 6)
        }
        TypeCategory::Timestamp => TypeProfile::new(
            type_codes::TIMESTAMP,
            type_name_of::<chrono::NaiveDateTime>(),
        )
        .sized(26, 26, 6),
        TypeCategory::TimestampTz => TypeProfile::new(
            type_codes::TIMESTAMP_WITH_TIMEZONE,
            type_name_of::<chrono::DateTime<chrono::Utc>>(),
        )
        .sized(32, 32, 6),
        TypeCategory::Array => {
            TypeProfile::new(type_codes::ARRAY, type_name_of::<Vec<JsonValue>>())
        }
        TypeCategory::Null => TypeProfile::new(type_codes::NULL, type_name_of::<JsonValue>()),
    }
}

fn type_name_of<T: ?Sized>() -> &'static str {
    type_name::<T>()
}

/// Module prefixes of the standard library, stripped from value class names.
const BASE_LIBRARY_PREFIXES: &[&str] = &["alloc::", "core::", "std::"];

/// Strip the standard-library module path from a type name.
///
/// `alloc::string::String` becomes `String`, `alloc::vec::Vec<u8>` becomes
/// `Vec<u8>`. Names outside the standard library are returned unchanged.
pub fn normalize_class_name(class_name: &str) -> String {
    if !BASE_LIBRARY_PREFIXES
        .iter()
        .any(|prefix| class_name.starts_with(prefix))
    {
        return class_name.to_string();
    }

    let (path, generics) = match class_name.find('<') {
        Some(idx) => class_name.split_at(idx),
        None => (class_name, ""),
    };
    let short = path.rsplit("::").next().unwrap_or(path);
    format!("{}{}", short, generics)
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal") || name == "money"
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Shared Value Helpers
// =============================================================================

/// Encode binary data as base64, the only lossless JSON representation.
pub fn encode_binary(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    JsonValue::String(STANDARD.encode(bytes))
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

/// ISO-8601 without offset, e.g. `2024-01-31T08:30:00`.
fn iso_naive(v: chrono::NaiveDateTime) -> String {
    v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// RFC 3339 in UTC, e.g. `2024-01-31T08:30:00+00:00`.
fn iso_utc(v: chrono::DateTime<chrono::Utc>) -> String {
    v.to_rfc3339()
}

fn optional<T>(value: Option<T>, map: impl FnOnce(T) -> JsonValue) -> JsonValue {
    value.map(map).unwrap_or(JsonValue::Null)
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Decode a driver row into JSON values in column order.
pub trait DecodeRow {
    fn decode_values(&self) -> Vec<JsonValue>;
}

impl DecodeRow for MySqlRow {
    fn decode_values(&self) -> Vec<JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = TypeCategory::of(type_name, DriverKind::MySQL);
                mysql::decode_column(self, idx, type_name, category)
            })
            .collect()
    }
}

impl DecodeRow for PgRow {
    fn decode_values(&self) -> Vec<JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = TypeCategory::of(col.type_info().name(), DriverKind::PostgreSQL);
                postgres::decode_column(self, idx, category)
            })
            .collect()
    }
}

impl DecodeRow for SqliteRow {
    fn decode_values(&self) -> Vec<JsonValue> {
        (0..self.len())
            .map(|idx| sqlite::decode_column(self, idx))
            .collect()
    }
}

// =============================================================================
// Driver-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    pub fn decode_column(
        row: &MySqlRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        if matches!(row.try_get_raw(idx), Ok(raw) if raw.is_null()) {
            return JsonValue::Null;
        }
        match category {
            TypeCategory::Decimal => decode_decimal(row, idx),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => decode_binary(row, idx),
            TypeCategory::Json => decode_json(row, idx),
            TypeCategory::Date => decode_as(row, idx, |v: NaiveDate| v.to_string()),
            TypeCategory::Time => decode_as(row, idx, |v: NaiveTime| v.to_string()),
            TypeCategory::Timestamp => decode_as(row, idx, iso_naive),
            TypeCategory::TimestampTz => decode_as(row, idx, iso_utc),
            _ => decode_text(row, idx, type_name),
        }
    }

    fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
        match row.try_get::<RawDecimal, _>(idx) {
            Ok(v) => JsonValue::String(v.0),
            Err(e) => {
                tracing::error!("Failed to decode DECIMAL: {:?}", e);
                JsonValue::Null
            }
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
        // Signed first, then unsigned
        if let Ok(v) = row.try_get::<i8, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<i16, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<i32, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<u8, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<u16, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<u32, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<u64, _>(idx) {
            return JsonValue::from(v);
        }
        JsonValue::Null
    }

    fn decode_boolean(row: &MySqlRow, idx: usize) -> JsonValue {
        optional(row.try_get::<bool, _>(idx).ok(), JsonValue::Bool)
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<f64, _>(idx) {
            return float_value(v);
        }
        optional(row.try_get::<f32, _>(idx).ok(), |v| float_value(v as f64))
    }

    fn decode_binary(row: &MySqlRow, idx: usize) -> JsonValue {
        optional(row.try_get::<Vec<u8>, _>(idx).ok(), |v| encode_binary(&v))
    }

    fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<JsonValue, _>(idx).unwrap_or(JsonValue::Null)
    }

    fn decode_as<T>(row: &MySqlRow, idx: usize, render: impl FnOnce(T) -> String) -> JsonValue
    where
        T: for<'r> Decode<'r, sqlx::MySql> + Type<sqlx::MySql>,
    {
        match row.try_get::<T, _>(idx) {
            Ok(v) => JsonValue::String(render(v)),
            Err(_) => decode_text(row, idx, ""),
        }
    }

    fn decode_text(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
        // Text-protocol results decode as strings even when the type check fails
        let text = row
            .try_get::<String, _>(idx)
            .or_else(|_| row.try_get_unchecked::<String, _>(idx));
        match text {
            Ok(v) if type_name.eq_ignore_ascii_case("json") => {
                serde_json::from_str(&v).unwrap_or(JsonValue::String(v))
            }
            Ok(v) => JsonValue::String(v),
            Err(_) => JsonValue::Null,
        }
    }
}

mod postgres {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    pub fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
        if matches!(row.try_get_raw(idx), Ok(raw) if raw.is_null()) {
            return JsonValue::Null;
        }
        match category {
            TypeCategory::Decimal => decode_decimal(row, idx),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => decode_binary(row, idx),
            TypeCategory::Json => decode_json(row, idx),
            TypeCategory::Uuid => decode_as(row, idx, |v: uuid::Uuid| v.to_string()),
            TypeCategory::Date => decode_as(row, idx, |v: NaiveDate| v.to_string()),
            TypeCategory::Time => decode_as(row, idx, |v: NaiveTime| v.to_string()),
            TypeCategory::Timestamp => decode_as(row, idx, iso_naive),
            TypeCategory::TimestampTz => decode_as(row, idx, iso_utc),
            TypeCategory::Array => decode_array(row, idx),
            _ => decode_text(row, idx),
        }
    }

    fn decode_decimal(row: &PgRow, idx: usize) -> JsonValue {
        match row.try_get::<RawDecimal, _>(idx) {
            Ok(v) => JsonValue::String(v.0),
            Err(_) => decode_text(row, idx),
        }
    }

    fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<i16, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<i32, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return JsonValue::from(v);
        }
        JsonValue::Null
    }

    fn decode_boolean(row: &PgRow, idx: usize) -> JsonValue {
        optional(row.try_get::<bool, _>(idx).ok(), JsonValue::Bool)
    }

    fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<f64, _>(idx) {
            return float_value(v);
        }
        optional(row.try_get::<f32, _>(idx).ok(), |v| float_value(v as f64))
    }

    fn decode_binary(row: &PgRow, idx: usize) -> JsonValue {
        optional(row.try_get::<Vec<u8>, _>(idx).ok(), |v| encode_binary(&v))
    }

    fn decode_json(row: &PgRow, idx: usize) -> JsonValue {
        row.try_get::<JsonValue, _>(idx).unwrap_or(JsonValue::Null)
    }

    fn decode_as<T>(row: &PgRow, idx: usize, render: impl FnOnce(T) -> String) -> JsonValue
    where
        T: for<'r> Decode<'r, sqlx::Postgres> + Type<sqlx::Postgres>,
    {
        match row.try_get::<T, _>(idx) {
            Ok(v) => JsonValue::String(render(v)),
            Err(_) => decode_text(row, idx),
        }
    }

    fn decode_array(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<Vec<i64>, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<Vec<i32>, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<Vec<i16>, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<Vec<f64>, _>(idx) {
            return JsonValue::Array(v.into_iter().map(float_value).collect());
        }
        if let Ok(v) = row.try_get::<Vec<bool>, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<Vec<String>, _>(idx) {
            return JsonValue::from(v);
        }
        decode_text(row, idx)
    }

    fn decode_text(row: &PgRow, idx: usize) -> JsonValue {
        // Simple-protocol results arrive in text format for every type
        row.try_get::<String, _>(idx)
            .or_else(|_| row.try_get_unchecked::<String, _>(idx))
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null)
    }
}

mod sqlite {
    use super::*;

    /// Decode by storage class; the declared column type is only advisory.
    pub fn decode_column(row: &SqliteRow, idx: usize) -> JsonValue {
        let storage = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return JsonValue::Null,
            Ok(raw) => raw.type_info().name().to_ascii_uppercase(),
            Err(_) => return JsonValue::Null,
        };

        match storage.as_str() {
            "INTEGER" => optional(row.try_get::<i64, _>(idx).ok(), JsonValue::from),
            "REAL" => optional(row.try_get::<f64, _>(idx).ok(), float_value),
            "TEXT" => optional(row.try_get::<String, _>(idx).ok(), JsonValue::String),
            "BLOB" => optional(row.try_get::<Vec<u8>, _>(idx).ok(), |v| encode_binary(&v)),
            _ => decode_any(row, idx),
        }
    }

    fn decode_any(row: &SqliteRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return JsonValue::from(v);
        }
        if let Ok(v) = row.try_get::<f64, _>(idx) {
            return float_value(v);
        }
        if let Ok(v) = row.try_get::<String, _>(idx) {
            return JsonValue::String(v);
        }
        optional(row.try_get::<Vec<u8>, _>(idx).ok(), |v| encode_binary(&v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_integer() {
        assert_eq!(
            TypeCategory::of("INT", DriverKind::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            TypeCategory::of("BIGINT UNSIGNED", DriverKind::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            TypeCategory::of("INT8", DriverKind::PostgreSQL),
            TypeCategory::Integer
        );
        assert_eq!(
            TypeCategory::of("INTEGER", DriverKind::SQLite),
            TypeCategory::Integer
        );
    }

    #[test]
    fn test_categorize_does_not_match_substrings() {
        // "interval" and "point" contain "int" but are not integers
        assert_eq!(
            TypeCategory::of("INTERVAL", DriverKind::PostgreSQL),
            TypeCategory::Text
        );
        assert_eq!(
            TypeCategory::of("POINT", DriverKind::PostgreSQL),
            TypeCategory::Text
        );
    }

    #[test]
    fn test_categorize_decimal() {
        assert_eq!(
            TypeCategory::of("DECIMAL(10,2)", DriverKind::MySQL),
            TypeCategory::Decimal
        );
        assert_eq!(
            TypeCategory::of("NUMERIC", DriverKind::PostgreSQL),
            TypeCategory::Decimal
        );
        // SQLite NUMERIC is a float
        assert_eq!(
            TypeCategory::of("numeric", DriverKind::SQLite),
            TypeCategory::Float
        );
    }

    #[test]
    fn test_categorize_temporal() {
        assert_eq!(
            TypeCategory::of("TIMESTAMP", DriverKind::MySQL),
            TypeCategory::TimestampTz
        );
        assert_eq!(
            TypeCategory::of("TIMESTAMP", DriverKind::PostgreSQL),
            TypeCategory::Timestamp
        );
        assert_eq!(
            TypeCategory::of("TIMESTAMPTZ", DriverKind::PostgreSQL),
            TypeCategory::TimestampTz
        );
        assert_eq!(
            TypeCategory::of("DATETIME", DriverKind::MySQL),
            TypeCategory::Timestamp
        );
    }

    #[test]
    fn test_categorize_array_and_json() {
        assert_eq!(
            TypeCategory::of("INT4[]", DriverKind::PostgreSQL),
            TypeCategory::Array
        );
        assert_eq!(
            TypeCategory::of("jsonb", DriverKind::PostgreSQL),
            TypeCategory::Json
        );
    }

    #[test]
    fn test_type_profile_codes() {
        assert_eq!(
            type_profile("INT4", DriverKind::PostgreSQL).type_code,
            type_codes::INTEGER
        );
        assert_eq!(
            type_profile("INTEGER", DriverKind::SQLite).type_code,
            type_codes::BIGINT
        );
        assert_eq!(
            type_profile("VARCHAR", DriverKind::MySQL).type_code,
            type_codes::VARCHAR
        );
        assert_eq!(
            type_profile("TEXT", DriverKind::SQLite).type_code,
            type_codes::LONGVARCHAR
        );
        assert_eq!(
            type_profile("BOOL", DriverKind::PostgreSQL).type_code,
            type_codes::BOOLEAN
        );
        assert_eq!(
            type_profile("NULL", DriverKind::SQLite).type_code,
            type_codes::NULL
        );
    }

    #[test]
    fn test_type_profile_sizes() {
        let bigint = type_profile("BIGINT", DriverKind::MySQL);
        assert_eq!(bigint.display_size, Some(20));
        assert_eq!(bigint.precision, Some(19));
        assert_eq!(bigint.scale, Some(0));

        let text = type_profile("TEXT", DriverKind::PostgreSQL);
        assert_eq!(text.display_size, None);
        assert_eq!(text.scale, None);
    }

    #[test]
    fn test_type_profile_unsigned_bigint_class() {
        let profile = type_profile("BIGINT UNSIGNED", DriverKind::MySQL);
        assert_eq!(profile.class_name, "u64");
    }

    #[test]
    fn test_normalize_class_name() {
        assert_eq!(normalize_class_name("alloc::string::String"), "String");
        assert_eq!(normalize_class_name("alloc::vec::Vec<u8>"), "Vec<u8>");
        assert_eq!(normalize_class_name("i64"), "i64");
        assert_eq!(
            normalize_class_name("chrono::naive::date::NaiveDate"),
            "chrono::naive::date::NaiveDate"
        );
    }

    #[test]
    fn test_encode_binary() {
        assert_eq!(
            encode_binary(b"hello world"),
            JsonValue::String("aGVsbG8gd29ybGQ=".to_string())
        );
        assert_eq!(
            encode_binary(&[0xFF, 0xFE, 0x00, 0x01]),
            JsonValue::String("//4AAQ==".to_string())
        );
    }

    #[test]
    fn test_iso_timestamps() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(iso_naive(ts), "2024-01-31T08:30:00");
        assert_eq!(iso_utc(ts.and_utc()), "2024-01-31T08:30:00+00:00");
    }

    #[test]
    fn test_float_value_non_finite() {
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
        assert_eq!(float_value(f64::NAN), JsonValue::String("NaN".to_string()));
    }
}
