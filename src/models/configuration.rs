//! Named configuration documents.
//!
//! The `configs` table holds small named settings. The only one consulted by
//! the service today is [`ACCEPTING`], the global intake switch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the configuration document holding the intake switch.
pub const ACCEPTING: &str = "accepting";

/// Value of a configuration document.
///
/// Stored as JSON; the variant is decided by the JSON type of the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Short name of the variant, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Number(_) => "number",
            ConfigValue::String(_) => "string",
        }
    }
}

/// Represents a configuration record from the store.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "accepting",
///   "value": true
/// }
/// ```
///
/// Identity and timestamps are internal and not serialized.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Configuration {
    #[serde(skip)]
    pub id: Uuid,

    /// Unique setting name
    pub name: String,

    /// Setting value
    #[sqlx(json)]
    pub value: ConfigValue,

    #[serde(skip)]
    pub created_at: DateTime<Utc>,

    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

impl Configuration {
    pub fn new(name: impl Into<String>, value: ConfigValue, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value,
            created_at: now,
            updated_at: now,
        }
    }
}
