use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings key of the flag that makes the database backend authoritative
pub const USE_DATABASE_KEY: &str = "useIndexedDB";

/// Small flat settings record shared by both backends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The database backend is the source of truth
    #[serde(rename = "useIndexedDB", default)]
    pub use_database: bool,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Settings {
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == USE_DATABASE_KEY {
            Some(Value::Bool(self.use_database))
        } else {
            self.extra.get(key).cloned()
        }
    }

    pub fn set(&mut self, key: &str, value: Value) {
        if key == USE_DATABASE_KEY {
            self.use_database = value.as_bool().unwrap_or(false);
        } else {
            self.extra.insert(key.to_string(), value);
        }
    }
}
