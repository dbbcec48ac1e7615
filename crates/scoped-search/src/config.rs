//! Search declarations loaded from configuration files.
//!
//! ```yaml
//! searches:
//!   - model: post
//!     fields: [title, body, author_name]
//!   - model: post
//!     name: by_title
//!     fields: { only: [title] }
//!   - model: user
//!     fields: { except: [password_digest] }
//! ```
//!
//! `name` defaults to `search_for`; `fields` defaults to every column.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registry::SearchDeclaration;

/// A list of search declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Declarations, registered in order.
    #[serde(default)]
    pub searches: Vec<SearchDeclaration>,
}

impl SearchConfig {
    /// Parses a configuration document from YAML.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses a configuration document from JSON.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
