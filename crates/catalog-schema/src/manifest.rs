//! Declarative description of expected tables and listing resources.
//!
//! ```json
//! {
//!   "tables": [
//!     { "name": "users", "columns": [{ "name": "avatar_url", "type": "text" }] }
//!   ],
//!   "resources": {
//!     "stores": { "table": "stores", "fields": [{ "param": "system" }] }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use catalog_query::FilterSpec;
use serde::{Deserialize, Serialize};

use crate::column::TableSpec;
use crate::error::{Result, SchemaError};
use crate::reconcile::validate;

/// Expected tables plus the filter specs of listing resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Tables to reconcile, in declared order.
    #[serde(default)]
    pub tables: Vec<TableSpec>,
    /// Listing resources by name.
    #[serde(default)]
    pub resources: BTreeMap<String, FilterSpec>,
}

impl Manifest {
    /// Parses and validates a manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a declaration is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads, parses and validates a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`Manifest::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks every table declaration and rejects duplicate tables.
    ///
    /// Resource specs are already validated while deserializing.
    ///
    /// # Errors
    ///
    /// Returns the first invalid table declaration or duplicated table name.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            validate(&table.name, &table.columns)?;
            if !seen.insert(table.name.to_ascii_lowercase()) {
                return Err(SchemaError::DuplicateTable(table.name.clone()));
            }
        }
        Ok(())
    }

    /// Gets a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Gets a listing resource by name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&FilterSpec> {
        self.resources.get(name)
    }
}
