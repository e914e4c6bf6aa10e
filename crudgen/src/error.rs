//! Error types for table definition loading and resolution

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the resolution engine
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Resolution error
///
/// Every variant names the table it was raised for so that the CLI can
/// report which generation aborted.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A required attribute is missing or contradicts another attribute
    #[error("Validation error in table {table}: {message}")]
    Validation {
        /// Table being resolved
        table: String,
        /// What is wrong
        message: String,
    },

    /// A projection entry references a column that is not declared
    #[error("{view} column {column} is not declared in {scope} of table {table}")]
    MissingColumn {
        /// Projection kind (list, add, edit, query, detail)
        view: &'static str,
        /// Column referenced by the projection entry
        column: String,
        /// Table being resolved
        table: String,
        /// Which column maps were searched
        scope: &'static str,
    },

    /// A cascade column points at a parent that does not exist
    #[error("Cascade column \"{column}\" of table {table} has parentColumnName \"{parent}\" which does not exist in the table")]
    CascadeParent {
        /// Table being resolved
        table: String,
        /// Cascade column
        column: String,
        /// Declared parent column name
        parent: String,
    },

    /// Walking a cascade chain came back to a column already visited
    #[error("Cascade chain of column \"{column}\" in table {table} forms a cycle through \"{through}\"")]
    CascadeCycle {
        /// Table being resolved
        table: String,
        /// Column whose ancestors were walked
        column: String,
        /// Column seen twice
        through: String,
    },

    /// Table definition file does not exist
    #[error("Definition of table {table} not found at {}", path.display())]
    TableNotFound {
        /// Requested table
        table: String,
        /// Where it was looked up
        path: PathBuf,
    },

    /// Table definition could not be parsed or serialized
    #[error("Invalid YAML definition for table {table}: {source}")]
    Yaml {
        /// Table whose document failed
        table: String,
        /// Underlying parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// Configuration sources could not be merged
    #[error("Configuration error: {0}")]
    Config(#[source] Box<figment::Error>),

    /// Filesystem error while reading or writing a definition
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    /// Build a validation error for `table`
    pub fn validation(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Name of the table the error was raised for
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Validation { table, .. }
            | Self::MissingColumn { table, .. }
            | Self::CascadeParent { table, .. }
            | Self::CascadeCycle { table, .. }
            | Self::TableNotFound { table, .. }
            | Self::Yaml { table, .. } => Some(table),
            Self::Io { .. } | Self::Config(_) => None,
        }
    }
}
