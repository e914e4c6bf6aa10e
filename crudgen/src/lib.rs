//! crudgen: schema resolution engine for the crudgen CRUD code generator
//!
//! Table definitions are YAML documents describing one MySQL table: its
//! columns, virtual columns borrowed from other tables, and per-view
//! overrides for list, add, edit, query and detail pages. This crate turns
//! such a document into a fully cross-referenced [`TableDefinition`] that
//! templates can consume without further lookups.
//!
//! Resolution happens in stages:
//!
//! 1. **Classification**: SQL types map to Go, protobuf and widget types
//! 2. **Column resolution**: identifiers and types the document left empty
//! 3. **Cascades**: parent/child chains used by tree select widgets
//! 4. **Projections**: the five view lists with query rules
//! 5. **Relations**: two- and three-level joins to other tables
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use crudgen::{LoadOptions, Loader, TableRegistry, YamlDirectory};
//!
//! # fn example() -> crudgen::Result<()> {
//! let source = YamlDirectory::new("manifest/config/codegen_conf");
//! let options = LoadOptions {
//!     go_module: "github.com/acme/shop".to_string(),
//!     remove_table_prefixes: vec!["sys_".to_string()],
//! };
//! let loader = Loader::new(&source, options);
//!
//! // One registry per generation run; tables reached twice are loaded once
//! let mut registry = TableRegistry::new();
//! let id = loader.resolve(&mut registry, "sys_user")?;
//!
//! for column in &registry.table(id).query_columns {
//!     println!("{} {:?}", column.column.name, column.field_validation);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod naming;
pub mod registry;
pub mod relations;
pub mod schema;

pub use config::CrudgenConfig;
pub use error::{CodegenError, Result};
pub use loader::{LoadOptions, Loader};
pub use naming::Naming;
pub use registry::{SlotState, TableId, TableRegistry};
pub use relations::RelatedTable;
pub use schema::document::{MemorySource, TableDocument, TableSource, YamlDirectory};
pub use schema::table::TableDefinition;
