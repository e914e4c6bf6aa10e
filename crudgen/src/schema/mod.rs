//! Table definition schema
//!
//! Documents as stored on disk, the resolved column and table model built
//! from them, and the per-view projections templates iterate over.

pub mod classifier;
pub mod column;
pub mod document;
pub mod projection;
pub mod table;

pub use classifier::{SqlCategory, SqlShape};
pub use column::{CascadeLink, ColumnDefinition, ColumnLink, ResolvedRelation};
pub use document::{
    save_document, ColumnAttributes, MemorySource, TableDocument, TableSource, TemplateCategory,
    YamlDirectory,
};
pub use projection::{AddColumn, DetailColumn, EditColumn, ListColumn, QueryColumn};
pub use table::{TableDefinition, TableFlags};
