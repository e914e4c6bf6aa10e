//! Table definition loader
//!
//! [`Loader::load`] turns a document into a resolved [`TableDefinition`]
//! inside a [`TableRegistry`]. Loading is memoised per registry: asking for
//! the same table twice returns the same [`TableId`] without reading the
//! source again.
//!
//! # Example
//!
//! ```rust,no_run
//! use crudgen::{LoadOptions, Loader, TableRegistry, YamlDirectory};
//!
//! # fn example() -> crudgen::Result<()> {
//! let source = YamlDirectory::new("manifest/config/codegen_conf");
//! let loader = Loader::new(&source, LoadOptions::default());
//! let mut registry = TableRegistry::new();
//!
//! let id = loader.resolve(&mut registry, "sys_user")?;
//! let table = registry.table(id);
//! println!("{} has {} related tables", table.class_name, table.related_tables.len());
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::registry::{TableId, TableRegistry};
use crate::relations;
use crate::schema::document::TableSource;
use crate::schema::projection::Projections;
use crate::schema::table::TableDefinition;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Settings that influence naming derivation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Go module the generated packages belong to
    pub go_module: String,
    /// Prefixes removed from table names to form the business name
    pub remove_table_prefixes: Vec<String>,
}

/// Loads and resolves tables from a [`TableSource`]
pub struct Loader<'s> {
    source: &'s dyn TableSource,
    options: LoadOptions,
}

impl<'s> Loader<'s> {
    /// Create a loader reading from `source`
    #[must_use]
    pub fn new(source: &'s dyn TableSource, options: LoadOptions) -> Self {
        Self { source, options }
    }

    /// Load `name` into `registry`, returning the cached id when present
    ///
    /// Reads the document, derives naming, resolves every column, links
    /// cascade chains and builds the projections. Foreign tables of virtual
    /// query columns are loaded recursively once this table's slot is
    /// reserved.
    ///
    /// # Errors
    ///
    /// Returns the first lookup, parse or validation error. A table that
    /// fails is not reachable by name afterwards.
    pub fn load(&self, registry: &mut TableRegistry, name: &str) -> Result<TableId> {
        if let Some(id) = registry.lookup(name) {
            debug!(table = name, "table definition cache hit");
            return Ok(id);
        }

        let document = self.source.read(name)?;
        let mut table = TableDefinition::from_document(name, &document, &self.options)?;
        table.resolve_columns()?;
        relations::process_cascades(&mut table)?;
        let projections = Projections::build(&table, &document)?;
        let virtual_query_tables = projections.virtual_query_tables.clone();
        table.apply_projections(projections);

        let id = registry.reserve(name, table);
        debug!(table = name, id = id.index(), "table definition reserved");

        for foreign_table in virtual_query_tables {
            match self.load(registry, &foreign_table) {
                Ok(foreign_id) => {
                    registry
                        .table_mut(id)
                        .virtual_query_related
                        .insert(foreign_table, foreign_id);
                }
                Err(err) => {
                    registry.mark_failed(id);
                    return Err(err);
                }
            }
        }

        registry.mark_loaded(id);
        Ok(id)
    }

    /// Load `name` and resolve its related and foreign tables
    ///
    /// # Errors
    ///
    /// Returns any load error of the table itself or of a table reached
    /// through its relations.
    pub fn resolve(&self, registry: &mut TableRegistry, name: &str) -> Result<TableId> {
        let id = self.load(registry, name)?;
        if let Err(err) = relations::process_related_and_foreign(self, registry, id) {
            error!(table = name, error = %err, "relation resolution failed");
            return Err(err);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodegenError;
    use crate::registry::SlotState;
    use crate::schema::document::{ColumnAttributes, MemorySource, QueryAttributes, TableDocument};

    fn column(sql_type: &str) -> ColumnAttributes {
        ColumnAttributes {
            sql_type: sql_type.to_string(),
            ..ColumnAttributes::default()
        }
    }

    fn document(name: &str) -> TableDocument {
        let mut doc = TableDocument::default();
        doc.table.name = name.to_string();
        doc.columns.insert("id".to_string(), {
            let mut id = column("int(11)");
            id.is_pk = true;
            id
        });
        doc.columns.insert("name".to_string(), column("varchar(64)"));
        doc
    }

    /// `a` queries by a virtual column of `b`, and `b` by one of `a`
    fn mutual_documents() -> MemorySource {
        let mut a = document("a");
        a.columns.insert("b_id".to_string(), column("int(11)"));
        a.virtual_columns.insert("b_name".to_string(), {
            let mut virtual_column = column("varchar(64)");
            virtual_column.foreign_table_name = "b".to_string();
            virtual_column.foreign_key_column_name = "b_id".to_string();
            virtual_column.foreign_value_column_name = "name".to_string();
            virtual_column
        });
        a.query_columns.insert("b_name".to_string(), QueryAttributes::default());

        let mut b = document("b");
        b.columns.insert("a_id".to_string(), column("int(11)"));
        b.virtual_columns.insert("a_name".to_string(), {
            let mut virtual_column = column("varchar(64)");
            virtual_column.foreign_table_name = "a".to_string();
            virtual_column.foreign_key_column_name = "a_id".to_string();
            virtual_column.foreign_value_column_name = "name".to_string();
            virtual_column
        });
        b.query_columns.insert("a_name".to_string(), QueryAttributes::default());

        MemorySource::new().with(a).with(b)
    }

    #[test]
    fn test_load_is_memoised() {
        let source = MemorySource::new().with(document("a"));
        let loader = Loader::new(&source, LoadOptions::default());
        let mut registry = TableRegistry::new();

        let first = loader.load(&mut registry, "a").unwrap();
        let second = loader.load(&mut registry, "a").unwrap();
        assert_eq!(first, second);
        assert_eq!(source.reads(), 1);
        assert_eq!(registry.state(first), SlotState::Loaded);
    }

    #[test]
    fn test_mutual_virtual_queries_terminate() {
        let source = mutual_documents();
        let loader = Loader::new(&source, LoadOptions::default());
        let mut registry = TableRegistry::new();

        let a = loader.load(&mut registry, "a").unwrap();
        let b = registry.lookup("b").unwrap();
        assert_eq!(registry.table(a).virtual_query_related.get("b"), Some(&b));
        assert_eq!(registry.table(b).virtual_query_related.get("a"), Some(&a));
        assert!(registry.table(a).flags.has_virtual_queries);
        assert_eq!(source.reads(), 2);
        assert_eq!(registry.state(b), SlotState::Loaded);
    }

    #[test]
    fn test_missing_virtual_query_table_fails_parent() {
        let only_a =
            MemorySource::new().with(TableDocument::from_yaml("a", A_ONLY_YAML).unwrap());
        let loader = Loader::new(&only_a, LoadOptions::default());
        let mut registry = TableRegistry::new();

        let err = loader.load(&mut registry, "a").unwrap_err();
        assert!(matches!(err, CodegenError::TableNotFound { ref table, .. } if table == "b"));
        assert_eq!(registry.lookup("a"), None);
    }

    const A_ONLY_YAML: &str = r"
table:
  name: a
columns:
  id: { sqlType: int(11), isPk: true }
  b_id: { sqlType: int(11) }
virtualColumns:
  b_name:
    sqlType: varchar(64)
    foreignTableName: b
    foreignKeyColumnName: b_id
    foreignValueColumnName: name
queryColumns:
  b_name: {}
";
}
