//! YAML table definition documents
//!
//! One document per table, stored as `<dir>/<table>.yaml`:
//!
//! ```yaml
//! apiVersion: v1
//! table:
//!   name: sys_user
//!   comment: User
//!   backendPackage: app/system
//! columns:
//!   id:
//!     sqlType: int(11)
//!     isPk: true
//!     isIncrement: true
//!   dept_id:
//!     sqlType: int(11)
//!     relatedTableName: sys_dept
//!     relatedValueColumnName: dept_name
//! queryColumns:
//!   dept_id: {}
//! ```
//!
//! All maps are insertion-ordered so a document written back keeps the
//! order in which columns were declared.

use crate::error::{CodegenError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

/// Document format version written by the importer
pub const API_VERSION: &str = "v1";

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

/// Complete table definition document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDocument {
    /// Document format version
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Table-level attributes
    pub table: TableAttributes,
    /// Physical columns keyed by column name
    #[serde(default)]
    pub columns: IndexMap<String, ColumnAttributes>,
    /// Virtual columns sourced from foreign tables
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub virtual_columns: IndexMap<String, ColumnAttributes>,
    /// Columns shown in the list view
    #[serde(default)]
    pub list_columns: IndexMap<String, ListAttributes>,
    /// Columns accepted by the create form
    #[serde(default)]
    pub add_columns: IndexMap<String, AddAttributes>,
    /// Columns accepted by the edit form
    #[serde(default)]
    pub edit_columns: IndexMap<String, EditAttributes>,
    /// Columns offered as list filters
    #[serde(default)]
    pub query_columns: IndexMap<String, QueryAttributes>,
    /// Columns shown in the detail view
    #[serde(default)]
    pub detail_columns: IndexMap<String, DetailAttributes>,
}

/// Page layout generated for a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    /// Flat list with create/edit/delete
    #[default]
    Crud,
    /// Tree list keyed by `treeCode` / `treeParentCode`
    Tree,
}

/// Scalar table attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
#[serde(rename_all = "camelCase", default)]
pub struct TableAttributes {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub backend_package: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub frontend_module: String,
    pub template_category: TemplateCategory,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub business_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub function_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub function_author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tree_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tree_parent_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tree_name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub overwrite: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_column: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_type: String,
    #[serde(skip_serializing_if = "is_false")]
    pub show_detail: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_rpc: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub separate_package: bool,
    pub rpc_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Column attributes as written in `columns` and `virtualColumns`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnAttributes {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sql_type: String,
    pub sort: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub go_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub go_field: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html_field: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html_type: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_pk: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_increment: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_required: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dict_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub related_table_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub related_value_column_name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_cascade: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_column_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cascade_column_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub foreign_table_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub foreign_key_column_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub foreign_value_column_name: String,
}

/// List view overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListAttributes {
    pub sort: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html_type: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_inline_editable: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub min_width: u32,
    #[serde(skip_serializing_if = "is_false")]
    pub is_fixed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_overflow_tooltip: bool,
}

/// Create form overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddAttributes {
    pub sort: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html_type: String,
}

/// Edit form overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditAttributes {
    pub sort: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html_type: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_disabled: bool,
}

/// Comparison applied by a query column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    /// Equality
    #[default]
    #[serde(rename = "EQ")]
    Eq,
    /// Substring match
    #[serde(rename = "LIKE")]
    Like,
    /// Inclusive range taking a two-element array
    #[serde(rename = "BETWEEN")]
    Between,
}

/// Query filter overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryAttributes {
    pub sort: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
}

/// Detail view overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailAttributes {
    pub sort: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html_type: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub col_span: u32,
    #[serde(skip_serializing_if = "is_false")]
    pub is_row_start: bool,
}

impl TableDocument {
    /// Parse a document from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Yaml`] if the text is not a valid document.
    pub fn from_yaml(table: &str, text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| CodegenError::Yaml {
            table: table.to_string(),
            source,
        })
    }

    /// Serialize the document to YAML text
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|source| CodegenError::Yaml {
            table: self.table.name.clone(),
            source,
        })
    }
}

/// Where table definition documents come from
pub trait TableSource {
    /// Read the document for `table`
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::TableNotFound`] when no definition exists,
    /// or a parse error when it cannot be read.
    fn read(&self, table: &str) -> Result<TableDocument>;
}

/// Directory of `<table>.yaml` documents
#[derive(Debug, Clone)]
pub struct YamlDirectory {
    root: PathBuf,
}

impl YamlDirectory {
    /// Create a source reading from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory documents are read from
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `table`
    #[must_use]
    pub fn path_for(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.yaml"))
    }

    /// Names of every table with a document in this directory, sorted
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Io`] if the directory cannot be listed.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|source| CodegenError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CodegenError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if path.extension().is_some_and(|ext| ext == "yaml") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl TableSource for YamlDirectory {
    fn read(&self, table: &str) -> Result<TableDocument> {
        let path = self.path_for(table);
        if !path.is_file() {
            return Err(CodegenError::TableNotFound {
                table: table.to_string(),
                path,
            });
        }
        let text = fs::read_to_string(&path).map_err(|source| CodegenError::Io {
            path: path.clone(),
            source,
        })?;
        TableDocument::from_yaml(table, &text)
    }
}

/// Write `document` to `<dir>/<table>.yaml`, creating `dir` when needed
///
/// # Errors
///
/// Returns an error if the document cannot be serialized or written.
pub fn save_document(dir: &Path, document: &TableDocument) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| CodegenError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}.yaml", document.table.name));
    let text = document.to_yaml()?;
    fs::write(&path, text).map_err(|source| CodegenError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// In-memory documents keyed by table name
///
/// Used by the importer to validate synthesised documents before they are
/// written, and by tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: IndexMap<String, TableDocument>,
    reads: Cell<usize>,
}

impl MemorySource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the document for its table
    pub fn insert(&mut self, document: TableDocument) {
        self.documents
            .insert(document.table.name.clone(), document);
    }

    /// Builder form of [`MemorySource::insert`]
    #[must_use]
    pub fn with(mut self, document: TableDocument) -> Self {
        self.insert(document);
        self
    }

    /// Number of successful reads served so far
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl TableSource for MemorySource {
    fn read(&self, table: &str) -> Result<TableDocument> {
        let document = self
            .documents
            .get(table)
            .cloned()
            .ok_or_else(|| CodegenError::TableNotFound {
                table: table.to_string(),
                path: PathBuf::from(format!("{table}.yaml")),
            })?;
        self.reads.set(self.reads.get() + 1);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const USER_YAML: &str = r"
apiVersion: v1
table:
  name: sys_user
  comment: User
  backendPackage: app/system
  templateCategory: tree
  rpcPort: 0
columns:
  id:
    sqlType: int(11)
    isPk: true
    isIncrement: true
    sort: 1
  user_name:
    sqlType: varchar(64)
    sort: 2
queryColumns:
  user_name:
    queryType: LIKE
";

    #[test]
    fn test_parse_document() {
        let doc = TableDocument::from_yaml("sys_user", USER_YAML).unwrap();
        assert_eq!(doc.table.name, "sys_user");
        assert_eq!(doc.table.template_category, TemplateCategory::Tree);
        assert_eq!(doc.columns.len(), 2);
        assert!(doc.columns["id"].is_pk);
        assert_eq!(
            doc.query_columns["user_name"].query_type,
            Some(QueryType::Like)
        );
        let keys: Vec<_> = doc.columns.keys().cloned().collect();
        assert_eq!(keys, vec!["id", "user_name"]);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let doc = TableDocument::from_yaml("t", "table:\n  name: t\n").unwrap();
        assert_eq!(doc.api_version, API_VERSION);
        assert!(doc.columns.is_empty());
        assert!(doc.detail_columns.is_empty());
    }

    #[test]
    fn test_invalid_yaml_names_table() {
        let err = TableDocument::from_yaml("broken", "table: [").unwrap_err();
        assert!(matches!(err, CodegenError::Yaml { ref table, .. } if table == "broken"));
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempdir().unwrap();
        let doc = TableDocument::from_yaml("sys_user", USER_YAML).unwrap();
        let path = save_document(dir.path(), &doc).unwrap();
        assert!(path.ends_with("sys_user.yaml"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("backendPackage: app/system"));
        assert!(!text.contains("isCascade"));

        let source = YamlDirectory::new(dir.path());
        assert_eq!(source.read("sys_user").unwrap(), doc);
    }

    #[test]
    fn test_missing_file_is_table_not_found() {
        let dir = tempdir().unwrap();
        let source = YamlDirectory::new(dir.path());
        let err = source.read("nope").unwrap_err();
        assert!(matches!(err, CodegenError::TableNotFound { .. }));
    }

    #[test]
    fn test_table_names_lists_yaml_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b_table.yaml"), "table:\n  name: b_table\n").unwrap();
        fs::write(dir.path().join("a_table.yaml"), "table:\n  name: a_table\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let names = YamlDirectory::new(dir.path()).table_names().unwrap();
        assert_eq!(names, vec!["a_table", "b_table"]);
    }

    #[test]
    fn test_memory_source_counts_reads() {
        let doc = TableDocument::from_yaml("sys_user", USER_YAML).unwrap();
        let source = MemorySource::new().with(doc);
        assert_eq!(source.reads(), 0);
        source.read("sys_user").unwrap();
        assert!(source.read("missing").is_err());
        assert_eq!(source.reads(), 1);
    }
}
