//! Resolved table model

use super::column::ColumnDefinition;
use super::document::{TableDocument, TemplateCategory};
use super::projection::{AddColumn, DetailColumn, EditColumn, ListColumn, Projections, QueryColumn};
use crate::error::{CodegenError, Result};
use crate::loader::LoadOptions;
use crate::naming::Naming;
use crate::registry::TableId;
use crate::relations::RelatedTable;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Derived facts templates branch on
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFlags {
    /// A physical column of this table is a date or time
    pub has_time_column_in_main: bool,
    /// This table or any related table uses a date or time column
    pub has_time_column: bool,
    /// A physical column uses a checkbox widget
    pub has_checkbox_column: bool,
    /// This table or any related table uploads files
    pub has_up_file_column: bool,
    /// A query column needs a type conversion
    pub has_conversion: bool,
    /// The table has a `created_by` column
    pub has_created_by: bool,
    /// The table has an `updated_by` column
    pub has_updated_by: bool,
    /// The primary key is part of the edit form
    pub is_pk_in_edit: bool,
    /// A virtual column is offered as a query filter
    pub has_virtual_queries: bool,
}

/// One table with its columns, projections and relations
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub name: String,
    pub comment: String,
    /// Full Go import path of the backend package
    pub backend_package: String,
    /// Backend package relative to the Go module
    pub package_name: String,
    /// Protobuf package, dotted and lower-cased
    pub package_name_proto: String,
    pub frontend_module: String,
    pub frontend_path: String,
    pub frontend_file_name: String,
    pub template_category: TemplateCategory,
    pub business_name: String,
    pub function_name: String,
    pub function_author: String,
    pub class_name: String,
    pub struct_name: String,
    pub go_file_name: String,
    pub route_child_path: String,
    pub tree_code: String,
    pub tree_parent_code: String,
    pub tree_name: String,
    pub overwrite: bool,
    pub sort_column: String,
    pub sort_type: String,
    pub show_detail: bool,
    pub is_rpc: bool,
    pub separate_package: bool,
    pub rpc_port: u16,
    pub create_time: Option<String>,
    pub update_time: Option<String>,

    #[serde(flatten)]
    pub flags: TableFlags,
    pub created_at_column: Option<String>,
    pub created_by_column: Option<String>,

    /// Physical columns in display order
    pub columns: IndexMap<String, ColumnDefinition>,
    /// Virtual columns in display order
    pub virtual_columns: IndexMap<String, ColumnDefinition>,
    pub pk_columns: IndexSet<String>,

    pub list_columns: Vec<ListColumn>,
    pub add_columns: Vec<AddColumn>,
    pub edit_columns: Vec<EditColumn>,
    pub query_columns: Vec<QueryColumn>,
    pub detail_columns: Vec<DetailColumn>,

    /// Join columns of this table used by relations
    pub fk_column_names: IndexSet<String>,
    /// Join columns not already selected by the list view
    pub fk_columns_not_in_list: Vec<String>,
    /// Related and foreign tables keyed by `classNameWhenRelated`
    pub related_tables: IndexMap<String, RelatedTable>,
    /// Every related table including three-level ones, keyed by combined class name
    pub all_related_tables: IndexMap<String, RelatedTable>,
    /// Foreign tables of virtual query columns, keyed by table name
    #[serde(skip)]
    pub virtual_query_related: IndexMap<String, TableId>,
    /// Whether related and foreign tables have been resolved
    #[serde(skip)]
    pub relations_resolved: bool,
}

impl TableDefinition {
    /// Build an unresolved table from its document
    ///
    /// Derives every naming variant, builds the column maps in `sort` order,
    /// validates column links and records the audit-column facts.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a column declares an illegal link or
    /// names a foreign key column the table does not have.
    pub fn from_document(
        requested: &str,
        document: &TableDocument,
        options: &LoadOptions,
    ) -> Result<Self> {
        let attrs = &document.table;
        let name = if attrs.name.is_empty() {
            requested.to_string()
        } else {
            attrs.name.clone()
        };

        let backend_package = qualify_package(&attrs.backend_package, &options.go_module);
        let package_name = if options.go_module.is_empty() {
            backend_package.clone()
        } else {
            backend_package
                .strip_prefix(&format!("{}/", options.go_module))
                .unwrap_or(&backend_package)
                .to_string()
        };
        let business_name = if attrs.business_name.is_empty() {
            Naming::strip_table_prefix(&name, &options.remove_table_prefixes)
        } else {
            attrs.business_name.clone()
        };

        let mut columns = IndexMap::with_capacity(document.columns.len());
        for (column_name, column_attrs) in &document.columns {
            let column = ColumnDefinition::from_attributes(&name, column_name, column_attrs, false)?;
            columns.insert(column_name.clone(), column);
        }
        let mut virtual_columns = IndexMap::with_capacity(document.virtual_columns.len());
        for (column_name, column_attrs) in &document.virtual_columns {
            let column = ColumnDefinition::from_attributes(&name, column_name, column_attrs, true)?;
            virtual_columns.insert(column_name.clone(), column);
        }
        columns.sort_by(|_, a, _, b| a.sort.cmp(&b.sort));
        virtual_columns.sort_by(|_, a, _, b| a.sort.cmp(&b.sort));

        for column in columns.values().chain(virtual_columns.values()) {
            if let Some(key_column) = column.link.foreign_key_column() {
                if !columns.contains_key(key_column) {
                    return Err(CodegenError::validation(
                        &name,
                        format!(
                            "column {} uses foreignKeyColumnName {key_column} which is not a column of the table",
                            column.name
                        ),
                    ));
                }
            }
        }

        let flags = TableFlags {
            has_created_by: columns.contains_key("created_by"),
            has_updated_by: columns.contains_key("updated_by"),
            ..TableFlags::default()
        };
        let created_at_column = columns
            .contains_key("created_at")
            .then(|| "created_at".to_string());
        let created_by_column = flags.has_created_by.then(|| "created_by".to_string());

        Ok(Self {
            comment: attrs.comment.clone(),
            package_name_proto: backend_package.replace('/', ".").to_lowercase(),
            backend_package,
            package_name,
            frontend_module: attrs.frontend_module.clone(),
            frontend_path: Naming::kebab_path(&attrs.frontend_module),
            frontend_file_name: Naming::case_kebab(&business_name),
            template_category: attrs.template_category,
            function_name: attrs.function_name.clone(),
            function_author: attrs.function_author.clone(),
            class_name: Naming::case_camel(&business_name),
            struct_name: Naming::case_camel_lower(&business_name),
            go_file_name: Naming::case_snake(&business_name),
            route_child_path: Naming::case_kebab(&business_name),
            business_name,
            tree_code: attrs.tree_code.clone(),
            tree_parent_code: attrs.tree_parent_code.clone(),
            tree_name: attrs.tree_name.clone(),
            overwrite: attrs.overwrite,
            sort_column: attrs.sort_column.clone(),
            sort_type: attrs.sort_type.clone(),
            show_detail: attrs.show_detail,
            is_rpc: attrs.is_rpc,
            separate_package: attrs.separate_package,
            rpc_port: attrs.rpc_port,
            create_time: attrs.create_time.clone(),
            update_time: attrs.update_time.clone(),
            flags,
            created_at_column,
            created_by_column,
            columns,
            virtual_columns,
            pk_columns: IndexSet::new(),
            list_columns: Vec::new(),
            add_columns: Vec::new(),
            edit_columns: Vec::new(),
            query_columns: Vec::new(),
            detail_columns: Vec::new(),
            fk_column_names: IndexSet::new(),
            fk_columns_not_in_list: Vec::new(),
            related_tables: IndexMap::new(),
            all_related_tables: IndexMap::new(),
            virtual_query_related: IndexMap::new(),
            relations_resolved: false,
            name,
        })
    }

    /// Resolve every physical and virtual column and collect table flags
    ///
    /// # Errors
    ///
    /// Returns the first column resolution error.
    pub fn resolve_columns(&mut self) -> Result<()> {
        for column in self.columns.values_mut() {
            column.resolve(&self.name)?;
            if column.is_pk {
                self.pk_columns.insert(column.name.clone());
            }
            if column.is_time() {
                self.flags.has_time_column_in_main = true;
                self.flags.has_time_column = true;
            }
            if column.is_upload() {
                self.flags.has_up_file_column = true;
            }
            if column.html_type == "checkbox" {
                self.flags.has_checkbox_column = true;
            }
        }
        for column in self.virtual_columns.values_mut() {
            column.resolve(&self.name)?;
        }
        Ok(())
    }

    /// Install built projections and their derived flags
    pub fn apply_projections(&mut self, projections: Projections) {
        self.flags.is_pk_in_edit = projections.is_pk_in_edit;
        self.flags.has_conversion = projections.has_conversion;
        self.flags.has_virtual_queries = !projections.virtual_query_tables.is_empty();
        self.list_columns = projections.list;
        self.add_columns = projections.add;
        self.edit_columns = projections.edit;
        self.query_columns = projections.query;
        self.detail_columns = projections.detail;
    }

    /// Look a column up among physical columns, then virtual ones
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns
            .get(name)
            .or_else(|| self.virtual_columns.get(name))
    }

    /// Mutable form of [`TableDefinition::column`]
    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDefinition> {
        if self.columns.contains_key(name) {
            self.columns.get_mut(name)
        } else {
            self.virtual_columns.get_mut(name)
        }
    }

    /// All columns, physical first
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.values().chain(self.virtual_columns.values())
    }

    /// Whether the list view shows `column`
    #[must_use]
    pub fn is_in_list(&self, column: &str) -> bool {
        self.list_columns
            .iter()
            .any(|list_column| list_column.column.name == column)
    }

    /// The single primary key, if the table declares exactly one
    #[must_use]
    pub fn single_pk(&self) -> Option<&ColumnDefinition> {
        if self.pk_columns.len() == 1 {
            self.pk_columns
                .first()
                .and_then(|name| self.columns.get(name))
        } else {
            None
        }
    }
}

/// Trim slashes and prefix the Go module when the package is not already under it
fn qualify_package(backend_package: &str, go_module: &str) -> String {
    let trimmed = backend_package.trim_matches('/');
    if go_module.is_empty() || trimmed.starts_with(go_module) {
        trimmed.to_string()
    } else if trimmed.is_empty() {
        go_module.to_string()
    } else {
        format!("{go_module}/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::document::ColumnAttributes;

    fn options() -> LoadOptions {
        LoadOptions {
            go_module: "github.com/acme/shop".to_string(),
            remove_table_prefixes: vec!["t_".to_string()],
        }
    }

    fn column(sql_type: &str, sort: i32) -> ColumnAttributes {
        ColumnAttributes {
            sql_type: sql_type.to_string(),
            sort,
            ..ColumnAttributes::default()
        }
    }

    fn document(name: &str) -> TableDocument {
        let mut doc = TableDocument::default();
        doc.table.name = name.to_string();
        doc.table.backend_package = "/app/shop/".to_string();
        doc.table.frontend_module = "shop/orderCenter".to_string();
        doc
    }

    #[test]
    fn test_naming_variants() {
        let table = TableDefinition::from_document("t_order_item", &document("t_order_item"), &options())
            .unwrap();
        assert_eq!(table.backend_package, "github.com/acme/shop/app/shop");
        assert_eq!(table.package_name, "app/shop");
        assert_eq!(table.package_name_proto, "github.com.acme.shop.app.shop");
        assert_eq!(table.business_name, "order_item");
        assert_eq!(table.class_name, "OrderItem");
        assert_eq!(table.struct_name, "orderItem");
        assert_eq!(table.go_file_name, "order_item");
        assert_eq!(table.route_child_path, "order-item");
        assert_eq!(table.frontend_file_name, "order-item");
        assert_eq!(table.frontend_path, "shop/order-center");
    }

    #[test]
    fn test_qualified_package_kept() {
        let mut doc = document("order");
        doc.table.backend_package = "github.com/acme/shop/app/order".to_string();
        let table = TableDefinition::from_document("order", &doc, &options()).unwrap();
        assert_eq!(table.backend_package, "github.com/acme/shop/app/order");
        assert_eq!(table.package_name, "app/order");
    }

    #[test]
    fn test_explicit_business_name_wins() {
        let mut doc = document("t_order");
        doc.table.business_name = "purchase".to_string();
        let table = TableDefinition::from_document("t_order", &doc, &options()).unwrap();
        assert_eq!(table.class_name, "Purchase");
    }

    #[test]
    fn test_columns_sorted_and_flags() {
        let mut doc = document("post");
        doc.columns.insert("title".to_string(), column("varchar(64)", 2));
        doc.columns.insert("id".to_string(), {
            let mut id = column("int(11)", 1);
            id.is_pk = true;
            id
        });
        doc.columns.insert("created_at".to_string(), column("datetime", 3));
        doc.columns.insert("created_by".to_string(), column("int(11)", 4));
        doc.columns.insert("cover".to_string(), {
            let mut cover = column("varchar(255)", 5);
            cover.html_type = "images".to_string();
            cover
        });

        let mut table = TableDefinition::from_document("post", &doc, &options()).unwrap();
        table.resolve_columns().unwrap();

        let order: Vec<_> = table.columns.keys().cloned().collect();
        assert_eq!(order, vec!["id", "title", "created_at", "created_by", "cover"]);
        assert_eq!(table.single_pk().map(|pk| pk.name.as_str()), Some("id"));
        assert!(table.flags.has_time_column_in_main);
        assert!(table.flags.has_time_column);
        assert!(table.flags.has_up_file_column);
        assert!(table.flags.has_created_by);
        assert!(!table.flags.has_updated_by);
        assert_eq!(table.created_at_column.as_deref(), Some("created_at"));
    }

    #[test]
    fn test_foreign_key_column_must_exist() {
        let mut doc = document("order");
        doc.virtual_columns.insert("customer_name".to_string(), {
            let mut virtual_column = column("varchar(64)", 1);
            virtual_column.foreign_table_name = "customer".to_string();
            virtual_column.foreign_key_column_name = "customer_id".to_string();
            virtual_column.foreign_value_column_name = "name".to_string();
            virtual_column
        });
        let err = TableDefinition::from_document("order", &doc, &options()).unwrap_err();
        assert!(err.to_string().contains("customer_id"));
    }
}
