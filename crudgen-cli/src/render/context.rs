//! Template context built from a resolved table
//!
//! Templates only see JSON. Everything that would need a registry lookup
//! (columns of related tables, primary keys of foreign tables) is resolved
//! here so the templates stay free of cross-table logic.

use crudgen::naming::Naming;
use crudgen::schema::{ColumnDefinition, ColumnLink, TemplateCategory};
use crudgen::{RelatedTable, TableDefinition, TableId, TableRegistry};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{json, Value};

/// Prefix of every generated HTTP route
pub const ROUTE_PREFIX: &str = "/api/v1";

/// One field of an add or edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub comment: String,
    pub go_field: String,
    pub go_type: String,
    pub proto_type: String,
    pub html_field: String,
    pub html_type: String,
    pub required: bool,
    pub disabled: bool,
}

impl FormField {
    fn new(base: &ColumnDefinition, html_type: &str, disabled: bool) -> Self {
        Self {
            name: base.name.clone(),
            comment: base.comment.clone(),
            go_field: base.go_field.clone(),
            go_type: base.go_type.clone(),
            proto_type: base.proto_type.clone(),
            html_field: base.html_field.clone(),
            html_type: html_type.to_string(),
            required: base.is_required,
            disabled,
        }
    }
}

/// A query filter on a virtual column, answered by a subquery on its foreign table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualQuery {
    pub name: String,
    pub go_field: String,
    pub go_type: String,
    pub query_type: crudgen::schema::document::QueryType,
    pub key_go_field: String,
    pub foreign_table: String,
    pub foreign_pk: String,
    pub value_column: String,
}

/// Joined segments, skipping empty ones
fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Package directory relative to the module root, per-table when separate
#[must_use]
pub fn package_base(table: &TableDefinition) -> String {
    if table.separate_package {
        join_segments(&[&table.package_name, &table.go_file_name])
    } else {
        table.package_name.clone()
    }
}

/// Full Go import path of the table's package directory
#[must_use]
pub fn import_base(table: &TableDefinition) -> String {
    if table.separate_package {
        join_segments(&[&table.backend_package, &table.go_file_name])
    } else {
        table.backend_package.clone()
    }
}

/// Whether the backend package is a plugin, which moves frontend files under `plugins/`
#[must_use]
pub fn is_plugin(table: &TableDefinition) -> bool {
    table.package_name.contains("plugins")
}

/// Frontend path below `src/api` and `src/views`
#[must_use]
pub fn frontend_dir(table: &TableDefinition) -> String {
    let plugins = if is_plugin(table) { "plugins" } else { "" };
    join_segments(&[plugins, &table.frontend_path])
}

/// Route group of the table's controller
#[must_use]
pub fn route_prefix(table: &TableDefinition) -> String {
    if table.frontend_path.is_empty() {
        ROUTE_PREFIX.to_string()
    } else {
        format!("{ROUTE_PREFIX}/{}", table.frontend_path.trim_matches('/'))
    }
}

fn html_field_of(table: &TableDefinition, column: &str) -> String {
    table
        .column(column)
        .map_or_else(|| Naming::case_camel_lower(column), |c| c.html_field.clone())
}

fn add_fields(table: &TableDefinition) -> Vec<FormField> {
    table
        .add_columns
        .iter()
        .filter_map(|add| {
            table
                .columns
                .get(&add.column.name)
                .map(|base| FormField::new(base, &add.column.html_type, false))
        })
        .collect()
}

fn edit_fields(table: &TableDefinition) -> Vec<FormField> {
    let mut fields = Vec::with_capacity(table.edit_columns.len() + 1);
    if let Some(pk) = table.single_pk() {
        if !table.flags.is_pk_in_edit {
            let mut field = FormField::new(pk, &pk.html_type, true);
            field.required = true;
            fields.push(field);
        }
    }
    fields.extend(table.edit_columns.iter().filter_map(|edit| {
        table
            .columns
            .get(&edit.column.name)
            .map(|base| FormField::new(base, &edit.column.html_type, edit.is_disabled))
    }));
    fields
}

/// Fields of the shared add/edit dialog: add columns, then edit-only columns
fn form_fields(table: &TableDefinition) -> Vec<FormField> {
    let mut fields: IndexMap<String, FormField> = add_fields(table)
        .into_iter()
        .map(|field| (field.name.clone(), field))
        .collect();
    for edit in &table.edit_columns {
        if let Some(existing) = fields.get_mut(&edit.column.name) {
            existing.disabled = edit.is_disabled;
        } else if let Some(base) = table.columns.get(&edit.column.name) {
            fields.insert(
                base.name.clone(),
                FormField::new(base, &edit.column.html_type, edit.is_disabled),
            );
        }
    }
    fields.into_values().collect()
}

/// Physical columns the list query selects: the key, listed columns, then join columns
fn item_columns(table: &TableDefinition) -> Vec<&ColumnDefinition> {
    let mut names: IndexSet<&str> = table.pk_columns.iter().map(String::as_str).collect();
    names.extend(
        table
            .list_columns
            .iter()
            .filter(|list| !list.column.is_virtual)
            .map(|list| list.column.name.as_str()),
    );
    names.extend(table.fk_columns_not_in_list.iter().map(String::as_str));
    names
        .into_iter()
        .filter_map(|name| table.columns.get(name))
        .collect()
}

fn related_structs(
    registry: &TableRegistry,
    edges: &IndexMap<String, RelatedTable>,
    out: &mut Vec<Value>,
) {
    for edge in edges.values() {
        let target = registry.table(edge.table);
        let ref_columns: Vec<&ColumnDefinition> = edge
            .ref_columns
            .iter()
            .filter_map(|column| target.columns.get(column))
            .collect();
        let inner: Vec<&RelatedTable> = edge.related_tables.values().collect();
        out.push(json!({
            "edge": edge,
            "refColumns": ref_columns,
            "inner": inner,
        }));
        related_structs(registry, &edge.related_tables, out);
    }
}

fn virtual_queries(registry: &TableRegistry, table: &TableDefinition) -> Vec<VirtualQuery> {
    table
        .query_columns
        .iter()
        .filter(|query| query.column.is_virtual)
        .filter_map(|query| {
            let column = table.virtual_columns.get(&query.column.name)?;
            let (foreign_table, key_column, value_column) = match &column.link {
                ColumnLink::Foreign {
                    table: foreign,
                    key_column,
                    value_column,
                }
                | ColumnLink::ForeignRelated {
                    table: foreign,
                    key_column,
                    value_column,
                    ..
                } => (foreign, key_column, value_column),
                ColumnLink::None | ColumnLink::Related { .. } => return None,
            };
            let foreign_pk = table
                .virtual_query_related
                .get(foreign_table)
                .and_then(|id| registry.table(*id).single_pk())
                .map_or_else(|| "id".to_string(), |pk| pk.name.clone());
            Some(VirtualQuery {
                name: query.column.name.clone(),
                go_field: query.column.go_field.clone(),
                go_type: query.column.go_type.clone(),
                query_type: query.query_type,
                key_go_field: go_field_of(table, key_column),
                foreign_table: foreign_table.clone(),
                foreign_pk,
                value_column: value_column.clone(),
            })
        })
        .collect()
}

fn go_field_of(table: &TableDefinition, column: &str) -> String {
    table
        .columns
        .get(column)
        .map_or_else(|| Naming::case_camel(column), |c| c.go_field.clone())
}

/// Build the JSON context every artifact template renders against
#[must_use]
pub fn table_context(registry: &TableRegistry, id: TableId) -> Value {
    let table = registry.table(id);
    let pk = table.single_pk();
    let frontend_dir = frontend_dir(table);
    let api_path = join_segments(&[&frontend_dir, &table.frontend_file_name]);

    let related: Vec<Value> = table
        .related_tables
        .values()
        .map(|edge| json!({ "edge": edge }))
        .collect();
    let mut structs = Vec::new();
    related_structs(registry, &table.related_tables, &mut structs);

    let display_fields: IndexMap<&str, &str> = table
        .all_columns()
        .map(|column| {
            let field = column
                .relation
                .as_ref()
                .map(|relation| relation.combined_html_field.as_str())
                .filter(|field| !field.is_empty())
                .unwrap_or(column.html_field.as_str());
            (column.name.as_str(), field)
        })
        .collect();
    let proto_types: IndexMap<&str, &str> = table
        .all_columns()
        .map(|column| (column.name.as_str(), column.proto_type.as_str()))
        .collect();
    let physical_queries: Vec<_> = table
        .query_columns
        .iter()
        .filter(|query| !query.column.is_virtual)
        .collect();

    json!({
        "table": table,
        "pk": pk,
        "pkField": pk.map_or_else(|| "id".to_string(), |pk| pk.html_field.clone()),
        "isTree": table.template_category == TemplateCategory::Tree,
        "treeCodeField": html_field_of(table, &table.tree_code),
        "treeParentField": html_field_of(table, &table.tree_parent_code),
        "importBase": import_base(table),
        "packageBase": package_base(table),
        "plugins": is_plugin(table),
        "routePrefix": route_prefix(table),
        "apiPath": api_path,
        "viewPath": format!("/{}", join_segments(&[&table.frontend_path, &table.route_child_path])),
        "viewComponent": join_segments(&[&api_path, "list", "index"]),
        "related": related,
        "relatedStructs": structs,
        "itemColumns": item_columns(table),
        "addFields": add_fields(table),
        "editFields": edit_fields(table),
        "formFields": form_fields(table),
        "displayFields": display_fields,
        "protoTypes": proto_types,
        "queryCount": table.query_columns.len(),
        "physicalQueries": physical_queries,
        "virtualQueries": virtual_queries(registry, table),
    })
}
