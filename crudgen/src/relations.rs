//! Relational resolution
//!
//! Links cascade chains inside a table and resolves the tables a column
//! reaches through `relatedTableName` and `foreignTableName`:
//!
//! - **related**: `owner.column → related.value`
//! - **foreign**: `owner.key → foreign.value`
//! - **foreign + related**: `owner.key → foreign.value → related.value`
//!
//! Deeper chains are not supported. Every owner→target pair gets its own
//! [`RelatedTable`] edge, so a table reached from two owners carries
//! independent names and join hints for each.

use crate::error::{CodegenError, Result};
use crate::loader::Loader;
use crate::naming::Naming;
use crate::registry::{TableId, TableRegistry};
use crate::schema::column::{ColumnDefinition, ColumnLink, ResolvedRelation};
use crate::schema::table::TableDefinition;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, warn};

/// Class name prefix of a table joined as a related table
pub const RELATED_TABLE_PREFIX: &str = "Rltd";
/// JSON field prefix of a table joined as a related table
pub const RELATED_TABLE_JSON_PREFIX: &str = "rltd";

/// One owner→target relation edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTable {
    /// Target table in the registry
    #[serde(skip)]
    pub table: TableId,
    pub table_name: String,
    /// Class name of the target table itself
    pub class_name: String,
    /// `Rltd` + owner class + target class (+ inner class for three levels)
    pub class_name_when_related: String,
    /// JSON field holding the joined record
    pub json_name_when_related: String,
    /// Target class, prefixed by the foreign class for three-level edges
    pub combined_class_name: String,
    /// `orm:"with:<pk>=<join column>"`, when the target has exactly one primary key
    pub orm_with_mapping: Option<String>,
    /// Target columns the join selects
    pub ref_columns: IndexSet<String>,
    /// Edges one level deeper, from the target to its own related tables
    pub related_tables: IndexMap<String, RelatedTable>,
}

impl RelatedTable {
    fn new(id: TableId, target: &TableDefinition, owner_class: &str, combined_prefix: &str) -> Self {
        let combined_class_name = format!("{combined_prefix}{}", target.class_name);
        Self {
            table: id,
            table_name: target.name.clone(),
            class_name: target.class_name.clone(),
            class_name_when_related: format!("{RELATED_TABLE_PREFIX}{owner_class}{combined_class_name}"),
            json_name_when_related: format!(
                "{RELATED_TABLE_JSON_PREFIX}{owner_class}{combined_class_name}"
            ),
            combined_class_name,
            orm_with_mapping: None,
            ref_columns: IndexSet::new(),
            related_tables: IndexMap::new(),
        }
    }
}

/// Link every cascade column to its parent and collect descendant chains
///
/// Running this again on an already processed table yields the same
/// result.
///
/// # Errors
///
/// Returns a validation error for a cascade column without
/// `parentColumnName`, [`CodegenError::CascadeParent`] when the parent does
/// not exist and [`CodegenError::CascadeCycle`] when a chain loops.
pub fn process_cascades(table: &mut TableDefinition) -> Result<()> {
    let cascade_columns: Vec<(String, String)> = table
        .all_columns()
        .filter_map(|column| {
            column
                .cascade
                .as_ref()
                .map(|cascade| (column.name.clone(), cascade.parent_column.clone()))
        })
        .collect();

    for (column, parent) in &cascade_columns {
        if parent.is_empty() {
            return Err(CodegenError::validation(
                &table.name,
                format!("cascade column {column} does not set parentColumnName"),
            ));
        }
        let parent_is_virtual = if table.columns.contains_key(parent) {
            false
        } else if table.virtual_columns.contains_key(parent) {
            true
        } else {
            return Err(CodegenError::CascadeParent {
                table: table.name.clone(),
                column: column.clone(),
                parent: parent.clone(),
            });
        };

        if let Some(cascade) = table
            .column_mut(column)
            .and_then(|definition| definition.cascade.as_mut())
        {
            cascade.parent_is_virtual = Some(parent_is_virtual);
        }
        if let Some(parent_column) = table.column_mut(parent) {
            parent_column.is_cascade_parent = true;
            parent_column.cascade_children.clear();
        }
    }

    for (column, _) in &cascade_columns {
        let mut visited = IndexSet::from([column.clone()]);
        let mut current = column.clone();
        while let Some(parent) = table
            .column(&current)
            .and_then(ColumnDefinition::parent_column)
            .map(str::to_string)
        {
            if !visited.insert(parent.clone()) {
                return Err(CodegenError::CascadeCycle {
                    table: table.name.clone(),
                    column: column.clone(),
                    through: parent,
                });
            }
            if let Some(parent_column) = table.column_mut(&parent) {
                parent_column.cascade_children.insert(column.clone());
            }
            current = parent;
        }
    }
    Ok(())
}

/// Where an entry of `allRelatedTables` lives among the owner's edges
struct EdgePath {
    outer: String,
    inner: Option<String>,
}

/// Resolve related and foreign tables of the table stored under `id`
///
/// Targets are loaded through `loader` into the same registry, so a
/// target reached twice is read once. Tables with zero or several primary
/// keys are joined without an ORM `with` hint and a warning is logged.
///
/// # Errors
///
/// Returns the first load error of a target, or a validation error when a
/// target lacks the referenced value column.
pub fn process_related_and_foreign(
    loader: &Loader<'_>,
    registry: &mut TableRegistry,
    id: TableId,
) -> Result<()> {
    let owner = registry.table(id);
    if owner.relations_resolved {
        return Ok(());
    }
    let owner_name = owner.name.clone();
    let owner_class = owner.class_name.clone();
    let links: Vec<(String, ColumnLink)> = owner
        .all_columns()
        .filter(|column| !column.link.is_none())
        .map(|column| (column.name.clone(), column.link.clone()))
        .collect();

    let mut edges: IndexMap<String, RelatedTable> = IndexMap::new();
    let mut all_paths: IndexMap<String, EdgePath> = IndexMap::new();
    let mut fk_column_names = IndexSet::new();
    let mut resolved = Vec::with_capacity(links.len());

    for (column, link) in links {
        let relation = match link {
            ColumnLink::None => continue,
            ColumnLink::Related {
                table,
                value_column,
            } => {
                let edge = attach(
                    loader, registry, &mut edges, &owner_name, &owner_class, "", &table,
                    &value_column, &column,
                )?;
                let relation = ResolvedRelation {
                    foreign_table_class: String::new(),
                    combined_table_class: edge.class_name_when_related.clone(),
                    combined_html_table_class: edge.class_name.clone(),
                    combined_html_field: format!(
                        "{}.{}",
                        edge.json_name_when_related,
                        Naming::case_camel_lower(&value_column)
                    ),
                    related_key_columns: primary_keys(registry, edge.table),
                };
                all_paths.insert(
                    edge.combined_class_name.clone(),
                    EdgePath {
                        outer: edge.class_name_when_related.clone(),
                        inner: None,
                    },
                );
                fk_column_names.insert(column.clone());
                relation
            }
            ColumnLink::Foreign {
                table,
                key_column,
                value_column,
            } => {
                let edge = attach(
                    loader, registry, &mut edges, &owner_name, &owner_class, "", &table,
                    &value_column, &key_column,
                )?;
                let relation = ResolvedRelation {
                    foreign_table_class: edge.class_name.clone(),
                    combined_table_class: edge.class_name_when_related.clone(),
                    combined_html_table_class: edge.class_name.clone(),
                    combined_html_field: format!(
                        "{}.{}",
                        edge.json_name_when_related,
                        Naming::case_camel_lower(&value_column)
                    ),
                    related_key_columns: primary_keys(registry, edge.table),
                };
                all_paths.insert(
                    edge.combined_class_name.clone(),
                    EdgePath {
                        outer: edge.class_name_when_related.clone(),
                        inner: None,
                    },
                );
                fk_column_names.insert(key_column);
                relation
            }
            ColumnLink::ForeignRelated {
                table,
                key_column,
                value_column,
                related_table,
                related_value_column,
            } => {
                let foreign = attach(
                    loader, registry, &mut edges, &owner_name, &owner_class, "", &table,
                    &value_column, &key_column,
                )?;
                let foreign_class = foreign.class_name.clone();
                let foreign_json = foreign.json_name_when_related.clone();
                let foreign_key = foreign.class_name_when_related.clone();
                let inner = attach(
                    loader,
                    registry,
                    &mut foreign.related_tables,
                    &owner_name,
                    &owner_class,
                    &foreign_class,
                    &related_table,
                    &related_value_column,
                    &value_column,
                )?;
                let relation = ResolvedRelation {
                    foreign_table_class: foreign_class.clone(),
                    combined_table_class: inner.class_name_when_related.clone(),
                    combined_html_table_class: format!("{foreign_class}{}", inner.class_name),
                    combined_html_field: format!(
                        "{foreign_json}.{}.{}",
                        inner.json_name_when_related,
                        Naming::case_camel_lower(&related_value_column)
                    ),
                    related_key_columns: primary_keys(registry, inner.table),
                };
                all_paths.insert(
                    inner.combined_class_name.clone(),
                    EdgePath {
                        outer: foreign_key,
                        inner: Some(inner.class_name_when_related.clone()),
                    },
                );
                fk_column_names.insert(key_column);
                relation
            }
        };
        resolved.push((column, relation));
    }

    let mut has_time_column = false;
    let mut has_up_file_column = false;
    for edge in edges.values() {
        let target = registry.table(edge.table);
        has_time_column |= target.flags.has_time_column;
        has_up_file_column |= target.flags.has_up_file_column;
        for inner in edge.related_tables.values() {
            let inner_target = registry.table(inner.table);
            has_time_column |= inner_target.flags.has_time_column;
            has_up_file_column |= inner_target.flags.has_up_file_column;
        }
    }

    let all_related_tables: IndexMap<String, RelatedTable> = all_paths
        .into_iter()
        .filter_map(|(key, path)| {
            let outer = edges.get(&path.outer)?;
            let edge = match path.inner {
                Some(inner) => outer.related_tables.get(&inner)?,
                None => outer,
            };
            Some((key, edge.clone()))
        })
        .collect();

    let owner = registry.table_mut(id);
    owner.fk_columns_not_in_list = fk_column_names
        .iter()
        .filter(|name| owner.columns.contains_key(name.as_str()) && !owner.is_in_list(name))
        .cloned()
        .collect();
    for (column, relation) in resolved {
        if let Some(definition) = owner.column_mut(&column) {
            definition.relation = Some(relation);
        }
    }
    owner.flags.has_time_column |= has_time_column;
    owner.flags.has_up_file_column |= has_up_file_column;
    owner.fk_column_names = fk_column_names;
    owner.related_tables = edges;
    owner.all_related_tables = all_related_tables;
    owner.relations_resolved = true;
    debug!(
        table = %owner.name,
        related = owner.related_tables.len(),
        all_related = owner.all_related_tables.len(),
        "relations resolved"
    );
    Ok(())
}

/// Load `target` and merge its edge into `edges`
///
/// Validates the value column and records the join hint and selected
/// columns on the edge.
#[allow(clippy::too_many_arguments)]
fn attach<'e>(
    loader: &Loader<'_>,
    registry: &mut TableRegistry,
    edges: &'e mut IndexMap<String, RelatedTable>,
    owner_name: &str,
    owner_class: &str,
    combined_prefix: &str,
    target: &str,
    value_column: &str,
    join_column: &str,
) -> Result<&'e mut RelatedTable> {
    let target_id = loader.load(registry, target)?;
    let target_table = registry.table(target_id);
    if !target_table.columns.contains_key(value_column) {
        return Err(CodegenError::validation(
            owner_name,
            format!("related value column {value_column} does not exist in table {target}"),
        ));
    }

    let candidate = RelatedTable::new(target_id, target_table, owner_class, combined_prefix);
    let edge = edges
        .entry(candidate.class_name_when_related.clone())
        .or_insert(candidate);

    match target_table.single_pk() {
        Some(pk) => {
            edge.orm_with_mapping = Some(format!("orm:\"with:{}={join_column}\"", pk.name));
            edge.ref_columns.insert(pk.name.clone());
        }
        None if target_table.pk_columns.is_empty() => {
            warn!(
                table = target,
                "table has no primary key column and cannot be joined automatically"
            );
        }
        None => {
            warn!(
                table = target,
                keys = target_table.pk_columns.len(),
                "table has several primary key columns and cannot be joined automatically"
            );
        }
    }
    edge.ref_columns.insert(value_column.to_string());
    Ok(edge)
}

fn primary_keys(registry: &TableRegistry, id: TableId) -> Vec<String> {
    registry.table(id).pk_columns.iter().cloned().collect()
}
