//! View projections
//!
//! Each view (list, add, edit, query, detail) selects a subset of columns
//! and may override the widget. Add and edit forms only accept physical
//! columns; the other views may also show virtual ones.

use super::column::ColumnDefinition;
use super::document::{QueryType, TableDocument};
use super::table::TableDefinition;
use crate::error::{CodegenError, Result};
use crate::naming::Naming;
use indexmap::IndexSet;
use serde::Serialize;

const INTEGER_RULE: &str = "integer";
const FLOAT_RULE: &str = "float";
const DATE_RULE: &str = "date";
const DATETIME_RULE: &str = "date-format:Y-m-d H:i:s";

/// Attributes every projection entry copies from its base column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedColumn {
    pub name: String,
    pub sort: i32,
    pub comment: String,
    pub go_type: String,
    pub go_field: String,
    pub html_field: String,
    pub html_type: String,
    pub is_virtual: bool,
}

impl ProjectedColumn {
    fn from_base(base: &ColumnDefinition, sort: i32, html_type: &str) -> Self {
        Self {
            name: base.name.clone(),
            sort,
            comment: base.comment.clone(),
            go_type: base.go_type.clone(),
            go_field: base.go_field.clone(),
            html_field: base.html_field.clone(),
            html_type: if html_type.is_empty() {
                base.html_type.clone()
            } else {
                html_type.to_string()
            },
            is_virtual: base.is_virtual,
        }
    }
}

/// List view column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListColumn {
    #[serde(flatten)]
    pub column: ProjectedColumn,
    pub is_inline_editable: bool,
    pub min_width: u32,
    pub is_fixed: bool,
    pub is_overflow_tooltip: bool,
}

/// Create form column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddColumn {
    #[serde(flatten)]
    pub column: ProjectedColumn,
}

/// Edit form column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditColumn {
    #[serde(flatten)]
    pub column: ProjectedColumn,
    /// Always set for the primary key
    pub is_disabled: bool,
}

/// Query filter column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryColumn {
    #[serde(flatten)]
    pub column: ProjectedColumn,
    pub query_type: QueryType,
    /// Request validation rule, `field@rule#message`
    pub field_validation: Option<String>,
    /// Conversion function applied to the request value
    pub field_conversion: Option<String>,
}

/// Detail view column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailColumn {
    #[serde(flatten)]
    pub column: ProjectedColumn,
    pub col_span: u32,
    pub is_row_start: bool,
}

/// All five projections of a table plus the facts derived while building them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projections {
    pub list: Vec<ListColumn>,
    pub add: Vec<AddColumn>,
    pub edit: Vec<EditColumn>,
    pub query: Vec<QueryColumn>,
    pub detail: Vec<DetailColumn>,
    pub is_pk_in_edit: bool,
    pub has_conversion: bool,
    /// Foreign tables of virtual query columns, in declaration order
    pub virtual_query_tables: IndexSet<String>,
}

impl Projections {
    /// Build every projection of `table` from the document's view maps
    ///
    /// `table` must already have resolved columns.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::MissingColumn`] naming the view, column and
    /// table when an entry references an undeclared column.
    pub fn build(table: &TableDefinition, document: &TableDocument) -> Result<Self> {
        let mut projections = Self::default();

        for (name, attrs) in &document.add_columns {
            let base = physical(table, "add", name)?;
            projections.add.push(AddColumn {
                column: ProjectedColumn::from_base(base, attrs.sort, &attrs.html_type),
            });
        }

        for (name, attrs) in &document.edit_columns {
            let base = physical(table, "edit", name)?;
            projections.is_pk_in_edit |= base.is_pk;
            projections.edit.push(EditColumn {
                column: ProjectedColumn::from_base(base, attrs.sort, &attrs.html_type),
                is_disabled: attrs.is_disabled || base.is_pk,
            });
        }

        for (name, attrs) in &document.list_columns {
            let base = any_column(table, "list", name)?;
            projections.list.push(ListColumn {
                column: ProjectedColumn::from_base(base, attrs.sort, &attrs.html_type),
                is_inline_editable: attrs.is_inline_editable,
                min_width: attrs.min_width,
                is_fixed: attrs.is_fixed,
                is_overflow_tooltip: attrs.is_overflow_tooltip,
            });
        }

        for (name, attrs) in &document.detail_columns {
            let base = any_column(table, "detail", name)?;
            projections.detail.push(DetailColumn {
                column: ProjectedColumn::from_base(base, attrs.sort, &attrs.html_type),
                col_span: attrs.col_span,
                is_row_start: attrs.is_row_start,
            });
        }

        for (name, attrs) in &document.query_columns {
            let base = any_column(table, "query", name)?;
            let query_type = attrs.query_type.unwrap_or_default();
            let rule = QueryRule::derive(base, query_type);
            projections.has_conversion |= rule.is_some();
            if let Some(foreign_table) = base.link.foreign_table().filter(|_| base.is_virtual) {
                projections
                    .virtual_query_tables
                    .insert(foreign_table.to_string());
            }
            let (field_validation, field_conversion) = rule
                .map(|rule| (rule.validation, rule.conversion.to_string()))
                .unzip();
            projections.query.push(QueryColumn {
                column: ProjectedColumn::from_base(base, attrs.sort, &attrs.html_type),
                query_type,
                field_validation,
                field_conversion,
            });
        }

        projections.list.sort_by_key(|entry| entry.column.sort);
        projections.add.sort_by_key(|entry| entry.column.sort);
        projections.edit.sort_by_key(|entry| entry.column.sort);
        projections.query.sort_by_key(|entry| entry.column.sort);
        projections.detail.sort_by_key(|entry| entry.column.sort);
        Ok(projections)
    }
}

/// Validation rule and conversion derived for a query column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRule {
    /// `field@rule#message`
    pub validation: String,
    /// Conversion function name
    pub conversion: &'static str,
}

impl QueryRule {
    /// Derive the rule for `column` compared with `query_type`
    ///
    /// String columns need neither validation nor conversion and yield `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::schema::document::{ColumnAttributes, QueryType};
    /// # use crudgen::schema::column::ColumnDefinition;
    /// # use crudgen::schema::projection::QueryRule;
    /// let attrs = ColumnAttributes { sql_type: "int(11)".into(), comment: "Dept".into(), ..Default::default() };
    /// let mut column = ColumnDefinition::from_attributes("sys_user", "dept_id", &attrs, false).unwrap();
    /// column.resolve("sys_user").unwrap();
    ///
    /// let rule = QueryRule::derive(&column, QueryType::Between).unwrap();
    /// assert_eq!(rule.validation, "deptId@integer-array#Dept must be an integer");
    /// assert_eq!(rule.conversion, "gconv.Int32");
    /// ```
    #[must_use]
    pub fn derive(column: &ColumnDefinition, query_type: QueryType) -> Option<Self> {
        let ranged = |rule: &str| {
            if query_type == QueryType::Between {
                format!("{rule}-array")
            } else {
                rule.to_string()
            }
        };
        let comment = &column.comment;

        let (rule, message, conversion) = match column.go_type.as_str() {
            "int32" => (ranged(INTEGER_RULE), format!("{comment} must be an integer"), "gconv.Int32"),
            "int64" => (ranged(INTEGER_RULE), format!("{comment} must be an integer"), "gconv.Int64"),
            "uint32" => (ranged(INTEGER_RULE), format!("{comment} must be an integer"), "gconv.Uint32"),
            "uint64" => (ranged(INTEGER_RULE), format!("{comment} must be an integer"), "gconv.Uint64"),
            "float32" | "float" => (ranged(FLOAT_RULE), format!("{comment} must be a number"), "gconv.Float32"),
            "float64" => (ranged(FLOAT_RULE), format!("{comment} must be a number"), "gconv.Float64"),
            "bool" => ("boolean".to_string(), format!("{comment} must be true/false"), "gconv.Bool"),
            "Time" if column.html_type == "date" => (
                ranged(DATE_RULE),
                format!("{comment} must be formatted as YYYY-MM-DD"),
                "gconv.Time",
            ),
            "Time" => (
                ranged(DATETIME_RULE),
                format!("{comment} must be formatted as YYYY-MM-DD hh:mm:ss"),
                "gconv.Time",
            ),
            _ => return None,
        };

        Some(Self {
            validation: format!(
                "{}@{rule}#{message}",
                Naming::case_camel_lower(&column.name)
            ),
            conversion,
        })
    }
}

fn physical<'t>(
    table: &'t TableDefinition,
    view: &'static str,
    name: &str,
) -> Result<&'t ColumnDefinition> {
    table
        .columns
        .get(name)
        .ok_or_else(|| CodegenError::MissingColumn {
            view,
            column: name.to_string(),
            table: table.name.clone(),
            scope: "columns",
        })
}

fn any_column<'t>(
    table: &'t TableDefinition,
    view: &'static str,
    name: &str,
) -> Result<&'t ColumnDefinition> {
    table
        .column(name)
        .ok_or_else(|| CodegenError::MissingColumn {
            view,
            column: name.to_string(),
            table: table.name.clone(),
            scope: "columns and virtualColumns",
        })
}
