//! Resolved column model
//!
//! A [`ColumnDefinition`] starts as a copy of its document attributes and is
//! completed by [`ColumnDefinition::resolve`], which derives identifiers and
//! types wherever the document left them empty. Relation and cascade roles
//! are validated when the column is built, so the resolver only ever sees
//! legal combinations.

use super::classifier::{self, SqlCategory, SqlShape};
use super::document::ColumnAttributes;
use crate::error::{CodegenError, Result};
use crate::naming::Naming;
use indexmap::IndexSet;
use serde::Serialize;

/// How a column reaches data in another table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ColumnLink {
    /// Plain column
    None,
    /// Lookup of a display value in a peer table keyed by this column
    #[serde(rename_all = "camelCase")]
    Related {
        /// Lookup table
        table: String,
        /// Display column in the lookup table
        value_column: String,
    },
    /// Value read from a foreign table through a key column of this table
    #[serde(rename_all = "camelCase")]
    Foreign {
        /// Table owning the value
        table: String,
        /// Key column in the owning table
        key_column: String,
        /// Value column in the foreign table
        value_column: String,
    },
    /// Foreign value that is itself a key into the foreign table's lookup table
    #[serde(rename_all = "camelCase")]
    ForeignRelated {
        /// Table owning the value
        table: String,
        /// Key column in the owning table
        key_column: String,
        /// Column in the foreign table joined to the lookup table
        value_column: String,
        /// Lookup table of the foreign table
        related_table: String,
        /// Display column in the lookup table
        related_value_column: String,
    },
}

impl ColumnLink {
    /// Build and validate the link declared by `attrs`
    ///
    /// # Errors
    ///
    /// Returns a validation error if a virtual column lacks any of its three
    /// foreign fields, if foreign fields are only partially set, or if a
    /// related table is declared without its value column.
    pub fn from_attributes(
        table: &str,
        column: &str,
        attrs: &ColumnAttributes,
        is_virtual: bool,
    ) -> Result<Self> {
        let foreign = [
            &attrs.foreign_table_name,
            &attrs.foreign_key_column_name,
            &attrs.foreign_value_column_name,
        ];
        let foreign_set = foreign.iter().filter(|value| !value.is_empty()).count();

        if (is_virtual || foreign_set > 0) && foreign_set < foreign.len() {
            return Err(CodegenError::validation(
                table,
                format!(
                    "column {column} must set foreignTableName, foreignKeyColumnName and foreignValueColumnName together"
                ),
            ));
        }
        if !attrs.related_table_name.is_empty() && attrs.related_value_column_name.is_empty() {
            return Err(CodegenError::validation(
                table,
                format!(
                    "column {column} declares relatedTableName {} without relatedValueColumnName",
                    attrs.related_table_name
                ),
            ));
        }

        let has_foreign = foreign_set == foreign.len();
        let has_related = !attrs.related_table_name.is_empty();
        Ok(match (has_foreign, has_related) {
            (false, false) => Self::None,
            (false, true) => Self::Related {
                table: attrs.related_table_name.clone(),
                value_column: attrs.related_value_column_name.clone(),
            },
            (true, false) => Self::Foreign {
                table: attrs.foreign_table_name.clone(),
                key_column: attrs.foreign_key_column_name.clone(),
                value_column: attrs.foreign_value_column_name.clone(),
            },
            (true, true) => Self::ForeignRelated {
                table: attrs.foreign_table_name.clone(),
                key_column: attrs.foreign_key_column_name.clone(),
                value_column: attrs.foreign_value_column_name.clone(),
                related_table: attrs.related_table_name.clone(),
                related_value_column: attrs.related_value_column_name.clone(),
            },
        })
    }

    /// Foreign table name, for `Foreign` and `ForeignRelated`
    #[must_use]
    pub fn foreign_table(&self) -> Option<&str> {
        match self {
            Self::Foreign { table, .. } | Self::ForeignRelated { table, .. } => Some(table),
            Self::None | Self::Related { .. } => None,
        }
    }

    /// Key column in the owning table, for `Foreign` and `ForeignRelated`
    #[must_use]
    pub fn foreign_key_column(&self) -> Option<&str> {
        match self {
            Self::Foreign { key_column, .. } | Self::ForeignRelated { key_column, .. } => {
                Some(key_column)
            }
            Self::None | Self::Related { .. } => None,
        }
    }

    /// Whether the column has no relation
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Cascade membership of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeLink {
    /// Parent column in the same table
    pub parent_column: String,
    /// Column in the related table matched against the parent's value
    pub cascade_column: String,
    /// Whether the parent was found among the virtual columns
    pub parent_is_virtual: Option<bool>,
}

/// Relation outputs filled in by the relational resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRelation {
    /// Class name of the foreign table, when there is one
    pub foreign_table_class: String,
    /// Class of the table that actually holds the display value
    pub combined_table_class: String,
    /// Frontend class used for dictionary and lazy select population
    pub combined_html_table_class: String,
    /// Dotted frontend path of the display value
    pub combined_html_field: String,
    /// Primary key columns of the table holding the display value
    pub related_key_columns: Vec<String>,
}

/// One resolved column
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    pub comment: String,
    pub sql_type: String,
    pub sort: i32,
    pub category: SqlCategory,
    pub go_type: String,
    pub proto_type: String,
    pub convert_func: String,
    pub go_field: String,
    pub html_field: String,
    pub html_type: String,
    pub is_pk: bool,
    pub is_increment: bool,
    pub is_required: bool,
    pub dict_type: String,
    pub is_virtual: bool,
    pub link: ColumnLink,
    pub cascade: Option<CascadeLink>,
    pub is_cascade_parent: bool,
    /// Every descendant in the cascade chain, nearest first
    pub cascade_children: IndexSet<String>,
    pub relation: Option<ResolvedRelation>,
}

impl ColumnDefinition {
    /// Build an unresolved column from its document attributes
    ///
    /// # Errors
    ///
    /// Returns a validation error for illegal link combinations, see
    /// [`ColumnLink::from_attributes`]. A cascade column may not also be a
    /// three-level foreign lookup.
    pub fn from_attributes(
        table: &str,
        name: &str,
        attrs: &ColumnAttributes,
        is_virtual: bool,
    ) -> Result<Self> {
        let link = ColumnLink::from_attributes(table, name, attrs, is_virtual)?;
        let cascade = attrs.is_cascade.then(|| CascadeLink {
            parent_column: attrs.parent_column_name.clone(),
            cascade_column: attrs.cascade_column_name.clone(),
            parent_is_virtual: None,
        });
        if cascade.is_some() && matches!(link, ColumnLink::ForeignRelated { .. }) {
            return Err(CodegenError::validation(
                table,
                format!("cascade column {name} cannot also be a foreign lookup with relatedTableName"),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            comment: attrs.comment.clone(),
            sql_type: attrs.sql_type.clone(),
            sort: attrs.sort,
            category: SqlCategory::default(),
            go_type: attrs.go_type.clone(),
            proto_type: String::new(),
            convert_func: String::new(),
            go_field: attrs.go_field.clone(),
            html_field: attrs.html_field.clone(),
            html_type: attrs.html_type.clone(),
            is_pk: attrs.is_pk,
            is_increment: attrs.is_increment,
            is_required: attrs.is_required,
            dict_type: attrs.dict_type.clone(),
            is_virtual,
            link,
            cascade,
            is_cascade_parent: false,
            cascade_children: IndexSet::new(),
            relation: None,
        })
    }

    /// Fill in every derived attribute the document left empty
    ///
    /// Explicit `goField`, `htmlField` and `htmlType` values are kept as
    /// written. An explicit `goType` is kept too, with one exception: `int`
    /// and `uint` become `int32` and `uint32`, the same spelling derived
    /// types use, so the conversion and protobuf types stay fixed-width. The
    /// conversion function name is always recomputed.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the column has no `sqlType`.
    pub fn resolve(&mut self, table: &str) -> Result<()> {
        if self.sql_type.trim().is_empty() {
            return Err(CodegenError::validation(
                table,
                format!("column {} must declare sqlType", self.name),
            ));
        }
        let shape = SqlShape::parse(&self.sql_type);
        self.category = shape.category;

        if self.go_field.is_empty() {
            self.go_field = Naming::case_camel(&self.name);
        }
        if self.html_field.is_empty() {
            self.html_field = Naming::case_camel_lower(&self.name);
        }
        if self.go_type.is_empty() {
            self.go_type = shape.language_type().to_string();
        }
        self.go_type = classifier::normalize_language_type(&self.go_type);
        self.convert_func = Naming::uc_first(&self.go_type);
        self.proto_type = classifier::protocol_type(&self.go_type);
        if self.html_type.is_empty() {
            self.html_type = shape.widget_type().to_string();
        }
        Ok(())
    }

    /// Whether the column holds a date or time value
    #[must_use]
    pub fn is_time(&self) -> bool {
        self.go_type == "Time"
    }

    /// Whether the widget uploads files
    #[must_use]
    pub fn is_upload(&self) -> bool {
        matches!(self.html_type.as_str(), "images" | "file" | "files")
    }

    /// Declared parent of a cascade column
    #[must_use]
    pub fn parent_column(&self) -> Option<&str> {
        self.cascade
            .as_ref()
            .map(|cascade| cascade.parent_column.as_str())
            .filter(|parent| !parent.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn attrs(sql_type: &str) -> ColumnAttributes {
        ColumnAttributes {
            sql_type: sql_type.to_string(),
            ..ColumnAttributes::default()
        }
    }

    fn resolved(name: &str, attrs: &ColumnAttributes) -> ColumnDefinition {
        let mut column = ColumnDefinition::from_attributes("t", name, attrs, false).unwrap();
        column.resolve("t").unwrap();
        column
    }

    #[test]
    fn test_resolve_derives_names_and_types() {
        let column = resolved("dept_id", &attrs("int(11) unsigned"));
        assert_eq!(column.go_field, "DeptId");
        assert_eq!(column.html_field, "deptId");
        assert_eq!(column.go_type, "uint32");
        assert_eq!(column.proto_type, "uint32");
        assert_eq!(column.convert_func, "Uint32");
        assert_eq!(column.html_type, "input");
        assert_eq!(column.category, SqlCategory::Numeric);
    }

    #[test]
    fn test_resolve_time_column() {
        let column = resolved("created_at", &attrs("datetime"));
        assert!(column.is_time());
        assert_eq!(column.proto_type, "string");
        assert_eq!(column.html_type, "datetime");
    }

    #[test]
    fn test_explicit_values_win() {
        let mut explicit = attrs("varchar(2000)");
        explicit.go_type = "int64".to_string();
        explicit.html_type = "images".to_string();
        explicit.go_field = "Pictures".to_string();
        let column = resolved("picture_list", &explicit);
        assert_eq!(column.go_type, "int64");
        assert_eq!(column.html_type, "images");
        assert_eq!(column.go_field, "Pictures");
        assert_eq!(column.html_field, "pictureList");
        assert!(column.is_upload());
    }

    #[test]
    fn test_explicit_int_is_normalised() {
        let mut explicit = attrs("varchar(10)");
        explicit.go_type = "int".to_string();
        let column = resolved("code", &explicit);
        assert_eq!(column.go_type, "int32");
        assert_eq!(column.proto_type, "int32");
        assert_eq!(column.convert_func, "Int32");
    }

    #[test]
    fn test_missing_sql_type_fails() {
        let mut column =
            ColumnDefinition::from_attributes("post", "title", &attrs(""), false).unwrap();
        let err = column.resolve("post").unwrap_err();
        assert!(err.to_string().contains("title"));
        assert!(err.to_string().contains("post"));
    }

    #[test]
    fn test_virtual_column_requires_foreign_fields() {
        let mut partial = attrs("varchar(64)");
        partial.foreign_table_name = "customer".to_string();
        let err = ColumnDefinition::from_attributes("order", "customer_name", &partial, true)
            .unwrap_err();
        assert!(matches!(err, CodegenError::Validation { .. }));

        let bare = attrs("varchar(64)");
        assert!(ColumnDefinition::from_attributes("order", "customer_name", &bare, true).is_err());
    }

    #[test]
    fn test_link_variants() {
        let mut related = attrs("int");
        related.related_table_name = "sys_dept".to_string();
        related.related_value_column_name = "dept_name".to_string();
        let column = ColumnDefinition::from_attributes("sys_user", "dept_id", &related, false)
            .unwrap();
        assert!(matches!(column.link, ColumnLink::Related { .. }));

        let mut foreign = attrs("varchar(64)");
        foreign.foreign_table_name = "customer".to_string();
        foreign.foreign_key_column_name = "customer_id".to_string();
        foreign.foreign_value_column_name = "name".to_string();
        let column =
            ColumnDefinition::from_attributes("order", "customer_name", &foreign, true).unwrap();
        assert_eq!(column.link.foreign_table(), Some("customer"));
        assert_eq!(column.link.foreign_key_column(), Some("customer_id"));

        foreign.related_table_name = "region".to_string();
        foreign.related_value_column_name = "region_name".to_string();
        let column =
            ColumnDefinition::from_attributes("order", "customer_region", &foreign, true).unwrap();
        assert!(matches!(column.link, ColumnLink::ForeignRelated { .. }));
    }

    #[test]
    fn test_related_requires_value_column() {
        let mut related = attrs("int");
        related.related_table_name = "sys_dept".to_string();
        assert!(ColumnDefinition::from_attributes("sys_user", "dept_id", &related, false).is_err());
    }

    #[test]
    fn test_cascade_with_three_level_lookup_is_rejected() {
        let mut both = attrs("int");
        both.is_cascade = true;
        both.parent_column_name = "province_id".to_string();
        both.foreign_table_name = "customer".to_string();
        both.foreign_key_column_name = "customer_id".to_string();
        both.foreign_value_column_name = "city_id".to_string();
        both.related_table_name = "city".to_string();
        both.related_value_column_name = "city_name".to_string();
        assert!(ColumnDefinition::from_attributes("order", "city", &both, true).is_err());
    }

    fn sql_type() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec![
                "int", "bigint", "tinyint", "varchar", "char", "text", "decimal", "float",
                "date", "datetime", "timestamp", "bit", "enum", "json",
            ]),
            prop::option::of(1u32..=4000),
            any::<bool>(),
        )
            .prop_map(|(base, length, unsigned)| {
                let length = length.map(|n| format!("({n})")).unwrap_or_default();
                let unsigned = if unsigned { " unsigned" } else { "" };
                format!("{base}{length}{unsigned}")
            })
    }

    fn go_type() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(vec!["int", "uint", "int64", "string", "Time", "bool"])
                .prop_map(str::to_string),
            "[A-Za-z][A-Za-z0-9]{0,11}",
        ]
    }

    proptest! {
        #[test]
        fn prop_explicit_types_survive_resolution(
            sql in sql_type(),
            go in go_type(),
            html in "[a-z]{1,10}",
        ) {
            let mut explicit = attrs(&sql);
            explicit.go_type.clone_from(&go);
            explicit.html_type.clone_from(&html);
            let column = resolved("field", &explicit);

            prop_assert_eq!(&column.html_type, &html);
            let expected = match go.as_str() {
                "int" => "int32",
                "uint" => "uint32",
                other => other,
            };
            prop_assert_eq!(column.go_type.as_str(), expected);
            prop_assert_eq!(column.convert_func, Naming::uc_first(expected));
        }
    }
}
