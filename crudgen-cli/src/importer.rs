//! MySQL schema importer
//!
//! Reads `information_schema` of the connected database and writes one
//! table definition document per table. Each document gets the defaults a
//! freshly scaffolded CRUD page needs, is validated through the regular
//! loader, and is saved with the derived Go and widget types filled in so
//! the file shows what generation will use.

use anyhow::{Context, Result};
use chrono::Local;
use crudgen::config::ImportSettings;
use crudgen::naming::Naming;
use crudgen::schema::document::{
    AddAttributes, API_VERSION, ColumnAttributes, DetailAttributes, EditAttributes, ListAttributes,
    QueryAttributes, TableAttributes,
};
use crudgen::schema::save_document;
use crudgen::{LoadOptions, Loader, MemorySource, TableDocument, TableRegistry};
use sqlx::mysql::MySqlPool;
use sqlx::FromRow;
use std::path::PathBuf;
use tracing::{info, warn};

/// Audit columns the forms never edit
pub const NOT_EDIT: &[&str] = &["created_by", "created_at", "updated_by", "updated_at", "deleted_at"];
/// Audit columns hidden from the list
pub const NOT_LIST: &[&str] = &["updated_by", "updated_at", "deleted_at"];
/// Audit columns hidden from the detail view
pub const NOT_DETAIL: &[&str] = &["updated_by", "updated_at", "deleted_at"];
/// Columns never offered as filters
pub const NOT_QUERY: &[&str] = &["updated_by", "updated_at", "deleted_at", "remark"];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TABLES_QUERY: &str = r"
SELECT CAST(table_name AS CHAR) AS name,
       CAST(IFNULL(table_comment, '') AS CHAR) AS comment
FROM information_schema.tables
WHERE table_schema = (SELECT DATABASE())
  AND table_name NOT LIKE 'qrtz_%'
  AND table_name NOT LIKE 'gen_%'";

const COLUMNS_QUERY: &str = r"
SELECT CAST(column_name AS CHAR) AS name,
       CAST(CASE WHEN is_nullable = 'YES' OR (is_nullable = 'NO' AND column_default IS NOT NULL)
                 THEN 0 ELSE 1 END AS SIGNED) AS is_required,
       CAST(CASE WHEN column_key = 'PRI' THEN 1 ELSE 0 END AS SIGNED) AS is_pk,
       CAST(ordinal_position AS SIGNED) AS sort,
       CAST(IFNULL(column_comment, '') AS CHAR) AS comment,
       CAST(CASE WHEN extra = 'auto_increment' THEN 1 ELSE 0 END AS SIGNED) AS is_increment,
       CAST(column_type AS CHAR) AS sql_type
FROM information_schema.columns
WHERE table_schema = (SELECT DATABASE())
  AND table_name = ?
ORDER BY ordinal_position";

/// A table of the current schema
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TableRow {
    /// Table name
    pub name: String,
    /// Table comment, empty when unset
    pub comment: String,
}

/// A column of an imported table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ColumnRow {
    /// Column name
    pub name: String,
    /// 1 when the column is `NOT NULL` without a default
    pub is_required: i64,
    /// 1 for primary key columns
    pub is_pk: i64,
    /// Ordinal position
    pub sort: i64,
    /// Column comment
    pub comment: String,
    /// 1 for `auto_increment` columns
    pub is_increment: i64,
    /// Full column type, e.g. `int(10) unsigned`
    pub sql_type: String,
}

/// SQL listing the tables to import, with one placeholder per bound value
fn tables_query(settings: &ImportSettings) -> String {
    let mut sql = TABLES_QUERY.to_string();
    if !settings.tables.is_empty() {
        let placeholders = vec!["?"; settings.tables.len()].join(", ");
        sql.push_str(&format!("\n  AND table_name IN ({placeholders})"));
    }
    if !settings.table_prefixes_only.is_empty() {
        let likes = vec!["table_name LIKE ?"; settings.table_prefixes_only.len()].join(" OR ");
        sql.push_str(&format!("\n  AND ({likes})"));
    }
    sql.push_str("\nORDER BY table_name");
    sql
}

/// Build the default document for a table from its schema rows
#[must_use]
pub fn synthesize_document(
    table: &TableRow,
    columns: &[ColumnRow],
    settings: &ImportSettings,
    now: &str,
) -> TableDocument {
    let pk = columns.iter().find(|column| column.is_pk != 0);
    let function_name = table
        .comment
        .strip_suffix('表')
        .unwrap_or(&table.comment)
        .trim()
        .to_string();

    let mut document = TableDocument {
        api_version: API_VERSION.to_string(),
        table: TableAttributes {
            name: table.name.clone(),
            comment: table.comment.clone(),
            backend_package: settings.backend_package.clone(),
            frontend_module: settings.frontend_module.clone(),
            template_category: settings.template_category,
            business_name: Naming::strip_table_prefix(&table.name, &settings.remove_table_prefixes),
            function_name,
            function_author: settings.author.clone(),
            overwrite: settings.overwrite,
            sort_column: pk.map(|column| column.name.clone()).unwrap_or_default(),
            sort_type: "asc".to_string(),
            show_detail: settings.show_detail,
            is_rpc: settings.is_rpc,
            separate_package: settings.separate_package,
            create_time: Some(now.to_string()),
            update_time: Some(now.to_string()),
            ..TableAttributes::default()
        },
        ..TableDocument::default()
    };

    for row in columns {
        let name = row.name.clone();
        let sort = i32::try_from(row.sort).unwrap_or(i32::MAX);
        let is_pk = row.is_pk != 0;
        let generated_key = is_pk && row.is_increment != 0;

        document.columns.insert(
            name.clone(),
            ColumnAttributes {
                comment: row.comment.clone(),
                sql_type: row.sql_type.clone(),
                sort,
                is_pk,
                is_increment: row.is_increment != 0,
                is_required: row.is_required != 0,
                ..ColumnAttributes::default()
            },
        );

        if !NOT_LIST.contains(&name.as_str()) {
            document.list_columns.insert(
                name.clone(),
                ListAttributes {
                    sort,
                    min_width: 100,
                    is_overflow_tooltip: true,
                    ..ListAttributes::default()
                },
            );
        }
        if !NOT_EDIT.contains(&name.as_str()) && !generated_key {
            document
                .add_columns
                .insert(name.clone(), AddAttributes { sort, ..AddAttributes::default() });
            document.edit_columns.insert(
                name.clone(),
                EditAttributes {
                    sort,
                    is_disabled: is_pk,
                    ..EditAttributes::default()
                },
            );
        }
        if !NOT_QUERY.contains(&name.as_str()) {
            document
                .query_columns
                .insert(name.clone(), QueryAttributes { sort, ..QueryAttributes::default() });
        }
        if !NOT_DETAIL.contains(&name.as_str()) {
            document.detail_columns.insert(
                name,
                DetailAttributes {
                    sort,
                    col_span: 12,
                    ..DetailAttributes::default()
                },
            );
        }
    }
    document
}

/// Run `document` through the loader and copy the derived types back
///
/// # Errors
///
/// Returns the loader's validation error.
pub fn resolve_defaults(mut document: TableDocument, options: LoadOptions) -> Result<TableDocument> {
    let name = document.table.name.clone();
    let source = MemorySource::new().with(document.clone());
    let loader = Loader::new(&source, options);
    let mut registry = TableRegistry::new();
    let id = loader
        .load(&mut registry, &name)
        .with_context(|| format!("Imported definition of {name} is invalid"))?;
    let table = registry.table(id);

    for (column_name, attrs) in &mut document.columns {
        if let Some(column) = table.column(column_name) {
            attrs.go_type.clone_from(&column.go_type);
            attrs.go_field.clone_from(&column.go_field);
            attrs.html_field.clone_from(&column.html_field);
            attrs.html_type.clone_from(&column.html_type);
        }
    }
    Ok(document)
}

/// Imports table definitions from a MySQL schema
pub struct Importer {
    pool: MySqlPool,
    settings: ImportSettings,
}

impl Importer {
    /// Importer reading through `pool`
    #[must_use]
    pub const fn new(pool: MySqlPool, settings: ImportSettings) -> Self {
        Self { pool, settings }
    }

    /// Tables selected by the settings
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn tables(&self) -> Result<Vec<TableRow>> {
        let sql = tables_query(&self.settings);
        let mut query = sqlx::query_as::<_, TableRow>(&sql);
        for table in &self.settings.tables {
            query = query.bind(table);
        }
        for prefix in &self.settings.table_prefixes_only {
            query = query.bind(format!("{prefix}%"));
        }
        query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tables")
    }

    /// Columns of `table` in ordinal order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn columns(&self, table: &str) -> Result<Vec<ColumnRow>> {
        sqlx::query_as::<_, ColumnRow>(COLUMNS_QUERY)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to read columns of {table}"))
    }

    /// Import every selected table, returning the written files
    ///
    /// # Errors
    ///
    /// Returns the first query, validation or write error.
    pub async fn import(&self) -> Result<Vec<PathBuf>> {
        let tables = self.tables().await?;
        if tables.is_empty() {
            warn!("no tables matched the import filters");
        }
        let now = Local::now().format(TIME_FORMAT).to_string();
        let options = LoadOptions {
            go_module: String::new(),
            remove_table_prefixes: self.settings.remove_table_prefixes.clone(),
        };

        let mut written = Vec::with_capacity(tables.len());
        for table in &tables {
            let columns = self.columns(&table.name).await?;
            let document = synthesize_document(table, &columns, &self.settings, &now);
            let document = resolve_defaults(document, options.clone())?;
            let path = save_document(&self.settings.yaml_dir, &document)
                .with_context(|| format!("Failed to save definition of {}", table.name))?;
            info!(table = %table.name, path = %path.display(), "table definition imported");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, sql_type: &str, sort: i64) -> ColumnRow {
        ColumnRow {
            name: name.to_string(),
            is_required: 0,
            is_pk: 0,
            sort,
            comment: String::new(),
            is_increment: 0,
            sql_type: sql_type.to_string(),
        }
    }

    fn sys_user() -> (TableRow, Vec<ColumnRow>) {
        let table = TableRow {
            name: "sys_user".to_string(),
            comment: "用户表".to_string(),
        };
        let id = ColumnRow {
            is_pk: 1,
            is_increment: 1,
            is_required: 1,
            ..column("id", "bigint(20) unsigned", 1)
        };
        let columns = vec![
            id,
            column("user_name", "varchar(64)", 2),
            column("remark", "varchar(500)", 3),
            column("created_at", "datetime", 4),
            column("updated_at", "datetime", 5),
        ];
        (table, columns)
    }

    fn settings() -> ImportSettings {
        ImportSettings {
            backend_package: "app/system".to_string(),
            remove_table_prefixes: vec!["sys_".to_string()],
            ..ImportSettings::default()
        }
    }

    #[test]
    fn test_table_defaults() {
        let (table, columns) = sys_user();
        let document = synthesize_document(&table, &columns, &settings(), "2024-05-01 10:00:00");

        assert_eq!(document.table.function_name, "用户");
        assert_eq!(document.table.business_name, "user");
        assert_eq!(document.table.sort_column, "id");
        assert_eq!(document.table.sort_type, "asc");
        assert_eq!(document.table.function_author, "Awesome Developer");
        assert!(document.table.overwrite);
        assert_eq!(document.table.create_time.as_deref(), Some("2024-05-01 10:00:00"));
    }

    #[test]
    fn test_default_projections_skip_audit_columns() {
        let (table, columns) = sys_user();
        let document = synthesize_document(&table, &columns, &settings(), "now");

        let list: Vec<&str> = document.list_columns.keys().map(String::as_str).collect();
        assert_eq!(list, ["id", "user_name", "remark", "created_at"]);
        let add: Vec<&str> = document.add_columns.keys().map(String::as_str).collect();
        assert_eq!(add, ["user_name", "remark"]);
        let edit: Vec<&str> = document.edit_columns.keys().map(String::as_str).collect();
        assert_eq!(edit, ["user_name", "remark"]);
        let query: Vec<&str> = document.query_columns.keys().map(String::as_str).collect();
        assert_eq!(query, ["id", "user_name", "created_at"]);
        assert_eq!(document.list_columns["id"].min_width, 100);
        assert!(document.list_columns["id"].is_overflow_tooltip);
        assert_eq!(document.detail_columns["remark"].col_span, 12);
    }

    #[test]
    fn test_manual_pk_is_disabled_in_edit() {
        let table = TableRow {
            name: "dict".to_string(),
            comment: String::new(),
        };
        let code = ColumnRow {
            is_pk: 1,
            ..column("code", "varchar(32)", 1)
        };
        let document = synthesize_document(&table, &[code], &ImportSettings::default(), "now");
        assert!(document.add_columns.contains_key("code"));
        assert!(document.edit_columns["code"].is_disabled);
    }

    #[test]
    fn test_resolve_defaults_fills_types() {
        let (table, columns) = sys_user();
        let document = synthesize_document(&table, &columns, &settings(), "now");
        let document = resolve_defaults(
            document,
            LoadOptions {
                go_module: String::new(),
                remove_table_prefixes: vec!["sys_".to_string()],
            },
        )
        .unwrap();

        let id = &document.columns["id"];
        assert_eq!(id.go_type, "uint64");
        assert_eq!(id.go_field, "Id");
        assert_eq!(document.columns["user_name"].html_field, "userName");
        assert_eq!(document.columns["created_at"].go_type, "Time");
    }

    #[test]
    fn test_tables_query_filters() {
        let mut settings = ImportSettings::default();
        assert!(!tables_query(&settings).contains(" IN ("));

        settings.tables = vec!["a".to_string(), "b".to_string()];
        settings.table_prefixes_only = vec!["sys_".to_string(), "cms_".to_string()];
        let sql = tables_query(&settings);
        assert!(sql.contains("AND table_name IN (?, ?)"));
        assert!(sql.contains("AND (table_name LIKE ? OR table_name LIKE ?)"));
        assert!(sql.ends_with("ORDER BY table_name"));
    }
}
