//! Menu SQL execution
//!
//! The generated `.sql` file inserts a parent menu and its buttons. It uses
//! two session variables: `@now` for timestamps and `@parentId` for the id
//! of the parent row. Statements run through prepared queries, so instead of
//! relying on session state the runner captures both values itself and
//! substitutes them into each statement before executing it.

use anyhow::{Context, Result};
use chrono::Local;
use sqlx::mysql::MySqlPool;
use std::mem;
use std::path::Path;
use tracing::{debug, info, warn};

/// Timestamp format substituted for `@now`
pub const NOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One step of a menu script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuStatement {
    /// Statement sent to the server, without its trailing `;`
    Execute(String),
    /// `SELECT @parentId := LAST_INSERT_ID();`
    CaptureParentId,
    /// `SELECT @now := NOW();`
    CaptureNow,
}

/// Split a menu script into statements
///
/// Blank lines, `--` and `#` comments and `/* */` blocks are skipped. A
/// statement may span lines and ends at a line ending in `;`.
#[must_use]
pub fn parse_menu_sql(text: &str) -> Vec<MenuStatement> {
    let mut statements = Vec::new();
    let mut pending = String::new();
    let mut in_block = false;

    for line in text.lines().map(str::trim) {
        if in_block {
            in_block = !line.contains("*/");
            continue;
        }
        if line.is_empty() || line.starts_with("--") || line.starts_with('#') {
            continue;
        }
        if line.starts_with("/*") {
            in_block = !line.contains("*/");
            continue;
        }

        if !pending.is_empty() {
            pending.push(' ');
        }
        pending.push_str(line);
        if line.ends_with(';') {
            statements.push(classify(&mem::take(&mut pending)));
        }
    }
    if !pending.is_empty() {
        statements.push(classify(&pending));
    }
    statements
}

/// Only the exact assignments `SELECT @now := NOW()` and
/// `SELECT @parentId := LAST_INSERT_ID()` are captures; whitespace and case
/// are ignored.
fn classify(statement: &str) -> MenuStatement {
    let statement = statement.trim_end_matches(';').trim_end();
    let compact = statement
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    match compact.as_str() {
        "select@now:=now()" => MenuStatement::CaptureNow,
        "select@parentid:=last_insert_id()" => MenuStatement::CaptureParentId,
        _ => MenuStatement::Execute(statement.to_string()),
    }
}

/// Replace the session variables with captured values
#[must_use]
pub fn bind_variables(statement: &str, parent_id: u64, now: &str) -> String {
    statement
        .replace("@parentId", &parent_id.to_string())
        .replace("@now", &format!("'{now}'"))
}

/// Run a menu script in one transaction
///
/// Returns the number of statements executed. The transaction is rolled
/// back on the first failing statement.
///
/// # Errors
///
/// Returns the failing statement's error.
pub async fn execute_menu_sql(pool: &MySqlPool, text: &str) -> Result<usize> {
    let statements = parse_menu_sql(text);
    let mut now = Local::now().format(NOW_FORMAT).to_string();
    let mut last_insert_id = 0;
    let mut parent_id = 0;
    let mut executed = 0;

    let mut tx = pool
        .begin()
        .await
        .context("Failed to start menu transaction")?;

    for statement in statements {
        match statement {
            MenuStatement::CaptureNow => now = Local::now().format(NOW_FORMAT).to_string(),
            MenuStatement::CaptureParentId => parent_id = last_insert_id,
            MenuStatement::Execute(sql) => {
                let sql = bind_variables(&sql, parent_id, &now);
                debug!(%sql, "menu statement");
                match sqlx::query(&sql).execute(&mut *tx).await {
                    Ok(result) => {
                        if result.last_insert_id() != 0 {
                            last_insert_id = result.last_insert_id();
                        }
                        executed += 1;
                    }
                    Err(err) => {
                        warn!(%sql, "menu statement failed, rolling back");
                        tx.rollback()
                            .await
                            .context("Failed to roll back menu transaction")?;
                        return Err(err).with_context(|| format!("Menu statement failed: {sql}"));
                    }
                }
            }
        }
    }

    tx.commit()
        .await
        .context("Failed to commit menu transaction")?;
    Ok(executed)
}

/// Read and run the menu script at `path`
///
/// # Errors
///
/// Returns an error if the file cannot be read or a statement fails.
pub async fn execute_menu_file(pool: &MySqlPool, path: &Path) -> Result<usize> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read menu SQL: {}", path.display()))?;
    let executed = execute_menu_sql(pool, &text).await?;
    info!(path = %path.display(), executed, "menu SQL executed");
    Ok(executed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "
-- menu for user
/* generated
   file */
SELECT @now := NOW();
INSERT INTO `sys_menu` (`parent_id`, `name`, `created_at`)
VALUES (0, 'User', @now);
SELECT @parentId := LAST_INSERT_ID();
# buttons
INSERT INTO `sys_menu` (`parent_id`, `name`) VALUES (@parentId, 'Add');
";

    #[test]
    fn test_parse_menu_sql() {
        let statements = parse_menu_sql(SCRIPT);
        assert_eq!(
            statements,
            vec![
                MenuStatement::CaptureNow,
                MenuStatement::Execute(
                    "INSERT INTO `sys_menu` (`parent_id`, `name`, `created_at`) VALUES (0, 'User', @now)"
                        .to_string()
                ),
                MenuStatement::CaptureParentId,
                MenuStatement::Execute(
                    "INSERT INTO `sys_menu` (`parent_id`, `name`) VALUES (@parentId, 'Add')"
                        .to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_single_line_block_comment_and_trailing_statement() {
        let statements = parse_menu_sql("/* one line */\nDELETE FROM sys_menu WHERE id = 3");
        assert_eq!(
            statements,
            vec![MenuStatement::Execute("DELETE FROM sys_menu WHERE id = 3".to_string())]
        );
    }

    #[test]
    fn test_only_assignments_are_captured() {
        let statements = parse_menu_sql(
            "select  @parentId :=  last_insert_id( );\n\
             SELECT id FROM sys_menu WHERE parent_id = @parentId;\n\
             SELECT @now, @parentId;\n",
        );
        assert_eq!(
            statements,
            vec![
                MenuStatement::CaptureParentId,
                MenuStatement::Execute(
                    "SELECT id FROM sys_menu WHERE parent_id = @parentId".to_string()
                ),
                MenuStatement::Execute("SELECT @now, @parentId".to_string()),
            ]
        );
    }

    #[test]
    fn test_bind_variables() {
        let sql = bind_variables(
            "INSERT INTO sys_menu (parent_id, created_at) VALUES (@parentId, @now)",
            42,
            "2024-05-01 10:00:00",
        );
        assert_eq!(
            sql,
            "INSERT INTO sys_menu (parent_id, created_at) VALUES (42, '2024-05-01 10:00:00')"
        );
    }

    #[test]
    fn test_generated_script_parses() {
        use crate::render::templates::SQL_TEMPLATE;
        let captures = parse_menu_sql(SQL_TEMPLATE)
            .into_iter()
            .filter(|statement| !matches!(statement, MenuStatement::Execute(_)))
            .count();
        assert_eq!(captures, 2);
    }
}
