//! `crudgen import`: write table definitions from a MySQL schema

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use console::{style, Emoji};
use crudgen::config::{split_list, ImportSettings};
use crudgen::schema::TemplateCategory;
use crudgen_cli::database;
use crudgen_cli::importer::Importer;
use std::path::PathBuf;

static SUCCESS: Emoji = Emoji("✓", "√");

/// Page layout accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    /// Flat list
    Crud,
    /// Tree list
    Tree,
}

impl From<CategoryArg> for TemplateCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Crud => Self::Crud,
            CategoryArg::Tree => Self::Tree,
        }
    }
}

/// Options of `crudgen import`, overriding the configuration file
#[derive(Debug, Default, Args)]
pub struct ImportArgs {
    /// MySQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory the definitions are written to
    #[arg(long)]
    pub yaml_dir: Option<PathBuf>,

    /// Comma-separated tables to import
    #[arg(long)]
    pub tables: Option<String>,

    /// Comma-separated table name prefixes to import
    #[arg(long)]
    pub prefix: Option<String>,

    /// Comma-separated prefixes removed to form business names
    #[arg(long)]
    pub remove_prefix: Option<String>,

    /// Backend package relative to the Go module, e.g. `app/system`
    #[arg(long)]
    pub backend_package: Option<String>,

    /// Frontend module path
    #[arg(long)]
    pub frontend_module: Option<String>,

    /// Generate each table into its own package
    #[arg(long)]
    pub separate_package: bool,

    /// Page layout of the generated frontend
    #[arg(long, value_enum)]
    pub template_category: Option<CategoryArg>,

    /// Author written into generated files
    #[arg(long)]
    pub author: Option<String>,

    /// Whether regeneration may overwrite existing files
    #[arg(long)]
    pub overwrite: Option<bool>,

    /// Generate a detail view
    #[arg(long)]
    pub show_detail: Option<bool>,

    /// Generate an RPC service
    #[arg(long)]
    pub rpc: bool,
}

impl ImportArgs {
    /// Layer the flags given on the command line over `settings`
    #[must_use]
    pub fn apply(self, mut settings: ImportSettings) -> ImportSettings {
        if self.database_url.is_some() {
            settings.database_url = self.database_url;
        }
        if let Some(dir) = self.yaml_dir {
            settings.yaml_dir = dir;
        }
        if let Some(tables) = self.tables {
            settings.tables = split_list(&tables);
        }
        if let Some(prefixes) = self.prefix {
            settings.table_prefixes_only = split_list(&prefixes);
        }
        if let Some(prefixes) = self.remove_prefix {
            settings.remove_table_prefixes = split_list(&prefixes);
        }
        if let Some(package) = self.backend_package {
            settings.backend_package = package;
        }
        if let Some(module) = self.frontend_module {
            settings.frontend_module = module;
        }
        if let Some(category) = self.template_category {
            settings.template_category = category.into();
        }
        if let Some(author) = self.author {
            settings.author = author;
        }
        if let Some(overwrite) = self.overwrite {
            settings.overwrite = overwrite;
        }
        if let Some(show_detail) = self.show_detail {
            settings.show_detail = show_detail;
        }
        settings.separate_package |= self.separate_package;
        settings.is_rpc |= self.rpc;
        settings
    }
}

/// Import table definitions from a MySQL schema
pub struct ImportCommand {
    settings: ImportSettings,
}

impl ImportCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if no database URL is configured, the database
    /// cannot be read, or a definition cannot be written.
    pub async fn execute(self) -> Result<()> {
        let Some(url) = self.settings.database_url.clone() else {
            bail!("No database URL. Pass --database-url or set import.database_url in crudgen.toml");
        };

        println!(
            "{} {}",
            style("Importing").green().bold(),
            style("table definitions").bold()
        );
        println!();

        let pool = database::connect(&url).await?;
        let yaml_dir = self.settings.yaml_dir.clone();
        let written = Importer::new(pool, self.settings).import().await?;

        for path in &written {
            println!("  {} {}", style(SUCCESS).green(), style(path.display()).cyan());
        }
        println!();
        println!(
            "{}",
            style(format!("{SUCCESS} Imported {} table definition(s)", written.len()))
                .green()
                .bold()
        );
        println!();
        println!("{}", style("Next steps:").bold());
        println!(
            "  {} Review the definitions in {}",
            style("1.").cyan(),
            style(yaml_dir.display()).cyan()
        );
        println!(
            "  {} Generate code: {}",
            style("2.").cyan(),
            style("crudgen generate").cyan()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let settings = ImportSettings {
            backend_package: "app/system".to_string(),
            ..ImportSettings::default()
        };
        let args = ImportArgs {
            tables: Some("sys_user, sys_dept".to_string()),
            template_category: Some(CategoryArg::Tree),
            overwrite: Some(false),
            rpc: true,
            ..ImportArgs::default()
        };

        let settings = args.apply(settings);
        assert_eq!(settings.tables, ["sys_user", "sys_dept"]);
        assert_eq!(settings.backend_package, "app/system");
        assert_eq!(settings.template_category, TemplateCategory::Tree);
        assert!(!settings.overwrite);
        assert!(settings.show_detail);
        assert!(settings.is_rpc);
    }
}
