//! `crudgen generate`: render code for the table definitions

use anyhow::{Context, Result};
use clap::Args;
use console::{style, Emoji};
use crudgen::config::{split_list, GenerateSettings};
use crudgen_cli::generator::{Generator, TableReport};
use crudgen_cli::toolchain::{read_go_module, SystemRunner};
use crudgen_cli::{database, menu};
use std::path::PathBuf;

static SUCCESS: Emoji = Emoji("✓", "√");
static SKIPPED: Emoji = Emoji("·", "-");
static REMOVED: Emoji = Emoji("✗", "x");

/// Options of `crudgen generate`, overriding the configuration file
#[derive(Debug, Default, Args)]
pub struct GenerateArgs {
    /// Directory of table definition files
    #[arg(long)]
    pub yaml_dir: Option<PathBuf>,

    /// Comma-separated tables to generate
    #[arg(long)]
    pub tables: Option<String>,

    /// Comma-separated table name prefixes to generate
    #[arg(long)]
    pub prefix: Option<String>,

    /// Comma-separated prefixes removed to form business names
    #[arg(long)]
    pub remove_prefix: Option<String>,

    /// Generate the service layer only
    #[arg(long)]
    pub service_only: bool,

    /// Add the gf cache module to the project
    #[arg(long)]
    pub smart_cache: bool,

    /// Frontend project root
    #[arg(long)]
    pub frontend_path: Option<PathBuf>,

    /// Go module name, read from go.mod when omitted
    #[arg(long)]
    pub go_module: Option<String>,

    /// Skip `go get` and `go mod tidy`
    #[arg(long)]
    pub skip_toolchain: bool,

    /// Database where generated menu SQL is executed
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl GenerateArgs {
    /// Layer the flags given on the command line over `settings`
    #[must_use]
    pub fn apply(self, mut settings: GenerateSettings) -> GenerateSettings {
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
        if self.frontend_path.is_some() {
            settings.frontend_path = self.frontend_path;
        }
        if self.go_module.is_some() {
            settings.go_module = self.go_module;
        }
        if self.database_url.is_some() {
            settings.database_url = self.database_url;
        }
        settings.service_only |= self.service_only;
        settings.smart_cache |= self.smart_cache;
        settings.skip_toolchain |= self.skip_toolchain;
        settings
    }
}

/// Generate code for every selected table definition
pub struct GenerateCommand {
    settings: GenerateSettings,
}

impl GenerateCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(settings: GenerateSettings) -> Self {
        Self { settings }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The working directory is not a Go module and no module was given
    /// - A table definition fails to load or render
    /// - A file cannot be written or an external tool fails
    pub async fn execute(self) -> Result<()> {
        let root = std::env::current_dir().context("Failed to read the working directory")?;
        let go_module = match &self.settings.go_module {
            Some(module) => module.clone(),
            None => read_go_module(&root)?,
        };

        println!(
            "{} {} {}",
            style("Generating").green().bold(),
            style("code for module").bold(),
            style(&go_module).cyan().bold()
        );
        println!();

        let database_url = self.settings.database_url.clone();
        let skip_toolchain = self.settings.skip_toolchain;
        let reports = {
            let runner = SystemRunner;
            let generator = Generator::new(root, self.settings, go_module, &runner)?;
            let reports = generator.generate_all()?;
            for report in &reports {
                print_report(report);
            }
            if !skip_toolchain {
                println!("{}", style("Fetching Go modules...").dim());
                generator.finish()?;
            }
            reports
        };

        let menus: Vec<PathBuf> = reports
            .iter()
            .filter_map(|report| report.menu_sql.clone())
            .collect();
        if let Some(url) = database_url.filter(|_| !menus.is_empty()) {
            let pool = database::connect(&url).await?;
            for path in &menus {
                let executed = menu::execute_menu_file(&pool, path).await?;
                println!(
                    "  {} {} ({executed} statements)",
                    style(SUCCESS).green(),
                    style(path.display()).cyan()
                );
            }
        }

        print_success(&reports, &menus, skip_toolchain);
        Ok(())
    }
}

fn print_report(report: &TableReport) {
    println!("{}", style(&report.table).bold());
    for file in &report.written {
        println!(
            "  {} {} {}",
            style(SUCCESS).green(),
            style(file.path.display()).cyan(),
            style(&file.description).dim()
        );
    }
    for path in &report.skipped {
        println!("  {} {} {}", style(SKIPPED).dim(), path.display(), style("exists").dim());
    }
    for path in &report.removed {
        println!("  {} {} {}", style(REMOVED).yellow(), path.display(), style("removed").dim());
    }
}

fn print_success(reports: &[TableReport], menus: &[PathBuf], skip_toolchain: bool) {
    let written: usize = reports.iter().map(|report| report.written.len()).sum();
    println!();
    println!(
        "{}",
        style(format!(
            "{SUCCESS} Generated {written} file(s) for {} table(s)",
            reports.len()
        ))
        .green()
        .bold()
    );
    println!();
    println!("{}", style("Next steps:").bold());
    let mut step = 1;
    if skip_toolchain {
        println!(
            "  {} Fetch dependencies: {}",
            style(format!("{step}.")).cyan(),
            style("go mod tidy").cyan()
        );
        step += 1;
    }
    if !menus.is_empty() {
        println!(
            "  {} Import menu SQL from {} if it was not executed",
            style(format!("{step}.")).cyan(),
            style("data/gen_sql").cyan()
        );
        step += 1;
    }
    println!(
        "  {} Start the server: {}",
        style(format!("{step}.")).cyan(),
        style("go run main.go").cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_config_when_flags_absent() {
        let settings = GenerateSettings {
            tables: vec!["sys_user".to_string()],
            smart_cache: true,
            ..GenerateSettings::default()
        };
        let settings = GenerateArgs::default().apply(settings);
        assert_eq!(settings.tables, ["sys_user"]);
        assert!(settings.smart_cache);
        assert!(!settings.service_only);
    }

    #[test]
    fn test_apply_flags() {
        let args = GenerateArgs {
            prefix: Some("sys_,cms_".to_string()),
            frontend_path: Some(PathBuf::from("../admin-ui")),
            service_only: true,
            ..GenerateArgs::default()
        };
        let settings = args.apply(GenerateSettings::default());
        assert_eq!(settings.table_prefixes_only, ["sys_", "cms_"]);
        assert_eq!(settings.frontend_path, Some(PathBuf::from("../admin-ui")));
        assert!(settings.service_only);
    }
}
