//! Code generation for a set of table definitions
//!
//! Every table is loaded with its own registry, rendered into each artifact
//! its settings call for, and written under the module root. RPC tables
//! additionally compile their protobuf definition.

use crate::render::{table_context, ArtifactKind, Renderer};
use crate::toolchain::{runtime_modules, CommandRunner, Toolchain};
use crate::writer::{remove_files, write_file, GeneratedFile, Layout, WriteOutcome};
use anyhow::{bail, Context, Result};
use crudgen::config::GenerateSettings;
use crudgen::{Loader, TableDefinition, TableRegistry, YamlDirectory};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Names from `names` selected by an explicit list and by prefix
///
/// An empty list or prefix set selects everything.
#[must_use]
pub fn select_tables(names: Vec<String>, tables: &[String], prefixes: &[String]) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| tables.is_empty() || tables.contains(name))
        .filter(|name| {
            prefixes.is_empty()
                || prefixes
                    .iter()
                    .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
        })
        .collect()
}

/// What happened while generating one table
#[derive(Debug, Clone, Default)]
pub struct TableReport {
    /// Table name
    pub table: String,
    /// Files created or overwritten
    pub written: Vec<GeneratedFile>,
    /// Existing files left untouched
    pub skipped: Vec<PathBuf>,
    /// Outputs of the other service flavour that were removed
    pub removed: Vec<PathBuf>,
    /// Menu SQL written in this run, to be executed
    pub menu_sql: Option<PathBuf>,
}

/// Generates code for the tables of a YAML directory
pub struct Generator<'r> {
    settings: GenerateSettings,
    go_module: String,
    renderer: Renderer,
    layout: Layout,
    toolchain: Toolchain<'r>,
}

impl<'r> Generator<'r> {
    /// Generator writing into the Go module at `root`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured frontend path does not exist or a
    /// template fails to compile.
    pub fn new(
        root: PathBuf,
        settings: GenerateSettings,
        go_module: String,
        runner: &'r dyn CommandRunner,
    ) -> Result<Self> {
        if let Some(frontend) = &settings.frontend_path {
            if !frontend.is_dir() {
                bail!("Frontend path {} does not exist", frontend.display());
            }
        }
        Ok(Self {
            renderer: Renderer::new()?,
            layout: Layout::new(root.clone(), settings.frontend_path.clone()),
            toolchain: Toolchain::new(runner, root),
            settings,
            go_module,
        })
    }

    /// Settings in effect
    #[must_use]
    pub const fn settings(&self) -> &GenerateSettings {
        &self.settings
    }

    /// Root of the Go module
    #[must_use]
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Tables selected for generation, in name order
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML directory cannot be listed.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let names = YamlDirectory::new(&self.settings.yaml_dir)
            .table_names()
            .with_context(|| {
                format!(
                    "Failed to list table definitions in {}",
                    self.settings.yaml_dir.display()
                )
            })?;
        Ok(select_tables(
            names,
            &self.settings.tables,
            &self.settings.table_prefixes_only,
        ))
    }

    fn wants(&self, table: &TableDefinition, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Api | ArtifactKind::Router => !self.settings.service_only,
            ArtifactKind::Model => !table.is_rpc,
            ArtifactKind::Protobuf | ArtifactKind::Provider => table.is_rpc,
            _ => true,
        }
    }

    /// Generate every artifact of table `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the table fails to resolve, an RPC prerequisite
    /// is missing, or a file cannot be rendered or written.
    pub fn generate_table(&self, name: &str) -> Result<TableReport> {
        let source = YamlDirectory::new(&self.settings.yaml_dir);
        let loader = Loader::new(&source, self.settings.load_options(&self.go_module));
        let mut registry = TableRegistry::new();
        let id = loader
            .resolve(&mut registry, name)
            .with_context(|| format!("Failed to load table definition {name}"))?;
        let table = registry.table(id);

        if table.is_rpc {
            if table.rpc_port == 0 {
                bail!("Table {name} is an RPC service but has no rpcPort");
            }
            self.toolchain.check_rpc_tools()?;
        }

        let context = table_context(&registry, id);
        let mut report = TableReport {
            table: name.to_string(),
            ..TableReport::default()
        };

        for kind in ArtifactKind::ALL {
            if !self.wants(table, kind) {
                continue;
            }
            let Some(path) = self.layout.path(table, kind) else {
                continue;
            };
            let content = self
                .renderer
                .render(kind, table, &context)
                .with_context(|| format!("Failed to render {kind} for {name}"))?;
            let proto_dir = (kind == ArtifactKind::Protobuf)
                .then(|| path.parent().map(Path::to_path_buf))
                .flatten();

            match write_file(&path, &content, table.overwrite)? {
                WriteOutcome::Skipped => report.skipped.push(path),
                outcome => {
                    info!(table = name, file = %path.display(), ?outcome, "{}", kind.description());
                    if kind == ArtifactKind::Sql {
                        report.menu_sql = Some(path.clone());
                    }
                    report.written.push(GeneratedFile {
                        path,
                        content,
                        description: kind.description().to_string(),
                    });
                }
            }

            if let Some(proto_dir) = proto_dir {
                self.toolchain
                    .compile_proto(&proto_dir, &table.go_file_name, &self.layout.pb_go(table))?;
            }
        }

        if table.overwrite {
            report.removed = remove_files(self.layout.stale_outputs(table))?;
        }

        if !self.settings.service_only {
            if let Some(registrar) = self.layout.router_registrar(table) {
                if write_file(&registrar.path, &registrar.content, false)?.is_written() {
                    report.written.push(registrar);
                }
            }
        }

        Ok(report)
    }

    /// Generate every selected table, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first table's error.
    pub fn generate_all(&self) -> Result<Vec<TableReport>> {
        let names = self.table_names()?;
        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            match self.generate_table(&name) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    error!(table = %name, error = %err, "generation failed");
                    return Err(err);
                }
            }
        }
        Ok(reports)
    }

    /// Fetch runtime modules and tidy `go.mod`, unless disabled
    ///
    /// # Errors
    ///
    /// Returns the first failing `go` command.
    pub fn finish(&self) -> Result<()> {
        if self.settings.skip_toolchain {
            return Ok(());
        }
        self.toolchain.go_get(&runtime_modules(
            self.settings.service_only,
            self.settings.smart_cache,
        ))?;
        self.toolchain.mod_tidy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_select_tables_by_name_and_prefix() {
        let all = names(&["cms_post", "sys_dept", "sys_user", "user_sys"]);

        assert_eq!(select_tables(all.clone(), &[], &[]), all);
        assert_eq!(
            select_tables(all.clone(), &[], &names(&["sys_"])),
            names(&["sys_dept", "sys_user"])
        );
        assert_eq!(
            select_tables(all.clone(), &names(&["sys_user", "cms_post"]), &names(&["sys_"])),
            names(&["sys_user"])
        );
        assert!(select_tables(all, &names(&["missing"]), &[]).is_empty());
    }
}
