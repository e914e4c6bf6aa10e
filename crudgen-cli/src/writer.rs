//! Artifact placement and writing
//!
//! Backend files live under the table's package directory inside the Go
//! module; frontend files live under the configured frontend project. An
//! existing file is only replaced when the table allows overwriting.

use crate::render::{frontend_dir, is_plugin, package_base, ArtifactKind};
use anyhow::{Context, Result};
use crudgen::naming::Naming;
use crudgen::TableDefinition;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file produced for a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Absolute or root-relative path
    pub path: PathBuf,
    /// File content
    pub content: String,
    /// Human readable description
    pub description: String,
}

/// What [`write_file`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist
    Created,
    /// The file existed and was replaced
    Overwritten,
    /// The file existed and overwriting was not allowed
    Skipped,
}

impl WriteOutcome {
    /// Whether content reached the disk
    #[must_use]
    pub const fn is_written(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Write `content` to `path`, creating parent directories
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
pub fn write_file(path: &Path, content: &str, overwrite: bool) -> Result<WriteOutcome> {
    let existed = path.exists();
    if existed && !overwrite {
        debug!(path = %path.display(), "file exists, not overwriting");
        return Ok(WriteOutcome::Skipped);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(if existed {
        WriteOutcome::Overwritten
    } else {
        WriteOutcome::Created
    })
}

/// Remove the files among `paths` that exist, returning the removed ones
///
/// # Errors
///
/// Returns an error if an existing file cannot be removed.
pub fn remove_files(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in paths {
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {}", path.display()))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

/// Where each artifact of a table goes
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    frontend: Option<PathBuf>,
}

impl Layout {
    /// Layout for a Go module at `root` and an optional frontend project
    #[must_use]
    pub const fn new(root: PathBuf, frontend: Option<PathBuf>) -> Self {
        Self { root, frontend }
    }

    /// Root of the Go module
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn package_dir(&self, table: &TableDefinition) -> PathBuf {
        self.root.join(package_base(table))
    }

    /// Path of `kind` for `table`; `None` for frontend artifacts without a frontend project
    #[must_use]
    pub fn path(&self, table: &TableDefinition, kind: ArtifactKind) -> Option<PathBuf> {
        let frontend = match &self.frontend {
            None if kind.needs_frontend() => return None,
            frontend => frontend.clone().unwrap_or_default(),
        };
        let package = self.package_dir(table);
        let go = format!("{}.go", table.go_file_name);
        let path = match kind {
            ArtifactKind::Api => package.join("api").join(go),
            ArtifactKind::Dao => package.join("service/internal/dao").join(go),
            ArtifactKind::DaoInternal => package.join("service/internal/dao/internal").join(go),
            ArtifactKind::Entity => package.join("model/entity").join(go),
            ArtifactKind::Model => package.join("model").join(go),
            ArtifactKind::Router => package.join("router").join(go),
            ArtifactKind::Protobuf => package
                .join("proto")
                .join(format!("{}.proto", table.go_file_name)),
            ArtifactKind::Provider => package.join("provider").join(go),
            ArtifactKind::Service => package.join("service").join(go),
            ArtifactKind::Sql => self
                .root
                .join("data/gen_sql")
                .join(&table.package_name)
                .join(format!("{}.sql", table.go_file_name)),
            ArtifactKind::JsApi => frontend
                .join("src/api")
                .join(frontend_dir(table))
                .join(format!("{}.js", table.frontend_file_name)),
            ArtifactKind::Vue => frontend
                .join("src/views")
                .join(frontend_dir(table))
                .join(&table.frontend_file_name)
                .join("list/index.vue"),
        };
        Some(path)
    }

    /// Go code protoc generates from the table's protobuf definition
    #[must_use]
    pub fn pb_go(&self, table: &TableDefinition) -> PathBuf {
        self.package_dir(table)
            .join("model")
            .join(format!("{}.pb.go", table.go_file_name))
    }

    /// Outputs of the other service flavour, removed when the table may overwrite
    ///
    /// An RPC table gets its model from protoc, so the hand-rendered model
    /// goes; a plain table drops its protobuf, generated stubs and provider.
    #[must_use]
    pub fn stale_outputs(&self, table: &TableDefinition) -> Vec<PathBuf> {
        let package = self.package_dir(table);
        let name = &table.go_file_name;
        if table.is_rpc {
            vec![package.join("model").join(format!("{name}.go"))]
        } else {
            vec![
                package.join("proto").join(format!("{name}.proto")),
                self.pb_go(table),
                package.join("model").join(format!("{name}_triple.pb.go")),
                package.join("provider").join(format!("{name}.go")),
            ]
        }
    }

    /// Blank-import file that pulls the table's routes into the server
    ///
    /// `None` for the `system` package, which the server imports itself.
    #[must_use]
    pub fn router_registrar(&self, table: &TableDefinition) -> Option<GeneratedFile> {
        if Naming::case_snake(&table.go_file_name) == "system" {
            return None;
        }
        let dir = if is_plugin(table) {
            self.root.join("plugins/router")
        } else {
            self.root.join("router")
        };
        let package = table.package_name.trim_matches('/').replace('/', "_");
        let (file, import) = if table.separate_package {
            (
                format!("{package}_{}.go", table.go_file_name),
                format!("{}/{}/router", table.backend_package, table.go_file_name),
            )
        } else {
            (format!("{package}.go"), format!("{}/router", table.backend_package))
        };
        Some(GeneratedFile {
            path: dir.join(file),
            content: format!("package router\n\nimport _ \"{import}\"\n"),
            description: "router registration".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudgen::{LoadOptions, TableDocument};
    use tempfile::TempDir;

    fn table(yaml: &str) -> TableDefinition {
        let document = TableDocument::from_yaml("t", yaml).unwrap();
        let options = LoadOptions {
            go_module: "github.com/acme/admin".to_string(),
            remove_table_prefixes: vec!["sys_".to_string(), "cms_".to_string()],
        };
        TableDefinition::from_document("t", &document, &options).unwrap()
    }

    fn user() -> TableDefinition {
        table("table: { name: sys_user, backendPackage: app/system, frontendModule: system }\n")
    }

    fn plugin_post() -> TableDefinition {
        table(
            "table: { name: cms_post, backendPackage: app/plugins/cms, frontendModule: cms, separatePackage: true }\n",
        )
    }

    #[test]
    fn test_write_file_respects_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.go");

        assert_eq!(write_file(&path, "one", false).unwrap(), WriteOutcome::Created);
        assert_eq!(write_file(&path, "two", false).unwrap(), WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "one");
        assert_eq!(write_file(&path, "three", true).unwrap(), WriteOutcome::Overwritten);
        assert_eq!(fs::read_to_string(&path).unwrap(), "three");
    }

    #[test]
    fn test_backend_paths() {
        let layout = Layout::new(PathBuf::from("/srv"), None);
        let user = user();
        assert_eq!(
            layout.path(&user, ArtifactKind::DaoInternal).unwrap(),
            PathBuf::from("/srv/app/system/service/internal/dao/internal/user.go")
        );
        assert_eq!(
            layout.path(&user, ArtifactKind::Protobuf).unwrap(),
            PathBuf::from("/srv/app/system/proto/user.proto")
        );
        assert_eq!(
            layout.path(&plugin_post(), ArtifactKind::Entity).unwrap(),
            PathBuf::from("/srv/app/plugins/cms/post/model/entity/post.go")
        );
    }

    #[test]
    fn test_frontend_paths_need_frontend() {
        let user = user();
        let without = Layout::new(PathBuf::from("/srv"), None);
        assert!(without.path(&user, ArtifactKind::Vue).is_none());
        assert!(without.path(&user, ArtifactKind::Sql).is_none());

        let layout = Layout::new(PathBuf::from("/srv"), Some(PathBuf::from("/ui")));
        assert_eq!(
            layout.path(&user, ArtifactKind::Vue).unwrap(),
            PathBuf::from("/ui/src/views/system/user/list/index.vue")
        );
        assert_eq!(
            layout.path(&plugin_post(), ArtifactKind::JsApi).unwrap(),
            PathBuf::from("/ui/src/api/plugins/cms/post.js")
        );
        assert_eq!(
            layout.path(&user, ArtifactKind::Sql).unwrap(),
            PathBuf::from("/srv/data/gen_sql/app/system/user.sql")
        );
    }

    #[test]
    fn test_router_registrar() {
        let layout = Layout::new(PathBuf::from("/srv"), None);

        let shared = layout.router_registrar(&user()).unwrap();
        assert_eq!(shared.path, PathBuf::from("/srv/router/app_system.go"));
        assert_eq!(
            shared.content,
            "package router\n\nimport _ \"github.com/acme/admin/app/system/router\"\n"
        );

        let separate = layout.router_registrar(&plugin_post()).unwrap();
        assert_eq!(separate.path, PathBuf::from("/srv/plugins/router/app_plugins_cms_post.go"));
        assert!(separate
            .content
            .contains("import _ \"github.com/acme/admin/app/plugins/cms/post/router\""));

        let system = table("table: { name: system, backendPackage: app/system }\n");
        assert!(layout.router_registrar(&system).is_none());
    }

    #[test]
    fn test_stale_outputs_removed() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path().to_path_buf(), None);
        let user = user();

        let stale = layout.stale_outputs(&user);
        assert_eq!(stale.len(), 4);
        write_file(&stale[0], "syntax = \"proto3\";", false).unwrap();
        write_file(&stale[1], "package model", false).unwrap();

        let removed = remove_files(stale.clone()).unwrap();
        assert_eq!(removed, vec![stale[0].clone(), stale[1].clone()]);
        assert!(!stale[0].exists());
    }
}
