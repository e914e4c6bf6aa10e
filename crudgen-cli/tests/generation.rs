//! Generating a project from YAML definitions on disk

use anyhow::{bail, Result};
use crudgen::config::GenerateSettings;
use crudgen_cli::toolchain::CommandRunner;
use crudgen_cli::Generator;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SYS_USER: &str = r"
table:
  name: sys_user
  comment: User
  functionName: user
  backendPackage: app/system
  frontendModule: system
columns:
  id: { sqlType: bigint(20) unsigned, isPk: true, isIncrement: true, sort: 1 }
  user_name: { sqlType: varchar(64), isRequired: true, sort: 2 }
  dept_id:
    sqlType: int(11)
    sort: 3
    relatedTableName: sys_dept
    relatedValueColumnName: dept_name
listColumns:
  user_name: {}
  dept_id: {}
addColumns:
  user_name: {}
editColumns:
  user_name: {}
queryColumns:
  user_name: { queryType: LIKE }
";

const SYS_DEPT: &str = r"
table:
  name: sys_dept
  comment: Department
  backendPackage: app/system
columns:
  id: { sqlType: int(11), isPk: true, isIncrement: true, sort: 1 }
  dept_name: { sqlType: varchar(64), sort: 2 }
listColumns:
  dept_name: {}
";

const RPC_ORDER: &str = r"
table:
  name: shop_order
  backendPackage: app/shop
  isRpc: true
columns:
  id: { sqlType: bigint(20), isPk: true, sort: 1 }
";

/// Fails on any invocation; generation without RPC tables runs no tools
struct NoTools;

impl CommandRunner for NoTools {
    fn run(&self, program: &str, _args: &[String], _dir: &Path) -> Result<String> {
        bail!("unexpected call to {program}")
    }
}

struct Project {
    root: TempDir,
    frontend: PathBuf,
}

impl Project {
    fn new(definitions: &[(&str, &str)]) -> Self {
        let root = TempDir::new().unwrap();
        let yaml_dir = root.path().join("manifest/config/codegen_conf");
        fs::create_dir_all(&yaml_dir).unwrap();
        for (name, text) in definitions {
            fs::write(yaml_dir.join(format!("{name}.yaml")), text).unwrap();
        }
        let frontend = root.path().join("admin-ui");
        fs::create_dir_all(&frontend).unwrap();
        Self { root, frontend }
    }

    fn settings(&self) -> GenerateSettings {
        GenerateSettings {
            yaml_dir: self.root.path().join("manifest/config/codegen_conf"),
            remove_table_prefixes: vec!["sys_".to_string(), "shop_".to_string()],
            frontend_path: Some(self.frontend.clone()),
            skip_toolchain: true,
            ..GenerateSettings::default()
        }
    }

    fn generator<'r>(&self, settings: GenerateSettings, runner: &'r NoTools) -> Generator<'r> {
        Generator::new(
            self.root.path().to_path_buf(),
            settings,
            "github.com/acme/admin".to_string(),
            runner,
        )
        .unwrap()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }
}

#[test]
fn test_generates_backend_and_frontend_files() {
    let project = Project::new(&[("sys_user", SYS_USER), ("sys_dept", SYS_DEPT)]);
    let generator = project.generator(project.settings(), &NoTools);

    let reports = generator.generate_all().unwrap();
    assert_eq!(reports.len(), 2);
    generator.finish().unwrap();

    for file in [
        "app/system/api/user.go",
        "app/system/service/internal/dao/user.go",
        "app/system/service/internal/dao/internal/user.go",
        "app/system/model/entity/user.go",
        "app/system/model/user.go",
        "app/system/router/user.go",
        "app/system/service/user.go",
        "data/gen_sql/app/system/user.sql",
        "router/app_system.go",
    ] {
        assert!(project.path(file).is_file(), "missing {file}");
    }
    assert!(!project.path("app/system/proto/user.proto").exists());
    assert!(project.frontend.join("src/views/system/user/list/index.vue").is_file());
    assert!(project.frontend.join("src/api/system/user.js").is_file());

    let user = reports.iter().find(|report| report.table == "sys_user").unwrap();
    assert_eq!(
        user.menu_sql.as_deref(),
        Some(project.path("data/gen_sql/app/system/user.sql").as_path())
    );

    let entity = fs::read_to_string(project.path("app/system/model/entity/user.go")).unwrap();
    assert!(entity.contains("package entity"));
    assert!(entity.contains("UserName"));
}

#[test]
fn test_existing_files_are_kept_without_overwrite() {
    let project = Project::new(&[("sys_user", SYS_USER), ("sys_dept", SYS_DEPT)]);
    let generator = project.generator(project.settings(), &NoTools);
    generator.generate_table("sys_user").unwrap();

    let service = project.path("app/system/service/user.go");
    fs::write(&service, "// edited by hand\n").unwrap();

    let report = generator.generate_table("sys_user").unwrap();
    assert!(report.written.is_empty());
    assert!(report.skipped.contains(&service));
    assert!(report.menu_sql.is_none());
    assert_eq!(fs::read_to_string(&service).unwrap(), "// edited by hand\n");
}

#[test]
fn test_service_only_skips_controllers_and_frontend_without_path() {
    let project = Project::new(&[("sys_user", SYS_USER), ("sys_dept", SYS_DEPT)]);
    let settings = GenerateSettings {
        service_only: true,
        frontend_path: None,
        tables: vec!["sys_user".to_string()],
        ..project.settings()
    };
    let generator = project.generator(settings, &NoTools);

    let reports = generator.generate_all().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(project.path("app/system/service/user.go").is_file());
    assert!(!project.path("app/system/api/user.go").exists());
    assert!(!project.path("app/system/router/user.go").exists());
    assert!(!project.path("router/app_system.go").exists());
    assert!(!project.path("data/gen_sql").exists());
    assert!(reports[0].menu_sql.is_none());
}

#[test]
fn test_rpc_table_requires_port() {
    let project = Project::new(&[("shop_order", RPC_ORDER)]);
    let generator = project.generator(project.settings(), &NoTools);

    let err = generator.generate_table("shop_order").unwrap_err();
    assert!(err.to_string().contains("rpcPort"));
}

#[test]
fn test_missing_frontend_path_is_rejected() {
    let project = Project::new(&[]);
    let settings = GenerateSettings {
        frontend_path: Some(project.path("does-not-exist")),
        ..project.settings()
    };
    let result = Generator::new(
        project.root.path().to_path_buf(),
        settings,
        "github.com/acme/admin".to_string(),
        &NoTools,
    );
    assert!(result.is_err());
}
