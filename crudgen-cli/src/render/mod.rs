//! Artifact rendering
//!
//! A [`Renderer`] owns one Handlebars registry with every template, partial
//! and naming helper registered up front. Rendering a table is then a matter
//! of building its context once and asking for each artifact kind.
//!
//! # Example
//!
//! ```rust,no_run
//! use crudgen::{LoadOptions, Loader, TableRegistry, YamlDirectory};
//! use crudgen_cli::render::{table_context, ArtifactKind, Renderer};
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = YamlDirectory::new("manifest/config/codegen_conf");
//! let loader = Loader::new(&source, LoadOptions::default());
//! let mut registry = TableRegistry::new();
//! let id = loader.resolve(&mut registry, "sys_user")?;
//!
//! let renderer = Renderer::new()?;
//! let context = table_context(&registry, id);
//! let entity = renderer.render(ArtifactKind::Entity, registry.table(id), &context)?;
//! println!("{entity}");
//! # Ok(())
//! # }
//! ```

mod context;
pub mod templates;

pub use context::{
    frontend_dir, import_base, is_plugin, package_base, route_prefix, table_context, FormField,
    VirtualQuery, ROUTE_PREFIX,
};

use anyhow::{Context, Result};
use crudgen::naming::Naming;
use crudgen::schema::TemplateCategory;
use crudgen::TableDefinition;
use handlebars::{handlebars_helper, Handlebars};
use regex::Regex;
use serde_json::Value;
use std::fmt;

/// Files generated for a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// HTTP controller
    Api,
    /// Public DAO wrapper
    Dao,
    /// Internal DAO with column names
    DaoInternal,
    /// Table entity
    Entity,
    /// Request and response types
    Model,
    /// Route registration
    Router,
    /// Protocol buffer definition
    Protobuf,
    /// RPC provider
    Provider,
    /// Business logic
    Service,
    /// Menu SQL
    Sql,
    /// Frontend API client
    JsApi,
    /// Frontend page
    Vue,
}

impl ArtifactKind {
    /// Every kind, in generation order
    pub const ALL: [Self; 12] = [
        Self::Api,
        Self::Dao,
        Self::DaoInternal,
        Self::Entity,
        Self::Model,
        Self::Router,
        Self::Protobuf,
        Self::Provider,
        Self::Service,
        Self::Sql,
        Self::JsApi,
        Self::Vue,
    ];

    /// Registered template rendering this kind
    #[must_use]
    pub const fn template_name(self, category: TemplateCategory) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Dao => "dao",
            Self::DaoInternal => "dao_internal",
            Self::Entity => "entity",
            Self::Model => "model",
            Self::Router => "router",
            Self::Protobuf => "protobuf",
            Self::Provider => "provider",
            Self::Service => "service",
            Self::Sql => "sql",
            Self::JsApi => "js_api",
            Self::Vue => match category {
                TemplateCategory::Crud => "vue_list",
                TemplateCategory::Tree => "vue_tree",
            },
        }
    }

    /// Human readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Api => "API controller",
            Self::Dao => "DAO",
            Self::DaoInternal => "internal DAO",
            Self::Entity => "entity",
            Self::Model => "model",
            Self::Router => "router",
            Self::Protobuf => "protobuf definition",
            Self::Provider => "RPC provider",
            Self::Service => "service",
            Self::Sql => "menu SQL",
            Self::JsApi => "frontend API",
            Self::Vue => "frontend page",
        }
    }

    /// Whether the artifact is only generated alongside a frontend project
    #[must_use]
    pub const fn needs_frontend(self) -> bool {
        matches!(self, Self::Sql | Self::JsApi | Self::Vue)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

handlebars_helper!(case_camel: |value: str| Naming::case_camel(value));
handlebars_helper!(case_camel_lower: |value: str| Naming::case_camel_lower(value));
handlebars_helper!(case_kebab: |value: str| Naming::case_kebab(value));
handlebars_helper!(case_snake: |value: str| Naming::case_snake(value));
handlebars_helper!(uc_first: |value: str| Naming::uc_first(value));
handlebars_helper!(sum: |a: i64, b: i64| a + b);
handlebars_helper!(contains_i: |haystack: str, needle: str| {
    haystack.to_lowercase().contains(&needle.to_lowercase())
});

/// Line-break normalisation applied to every rendered artifact
///
/// Templates are written for readability, so control blocks leave blank
/// lines behind. Normalising collapses them and then restores the blank
/// lines Go formatting expects after closing braces and around imports.
#[derive(Debug, Clone)]
pub struct TrimBreak {
    blank_runs: Regex,
    trailing_space: Regex,
    after_close: Regex,
    before_import: Regex,
    single_import: Regex,
}

impl TrimBreak {
    /// Compile the normalisation patterns
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            blank_runs: Regex::new(r"(([ \t]*)\r?\n){2,}")?,
            trailing_space: Regex::new(r"[ \t]+\r?\n")?,
            after_close: Regex::new(r"\n(////|[)}])\n")?,
            before_import: Regex::new(r"\n(import[ \t]*[(])\n")?,
            single_import: Regex::new(r#"\n(import[ \t]+"[^"\n]*")\n"#)?,
        })
    }

    /// Normalise `text`
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let text = self.blank_runs.replace_all(text, "\n");
        let text = self.trailing_space.replace_all(&text, "\n");
        let text = self.after_close.replace_all(&text, "\n${1}\n\n");
        let text = self.before_import.replace_all(&text, "\n\n${1}\n");
        self.single_import
            .replace_all(&text, "\n\n${1}\n\n")
            .into_owned()
    }
}

/// Handlebars registry with every artifact template
pub struct Renderer {
    handlebars: Handlebars<'static>,
    trim_break: TrimBreak,
}

impl Renderer {
    /// Register helpers, partials and templates
    ///
    /// # Errors
    ///
    /// Returns an error if a template or partial fails to parse.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("case_camel", Box::new(case_camel));
        handlebars.register_helper("case_camel_lower", Box::new(case_camel_lower));
        handlebars.register_helper("case_kebab", Box::new(case_kebab));
        handlebars.register_helper("case_snake", Box::new(case_snake));
        handlebars.register_helper("uc_first", Box::new(uc_first));
        handlebars.register_helper("sum", Box::new(sum));
        handlebars.register_helper("contains_i", Box::new(contains_i));

        for (name, source) in templates::PARTIALS {
            handlebars
                .register_partial(name, *source)
                .with_context(|| format!("Failed to register partial {name}"))?;
        }
        for (name, source) in templates::TEMPLATES {
            handlebars
                .register_template_string(name, *source)
                .with_context(|| format!("Failed to register template {name}"))?;
        }

        Ok(Self {
            handlebars,
            trim_break: TrimBreak::new().context("Failed to compile line-break patterns")?,
        })
    }

    /// Render one artifact of `table` against its prepared context
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self, kind: ArtifactKind, table: &TableDefinition, context: &Value) -> Result<String> {
        let template = kind.template_name(table.template_category);
        let rendered = self
            .handlebars
            .render(template, context)
            .with_context(|| format!("Failed to render {kind} for table {}", table.name))?;
        Ok(self.trim_break.apply(&rendered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudgen::{LoadOptions, Loader, MemorySource, TableDocument, TableRegistry};
    use serde_json::json;

    const USER: &str = r"
table:
  name: sys_user
  comment: User
  functionName: user
  backendPackage: app/system
  frontendModule: system
  sortColumn: id
  sortType: desc
columns:
  id: { sqlType: bigint(20) unsigned, isPk: true, isIncrement: true, comment: ID, sort: 1 }
  user_name: { sqlType: varchar(64), comment: Login, isRequired: true, sort: 2 }
  dept_id:
    sqlType: int(11)
    comment: Dept
    sort: 3
    relatedTableName: sys_dept
    relatedValueColumnName: dept_name
  created_at: { sqlType: datetime, comment: Created, sort: 4 }
listColumns:
  user_name: {}
  dept_id: {}
  created_at: {}
addColumns:
  user_name: {}
  dept_id: {}
editColumns:
  user_name: {}
  dept_id: {}
queryColumns:
  user_name: { queryType: LIKE }
  dept_id: {}
  created_at: { queryType: BETWEEN }
";

    const DEPT: &str = r"
table:
  name: sys_dept
  comment: Department
columns:
  id: { sqlType: int(11), isPk: true, sort: 1 }
  dept_name: { sqlType: varchar(64), sort: 2 }
";

    fn render(kind: ArtifactKind) -> String {
        let source = MemorySource::new()
            .with(TableDocument::from_yaml("sys_user", USER).unwrap())
            .with(TableDocument::from_yaml("sys_dept", DEPT).unwrap());
        let options = LoadOptions {
            go_module: "github.com/acme/admin".to_string(),
            remove_table_prefixes: Vec::new(),
        };
        let loader = Loader::new(&source, options);
        let mut registry = TableRegistry::new();
        let id = loader.resolve(&mut registry, "sys_user").unwrap();
        let context = table_context(&registry, id);
        Renderer::new()
            .unwrap()
            .render(kind, registry.table(id), &context)
            .unwrap()
    }

    #[test]
    fn test_every_template_renders() {
        for kind in ArtifactKind::ALL {
            let text = render(kind);
            assert!(!text.trim().is_empty(), "{kind} rendered empty");
            assert!(!text.contains("\n\n\n"), "{kind} kept a blank-line run");
        }
    }

    #[test]
    fn test_entity() {
        let text = render(ArtifactKind::Entity);
        assert!(text.contains("type SysUser struct {"));
        assert!(text.contains("Id uint64 `orm:\"id,primary\" json:\"id\"` // ID"));
        assert!(text.contains("CreatedAt *gtime.Time `orm:\"created_at\""));
        assert!(text.contains("\n\nimport \"github.com/gogf/gf/v2/os/gtime\"\n\n//"));
    }

    #[test]
    fn test_model_joins_related_table() {
        let text = render(ArtifactKind::Model);
        assert!(text.contains(
            "RltdSysUserSysDept *RltdSysUserSysDept `orm:\"with:id=dept_id\" json:\"rltdSysUserSysDept\"`"
        ));
        assert!(text.contains("g.Meta `orm:\"table:sys_dept\"`"));
        assert!(text.contains("DeptName string `orm:\"dept_name\" json:\"deptName\"`"));
        assert!(text.contains("CreatedAt []*gtime.Time `json:\"createdAt\""));
        assert!(text.contains("v:\"required#Login is required\""));
        assert!(text.contains("v:\"deptId@integer#Dept must be an integer\""));
    }

    #[test]
    fn test_service_filters() {
        let text = render(ArtifactKind::Service);
        assert!(text.contains("m = m.WhereLike(columns.UserName, \"%\"+req.UserName+\"%\")"));
        assert!(text.contains("if req.DeptId != 0 {"));
        assert!(text.contains("m = m.WhereBetween(columns.CreatedAt, req.CreatedAt[0], req.CreatedAt[1])"));
        assert!(text.contains("orderBy = \"id desc\""));
        assert!(text.contains("\"github.com/acme/admin/app/system/service/internal/dao\""));
        assert!(text.contains(".WithAll()"));
    }

    #[test]
    fn test_frontend_uses_related_display_field() {
        let text = render(ArtifactKind::Vue);
        assert!(text.contains("prop=\"rltdSysUserSysDept.deptName\""));
        assert!(text.contains("from '@/api/system/sys-user'"));
        assert!(text.contains("userName: [{ required: true"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_routes_agree() {
        let router = render(ArtifactKind::Router);
        let api = render(ArtifactKind::JsApi);
        assert!(router.contains("s.Group(\"/api/v1/system\""));
        assert!(router.contains("group.Group(\"/sys-user\""));
        assert!(api.contains("url: '/api/v1/system/sys-user/list'"));
    }

    #[test]
    fn test_protobuf_numbers_fields() {
        let text = render(ArtifactKind::Protobuf);
        assert!(text.contains("package github.com.acme.admin.app.system;"));
        assert!(text.contains("string userName = 1;"));
        assert!(text.contains("repeated string createdAt = 3;"));
        assert!(text.contains("int32 pageNum = 4;"));
    }

    #[test]
    fn test_sql_uses_session_variables() {
        let text = render(ArtifactKind::Sql);
        assert!(text.contains("SELECT @now := NOW();"));
        assert!(text.contains("VALUES (@parentId, '/api/v1/system/sys-user/list'"));
    }

    #[test]
    fn test_trim_break() {
        let trim = TrimBreak::new().unwrap();
        let text = "package a\n\n\nimport (\n\t\"x\"\n)\n\nfunc f() {\n}  \nvar x\n";
        assert_eq!(
            trim.apply(text),
            "package a\n\nimport (\n\t\"x\"\n)\n\nfunc f() {\n}\n\nvar x\n"
        );
        assert_eq!(
            trim.apply("package b\nimport \"y\"\ntype T int\n"),
            "package b\n\nimport \"y\"\n\ntype T int\n"
        );
    }

    #[test]
    fn test_helpers() {
        let renderer = Renderer::new().unwrap();
        let text = renderer
            .handlebars
            .render_template(
                "{{case_camel name}} {{case_camel_lower name}} {{case_kebab name}} {{case_snake camel}} {{uc_first word}} {{sum 2 3}} {{#if (contains_i kind \"IMAGE\")}}yes{{/if}}",
                &json!({ "name": "user_name", "camel": "UserName", "word": "abc", "kind": "images" }),
            )
            .unwrap();
        assert_eq!(text, "UserName userName user-name user_name Abc 5 yes");
    }
}
