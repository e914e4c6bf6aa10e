//! External tools: `protoc`, its Go plugins and the `go` command

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Runtime modules every generated project imports
pub const GF_MODULE: &str = "github.com/gogf/gf/v2";
/// MySQL driver for gf
pub const GF_MYSQL_DRIVER: &str = "github.com/gogf/gf/contrib/drivers/mysql/v2";
/// Request helpers used by generated controllers
pub const HTTP_UTILS_MODULE: &str = "github.com/WesleyWu/gf-httputils";
/// Cache helpers used with smart caching
pub const CACHE_MODULE: &str = "github.com/WesleyWu/gf-cache";

/// Runs an external program
pub trait CommandRunner {
    /// Run `program` with `args` in `dir`, returning stdout followed by stderr
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits unsuccessfully.
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<String>;
}

/// Runs programs with [`std::process::Command`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<String> {
        debug!(program, ?args, dir = %dir.display(), "running");
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("Failed to run {program}. Is it installed?"))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            bail!("{program} {} failed: {}", args.join(" "), text.trim());
        }
        Ok(text)
    }
}

/// Modules fetched after generation
#[must_use]
pub fn runtime_modules(service_only: bool, smart_cache: bool) -> Vec<&'static str> {
    let mut modules = vec![GF_MODULE, GF_MYSQL_DRIVER];
    if !service_only {
        modules.push(HTTP_UTILS_MODULE);
    }
    if smart_cache {
        modules.push(CACHE_MODULE);
    }
    modules
}

/// Read the module path from `<dir>/go.mod`
///
/// # Errors
///
/// Returns an error if `go.mod` is missing or declares no module.
pub fn read_go_module(dir: &Path) -> Result<String> {
    let path = dir.join("go.mod");
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}. Run crudgen from the Go module root", path.display()))?;
    parse_go_module(&text).with_context(|| format!("No module declaration in {}", path.display()))
}

fn parse_go_module(text: &str) -> Option<String> {
    let pattern = Regex::new(r"(?m)^\s*module\s+(\S+)").ok()?;
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|module| module.as_str().trim_matches('"').to_string())
}

/// Drop `,omitempty` from struct tags so zero values still serialize
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn strip_omitempty(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read generated file: {}", path.display()))?;
    fs::write(path, text.replace(",omitempty", ""))
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Tool invocations rooted at the Go module
pub struct Toolchain<'r> {
    runner: &'r dyn CommandRunner,
    root: PathBuf,
}

impl<'r> Toolchain<'r> {
    /// Toolchain running commands in `root`
    #[must_use]
    pub const fn new(runner: &'r dyn CommandRunner, root: PathBuf) -> Self {
        Self { runner, root }
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.runner.run(program, &args, &self.root)
    }

    /// Check that protoc 3 and protoc-gen-go-triple 1 are installed
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing or mismatched tool.
    pub fn check_rpc_tools(&self) -> Result<()> {
        let protoc = self
            .run("protoc", &["--version"])
            .context("protoc is required for RPC tables")?;
        if !protoc.contains("protoc 3.") {
            bail!("protoc 3.x is required for RPC tables, found: {}", protoc.trim());
        }

        let triple = self
            .run("protoc-gen-go-triple", &["--version"])
            .context("protoc-gen-go-triple is required for RPC tables")?;
        if !triple.contains("protoc-gen-go-triple 1.") {
            bail!(
                "protoc-gen-go-triple 1.x is required for RPC tables, found: {}",
                triple.trim()
            );
        }
        Ok(())
    }

    /// Compile `<proto_dir>/<name>.proto` and clean up the generated model
    ///
    /// # Errors
    ///
    /// Returns an error if protoc fails or its output cannot be rewritten.
    pub fn compile_proto(&self, proto_dir: &Path, name: &str, pb_go: &Path) -> Result<()> {
        let include = format!("-I{}", proto_dir.display());
        let file = format!("{name}.proto");
        self.run(
            "protoc",
            &[include.as_str(), "--go_out=.", "--go-triple_out=.", file.as_str()],
        )
        .with_context(|| format!("Failed to compile {file}"))?;
        info!(proto = %file, "protobuf compiled");
        strip_omitempty(pb_go)
    }

    /// Fetch each module with `go get`
    ///
    /// # Errors
    ///
    /// Returns the first failing `go get`.
    pub fn go_get(&self, modules: &[&str]) -> Result<()> {
        for &module in modules {
            self.run("go", &["get", "-v", module])
                .with_context(|| format!("Failed to fetch {module}"))?;
            info!(module, "module fetched");
        }
        Ok(())
    }

    /// Run `go mod tidy`
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn mod_tidy(&self) -> Result<()> {
        self.run("go", &["mod", "tidy"])
            .context("Failed to run go mod tidy")?;
        Ok(())
    }
}
