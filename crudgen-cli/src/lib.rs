//! crudgen CLI library
//!
//! Everything behind the `crudgen` binary: the MySQL importer that writes
//! table definition documents, the renderer and writer that turn resolved
//! tables into Go and Vue sources, and the external tools run around them.
//!
//! # Example
//!
//! ```rust,no_run
//! use crudgen::config::CrudgenConfig;
//! use crudgen_cli::generator::Generator;
//! use crudgen_cli::toolchain::{read_go_module, SystemRunner};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = CrudgenConfig::load()?;
//! let root = std::env::current_dir()?;
//! let go_module = read_go_module(&root)?;
//!
//! let generator = Generator::new(root, config.generate, go_module, &SystemRunner)?;
//! for report in generator.generate_all()? {
//!     println!("{}: {} files", report.table, report.written.len());
//! }
//! generator.finish()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod database;
pub mod generator;
pub mod importer;
pub mod menu;
pub mod observability;
pub mod render;
pub mod toolchain;
pub mod writer;

pub use generator::{select_tables, Generator, TableReport};
pub use importer::Importer;
pub use render::{ArtifactKind, Renderer};
pub use writer::{GeneratedFile, Layout, WriteOutcome};
