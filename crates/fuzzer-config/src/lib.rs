//! Configuration parsing, profile resolution, and CLI-flag overlay
//! (spec §6 "External Interfaces" / §9). Listed among the core spec's
//! opaque external collaborators, but implemented fully here as the
//! ambient stack every complete binary needs.

mod cli;
mod client;
mod config;
mod error;
mod host_tag;
mod verbosity;

pub use cli::CliArgs;
pub use client::{ClientKind, ClientSpec};
pub use config::{CodegenEngine, Config};
pub use error::ConfigError;
pub use host_tag::host_tag;
pub use verbosity::Verbosity;
