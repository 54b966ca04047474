//! Container Host Adapter (spec §4.A): starting/stopping long-lived
//! client daemons and running execs inside them.

mod error;
mod host;

pub use error::ContainerError;
pub use host::{ContainerHost, DockerHost, ExecHandle};
