// Container-engine access — the `Engine` seam and its `docker` CLI binding.

pub mod cli;
pub mod engine;
pub mod error;
pub mod run;
pub mod types;

pub use cli::DockerCli;
pub use engine::{Connect, Engine, EngineResult};
pub use error::EngineError;
pub use types::{Connection, Container, ContainerSpec, HostConfig, PortBinding};
