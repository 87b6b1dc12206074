// Instance lifecycle — provisioning and teardown over an `Engine`.

mod create;
mod destroy;
pub mod dockerfile;
mod state;

use std::sync::OnceLock;

use tracing::debug;

use crate::config::{Config, Instance};
use crate::docker::{Connect, DockerCli, EngineError, EngineResult};
use crate::naming;
use crate::retry::with_retries;

pub use state::State;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pid_one_command: {0}")]
    Command(#[from] shell_words::ParseError),

    #[error("invalid state record: {0}")]
    State(#[from] serde_json::Error),
}

/// Drives one instance's containers. The engine is connected on first use
/// and reused for every later call.
pub struct Driver<E = DockerCli> {
    config: Config,
    instance: Instance,
    engine: OnceLock<E>,
}

impl<E: Connect> Driver<E> {
    pub fn new(config: Config, instance: Instance) -> Self {
        Self {
            config,
            instance,
            engine: OnceLock::new(),
        }
    }

    /// Use an already constructed engine instead of connecting lazily.
    pub fn with_engine(config: Config, instance: Instance, engine: E) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(engine);
        Self {
            config,
            instance,
            engine: cell,
        }
    }

    pub fn engine(&self) -> &E {
        self.engine.get_or_init(|| {
            let conn = self.config.connection();
            debug!(host = %conn.host, "connecting to container engine");
            E::connect(&conn)
        })
    }

    /// Work image for this instance: the recorded one if the state already
    /// has it, otherwise derived from the prefix and instance name.
    pub fn work_image(&self, state: &State) -> String {
        state.work_image.clone().unwrap_or_else(|| {
            naming::work_image_name(self.config.image_prefix.as_deref(), &self.instance.name)
        })
    }

    fn retry<T>(&self, what: &str, mut op: impl FnMut(&E) -> EngineResult<T>) -> EngineResult<T> {
        let engine = self.engine();
        with_retries(self.config.api_retries, what, || op(engine))
    }
}
