mod loader;
mod types;

pub use loader::load;
pub use types::{Config, DEFAULT_DOCKER_HOST, DEFAULT_PID_ONE_COMMAND, Instance, TlsConfig};
