use std::path::Path;

use super::error::EngineError;
use super::types::{Connection, Container, ContainerSpec};
use crate::naming::ImageRef;

pub type EngineResult<T> = Result<T, EngineError>;

/// Primitive container-engine operations the driver is built on.
///
/// Lookups return `Ok(None)` for "does not exist"; `Err` is reserved for
/// failures, so callers can branch on absence without inspecting errors.
pub trait Engine {
    fn image_exists(&self, reference: &str) -> EngineResult<bool>;

    fn pull_image(&self, image: &ImageRef) -> EngineResult<()>;

    /// Build the context directory without cache, removing intermediate
    /// containers. Returns the new image id.
    fn build_image(&self, context: &Path) -> EngineResult<String>;

    fn tag_image(&self, id: &str, image: &ImageRef) -> EngineResult<()>;

    fn delete_image(&self, reference: &str, force: bool) -> EngineResult<()>;

    fn create_container(&self, spec: &ContainerSpec) -> EngineResult<Container>;

    fn get_container(&self, name: &str) -> EngineResult<Option<Container>>;

    fn start_container(&self, id: &str) -> EngineResult<()>;

    fn stop_container(&self, id: &str, force: bool) -> EngineResult<()>;

    fn delete_container(&self, id: &str, force: bool, volumes: bool) -> EngineResult<()>;

    fn container_exists(&self, name: &str) -> EngineResult<bool> {
        self.get_container(name).map(|c| c.is_some())
    }
}

/// Engines that can be constructed from connection parameters.
pub trait Connect: Engine + Sized {
    fn connect(conn: &Connection) -> Self;
}
