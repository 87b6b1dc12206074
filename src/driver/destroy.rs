use tracing::{debug, info};

use super::{Driver, Error, State};
use crate::docker::{Connect, EngineResult};
use crate::naming::{self, ImageRef};

impl<E: Connect> Driver<E> {
    /// Remove the runner container and the work image.
    ///
    /// The chef container is always left for later runs, and so is the data
    /// container unless `remove_data_container` is set. Missing containers
    /// and images are skipped.
    pub fn destroy(&self, state: &State) -> Result<(), Error> {
        info!(instance = %self.instance.name, "destroying instance");

        let data = naming::data_container_name(&self.instance.name);
        if self.config.remove_data_container {
            self.remove_container(&data)?;
        } else {
            debug!(container = %data, "keeping data container");
        }
        self.remove_container(&naming::runner_container_name(&self.instance.name))?;
        self.remove_work_image(state)?;

        info!(instance = %self.instance.name, "instance destroyed");
        Ok(())
    }

    /// Stop and delete a container by name. Returns whether it existed.
    pub fn remove_container(&self, name: &str) -> Result<bool, Error> {
        let Some(container) = self.retry("inspect container", |eng| eng.get_container(name))? else {
            info!(container = %name, "container not found, nothing to remove");
            return Ok(false);
        };

        ignore_missing(self.retry("stop container", |eng| eng.stop_container(&container.id, true)))?;
        ignore_missing(self.retry("delete container", |eng| {
            eng.delete_container(&container.id, true, true)
        }))?;
        info!(container = %name, "container removed");
        Ok(true)
    }

    /// Delete the work image if present. Returns whether it existed.
    pub fn remove_work_image(&self, state: &State) -> Result<bool, Error> {
        let image = ImageRef::parse(&self.work_image(state)).to_string();
        if !self.retry("inspect image", |eng| eng.image_exists(&image))? {
            debug!(image = %image, "work image not present");
            return Ok(false);
        }
        ignore_missing(self.retry("delete image", |eng| eng.delete_image(&image, true)))?;
        info!(image = %image, "work image removed");
        Ok(true)
    }
}

/// Something else removing the object between our lookup and the call is
/// as good as success.
fn ignore_missing(result: EngineResult<()>) -> EngineResult<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}
