use tracing::{info, warn};

use super::{Driver, Error, State, dockerfile};
use crate::docker::{Connect, Container, ContainerSpec, EngineResult, PortBinding};
use crate::naming::{self, ImageRef};

/// Port the data container exposes to the host.
pub const DATA_PORT: &str = "22/tcp";

impl<E: Connect> Driver<E> {
    /// Provision the instance, recording what was created in `state`.
    ///
    /// Steps run in a fixed order and each is safe to repeat. The first
    /// failing step aborts the rest; the chef container step only logs
    /// unless `strict_chef_container` is set.
    pub fn create(&self, state: &mut State) -> Result<(), Error> {
        info!(instance = %self.instance.name, "creating instance");

        self.pull_platform_image()?;
        self.pull_chef_image()?;
        self.ensure_chef_container(state)?;
        self.ensure_data_image()?;
        self.ensure_data_container(state)?;
        self.build_work_image(state)?;
        self.ensure_runner_container(state)?;
        self.record_identity(state);

        info!(instance = %self.instance.name, "instance created");
        Ok(())
    }

    pub fn pull_platform_image(&self) -> Result<(), Error> {
        self.pull_if_missing(&ImageRef::parse(&self.config.image))
    }

    pub fn pull_chef_image(&self) -> Result<(), Error> {
        self.pull_if_missing(&naming::chef_image(&self.config.chef_version))
    }

    pub fn ensure_chef_container(&self, state: &mut State) -> Result<(), Error> {
        let name = naming::chef_container_name(&self.config.chef_version);
        match self.chef_container(&name) {
            Ok(container) => {
                state.chef_container = Some(container.raw);
                Ok(())
            }
            Err(e) if self.config.strict_chef_container => Err(e.into()),
            Err(e) => {
                warn!(container = %name, error = %e, "could not ensure chef container, continuing");
                Ok(())
            }
        }
    }

    pub fn ensure_data_image(&self) -> Result<(), Error> {
        self.pull_if_missing(&ImageRef::parse(&self.config.data_image))
    }

    pub fn ensure_data_container(&self, state: &mut State) -> Result<(), Error> {
        let mut spec = ContainerSpec::new(
            naming::data_container_name(&self.instance.name),
            ImageRef::parse(&self.config.data_image).to_string(),
            Vec::new(),
        );
        spec.host_config
            .port_bindings
            .insert(DATA_PORT.to_string(), vec![PortBinding::default()]);
        spec.host_config.publish_all_ports = true;

        let container = self.ensure_started(&spec)?;
        state.data_container = Some(container.raw);
        Ok(())
    }

    /// Build and tag the work image unless it already exists.
    pub fn build_work_image(&self, state: &mut State) -> Result<(), Error> {
        let work_image = self.work_image(state);
        let target = ImageRef::parse(&work_image);

        if self.retry("inspect image", |eng| eng.image_exists(&target.to_string()))? {
            info!(image = %target, "work image already exists, skipping build");
            state.work_image = Some(work_image);
            return Ok(());
        }

        let context = dockerfile::write_context(
            &self.instance.name,
            &self.config.image,
            &self.config.intermediate_instructions,
        )?;
        info!(image = %target, context = %context.path().display(), "building work image");
        let id = self.retry("build image", |eng| eng.build_image(context.path()))?;
        self.retry("tag image", |eng| eng.tag_image(&id, &target))?;

        state.work_image = Some(work_image);
        Ok(())
    }

    pub fn ensure_runner_container(&self, state: &mut State) -> Result<(), Error> {
        let name = &self.instance.name;
        let cmd = shell_words::split(&self.config.pid_one_command)?;
        let image = ImageRef::parse(&self.work_image(state));

        let mut spec = ContainerSpec::new(naming::runner_container_name(name), image.to_string(), cmd);
        spec.host_config.privileged = self.config.privileged;
        spec.host_config.volumes_from = vec![
            naming::chef_container_name(&self.config.chef_version),
            naming::data_container_name(name),
        ];

        let container = self.ensure_started(&spec)?;
        state.runner_container = Some(container.raw);
        Ok(())
    }

    pub fn record_identity(&self, state: &mut State) {
        state.platform_image = Some(self.config.image.clone());
        state.instance_name = Some(self.instance.name.clone());
        state.instance_platform_name = Some(self.instance.platform_name.clone());
        state.image_prefix = self.config.image_prefix.clone();
    }

    fn pull_if_missing(&self, image: &ImageRef) -> Result<(), Error> {
        let reference = image.to_string();
        if self.retry("inspect image", |eng| eng.image_exists(&reference))? {
            return Ok(());
        }
        info!(image = %reference, "pulling image");
        self.retry("pull image", |eng| eng.pull_image(image))?;
        Ok(())
    }

    fn chef_container(&self, name: &str) -> EngineResult<Container> {
        if let Some(existing) = self.retry("inspect container", |eng| eng.get_container(name))? {
            return Ok(existing);
        }
        let image = naming::chef_image(&self.config.chef_version);
        let spec = ContainerSpec::new(name, image.to_string(), vec!["true".to_string()]);
        self.create_or_fetch(&spec)
    }

    /// Look the container up by name, create it if absent, then start it.
    fn ensure_started(&self, spec: &ContainerSpec) -> EngineResult<Container> {
        let container = match self.retry("inspect container", |eng| eng.get_container(&spec.name))? {
            Some(existing) => {
                info!(container = %spec.name, "container already exists");
                existing
            }
            None => self.create_or_fetch(spec)?,
        };

        self.retry("start container", |eng| eng.start_container(&container.id))?;

        // Published ports are only assigned once the container runs.
        let started = self.retry("inspect container", |eng| eng.get_container(&spec.name))?;
        Ok(started.unwrap_or(container))
    }

    /// Create the container; if the name was taken in the meantime, use the
    /// container that holds it.
    fn create_or_fetch(&self, spec: &ContainerSpec) -> EngineResult<Container> {
        info!(container = %spec.name, image = %spec.image, "creating container");
        match self.retry("create container", |eng| eng.create_container(spec)) {
            Ok(container) => Ok(container),
            Err(e) if e.is_conflict() => {
                info!(container = %spec.name, "container was created concurrently, using it");
                self.retry("inspect container", |eng| eng.get_container(&spec.name))?
                    .ok_or(e)
            }
            Err(e) => Err(e),
        }
    }
}
