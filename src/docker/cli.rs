use std::path::Path;
use std::time::Duration;

use tracing::debug;

use super::engine::{Connect, Engine, EngineResult};
use super::error::EngineError;
use super::run;
use super::types::{Connection, Container, ContainerSpec};
use crate::naming::ImageRef;

/// [`Engine`] backed by the `docker` executable, pointed at one daemon.
#[derive(Debug, Clone)]
pub struct DockerCli {
    conn: Connection,
    program: String,
}

impl DockerCli {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            program: "docker".to_string(),
        }
    }

    /// Use a different client executable (e.g. `podman`, or a full path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Flags selecting the daemon, prepended to every invocation.
    fn global_args(&self) -> Vec<String> {
        let mut args = vec!["-H".to_string(), self.conn.host.clone()];
        let tls = &self.conn.tls;
        if tls.verify {
            args.push("--tlsverify".into());
        } else if tls.cert_path.is_some() {
            args.push("--tls".into());
        }
        if let Some(dir) = &tls.cert_path {
            for (flag, file) in [
                ("--tlscacert", "ca.pem"),
                ("--tlscert", "cert.pem"),
                ("--tlskey", "key.pem"),
            ] {
                args.push(flag.into());
                args.push(dir.join(file).display().to_string());
            }
        }
        args
    }

    fn invoke(&self, args: Vec<String>, timeout: Duration) -> EngineResult<String> {
        let mut full = self.global_args();
        full.extend(args);
        debug!(program = %self.program, args = ?full, "engine call");

        let out = run::run(&self.program, &full, timeout)?;
        if out.success {
            Ok(out.stdout)
        } else if out.stderr.trim().is_empty() {
            Err(EngineError::Request(format!(
                "{} exited with {:?}",
                self.program, out.exit_code
            )))
        } else {
            Err(EngineError::from_stderr(&out.stderr))
        }
    }

    fn read(&self, args: Vec<String>) -> EngineResult<String> {
        self.invoke(args, self.conn.read_timeout)
    }

    fn write(&self, args: Vec<String>) -> EngineResult<String> {
        self.invoke(args, self.conn.write_timeout)
    }

    fn inspect_container(&self, name_or_id: &str) -> EngineResult<Container> {
        let stdout = self.read(strings(["container", "inspect", name_or_id]))?;
        let raw: serde_json::Value = serde_json::from_str(&stdout)
            .map_err(|e| EngineError::UnexpectedResponse(format!("container inspect: {e}")))?;
        Container::from_inspect(raw)
    }
}

impl Connect for DockerCli {
    fn connect(conn: &Connection) -> Self {
        Self::new(conn.clone())
    }
}

impl Engine for DockerCli {
    fn image_exists(&self, reference: &str) -> EngineResult<bool> {
        match self.read(strings(["image", "inspect", "--format", "{{.Id}}", reference])) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn pull_image(&self, image: &ImageRef) -> EngineResult<()> {
        self.write(strings(["pull", &image.to_string()]))?;
        Ok(())
    }

    fn build_image(&self, context: &Path) -> EngineResult<String> {
        let stdout = self.write(vec![
            "build".into(),
            "--no-cache".into(),
            "--rm=true".into(),
            "--force-rm".into(),
            "--quiet".into(),
            context.display().to_string(),
        ])?;
        stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or_else(|| EngineError::UnexpectedResponse("build printed no image id".into()))
    }

    fn tag_image(&self, id: &str, image: &ImageRef) -> EngineResult<()> {
        self.write(strings(["tag", id, &image.to_string()]))?;
        Ok(())
    }

    fn delete_image(&self, reference: &str, force: bool) -> EngineResult<()> {
        let mut args = strings(["rmi"]);
        if force {
            args.push("--force".into());
        }
        args.push(reference.into());
        self.write(args)?;
        Ok(())
    }

    fn create_container(&self, spec: &ContainerSpec) -> EngineResult<Container> {
        let stdout = self.write(create_args(spec))?;
        let id = stdout.trim();
        if id.is_empty() {
            return Err(EngineError::UnexpectedResponse(
                "create printed no container id".into(),
            ));
        }
        self.inspect_container(id)
    }

    fn get_container(&self, name: &str) -> EngineResult<Option<Container>> {
        match self.inspect_container(name) {
            Ok(c) => Ok(Some(c)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn start_container(&self, id: &str) -> EngineResult<()> {
        self.write(strings(["start", id]))?;
        Ok(())
    }

    fn stop_container(&self, id: &str, force: bool) -> EngineResult<()> {
        let mut args = strings(["stop"]);
        if force {
            args.extend(strings(["--time", "0"]));
        }
        args.push(id.into());
        self.write(args)?;
        Ok(())
    }

    fn delete_container(&self, id: &str, force: bool, volumes: bool) -> EngineResult<()> {
        let mut args = strings(["rm"]);
        if force {
            args.push("--force".into());
        }
        if volumes {
            args.push("--volumes".into());
        }
        args.push(id.into());
        self.write(args)?;
        Ok(())
    }
}

/// Argument vector for `docker create` from a container spec.
pub fn create_args(spec: &ContainerSpec) -> Vec<String> {
    let hc = &spec.host_config;
    let mut args = strings(["create", "--name", &spec.name]);
    if hc.privileged {
        args.push("--privileged".into());
    }
    for source in &hc.volumes_from {
        args.push("--volumes-from".into());
        args.push(source.clone());
    }
    for (container_port, bindings) in &hc.port_bindings {
        for binding in bindings {
            args.push("--publish".into());
            if binding.host_port.is_empty() {
                args.push(container_port.clone());
            } else {
                args.push(format!("{}:{container_port}", binding.host_port));
            }
        }
    }
    if hc.publish_all_ports {
        args.push("--publish-all".into());
    }
    args.push(spec.image.clone());
    args.extend(spec.cmd.iter().cloned());
    args
}

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
