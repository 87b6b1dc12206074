//! Integration tests against a real Docker daemon.
//!
//! These pull images and create containers, so they are marked `#[ignore]`.
//! Run with: `cargo test -- --ignored`

use kitchen_docker::docker::{Connect, DockerCli, Engine};
use kitchen_docker::naming::{self, ImageRef};
use kitchen_docker::{Config, Driver, Instance, State};

fn engine() -> DockerCli {
    DockerCli::connect(&Config::default().connection())
}

/// Unique per test run so parallel runs don't collide.
fn instance_name(tag: &str) -> String {
    format!("kd-{tag}-{}", std::process::id())
}

#[test]
#[ignore]
fn missing_objects_are_reported_as_absent() {
    let engine = engine();
    assert!(!engine.image_exists("kitchen-docker/does-not-exist:never").unwrap());
    assert!(engine.get_container("kitchen-docker-no-such-container").unwrap().is_none());
}

#[test]
#[ignore]
fn pull_then_inspect_busybox() {
    let engine = engine();
    engine.pull_image(&ImageRef::parse("busybox")).unwrap();
    assert!(engine.image_exists("busybox:latest").unwrap());
}

#[test]
#[ignore]
fn create_and_destroy_busybox_instance() {
    let name = instance_name("busybox");
    let chef_version = instance_name("chef");

    // Stand busybox in for the helper image so the test needs no registry
    // access beyond busybox itself.
    let engine = engine();
    engine.pull_image(&ImageRef::parse("busybox")).unwrap();
    let chef_image = naming::chef_image(&chef_version);
    engine.tag_image("busybox:latest", &chef_image).unwrap();

    let cfg = Config {
        chef_version: chef_version.clone(),
        image: "busybox:latest".into(),
        data_image: "busybox:latest".into(),
        pid_one_command: "sh -c 'trap exit 0 TERM; while :; do sleep 1; done'".into(),
        image_prefix: Some("kitchen-docker-test".into()),
        api_retries: 2,
        remove_data_container: true,
        ..Config::default()
    };
    let driver: Driver = Driver::new(cfg, Instance::new(name.clone(), "busybox"));
    let mut state = State::default();

    let created = driver.create(&mut state);
    // Clean up even when create fails half way.
    let destroyed = driver.destroy(&state);

    // The chef container outlives destroy by design; remove it by hand.
    let chef = naming::chef_container_name(&chef_version);
    let _ = driver.remove_container(&chef);
    let _ = engine.delete_image(&chef_image.to_string(), true);

    created.unwrap();
    destroyed.unwrap();

    let work_image = format!("kitchen-docker-test/{name}");
    assert_eq!(state.work_image.as_deref(), Some(work_image.as_str()));
    assert!(state.runner_container.is_some());
    assert!(state.chef_container.is_some());

    assert!(engine.get_container(&name).unwrap().is_none());
    assert!(!engine.image_exists(&format!("{work_image}:latest")).unwrap());
}
