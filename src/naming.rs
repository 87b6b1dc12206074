//! Canonical names for the images and containers an instance uses.

use std::fmt;

/// Repository of the helper image; the chef version is its tag.
pub const CHEF_IMAGE_REPOSITORY: &str = "someara/chef";
pub const DEFAULT_TAG: &str = "latest";

/// An image reference split into repository and tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// Split `repo:tag` on the first colon. A missing or empty tag becomes
    /// `latest`.
    pub fn parse(reference: &str) -> Self {
        let (repository, tag) = split(reference);
        Self::new(repository, tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

pub fn split(reference: &str) -> (&str, &str) {
    match reference.split_once(':') {
        Some((repo, tag)) if !tag.is_empty() => (repo, tag),
        Some((repo, _)) => (repo, DEFAULT_TAG),
        None => (reference, DEFAULT_TAG),
    }
}

pub fn work_image_name(prefix: Option<&str>, instance_name: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}/{instance_name}"),
        _ => instance_name.to_string(),
    }
}

pub fn chef_container_name(chef_version: &str) -> String {
    format!("chef-{chef_version}")
}

pub fn chef_image(chef_version: &str) -> ImageRef {
    ImageRef::new(CHEF_IMAGE_REPOSITORY, chef_version)
}

pub fn data_container_name(instance_name: &str) -> String {
    format!("{instance_name}-data")
}

pub fn runner_container_name(instance_name: &str) -> String {
    instance_name.to_string()
}
