use std::path::Path;

use tempfile::TempDir;

/// Instruction stamped into every work image.
pub const MARKER: &str = r#"RUN /bin/sh -c "echo Built with Test Kitchen""#;
pub const FILE_NAME: &str = "Dockerfile";

/// Contents of the work-image Dockerfile layered on `platform_image`.
pub fn render(platform_image: &str, extra: &[String]) -> String {
    let mut lines = Vec::with_capacity(extra.len() + 2);
    lines.push(format!("FROM {platform_image}"));
    lines.push(MARKER.to_string());
    lines.extend(extra.iter().cloned());
    lines.join("\n")
}

/// Create a fresh build context for `instance_name` holding only the
/// Dockerfile. The directory is removed when the returned handle drops.
pub fn write_context(
    instance_name: &str,
    platform_image: &str,
    extra: &[String],
) -> std::io::Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix(&format!("{instance_name}-build-"))
        .tempdir()?;
    write_file(dir.path(), platform_image, extra)?;
    Ok(dir)
}

fn write_file(dir: &Path, platform_image: &str, extra: &[String]) -> std::io::Result<()> {
    let mut contents = render(platform_image, extra);
    contents.push('\n');
    std::fs::write(dir.join(FILE_NAME), contents)
}
