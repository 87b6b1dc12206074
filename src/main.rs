use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kitchen_docker::{Driver, Instance, State, config};

#[derive(Debug, Parser)]
#[command(name = "kitchen-docker", about = "Create or destroy a disposable Docker test instance")]
struct Args {
    /// Driver config (YAML)
    #[arg(long, default_value = ".kitchen-docker.yml")]
    config: PathBuf,

    /// State file kept between `create` and `destroy`
    #[arg(long)]
    state: PathBuf,

    /// Instance name
    #[arg(long)]
    name: String,

    /// Platform name of the instance
    #[arg(long, default_value = "default")]
    platform: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Pull images, build the work image and start the runner container
    Create,
    /// Remove the runner container and the work image
    Destroy,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = config::load(&args.config)?;
    cfg.validate()
        .with_context(|| format!("invalid config in {}", args.config.display()))?;

    let driver: Driver = Driver::new(cfg, Instance::new(args.name, args.platform));
    let mut state = State::load(&args.state)
        .with_context(|| format!("failed to read state from {}", args.state.display()))?;

    match args.action {
        Action::Create => {
            let result = driver.create(&mut state);
            // Persist partial progress too, so a later destroy sees it.
            state
                .save(&args.state)
                .with_context(|| format!("failed to write state to {}", args.state.display()))?;
            result.context("create failed")?;
        }
        Action::Destroy => {
            driver.destroy(&state).context("destroy failed")?;
            if args.state.exists() {
                std::fs::remove_file(&args.state)
                    .with_context(|| format!("failed to remove {}", args.state.display()))?;
            }
        }
    }
    Ok(())
}
