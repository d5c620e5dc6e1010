use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use treebomb::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "treebomb",
    version = "0.1.0",
    about = "Grow a commit history whose checkout explodes",
    long_about = "Stacks 32 levels of 16-way fan-out trees on top of the checked-out branch \
    of an existing git repository. Each level adds one tree and one commit to the object \
    store, while the files a checkout would create grow sixteenfold per level.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(index = 1, help = "Path to the repository (defaults to the current directory)")]
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let mut repository = Repository::new(&path, Box::new(std::io::stdout()))?;
    repository.plant_bomb()?;

    Ok(())
}
