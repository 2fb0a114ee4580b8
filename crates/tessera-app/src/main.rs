//! The binary entry point for the headless Tessera driver.

use clap::Parser;
use tessera_app::{AppError, Session};
use tessera_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn run(args: CliArgs) -> Result<(), AppError> {
    let config_dir = match args.config.clone() {
        Some(dir) => dir,
        None => default_config_dir()?,
    };
    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(&args);

    tessera_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );
    info!(config_dir = %config_dir.display(), frames = args.frames, "starting tessera");

    let mut session = Session::open(config)?.with_overrides(args.clone());
    session.run(args.frames, Some(&config_dir))?;
    let stats = session.close()?;
    info!(
        frames = stats.frames,
        steps = stats.steps,
        reference_moves = stats.reference_moves,
        created = stats.created,
        evicted = stats.evicted,
        repurposed = stats.repurposed,
        allocations = stats.allocations,
        resident = stats.resident,
        "walk finished"
    );
    Ok(())
}

fn main() {
    if let Err(e) = run(CliArgs::parse()) {
        error!("{e}");
        eprintln!("tessera: {e}");
        std::process::exit(1);
    }
}
