use clap::Parser;
use color_eyre::Result;
use std::io::IsTerminal;
use taskdeck::{Config, Dashboard, Profile, Store, cli::Cli, utils};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    // An explicit --config file wins over the profile's config
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(seed) = cli.seed {
        config.seed_path = Some(seed);
    }

    // RUST_LOG overrides the configured filter; logs go to stderr so output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // The store lives in memory only, so every run starts from the seed data
    let seed = config.load_seed()?;
    let store = Store::seeded(&seed, config.latency())?;
    let mut dashboard = Dashboard::new(store, config.default_view());
    dashboard.load().await?;

    let styled = !cli.plain && std::io::stdout().is_terminal();
    let command = cli.command.unwrap_or_default();
    let output = taskdeck::cli::run_command(command, &mut dashboard, utils::today(), styled).await?;
    print!("{}", output);

    Ok(())
}
