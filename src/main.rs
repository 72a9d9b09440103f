use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{error, info};

use stackpanel::app;
use stackpanel::cli::Cli;
use stackpanel::config::Config;
use stackpanel::orchestrator::Panel;
use stackpanel::portainer::PortainerClient;

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let _log_guard = stackpanel::logging::init(&cli.log_file)?;

    let tuning = cli.tuning();
    let config = match Config::load(&cli.env_file, &cli.overrides(), tuning.clone()) {
        Ok(config) => config,
        Err(e) => {
            // The panel still starts so the error can be shown; every action stays disabled.
            error!(error = %e, "configuration failed to load");
            Config::errored(&e, tuning)
        }
    };

    let client = PortainerClient::new(&config.base_url, &config.token, config.tuning.request_timeout)
        .map_err(io::Error::other)?;
    let panel = Panel::new(config, Arc::new(client));

    let should_quit = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&should_quit))?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&should_quit))?;

    info!("starting");
    let result = app::run(panel, should_quit);
    app::restore_terminal();
    if let Err(ref e) = result {
        error!(error = %e, "terminal loop failed");
    }
    result
}
