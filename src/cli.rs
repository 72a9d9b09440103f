use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{Overrides, ScalePolicy, Tuning, STACK_KEY, TOKEN_KEY, URL_KEY};

/// Terminal control panel for a Docker stack managed by Portainer.
#[derive(Parser, Debug)]
#[command(name = "stackpanel", version, about)]
pub struct Cli {
    /// Environment file holding PORTAINER_URL, PORTAINER_TOKEN and STACK_NAME.
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Portainer base URL, e.g. https://portainer.example.com
    #[arg(long, env = URL_KEY)]
    pub url: Option<String>,

    /// Portainer access token.
    #[arg(long, env = TOKEN_KEY, hide_env_values = true)]
    pub token: Option<String>,

    /// Stack to control, or ALL for every stack.
    #[arg(long, env = STACK_KEY)]
    pub stack: Option<String>,

    /// Seconds between automatic status refreshes.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_secs: u64,

    /// Number of log lines fetched per container.
    #[arg(long, default_value_t = 100)]
    pub log_tail: u32,

    /// Where diagnostics are written; the terminal belongs to the UI.
    #[arg(long, default_value = "stackpanel.log")]
    pub log_file: PathBuf,

    /// Fail a Swarm start/stop at the first service that cannot be scaled.
    #[arg(long)]
    pub all_or_nothing: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            token: self.token.clone(),
            stack: self.stack.clone(),
        }
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            refresh_period: Duration::from_secs(self.refresh_secs),
            log_tail: self.log_tail,
            scale_policy: if self.all_or_nothing {
                ScalePolicy::AllOrNothing
            } else {
                ScalePolicy::BestEffort
            },
            ..Tuning::default()
        }
    }
}
