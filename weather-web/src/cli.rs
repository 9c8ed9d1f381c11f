use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use weather_core::Config;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-web",
    version,
    about = "Current weather and forecasts for your saved locations"
)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server.
    Serve {
        /// Listen address, e.g. "127.0.0.1:3000". Overrides the config file.
        #[arg(long)]
        bind: Option<String>,

        /// Keep the location list in memory only.
        #[arg(long)]
        in_memory: bool,
    },

    /// Configure service credentials and storage interactively.
    Configure,

    /// Print the effective configuration (secrets masked).
    ShowConfig,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Serve { bind, in_memory } => {
                let mut config = load_effective(&path)?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                weather_web::start_web_server(config, in_memory).await
            }
            Command::Configure => configure(&path),
            Command::ShowConfig => {
                let config = load_effective(&path)?;
                let toml = toml::to_string_pretty(&config.redacted())
                    .context("Failed to serialize configuration to TOML")?;
                println!("# {}", path.display());
                print!("{toml}");
                Ok(())
            }
        }
    }
}

fn load_effective(path: &Path) -> anyhow::Result<Config> {
    let mut config = Config::load_from(path)?;
    config.apply_env()?;
    Ok(config)
}

fn optional(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Prompt for each setting, starting from what is already on disk.
fn configure(path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;

    let username = Text::new("GeoNames username:")
        .with_initial_value(config.geonames.username.as_deref().unwrap_or_default())
        .with_help_message("Register for free at https://www.geonames.org/login")
        .prompt()?;
    config.geonames.username = optional(username);

    let base_url = Text::new("Weather service URL:")
        .with_initial_value(config.weather.base_url.as_deref().unwrap_or_default())
        .with_help_message("Base URL of the Weather Company data service")
        .prompt()?;
    config.weather.base_url = optional(base_url);

    let weather_user = Text::new("Weather service username (optional):")
        .with_initial_value(config.weather.username.as_deref().unwrap_or_default())
        .prompt()?;
    config.weather.username = optional(weather_user);

    if config.weather.username.is_some() {
        let password = Password::new("Weather service password:")
            .without_confirmation()
            .prompt_skippable()?;
        if let Some(password) = password.and_then(optional) {
            config.weather.password = Some(password);
        }
    } else {
        config.weather.password = None;
    }

    let default_store = config.store_path()?;
    let store_path = Text::new("Location store file:")
        .with_default(&default_store.display().to_string())
        .prompt()?;
    config.store.path = optional(store_path).map(PathBuf::from);

    config.save_to(path)?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
