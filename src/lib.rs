pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::convert::ConvertOptions;
use crate::core::RateProvider;
use crate::core::config::AppConfig;
use crate::providers::OpenErApiProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert(ConvertOptions),
    Currencies,
    Interactive,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let currencies = config.load_currencies()?;

    match command {
        AppCommand::Currencies => {
            cli::currencies::run(&currencies, &config.flags.base_url);
            Ok(())
        }
        AppCommand::Convert(options) => {
            let provider = rate_provider(&config)?;
            cli::convert::run(&config, &currencies, provider, &options).await
        }
        AppCommand::Interactive => {
            let provider = rate_provider(&config)?;
            cli::interactive::run(&config, &currencies, provider).await
        }
    }
}

fn rate_provider(config: &AppConfig) -> Result<Arc<dyn RateProvider>> {
    let provider =
        OpenErApiProvider::new(config.rate_api_base_url(), config.rate_api_timeout())?;
    Ok(Arc::new(provider))
}
