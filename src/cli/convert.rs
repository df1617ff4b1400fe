use super::terminal::{self, TerminalSink};
use crate::core::config::AppConfig;
use crate::core::{AmountField, ConversionRequest, ConversionWorkflow, CurrencySet, RateProvider};
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Command-line values; anything missing comes from the config defaults.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub swap: bool,
}

/// Runs a single conversion and prints it.
pub async fn run(
    config: &AppConfig,
    currencies: &CurrencySet,
    provider: Arc<dyn RateProvider>,
    options: &ConvertOptions,
) -> Result<()> {
    let request = build_request(config, currencies, options)?;
    debug!(?request, "Converting");

    let workflow = ConversionWorkflow::new(provider, Arc::new(TerminalSink::new()));
    report(
        &workflow,
        currencies,
        &config.flags.base_url,
        &request,
        options.swap,
        &mut std::io::stdout(),
    )
    .await
}

/// Prints the pair, converts (or swaps and converts), then prints the
/// last-updated line. The date is written whether or not the rate arrived.
async fn report<W: Write>(
    workflow: &ConversionWorkflow,
    currencies: &CurrencySet,
    flags_base_url: &str,
    request: &ConversionRequest,
    swap: bool,
    out: &mut W,
) -> Result<()> {
    let outcome = if swap {
        terminal::write_pair(out, currencies, flags_base_url, &request.target, &request.source)?;
        workflow.swap(request).await.1
    } else {
        terminal::write_pair(out, currencies, flags_base_url, &request.source, &request.target)?;
        workflow.convert(request).await
    };

    terminal::write_last_updated(out, workflow.last_updated())?;
    outcome?;
    Ok(())
}

pub fn build_request(
    config: &AppConfig,
    currencies: &CurrencySet,
    options: &ConvertOptions,
) -> Result<ConversionRequest> {
    let mut field = AmountField::new(
        options
            .amount
            .as_deref()
            .unwrap_or(&config.defaults.amount),
    );
    let source = currencies.resolve(options.from.as_deref().unwrap_or(&config.defaults.from))?;
    let target = currencies.resolve(options.to.as_deref().unwrap_or(&config.defaults.to))?;
    Ok(ConversionRequest::new(field.amount()?, source, target))
}
