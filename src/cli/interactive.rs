//! Line-driven session that behaves like the converter page: an initial
//! conversion at start, then amount entry, currency selection, swap and
//! convert actions.

use super::terminal::{self, TerminalSink};
use super::ui;
use crate::core::config::AppConfig;
use crate::core::{
    AmountField, ConversionError, ConversionRequest, ConversionWorkflow, CurrencyCode, CurrencySet,
    RateProvider,
};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  <amount>        type into the amount field (digits and one '.')
  amount <text>   same as above
  from <CODE>     select the source currency
  to <CODE>       select the target currency
  swap            swap currencies and convert
  convert         convert (or just press enter)
  help            show this help
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Convert,
    Swap,
    From(String),
    To(String),
    Amount(String),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> SessionCommand {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    match word.to_ascii_lowercase().as_str() {
        "" | "convert" | "c" => SessionCommand::Convert,
        "swap" | "s" => SessionCommand::Swap,
        "from" => SessionCommand::From(rest.to_string()),
        "to" => SessionCommand::To(rest.to_string()),
        "amount" | "a" => SessionCommand::Amount(rest.to_string()),
        "help" | "h" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        _ if line.chars().any(|c| c.is_ascii_digit() || c == '.') => {
            SessionCommand::Amount(line.to_string())
        }
        _ => SessionCommand::Unknown(line.to_string()),
    }
}

/// What the page would hold in its controls.
#[derive(Debug, Clone)]
pub struct Session {
    pub field: AmountField,
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl Session {
    pub fn new(config: &AppConfig, currencies: &CurrencySet) -> Result<Self> {
        Ok(Session {
            field: AmountField::new(&config.defaults.amount),
            source: currencies.resolve(&config.defaults.from)?,
            target: currencies.resolve(&config.defaults.to)?,
        })
    }

    fn request(&mut self) -> Result<ConversionRequest, ConversionError> {
        Ok(ConversionRequest::new(
            self.field.amount()?,
            self.source.clone(),
            self.target.clone(),
        ))
    }
}

pub async fn run(
    config: &AppConfig,
    currencies: &CurrencySet,
    provider: Arc<dyn RateProvider>,
) -> Result<()> {
    let workflow = ConversionWorkflow::new(provider, Arc::new(TerminalSink::new()));
    let stdin = BufReader::new(tokio::io::stdin());
    run_session(config, currencies, &workflow, stdin, &mut std::io::stdout()).await?;
    Ok(())
}

/// Drives a session from `input` until it ends or `quit` is read, returning
/// the final control state. Everything except error messages goes to `out`.
pub async fn run_session<R: AsyncBufRead + Unpin, W: Write>(
    config: &AppConfig,
    currencies: &CurrencySet,
    workflow: &ConversionWorkflow,
    input: R,
    out: &mut W,
) -> Result<Session> {
    let mut session = Session::new(config, currencies)?;
    let flags = config.flags.base_url.as_str();

    writeln!(out, "{}", ui::style_text("Currency Converter", ui::StyleType::Title))?;
    terminal::write_last_updated(out, workflow.last_updated())?;
    writeln!(out, "{}", ui::style_text("Type 'help' for commands.", ui::StyleType::Subtle))?;
    terminal::write_pair(out, currencies, flags, &session.source, &session.target)?;
    convert(workflow, &mut session).await;

    let mut lines = input.lines();
    loop {
        prompt(out)?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match parse_command(&line) {
            SessionCommand::Quit => break,
            SessionCommand::Help => writeln!(out, "{HELP}")?,
            SessionCommand::Convert => convert(workflow, &mut session).await,
            SessionCommand::Swap => {
                terminal::write_pair(out, currencies, flags, &session.target, &session.source)?;
                match session.request() {
                    Ok(request) => {
                        let (swapped, outcome) = workflow.swap(&request).await;
                        session.source = swapped.source;
                        session.target = swapped.target;
                        if let Err(e) = outcome {
                            debug!(error = %e, "Swap conversion did not complete");
                        }
                    }
                    Err(e) => {
                        std::mem::swap(&mut session.source, &mut session.target);
                        report_error(&e);
                    }
                }
            }
            SessionCommand::From(code) => match currencies.resolve(&code) {
                Ok(code) => {
                    session.source = code;
                    terminal::write_pair(out, currencies, flags, &session.source, &session.target)?;
                }
                Err(e) => report_error(&e),
            },
            SessionCommand::To(code) => match currencies.resolve(&code) {
                Ok(code) => {
                    session.target = code;
                    terminal::write_pair(out, currencies, flags, &session.source, &session.target)?;
                }
                Err(e) => report_error(&e),
            },
            SessionCommand::Amount(text) => {
                session.field.set(&text);
                writeln!(
                    out,
                    "{} {}",
                    ui::style_text("Amount:", ui::StyleType::Label),
                    session.field.value()
                )?;
            }
            SessionCommand::Unknown(text) => {
                report_error(&format!("Unknown command '{text}', type 'help'"))
            }
        }
    }

    Ok(session)
}

async fn convert(workflow: &ConversionWorkflow, session: &mut Session) {
    let request = match session.request() {
        Ok(request) => request,
        Err(e) => return report_error(&e),
    };
    if let Err(e) = workflow.convert(&request).await {
        debug!(error = %e, "Conversion did not complete");
    }
}

fn report_error(message: &dyn std::fmt::Display) {
    eprintln!("{}", ui::style_text(&message.to_string(), ui::StyleType::Error));
}

fn prompt<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "> ")?;
    out.flush().context("Failed to flush output")
}
