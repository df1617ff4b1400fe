use super::ui;
use crate::core::{ConversionDisplay, CurrencyCode, CurrencySet, PresentationSink};
use chrono::NaiveDate;
use indicatif::ProgressBar;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Renders the workflow on the terminal: a spinner while busy, the rate and
/// result lines, and notices on stderr.
#[derive(Default)]
pub struct TerminalSink {
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for TerminalSink {
    fn set_busy(&self, busy: bool) {
        let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        if busy {
            if spinner.is_none() {
                *spinner = Some(ui::new_spinner("Converting..."));
            }
        } else if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn show_conversion(&self, display: &ConversionDisplay) {
        println!(
            "{} {}",
            ui::style_text("Exchange rate:", ui::StyleType::Label),
            ui::style_text(&display.rate_text, ui::StyleType::Value)
        );
        println!(
            "{}",
            ui::style_text(&display.result_text, ui::StyleType::Result)
        );
    }

    fn notify(&self, message: &str) {
        eprintln!("{}", ui::style_text(message, ui::StyleType::Error));
    }
}

/// One line per side of the pair: code, name and flag image.
pub fn write_pair<W: Write>(
    out: &mut W,
    currencies: &CurrencySet,
    flags_base_url: &str,
    source: &CurrencyCode,
    target: &CurrencyCode,
) -> io::Result<()> {
    for (label, code) in [("From", source), ("To", target)] {
        let flag = currencies
            .flag_url(code, flags_base_url)
            .unwrap_or_default();
        writeln!(
            out,
            "{} {} - {} {}",
            ui::style_text(&format!("{label:>4}:"), ui::StyleType::Label),
            code,
            currencies.name_of(code),
            ui::style_text(&flag, ui::StyleType::Subtle)
        )?;
    }
    Ok(())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn write_last_updated<W: Write>(out: &mut W, date: NaiveDate) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        ui::style_text(
            &format!("Last updated: {}", format_date(date)),
            ui::StyleType::Subtle
        )
    )
}
