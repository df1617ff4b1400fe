//! Core conversion logic, independent of any terminal or network

pub mod amount;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod log;
pub mod workflow;

// Re-export main types for cleaner imports
pub use amount::{Amount, AmountField, sanitize_amount_input};
pub use conversion::{ConversionDisplay, ConversionError, ConversionRequest, ConversionResult};
pub use currency::{CurrencyCode, CurrencyInfo, CurrencySet, RateProvider};
pub use workflow::{ConversionWorkflow, Phase, PresentationSink, WorkflowState};
