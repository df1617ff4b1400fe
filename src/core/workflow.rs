//! The conversion workflow: validates nothing it does not have to, asks the
//! rate provider, computes, and drives the presentation.
//!
//! The workflow moves through `Idle -> Loading -> Idle | Error`. Only one
//! conversion may be in flight; a trigger that arrives while `Loading` is
//! rejected with [`ConversionError::Busy`] and leaves everything untouched,
//! so a late response can never overwrite a newer one.

use crate::core::conversion::{
    ConversionDisplay, ConversionError, ConversionRequest, ConversionResult,
};
use crate::core::currency::RateProvider;
use chrono::{Local, NaiveDate};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

/// Where the workflow sends everything the user should see.
pub trait PresentationSink: Send + Sync {
    /// Toggles the in-flight indicator (disabled trigger, progress text).
    fn set_busy(&self, busy: bool);
    fn show_conversion(&self, display: &ConversionDisplay);
    /// Raised once per failed conversion.
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    pub phase: Phase,
    /// Last successfully displayed conversion.
    pub displayed: Option<ConversionDisplay>,
    /// Stamped once when the workflow is created.
    pub last_updated: NaiveDate,
}

pub struct ConversionWorkflow {
    provider: Arc<dyn RateProvider>,
    sink: Arc<dyn PresentationSink>,
    state: Mutex<WorkflowState>,
}

impl ConversionWorkflow {
    pub fn new(provider: Arc<dyn RateProvider>, sink: Arc<dyn PresentationSink>) -> Self {
        Self::with_date(provider, sink, Local::now().date_naive())
    }

    pub fn with_date(
        provider: Arc<dyn RateProvider>,
        sink: Arc<dyn PresentationSink>,
        last_updated: NaiveDate,
    ) -> Self {
        ConversionWorkflow {
            provider,
            sink,
            state: Mutex::new(WorkflowState {
                phase: Phase::Idle,
                displayed: None,
                last_updated,
            }),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.lock_state().clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn last_updated(&self) -> NaiveDate {
        self.lock_state().last_updated
    }

    /// Runs one conversion. On failure the displayed values are kept, a
    /// notice is raised and the error is returned; the busy signal is
    /// cleared on every path.
    #[instrument(
        name = "Convert",
        skip(self, request),
        fields(amount = %request.amount, from = %request.source, to = %request.target)
    )]
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        let busy = self.begin()?;

        let outcome = self
            .provider
            .lookup(&request.source, &request.target)
            .await
            .map_err(|e| ConversionError::RateUnavailable {
                from: request.source.clone(),
                to: request.target.clone(),
                reason: format!("{e:#}"),
            })
            .and_then(|rate| ConversionResult::compute(&request.amount, rate));

        match outcome {
            Ok(result) => {
                let shown = ConversionDisplay::new(request, &result);
                debug!(rate = %shown.rate_text, result = %shown.result_text, "Conversion done");
                self.sink.show_conversion(&shown);
                busy.finish(Phase::Idle, Some(shown));
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                self.sink.notify(&e.notice());
                busy.finish(Phase::Error, None);
                Err(e)
            }
        }
    }

    /// Exchanges source and target, then converts the swapped request.
    pub async fn swap(
        &self,
        request: &ConversionRequest,
    ) -> (
        ConversionRequest,
        Result<ConversionResult, ConversionError>,
    ) {
        let swapped = request.swapped();
        let outcome = self.convert(&swapped).await;
        (swapped, outcome)
    }

    fn begin(&self) -> Result<BusyGuard<'_>, ConversionError> {
        {
            let mut state = self.lock_state();
            if state.phase == Phase::Loading {
                debug!("Conversion already in flight, ignoring trigger");
                return Err(ConversionError::Busy);
            }
            state.phase = Phase::Loading;
        }
        self.sink.set_busy(true);
        Ok(BusyGuard {
            workflow: self,
            outcome: None,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leaves `Loading` and clears the busy signal when dropped, including when
/// the conversion future is dropped early or the provider panics.
struct BusyGuard<'a> {
    workflow: &'a ConversionWorkflow,
    outcome: Option<(Phase, Option<ConversionDisplay>)>,
}

impl BusyGuard<'_> {
    fn finish(mut self, phase: Phase, displayed: Option<ConversionDisplay>) {
        self.outcome = Some((phase, displayed));
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let (phase, displayed) = self.outcome.take().unwrap_or_else(|| {
            if std::thread::panicking() {
                (Phase::Error, None)
            } else {
                (Phase::Idle, None)
            }
        });
        {
            let mut state = self.workflow.lock_state();
            state.phase = phase;
            if let Some(display) = displayed {
                state.displayed = Some(display);
            }
        }
        self.workflow.sink.set_busy(false);
    }
}
