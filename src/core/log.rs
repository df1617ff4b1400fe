use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Installs the global subscriber: pretty, timeless events on stderr.
///
/// `ccx` events are shown at debug level with `verbose` and hidden otherwise.
/// `RUST_LOG` takes over the level when set. Fails if a subscriber is
/// already installed.
pub fn init_logging(verbose: bool) -> Result<(), TryInitError> {
    let (app_filter, env_filter) = filters(verbose);

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .try_init()
}

fn filters(verbose: bool) -> (Targets, EnvFilter) {
    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };
    let app_filter = Targets::new().with_target("ccx", level_filter);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    (app_filter, env_filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_target_follows_verbose_flag() {
        let (quiet, _) = filters(false);
        assert!(!quiet.would_enable("ccx::core::workflow", &tracing::Level::ERROR));

        let (verbose, _) = filters(true);
        assert!(verbose.would_enable("ccx::core::workflow", &tracing::Level::DEBUG));
        assert!(!verbose.would_enable("ccx::core::workflow", &tracing::Level::TRACE));
    }

    #[test]
    fn test_second_init_is_an_error() {
        // The first call may lose to another test that already installed one
        let _ = init_logging(false);
        assert!(init_logging(false).is_err());
    }
}
