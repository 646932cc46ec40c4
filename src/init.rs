use crate::global::default_logger;
use crate::layer::LoggerLayer;
use crate::logger::Logger;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Install a global `tracing` subscriber that writes through `logger`.
///
/// **Parameters**
/// - `logger`: the [`Logger`] every `tracing` event is routed to.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`LoggerLayer`] as the global
/// default subscriber, so all `tracing` events in the process are
/// rendered with the logger's encoder and threshold.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed; the existing
///   one stays in place.
pub fn init_tracing_with(logger: Logger) -> Result<(), SetGlobalDefaultError> {
    let subscriber = Registry::default().with(LoggerLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)
}

/// Route `tracing` events through the process-wide [`default_logger`].
///
/// This is the recommended entrypoint for binaries that configure logging
/// through `LOG_MODE` / `LOG_VERBOSITY` only.
pub fn init_tracing() -> Result<(), SetGlobalDefaultError> {
    init_tracing_with(default_logger())
}
