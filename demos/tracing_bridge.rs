use std::time::Instant;
use tracing::{debug, error, info};

use tracing_log_facade::init::init_tracing;

fn main() {
    if let Err(err) = init_tracing() {
        eprintln!("tracing already initialized: {}", err);
    }

    info!("starting service");
    debug!(detail = "verbose", "only shown with LOG_VERBOSITY >= 1");
    error!(user_id = 42, reason = "invalid password", "authentication failed");

    let n: u64 = 10_000;
    let start = Instant::now();
    for i in 0..n {
        debug!(iteration = i, "load test event");
    }
    let elapsed = start.elapsed();
    info!(events = n, elapsed = ?elapsed, "load test finished");
}
