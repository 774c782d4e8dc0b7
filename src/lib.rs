pub mod api; // Backend transport + typed endpoints
pub mod appointments; // Listing, detail, cancellation
pub mod auth; // Sign-in, registration, role gate
pub mod booking; // Booking / reschedule wizard
pub mod config;
pub mod credentials; // Token storage
pub mod error;
pub mod format;
pub mod models;
pub mod records; // Prescription, certificate, receipt, diagnosis panels
pub mod session;
pub mod shell; // Role landing + tabs

pub use error::ClientError;
pub use session::{DefaultSession, Session};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
