// Backend Application Layer

pub mod auth;
pub mod commands;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod metrics;
pub mod proximity;
pub mod queries;
pub mod state;

pub use error::AppError;
pub use metrics::Metrics;
pub use state::AppState;
