mod analyze;
mod health;
mod history;
mod metrics;

pub use analyze::analyze_handler;
pub use health::health_handler;
pub use history::history_handler;
pub use metrics::metrics_handler;
