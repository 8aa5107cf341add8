//! Logging setup and console reports.

mod logging;
mod report;

pub use logging::{setup_logging, LogFormat};
pub use report::{render_fetch_summary, render_portfolio, render_quotes, render_trade};
