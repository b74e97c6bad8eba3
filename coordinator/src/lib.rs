//! fxbook Coordinator
//!
//! Owns the shared balance/rate state and the adapters around it: the HTTP
//! API, the rate fetch loop and the periodic report loop.

pub mod state;
pub mod report;
pub mod config;
pub mod api;
pub mod fetcher;
pub mod reporter;

pub use state::State;
pub use report::Report;
pub use config::{Args, ServiceConfig, StateConfig};
