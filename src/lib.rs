pub mod api;
pub mod attrs;
pub mod config;
pub mod error;
pub mod gate;
pub mod ids;
pub mod logging;
pub mod model;
pub mod semconv;
pub mod sink;
pub mod spans;
pub mod timestamp;

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::sink::TraceSink;

/// Shared service state; the config never changes after startup, so
/// handlers read it without locks.
pub struct AppState {
    pub config: BridgeConfig,
    pub sink: Arc<dyn TraceSink>,
}

pub type SharedState = Arc<AppState>;
