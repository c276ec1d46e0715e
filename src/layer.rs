//! # tracing Bridge
//!
//! Routes events from the `tracing` macros into the shared logger, so that
//! dependencies logging through `tracing` end up in the same console/file
//! output as direct [`Logger`] calls.
//!
//! ## Level Mapping
//!
//! - **ERROR**, **WARN**, **INFO**, **DEBUG**: the facade level of the same name
//! - **TRACE**: custom rank 5, below DEBUG
//!
//! The event's `message` field becomes the line body; any other fields are
//! appended as `key=value`. Events emitted by this crate itself are never
//! forwarded, so the logger's own diagnostics cannot feed back into it.
//!
//! ## Environment Configuration
//!
//! [`init_tracing_bridge`] honours `RUST_LOG` for the events it lets through:
//! - `RUST_LOG=debug` - forward everything down to DEBUG
//! - `RUST_LOG=my_app=trace,warn` - trace for one crate, warnings elsewhere

use crate::constants::{DEFAULT_BRIDGE_FILTER, TRACE_LEVEL_RANK};
use crate::error::{LoggingError, Result};
use crate::level::LogLevel;
use crate::registry::{self, Registry};
use crate::service::Logger;
use once_cell::sync::Lazy;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::{prelude::*, EnvFilter};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

enum Route {
    Pinned(Logger),
    Following(&'static Registry),
}

/// `tracing_subscriber` layer writing events through a [`Logger`]
pub struct SharedLoggerLayer {
    route: Route,
}

impl SharedLoggerLayer {
    /// Forward to one specific logger, even if the registry later replaces it
    pub fn new(logger: Logger) -> Self {
        Self {
            route: Route::Pinned(logger),
        }
    }

    /// Forward to whatever logger the process-wide registry holds at the time
    /// of each event
    pub fn global() -> Self {
        Self::following(registry::global())
    }

    /// Forward to whatever logger `registry` holds at the time of each event.
    ///
    /// Events arriving before anyone acquired a logger are dropped; the layer
    /// never creates the logger itself, so the first acquire still decides its
    /// configuration.
    pub fn following(registry: &'static Registry) -> Self {
        Self {
            route: Route::Following(registry),
        }
    }

    fn resolve(&self) -> Option<Logger> {
        match &self.route {
            Route::Pinned(logger) => Some(logger.clone()),
            Route::Following(registry) => registry.current(),
        }
    }
}

/// Facade rank of a tracing level
pub fn tracing_rank(level: &Level) -> i32 {
    match *level {
        Level::ERROR => LogLevel::Error.rank(),
        Level::WARN => LogLevel::Warn.rank(),
        Level::INFO => LogLevel::Info.rank(),
        Level::DEBUG => LogLevel::Debug.rank(),
        _ => TRACE_LEVEL_RANK,
    }
}

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<S: Subscriber> Layer<S> for SharedLoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }

        let Some(logger) = self.resolve() else {
            return;
        };

        let rank = tracing_rank(metadata.level());
        if !logger.is_enabled_for(rank) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        logger.log(rank, visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

/// Install a global tracing subscriber that forwards into the shared logger.
///
/// Only the first call installs anything; later calls report the outcome of
/// that first attempt. Fails if another global subscriber was installed
/// before.
pub fn init_tracing_bridge() -> Result<()> {
    static INIT: Lazy<std::result::Result<(), String>> = Lazy::new(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_BRIDGE_FILTER));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(SharedLoggerLayer::global())
            .try_init()
            .map_err(|e| e.to_string())
    });

    INIT.clone().map_err(LoggingError::Config)
}
