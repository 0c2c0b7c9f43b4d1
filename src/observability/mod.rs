//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer, relay service, blockchain client produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached to every request span
//! - Metrics are cheap and safe to record before the exporter exists

pub mod logging;
pub mod metrics;
