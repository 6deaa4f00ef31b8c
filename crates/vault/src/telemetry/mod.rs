//! Structured logging, with optional OpenTelemetry span export over OTLP/gRPC.
//!
//! # Telemetry invariants
//!
//! - **No key material or field values** may appear in any span attribute or
//!   log field. Field names, counts, error codes and the key fingerprint are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
