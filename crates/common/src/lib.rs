//! Shared plumbing for the coordinator service: error classification, the
//! HTTP server glue, shutdown signalling, and filesystem gauges.

pub mod errors;
pub mod fs;
pub mod http;
pub mod shutdown;
