//! Schema administration metrics
//!
//! Counters go through the `metrics` facade; installing an exporter is up
//! to the binary:
//! - Compilations by operation and outcome
//! - Warnings by kind
//! - Requests issued to the admin service

use crate::Error;

/// Record the outcome of a compilation.
pub fn record_compile<T>(operation: &'static str, result: &Result<T, Error>) {
    let status = match result {
        Ok(_) => "ok",
        Err(e) => e.error_type(),
    };
    metrics::counter!(
        "tabula_schema_compile_total",
        "operation" => operation,
        "status" => status,
    )
    .increment(1);
}

/// Record a non-fatal schema warning
pub fn record_schema_warning(kind: &'static str) {
    metrics::counter!("tabula_schema_warnings_total", "kind" => kind).increment(1);
}

/// Record a request to the admin service
pub fn record_admin_request<T>(operation: &'static str, result: &Result<T, Error>) {
    let status = match result {
        Ok(_) => "ok",
        Err(e) => e.error_type(),
    };
    metrics::counter!(
        "tabula_admin_requests_total",
        "operation" => operation,
        "status" => status,
    )
    .increment(1);
}
