//! Logger module
//!
//! Provides logging utilities for the media server including:
//! - Server lifecycle logging
//! - Access logging for served media
//! - Error and warning logging
//! - File-based logging support

pub mod writer;

use crate::config::Config;
use chrono::Local;
use hyper::{Method, StatusCode};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Media server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Media root: {}", config.media.root));
    write_info(&format!(
        "Size cache: {}",
        if config.media.no_cache { "disabled" } else { "enabled" }
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

/// Access line for a media request, common-log style
pub fn log_served(method: &Method, path: &str, status: StatusCode, served: bool) {
    write_access(&format_access_line(method, path, status, served));
}

fn format_access_line(method: &Method, path: &str, status: StatusCode, served: bool) -> String {
    format!(
        "[{}] \"{method} {path}\" {} {}",
        Local::now().format("%d/%b/%Y:%H:%M:%S %z"),
        status.as_u16(),
        if served { "streamed" } else { "unserved" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_line() {
        let line = format_access_line(
            &Method::GET,
            "/video.mp4",
            StatusCode::PARTIAL_CONTENT,
            true,
        );
        assert!(line.contains("\"GET /video.mp4\" 206 streamed"));
        assert!(line.starts_with('['));
    }
}
