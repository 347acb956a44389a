//! Structured logging with correlation tracking for store calls
//!
//! Every call the REST store makes gets a correlation id; request,
//! response and completion are logged as JSON objects so a failed save
//! can be traced call by call.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Switches for store call logging
#[derive(Debug, Clone)]
pub struct CallLogConfig {
    pub request_logging: bool,
    pub call_metrics: bool,
    pub log_level: LogLevel,
    /// Calls slower than this are reported at warn level
    pub slow_call_threshold: Duration,
}

impl Default for CallLogConfig {
    fn default() -> Self {
        Self {
            request_logging: true,
            call_metrics: true,
            log_level: LogLevel::Info,
            slow_call_threshold: Duration::from_secs(3),
        }
    }
}

impl CallLogConfig {
    pub fn quiet() -> Self {
        Self {
            request_logging: false,
            call_metrics: false,
            log_level: LogLevel::Error,
            ..Self::default()
        }
    }
}

/// Structured logger for store calls
#[derive(Debug, Clone, Default)]
pub struct CallLogger {
    config: CallLogConfig,
}

/// A single in-flight store call
#[derive(Debug, Clone)]
pub struct CallContext {
    pub correlation_id: String,
    /// Call type (create_template, upsert_option, ...)
    pub call: String,
    pub table: String,
    pub start_time: Instant,
}

impl CallContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl CallLogger {
    pub fn new(config: CallLogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CallLogConfig {
        &self.config
    }

    /// Start tracking a call under a fresh correlation id
    pub fn start_call(&self, call: &str, table: &str) -> CallContext {
        let context = CallContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            call: call.to_string(),
            table: table.to_string(),
            start_time: Instant::now(),
        };

        if self.config.request_logging && self.should_log(LogLevel::Debug) {
            let log_data = json!({
                "event": "call_started",
                "correlation_id": context.correlation_id,
                "call": context.call,
                "table": context.table,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            debug!("Store Call Started: {}", log_data);
        }

        context
    }

    pub fn log_request(&self, context: &CallContext, method: &str, url: &str, headers: &HashMap<String, String>) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "call": context.call,
            "method": method,
            "url": url,
            "headers": sanitize_headers(headers),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Request: {}", log_data);
    }

    pub fn log_response(&self, context: &CallContext, status_code: u16) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "call": context.call,
            "status_code": status_code,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if status_code >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            debug!("HTTP Response: {}", log_data);
        }
    }

    /// Log the outcome of a call
    pub fn complete_call(&self, context: &CallContext, status_code: Option<u16>, error_message: Option<&str>) {
        let duration = context.elapsed();
        let success = error_message.is_none();

        if self.config.call_metrics {
            let log_data = json!({
                "event": "call_completed",
                "correlation_id": context.correlation_id,
                "call": context.call,
                "table": context.table,
                "duration_ms": duration.as_millis(),
                "success": success,
                "status_code": status_code,
                "error_message": error_message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });

            if !success {
                if self.should_log(LogLevel::Error) {
                    error!("Store Call Failed: {}", log_data);
                }
            } else if self.should_log(LogLevel::Info) {
                info!("Store Call Completed: {}", log_data);
            }
        }

        if duration > self.config.slow_call_threshold && self.should_log(LogLevel::Warn) {
            warn!(
                "Slow store call {} on {} ({} ms, correlation {})",
                context.call,
                context.table,
                duration.as_millis(),
                context.correlation_id
            );
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        match (self.config.log_level, level) {
            (LogLevel::Error, LogLevel::Error) => true,
            (LogLevel::Warn, LogLevel::Error | LogLevel::Warn) => true,
            (LogLevel::Info, LogLevel::Error | LogLevel::Warn | LogLevel::Info) => true,
            (LogLevel::Debug, LogLevel::Error | LogLevel::Warn | LogLevel::Info | LogLevel::Debug) => true,
            (LogLevel::Trace, _) => true,
            _ => false,
        }
    }
}

/// Redact credentials before headers reach the log
fn sanitize_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(key, value)| {
            let key_lower = key.to_lowercase();
            if key_lower.contains("authorization") || key_lower.contains("token") || key_lower.contains("key") {
                (key.clone(), "[REDACTED]".to_string())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_context_creation() {
        let logger = CallLogger::new(CallLogConfig::default());
        let context = logger.start_call("upsert_option", "options");

        assert_eq!(context.call, "upsert_option");
        assert_eq!(context.table, "options");
        assert!(uuid::Uuid::parse_str(&context.correlation_id).is_ok());
    }

    #[test]
    fn test_header_sanitization() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer secret-token".to_string());
        headers.insert("apikey".to_string(), "anon-key".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let sanitized = sanitize_headers(&headers);

        assert_eq!(sanitized.get("Authorization"), Some(&"[REDACTED]".to_string()));
        assert_eq!(sanitized.get("apikey"), Some(&"[REDACTED]".to_string()));
        assert_eq!(sanitized.get("Content-Type"), Some(&"application/json".to_string()));
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = CallLogger::new(CallLogConfig {
            log_level: LogLevel::Warn,
            ..CallLogConfig::default()
        });

        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warn));
        assert!(!logger.should_log(LogLevel::Info));
        assert!(!logger.should_log(LogLevel::Trace));
    }
}
