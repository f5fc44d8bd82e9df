//! Logging capability handed to the client.
//!
//! Callers format messages with `format_args!`:
//!
//! ```
//! use typed_http_client::{AppLogger, TracingLogger};
//!
//! let logger = TracingLogger::for_type::<String>();
//! logger.log_warning(format_args!("retrying {} in {}s", "/orders", 5));
//! ```

use std::any::type_name;
use std::fmt;

use tracing::{error, info, warn};

pub trait AppLogger: Send + Sync {
    fn log_error(&self, args: fmt::Arguments<'_>);
    fn log_information(&self, args: fmt::Arguments<'_>);
    fn log_warning(&self, args: fmt::Arguments<'_>);
}

/// `AppLogger` backed by `tracing`, tagging each event with a category.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    category: &'static str,
}

impl TracingLogger {
    pub fn new(category: &'static str) -> Self {
        Self { category }
    }

    /// Category named after the client's body type.
    pub fn for_type<T: ?Sized>() -> Self {
        Self::new(type_name::<T>())
    }

    pub fn category(&self) -> &'static str {
        self.category
    }
}

impl AppLogger for TracingLogger {
    fn log_error(&self, args: fmt::Arguments<'_>) {
        error!(category = self.category, "{}", args);
    }

    fn log_information(&self, args: fmt::Arguments<'_>) {
        info!(category = self.category, "{}", args);
    }

    fn log_warning(&self, args: fmt::Arguments<'_>) {
        warn!(category = self.category, "{}", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_defaults_to_type_name() {
        let logger = TracingLogger::for_type::<Vec<u8>>();
        assert!(logger.category().contains("Vec<u8>"));
    }

    #[test]
    fn logging_without_subscriber_is_a_no_op() {
        let logger = TracingLogger::new("orders");
        logger.log_error(format_args!("failed {}", 1));
        logger.log_information(format_args!("ok"));
        logger.log_warning(format_args!("slow: {}ms", 1500));
    }
}
