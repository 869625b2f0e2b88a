use std::io;

use super::LogSink;

/// Sink that forwards every access line to `tracing` at INFO level under the
/// `access_log` target, leaving output and filtering to the subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        tracing::info!(target: "access_log", "{}", line.trim_end_matches('\n'));
        Ok(())
    }
}
