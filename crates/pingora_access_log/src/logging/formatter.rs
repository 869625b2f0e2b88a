use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::color::{self, ColorMode};

pub const DEFAULT_TAG: &str = "[PINGORA]";
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d - %H:%M:%S";

const ONE_MINUTE: Duration = Duration::from_secs(60);

/// Everything a formatter gets to see about one finished request.
#[derive(Debug, Clone)]
pub struct FormatterParams {
    /// Wall-clock time at which the handling chain returned.
    pub timestamp: DateTime<FixedOffset>,
    pub status_code: u16,
    /// Time spent in the rest of the chain.
    pub latency: Duration,
    pub client_ip: String,
    pub method: String,
    /// Request path with `?query` appended when a query string was sent.
    pub path: String,
    pub host: String,
    /// Private errors recorded during handling, one `Error #NN:` line each.
    pub error_message: String,
    pub body_size: usize,
    /// Diagnostic keys set on the request. Never interpreted here.
    pub keys: HashMap<String, Value>,
    /// Whether the sink was a terminal when the middleware was built.
    pub is_terminal: bool,
    pub color_mode: ColorMode,
}

impl FormatterParams {
    pub fn status_code_color(&self) -> &'static str {
        color::status_code_color(self.status_code)
    }

    pub fn method_color(&self) -> &'static str {
        color::method_color(&self.method)
    }

    pub fn reset_color(&self) -> &'static str {
        color::RESET
    }

    pub fn is_output_color(&self) -> bool {
        self.color_mode.emits_color(self.is_terminal)
    }
}

/// Renders a [`FormatterParams`] snapshot into the text written to the sink.
///
/// Any `Fn(&FormatterParams) -> String` closure is a formatter.
pub trait LogFormatter: Send + Sync {
    fn format(&self, params: &FormatterParams) -> String;
}

impl<F> LogFormatter for F
where
    F: Fn(&FormatterParams) -> String + Send + Sync,
{
    fn format(&self, params: &FormatterParams) -> String {
        (self)(params)
    }
}

/// The built-in line layout:
///
/// ```text
/// [PINGORA] 2018/12/07 - 09:11:42 | 200 |            5s |     20.20.20.20 | GET      "/"
/// ```
///
/// followed by the error message, if any, on the next line.
#[derive(Debug, Clone)]
pub struct DefaultFormatter {
    tag: String,
}

impl DefaultFormatter {
    pub fn new() -> Self {
        Self::with_tag(DEFAULT_TAG)
    }

    pub fn with_tag<S: Into<String>>(tag: S) -> Self {
        Self { tag: tag.into() }
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFormatter for DefaultFormatter {
    fn format(&self, p: &FormatterParams) -> String {
        let (status_color, method_color, reset) = if p.is_output_color() {
            (p.status_code_color(), p.method_color(), p.reset_color())
        } else {
            ("", "", "")
        };

        format!(
            "{} {} |{} {:>3} {}| {:>13} | {:>15} |{} {:<7} {} {:?}\n{}",
            self.tag,
            p.timestamp.format(TIMESTAMP_FORMAT),
            status_color,
            p.status_code,
            reset,
            display_latency(p.latency),
            p.client_ip,
            method_color,
            p.method,
            reset,
            p.path,
            p.error_message,
        )
    }
}

/// Latency text. Anything over a minute loses its sub-second part.
pub fn display_latency(latency: Duration) -> String {
    let latency = if latency > ONE_MINUTE {
        Duration::from_secs(latency.as_secs())
    } else {
        latency
    };
    format!("{:?}", latency)
}
