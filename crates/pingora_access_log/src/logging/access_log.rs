use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Local;

use super::color::{ColorMode, global_color_mode};
use super::formatter::{DefaultFormatter, FormatterParams, LogFormatter};
use super::sink::{LogSink, detect_terminal};
use crate::core::{Handler, Request, Response};
use crate::error::{ContextError, ErrorType, WebError};
use crate::middleware::Middleware;

/// Configuration for [`AccessLog`].
///
/// Unset fields fall back to defaults when the middleware is built: the
/// built-in formatter, stdout, and the process-wide color mode.
#[derive(Clone, Default)]
pub struct LoggerConfig {
    pub formatter: Option<Arc<dyn LogFormatter>>,
    pub output: Option<Arc<dyn LogSink>>,
    /// Exact request paths (query excluded) that are never logged.
    pub skip_paths: Vec<String>,
    pub color_mode: Option<ColorMode>,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn formatter<F: LogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn output<S: LogSink + 'static>(mut self, output: S) -> Self {
        self.output = Some(Arc::new(output));
        self
    }

    pub fn skip_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.skip_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn skip_path<P: Into<String>>(mut self, path: P) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    /// Pin this logger's color mode instead of following the process-wide one.
    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = Some(mode);
        self
    }
}

/// Middleware that writes one formatted line per request: timestamp,
/// status, latency, client IP, method and path.
pub struct AccessLog {
    formatter: Arc<dyn LogFormatter>,
    output: Arc<dyn LogSink>,
    skip: HashSet<String>,
    color_mode: Option<ColorMode>,
    is_terminal: bool,
}

impl AccessLog {
    /// Default formatter, stdout, nothing skipped.
    pub fn new() -> Self {
        Self::with_config(LoggerConfig::default())
    }

    pub fn with_formatter<F: LogFormatter + 'static>(formatter: F) -> Self {
        Self::with_config(LoggerConfig::new().formatter(formatter))
    }

    /// Log to `output`, except for requests to any of `skip_paths`.
    pub fn with_output<S, I, P>(output: S, skip_paths: I) -> Self
    where
        S: LogSink + 'static,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::with_config(LoggerConfig::new().output(output).skip_paths(skip_paths))
    }

    pub fn with_config(config: LoggerConfig) -> Self {
        let formatter = config
            .formatter
            .unwrap_or_else(|| Arc::new(DefaultFormatter::new()));
        let output = config
            .output
            .unwrap_or_else(|| Arc::new(std::io::stdout()));
        let is_terminal = detect_terminal(output.as_ref());
        let skip: HashSet<String> = config.skip_paths.into_iter().collect();

        tracing::debug!(
            is_terminal,
            skip_paths = skip.len(),
            color_mode = ?config.color_mode,
            "access log configured"
        );

        Self {
            formatter,
            output,
            skip,
            color_mode: config.color_mode,
            is_terminal,
        }
    }

    /// Terminal detection result captured at construction.
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode.unwrap_or_else(global_color_mode)
    }

    fn write(&self, params: &FormatterParams) {
        let line = self.formatter.format(params);
        if let Err(e) = self.output.write_line(&line) {
            tracing::debug!(error = %e, "dropping access log line");
        }
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::new()
    }
}

fn path_with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

#[async_trait]
impl Middleware for AccessLog {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError> {
        if self.skip.contains(req.path()) {
            return next.handle(req).await;
        }

        let method = req.method().as_str().to_string();
        let path = path_with_query(req.path(), req.query_string());
        let host = req.host().to_string();
        let client_ip = req.client_ip();
        let context = req.context();

        let start = Instant::now();
        let result = next.handle(req).await;
        let latency = start.elapsed();
        let timestamp = Local::now().fixed_offset();

        let mut errors = context.errors_by_type(ErrorType::Private);
        let (status_code, body_size) = match &result {
            Ok(res) => (res.status.as_u16(), res.body_size()),
            Err(err) => {
                errors.push(ContextError::private(err));
                let rendered = err.as_response_error().error_response();
                (rendered.status.as_u16(), rendered.body_size())
            }
        };

        let params = FormatterParams {
            timestamp,
            status_code,
            latency,
            client_ip,
            method,
            path,
            host,
            error_message: errors.to_string(),
            body_size,
            keys: context.keys(),
            is_terminal: self.is_terminal,
            color_mode: self.color_mode(),
        };
        self.write(&params);

        result
    }
}
