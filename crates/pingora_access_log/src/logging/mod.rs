pub mod access_log;
pub mod color;
pub mod formatter;
pub mod sink;
pub mod tracing_sink;

pub use access_log::{AccessLog, LoggerConfig};
pub use color::{
    ColorMode, disable_color, force_color, global_color_mode, reset_color_mode,
    set_global_color_mode,
};
pub use formatter::{DefaultFormatter, FormatterParams, LogFormatter, display_latency};
pub use sink::{LogSink, detect_terminal};
pub use tracing_sink::TracingSink;
