use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for rendered access lines.
///
/// Sinks are shared by every in-flight request, so writes take `&self`.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Whether the sink is an interactive terminal. Sinks that are not
    /// file-like keep the default of `false`.
    fn is_terminal(&self) -> bool {
        false
    }
}

impl LogSink for io::Stdout {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = self.lock();
        out.write_all(line.as_bytes())?;
        out.flush()
    }

    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl LogSink for io::Stderr {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lock().write_all(line.as_bytes())
    }

    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl LogSink for File {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file: &File = self;
        file.write_all(line.as_bytes())
    }

    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

/// Any writer behind a mutex: buffers, sockets, pipes.
impl<W: Write + Send> LogSink for Mutex<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(line.as_bytes())
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}

/// Probe `sink` once for color capability, honoring `TERM=dumb`.
pub fn detect_terminal(sink: &dyn LogSink) -> bool {
    let term = std::env::var("TERM").ok();
    terminal_capable(sink, term.as_deref())
}

fn terminal_capable(sink: &dyn LogSink, term: Option<&str>) -> bool {
    term != Some("dumb") && sink.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTty;

    impl LogSink for FakeTty {
        fn write_line(&self, _line: &str) -> io::Result<()> {
            Ok(())
        }

        fn is_terminal(&self) -> bool {
            true
        }
    }

    #[test]
    fn dumb_term_disables_terminal_capability() {
        assert!(terminal_capable(&FakeTty, Some("xterm-256color")));
        assert!(terminal_capable(&FakeTty, None));
        assert!(!terminal_capable(&FakeTty, Some("dumb")));
    }

    #[test]
    fn in_memory_writers_are_not_terminals() {
        let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
        assert!(!terminal_capable(&buf, Some("xterm")));
        assert!(!detect_terminal(&buf));

        buf.write_line("one\n").unwrap();
        buf.write_line("two\n").unwrap();
        assert_eq!(buf.lock().unwrap().as_slice(), b"one\ntwo\n");
    }

    #[test]
    fn arc_forwards_the_probe() {
        let tty: Arc<dyn LogSink> = Arc::new(FakeTty);
        assert!(tty.is_terminal());
        assert!(Arc::new(tty).is_terminal());
    }
}
