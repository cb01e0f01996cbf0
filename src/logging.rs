//! Leveled diagnostics sink shared by the probe, planner and remover.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::io::{self, Write};
use std::rc::Rc;

/// Severity of a log line, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    fn prefix(self) -> &'static str {
        match self {
            Level::Error => "error: ",
            Level::Warning => "warning: ",
            Level::Info | Level::Debug => "",
        }
    }
}

/// Writes leveled messages to a single writer handle.
///
/// Quiet mode shows errors only, the default shows everything up to
/// [`Level::Info`], and any verbosity above zero adds [`Level::Debug`].
/// Clones share the same writer.
#[derive(Clone)]
pub struct Logger {
    verbose: u8,
    quiet: bool,
    sink: Rc<RefCell<dyn Write>>,
}

impl Logger {
    /// Logger writing to stderr.
    pub fn new(verbose: u8, quiet: bool) -> Self {
        Self::with_sink(verbose, quiet, io::stderr())
    }

    /// Logger writing to an arbitrary writer.
    pub fn with_sink(verbose: u8, quiet: bool, sink: impl Write + 'static) -> Self {
        Self {
            verbose,
            quiet,
            sink: Rc::new(RefCell::new(sink)),
        }
    }

    /// Logger writing into memory, returned together with a handle for
    /// reading back what was written.
    pub fn buffered(verbose: u8, quiet: bool) -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (Self::with_sink(verbose, quiet, buffer.clone()), buffer)
    }

    pub fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Error => true,
            Level::Warning | Level::Info => !self.quiet,
            Level::Debug => !self.quiet && self.verbose > 0,
        }
    }

    pub fn log(&self, level: Level, message: impl Display) {
        if !self.enabled(level) {
            return;
        }
        // A broken stderr must not abort a prune halfway through.
        let mut sink = self.sink.borrow_mut();
        let _ = writeln!(sink, "{}{message}", level.prefix());
        let _ = sink.flush();
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    pub fn warning(&self, message: impl Display) {
        self.log(Level::Warning, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

/// In-memory log destination, see [`Logger::buffered`].
#[derive(Clone, Debug, Default)]
pub struct LogBuffer(Rc<RefCell<Vec<u8>>>);

impl LogBuffer {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Lines written at error level.
    pub fn errors(&self) -> Vec<String> {
        self.lines_with_prefix(Level::Error.prefix())
    }

    /// Lines written at warning level.
    pub fn warnings(&self) -> Vec<String> {
        self.lines_with_prefix(Level::Warning.prefix())
    }

    fn lines_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.starts_with(prefix))
            .map(str::to_owned)
            .collect()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_verbosity_hides_debug() {
        let (log, buffer) = Logger::buffered(0, false);
        log.debug("per-entry detail");
        log.info("summary");
        log.warning("odd bucket");
        log.error("unlink failed");

        assert_eq!(
            buffer.contents(),
            "summary\nwarning: odd bucket\nerror: unlink failed\n"
        );
    }

    #[test]
    fn test_quiet_keeps_errors_only() {
        let (log, buffer) = Logger::buffered(3, true);
        log.debug("a");
        log.info("b");
        log.warning("c");
        log.error("d");

        assert_eq!(buffer.contents(), "error: d\n");
        assert!(log.enabled(Level::Error));
        assert!(!log.enabled(Level::Warning));
    }

    #[test]
    fn test_verbose_shows_debug_and_clones_share_sink() {
        let (log, buffer) = Logger::buffered(1, false);
        let clone = log.clone();
        log.debug("first");
        clone.warning("second");

        assert_eq!(buffer.contents(), "first\nwarning: second\n");
        assert_eq!(buffer.warnings(), vec!["warning: second".to_string()]);
        assert!(buffer.errors().is_empty());
    }
}
