//! Console output for `tracing` events.

use std::io;

use leptos::logging;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Collects one formatted event and hands it to `leptos::logging` when
/// dropped: the browser console on wasm targets, stdio elsewhere.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    /// Writer for an event at `level`.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }

    /// Text written so far without the trailing newline.
    pub fn line(&self) -> String {
        String::from_utf8_lossy(&self.buf).trim_end().to_string()
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = self.line();
        if line.is_empty() {
            return;
        }
        match self.level {
            Level::ERROR => logging::error!("{line}"),
            Level::WARN => logging::warn!("{line}"),
            _ => logging::log!("{line}"),
        }
    }
}

/// [`MakeWriter`] producing one [`ConsoleWriter`] per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Installs a global subscriber printing events at `max_level` and above
/// through [`MakeConsoleWriter`].
///
/// Fails when a global subscriber is already set.
pub fn init_console(max_level: Level) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_max_level(max_level)
        .with_ansi(false)
        .without_time()
        .try_init()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn writer_assembles_one_line_per_event() {
        let mut writer = ConsoleWriter::new(Level::WARN);
        writer.write_all(b" WARN logger: slow").expect("write");
        writer.write_all(b" tag=\"home$load\"\n").expect("write");
        assert_eq!(writer.line(), " WARN logger: slow tag=\"home$load\"");
    }

    #[test]
    fn empty_writer_has_no_line() {
        let writer = ConsoleWriter::new(Level::ERROR);
        assert_eq!(writer.line(), "");
    }

    #[test]
    fn second_global_install_is_rejected() {
        let _ = init_console(Level::DEBUG);
        assert!(init_console(Level::DEBUG).is_err());
    }
}
