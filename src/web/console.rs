//! Routes `tracing` output to the browser console.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

type Sink = fn(Level, &str);

fn console_sink(level: Level, line: &str) {
    let message = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&message),
        Level::WARN => web_sys::console::warn_1(&message),
        Level::INFO => web_sys::console::info_1(&message),
        _ => web_sys::console::debug_1(&message),
    }
}

/// Buffers one formatted event and emits it when dropped.
pub struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
    sink: Sink,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(self.level, line);
        }
    }
}

/// `MakeWriter` picking the console method from the event's level.
#[derive(Clone, Copy)]
pub struct MakeConsoleWriter {
    sink: Sink,
}

impl Default for MakeConsoleWriter {
    fn default() -> Self {
        Self { sink: console_sink }
    }
}

impl MakeConsoleWriter {
    fn writer(&self, level: Level) -> ConsoleWriter {
        ConsoleWriter {
            level,
            buffer: Vec::new(),
            sink: self.sink,
        }
    }
}

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(*meta.level())
    }
}

/// Installs the console subscriber. Later calls are ignored.
pub fn init(max_level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter::default())
        .with_max_level(max_level)
        .with_ansi(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;

    thread_local! {
        static LINES: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn record(level: Level, line: &str) {
        LINES.with(|lines| lines.borrow_mut().push((level, line.to_string())));
    }

    fn recorded() -> Vec<(Level, String)> {
        LINES.with(|lines| lines.borrow_mut().drain(..).collect())
    }

    #[test]
    fn test_writer_emits_one_line_on_drop() {
        let make = MakeConsoleWriter { sink: record };
        {
            let mut writer = make.writer(Level::WARN);
            write!(writer, "WARN servform: ").unwrap();
            writeln!(writer, "component not initialized").unwrap();
            assert!(recorded().is_empty());
        }
        assert_eq!(
            recorded(),
            vec![(Level::WARN, "WARN servform: component not initialized".to_string())]
        );
    }

    #[test]
    fn test_empty_writer_emits_nothing() {
        let make = MakeConsoleWriter { sink: record };
        drop(make.writer(Level::ERROR));
        assert!(recorded().is_empty());
    }

    #[test]
    fn test_events_reach_the_sink_with_their_level() {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(MakeConsoleWriter { sink: record })
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("form wizard disabled");
            tracing::trace!("filtered out");
        });

        let lines = recorded();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::WARN);
        assert!(lines[0].1.contains("form wizard disabled"));
    }
}
