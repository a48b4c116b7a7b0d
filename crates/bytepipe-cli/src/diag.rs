//! Diagnostic line format.
//!
//! Every event is rendered as `[<nanoseconds>][<tool>] <message>`. Events
//! above `INFO` severity carry their level after the prefix so warnings
//! stand out in a stream of progress lines.

use std::fmt;

use bytepipe_core::clock::DiagnosticClock;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// `tracing-subscriber` event formatter for diagnostic lines.
pub struct DiagnosticFormat {
    clock: DiagnosticClock,
    tool: &'static str,
}

impl DiagnosticFormat {
    /// Create a formatter stamping lines with `tool`.
    pub fn new(tool: &'static str) -> Self {
        Self {
            clock: DiagnosticClock::new(),
            tool,
        }
    }
}

impl<S, N> FormatEvent<S, N> for DiagnosticFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}][{}] ", self.clock.now_nanos(), self.tool)?;

        let level = *event.metadata().level();
        if level != Level::INFO {
            write!(writer, "{level} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::prelude::*;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_lines(emit: impl FnOnce()) -> Vec<String> {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(DiagnosticFormat::new("bytepipe"))
                .with_writer(capture.clone()),
        );
        tracing::subscriber::with_default(subscriber, emit);

        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn split_line(line: &str) -> (u128, &str) {
        let rest = line.strip_prefix('[').unwrap();
        let (stamp, rest) = rest.split_once(']').unwrap();
        let message = rest.strip_prefix("[bytepipe] ").unwrap();
        (stamp.parse().unwrap(), message)
    }

    #[test]
    fn test_info_lines_have_no_level() {
        let lines = capture_lines(|| {
            tracing::info!("Opening input stream");
            tracing::info!("Transferred {} bytes, total {}", 5, 5);
        });

        assert_eq!(lines.len(), 2);
        let (first, message) = split_line(&lines[0]);
        assert_eq!(message, "Opening input stream");
        let (second, message) = split_line(&lines[1]);
        assert_eq!(message, "Transferred 5 bytes, total 5");
        assert!(second >= first);
    }

    #[test]
    fn test_warnings_carry_level() {
        let lines = capture_lines(|| tracing::warn!("Port conflict detected on port 40001"));

        let (_, message) = split_line(&lines[0]);
        assert_eq!(message, "WARN Port conflict detected on port 40001");
    }
}
