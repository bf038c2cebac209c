//! Diagnostic listener: forwards collaborator messages to stdout/stderr.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::trace;

use hardour_core::{ConnectionList, DiagnosticStreams, Severity};

type Sink = Mutex<Box<dyn Write + Send>>;

/// Pass-through sink for the four diagnostic streams.
///
/// Info goes to the output sink; error, warning and fatal go to the error
/// sink. Messages are written and flushed one by one with no filtering.
pub struct DiagnosticListener {
    out: Sink,
    err: Sink,
}

impl DiagnosticListener {
    /// Listener writing to the process's standard output and error.
    pub fn stdio() -> Arc<Self> {
        Self::with_writers(std::io::stdout(), std::io::stderr())
    }

    /// Listener writing to the given sinks.
    pub fn with_writers<O, E>(out: O, err: E) -> Arc<Self>
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Arc::new(Self {
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        })
    }

    /// Subscribe to all four streams. The subscriptions last as long as the
    /// returned list.
    pub fn listen_to(self: &Arc<Self>, streams: &DiagnosticStreams) -> ConnectionList {
        let mut connections = ConnectionList::new();
        for severity in Severity::ALL {
            let listener = Arc::clone(self);
            connections.add(
                streams
                    .stream(severity)
                    .connect(move |message: &String| listener.receive(severity, message)),
            );
        }
        connections
    }

    /// Write one message tagged with its severity.
    pub fn receive(&self, severity: Severity, message: &str) {
        trace!(target: "hardour::diagnostics", %severity, "forwarding message");
        let sink = if severity.is_stderr() {
            &self.err
        } else {
            &self.out
        };
        let mut writer = sink.lock().unwrap_or_else(|e| e.into_inner());
        // A closed stdout/stderr must not take the emitting thread down.
        let _ = writeln!(writer, "{}{}", severity.prefix(), message);
        let _ = writer.flush();
    }
}

impl std::fmt::Debug for DiagnosticListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticListener").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_forwards_by_severity() {
        let out = Capture::default();
        let err = Capture::default();
        let listener = DiagnosticListener::with_writers(out.clone(), err.clone());
        let streams = DiagnosticStreams::new();
        let _connections = listener.listen_to(&streams);

        streams.info("session loaded");
        streams.warning("xrun");
        streams.error("port gone");
        streams.fatal("engine died");

        assert_eq!(out.text(), "[INFO]: session loaded\n");
        assert_eq!(
            err.text(),
            "[WARNING]: xrun\n[ERROR]: port gone\n[FATAL]: engine died\n"
        );
    }

    #[test]
    fn test_dropping_connections_stops_forwarding() {
        let out = Capture::default();
        let listener = DiagnosticListener::with_writers(out.clone(), std::io::sink());
        let streams = DiagnosticStreams::new();
        let connections = listener.listen_to(&streams);
        assert_eq!(connections.len(), 4);

        drop(connections);
        streams.info("lost");
        assert!(out.text().is_empty());
    }

    #[test]
    fn test_messages_from_other_threads() {
        let out = Capture::default();
        let listener = DiagnosticListener::with_writers(out.clone(), std::io::sink());
        let streams = DiagnosticStreams::new();
        let _connections = listener.listen_to(&streams);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let streams = streams.clone();
                std::thread::spawn(move || streams.info(format!("from {i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(out.text().lines().count(), 4);
    }
}
