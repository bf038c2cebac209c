//! Full runs against the bundled dummy backend.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use hardour_core::StartupConfig;
use hardour_engine::{DummyHost, UiAction};
use hardour_runtime::{
    run_process, shutdown, DiagnosticListener, ProcessContext, StartupSequencer,
};

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

fn session_dir(snapshot: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{snapshot}.ardour")), "<Session/>").unwrap();
    dir
}

fn context(config: StartupConfig, out: &Capture) -> ProcessContext {
    let listener = DiagnosticListener::with_writers(out.clone(), std::io::sink());
    ProcessContext::with_listener(config, listener)
        .unwrap()
        .without_signal_handlers()
}

#[test]
fn test_backend_halt_ends_run() {
    let dir = session_dir("demo");
    let mut config = StartupConfig::new(dir.path(), "demo");
    config.buffer_size = 64;
    let out = Capture::default();

    let host = DummyHost::with_halt_after(Duration::from_millis(250));
    let status = run_process(host, context(config, &out));

    assert_eq!(status, 0);
    let text = out.text();
    assert!(text.contains("[INFO]: using optimized mix functions"), "{text}");
    assert!(text.contains("[INFO]: loaded session 'demo'"), "{text}");
}

#[test]
fn test_quit_action_ends_run() {
    let dir = session_dir("demo");
    let out = Capture::default();
    let host = DummyHost::new();
    let actions = host.ui_action_sender();
    let ctx = context(StartupConfig::new(dir.path(), "demo"), &out);

    let runner = thread::spawn(move || run_process(host, ctx));
    // Resend until the runner has wired the action stream and consumed it.
    while !runner.is_finished() {
        actions.emit(&UiAction::quit());
        thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(runner.join().unwrap(), 0);
}

#[test]
fn test_missing_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = Capture::default();

    let status = run_process(
        DummyHost::new(),
        context(StartupConfig::new(dir.path(), "absent"), &out),
    );

    assert_eq!(status, 1);
    assert!(!out.text().contains("loaded session"));
}

#[test]
fn test_unknown_backend_fails() {
    let dir = session_dir("demo");
    let mut config = StartupConfig::new(dir.path(), "demo");
    config.backend = "JACK".to_string();
    let out = Capture::default();

    assert_eq!(run_process(DummyHost::new(), context(config, &out)), 1);
}

#[test]
fn test_transport_rolls_after_startup() {
    let dir = session_dir("demo");
    let mut config = StartupConfig::new(dir.path(), "demo");
    config.buffer_size = 64;
    let out = Capture::default();
    let mut ctx = context(config, &out);
    let mut host = DummyHost::new();

    let running = StartupSequencer::new(&mut host).run(&mut ctx).unwrap();
    let transport = running.session().transport();
    assert_eq!(transport.speed(), 1.0);

    let deadline = Instant::now() + Duration::from_secs(5);
    while transport.position() == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(transport.position() > 0);

    assert_eq!(shutdown(running), 0);
    ctx.disconnect_all();
}

#[test]
fn test_zero_sample_rate_fails_cleanly() {
    let dir = session_dir("demo");
    let mut config = StartupConfig::new(dir.path(), "demo");
    config.sample_rate = 0;
    let out = Capture::default();

    assert_eq!(run_process(DummyHost::new(), context(config, &out)), 1);
    assert!(!out.text().contains("backend running"));
}
