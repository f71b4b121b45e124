//! Thread-local log capture for unit tests.

use std::cell::RefCell;
use std::string::String;
use std::vec::Vec;

use log::{LevelFilter, Log, Metadata, Record};

thread_local! {
    static CAPTURED: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let line = std::format!("{}", record.args());
        CAPTURED.with(|captured| captured.borrow_mut().push((record.level(), line)));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Installs the capture logger (once per process) and clears this thread's
/// buffer.
pub(crate) fn capture_logs() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
    CAPTURED.with(|captured| captured.borrow_mut().clear());
}

pub(crate) fn captured_lines() -> Vec<(log::Level, String)> {
    CAPTURED.with(|captured| captured.borrow().clone())
}
