//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit tests.

#![allow(dead_code)]

use crate::config::HooksConfig;
use crate::hook_logging::LogEntry;
use crate::hooks::HookContext;
use crate::traits::{Clock, CommandRunner};
use chrono::{DateTime, Local, TimeZone};
use std::cell::RefCell;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A mock command runner for testing.
///
/// Only programs registered with [`MockCommandRunner::set_available`] are
/// reported as installed.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    available_programs: RefCell<Vec<String>>,
}

impl MockCommandRunner {
    /// Create a new mock command runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a program as available.
    pub fn set_available(&mut self, program: &str) {
        self.available_programs.borrow_mut().push(program.to_string());
    }
}

impl CommandRunner for MockCommandRunner {
    fn is_available(&self, program: &str) -> bool {
        self.available_programs.borrow().iter().any(|p| p == program)
    }
}

/// A clock that returns a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    /// Create a clock fixed at the given local date and time.
    ///
    /// # Panics
    ///
    /// Panics if the local time is ambiguous or does not exist.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        let now = Local
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .expect("test instant should be unambiguous in local time");
        Self { now: Mutex::new(now) }
    }

    /// Move the clock to a new instant.
    ///
    /// # Panics
    ///
    /// Panics if the local time is ambiguous or the lock is poisoned.
    pub fn set(&self, year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) {
        let next = Local
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .expect("test instant should be unambiguous in local time");
        *self.now.lock().expect("clock lock poisoned") = next;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

/// Build a hook context rooted at `dir` with default config, a clock fixed at
/// 2024-01-15 10:30:00 local time, and no programs available.
#[must_use]
pub fn test_context(dir: &Path) -> HookContext {
    test_context_with(dir, HooksConfig::default())
}

/// Like [`test_context`] with an explicit config.
#[must_use]
pub fn test_context_with(dir: &Path, config: HooksConfig) -> HookContext {
    let clock = Arc::new(FixedClock::at(2024, 1, 15, 10, 30, 0));
    HookContext::with_clock(dir, config, clock)
        .with_log_dir(dir.join(crate::paths::DEFAULT_LOG_DIR))
        .with_runner(Box::new(MockCommandRunner::new()))
}

/// Read every entry of today's combined log for a context.
///
/// # Panics
///
/// Panics if a line is not a valid log entry.
#[must_use]
pub fn read_log(ctx: &HookContext) -> Vec<LogEntry> {
    read_log_file(&ctx.logger.log_path("", false))
}

/// Read every entry of a log file, or nothing if it does not exist.
///
/// # Panics
///
/// Panics if a line is not a valid log entry.
#[must_use]
pub fn read_log_file(path: &Path) -> Vec<LogEntry> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return vec![];
    };
    content
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).expect("log line should be a valid entry"))
        .collect()
}
