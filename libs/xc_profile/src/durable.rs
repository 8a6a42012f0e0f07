//! Best-effort on-disk latency log
//!
//! Appends `<elapsed-ms> <context>` lines while the trigger is armed. The log
//! is diagnostics only: any IO failure is dropped on the floor.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::sink::{TraceRecord, TraceSink};
use crate::PROFILE_FILE;

#[derive(Debug)]
pub struct DurableLog {
    path: PathBuf,
    trigger: AtomicBool,
}

impl DurableLog {
    /// New log at `path`, trigger disarmed
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            trigger: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_trigger(&self, armed: bool) {
        self.trigger.store(armed, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.trigger.load(Ordering::Relaxed)
    }

    /// Appends one line if armed
    pub fn record(&self, elapsed_ms: f64, context: fmt::Arguments<'_>) {
        if !self.is_triggered() {
            return;
        }
        let _ = self.append(elapsed_ms, context);
    }

    fn append(&self, elapsed_ms: f64, context: fmt::Arguments<'_>) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{:.6} {}", elapsed_ms, context)
    }
}

impl Default for DurableLog {
    fn default() -> Self {
        Self::new(PROFILE_FILE)
    }
}

impl TraceSink for DurableLog {
    fn emit(&self, record: &TraceRecord) {
        self.record(record.elapsed_ms, format_args!("{}", record.label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::string::String;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(std::format!("xc-profile-{}-{}", std::process::id(), name));
        let _ = fs::remove_file(&p);
        p
    }

    #[test]
    fn test_disarmed_writes_nothing() {
        let path = temp_path("disarmed");
        let log = DurableLog::new(&path);
        log.record(1.0, format_args!("clone"));
        assert!(!path.exists());
    }

    #[test]
    fn test_armed_appends_lines() {
        let path = temp_path("armed");
        let log = DurableLog::new(&path);
        log.set_trigger(true);
        log.record(1.5, format_args!("children={}", 3));
        log.emit(&TraceRecord {
            elapsed_ms: 0.25,
            depth: 1,
            label: "clone",
        });

        let contents: String = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1.500000 children=3\n0.250000 clone\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_path_is_ignored() {
        let log = DurableLog::new("/nonexistent-dir/xc/profile.out");
        log.set_trigger(true);
        log.record(1.0, format_args!("dropped"));
    }
}
