//! Console logger for the clone library
//!
//! Formats `[LEVEL] target: message` into a fixed stack buffer and hands the
//! bytes to the console: Mini-OS' `console_print` in a unikernel image,
//! stderr on the host.

use core::fmt::Write;
use log::{Level, LevelFilter, Metadata, Record};

use crate::config::CloneConfig;

const LINE_MAX: usize = 512;

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut buf = [0u8; LINE_MAX];
        let mut writer = BufferWriter {
            buffer: &mut buf,
            pos: 0,
        };
        let _ = writeln!(
            writer,
            "[{}] {}: {}",
            level_tag(record.level()),
            record.target(),
            record.args()
        );
        let len = writer.pos;
        console_write(&buf[..len]);
    }

    fn flush(&self) {}
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Truncating writer over a byte slice
pub struct BufferWriter<'a> {
    pub buffer: &'a mut [u8],
    pub pos: usize,
}

impl core::fmt::Write for BufferWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buffer.len() - self.pos;
        let to_write = bytes.len().min(remaining);

        if to_write > 0 {
            self.buffer[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
        }

        Ok(())
    }
}

#[cfg(feature = "minios")]
fn console_write(bytes: &[u8]) {
    extern "C" {
        fn console_print(dev: *mut core::ffi::c_void, data: *const u8, length: i32);
    }
    // SAFETY: a null device selects the boot console; the slice outlives the call.
    unsafe { console_print(core::ptr::null_mut(), bytes.as_ptr(), bytes.len() as i32) }
}

#[cfg(all(not(feature = "minios"), feature = "std"))]
fn console_write(bytes: &[u8]) {
    use std::io::Write as _;
    let _ = std::io::stderr().write_all(bytes);
}

#[cfg(all(not(feature = "minios"), not(feature = "std")))]
fn console_write(_bytes: &[u8]) {}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Installs the console logger at `Info`
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Installs the console logger. A logger set earlier by the application
/// stays in place; only the level is applied.
pub fn init_with_level(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Installs the console logger at the configured level
pub fn init_with_config(config: &CloneConfig) {
    init_with_level(config.log_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_writer_truncates() {
        let mut buf = [0u8; 8];
        let mut w = BufferWriter {
            buffer: &mut buf,
            pos: 0,
        };
        let _ = write!(w, "clone children={}", 3);
        assert_eq!(w.pos, 8);
        assert_eq!(&buf, b"clone ch");
    }

    #[test]
    fn test_level_tags_align() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            assert_eq!(level_tag(level).len(), 5);
        }
    }
}
