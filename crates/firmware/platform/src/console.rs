use std::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};
use scr_abi::prelude::*;
use spin::Mutex;

use crate::globals;

/// Logger writing to whichever console the platform brought up.
/// Records are dropped until a console is attached.
pub struct ConsoleLogger {
    console: Mutex<Option<&'static dyn ConsoleDevice>>,
}

/// Firmware wide logger.
pub static LOGGER: ConsoleLogger = ConsoleLogger::new();

impl ConsoleLogger {
    pub const fn new() -> ConsoleLogger {
        ConsoleLogger {
            console: Mutex::new(None),
        }
    }

    pub fn attach(&self, console: &'static dyn ConsoleDevice) {
        *self.console.lock() = Some(console);
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= globals::DEFAULT_LOG_LEVEL
            || globals::EXTRA_LOGS.contains(&metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Held across the write so lines from different harts do not interleave.
        let console = self.console.lock();
        if let Some(device) = *console {
            let _ = writeln!(
                ConsoleWriter(device),
                "[{:5}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

struct ConsoleWriter(&'static dyn ConsoleDevice);

impl Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.0.putc(b'\r');
            }
            self.0.putc(byte);
        }
        Ok(())
    }
}

/// Route the `log` facade to `console`.
pub fn init(console: &'static dyn ConsoleDevice) -> SbiResult<()> {
    LOGGER.attach(console);
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Trace))
        .map_err(|_| SbiError::AlreadyAvailable)
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    #[derive(Default)]
    struct Capture(Mutex<Vec<u8>>);

    impl ConsoleDevice for Capture {
        fn putc(&self, byte: u8) {
            self.0.lock().push(byte);
        }

        fn getc(&self) -> Option<u8> {
            None
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    #[test]
    fn filters_by_level_and_target() {
        let capture: &'static Capture = Box::leak(Box::new(Capture::default()));
        let logger = ConsoleLogger::new();
        logger.attach(capture);

        logger.log(
            &Record::builder()
                .args(format_args!("built {} entries", 41))
                .level(Level::Info)
                .target("mmu")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("hidden"))
                .level(Level::Debug)
                .target("platform")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("pte"))
                .level(Level::Debug)
                .target("mmu")
                .build(),
        );

        assert_eq!(
            capture.text(),
            "[INFO ] mmu: built 41 entries\r\n[DEBUG] mmu: pte\r\n"
        );
    }

    #[test]
    fn drops_records_without_console() {
        let logger = ConsoleLogger::new();
        logger.log(
            &Record::builder()
                .args(format_args!("nowhere"))
                .level(Level::Error)
                .target("bootstrap")
                .build(),
        );
    }
}
