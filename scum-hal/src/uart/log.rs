// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0
use crate::uart;

// The logger utilizes core::fmt to format the log messages because ufmt formatting is not
// compatible with (dependencies of) the log crate.
use core::fmt::Write;
use log::LevelFilter;

/// A global logger instance to be used with the `log` crate.
///
/// Use [`init`] to set the `Uart` instance to be used for logging and to
/// register the logger with the `log` crate.
/// # Safety
/// Using this logger is only safe if there is only one thread of execution.
/// Even though `UartLogger` is `Send` and `Sync`, the underlying `Uart` is not `Send` or `Sync`.
pub static mut LOGGER: UartLogger = UartLogger {
    uart: None,
    display_level: LevelFilter::Trace,
    display_source: LevelFilter::Off,
};

/// Wrapper for `Uart` to be used as a logger with the `log` crate.
/// Instead of making a new logger, use [`init`] to configure the `LOGGER` instance.
/// # Safety
/// Using this logger is only safe if there is only one thread of execution.
/// Even though `UartLogger` is `Send` and `Sync`, the underlying `Uart` is not `Send` or `Sync`.
pub struct UartLogger {
    uart: Option<uart::Uart>,
    pub display_level: LevelFilter,
    pub display_source: LevelFilter,
}

/// Route `log` records to the given UART at the given maximum level.
///
/// # Safety
///
/// Must be called at most once, before any logging macro runs, and only when
/// there is a single thread of execution. The `Uart` instance is stored in a
/// global (`static mut`), but `Uart` is not `Send` or `Sync`.
pub unsafe fn init(uart: uart::Uart, max_level: LevelFilter) {
    let logger = &mut *core::ptr::addr_of_mut!(LOGGER);
    logger.uart = Some(uart);
    // Ignored if a logger was already installed.
    let _ = log::set_logger(&*core::ptr::addr_of!(LOGGER));
    log::set_max_level(max_level);
}

impl log::Log for UartLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            unsafe {
                match &mut (*core::ptr::addr_of_mut!(LOGGER)).uart {
                    Some(l) => {
                        if record.level() <= self.display_level {
                            let _ = write!(l, "{} | ", record.level());
                        }
                        if record.level() <= self.display_source {
                            let _ = write!(
                                l,
                                "{}:{} - ",
                                record.file().unwrap_or("<unknown>"),
                                record.line().unwrap_or(0)
                            );
                        }
                        let _ = writeln!(l, "{}", record.args());
                    }
                    None => {}
                }
            }
        }
    }

    fn flush(&self) {}
}

unsafe impl core::marker::Send for UartLogger {}
unsafe impl core::marker::Sync for UartLogger {}
