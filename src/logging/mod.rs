use std::{fmt::Write as _, path::Path, thread};

use chrono::{format::DelayedFormat, Local};
use concat_string::concat_string;
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;

use crate::logging::rotate::Rotate;

pub mod rotate;

/// 累積到這個長度就先寫出
const FLUSH_THRESHOLD: usize = 2048;
const LOG_DIR: &str = "log";

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

pub struct Logger {
    info_writer: Sender<String>,
    warn_writer: Sender<String>,
    error_writer: Sender<String>,
    debug_writer: Sender<String>,
}

impl Logger {
    fn new(log_name: &str) -> Self {
        Self::with_dir(Path::new(LOG_DIR), log_name)
    }

    /// 檔案寫在 `dir/<日期>_<log_name>_<等級>.log`
    fn with_dir(dir: &Path, log_name: &str) -> Self {
        let writer = |level: &str| {
            let pattern = dir.join(concat_string!("%Y-%m-%d_", log_name, "_", level, ".log"));
            Self::create_writer(pattern.to_string_lossy().into_owned())
        };

        Logger {
            info_writer: writer("info"),
            warn_writer: writer("warn"),
            error_writer: writer("error"),
            debug_writer: writer("debug"),
        }
    }

    fn send(&self, msg: String, writer: &Sender<String>) {
        if let Err(why) = writer.send(msg) {
            error_console(why.to_string());
        }
    }

    /// 每個等級各自一條寫檔執行緒
    fn create_writer(fn_pattern: String) -> Sender<String> {
        let (tx, rx) = unbounded::<String>();
        let mut rotate = Rotate::new(fn_pattern);

        thread::spawn(move || {
            let mut line = String::with_capacity(FLUSH_THRESHOLD);

            for received in &rx {
                if writeln!(&mut line, "{} {}", Local::now().format("%F %X%.6f"), received)
                    .is_err()
                {
                    continue;
                }

                if rx.is_empty() || line.len() >= FLUSH_THRESHOLD {
                    if let Err(why) = rotate.write_msg(Local::now(), line.as_bytes()) {
                        error_console(format!(
                            "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                            why, line
                        ));
                    }

                    if let Err(why) = rotate.flush() {
                        error_console(format!("Failed to flush log file. because:{:#?}", why));
                    }

                    line.clear();
                }
            }
        });

        tx
    }
}

pub fn info_file_async(log: String) {
    LOGGER.send(log, &LOGGER.info_writer);
}

pub fn warn_file_async(log: String) {
    LOGGER.send(log, &LOGGER.warn_writer);
}

pub fn error_file_async(log: String) {
    LOGGER.send(log, &LOGGER.error_writer);
}

pub fn debug_file_async(log: String) {
    LOGGER.send(log, &LOGGER.debug_writer);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}
