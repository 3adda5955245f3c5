use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Local, TimeDelta};

use crate::logging;

/// 預設保留天數：7 天
const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// 依日期切換檔案的寫入器
///
/// 只給單一寫入執行緒使用，不做跨執行緒同步。
pub struct Rotate {
    /// 檔名模式，例如 "log/%Y-%m-%d_default_info.log"
    fn_pattern: String,
    /// 目前開啟中的檔名
    cur_fn: String,
    out_fh: Option<BufWriter<File>>,
    /// 日誌保留時間
    max_age: TimeDelta,
}

impl Rotate {
    pub fn new(fn_pattern: String) -> Self {
        Self::with_max_age(fn_pattern, DEFAULT_MAX_AGE_DAYS)
    }

    pub fn with_max_age(fn_pattern: String, max_age_days: i64) -> Self {
        Rotate {
            fn_pattern,
            cur_fn: String::new(),
            out_fh: None,
            max_age: TimeDelta::try_days(max_age_days).unwrap_or(TimeDelta::days(7)),
        }
    }

    /// 寫入訊息；日期變更時先切換到新檔案並清理過期檔案
    pub fn write_msg(&mut self, now: DateTime<Local>, msg: &[u8]) -> io::Result<()> {
        let filename = now.format(&self.fn_pattern).to_string();

        if filename != self.cur_fn || self.out_fh.is_none() {
            self.open(filename)?;
            self.cleanup_old_files(now);
        }

        match self.out_fh.as_mut() {
            Some(writer) => writer.write_all(msg),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "log file not opened")),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.out_fh.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn open(&mut self, filename: String) -> io::Result<()> {
        self.flush()?;

        if let Some(parent) = Path::new(&filename).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        self.out_fh = Some(BufWriter::with_capacity(4096, file));
        self.cur_fn = filename;

        Ok(())
    }

    /// 刪除同目錄下超過保留期限的 `.log` 檔
    fn cleanup_old_files(&self, now: DateTime<Local>) {
        let cut_off: SystemTime = (now - self.max_age).into();

        let files = match Self::files_in_directory(&self.cur_fn) {
            Ok(files) => files,
            Err(why) => {
                logging::error_console(format!(
                    "Failed to list_files_in_directory because {:?}",
                    why
                ));
                return;
            }
        };

        for file in files {
            if file.extension().and_then(|e| e.to_str()) != Some("log")
                || file == Path::new(&self.cur_fn)
            {
                continue;
            }

            let expired = fs::metadata(&file)
                .and_then(|metadata| metadata.modified())
                .map(|modified| modified <= cut_off)
                .unwrap_or(false);

            if expired {
                if let Err(why) = fs::remove_file(&file) {
                    logging::error_console(format!(
                        "couldn't remove the file({}). because {:?}",
                        file.display(),
                        why
                    ));
                }
            }
        }
    }

    fn files_in_directory<P: AsRef<Path>>(file_path: P) -> Result<Vec<PathBuf>, io::Error> {
        let parent_dir = file_path
            .as_ref()
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Parent directory not found"))?;

        let mut files = Vec::new();
        for entry in fs::read_dir(parent_dir)? {
            files.push(entry?.path());
        }

        Ok(files)
    }
}

impl Drop for Rotate {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
