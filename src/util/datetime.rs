use std::sync::Mutex;

use chrono::{DateTime, Local};

/// 單調不遞減的時鐘
///
/// 系統時間被往回調整時，仍回傳上一次發出的時間，確保同一個行程內寫入的
/// `persisted_at` 不會倒退。
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Local>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 回傳 `max(now, 上一次回傳值)`
    pub fn now(&self) -> DateTime<Local> {
        self.next_after(Local::now())
    }

    fn next_after(&self, now: DateTime<Local>) -> DateTime<Local> {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let stamp = match *last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        *last = Some(stamp);

        stamp
    }
}
