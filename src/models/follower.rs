use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const MINUTE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Most entries the history file may hold; oldest are evicted past this.
const MAX_ENTRIES: usize = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowerEntry {
    /// Minute-precision stamp, `YYYY-MM-DD HH:MM`.
    pub time: String,
    /// Calendar day the sample belongs to, `YYYY-MM-DD`.
    pub date: String,
    pub count: i64,
}

/// Growth stats served to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerGrowth {
    pub history: Vec<FollowerEntry>,
    pub growth_today: i64,
    pub growth_week: i64,
    pub growth_month: i64,
}

/// Hourly-bucketed follower counts in a single JSON file.
#[derive(Debug, Clone)]
pub struct FollowerHistory {
    path: PathBuf,
}

impl FollowerHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Vec<FollowerEntry> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    /// Record `count` at `now`. Samples within the same clock hour collapse
    /// into the last entry instead of appending.
    pub fn record(&self, count: i64, now: OffsetDateTime) -> Result<Vec<FollowerEntry>, String> {
        let mut history = self.load();

        let stamp = format_minute(now);
        let today = format_date(now);

        let current_hour = &stamp[..13];
        let same_hour = history
            .last()
            .map(|last| last.time.get(..13) == Some(current_hour))
            .unwrap_or(false);

        if same_hour {
            let last = history.last_mut().expect("non-empty history");
            last.count = count;
            last.time = stamp;
        } else {
            history.push(FollowerEntry {
                time: stamp,
                date: today,
                count,
            });
        }

        if history.len() > MAX_ENTRIES {
            let excess = history.len() - MAX_ENTRIES;
            history.drain(..excess);
        }

        let pretty = serde_json::to_string_pretty(&history)
            .map_err(|e| format!("failed to serialize follower history: {}", e))?;
        fs::write(&self.path, pretty)
            .map_err(|e| format!("failed to write {}: {}", self.path.display(), e))?;

        Ok(history)
    }

    /// Growth over the last day/week/month, read off the recorded history.
    ///
    /// Scans newest to oldest and takes, per horizon, the first entry at
    /// least that many whole days old. A horizon nothing crosses stays 0; a
    /// horizon whose first crossing has a zero delta stays open for an older
    /// entry to claim.
    pub fn compute_growth(&self, now: OffsetDateTime) -> FollowerGrowth {
        let history = self.load();
        if history.len() < 2 {
            return FollowerGrowth {
                history,
                growth_today: 0,
                growth_week: 0,
                growth_month: 0,
            };
        }

        let current = history[history.len() - 1].count;
        let mut growth_today = 0;
        let mut growth_week = 0;
        let mut growth_month = 0;

        for entry in history.iter().rev() {
            let days_ago = days_since(&entry.date, now);
            if days_ago >= 1 && growth_today == 0 {
                growth_today = current - entry.count;
            }
            if days_ago >= 7 && growth_week == 0 {
                growth_week = current - entry.count;
            }
            if days_ago >= 30 && growth_month == 0 {
                growth_month = current - entry.count;
            }
        }

        FollowerGrowth {
            history,
            growth_today,
            growth_week,
            growth_month,
        }
    }
}

fn format_minute(now: OffsetDateTime) -> String {
    now.format(MINUTE_FORMAT).expect("formatting timestamp")
}

fn format_date(now: OffsetDateTime) -> String {
    now.format(DATE_FORMAT).expect("formatting date")
}

/// Whole days between the entry's calendar day (at midnight) and `now`.
/// Unparseable dates age as 0 days.
fn days_since(date: &str, now: OffsetDateTime) -> i64 {
    let Ok(parsed) = Date::parse(date, DATE_FORMAT) else {
        return 0;
    };
    (now - parsed.midnight().assume_utc()).whole_days()
}
