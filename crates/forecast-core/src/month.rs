//! 月份標籤（"YYYY-MM"）

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ForecastError, Result};

/// 日曆月份，內部固定為該月 1 日
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// 由年、月建立（月份 1-12）
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// 解析 "YYYY-MM" 標籤
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(ForecastError::InvalidMonth(label.to_string()));
        }

        NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ForecastError::InvalidMonth(label.to_string()))
    }

    /// 取得該月的日期（1 日）
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 月份（1-12）
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// 日曆位置（0-11，一月為 0）
    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    /// 往後推算 n 個月
    pub fn checked_add_months(&self, months: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(months)).map(Self)
    }

    /// 下一個月
    pub fn succ(&self) -> Option<Self> {
        self.checked_add_months(1)
    }

    /// 從本月到 `other` 相差的月數（`other` 較早時為負）
    pub fn months_until(&self, other: YearMonth) -> i64 {
        let years = i64::from(other.year()) - i64::from(self.year());
        years * 12 + i64::from(other.month0()) - i64::from(self.month0())
    }

    /// 產生緊接在本月之後的 `count` 個月份
    pub fn following(&self, count: u32) -> Result<Vec<YearMonth>> {
        (1..=count)
            .map(|offset| {
                self.checked_add_months(offset)
                    .ok_or_else(|| ForecastError::InvalidMonth(format!("{} + {}", self, offset)))
            })
            .collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::parse(&label).map_err(serde::de::Error::custom)
    }
}
