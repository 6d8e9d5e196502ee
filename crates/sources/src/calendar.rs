//! Jalali calendar data source
//!
//! Converts the system clock into a Persian (Solar Hijri) date and a localized
//! weekday name. The conversion is pure arithmetic over the 33-year cycle and
//! holds for Gregorian years from 1600 onwards.

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;
use jsens_core::{
    DataSource, SourceConfig, SourceMetadata, CALENDAR_POLL_INTERVAL, MIN_POLL_INTERVAL_MS,
};
use jsens_types::{CalendarSample, CalendarSourceConfig, JalaliDate};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const GREGORIAN_DAYS_IN_MONTH: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const JALALI_DAYS_IN_MONTH: [i64; 12] = [31, 31, 31, 31, 31, 31, 30, 30, 30, 30, 30, 29];

/// Day number of 1 Farvardin 979 counted from 1 January 1600
const JALALI_EPOCH_OFFSET: i64 = 79;
/// Days in one 33-year cycle
const DAYS_PER_CYCLE: i64 = 12053;
/// Days in a four-year block
const DAYS_PER_QUAD: i64 = 1461;

/// Persian weekday names keyed by English weekday name
const WEEKDAY_NAMES: [(&str, &str); 7] = [
    ("Saturday", "شنبه"),
    ("Sunday", "یک\u{200c}شنبه"),
    ("Monday", "دوشنبه"),
    ("Tuesday", "سه\u{200c}شنبه"),
    ("Wednesday", "چهارشنبه"),
    ("Thursday", "پنج\u{200c}شنبه"),
    ("Friday", "جمعه"),
];

/// Look up the Persian name for an English weekday name.
///
/// Matching is exact. Anything not in the table maps to an empty string.
pub fn persian_weekday_name(english: &str) -> &'static str {
    WEEKDAY_NAMES
        .iter()
        .find(|(en, _)| *en == english)
        .map(|(_, fa)| *fa)
        .unwrap_or("")
}

fn english_weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn is_gregorian_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Convert a Gregorian date to the Jalali calendar
pub fn gregorian_to_jalali(date: NaiveDate) -> JalaliDate {
    let gy = i64::from(date.year()) - 1600;
    let gm = date.month0() as usize;

    let mut g_day_no = 365 * gy + (gy + 3).div_euclid(4) - (gy + 99).div_euclid(100)
        + (gy + 399).div_euclid(400);
    g_day_no += GREGORIAN_DAYS_IN_MONTH[..gm].iter().sum::<i64>();
    if gm > 1 && is_gregorian_leap_year(date.year()) {
        g_day_no += 1;
    }
    g_day_no += i64::from(date.day0());

    let j_day_no = g_day_no - JALALI_EPOCH_OFFSET;
    let cycles = j_day_no.div_euclid(DAYS_PER_CYCLE);
    let mut j_day_no = j_day_no.rem_euclid(DAYS_PER_CYCLE);

    let mut jy = 979 + 33 * cycles + 4 * (j_day_no / DAYS_PER_QUAD);
    j_day_no %= DAYS_PER_QUAD;
    if j_day_no >= 366 {
        jy += (j_day_no - 1) / 365;
        j_day_no = (j_day_no - 1) % 365;
    }

    let mut month = 0;
    while month < 11 && j_day_no >= JALALI_DAYS_IN_MONTH[month] {
        j_day_no -= JALALI_DAYS_IN_MONTH[month];
        month += 1;
    }

    JalaliDate::new(jy as i32, month as u32 + 1, j_day_no as u32 + 1)
}

/// Gregorian years the conversion supports with a four-digit Jalali year
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1600..=9999;

fn clamp_to_supported(date: NaiveDate) -> NaiveDate {
    let bound = if date.year() < *SUPPORTED_YEARS.start() {
        NaiveDate::from_ymd_opt(*SUPPORTED_YEARS.start(), 1, 1)
    } else if date.year() > *SUPPORTED_YEARS.end() {
        NaiveDate::from_ymd_opt(*SUPPORTED_YEARS.end(), 12, 31)
    } else {
        return date;
    };
    log::debug!("Clock reading {} outside the supported range, clamping", date);
    bound.unwrap_or(date)
}

/// Build the calendar reading for a local wall-clock time.
///
/// Readings outside Gregorian years 1600..=9999 are clamped into that range, so
/// the date string is always `YYYY/MM/DD` with a four-digit year.
pub fn sample_calendar(now: NaiveDateTime) -> CalendarSample {
    let date = clamp_to_supported(now.date());
    let weekday_name = persian_weekday_name(english_weekday_name(date.weekday()));
    CalendarSample::new(weekday_name, gregorian_to_jalali(date))
}

/// Calendar data source
///
/// Provides the Jalali date and weekday of the configured time zone.
pub struct CalendarSource {
    metadata: SourceMetadata,
    config: CalendarSourceConfig,
    /// Parsed form of `config.timezone`
    timezone: Option<Tz>,
    last_sample: Option<CalendarSample>,
    values: HashMap<String, Value>,
}

impl CalendarSource {
    pub fn new() -> Self {
        let metadata = SourceMetadata {
            id: "calendar".to_string(),
            default_interval: CALENDAR_POLL_INTERVAL,
        };

        Self {
            metadata,
            config: CalendarSourceConfig::default(),
            timezone: None,
            last_sample: None,
            values: HashMap::with_capacity(8),
        }
    }

    /// Set configuration
    pub fn set_config(&mut self, mut config: CalendarSourceConfig) {
        config.update_interval_ms = config.update_interval_ms.max(MIN_POLL_INTERVAL_MS);
        self.timezone = match config.timezone.as_deref() {
            None => None,
            Some(name) => match name.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(e) => {
                    log::warn!("Unknown time zone '{}', using local time: {}", name, e);
                    None
                }
            },
        };
        self.config = config;
    }

    pub fn get_config(&self) -> &CalendarSourceConfig {
        &self.config
    }

    pub fn last_sample(&self) -> Option<&CalendarSample> {
        self.last_sample.as_ref()
    }

    fn wall_clock_now(&self) -> NaiveDateTime {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }

    /// Refresh the cached values from an explicit clock reading
    pub fn update_at(&mut self, now: NaiveDateTime) {
        let sample = sample_calendar(now);

        self.values.clear();
        self.values
            .insert("weekday_name".to_string(), Value::from(sample.weekday_name.as_str()));
        self.values
            .insert("date_string".to_string(), Value::from(sample.date_string.as_str()));
        self.values.insert("year".to_string(), Value::from(sample.date.year));
        self.values.insert("month".to_string(), Value::from(sample.date.month));
        self.values.insert("day".to_string(), Value::from(sample.date.day));
        self.values
            .insert("text".to_string(), Value::from(sample.display_text()));

        self.last_sample = Some(sample);
    }
}

impl Default for CalendarSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for CalendarSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn update(&mut self) -> Result<()> {
        let now = self.wall_clock_now();
        self.update_at(now);
        Ok(())
    }

    fn values_ref(&self) -> &HashMap<String, Value> {
        &self.values
    }

    fn update_interval(&self) -> Duration {
        Duration::from_millis(self.config.update_interval_ms)
    }

    fn configure_typed(&mut self, config: &SourceConfig) -> Result<()> {
        if let SourceConfig::Calendar(calendar_config) = config {
            self.set_config(calendar_config.clone());
        }
        Ok(())
    }

    fn get_typed_config(&self) -> Option<SourceConfig> {
        Some(SourceConfig::Calendar(self.config.clone()))
    }
}
