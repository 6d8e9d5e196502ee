//! Calendar sample types.

use serde::{Deserialize, Serialize};

/// A day in the Jalali (Solar Hijri) calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JalaliDate {
    pub year: i32,
    /// 1 = Farvardin, 12 = Esfand
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Format as `YYYY/MM/DD`, year padded to at least four digits
    pub fn format(&self) -> String {
        format!("{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// One reading of the calendar panel.
///
/// Recomputed on every tick; it has no identity and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSample {
    /// Localized weekday name, or empty if the weekday was not recognized
    pub weekday_name: String,
    /// `YYYY/MM/DD` in the Jalali calendar
    pub date_string: String,
    pub date: JalaliDate,
}

impl CalendarSample {
    pub fn new(weekday_name: impl Into<String>, date: JalaliDate) -> Self {
        Self {
            weekday_name: weekday_name.into(),
            date_string: date.format(),
            date,
        }
    }

    /// Two-line text shown on the calendar panel
    pub fn display_text(&self) -> String {
        format!("{}\n{}", self.weekday_name, self.date_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format_pads_components() {
        assert_eq!(JalaliDate::new(1403, 1, 1).format(), "1403/01/01");
        assert_eq!(JalaliDate::new(978, 10, 11).format(), "0978/10/11");
    }

    #[test]
    fn test_display_text_has_two_lines() {
        let sample = CalendarSample::new("جمعه", JalaliDate::new(1405, 7, 24));
        assert_eq!(sample.display_text(), "جمعه\n1405/07/24");
    }
}
