//! jsens-sources: Data source implementations for the jsens overlay.

mod calendar;
mod counters;
mod network;

pub use calendar::{gregorian_to_jalali, persian_weekday_name, sample_calendar, CalendarSource};
pub use counters::{CounterError, NetworkCounters, SysinfoCounters};
pub use network::{
    download_label, format_rate, select_default_interface, upload_label, NetworkSource,
    ThroughputSampler,
};
