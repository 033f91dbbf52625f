//! Scraper for Babeș-Bolyai University timetables and academic calendar,
//! and generator of iCalendar feeds that follow odd/even weeks and skip
//! vacations.

pub mod academic;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
mod html;
pub mod schedule;
pub mod timetable;

pub use config::OrarConfig;
pub use error::OrarError;
