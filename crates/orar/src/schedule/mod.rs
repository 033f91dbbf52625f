/// Calendar event synthesis from timetables
mod convert;
mod recurrence;
mod types;

pub use convert::{
    default_semester_start, event_from_entry, event_from_user_entry, event_id, events_from_timetable,
    events_from_user_timetable, next_weekday, parse_day, parse_hours, resolve_semester_start,
};
pub use recurrence::{
    align_to_parity, exclusion_dates, expand_series, resolve_until, semester_week, single_occurrence,
    synthesize_series, week_start, SeriesContext, FALLBACK_SEMESTER_WEEKS,
};
pub use types::*;
