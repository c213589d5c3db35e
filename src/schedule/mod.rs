pub mod types;
pub mod slot_utils;
pub mod generic;
mod earliest_end;
pub mod grid;

pub use types::{Candidate, DayOfWeek, Rejection, RejectionReason, Schedule, ScheduleOutcome, Subject, SubjectId, TimeOfDay, TimeSlot};
pub use slot_utils::{enumerate_slots_starting_at, format_time_range, overlaps, parse_time, validate_range, validate_slot_input, TimeOptions, ValidationResult};
pub use generic::{build_schedule, build_schedule_with, GenerateOptions, OptionalOrder, Strategy};
pub use grid::TimetableGrid;
