//! Weekly timetable planning: time-slot model, conflict detection and a
//! schedule builder, plus the CSV, text and HTTP surfaces around them.

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod parser;
pub mod schedule;
pub mod store;
pub mod web;

pub use error::{AppError, SlotError};
pub use schedule::{build_schedule, build_schedule_with, validate_slot_input};
