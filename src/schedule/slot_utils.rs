use std::iter::FusedIterator;

use crate::error::SlotError;
use super::types::{DayOfWeek, TimeOfDay, TimeSlot, MINUTES_PER_DAY};

/// Parses a time string (HH:MM) to minutes since midnight
///
/// Both fields must be non-empty runs of ASCII digits, so "9:00" and "09:00"
/// are the same time. A well-formed field with too large a value is
/// `OutOfRange`, however many digits it has.
pub fn parse_time(time_str: &str) -> Result<TimeOfDay, SlotError> {
    let clean = time_str.trim();
    let invalid = || SlotError::InvalidFormat { input: time_str.to_string() };

    let (hours, minutes) = clean.split_once(':').ok_or_else(invalid)?;
    let is_field = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_field(hours) || !is_field(minutes) {
        return Err(invalid());
    }

    TimeOfDay::from_hm(field_value(hours), field_value(minutes)).ok_or_else(|| SlotError::OutOfRange { input: time_str.to_string() })
}

// Saturates, so long digit runs stay out of range instead of overflowing.
fn field_value(digits: &str) -> u16 {
    digits
        .bytes()
        .fold(0u16, |acc, b| acc.saturating_mul(10).saturating_add(u16::from(b - b'0')))
}

/// Half-open overlap: slots that only touch at an endpoint do not overlap
pub fn overlaps(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.day() == b.day() && a.start().max(b.start()) < a.end().min(b.end())
}

/// Result of checking a proposed range or slot
pub type ValidationResult<T = ()> = Result<T, SlotError>;

/// Checks a start/end pair, and optionally an upper bound on the end
pub fn validate_range(
    start: Option<&str>,
    end: Option<&str>,
    max_end: Option<&str>,
) -> ValidationResult<(TimeOfDay, TimeOfDay)> {
    let start = present(start, "start time")?;
    let end = present(end, "end time")?;

    let start = parse_time(start)?;
    let end = parse_time(end)?;
    if start >= end {
        return Err(SlotError::InvertedRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    if let Some(max_end) = max_end {
        let max_end = parse_time(max_end)?;
        if end > max_end {
            return Err(SlotError::ExceedsBound {
                end: end.to_string(),
                max_end: max_end.to_string(),
            });
        }
    }

    Ok((start, end))
}

/// Validates a single proposed slot at the form boundary
pub fn validate_slot_input(
    day: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    max_end: Option<&str>,
) -> ValidationResult<TimeSlot> {
    let day: DayOfWeek = present(day, "day")?.parse()?;
    let (start, end) = validate_range(start, end, max_end)?;
    TimeSlot::new(day, start, end)
}

fn present<'a>(value: Option<&'a str>, field: &'static str) -> ValidationResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SlotError::MissingField { field }),
    }
}

/// Formats a slot's range for display ("09:00 ~ 10:30")
pub fn format_time_range(slot: &TimeSlot) -> String {
    format!("{} ~ {}", slot.start(), slot.end())
}

/// Half-hour selection labels starting at `start_hour:00`
///
/// The sequence never runs past the end of the day, so it may be shorter
/// than `count` for late start hours.
pub fn enumerate_slots_starting_at(start_hour: u8, count: usize) -> TimeOptions {
    let first = u32::from(start_hour) * 60;
    let remaining_in_day = (u32::from(MINUTES_PER_DAY).saturating_sub(first) / 30) as usize;
    TimeOptions {
        next: first,
        remaining: count.min(remaining_in_day),
    }
}

/// Iterator returned by [`enumerate_slots_starting_at`]; clone it to restart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOptions {
    next: u32,
    remaining: usize,
}

impl Iterator for TimeOptions {
    type Item = TimeOfDay;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let time = TimeOfDay::from_minutes(self.next as u16)?;
        self.next += 30;
        self.remaining -= 1;
        Some(time)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for TimeOptions {}

impl FusedIterator for TimeOptions {}
