use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::SlotError;
use super::slot_utils::{overlaps, parse_time};

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time, stored as minutes since midnight (0..=1439)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Builds a time from a checked hour/minute pair
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(TimeOfDay(hour * 60 + minute))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(TimeOfDay(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_time(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// The seven weekdays, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Full uppercase name, as stored and serialized ("MONDAY")
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
            DayOfWeek::Sunday => "SUNDAY",
        }
    }

    /// Short display label ("MON")
    pub fn label(self) -> &'static str {
        &self.as_str()[..3]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = SlotError;

    /// Accepts the full name or the three-letter label, in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == wanted || day.label() == wanted)
            .ok_or_else(|| SlotError::UnknownDay { input: s.to_string() })
    }
}

/// A weekly recurring interval `[start, end)` on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeSlot {
    /// Fails with `InvertedRange` unless `start < end`
    pub fn new(day: DayOfWeek, start: TimeOfDay, end: TimeOfDay) -> Result<Self, SlotError> {
        if start >= end {
            return Err(SlotError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(TimeSlot { day, start, end })
    }

    pub fn day(&self) -> DayOfWeek {
        self.day
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }
}

/// Opaque key assigned by whoever owns the subject records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A subject as supplied by a collaborator, slot still in text form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: SubjectId,
    pub name: String,
    pub day: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub required: bool,
}

impl Candidate {
    /// Converts the raw slot, failing the same way form validation would
    pub fn to_subject(&self) -> Result<Subject, SlotError> {
        let slot = super::slot_utils::validate_slot_input(
            Some(&self.day),
            Some(&self.start),
            Some(&self.end),
            None,
        )?;
        Ok(Subject {
            id: self.id,
            name: self.name.clone(),
            slot,
            required: self.required,
        })
    }
}

/// A subject whose slot has been validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub slot: TimeSlot,
    pub required: bool,
}

/// Accepted subjects keyed by (day, start); no two entries overlap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: BTreeMap<(DayOfWeek, TimeOfDay), Subject>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subjects ordered by day, then start time
    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.entries.values()
    }

    pub fn on_day(&self, day: DayOfWeek) -> impl Iterator<Item = &Subject> {
        self.entries
            .range((day, TimeOfDay::MIDNIGHT)..)
            .take_while(move |((d, _), _)| *d == day)
            .map(|(_, subject)| subject)
    }

    pub fn contains(&self, id: SubjectId) -> bool {
        self.entries.values().any(|s| s.id == id)
    }

    /// Earliest-starting accepted subject that overlaps `slot`, if any
    pub fn conflict_with(&self, slot: &TimeSlot) -> Option<&Subject> {
        // Entries on a day are disjoint, so ends ascend with starts.
        self.entries
            .range((slot.day(), TimeOfDay::MIDNIGHT)..(slot.day(), slot.end()))
            .rev()
            .map(|(_, subject)| subject)
            .take_while(|subject| subject.slot.end() > slot.start())
            .last()
            .filter(|subject| overlaps(&subject.slot, slot))
    }

    /// Accepts `subject` unless it overlaps, returning the blocker's id
    pub fn try_insert(&mut self, subject: Subject) -> Result<(), SubjectId> {
        if let Some(blocker) = self.conflict_with(&subject.slot) {
            return Err(blocker.id);
        }
        self.entries
            .insert((subject.slot.day(), subject.slot.start()), subject);
        Ok(())
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

/// Why a candidate was left out of the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidSlot { error: SlotError },
    RequiredConflict { with: SubjectId },
    OptionalConflict { with: SubjectId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub candidate: Candidate,
    #[serde(flatten)]
    pub reason: RejectionReason,
}

/// Result of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleOutcome {
    pub accepted: Schedule,
    /// Conflict rejections, in input order
    pub rejected: Vec<Rejection>,
    /// Candidates whose slot could not be built, in input order
    pub invalid: Vec<Rejection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: DayOfWeek, start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(day, start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn subject(id: u64, slot: TimeSlot) -> Subject {
        Subject { id: SubjectId(id), name: format!("S{id}"), slot, required: false }
    }

    #[test]
    fn zero_length_slot_is_rejected_at_construction() {
        let nine = TimeOfDay::from_hm(9, 0).unwrap();
        assert!(matches!(
            TimeSlot::new(DayOfWeek::Monday, nine, nine),
            Err(SlotError::InvertedRange { .. })
        ));
    }

    #[test]
    fn day_parses_names_and_labels() {
        assert_eq!("monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!("THU".parse::<DayOfWeek>().unwrap(), DayOfWeek::Thursday);
        assert_eq!(DayOfWeek::Sunday.label(), "SUN");
        assert!(matches!("Funday".parse::<DayOfWeek>(), Err(SlotError::UnknownDay { .. })));
    }

    #[test]
    fn time_of_day_serializes_as_clock_text() {
        let t = TimeOfDay::from_hm(8, 5).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"08:05\"");
        let back: TimeOfDay = serde_json::from_str("\"8:05\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<TimeOfDay>("\"24:00\"").is_err());
    }

    #[test]
    fn schedule_reports_earliest_blocker() {
        let mut schedule = Schedule::new();
        schedule.try_insert(subject(1, slot(DayOfWeek::Monday, "09:00", "10:00"))).unwrap();
        schedule.try_insert(subject(2, slot(DayOfWeek::Monday, "10:00", "11:00"))).unwrap();
        schedule.try_insert(subject(3, slot(DayOfWeek::Monday, "12:00", "13:00"))).unwrap();

        let wide = slot(DayOfWeek::Monday, "09:30", "12:30");
        assert_eq!(schedule.conflict_with(&wide).map(|s| s.id), Some(SubjectId(1)));

        let gap = slot(DayOfWeek::Monday, "11:00", "12:00");
        assert!(schedule.conflict_with(&gap).is_none());

        let other_day = slot(DayOfWeek::Tuesday, "09:00", "13:00");
        assert!(schedule.conflict_with(&other_day).is_none());

        assert_eq!(
            schedule.try_insert(subject(4, slot(DayOfWeek::Monday, "12:30", "14:00"))),
            Err(SubjectId(3))
        );
    }

    #[test]
    fn schedule_iterates_by_day_then_start() {
        let mut schedule = Schedule::new();
        schedule.try_insert(subject(1, slot(DayOfWeek::Tuesday, "09:00", "10:00"))).unwrap();
        schedule.try_insert(subject(2, slot(DayOfWeek::Monday, "13:00", "14:00"))).unwrap();
        schedule.try_insert(subject(3, slot(DayOfWeek::Monday, "08:00", "09:00"))).unwrap();

        let ids: Vec<u64> = schedule.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(schedule.on_day(DayOfWeek::Monday).count(), 2);
        assert!(schedule.contains(SubjectId(1)));
    }
}
