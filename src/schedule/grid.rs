use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::Serialize;

use super::types::{DayOfWeek, Schedule};

/// Subject names per (day, hour) cell of a weekly timetable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableGrid {
    pub hours: Vec<u8>,
    pub days: Vec<DayOfWeek>,
    cells: BTreeMap<DayOfWeek, BTreeMap<u8, Vec<String>>>,
}

impl TimetableGrid {
    /// A subject fills every hour whose `[hh:00, hh+1:00)` span intersects its slot
    pub fn from_schedule(schedule: &Schedule, hours: RangeInclusive<u8>) -> Self {
        let mut cells: BTreeMap<DayOfWeek, BTreeMap<u8, Vec<String>>> = BTreeMap::new();
        for subject in schedule.iter() {
            let start = subject.slot.start().minutes();
            let end = subject.slot.end().minutes();
            for hour in hours.clone() {
                let cell_start = u16::from(hour) * 60;
                let cell_end = cell_start + 60;
                if start.max(cell_start) < end.min(cell_end) {
                    cells
                        .entry(subject.slot.day())
                        .or_default()
                        .entry(hour)
                        .or_default()
                        .push(subject.name.clone());
                }
            }
        }

        TimetableGrid {
            hours: hours.collect(),
            days: DayOfWeek::ALL.to_vec(),
            cells,
        }
    }

    pub fn cell(&self, day: DayOfWeek, hour: u8) -> &[String] {
        self.cells
            .get(&day)
            .and_then(|by_hour| by_hour.get(&hour))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
