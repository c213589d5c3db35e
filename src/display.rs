use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::schedule::{format_time_range, Rejection, RejectionReason, ScheduleOutcome, Subject, TimetableGrid};

/// Formats a subject name, marking required subjects
pub fn format_subject_name(subject: &Subject) -> String {
    if subject.required {
        format!("{} *", subject.name)
    } else {
        subject.name.clone()
    }
}

fn describe_rejection(rejection: &Rejection) -> String {
    let c = &rejection.candidate;
    let what = format!("{} (ID: {}, {} {}-{})", c.name, c.id, c.day, c.start, c.end);
    match &rejection.reason {
        RejectionReason::InvalidSlot { error } => format!("{what}: invalid slot, {error}"),
        RejectionReason::RequiredConflict { with } => format!("{what}: required, conflicts with ID {with}"),
        RejectionReason::OptionalConflict { with } => format!("{what}: optional, conflicts with ID {with}"),
    }
}

/// Text report of one build: accepted list, rejections and the hour grid
pub struct TimetableReport<'a> {
    pub outcome: &'a ScheduleOutcome,
    pub grid: &'a TimetableGrid,
    pub generated_at: DateTime<Utc>,
}

impl TimetableReport<'_> {
    fn write_rejections(f: &mut fmt::Formatter<'_>, title: &str, rejections: &[Rejection]) -> fmt::Result {
        if rejections.is_empty() {
            return Ok(());
        }
        writeln!(f, "\n{} ({}):", title, rejections.len())?;
        for rejection in rejections {
            writeln!(f, "  - {}", describe_rejection(rejection))?;
        }
        Ok(())
    }

    fn write_grid(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nWeekly grid:")?;
        write!(f, "{:>6}", "")?;
        for day in &self.grid.days {
            write!(f, " | {:<14}", day.label())?;
        }
        writeln!(f)?;
        for &hour in &self.grid.hours {
            write!(f, "{:>2}:00 ", hour)?;
            for &day in &self.grid.days {
                let cell = self.grid.cell(day, hour).join(", ");
                write!(f, " | {:<14}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for TimetableReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "** Timetable ({}) **", self.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "Total subjects scheduled: {}", self.outcome.accepted.len())?;

        for subject in self.outcome.accepted.iter() {
            writeln!(
                f,
                "  {} {} {} (ID: {})",
                subject.slot.day().label(),
                format_time_range(&subject.slot),
                format_subject_name(subject),
                subject.id
            )?;
        }

        Self::write_rejections(f, "Not scheduled", &self.outcome.rejected)?;
        Self::write_rejections(f, "Invalid subjects", &self.outcome.invalid)?;
        self.write_grid(f)
    }
}

/// Renders the accepted list, the rejections and the hour grid as text
pub fn render_outcome(outcome: &ScheduleOutcome, grid: &TimetableGrid, generated_at: DateTime<Utc>) -> String {
    TimetableReport { outcome, grid, generated_at }.to_string()
}

/// Writes the rendered timetable to a file
pub fn write_schedule_to_file(
    outcome: &ScheduleOutcome,
    grid: &TimetableGrid,
    filename: &Path,
) -> Result<(), AppError> {
    fs::write(filename, render_outcome(outcome, grid, Utc::now()))?;
    Ok(())
}

/// Prints the timetable in a readable format
pub fn print_schedule(outcome: &ScheduleOutcome, grid: &TimetableGrid) {
    print!("{}", render_outcome(outcome, grid, Utc::now()));
}
