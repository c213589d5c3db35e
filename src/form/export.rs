use std::fs::OpenOptions;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::AppError;
use crate::parser::CSV_HEADER;
use crate::schedule::SubjectId;
use super::submission::ValidSubject;

/// Appends one validated subject to a subject CSV, writing the header for a new file
pub fn export_subject_to_csv(id: SubjectId, subject: &ValidSubject, csv_path: &Path) -> Result<(), AppError> {
    let needs_header = !csv_path.exists() || std::fs::metadata(csv_path)?.len() == 0;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        wtr.write_record(CSV_HEADER)?;
    }

    let id = id.to_string();
    let start = subject.slot.start().to_string();
    let end = subject.slot.end().to_string();
    let required = if subject.required { "yes" } else { "no" };

    wtr.write_record([
        id.as_str(),
        subject.name.as_str(),
        subject.slot.day().as_str(),
        start.as_str(),
        end.as_str(),
        required,
    ])?;

    wtr.flush()?;
    Ok(())
}
