use csv::Reader;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::error::AppError;
use crate::schedule::{Candidate, SubjectId};

pub const CSV_HEADER: [&str; 6] = ["id", "name", "day", "start", "end", "required"];

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

/// Loads subject candidates from a CSV file
///
/// Columns are found by header name, falling back to the standard order
/// `id,name,day,start,end,required`. A later row with the same id replaces
/// the earlier one in place. Rows without a name or a numeric id are
/// skipped; slot text is kept as-is so the builder can report bad slots.
pub fn load_subjects<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Candidate>, AppError> {
    let reader = Reader::from_path(csv_path)?;
    read_subjects(reader)
}

pub fn read_subjects<R: Read>(mut reader: Reader<R>) -> Result<Vec<Candidate>, AppError> {
    let headers = reader.headers()?.clone();
    let column = |name: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .unwrap_or(fallback)
    };

    let id_col = column("id", 0);
    let name_col = column("name", 1);
    let day_col = column("day", 2);
    let start_col = column("start", 3);
    let end_col = column("end", 4);
    let required_col = column("required", 5);

    let mut entries: Vec<Candidate> = Vec::new();
    let mut positions: HashMap<SubjectId, usize> = HashMap::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |col: usize| record.get(col).unwrap_or("").trim().to_string();

        let name = field(name_col);
        let id = match field(id_col).parse::<u64>() {
            Ok(id) if !name.is_empty() => SubjectId(id),
            _ => {
                warn!(row = row + 2, "skipping subject row without a name or numeric id");
                continue;
            }
        };

        let candidate = Candidate {
            id,
            name,
            day: field(day_col),
            start: field(start_col),
            end: field(end_col),
            required: parse_bool(&field(required_col)),
        };

        match positions.get(&id) {
            Some(&at) => entries[at] = candidate,
            None => {
                positions.insert(id, entries.len());
                entries.push(candidate);
            }
        }
    }

    Ok(entries)
}
