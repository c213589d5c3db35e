pub mod submission;
pub mod export;

pub use submission::{FormError, SubjectRequest, ValidSubject, validate_subject};
pub use export::export_subject_to_csv;
