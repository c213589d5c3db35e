use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SlotError;
use crate::schedule::{validate_slot_input, TimeOfDay, TimeSlot};

pub const MAX_NAME_LEN: usize = 30;

/// Subject form data from the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRequest {
    pub name: String,
    #[serde(alias = "dayofweek", alias = "dayOfWeek")]
    pub day: Option<String>,
    #[serde(alias = "starttime", alias = "startTime")]
    pub start: Option<String>,
    #[serde(alias = "endtime", alias = "endTime")]
    pub end: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// A subject form that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubject {
    pub name: String,
    pub slot: TimeSlot,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Subject name is required")]
    EmptyName,

    #[error("Subject name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Validates a subject form against the latest selectable end time
pub fn validate_subject(req: &SubjectRequest, max_end: Option<TimeOfDay>) -> Result<ValidSubject, FormError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(FormError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FormError::NameTooLong { max: MAX_NAME_LEN });
    }

    let max_end = max_end.map(|t| t.to_string());
    let slot = validate_slot_input(
        req.day.as_deref(),
        req.start.as_deref(),
        req.end.as_deref(),
        max_end.as_deref(),
    )?;

    Ok(ValidSubject {
        name: name.to_string(),
        slot,
        required: req.required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, day: Option<&str>, start: Option<&str>, end: Option<&str>) -> SubjectRequest {
        SubjectRequest {
            name: name.to_string(),
            day: day.map(String::from),
            start: start.map(String::from),
            end: end.map(String::from),
            required: false,
        }
    }

    fn six_pm() -> Option<TimeOfDay> {
        TimeOfDay::from_hm(18, 0)
    }

    #[test]
    fn accepts_a_complete_form() {
        let valid = validate_subject(&request("  Calculus ", Some("MONDAY"), Some("09:00"), Some("10:30")), six_pm()).unwrap();
        assert_eq!(valid.name, "Calculus");
        assert_eq!(valid.slot.start().to_string(), "09:00");
    }

    #[test]
    fn rejects_blank_and_long_names() {
        assert_eq!(
            validate_subject(&request(" ", Some("MONDAY"), Some("09:00"), Some("10:00")), None),
            Err(FormError::EmptyName)
        );
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            validate_subject(&request(&long, Some("MONDAY"), Some("09:00"), Some("10:00")), None),
            Err(FormError::NameTooLong { max: MAX_NAME_LEN })
        );
    }

    #[test]
    fn surfaces_slot_errors() {
        assert_eq!(
            validate_subject(&request("Art", Some("MONDAY"), None, Some("10:00")), None),
            Err(FormError::Slot(SlotError::MissingField { field: "start time" }))
        );
        assert!(matches!(
            validate_subject(&request("Art", Some("MONDAY"), Some("17:30"), Some("18:30")), six_pm()),
            Err(FormError::Slot(SlotError::ExceedsBound { .. }))
        ));
    }

    #[test]
    fn accepts_frontend_field_names() {
        let req: SubjectRequest = serde_json::from_str(
            r#"{"name":"Biology","dayofweek":"TUESDAY","starttime":"13:00","endtime":"14:00","required":true}"#,
        )
        .unwrap();
        let valid = validate_subject(&req, six_pm()).unwrap();
        assert!(valid.required);
        assert_eq!(valid.slot.day().as_str(), "TUESDAY");
    }
}
