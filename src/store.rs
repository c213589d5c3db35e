//! In-memory subject records, keyed by the caller's user identity.
//!
//! Stands in for the external persistence collaborator. Subjects keep their
//! insertion order, which is also their priority order when generating.

use std::collections::HashMap;

use thiserror::Error;

use crate::form::ValidSubject;
use crate::schedule::{Candidate, SubjectId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Subject {0} not found")]
    NotFound(SubjectId),
}

#[derive(Debug, Default)]
pub struct SubjectStore {
    by_user: HashMap<String, Vec<Candidate>>,
    last_id: u64,
}

impl SubjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, user: &str) -> Vec<Candidate> {
        self.by_user.get(user).cloned().unwrap_or_default()
    }

    pub fn create(&mut self, user: &str, subject: ValidSubject) -> Candidate {
        self.last_id += 1;
        let candidate = to_candidate(SubjectId(self.last_id), subject);
        self.by_user
            .entry(user.to_string())
            .or_default()
            .push(candidate.clone());
        candidate
    }

    pub fn update(&mut self, user: &str, id: SubjectId, subject: ValidSubject) -> Result<Candidate, StoreError> {
        let existing = self
            .by_user
            .get_mut(user)
            .and_then(|subjects| subjects.iter_mut().find(|s| s.id == id))
            .ok_or(StoreError::NotFound(id))?;
        *existing = to_candidate(id, subject);
        Ok(existing.clone())
    }

    pub fn delete(&mut self, user: &str, id: SubjectId) -> Result<(), StoreError> {
        let subjects = self.by_user.get_mut(user).ok_or(StoreError::NotFound(id))?;
        let before = subjects.len();
        subjects.retain(|s| s.id != id);
        if subjects.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn to_candidate(id: SubjectId, subject: ValidSubject) -> Candidate {
    Candidate {
        id,
        name: subject.name,
        day: subject.slot.day().as_str().to_string(),
        start: subject.slot.start().to_string(),
        end: subject.slot.end().to_string(),
        required: subject.required,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::validate_slot_input;

    fn valid(name: &str, start: &str, end: &str) -> ValidSubject {
        ValidSubject {
            name: name.to_string(),
            slot: validate_slot_input(Some("MONDAY"), Some(start), Some(end), None).unwrap(),
            required: false,
        }
    }

    #[test]
    fn records_are_scoped_per_user() {
        let mut store = SubjectStore::new();
        let a = store.create("alice", valid("Math", "09:00", "10:00"));
        store.create("bob", valid("Art", "11:00", "12:00"));

        assert_eq!(store.list("alice"), vec![a.clone()]);
        assert_eq!(store.list("bob").len(), 1);
        assert!(store.list("carol").is_empty());
        assert_eq!(store.delete("bob", a.id), Err(StoreError::NotFound(a.id)));
    }

    #[test]
    fn update_and_delete() {
        let mut store = SubjectStore::new();
        let first = store.create("alice", valid("Math", "09:00", "10:00"));
        let second = store.create("alice", valid("Art", "11:00", "12:00"));
        assert_ne!(first.id, second.id);

        let updated = store.update("alice", first.id, valid("Algebra", "9:30", "10:30")).unwrap();
        assert_eq!(updated.start, "09:30");
        assert_eq!(store.list("alice")[0].name, "Algebra");

        store.delete("alice", first.id).unwrap();
        assert_eq!(store.list("alice"), vec![second]);
        assert!(store.update("alice", first.id, valid("X", "09:00", "10:00")).is_err());
    }
}
