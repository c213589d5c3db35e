use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::earliest_end::place_by_earliest_end;
use super::types::{Candidate, Rejection, RejectionReason, Schedule, ScheduleOutcome, Subject, SubjectId};

/// How a partition of subjects is placed into the schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Input order, first accepted wins
    #[default]
    Greedy,
    /// Sweep by ascending end time; maximizes the accepted count per partition
    EarliestEnd,
}

/// Order in which optional subjects are considered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum OptionalOrder {
    #[default]
    Input,
    /// Seeded shuffle, reproducible for a given seed
    Shuffled { seed: u64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub optional_order: OptionalOrder,
}

/// A valid subject tagged with its position in the caller's list
pub(super) type Placement = (usize, Subject);

/// Builds a conflict-free schedule, required subjects first, greedy
pub fn build_schedule(candidates: &[Candidate]) -> ScheduleOutcome {
    build_schedule_with(candidates, &GenerateOptions::default())
}

/// Builds a schedule with an explicit strategy and optional ordering
pub fn build_schedule_with(candidates: &[Candidate], options: &GenerateOptions) -> ScheduleOutcome {
    let mut invalid = Vec::new();
    let mut required: Vec<Placement> = Vec::new();
    let mut optional: Vec<Placement> = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        match candidate.to_subject() {
            Ok(subject) if subject.required => required.push((index, subject)),
            Ok(subject) => optional.push((index, subject)),
            Err(error) => {
                debug!(id = %candidate.id, %error, "candidate has an invalid slot");
                invalid.push(Rejection {
                    candidate: candidate.clone(),
                    reason: RejectionReason::InvalidSlot { error },
                });
            }
        }
    }

    if let OptionalOrder::Shuffled { seed } = options.optional_order {
        optional.shuffle(&mut StdRng::seed_from_u64(seed));
    }

    let place: fn(&mut Schedule, Vec<Placement>) -> Vec<(usize, SubjectId)> = match options.strategy {
        Strategy::Greedy => place_in_order,
        Strategy::EarliestEnd => place_by_earliest_end,
    };

    let mut schedule = Schedule::new();
    let mut conflicts: Vec<(usize, RejectionReason)> = Vec::new();
    conflicts.extend(
        place(&mut schedule, required)
            .into_iter()
            .map(|(index, with)| (index, RejectionReason::RequiredConflict { with })),
    );
    conflicts.extend(
        place(&mut schedule, optional)
            .into_iter()
            .map(|(index, with)| (index, RejectionReason::OptionalConflict { with })),
    );
    conflicts.sort_by_key(|(index, _)| *index);

    let rejected: Vec<Rejection> = conflicts
        .into_iter()
        .map(|(index, reason)| Rejection {
            candidate: candidates[index].clone(),
            reason,
        })
        .collect();

    info!(
        candidates = candidates.len(),
        accepted = schedule.len(),
        rejected = rejected.len(),
        invalid = invalid.len(),
        strategy = ?options.strategy,
        "schedule built"
    );

    ScheduleOutcome {
        accepted: schedule,
        rejected,
        invalid,
    }
}

/// Accepts each subject in the given order unless it overlaps; no eviction
///
/// Returns the rejected positions paired with the id of the blocking subject.
pub(super) fn place_in_order(schedule: &mut Schedule, batch: Vec<Placement>) -> Vec<(usize, SubjectId)> {
    let mut rejected = Vec::new();
    for (index, subject) in batch {
        let id = subject.id;
        match schedule.try_insert(subject) {
            Ok(()) => debug!(%id, "accepted"),
            Err(blocker) => {
                debug!(%id, %blocker, "rejected, overlaps an accepted subject");
                rejected.push((index, blocker));
            }
        }
    }
    rejected
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(id: u64, day: &str, start: &str, end: &str, required: bool) -> Candidate {
        Candidate {
            id: SubjectId(id),
            name: format!("Subject {id}"),
            day: day.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            required,
        }
    }

    fn accepted_ids(outcome: &ScheduleOutcome) -> Vec<u64> {
        let mut ids: Vec<u64> = outcome.accepted.iter().map(|s| s.id.0).collect();
        ids.sort();
        ids
    }

    #[test]
    fn required_conflict_keeps_first_accepted() {
        let candidates = vec![
            candidate(1, "MONDAY", "09:00", "10:00", true),
            candidate(2, "MONDAY", "09:30", "10:30", true),
            candidate(3, "MONDAY", "11:00", "12:00", false),
        ];
        let outcome = build_schedule(&candidates);

        assert_eq!(accepted_ids(&outcome), vec![1, 3]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].candidate, candidates[1]);
        assert_eq!(
            outcome.rejected[0].reason,
            RejectionReason::RequiredConflict { with: SubjectId(1) }
        );
        assert!(outcome.invalid.is_empty());
    }

    #[test]
    fn required_wins_over_earlier_optional() {
        let candidates = vec![
            candidate(1, "TUESDAY", "13:00", "15:00", false),
            candidate(2, "TUESDAY", "14:00", "16:00", true),
        ];
        let outcome = build_schedule(&candidates);

        assert_eq!(accepted_ids(&outcome), vec![2]);
        assert_eq!(
            outcome.rejected[0].reason,
            RejectionReason::OptionalConflict { with: SubjectId(2) }
        );
    }

    #[test]
    fn rejections_follow_input_order() {
        let candidates = vec![
            candidate(1, "MONDAY", "09:00", "12:00", true),
            candidate(2, "MONDAY", "10:00", "11:00", false),
            candidate(3, "MONDAY", "11:00", "13:00", true),
            candidate(4, "MONDAY", "08:00", "09:30", false),
        ];
        let outcome = build_schedule(&candidates);

        let rejected: Vec<u64> = outcome.rejected.iter().map(|r| r.candidate.id.0).collect();
        assert_eq!(rejected, vec![2, 3, 4]);
        assert_eq!(accepted_ids(&outcome), vec![1]);
    }

    #[test]
    fn invalid_slots_are_reported_separately_and_do_not_stop_the_run() {
        let candidates = vec![
            candidate(1, "MONDAY", "10:00", "09:00", true),
            candidate(2, "NOTADAY", "09:00", "10:00", false),
            candidate(3, "MONDAY", "25:00", "26:00", false),
            candidate(4, "MONDAY", "09:00", "10:00", false),
        ];
        let outcome = build_schedule(&candidates);

        assert_eq!(accepted_ids(&outcome), vec![4]);
        assert!(outcome.rejected.is_empty());
        let invalid: Vec<u64> = outcome.invalid.iter().map(|r| r.candidate.id.0).collect();
        assert_eq!(invalid, vec![1, 2, 3]);
        assert!(outcome
            .invalid
            .iter()
            .all(|r| matches!(r.reason, RejectionReason::InvalidSlot { .. })));
    }

    #[test]
    fn building_twice_is_identical() {
        let candidates = vec![
            candidate(1, "MONDAY", "09:00", "10:30", false),
            candidate(2, "MONDAY", "10:00", "11:00", true),
            candidate(3, "FRIDAY", "09:00", "10:00", false),
            candidate(4, "FRIDAY", "09:30", "11:00", false),
            candidate(5, "SUNDAY", "11:00", "10:00", false),
        ];
        assert_eq!(build_schedule(&candidates), build_schedule(&candidates));

        let options = GenerateOptions {
            strategy: Strategy::Greedy,
            optional_order: OptionalOrder::Shuffled { seed: 7 },
        };
        assert_eq!(
            build_schedule_with(&candidates, &options),
            build_schedule_with(&candidates, &options)
        );
    }

    #[test]
    fn empty_input_builds_empty_schedule() {
        let outcome = build_schedule(&[]);
        assert!(outcome.accepted.is_empty());
        assert!(outcome.rejected.is_empty());
        assert!(outcome.invalid.is_empty());
    }

    #[test]
    fn shuffled_order_never_breaks_the_invariant() {
        let candidates: Vec<Candidate> = (0..12)
            .map(|i| {
                let start = format!("{:02}:00", 8 + i % 6);
                let end = format!("{:02}:30", 9 + i % 6);
                candidate(i, "THURSDAY", &start, &end, false)
            })
            .collect();

        for seed in 0..5 {
            let options = GenerateOptions {
                strategy: Strategy::Greedy,
                optional_order: OptionalOrder::Shuffled { seed },
            };
            let outcome = build_schedule_with(&candidates, &options);
            let accepted: Vec<_> = outcome.accepted.iter().collect();
            for (i, a) in accepted.iter().enumerate() {
                for b in &accepted[i + 1..] {
                    assert!(!super::super::slot_utils::overlaps(&a.slot, &b.slot));
                }
            }
            assert_eq!(outcome.accepted.len() + outcome.rejected.len(), candidates.len());
        }
    }

    #[test]
    fn options_deserialize_from_kebab_case() {
        let options: GenerateOptions = serde_json::from_str(
            r#"{"strategy":"earliest-end","optional_order":{"mode":"shuffled","seed":3}}"#,
        )
        .unwrap();
        assert_eq!(options.strategy, Strategy::EarliestEnd);
        assert_eq!(options.optional_order, OptionalOrder::Shuffled { seed: 3 });

        let defaults: GenerateOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, GenerateOptions::default());
    }
}
