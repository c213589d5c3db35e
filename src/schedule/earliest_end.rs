use super::generic::{place_in_order, Placement};
use super::types::{Schedule, SubjectId};

/// Interval-scheduling sweep: consider subjects by (day, end time)
///
/// Within a day, taking the compatible subject that ends first is optimal
/// for the count of accepted subjects, also when some of the day is already
/// occupied by earlier partitions. The sort is stable, so equal end times
/// keep their incoming order.
pub(super) fn place_by_earliest_end(schedule: &mut Schedule, mut batch: Vec<Placement>) -> Vec<(usize, SubjectId)> {
    batch.sort_by_key(|(_, subject)| (subject.slot.day(), subject.slot.end()));
    place_in_order(schedule, batch)
}
