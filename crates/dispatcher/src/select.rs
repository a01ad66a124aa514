//! Responder selection

use contracts::AvailabilityAnswer;

/// Nearest eligible answer
///
/// Eligible means available and capable. Ties on distance go to the answer
/// that arrived first.
pub fn select_responder(answers: &[AvailabilityAnswer]) -> Option<&AvailabilityAnswer> {
    answers
        .iter()
        .filter(|a| a.is_eligible())
        .reduce(|best, a| {
            if a.distance_km.total_cmp(&best.distance_km).is_lt() {
                a
            } else {
                best
            }
        })
}
