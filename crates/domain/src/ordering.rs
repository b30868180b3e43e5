//! Dense ordering arithmetic.
//!
//! These functions only plan writes. The sequencer loads the slots of one
//! scope, asks for a plan and hands the resulting [`PositionChange`]s to the
//! store inside a transaction.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::RequestId;

/// The ordering-relevant part of a request row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSlot {
    /// Request identifier.
    pub request_id: RequestId,
    /// Current stored position, `None` when never assigned.
    pub position: Option<i64>,
}

impl SortSlot {
    /// Creates a slot.
    #[must_use]
    pub const fn new(request_id: RequestId, position: Option<i64>) -> Self {
        Self {
            request_id,
            position,
        }
    }

    const fn key(&self) -> (bool, Option<i64>, RequestId) {
        (self.position.is_none(), self.position, self.request_id)
    }
}

/// A single position write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    /// Request to update.
    pub request_id: RequestId,
    /// Position before the write.
    pub from: Option<i64>,
    /// Position after the write.
    pub to: i64,
}

/// Plans the writes that make a scope dense.
///
/// Slots are ordered positioned-first, then by position, then by id, and
/// assigned `0..n`. Only slots whose position actually changes are returned,
/// so planning against an already dense scope yields nothing.
#[must_use]
pub fn normalize(slots: &[SortSlot]) -> Vec<PositionChange> {
    let mut ordered: Vec<SortSlot> = slots.to_vec();
    ordered.sort_by_key(SortSlot::key);

    ordered
        .iter()
        .zip(0_i64..)
        .filter(|(slot, position)| slot.position != Some(*position))
        .map(|(slot, position)| PositionChange {
            request_id: slot.request_id,
            from: slot.position,
            to: position,
        })
        .collect()
}

/// Clamps a requested target into the valid range of a scope of `len` slots.
#[must_use]
pub fn clamp_target(len: usize, target: i64) -> i64 {
    let last = i64::try_from(len).unwrap_or(i64::MAX).saturating_sub(1).max(0);
    target.clamp(0, last)
}

/// Plans a move of `request_id` to `target` within a dense scope.
///
/// Moving down decrements every other slot in `(current, target]`; moving up
/// increments every other slot in `[target, current)`. The moved slot is
/// written last. An unchanged position yields an empty plan.
///
/// `target` must already be clamped with [`clamp_target`].
///
/// # Errors
///
/// Returns an error if `request_id` is not among `slots` or has no position.
pub fn reposition(
    slots: &[SortSlot],
    request_id: RequestId,
    target: i64,
) -> DomainResult<Vec<PositionChange>> {
    let moved = slots
        .iter()
        .find(|s| s.request_id == request_id)
        .ok_or(DomainError::RequestNotInScope(request_id))?;
    let current = moved
        .position
        .ok_or(DomainError::UnpositionedRequest(request_id))?;

    if current == target {
        return Ok(Vec::new());
    }

    let mut changes: Vec<PositionChange> = slots
        .iter()
        .filter(|s| s.request_id != request_id)
        .filter_map(|s| {
            let position = s.position?;
            let to = if current < target && position > current && position <= target {
                position - 1
            } else if current > target && position >= target && position < current {
                position + 1
            } else {
                return None;
            };
            Some(PositionChange {
                request_id: s.request_id,
                from: Some(position),
                to,
            })
        })
        .collect();

    changes.push(PositionChange {
        request_id,
        from: Some(current),
        to: target,
    });
    Ok(changes)
}
