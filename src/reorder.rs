//! Manual Reorder
//!
//! Works out the new `order` (and possibly `priority`) for a ticket dropped
//! into a slot of the displayed list. `order` only ranks tickets within the
//! same priority. It ascends down the list unless the sort asks for
//! descending order after priority.

use crate::filter::{order_direction, sorted_by_priority, Direction, SortKey};
use crate::models::{Ticket, TicketKey, TicketPatch};
use crate::tickets::TicketStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Manual order only means something when the view is banded by priority
    NotSortedByPriority,
    /// The dragged ticket is not in the displayed list
    NotDisplayed,
    /// Dropped between two bands, neither of them the ticket's own
    AmbiguousPriority,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::NotSortedByPriority => "Sort by priority first to reorder tickets by hand.",
            RejectReason::NotDisplayed => "That ticket is not in the current view.",
            RejectReason::AmbiguousPriority => {
                "Drop the ticket next to a ticket of the priority it should have."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReorderOutcome {
    /// Dropped where it already was
    Unchanged,
    /// New position within the ticket's own priority
    Reorder { order: f64 },
    /// Moving there means changing priority; ask the user first
    ChangePriority { priority: i32, order: f64 },
    /// Snap back
    Rejected(RejectReason),
}

impl ReorderOutcome {
    /// The edit to send, if any
    pub fn patch(&self) -> Option<TicketPatch> {
        match *self {
            ReorderOutcome::Reorder { order } => Some(TicketPatch { order: Some(order), ..Default::default() }),
            ReorderOutcome::ChangePriority { priority, order } => Some(TicketPatch {
                priority: Some(priority),
                order: Some(order),
                ..Default::default()
            }),
            ReorderOutcome::Unchanged | ReorderOutcome::Rejected(_) => None,
        }
    }
}

/// Order for a slot between `prev` and `next` (either may be missing)
fn order_between(prev: Option<&Ticket>, next: Option<&Ticket>, direction: Direction) -> Option<f64> {
    // Going down the list, order grows by `step`
    let step = match direction {
        Direction::Asc => 1.0,
        Direction::Desc => -1.0,
    };
    match (prev, next) {
        (Some(a), Some(b)) => Some((a.order + b.order) / 2.0),
        (Some(a), None) => Some(a.order + step),
        (None, Some(b)) => Some(b.order - step),
        (None, None) => None,
    }
}

/// Convert a gap in the full list (0 = above the first row) into an index
/// in the list with `key` removed
pub fn slot_to_index(displayed: &[TicketKey], key: TicketKey, slot: usize) -> usize {
    match displayed.iter().position(|k| *k == key) {
        Some(from) if from < slot => slot - 1,
        _ => slot,
    }
}

/// Resolve dropping `key` into slot `new_index` of `displayed`.
///
/// `new_index` counts positions in the list with the dragged ticket removed.
pub fn ui_on_reorder_item_to(
    store: &TicketStore,
    displayed: &[TicketKey],
    key: TicketKey,
    new_index: usize,
    sort: &[SortKey],
) -> ReorderOutcome {
    if !sorted_by_priority(sort) {
        return ReorderOutcome::Rejected(RejectReason::NotSortedByPriority);
    }
    let (Some(from), Some(ticket)) = (displayed.iter().position(|k| *k == key), store.get(key)) else {
        return ReorderOutcome::Rejected(RejectReason::NotDisplayed);
    };

    let rest: Vec<&Ticket> = displayed
        .iter()
        .filter(|k| **k != key)
        .filter_map(|k| store.get(*k))
        .collect();
    let index = new_index.min(rest.len());
    if index == from {
        return ReorderOutcome::Unchanged;
    }

    let prev = index.checked_sub(1).and_then(|i| rest.get(i)).copied();
    let next = rest.get(index).copied();
    let own = |t: &&Ticket| t.priority == ticket.priority;
    let direction = order_direction(sort);

    if let Some(order) = order_between(prev.filter(own), next.filter(own), direction) {
        return ReorderOutcome::Reorder { order };
    }

    // No neighbor shares the ticket's priority
    let priority = match (prev, next) {
        (Some(a), Some(b)) if a.priority == b.priority => a.priority,
        (Some(a), None) => a.priority,
        (None, Some(b)) => b.priority,
        _ => return ReorderOutcome::Rejected(RejectReason::AmbiguousPriority),
    };
    match order_between(prev, next, direction) {
        Some(order) => ReorderOutcome::ChangePriority { priority, order },
        None => ReorderOutcome::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{default_sort, ui_filter_tickets, SortField, TicketFilter};
    use crate::tickets::tests::{store_of, ticket};

    // Displayed (priority desc, order asc): 10 11 12 | 20 21 | 30
    fn sample() -> (TicketStore, Vec<TicketKey>) {
        let store = store_of(vec![
            ticket(10, None, 5, 1.0),
            ticket(11, None, 5, 2.0),
            ticket(12, None, 5, 3.0),
            ticket(20, None, 4, 1.0),
            ticket(21, None, 4, 4.0),
            ticket(30, None, 3, 0.0),
        ]);
        let displayed = ui_filter_tickets(&store, &TicketFilter::default(), &default_sort());
        assert_eq!(displayed, vec![10, 11, 12, 20, 21, 30]);
        (store, displayed)
    }

    fn resolve(key: TicketKey, index: usize) -> ReorderOutcome {
        let (store, displayed) = sample();
        ui_on_reorder_item_to(&store, &displayed, key, index, &default_sort())
    }

    #[test]
    fn test_midpoint_between_neighbors() {
        // 12 between 10 and 11
        assert_eq!(resolve(12, 1), ReorderOutcome::Reorder { order: 1.5 });
    }

    #[test]
    fn test_extrapolate_at_band_edges() {
        // 12 to the top of the list
        assert_eq!(resolve(12, 0), ReorderOutcome::Reorder { order: 0.0 });
        // 10 after 12, next neighbor is a different band
        assert_eq!(resolve(10, 2), ReorderOutcome::Reorder { order: 4.0 });
        // 21 to the front of its band, prev neighbor is a different band
        assert_eq!(resolve(21, 3), ReorderOutcome::Reorder { order: 0.0 });
    }

    #[test]
    fn test_descending_order_extrapolates_downward() {
        let store = store_of(vec![ticket(1, None, 3, 1.0), ticket(2, None, 3, 2.0), ticket(3, None, 3, 3.0)]);
        let sort = vec![SortKey::asc(SortField::Priority), SortKey::desc(SortField::Order)];
        let displayed = ui_filter_tickets(&store, &TicketFilter::default(), &sort);
        assert_eq!(displayed, vec![3, 2, 1]);

        // 1 to the top lands above 3
        assert_eq!(
            ui_on_reorder_item_to(&store, &displayed, 1, 0, &sort),
            ReorderOutcome::Reorder { order: 4.0 }
        );

        // 3 to the bottom lands below 1
        let outcome = ui_on_reorder_item_to(&store, &displayed, 3, 2, &sort);
        assert_eq!(outcome, ReorderOutcome::Reorder { order: 0.0 });

        let mut store = store;
        store.apply_patch(3, &outcome.patch().unwrap());
        assert_eq!(ui_filter_tickets(&store, &TicketFilter::default(), &sort), vec![2, 1, 3]);
    }

    #[test]
    fn test_same_slot_is_unchanged() {
        assert_eq!(resolve(11, 1), ReorderOutcome::Unchanged);
        let (store, _) = sample();
        assert_eq!(
            ui_on_reorder_item_to(&store, &[30], 30, 5, &default_sort()),
            ReorderOutcome::Unchanged
        );
    }

    #[test]
    fn test_drop_inside_other_band_proposes_priority_change() {
        // 30 between 10 and 11
        assert_eq!(resolve(30, 1), ReorderOutcome::ChangePriority { priority: 5, order: 1.5 });
        // 10 to the very end, after 30
        assert_eq!(resolve(10, 5), ReorderOutcome::ChangePriority { priority: 3, order: 1.0 });
    }

    #[test]
    fn test_drop_between_two_foreign_bands_is_rejected() {
        // 30 between 12 (priority 5) and 20 (priority 4)
        assert_eq!(resolve(30, 3), ReorderOutcome::Rejected(RejectReason::AmbiguousPriority));
    }

    #[test]
    fn test_requires_priority_sort() {
        let (store, displayed) = sample();
        let sort = vec![SortKey::asc(SortField::Title)];
        assert_eq!(
            ui_on_reorder_item_to(&store, &displayed, 10, 2, &sort),
            ReorderOutcome::Rejected(RejectReason::NotSortedByPriority)
        );
    }

    #[test]
    fn test_hidden_ticket_is_rejected() {
        let (store, _) = sample();
        assert_eq!(
            ui_on_reorder_item_to(&store, &[10, 11], 30, 0, &default_sort()),
            ReorderOutcome::Rejected(RejectReason::NotDisplayed)
        );
    }

    #[test]
    fn test_slot_to_index() {
        let displayed = [10, 11, 12];
        // Gap above 10 and the gap below 10 are both "first"
        assert_eq!(slot_to_index(&displayed, 10, 0), 0);
        assert_eq!(slot_to_index(&displayed, 10, 1), 0);
        assert_eq!(slot_to_index(&displayed, 10, 3), 2);
        assert_eq!(slot_to_index(&displayed, 12, 0), 0);
        assert_eq!(slot_to_index(&displayed, 12, 2), 2);
        assert_eq!(slot_to_index(&displayed, 99, 1), 1);
    }

    #[test]
    fn test_outcome_patch() {
        assert_eq!(ReorderOutcome::Unchanged.patch(), None);
        let patch = ReorderOutcome::ChangePriority { priority: 4, order: 2.5 }.patch().unwrap();
        assert_eq!(patch.priority, Some(4));
        assert_eq!(patch.order, Some(2.5));
        assert_eq!(patch.title, None);
    }
}
