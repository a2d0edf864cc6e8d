//! Filter and Sort
//!
//! Derives the displayed ticket list from the cache: keep tickets matching
//! the active filters, then sort by an ordered list of (field, direction).

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Ticket, TicketKey};
use crate::tickets::TicketStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Key,
    Title,
    Type,
    Status,
    Priority,
    Order,
    Parent,
    CreatedOn,
    LastUpdatedOn,
}

impl SortField {
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Key => "Key",
            SortField::Title => "Title",
            SortField::Type => "Type",
            SortField::Status => "Status",
            SortField::Priority => "Priority",
            SortField::Order => "Order",
            SortField::Parent => "Parent",
            SortField::CreatedOn => "Created",
            SortField::LastUpdatedOn => "Updated",
        }
    }

    fn compare(&self, a: &Ticket, b: &Ticket) -> Ordering {
        match self {
            SortField::Key => a.key.cmp(&b.key),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Type => a.ticket_type.cmp(&b.ticket_type),
            SortField::Status => a.status.cmp(&b.status),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Order => a.order.total_cmp(&b.order),
            SortField::Parent => a.parent.cmp(&b.parent),
            SortField::CreatedOn => a.created_on.cmp(&b.created_on),
            SortField::LastUpdatedOn => a.last_updated_on.cmp(&b.last_updated_on),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Asc => "▲",
            Direction::Desc => "▼",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: SortField) -> Self {
        Self { field, direction: Direction::Asc }
    }

    pub fn desc(field: SortField) -> Self {
        Self { field, direction: Direction::Desc }
    }
}

/// Default view: highest priority first, manual order inside each band
pub fn default_sort() -> Vec<SortKey> {
    vec![SortKey::desc(SortField::Priority), SortKey::asc(SortField::Key)]
}

/// Active filters. An empty set means no filtering on that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketFilter {
    pub priorities: BTreeSet<i32>,
    pub statuses: BTreeSet<i32>,
    pub types: BTreeSet<i32>,
    /// Case-insensitive match on title or display key
    pub text: String,
}

impl TicketFilter {
    pub fn is_empty(&self) -> bool {
        *self == TicketFilter::default()
    }

    pub fn matches(&self, ticket: &Ticket, display_key: &str) -> bool {
        let in_set = |set: &BTreeSet<i32>, value: i32| set.is_empty() || set.contains(&value);
        if !in_set(&self.priorities, ticket.priority)
            || !in_set(&self.statuses, ticket.status)
            || !in_set(&self.types, ticket.ticket_type)
        {
            return false;
        }
        let needle = self.text.trim().to_lowercase();
        needle.is_empty()
            || ticket.title.to_lowercase().contains(&needle)
            || display_key.to_lowercase().contains(&needle)
    }
}

/// Add `value` to the set if absent, remove it otherwise
pub fn toggle_value(set: &mut BTreeSet<i32>, value: i32) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

/// Expand the user's sort keys: `Order` ascending right after `Priority`
fn effective_sort(sort: &[SortKey]) -> Vec<SortKey> {
    let mut keys = Vec::with_capacity(sort.len() + 1);
    for (i, key) in sort.iter().enumerate() {
        keys.push(*key);
        let next_is_order = sort.get(i + 1).map_or(false, |k| k.field == SortField::Order);
        if key.field == SortField::Priority && !next_is_order {
            keys.push(SortKey::asc(SortField::Order));
        }
    }
    keys
}

/// Is the view banded by priority, so that manual reordering makes sense?
pub fn sorted_by_priority(sort: &[SortKey]) -> bool {
    sort.first().map_or(false, |k| k.field == SortField::Priority)
}

/// Direction of the manual order inside each priority band
pub fn order_direction(sort: &[SortKey]) -> Direction {
    effective_sort(sort)
        .iter()
        .find(|k| k.field == SortField::Order)
        .map_or(Direction::Asc, |k| k.direction)
}

/// Keys of the tickets to display, in display order
pub fn ui_filter_tickets(store: &TicketStore, filter: &TicketFilter, sort: &[SortKey]) -> Vec<TicketKey> {
    let keys = effective_sort(sort);
    let mut shown: Vec<&Ticket> = store
        .values()
        .filter(|t| filter.matches(t, &store.display_key(t.key)))
        .collect();

    shown.sort_by(|a, b| {
        keys.iter()
            .map(|k| k.direction.apply(k.field.compare(a, b)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| a.key.cmp(&b.key))
    });
    shown.into_iter().map(|t| t.key).collect()
}

/// Header click: flip the leading field, or bring another field to the front ascending
pub fn toggle_sort(sort: &[SortKey], field: SortField) -> Vec<SortKey> {
    let mut result: Vec<SortKey> = Vec::with_capacity(sort.len() + 1);
    match sort.first() {
        Some(first) if first.field == field => {
            result.push(SortKey { field, direction: first.direction.flip() });
        }
        _ => result.push(SortKey::asc(field)),
    }
    result.extend(sort.iter().filter(|k| k.field != field).copied());
    result
}
