//! Ticket Store
//!
//! In-memory cache of the server's tickets, time table and name tables.
//!
//! Mutations are optimistic: the cache changes first and each mutating call
//! hands back what is needed to undo it if the request fails.
//! - create: the ticket gets a guessed key, corrected once the server answers
//! - delete: the removed ticket and the children it orphaned
//! - edit: a shadow patch with the previous values of the changed fields

use std::collections::{BTreeMap, HashSet};

use crate::error::ApiError;
use crate::format::{self, ARROW};
use crate::models::{NameTable, NewTicket, Ticket, TicketKey, TicketPatch, TicketsPayload};
use crate::time::TimeTable;

/// Handle for a ticket created locally and not yet confirmed by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingCreate(u64);

/// What an optimistic delete removed
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedTicket {
    pub ticket: Ticket,
    /// Tickets whose parent was cleared
    pub children: Vec<TicketKey>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketStore {
    pub tickets: BTreeMap<TicketKey, Ticket>,
    pub time: TimeTable,
    pub name_types: NameTable,
    pub name_priorities: NameTable,
    pub name_statuses: NameTable,
    pub max_key: TicketKey,
    /// Optimistic creations in flight: handle -> current local key
    pending: BTreeMap<u64, TicketKey>,
    next_pending: u64,
}

fn swap_field<T: Clone + PartialEq>(slot: &mut T, new: &Option<T>, shadow: &mut Option<T>) {
    if let Some(value) = new {
        if slot != value {
            *shadow = Some(std::mem::replace(slot, value.clone()));
        }
    }
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a freshly loaded payload.
    ///
    /// The payload is fully decoded before anything is touched, so a bad
    /// payload leaves the store as it was.
    pub fn replace_all(&mut self, payload: TicketsPayload) -> Result<(), ApiError> {
        let time = TimeTable::from_columns(&payload.ticket_time)?;
        let tickets = payload.tickets.into_tickets()?;

        tracing::info!(
            target: "store",
            "replace_all: {}/{} ticket(s), max_key={}",
            tickets.len(),
            payload.count,
            payload.max_key
        );

        self.tickets = tickets.into_iter().map(|t| (t.key, t)).collect();
        self.time = time;
        self.name_types = payload.name_types;
        self.name_priorities = payload.name_priorities;
        self.name_statuses = payload.name_statuses;
        self.max_key = payload.max_key;
        // Anything still pending is either in the payload now or will be on the next load
        self.pending.clear();
        self.rebuild_children();
        Ok(())
    }

    pub fn get(&self, key: TicketKey) -> Option<&Ticket> {
        self.tickets.get(&key)
    }

    pub fn contains(&self, key: TicketKey) -> bool {
        self.tickets.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &Ticket> + '_ {
        self.tickets.values()
    }

    /// Best guess for the key the server will hand out next
    pub fn likely_next_ticket_number(&self) -> TicketKey {
        let local_max = self.tickets.keys().next_back().copied().unwrap_or(0);
        self.max_key.max(local_max) + 1
    }

    /// Order value placing a ticket last in its priority band
    pub fn next_order(&self, priority: i32) -> f64 {
        self.tickets
            .values()
            .filter(|t| t.priority == priority)
            .map(|t| t.order)
            .fold(None, |acc: Option<f64>, o| Some(acc.map_or(o, |a| a.max(o))))
            .map_or(0.0, |max| max + 1.0)
    }

    pub fn pending_key(&self, pending: PendingCreate) -> Option<TicketKey> {
        self.pending.get(&pending.0).copied()
    }

    // ========================
    // Optimistic Create
    // ========================

    /// Insert a ticket under a guessed key
    pub fn insert_optimistic(&mut self, new: &NewTicket) -> PendingCreate {
        let key = self.likely_next_ticket_number();
        let ticket = Ticket::from_new(key, new, self.next_order(new.priority));
        self.tickets.insert(key, ticket);

        let handle = PendingCreate(self.next_pending);
        self.next_pending += 1;
        self.pending.insert(handle.0, key);
        self.rebuild_children();
        handle
    }

    /// Move a pending ticket to the key the server assigned.
    ///
    /// If another pending ticket sits on `real_key`, the two swap keys.
    pub fn confirm_created(&mut self, pending: PendingCreate, real_key: TicketKey) {
        self.max_key = self.max_key.max(real_key);
        let Some(guess) = self.pending.remove(&pending.0) else {
            return;
        };
        if guess == real_key {
            return;
        }
        let Some(mut ticket) = self.tickets.remove(&guess) else {
            return;
        };
        tracing::info!(target: "store", "create_ticket: replacing {} => {}", guess, real_key);

        let mut swapped = false;
        if let Some(mut other) = self.tickets.remove(&real_key) {
            match self.pending.values_mut().find(|k| **k == real_key) {
                Some(slot) => {
                    *slot = guess;
                    other.key = guess;
                    self.tickets.insert(guess, other);
                    swapped = true;
                }
                None => {
                    tracing::warn!(target: "store", "create_ticket: dropping stale local ticket {}", real_key);
                }
            }
        }

        ticket.key = real_key;
        self.tickets.insert(real_key, ticket);
        for t in self.tickets.values_mut() {
            t.parent = match t.parent {
                Some(p) if p == guess => Some(real_key),
                Some(p) if p == real_key && swapped => Some(guess),
                other => other,
            };
        }
        self.rebuild_children();
    }

    /// Forget a pending creation that failed. The local ticket stays.
    pub fn abandon_created(&mut self, pending: PendingCreate) {
        self.pending.remove(&pending.0);
    }

    // ========================
    // Optimistic Delete
    // ========================

    /// Remove a ticket and detach its children, keeping both for a rollback
    pub fn remove_optimistic(&mut self, key: TicketKey) -> Option<DeletedTicket> {
        let ticket = self.tickets.remove(&key)?;
        let mut children = Vec::new();
        for t in self.tickets.values_mut() {
            if t.parent == Some(key) {
                tracing::debug!(
                    target: "store",
                    "delete_ticket: clearing the parent of {} - it was a child of {}",
                    t.key,
                    key
                );
                t.parent = None;
                children.push(t.key);
            }
        }
        self.rebuild_children();
        Some(DeletedTicket { ticket, children })
    }

    /// Undo `remove_optimistic`.
    ///
    /// Children re-parented in the meantime are left alone.
    pub fn restore_deleted(&mut self, deleted: DeletedTicket) {
        let key = deleted.ticket.key;
        self.tickets.entry(key).or_insert(deleted.ticket);
        for child in deleted.children {
            if let Some(t) = self.tickets.get_mut(&child) {
                if t.parent.is_none() {
                    t.parent = Some(key);
                }
            }
        }
        self.rebuild_children();
    }

    // ========================
    // Optimistic Edit
    // ========================

    /// Apply a patch and return its shadow: the previous values of exactly
    /// the fields that changed. `None` if the ticket is unknown.
    pub fn apply_patch(&mut self, key: TicketKey, patch: &TicketPatch) -> Option<TicketPatch> {
        let ticket = self.tickets.get_mut(&key)?;
        let mut shadow = TicketPatch::default();
        swap_field(&mut ticket.title, &patch.title, &mut shadow.title);
        swap_field(&mut ticket.description, &patch.description, &mut shadow.description);
        swap_field(&mut ticket.parent, &patch.parent, &mut shadow.parent);
        swap_field(&mut ticket.ticket_type, &patch.ticket_type, &mut shadow.ticket_type);
        swap_field(&mut ticket.status, &patch.status, &mut shadow.status);
        swap_field(&mut ticket.priority, &patch.priority, &mut shadow.priority);
        swap_field(&mut ticket.order, &patch.order, &mut shadow.order);

        if shadow.parent.is_some() {
            self.rebuild_children();
        }
        Some(shadow)
    }

    /// Put back the fields recorded in a shadow patch
    pub fn restore_shadow(&mut self, key: TicketKey, shadow: &TicketPatch) {
        let _ = self.apply_patch(key, shadow);
    }

    // ========================
    // Display
    // ========================

    pub fn display_key(&self, key: TicketKey) -> String {
        format::display_key(key, self.max_key)
    }

    /// Key with its ancestors, root first: `#01 ➤ #04 ➤ #09`
    pub fn display_key_with_parent(&self, key: TicketKey) -> String {
        let mut chain = vec![key];
        let mut seen = HashSet::from([key]);
        let mut current = self.get(key).and_then(|t| t.parent);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.get(parent).and_then(|t| t.parent);
        }
        chain
            .iter()
            .rev()
            .map(|k| self.display_key(*k))
            .collect::<Vec<_>>()
            .join(ARROW)
    }

    pub fn type_name(&self, value: i32) -> String {
        self.name_types.name(value)
    }

    pub fn priority_name(&self, value: i32) -> String {
        self.name_priorities.name(value)
    }

    pub fn status_name(&self, value: i32) -> String {
        self.name_statuses.name(value)
    }

    fn rebuild_children(&mut self) {
        let links: Vec<(TicketKey, TicketKey)> = self
            .tickets
            .values()
            .filter_map(|t| t.parent.map(|p| (p, t.key)))
            .collect();
        for t in self.tickets.values_mut() {
            t.children.clear();
        }
        // Keys iterate ascending, so children come out sorted
        for (parent, child) in links {
            if let Some(p) = self.tickets.get_mut(&parent) {
                p.children.push(child);
            }
        }
    }
}
