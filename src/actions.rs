//! Ticket Actions
//!
//! Optimistic mutations: change the local cache, send the request, and
//! undo the local change if the request fails. No retries and no
//! cancellation; two requests for the same ticket may race.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use tracing::{debug, error, info, warn};

use crate::api::TicketApi;
use crate::error::ApiError;
use crate::filter::SortKey;
use crate::models::{NewTicket, TicketKey, TicketPatch};
use crate::reorder::{ui_on_reorder_item_to, ReorderOutcome};
use crate::tickets::TicketStore;
use crate::tree::would_create_cycle;

/// Somewhere a `TicketStore` lives. `None` once it has been disposed.
pub trait StoreHandle {
    fn with_mut<R>(&self, f: impl FnOnce(&mut TicketStore) -> R) -> Option<R>;
    fn peek<R>(&self, f: impl FnOnce(&TicketStore) -> R) -> Option<R>;
}

impl StoreHandle for RwSignal<TicketStore> {
    fn with_mut<R>(&self, f: impl FnOnce(&mut TicketStore) -> R) -> Option<R> {
        self.try_update(f)
    }

    fn peek<R>(&self, f: impl FnOnce(&TicketStore) -> R) -> Option<R> {
        self.try_with_untracked(f)
    }
}

impl StoreHandle for Rc<RefCell<TicketStore>> {
    fn with_mut<R>(&self, f: impl FnOnce(&mut TicketStore) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }

    fn peek<R>(&self, f: impl FnOnce(&TicketStore) -> R) -> Option<R> {
        Some(f(&self.borrow()))
    }
}

/// Fetch everything and replace the cache. Returns the ticket count.
pub async fn reload(store: &impl StoreHandle, api: &impl TicketApi) -> Result<usize, ApiError> {
    let payload = api.list_tickets().await.inspect_err(|e| {
        error!(target: "actions", "reload: {}", e);
    })?;
    store
        .with_mut(|s| s.replace_all(payload).map(|_| s.len()))
        .ok_or(ApiError::StoreGone)?
        .inspect_err(|e| error!(target: "actions", "reload: {}", e))
}

/// Create under a guessed key, then move to the key the server assigned.
///
/// A failed request leaves the local ticket in place; the next reload
/// drops it.
pub async fn create_ticket(
    store: &impl StoreHandle,
    api: &impl TicketApi,
    new: NewTicket,
) -> Result<TicketKey, ApiError> {
    let pending = store.with_mut(|s| s.insert_optimistic(&new)).ok_or(ApiError::StoreGone)?;
    match api.create_ticket(&new).await {
        Ok(real_key) => {
            store.with_mut(|s| s.confirm_created(pending, real_key));
            info!(target: "actions", "create_ticket: success, key {}", real_key);
            Ok(real_key)
        }
        Err(e) => {
            store.with_mut(|s| s.abandon_created(pending));
            warn!(target: "actions", "create_ticket: {}", e);
            Err(e)
        }
    }
}

/// Remove locally, restore the ticket and its children if the server refuses
pub async fn delete_ticket(
    store: &impl StoreHandle,
    api: &impl TicketApi,
    key: TicketKey,
) -> Result<(), ApiError> {
    info!(target: "actions", "delete_ticket: deleting {}", key);
    let deleted = store
        .with_mut(|s| s.remove_optimistic(key))
        .ok_or(ApiError::StoreGone)?
        .ok_or(ApiError::UnknownTicket(key))?;

    match api.delete_ticket(key).await {
        Ok(()) => {
            info!(target: "actions", "delete_ticket: success");
            Ok(())
        }
        Err(e) => {
            warn!(target: "actions", "delete_ticket: {}, restoring {}", e, key);
            store.with_mut(|s| s.restore_deleted(deleted));
            Err(e)
        }
    }
}

/// Apply `patch` locally and send it; put the old values back on failure
pub async fn update_ticket(
    store: &impl StoreHandle,
    api: &impl TicketApi,
    key: TicketKey,
    patch: TicketPatch,
) -> Result<(), ApiError> {
    if patch.is_empty() {
        return Ok(());
    }
    let shadow = store
        .with_mut(|s| s.apply_patch(key, &patch))
        .ok_or(ApiError::StoreGone)?
        .ok_or(ApiError::UnknownTicket(key))?;
    if shadow.is_empty() {
        debug!(target: "actions", "update_ticket: {} already up to date", key);
        return Ok(());
    }

    // Only what actually changed goes over the wire
    let body = patch.restricted_to(&shadow);
    match api.update_ticket(key, &body).await {
        Ok(()) => {
            info!(target: "actions", "update_ticket: {} saved", key);
            Ok(())
        }
        Err(e) => {
            warn!(target: "actions", "update_ticket: {}, reverting {}", e, key);
            store.with_mut(|s| s.restore_shadow(key, &shadow));
            Err(e)
        }
    }
}

/// Drop `key` into slot `new_index` of the displayed list.
///
/// `confirm` is asked before a drop that changes priority; declining
/// returns `Unchanged`. Rejections come back as-is for the caller to report.
pub async fn reorder_ticket(
    store: &impl StoreHandle,
    api: &impl TicketApi,
    displayed: &[TicketKey],
    key: TicketKey,
    new_index: usize,
    sort: &[SortKey],
    confirm: impl FnOnce(&ReorderOutcome) -> bool,
) -> Result<ReorderOutcome, ApiError> {
    let outcome = store
        .peek(|s| ui_on_reorder_item_to(s, displayed, key, new_index, sort))
        .ok_or(ApiError::StoreGone)?;
    debug!(target: "actions", "reorder_ticket: {} to slot {} -> {:?}", key, new_index, outcome);

    if let ReorderOutcome::ChangePriority { .. } = outcome {
        if !confirm(&outcome) {
            return Ok(ReorderOutcome::Unchanged);
        }
    }
    if let Some(patch) = outcome.patch() {
        update_ticket(store, api, key, patch).await?;
    }
    Ok(outcome)
}

/// Move `key` under `new_parent`. Returns false without sending anything
/// when that would close a loop or changes nothing.
pub async fn reparent_ticket(
    store: &impl StoreHandle,
    api: &impl TicketApi,
    key: TicketKey,
    new_parent: Option<TicketKey>,
) -> Result<bool, ApiError> {
    let (current, cycle) = store
        .peek(|s| {
            let current = s.get(key).map(|t| t.parent);
            let cycle = new_parent.map_or(false, |p| would_create_cycle(s, key, p));
            (current, cycle)
        })
        .ok_or(ApiError::StoreGone)?;

    let Some(current) = current else {
        return Err(ApiError::UnknownTicket(key));
    };
    if cycle {
        warn!(target: "actions", "reparent_ticket: {:?} is below {}, refusing", new_parent, key);
        return Ok(false);
    }
    if current == new_parent {
        return Ok(false);
    }

    let patch = TicketPatch { parent: Some(new_parent), ..Default::default() };
    update_ticket(store, api, key, patch).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::default_sort;
    use crate::models::TicketsPayload;
    use crate::tickets::tests::{store_of, ticket};
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::Cell;

    /// Records requests; fails every request while `fail` is set
    #[derive(Default)]
    struct MockApi {
        fail: Cell<bool>,
        next_key: Cell<TicketKey>,
        calls: RefCell<Vec<String>>,
    }

    impl MockApi {
        fn failing() -> Self {
            let api = Self::default();
            api.fail.set(true);
            api
        }

        fn result(&self, call: String) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(call);
            if self.fail.get() {
                return Err(ApiError::Status { status: 500, body: "boom".into() });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl TicketApi for MockApi {
        async fn list_tickets(&self) -> Result<TicketsPayload, ApiError> {
            self.result("GET".into())?;
            Ok(serde_json::from_value(json!({
                "count": 2,
                "max_key": 9,
                "name_types": ["Task"],
                "name_priorities": ["Low"],
                "name_statuses": ["Open"],
                "tickets": {
                    "keys": [3, 9],
                    "parents": [null, 3],
                    "titles": ["a", "b"],
                    "descriptions": ["", ""],
                    "types": [0, 0],
                    "priorities": [0, 0],
                    "statuses": [0, 0]
                }
            }))?)
        }

        async fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketKey, ApiError> {
            self.result(format!("POST {}", ticket.title))?;
            Ok(self.next_key.get())
        }

        async fn update_ticket(&self, key: TicketKey, patch: &TicketPatch) -> Result<(), ApiError> {
            self.result(format!("PATCH {} {}", key, serde_json::to_string(patch)?))
        }

        async fn delete_ticket(&self, key: TicketKey) -> Result<(), ApiError> {
            self.result(format!("DELETE {}", key))
        }
    }

    fn sample() -> Rc<RefCell<TicketStore>> {
        Rc::new(RefCell::new(store_of(vec![
            ticket(1, None, 3, 0.0),
            ticket(2, Some(1), 3, 1.0),
            ticket(3, Some(1), 4, 0.0),
        ])))
    }

    #[tokio::test]
    async fn test_reload_replaces_cache() {
        let store = sample();
        let count = reload(&store, &MockApi::default()).await.unwrap();
        assert_eq!(count, 2);
        let s = store.borrow();
        assert_eq!(s.max_key, 9);
        assert!(!s.contains(1));
        assert_eq!(s.get(3).unwrap().children, vec![9]);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_cache() {
        let store = sample();
        assert!(reload(&store, &MockApi::failing()).await.is_err());
        assert_eq!(store.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_create_moves_to_server_key() {
        let store = sample();
        let api = MockApi::default();
        api.next_key.set(7);
        let new = NewTicket { title: "new".into(), parent: Some(1), ..Default::default() };

        let key = create_ticket(&store, &api, new).await.unwrap();
        assert_eq!(key, 7);
        let s = store.borrow();
        assert!(!s.contains(4));
        assert_eq!(s.get(7).unwrap().title, "new");
        assert_eq!(s.get(1).unwrap().children, vec![2, 3, 7]);
        assert_eq!(s.max_key, 7);
        assert_eq!(api.calls(), vec!["POST new"]);
    }

    #[tokio::test]
    async fn test_failed_create_keeps_local_ticket() {
        let store = sample();
        let new = NewTicket { title: "new".into(), ..Default::default() };
        assert!(create_ticket(&store, &MockApi::failing(), new).await.is_err());
        assert_eq!(store.borrow().get(4).unwrap().title, "new");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = sample();
        let api = MockApi::default();
        delete_ticket(&store, &api, 1).await.unwrap();
        let s = store.borrow();
        assert!(!s.contains(1));
        assert_eq!(s.get(2).unwrap().parent, None);
        assert_eq!(api.calls(), vec!["DELETE 1"]);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_ticket_and_children() {
        let store = sample();
        let err = delete_ticket(&store, &MockApi::failing(), 1).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        let s = store.borrow();
        assert!(s.contains(1));
        assert_eq!(s.get(2).unwrap().parent, Some(1));
        assert_eq!(s.get(3).unwrap().parent, Some(1));
        assert_eq!(s.get(1).unwrap().children, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_delete_unknown_ticket() {
        let store = sample();
        let api = MockApi::default();
        let err = delete_ticket(&store, &api, 42).await.unwrap_err();
        assert!(matches!(err, ApiError::UnknownTicket(42)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_patch() {
        let store = sample();
        let api = MockApi::default();
        let patch = TicketPatch { title: Some("renamed".into()), ..Default::default() };
        update_ticket(&store, &api, 2, patch).await.unwrap();
        assert_eq!(store.borrow().get(2).unwrap().title, "renamed");
        assert_eq!(api.calls(), vec![r#"PATCH 2 {"title":"renamed"}"#]);

        // Fields already holding the requested value are left out of the body
        let patch = TicketPatch {
            title: Some("renamed".into()),
            status: Some(2),
            ..Default::default()
        };
        update_ticket(&store, &api, 2, patch).await.unwrap();
        assert_eq!(api.calls()[1], r#"PATCH 2 {"status":2}"#);
    }

    #[tokio::test]
    async fn test_failed_update_restores_only_changed_fields() {
        let store = sample();
        let patch = TicketPatch {
            title: Some("renamed".into()),
            status: Some(2),
            ..Default::default()
        };
        assert!(update_ticket(&store, &MockApi::failing(), 2, patch).await.is_err());
        let s = store.borrow();
        let t = s.get(2).unwrap();
        assert_eq!(t.title, "Ticket 2");
        assert_eq!(t.status, 0);
    }

    #[tokio::test]
    async fn test_noop_update_sends_nothing() {
        let store = sample();
        let api = MockApi::default();
        let patch = TicketPatch { priority: Some(3), ..Default::default() };
        update_ticket(&store, &api, 2, patch).await.unwrap();
        update_ticket(&store, &api, 2, TicketPatch::default()).await.unwrap();
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_within_band() {
        let store = sample();
        let api = MockApi::default();
        // Displayed: 3 (priority 4) | 1, 2 (priority 3)
        let displayed = vec![3, 1, 2];
        let outcome = reorder_ticket(&store, &api, &displayed, 2, 1, &default_sort(), |_| {
            panic!("no confirmation needed")
        })
        .await
        .unwrap();
        assert_eq!(outcome, ReorderOutcome::Reorder { order: -1.0 });
        assert_eq!(store.borrow().get(2).unwrap().order, -1.0);
    }

    #[tokio::test]
    async fn test_declined_priority_change_snaps_back() {
        let store = sample();
        let api = MockApi::default();
        let displayed = vec![3, 1, 2];
        // 3 to the end, below the priority 3 band
        let outcome = reorder_ticket(&store, &api, &displayed, 3, 2, &default_sort(), |_| false)
            .await
            .unwrap();
        assert_eq!(outcome, ReorderOutcome::Unchanged);
        assert_eq!(store.borrow().get(3).unwrap().priority, 4);
        assert!(api.calls().is_empty());

        let outcome = reorder_ticket(&store, &api, &displayed, 3, 2, &default_sort(), |_| true)
            .await
            .unwrap();
        assert_eq!(outcome, ReorderOutcome::ChangePriority { priority: 3, order: 2.0 });
        assert_eq!(store.borrow().get(3).unwrap().priority, 3);
    }

    #[tokio::test]
    async fn test_reparent() {
        let store = sample();
        let api = MockApi::default();
        assert!(reparent_ticket(&store, &api, 3, Some(2)).await.unwrap());
        assert_eq!(store.borrow().get(2).unwrap().children, vec![3]);
        assert_eq!(api.calls(), vec![r#"PATCH 3 {"parent":2}"#]);

        assert!(reparent_ticket(&store, &api, 2, None).await.unwrap());
        assert_eq!(api.calls().last().unwrap(), r#"PATCH 2 {"parent":null}"#);
    }

    #[tokio::test]
    async fn test_reparent_refuses_cycle() {
        let store = sample();
        let api = MockApi::default();
        assert!(!reparent_ticket(&store, &api, 1, Some(2)).await.unwrap());
        assert!(!reparent_ticket(&store, &api, 2, Some(1)).await.unwrap());
        assert!(api.calls().is_empty());
        assert_eq!(store.borrow().get(1).unwrap().parent, None);
    }
}
