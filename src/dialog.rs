//! Browser Dialogs
//!
//! Blocking `confirm`/`alert` prompts for drag-and-drop decisions.

use crate::models::TicketKey;
use crate::reorder::ReorderOutcome;
use crate::tickets::TicketStore;

/// `window.confirm`; false when there is no window
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(message);
    }
}

/// Question asked before a drop changes a ticket's priority
pub fn priority_change_message(store: &TicketStore, key: TicketKey, outcome: &ReorderOutcome) -> Option<String> {
    let ReorderOutcome::ChangePriority { priority, .. } = outcome else {
        return None;
    };
    let current = store.get(key)?.priority;
    Some(format!(
        "Change the priority of {} from {} to {}?",
        store.display_key(key),
        store.priority_name(current),
        store.priority_name(*priority)
    ))
}
