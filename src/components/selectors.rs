//! Selector Components
//!
//! Dropdowns for the enum fields (type, status, priority) and the parent.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::models::{NameTable, TicketKey};
use crate::tickets::TicketStore;
use crate::tree::{all_children, flatten_tree, ticket_subgraph};

/// Which name table a `NameSelector` lists
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKind {
    Type,
    Status,
    Priority,
}

impl NameKind {
    pub fn label(&self) -> &'static str {
        match self {
            NameKind::Type => "Type",
            NameKind::Status => "Status",
            NameKind::Priority => "Priority",
        }
    }

    pub fn table<'a>(&self, store: &'a TicketStore) -> &'a NameTable {
        match self {
            NameKind::Type => &store.name_types,
            NameKind::Status => &store.name_statuses,
            NameKind::Priority => &store.name_priorities,
        }
    }
}

/// (value, name) pairs of a name table, including `current` even if the
/// table does not list it
pub fn name_options(table: &NameTable, current: i32) -> Vec<(i32, String)> {
    let mut options: Vec<(i32, String)> = table.iter().map(|(v, n)| (v, n.to_string())).collect();
    if !options.iter().any(|(v, _)| *v == current) {
        options.push((current, current.to_string()));
        options.sort_by_key(|(v, _)| *v);
    }
    options
}

/// Dropdown over one of the server's name tables
#[component]
pub fn NameSelector(
    kind: NameKind,
    #[prop(into)] value: Signal<i32>,
    #[prop(into)] on_change: Callback<i32>,
) -> impl IntoView {
    let ctx = use_app_context();
    let options = move || {
        let current = value.get();
        ctx.tickets.with(|s| name_options(kind.table(s), current))
    };

    view! {
        <label class="field">
            <span class="field-label">{kind.label()}</span>
            <select on:change=move |ev| {
                if let Ok(v) = event_target_value(&ev).parse::<i32>() {
                    on_change.run(v);
                }
            }>
                {move || options().into_iter().map(|(v, name)| {
                    view! {
                        <option value=v.to_string() selected=move || value.get() == v>{name}</option>
                    }
                }).collect_view()}
            </select>
        </label>
    }
}

/// Dropdown of possible parents, indented by depth.
///
/// `editing` and its descendants are left out so the choice cannot close a loop.
#[component]
pub fn ParentSelector(
    #[prop(into)] value: Signal<Option<TicketKey>>,
    #[prop(optional)] editing: Option<TicketKey>,
    #[prop(into)] on_change: Callback<Option<TicketKey>>,
) -> impl IntoView {
    let ctx = use_app_context();
    let options = move || {
        ctx.tickets.with(|s| {
            let excluded: Vec<TicketKey> = match editing {
                Some(key) => {
                    let mut keys = all_children(&ticket_subgraph(s), key);
                    keys.push(key);
                    keys
                }
                None => Vec::new(),
            };
            flatten_tree(s)
                .into_iter()
                .filter(|(k, _)| !excluded.contains(k))
                .map(|(k, depth)| {
                    let title = s.get(k).map(|t| t.title.clone()).unwrap_or_default();
                    (k, format!("{}{} {}", "\u{a0}\u{a0}".repeat(depth), s.display_key(k), title))
                })
                .collect::<Vec<_>>()
        })
    };

    view! {
        <label class="field">
            <span class="field-label">"Parent"</span>
            <select on:change=move |ev| {
                let raw = event_target_value(&ev);
                on_change.run(raw.parse::<TicketKey>().ok().filter(|k| *k > 0));
            }>
                <option value="0" selected=move || value.get().is_none()>"(none)"</option>
                {move || options().into_iter().map(|(k, label)| {
                    view! {
                        <option value=k.to_string() selected=move || value.get() == Some(k)>{label}</option>
                    }
                }).collect_view()}
            </select>
        </label>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_options_include_current() {
        let table: NameTable = [(0, "Task".to_string()), (2, "Bug".to_string())].into_iter().collect();
        assert_eq!(name_options(&table, 2), vec![(0, "Task".to_string()), (2, "Bug".to_string())]);
        assert_eq!(
            name_options(&table, 1),
            vec![(0, "Task".to_string()), (1, "1".to_string()), (2, "Bug".to_string())]
        );
    }
}
