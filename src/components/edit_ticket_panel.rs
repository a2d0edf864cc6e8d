//! Edit Ticket Panel Component
//!
//! Left panel editor for the ticket picked in the table. Saving sends only
//! the fields that changed.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions;
use crate::components::{DeleteConfirmButton, NameKind, NameSelector, ParentSelector};
use crate::context::use_app_context;
use crate::format::fmt_progress;
use crate::models::TicketKey;
use crate::store::UiStateStoreFields;
use crate::tree::{ticket_progress, ticket_subgraph, ProgressCache};

#[component]
pub fn EditTicketPanel(ticket_key: TicketKey) -> impl IntoView {
    let ctx = use_app_context();
    let key = ticket_key;
    let form = ctx.ui.edit_form();

    let heading = move || ctx.tickets.with(|s| s.display_key_with_parent(key));
    let rollup = move || {
        ctx.tickets.with(|s| {
            let own = s.time.progress(key);
            let total = ticket_progress(s, &ticket_subgraph(s), key, &mut ProgressCache::new());
            (fmt_progress(own), fmt_progress(total))
        })
    };

    let save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = form.get_untracked();
        if !draft.is_valid() {
            return;
        }
        let Some(patch) = ctx.tickets.with_untracked(|s| s.get(key).map(|t| draft.diff(t))) else {
            return;
        };
        ctx.ui.update(|ui| ui.stop_edit_ticket());
        spawn_local(async move {
            if let Err(e) = actions::update_ticket(&ctx.tickets, &ctx.api(), key, patch).await {
                tracing::warn!(target: "form", "saving {} failed: {}", key, e);
            }
        });
    };

    let on_delete = Callback::new(move |_| {
        ctx.ui.update(|ui| ui.forget_ticket(key));
        spawn_local(async move {
            if let Err(e) = actions::delete_ticket(&ctx.tickets, &ctx.api(), key).await {
                tracing::warn!(target: "form", "delete {} failed: {}", key, e);
            }
        });
    });

    view! {
        <form class="ticket-form edit-ticket-form" on:submit=save>
            <div class="form-header">
                <h2>{heading}</h2>
                <button
                    type="button"
                    class="close-btn"
                    on:click=move |_| ctx.ui.update(|ui| ui.stop_edit_ticket())
                >
                    "✕"
                </button>
            </div>
            <input
                type="text"
                class="form-title"
                prop:value=move || form.with(|f| f.title.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    form.update(|f| f.title = value);
                }
            />
            <textarea
                class="form-description"
                prop:value=move || form.with(|f| f.description.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    form.update(|f| f.description = value);
                }
            />
            <ParentSelector
                value=Signal::derive(move || form.with(|f| f.parent))
                editing=key
                on_change=Callback::new(move |parent| form.update(|f| f.parent = parent))
            />
            <NameSelector
                kind=NameKind::Priority
                value=Signal::derive(move || form.with(|f| f.priority))
                on_change=Callback::new(move |v| form.update(|f| f.priority = v))
            />
            <NameSelector
                kind=NameKind::Type
                value=Signal::derive(move || form.with(|f| f.ticket_type))
                on_change=Callback::new(move |v| form.update(|f| f.ticket_type = v))
            />
            <NameSelector
                kind=NameKind::Status
                value=Signal::derive(move || form.with(|f| f.status))
                on_change=Callback::new(move |v| form.update(|f| f.status = v))
            />
            <div class="form-time">
                {move || {
                    let (own, total) = rollup();
                    view! {
                        <span>"Own: " {own}</span>
                        <span>"With children: " {total}</span>
                    }
                }}
            </div>
            <div class="form-actions">
                <button type="submit" disabled=move || !form.with(|f| f.is_valid())>"Save"</button>
                <button
                    type="button"
                    class="add-child-btn"
                    on:click=move |_| ctx.ui.update(|ui| ui.start_create(Some(key)))
                >
                    "Add child"
                </button>
                <DeleteConfirmButton
                    button_class="delete-btn"
                    ticket_key=key
                    on_confirm=on_delete
                />
            </div>
        </form>
    }
}
