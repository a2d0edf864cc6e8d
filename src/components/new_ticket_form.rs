//! New Ticket Form Component
//!
//! Left panel form for creating a ticket, optionally under a parent.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions;
use crate::components::{NameKind, NameSelector, ParentSelector};
use crate::context::use_app_context;
use crate::store::{LeftPanel, UiStateStoreFields};

/// Form for creating new tickets (root or child)
#[component]
pub fn NewTicketForm() -> impl IntoView {
    let ctx = use_app_context();
    let form = ctx.ui.new_ticket();

    let ui_create_ticket = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = form.get_untracked();
        if !draft.is_valid() {
            return;
        }
        let new = draft.to_new();
        // Keep parent and enum choices for the next ticket
        form.update(|f| {
            f.title.clear();
            f.description.clear();
        });
        spawn_local(async move {
            if let Err(e) = actions::create_ticket(&ctx.tickets, &ctx.api(), new).await {
                tracing::warn!(target: "form", "create failed: {}", e);
            }
        });
    };

    let next_key = move || ctx.tickets.with(|s| s.display_key(s.likely_next_ticket_number()));

    view! {
        <form class="ticket-form new-ticket-form" on:submit=ui_create_ticket>
            <div class="form-header">
                <h2>"New ticket " <span class="next-key">{next_key}</span></h2>
                <button
                    type="button"
                    class="close-btn"
                    on:click=move |_| ctx.ui.left_panel().set(LeftPanel::None)
                >
                    "✕"
                </button>
            </div>
            <input
                type="text"
                class="form-title"
                placeholder="Title"
                prop:value=move || form.with(|f| f.title.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    form.update(|f| f.title = value);
                }
            />
            <textarea
                class="form-description"
                placeholder="Description (markdown, #12 links to ticket 12)"
                prop:value=move || form.with(|f| f.description.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    form.update(|f| f.description = value);
                }
            />
            <ParentSelector
                value=Signal::derive(move || form.with(|f| f.parent))
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
            <button type="submit" disabled=move || !form.with(|f| f.is_valid())>"Create"</button>
        </form>
    }
}
