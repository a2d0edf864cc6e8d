//! Ticket Row Component
//!
//! One ticket in the table: drag handle for the whole row, hover tooltip,
//! click to edit, add-child and delete buttons.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions;
use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;
use crate::format::{fmt_progress, priority_icon};
use crate::models::TicketKey;
use crate::store::UiStateStoreFields;
use crate::tree::ProgressCache;

use leptos_dragdrop::*;

/// A single ticket row
#[component]
pub fn TicketRow(
    ticket_key: TicketKey,
    dnd: DndSignals,
    progress: Memo<ProgressCache>,
) -> impl IntoView {
    let ctx = use_app_context();
    let key = ticket_key;

    let ticket = Memo::new(move |_| ctx.tickets.with(|s| s.get(key).cloned()));
    let display_key = move || ctx.tickets.with(|s| s.display_key(key));

    // DnD handlers
    let on_mousedown = make_on_mousedown(dnd, key);
    let on_item_enter = make_on_item_mouseenter(dnd, key);
    let on_item_leave = make_on_mouseleave(dnd);

    // Visual state
    let is_drop_target = move || matches!(dnd.drop_target_read.get(), Some(DropTarget::Item(t)) if t == key);
    let row_class = move || {
        let mut c = String::from("ticket-row");
        if ctx.ui.highlight_key().get() == Some(key) { c.push_str(" selected"); }
        if dnd.is_dragged(key) { c.push_str(" dragging"); }
        if is_drop_target() { c.push_str(" drop-target"); }
        c
    };

    let open_editor = move |_| {
        // The click that ends a drag is not an edit
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        if let Some(t) = ticket.get_untracked() {
            ctx.ui.update(|ui| ui.edit_ticket(&t));
        }
    };

    let on_delete = Callback::new(move |_| {
        ctx.ui.update(|ui| ui.forget_ticket(key));
        spawn_local(async move {
            if let Err(e) = actions::delete_ticket(&ctx.tickets, &ctx.api(), key).await {
                tracing::warn!(target: "table", "delete {} failed: {}", key, e);
            }
        });
    });

    let cells = move || {
        ticket.get().map(|t| {
            let (type_name, status_name, priority_name, parent) = ctx.tickets.with(|s| {
                (
                    s.type_name(t.ticket_type),
                    s.status_name(t.status),
                    s.priority_name(t.priority),
                    t.parent.map(|p| s.display_key(p)).unwrap_or_default(),
                )
            });
            let rollup = progress.with(|c| c.get(key));
            let percent = (rollup.fraction() * 100.0).round();
            let updated = t
                .last_updated_on
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();

            view! {
                <div class="cell col-title">{t.title.clone()}</div>
                <div class="cell col-type">{type_name}</div>
                <div class="cell col-status">{status_name}</div>
                <div class="cell col-priority">
                    <img class="priority-icon" src=priority_icon(t.priority) alt="" />
                    {priority_name}
                </div>
                <div class="cell col-parent">{parent}</div>
                <div class="cell col-updated">{updated}</div>
                <div class="cell col-progress" title=fmt_progress(rollup)>
                    <div class="progress-bar">
                        <div class="progress-fill" style=format!("width: {}%;", percent)></div>
                    </div>
                </div>
            }
        })
    };

    view! {
        <div
            class=row_class
            id=format!("ticket-{}", key)
            on:mousedown=on_mousedown
            on:mouseenter=on_item_enter
            on:mouseleave=move |ev| {
                on_item_leave(ev);
                ctx.ui.tooltip().update(|t| t.hide());
            }
            on:mousemove=move |ev: web_sys::MouseEvent| {
                if !dnd.is_dragging() {
                    ctx.ui.tooltip().update(|t| t.hover(key, ev.client_x(), ev.client_y()));
                }
            }
            on:click=open_editor
        >
            <div class="cell col-key">{display_key}</div>
            {cells}
            <div class="cell col-actions">
                <button
                    class="add-child-btn"
                    title="Add child ticket"
                    on:mousedown=move |ev| ev.stop_propagation()
                    on:click=move |ev| {
                        ev.stop_propagation();
                        ctx.ui.update(|ui| ui.start_create(Some(key)));
                    }
                >
                    "+"
                </button>
                <DeleteConfirmButton
                    button_class="delete-btn"
                    ticket_key=key
                    on_confirm=on_delete
                />
            </div>
        </div>
    }
}
