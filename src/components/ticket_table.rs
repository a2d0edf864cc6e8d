//! Ticket Table Component
//!
//! The filtered, sorted ticket list with sortable headers.
//! Uses leptos-dragdrop: dropping into a slot between rows reorders,
//! dropping onto a row makes the dragged ticket its child.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions;
use crate::components::TicketRow;
use crate::context::{use_app_context, AppContext};
use crate::dialog;
use crate::filter::{toggle_sort, SortField};
use crate::models::TicketKey;
use crate::reorder::{slot_to_index, ReorderOutcome};
use crate::store::UiStateStoreFields;
use crate::tree::{would_create_cycle, ProgressCache};

use leptos_dragdrop::*;

const COLUMNS: &[(SortField, &str)] = &[
    (SortField::Key, "col-key"),
    (SortField::Title, "col-title"),
    (SortField::Type, "col-type"),
    (SortField::Status, "col-status"),
    (SortField::Priority, "col-priority"),
    (SortField::Parent, "col-parent"),
    (SortField::LastUpdatedOn, "col-updated"),
];

fn on_drop_onto(ctx: AppContext, dragged: TicketKey, target: TicketKey) {
    let (cycle, label) = ctx.tickets.with_untracked(|s| {
        (would_create_cycle(s, dragged, target), s.display_key(dragged))
    });
    if cycle {
        dialog::alert(&format!("{} cannot be moved under its own descendant.", label));
        return;
    }
    spawn_local(async move {
        if let Err(e) = actions::reparent_ticket(&ctx.tickets, &ctx.api(), dragged, Some(target)).await {
            tracing::warn!(target: "table", "re-parent {} failed: {}", dragged, e);
        }
    });
}

fn on_drop_into_slot(ctx: AppContext, displayed: Vec<TicketKey>, dragged: TicketKey, slot: usize) {
    let sort = ctx.ui.sort().get_untracked();
    let index = slot_to_index(&displayed, dragged, slot);
    spawn_local(async move {
        let confirm = |outcome: &ReorderOutcome| {
            ctx.tickets
                .with_untracked(|s| dialog::priority_change_message(s, dragged, outcome))
                .map_or(false, |message| dialog::confirm(&message))
        };
        match actions::reorder_ticket(&ctx.tickets, &ctx.api(), &displayed, dragged, index, &sort, confirm).await {
            Ok(ReorderOutcome::Rejected(reason)) => dialog::alert(reason.message()),
            Ok(_) => {}
            Err(e) => tracing::warn!(target: "table", "reorder {} failed: {}", dragged, e),
        }
    });
}

/// Sortable, draggable ticket list
#[component]
pub fn TicketTable(displayed: Memo<Vec<TicketKey>>) -> impl IntoView {
    let ctx = use_app_context();

    // One rollup per store change, shared by every row
    let progress = Memo::new(move |_| ctx.tickets.with(ProgressCache::compute_all));

    let dnd = create_dnd_signals();
    bind_global_mouseup(dnd, move |dragged, target| {
        tracing::debug!(target: "table", "drop {} on {:?}", dragged, target);
        match target {
            DropTarget::Item(target_key) => on_drop_onto(ctx, dragged, target_key),
            DropTarget::Slot(slot) => on_drop_into_slot(ctx, displayed.get_untracked(), dragged, slot),
        }
    });

    let header = move |field: SortField, class: &'static str| {
        let arrow = move || {
            ctx.ui.sort().with(|sort| match sort.first() {
                Some(first) if first.field == field => first.direction.arrow(),
                _ => "",
            })
        };
        view! {
            <div
                class=format!("ticket-header-cell {}", class)
                on:click=move |_| ctx.ui.sort().update(|sort| *sort = toggle_sort(sort, field))
            >
                {field.label()} " " {arrow}
            </div>
        }
    };

    let rows = move || displayed.get().into_iter().enumerate().collect::<Vec<_>>();
    let row_count = move || displayed.with(Vec::len);

    view! {
        <div class="ticket-table" class:dragging=move || dnd.is_dragging()>
            <div class="ticket-header">
                {COLUMNS.iter().map(|(field, class)| header(*field, *class)).collect_view()}
                <div class="ticket-header-cell col-progress">"Progress"</div>
                <div class="ticket-header-cell col-actions"></div>
            </div>

            <For
                each=rows
                key=|(index, key)| (*index, *key)
                children=move |(index, key)| {
                    view! {
                        <DropSlot dnd=dnd index=index />
                        <TicketRow ticket_key=key dnd=dnd progress=progress />
                    }
                }
            />
            {move || view! { <DropSlot dnd=dnd index=row_count() /> }}

            <Show when=move || displayed.with(Vec::is_empty)>
                <p class="empty-table">"No tickets match the current filters."</p>
            </Show>
        </div>
    }
}

/// Gap before row `index`; highlighted while a drag hovers it
#[component]
pub fn DropSlot(dnd: DndSignals, index: usize) -> impl IntoView {
    let on_mouseenter = make_on_slot_mouseenter(dnd, index);
    let on_mouseleave = make_on_mouseleave(dnd);

    // Is this slot the current drop target?
    let is_active = move || matches!(dnd.drop_target_read.get(), Some(DropTarget::Slot(i)) if i == index);

    let slot_class = move || {
        let mut c = String::from("drop-slot");
        if !dnd.is_dragging() { c.push_str(" hidden"); }
        if is_active() { c.push_str(" active"); }
        c
    };

    view! {
        <div
            class=slot_class
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        />
    }
}
