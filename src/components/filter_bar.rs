//! Filter Bar Component
//!
//! Text search plus toggle chips for priority, status and type.

use std::collections::BTreeSet;

use leptos::prelude::*;

use crate::components::NameKind;
use crate::context::use_app_context;
use crate::filter::{toggle_value, TicketFilter};
use crate::store::UiStateStoreFields;

fn chip_set(filter: &TicketFilter, kind: NameKind) -> &BTreeSet<i32> {
    match kind {
        NameKind::Type => &filter.types,
        NameKind::Status => &filter.statuses,
        NameKind::Priority => &filter.priorities,
    }
}

fn chip_set_mut(filter: &mut TicketFilter, kind: NameKind) -> &mut BTreeSet<i32> {
    match kind {
        NameKind::Type => &mut filter.types,
        NameKind::Status => &mut filter.statuses,
        NameKind::Priority => &mut filter.priorities,
    }
}

/// One row of toggle chips for a name table
#[component]
fn FilterChips(kind: NameKind) -> impl IntoView {
    let ctx = use_app_context();
    let names = move || {
        ctx.tickets.with(|s| {
            kind.table(s).iter().map(|(v, n)| (v, n.to_string())).collect::<Vec<_>>()
        })
    };

    view! {
        <div class="filter-chips">
            <span class="filter-label">{kind.label()}</span>
            {move || names().into_iter().map(|(value, name)| {
                let active = move || ctx.ui.filter().with(|f| chip_set(f, kind).contains(&value));
                view! {
                    <button
                        type="button"
                        class=move || if active() { "chip active" } else { "chip" }
                        on:click=move |_| ctx.ui.filter().update(|f| toggle_value(chip_set_mut(f, kind), value))
                    >
                        {name}
                    </button>
                }
            }).collect_view()}
        </div>
    }
}

#[component]
pub fn FilterBar(#[prop(into)] shown: Signal<usize>) -> impl IntoView {
    let ctx = use_app_context();
    let total = move || ctx.tickets.with(|s| s.len());

    view! {
        <div class="filter-bar">
            <input
                type="search"
                class="filter-text"
                placeholder="Filter by title or #key..."
                prop:value=move || ctx.ui.filter().with(|f| f.text.clone())
                on:input=move |ev| {
                    let text = event_target_value(&ev);
                    ctx.ui.filter().update(|f| f.text = text);
                }
            />
            <FilterChips kind=NameKind::Priority />
            <FilterChips kind=NameKind::Status />
            <FilterChips kind=NameKind::Type />
            <Show when=move || !ctx.ui.filter().with(TicketFilter::is_empty)>
                <button
                    type="button"
                    class="clear-filter-btn"
                    on:click=move |_| ctx.ui.filter().set(TicketFilter::default())
                >
                    "Clear"
                </button>
            </Show>
            <span class="ticket-count">{move || format!("{} / {} tickets", shown.get(), total())}</span>
        </div>
    }
}
