//! Ticket Tooltip Component
//!
//! Hover card next to the pointer with the ticket's path, status, time and
//! rendered description. Shows after the pointer rests on a row briefly.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_app_context;
use crate::format::{fmt_progress, fmt_time};
use crate::markdown::render_description;
use crate::models::TicketKey;
use crate::store::UiStateStoreFields;

/// Hover delay before the card appears
const SHOW_DELAY_MS: u32 = 400;

/// Offset from the pointer, px
const OFFSET: i32 = 14;

#[component]
pub fn TicketTooltip() -> impl IntoView {
    let ctx = use_app_context();
    let hovered = Memo::new(move |_| ctx.ui.tooltip().with(|t| t.key));
    let (visible, set_visible) = signal(None::<TicketKey>);

    // Restart the delay whenever the hovered ticket changes
    Effect::new(move |_| {
        let key = hovered.get();
        set_visible.set(None);
        if let Some(key) = key {
            spawn_local(async move {
                TimeoutFuture::new(SHOW_DELAY_MS).await;
                if hovered.get_untracked() == Some(key) {
                    set_visible.set(Some(key));
                }
            });
        }
    });

    let style = move || {
        let (x, y) = ctx.ui.tooltip().with(|t| t.position);
        format!("left: {}px; top: {}px;", x + OFFSET, y + OFFSET)
    };

    let card = move || {
        let key = visible.get()?;
        ctx.tickets.with(|s| {
            let ticket = s.get(key)?;
            let path = s.display_key_with_parent(key);
            let status = s.status_name(ticket.status);
            let own = s.time.progress(key);
            let people = s
                .time
                .by_person(key)
                .into_iter()
                .map(|(person, p)| view! {
                    <li>{format!("User {}: {} spent, {} estimated", person, fmt_time(p.spent), fmt_time(p.estimate))}</li>
                })
                .collect_view();
            let description = render_description(&ticket.description, s);

            Some(view! {
                <div class="ticket-tooltip" style=style>
                    <div class="tooltip-path">{path}</div>
                    <div class="tooltip-title">{ticket.title.clone()}</div>
                    <div class="tooltip-meta">
                        <span class="tooltip-status">{status}</span>
                        <span class="tooltip-time">{fmt_progress(own)}</span>
                    </div>
                    <ul class="tooltip-people">{people}</ul>
                    <div class="tooltip-description markdown" inner_html=description></div>
                </div>
            })
        })
    };

    card
}
