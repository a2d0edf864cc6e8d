//! Delete Confirm Button Component
//!
//! Inline two-step delete for a ticket. The question names the ticket and
//! warns when its children will lose their parent. An unanswered question
//! folds back after a few seconds.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_app_context;
use crate::models::TicketKey;

const AUTO_CANCEL_MS: u32 = 4000;

/// Question shown before deleting `label` with `children` direct children
pub fn delete_question(label: &str, children: usize) -> String {
    match children {
        0 => format!("Delete {}?", label),
        1 => format!("Delete {}? Its child becomes top-level.", label),
        n => format!("Delete {}? Its {} children become top-level.", label, n),
    }
}

#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    ticket_key: TicketKey,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let ctx = use_app_context();
    let asking = RwSignal::new(false);
    // Bumped on every open so a stale timer does not close a newer question
    let generation = RwSignal::new(0u32);

    let question = move || {
        ctx.tickets.with(|s| {
            let children = s.get(ticket_key).map_or(0, |t| t.children.len());
            delete_question(&s.display_key(ticket_key), children)
        })
    };

    let ask = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        asking.set(true);
        let opened = generation.get_untracked().wrapping_add(1);
        generation.set(opened);
        spawn_local(async move {
            TimeoutFuture::new(AUTO_CANCEL_MS).await;
            if generation.try_get_untracked() == Some(opened) {
                asking.set(false);
            }
        });
    };

    let answer = move |ev: web_sys::MouseEvent, confirmed: bool| {
        ev.stop_propagation();
        asking.set(false);
        if confirmed {
            on_confirm.run(());
        }
    };

    view! {
        <Show
            when=move || asking.get()
            fallback=move || view! {
                <button
                    class=button_class.clone()
                    title="Delete"
                    on:mousedown=move |ev| ev.stop_propagation()
                    on:click=ask
                >
                    "×"
                </button>
            }
        >
            <span class="delete-confirm" on:mousedown=move |ev| ev.stop_propagation()>
                <span class="delete-confirm-text">{question}</span>
                <button class="confirm-btn" on:click=move |ev| answer(ev, true)>"✓"</button>
                <button class="cancel-btn" on:click=move |ev| answer(ev, false)>"✗"</button>
            </span>
        </Show>
    }
}
