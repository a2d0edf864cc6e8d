//! Log Panel Component
//!
//! Recent tracing output kept in memory by console-logger, newest last.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

const REFRESH_MS: u32 = 1000;

#[component]
pub fn LogPanel() -> impl IntoView {
    let tick = RwSignal::new(0u32);

    // Poll while mounted; the loop ends once the signal is disposed
    spawn_local(async move {
        loop {
            TimeoutFuture::new(REFRESH_MS).await;
            if tick.try_update(|n| *n = n.wrapping_add(1)).is_none() {
                break;
            }
        }
    });

    let lines = move || {
        tick.track();
        console_logger::recent()
            .into_iter()
            .map(|line| {
                let level = line.level.to_string();
                let class = format!("log-line log-{}", level.to_lowercase());
                view! {
                    <li class=class>
                        <span class="log-at">{line.at.format("%H:%M:%S%.3f").to_string()}</span>
                        <span class="log-level">{level}</span>
                        <span class="log-message">{line.message}</span>
                    </li>
                }
            })
            .collect_view()
    };

    view! {
        <div class="log-panel">
            <div class="log-toolbar">
                <button on:click=move |_| tick.update(|n| *n = n.wrapping_add(1))>"Refresh"</button>
                <button on:click=move |_| {
                    console_logger::clear();
                    tick.update(|n| *n = n.wrapping_add(1));
                }>"Clear"</button>
            </div>
            <ul class="log-lines">{lines}</ul>
        </div>
    }
}
