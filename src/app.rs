//! Gofast Frontend App
//!
//! Page layout: edit/create panel on the left, filter bar and ticket table
//! in the middle, graph or log on the right.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions;
use crate::components::{
    EditTicketPanel, FilterBar, LogPanel, NewTicketForm, TicketGraph, TicketTable, TicketTooltip,
};
use crate::config::UiConfig;
use crate::context::AppContext;
use crate::filter::ui_filter_tickets;
use crate::store::{LeftPanel, RightPanel, UiStateStoreFields};

#[component]
pub fn App(config: UiConfig) -> impl IntoView {
    let ctx = AppContext::new(config);
    provide_context(ctx);

    let (load_error, set_load_error) = signal(None::<String>);

    // Load tickets on mount and on every reload
    Effect::new(move |_| {
        let trigger = ctx.reload_trigger.get();
        tracing::debug!(target: "app", "loading tickets, trigger={}", trigger);
        spawn_local(async move {
            match actions::reload(&ctx.tickets, &ctx.api()).await {
                Ok(count) => {
                    tracing::info!(target: "app", "loaded {} tickets", count);
                    set_load_error.set(None);
                    // Drop panels pointing at tickets that vanished server-side
                    let gone: Vec<_> = ctx.ui.with_untracked(|ui| {
                        [ui.edit_key, ui.graph_focus, ui.new_ticket.parent]
                            .into_iter()
                            .flatten()
                            .filter(|k| !ctx.tickets.with_untracked(|s| s.contains(*k)))
                            .collect()
                    });
                    for key in gone {
                        ctx.ui.update(|ui| ui.forget_ticket(key));
                    }
                }
                Err(e) => set_load_error.set(Some(e.to_string())),
            }
        });
    });

    // Remember filter and sort between visits
    Effect::new(move |_| {
        let filter = ctx.ui.filter().get();
        let sort = ctx.ui.sort().get();
        ctx.config.update_value(|c| {
            c.filter = filter;
            c.sort = sort;
        });
        if let Err(e) = ctx.config.with_value(UiConfig::save) {
            tracing::warn!(target: "app", "saving settings failed: {}", e);
        }
    });

    let displayed = Memo::new(move |_| {
        let filter = ctx.ui.filter().get();
        let sort = ctx.ui.sort().get();
        ctx.tickets.with(|s| ui_filter_tickets(s, &filter, &sort))
    });
    let shown = Signal::derive(move || displayed.with(Vec::len));

    let left_panel = move || match ctx.ui.left_panel().get() {
        LeftPanel::None => None,
        LeftPanel::Create => Some(view! { <NewTicketForm /> }.into_any()),
        LeftPanel::Edit => ctx
            .ui
            .edit_key()
            .get()
            .map(|key| view! { <EditTicketPanel ticket_key=key /> }.into_any()),
    };

    let right_panel = move || match ctx.ui.right_panel().get() {
        RightPanel::None => None,
        RightPanel::Graph => Some(view! { <TicketGraph /> }.into_any()),
        RightPanel::Log => Some(view! { <LogPanel /> }.into_any()),
    };

    let toolbar_class = move |panel: RightPanel| {
        move || {
            if ctx.ui.right_panel().get() == panel { "toolbar-btn active" } else { "toolbar-btn" }
        }
    };

    view! {
        <div class="app-layout">
            <header class="app-header">
                <h1>"Gofast"</h1>
                <button class="toolbar-btn" on:click=move |_| ctx.ui.update(|ui| ui.start_create(None))>
                    "New ticket"
                </button>
                <button
                    class=toolbar_class(RightPanel::Graph)
                    on:click=move |_| ctx.ui.update(|ui| ui.toggle_right_panel(RightPanel::Graph))
                >
                    "Graph"
                </button>
                <button
                    class=toolbar_class(RightPanel::Log)
                    on:click=move |_| ctx.ui.update(|ui| ui.toggle_right_panel(RightPanel::Log))
                >
                    "Log"
                </button>
                <button class="toolbar-btn" on:click=move |_| ctx.reload()>"Reload"</button>
            </header>

            {move || load_error.get().map(|e| view! {
                <div class="load-error">"Could not load tickets: " {e}</div>
            })}

            <div class="app-body">
                <aside class="left-panel" class:hidden=move || ctx.ui.left_panel().get() == LeftPanel::None>
                    {left_panel}
                </aside>

                <main class="main-content">
                    <FilterBar shown=shown />
                    <TicketTable displayed=displayed />
                </main>

                <aside class="right-panel" class:hidden=move || ctx.ui.right_panel().get() == RightPanel::None>
                    {right_panel}
                </aside>
            </div>

            <TicketTooltip />
        </div>
    }
}
