//! Ticket Graph Component
//!
//! Sunburst of the ticket tree in the right panel. Clicking a segment with
//! children zooms into it, clicking a leaf opens it for editing, and the
//! center zooms back out one level.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::format::fmt_progress;
use crate::graph::{partition, segment_color, zoom_out, Segment, PROGRESS_COLOR};
use crate::store::UiStateStoreFields;
use crate::tree::{ticket_subgraph, ProgressCache};

#[component]
pub fn TicketGraph() -> impl IntoView {
    let ctx = use_app_context();
    let radius = ctx.config.with_value(|c| c.graph_radius);

    let progress = Memo::new(move |_| ctx.tickets.with(ProgressCache::compute_all));
    let layout = Memo::new(move |_| {
        let focus = ctx.ui.graph_focus().get();
        ctx.tickets.with(|s| {
            progress.with(|cache| partition(s, &ticket_subgraph(s), cache, focus, radius))
        })
    });

    let on_segment = move |segment: &Segment| {
        let key = segment.key;
        if segment.has_children {
            ctx.ui.graph_focus().set(Some(key));
        } else if let Some(t) = ctx.tickets.with_untracked(|s| s.get(key).cloned()) {
            ctx.ui.update(|ui| ui.edit_ticket(&t));
        }
    };

    let segments = move || {
        let layout = layout.get();
        let branches = layout.branches;
        layout
            .segments
            .into_iter()
            .map(|segment| {
                let (label, tip) = ctx.tickets.with_untracked(|s| {
                    let title = s.get(segment.key).map(|t| t.title.clone()).unwrap_or_default();
                    let tip = format!(
                        "{} {}\n{}",
                        s.display_key(segment.key),
                        title,
                        fmt_progress(progress.with_untracked(|c| c.get(segment.key)))
                    );
                    (s.display_key(segment.key), tip)
                });
                let fill = segment_color(segment.branch, branches, segment.depth);
                let anchor = segment.label_anchor();
                let path = segment.path();
                let progress_path = segment.progress_path();
                let clicked = segment.clone();

                view! {
                    <g class="graph-segment" on:click=move |_| on_segment(&clicked)>
                        <title>{tip}</title>
                        <path d=path fill=fill stroke="#fff" stroke-width="1" />
                        <path d=progress_path fill=PROGRESS_COLOR opacity="0.7" />
                        {anchor.map(|(x, y)| view! {
                            <text
                                class="graph-label"
                                x=format!("{:.1}", x)
                                y=format!("{:.1}", y)
                                text-anchor="middle"
                                dominant-baseline="middle"
                            >
                                {label}
                            </text>
                        })}
                    </g>
                }
            })
            .collect_view()
    };

    let center_label = move || {
        let focus = layout.with(|l| l.focus);
        match focus {
            Some(key) => ctx.tickets.with(|s| s.display_key(key)),
            None => "All".to_string(),
        }
    };
    let center_percent = move || format!("{:.0}%", layout.with(|l| l.center_progress) * 100.0);

    let zoom_to_parent = move |_| {
        let focus = ctx.ui.graph_focus().get_untracked();
        let parent = ctx.tickets.with_untracked(|s| zoom_out(s, focus));
        ctx.ui.graph_focus().set(parent);
    };

    let size = radius * 2.0 + 4.0;
    let view_box = format!("{0} {0} {1} {1}", -size / 2.0, size);

    view! {
        <div class="ticket-graph">
            <svg
                class="graph-svg"
                viewBox=view_box
                width=format!("{}", size)
                height=format!("{}", size)
            >
                {segments}
                <g class="graph-center" on:click=zoom_to_parent>
                    <circle r=move || format!("{:.3}", layout.with(|l| l.center_radius)) fill="#f4f4f4" />
                    <text class="graph-center-key" text-anchor="middle" y="-4">{center_label}</text>
                    <text class="graph-center-progress" text-anchor="middle" y="14">{center_percent}</text>
                </g>
            </svg>
            <Show when=move || layout.with(|l| l.segments.is_empty())>
                <p class="graph-empty">"Nothing below this ticket."</p>
            </Show>
        </div>
    }
}
