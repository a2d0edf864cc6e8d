//! Ticket Graph Layout
//!
//! Radial partition (sunburst) of the ticket tree. The focused ticket sits
//! in the center, each ring below it is one generation, and every ticket's
//! angle is proportional to the number of leaves under it. A progress
//! overlay on each segment sweeps through the spent/estimate fraction.

use std::collections::HashSet;
use std::f64::consts::{PI, TAU};

use crate::models::TicketKey;
use crate::tickets::TicketStore;
use crate::time::Progress;
use crate::tree::{ProgressCache, Subgraph};

pub const PROGRESS_COLOR: &str = "#DC6504";

/// Minimum arc length (px) at mid-radius to print a label
const LABEL_MIN_ARC: f64 = 18.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub key: TicketKey,
    /// Ring number, 1 = directly around the center
    pub depth: usize,
    /// Index of the ring-1 ancestor, for coloring
    pub branch: usize,
    pub start: f64,
    pub end: f64,
    pub inner: f64,
    pub outer: f64,
    /// spent / estimate of the ticket and its descendants
    pub progress: f64,
    pub has_children: bool,
}

impl Segment {
    /// Angle where the progress overlay stops
    pub fn progress_end(&self) -> f64 {
        self.start + (self.end - self.start) * self.progress
    }

    pub fn path(&self) -> String {
        arc_path(self.inner, self.outer, self.start, self.end)
    }

    /// Overlay drawn in the inner 40% of the segment
    pub fn progress_path(&self) -> String {
        let outer = self.inner + (self.outer - self.inner) * 0.4;
        arc_path(self.inner, outer, self.start, self.progress_end())
    }

    /// Center of the segment, if there is room for text
    pub fn label_anchor(&self) -> Option<(f64, f64)> {
        let mid_radius = (self.inner + self.outer) / 2.0;
        if (self.end - self.start) * mid_radius < LABEL_MIN_ARC {
            return None;
        }
        Some(point(mid_radius, (self.start + self.end) / 2.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// None = all root tickets around an empty center
    pub focus: Option<TicketKey>,
    pub center_radius: f64,
    pub center_progress: f64,
    /// Number of distinct ring-1 branches
    pub branches: usize,
    pub segments: Vec<Segment>,
}

/// Lay out the subtree under `focus` within a circle of `radius`
pub fn partition(
    store: &TicketStore,
    subgraph: &Subgraph,
    cache: &ProgressCache,
    focus: Option<TicketKey>,
    radius: f64,
) -> Layout {
    let focus = focus.filter(|k| store.contains(*k));
    let top: Vec<TicketKey> = subgraph.children(focus).to_vec();

    let mut seen: HashSet<TicketKey> = focus.into_iter().collect();
    let mut nodes: Vec<Node> = Vec::new();
    let total: f64 = top
        .iter()
        .map(|k| measure(subgraph, *k, 1, &mut seen, &mut nodes))
        .sum();
    let rings = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    let ring_width = radius / (rings as f64 + 1.0);

    let center_progress = match focus {
        Some(k) => cache.get(k).fraction(),
        None => {
            let sum = top.iter().fold(Progress::default(), |acc, k| acc + cache.get(*k));
            sum.fraction()
        }
    };

    let mut layout = Layout {
        focus,
        center_radius: ring_width,
        center_progress,
        branches: top.len(),
        segments: Vec::with_capacity(nodes.len()),
    };
    if total <= 0.0 {
        return layout;
    }

    // Nodes are in pre-order, so a parent's span is known before its children
    let mut cursor: Vec<f64> = vec![0.0; rings + 2];
    let mut branch = 0;
    for (i, node) in nodes.iter().enumerate() {
        if node.depth == 1 {
            branch = top.iter().position(|k| *k == node.key).unwrap_or(i);
        }
        let start = cursor[node.depth];
        let end = start + TAU * node.leaves / total;
        cursor[node.depth] = end;
        // Children start where their parent starts
        cursor[node.depth + 1] = start;

        let depth = node.depth as f64;
        layout.segments.push(Segment {
            key: node.key,
            depth: node.depth,
            branch,
            start,
            end,
            inner: ring_width * depth,
            outer: ring_width * (depth + 1.0),
            progress: cache.get(node.key).fraction(),
            has_children: node.has_children,
        });
    }
    layout
}

struct Node {
    key: TicketKey,
    depth: usize,
    leaves: f64,
    has_children: bool,
}

/// Pre-order walk recording leaf counts; returns the leaf count of `key`
fn measure(
    subgraph: &Subgraph,
    key: TicketKey,
    depth: usize,
    seen: &mut HashSet<TicketKey>,
    nodes: &mut Vec<Node>,
) -> f64 {
    if !seen.insert(key) {
        return 0.0;
    }
    let index = nodes.len();
    nodes.push(Node { key, depth, leaves: 0.0, has_children: false });

    let children = subgraph.children(Some(key));
    let mut leaves = 0.0;
    for child in children {
        leaves += measure(subgraph, *child, depth + 1, seen, nodes);
    }
    let has_children = leaves > 0.0;
    let leaves = if has_children { leaves } else { 1.0 };
    nodes[index].leaves = leaves;
    nodes[index].has_children = has_children;
    leaves
}

/// Where clicking the center goes: the focus's parent, or the top level
pub fn zoom_out(store: &TicketStore, focus: Option<TicketKey>) -> Option<TicketKey> {
    focus
        .and_then(|k| store.get(k))
        .and_then(|t| t.parent)
        .filter(|p| store.contains(*p))
}

/// Fill color: one hue per branch, lighter with depth
pub fn segment_color(branch: usize, branches: usize, depth: usize) -> String {
    let hue = if branches == 0 { 0.0 } else { 360.0 * branch as f64 / branches as f64 };
    let lightness = (45 + depth * 8).min(85);
    format!("hsl({:.0}, 45%, {}%)", hue, lightness)
}

/// Cartesian point for radius `r` at `angle` radians clockwise from 12 o'clock
fn point(r: f64, angle: f64) -> (f64, f64) {
    (r * angle.sin(), -r * angle.cos())
}

fn num(v: f64) -> String {
    // Avoid "-0.000"
    let v = if v.abs() < 5e-4 { 0.0 } else { v };
    format!("{:.3}", v)
}

fn xy(p: (f64, f64)) -> String {
    format!("{},{}", num(p.0), num(p.1))
}

/// SVG path of the annular sector between `inner` and `outer` radius
/// from `start` to `end` (radians clockwise from 12 o'clock)
pub fn arc_path(inner: f64, outer: f64, start: f64, end: f64) -> String {
    let sweep = end - start;
    if sweep <= 0.0 || outer <= 0.0 {
        return String::new();
    }

    if sweep >= TAU - 1e-9 {
        // A single arc cannot close a circle; go around in two halves
        let ring = |r: f64, clockwise: u8| {
            format!(
                "M{}A{r},{r} 0 1,{cw} {}A{r},{r} 0 1,{cw} {}Z",
                xy((0.0, -r)),
                xy((0.0, r)),
                xy((0.0, -r)),
                r = num(r),
                cw = clockwise
            )
        };
        let mut d = ring(outer, 1);
        if inner > 0.0 {
            d.push_str(&ring(inner, 0));
        }
        return d;
    }

    let large = if sweep > PI { 1 } else { 0 };
    let r_out = num(outer);
    let mut d = format!(
        "M{}A{r},{r} 0 {large},1 {}",
        xy(point(outer, start)),
        xy(point(outer, end)),
        r = r_out,
        large = large
    );
    if inner > 0.0 {
        let r_in = num(inner);
        d.push_str(&format!(
            "L{}A{r},{r} 0 {large},0 {}Z",
            xy(point(inner, end)),
            xy(point(inner, start)),
            r = r_in,
            large = large
        ));
    } else {
        d.push_str("L0.000,0.000Z");
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::tests::{store_of, ticket};
    use crate::tree::ticket_subgraph;

    fn sample() -> TicketStore {
        let mut store = store_of(vec![
            ticket(1, None, 3, 0.0),
            ticket(2, None, 3, 0.0),
            ticket(3, Some(1), 3, 0.0),
            ticket(4, Some(1), 3, 0.0),
            ticket(5, Some(3), 3, 0.0),
        ]);
        store.time.add(5, 1, 100, 50);
        store
    }

    fn layout(store: &TicketStore, focus: Option<TicketKey>) -> Layout {
        let sub = ticket_subgraph(store);
        let cache = ProgressCache::compute_all(store);
        partition(store, &sub, &cache, focus, 300.0)
    }

    fn seg(layout: &Layout, key: TicketKey) -> &Segment {
        layout.segments.iter().find(|s| s.key == key).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_top_ring_covers_circle() {
        let store = sample();
        let layout = layout(&store, None);
        assert_eq!(layout.segments.len(), 5);
        // Leaves: 1 has {5, 4} = 2, 2 has itself = 1
        let one = seg(&layout, 1);
        let two = seg(&layout, 2);
        assert!(close(one.start, 0.0));
        assert!(close(one.end, TAU * 2.0 / 3.0));
        assert!(close(two.end, TAU));
        assert_eq!(layout.branches, 2);
        assert_eq!(two.branch, 1);
    }

    #[test]
    fn test_children_nest_inside_parent() {
        let store = sample();
        let layout = layout(&store, None);
        let one = seg(&layout, 1);
        let three = seg(&layout, 3);
        let four = seg(&layout, 4);
        let five = seg(&layout, 5);
        assert!(close(three.start, one.start));
        assert!(close(four.end, one.end));
        assert!(close(five.start, three.start) && close(five.end, three.end));
        assert_eq!(five.depth, 3);
        // Rings: center + 3 levels in 300px
        assert!(close(layout.center_radius, 75.0));
        assert!(close(five.inner, 225.0) && close(five.outer, 300.0));
        assert!(one.has_children && !four.has_children);
    }

    #[test]
    fn test_progress_rolls_into_segments() {
        let store = sample();
        let layout = layout(&store, None);
        assert!(close(seg(&layout, 5).progress, 0.5));
        assert!(close(seg(&layout, 1).progress, 0.5));
        assert!(close(seg(&layout, 4).progress, 0.0));
        let three = seg(&layout, 3);
        assert!(close(three.progress_end(), three.start + (three.end - three.start) / 2.0));
    }

    #[test]
    fn test_zoom_into_ticket() {
        let store = sample();
        let layout = layout(&store, Some(1));
        let keys: Vec<TicketKey> = layout.segments.iter().map(|s| s.key).collect();
        assert_eq!(keys, vec![3, 5, 4]);
        assert!(close(seg(&layout, 3).start, 0.0));
        assert!(close(seg(&layout, 4).end, TAU));
        assert!(close(layout.center_progress, 0.5));

        assert_eq!(zoom_out(&store, Some(3)), Some(1));
        assert_eq!(zoom_out(&store, Some(1)), None);
        // Unknown focus falls back to the top level
        assert_eq!(layout_focus(&store, Some(99)), None);
    }

    fn layout_focus(store: &TicketStore, focus: Option<TicketKey>) -> Option<TicketKey> {
        layout(store, focus).focus
    }

    #[test]
    fn test_empty_store() {
        let store = store_of(vec![]);
        let layout = layout(&store, None);
        assert!(layout.segments.is_empty());
    }

    #[test]
    fn test_arc_path_quarter() {
        let d = arc_path(5.0, 10.0, 0.0, PI / 2.0);
        assert_eq!(
            d,
            "M0.000,-10.000A10.000,10.000 0 0,1 10.000,0.000L5.000,0.000A5.000,5.000 0 0,0 0.000,-5.000Z"
        );
    }

    #[test]
    fn test_arc_path_large_and_wedge() {
        let d = arc_path(0.0, 10.0, 0.0, 1.5 * PI);
        assert!(d.contains(" 0 1,1 "));
        assert!(d.ends_with("L0.000,0.000Z"));
        assert_eq!(arc_path(1.0, 2.0, 1.0, 1.0), "");
    }

    #[test]
    fn test_arc_path_full_ring() {
        let d = arc_path(5.0, 10.0, 0.0, TAU);
        assert_eq!(d.matches('M').count(), 2);
        assert!(d.starts_with("M0.000,-10.000A10.000,10.000 0 1,1 0.000,10.000"));
    }

    #[test]
    fn test_segment_color() {
        assert_eq!(segment_color(0, 2, 1), "hsl(0, 45%, 53%)");
        assert_eq!(segment_color(1, 2, 2), "hsl(180, 45%, 61%)");
    }
}
