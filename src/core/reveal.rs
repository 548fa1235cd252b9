//! Entrance effects driven by intersection-visible events: `.animate`
//! elements gain `show`, and member grids stagger their cards in.

use crate::core::dom::{Dom, NodeId, Selector};
use crate::core::events::{EventBus, EventKind, Firing, Reaction};
use crate::core::renderer::MEMBERS_GRID_CLASS;

/// Delay added per grid item, in seconds.
const STAGGER_STEP_SECS: f64 = 0.1;

pub fn bind(dom: &Dom, scope: NodeId, bus: &mut EventBus) -> usize {
    let mut bound = 0;
    for node in dom.query_all(scope, &Selector::class("animate")) {
        if dom.has_class(node, "show") {
            continue;
        }
        bus.subscribe(node, EventKind::IntersectionVisible, Firing::Once, Reaction::Reveal);
        bound += 1;
    }
    for grid in dom.query_all(scope, &Selector::class(MEMBERS_GRID_CLASS)) {
        bus.subscribe(
            grid,
            EventKind::IntersectionVisible,
            Firing::Once,
            Reaction::StaggerChildren,
        );
        bound += 1;
    }
    bound
}

pub fn reveal(dom: &mut Dom, node: NodeId) {
    dom.add_class(node, "show");
}

pub fn stagger_children(dom: &mut Dom, grid: NodeId) {
    for (index, item) in dom.element_children(grid).into_iter().enumerate() {
        let delay = format!("{}s", round_delay(index as f64 * STAGGER_STEP_SECS));
        dom.set_style(item, "animation-delay", &delay);
        dom.add_class(item, "animate-stagger");
    }
}

// keeps 0.30000000000000004 out of the markup
fn round_delay(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
