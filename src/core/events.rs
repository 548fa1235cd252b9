//! Event subscriptions of the page document.
//!
//! Handlers are data: dispatching an event returns the [`Reaction`]s whose
//! subscriptions matched, and the page applies them. Once-firing
//! subscriptions are spent by their first dispatch.

use crate::core::dom::{Dom, NodeId};
use crate::core::filter::FilterKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    LoadFailed,
    IntersectionVisible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firing {
    Once,
    Repeatable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    SelectFilter(FilterKey),
    ImageFallback { is_coordinator: bool },
    Reveal,
    StaggerChildren,
    Retry,
}

#[derive(Debug, Clone)]
struct Subscription {
    target: NodeId,
    kind: EventKind,
    firing: Firing,
    reaction: Reaction,
    spent: bool,
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, target: NodeId, kind: EventKind, firing: Firing, reaction: Reaction) {
        self.subscriptions.push(Subscription {
            target,
            kind,
            firing,
            reaction,
            spent: false,
        });
    }

    /// Reactions registered for `kind` on `target`, in registration order.
    pub fn dispatch(&mut self, target: NodeId, kind: EventKind) -> Vec<Reaction> {
        let mut reactions = Vec::new();
        for sub in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.target == target && s.kind == kind && !s.spent)
        {
            if sub.firing == Firing::Once {
                sub.spent = true;
            }
            reactions.push(sub.reaction.clone());
        }
        reactions
    }

    /// Drops spent subscriptions and those whose target left the document.
    pub fn prune(&mut self, dom: &Dom) {
        self.subscriptions
            .retain(|s| !s.spent && dom.is_attached(s.target));
    }

    pub fn has_subscription(&self, target: NodeId, kind: EventKind) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.target == target && s.kind == kind && !s.spent)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.iter().filter(|s| !s.spent).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
