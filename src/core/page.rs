//! The roster page: load, render, bind, and react to page events.

use crate::core::dom::{Dom, ImageState, NodeId, Selector};
use crate::core::events::{EventBus, EventKind, Firing, Reaction};
use crate::core::fallback::ImageFallbackBinder;
use crate::core::filter::{FilterController, FilterKey, Transition};
use crate::core::markup::{Element, Fragment};
use crate::core::photos::PhotoResolver;
use crate::core::renderer::{
    RosterRenderer, SelectorList, ACTION_ATTR, COORDINATOR_PHOTO_CLASS, FALLBACK_CLASS, FILTER_ATTR,
    MEMBER_PHOTO_CLASS, RETRY_ACTION, TAB_CLASS,
};
use crate::core::reveal;
use crate::domain::model::Cohort;
use crate::domain::ports::{ImageStatus, RosterSource};
use crate::utils::error::LoadError;
use serde::Serialize;

pub const ROSTER_CONTAINER_ID: &str = "students-container";

/// Identifies one load. Only the most recently issued ticket may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Rendered { cohorts: usize },
    Failed,
    /// A newer load was issued; this result was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Filter(Transition),
    Reloaded(Applied),
    Ignored,
}

/// Serializable summary of the page, written next to the HTML snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub state: PageState,
    pub generation: u64,
    pub selectors: Vec<String>,
    pub active_filter: Option<FilterKey>,
    pub visible_years: Vec<String>,
    pub coordinator_cards: usize,
    pub member_cards: usize,
    pub avatar_fallbacks: usize,
    pub last_error: Option<String>,
}

pub struct RosterPage<S: RosterSource> {
    source: S,
    renderer: RosterRenderer,
    resolver: Option<PhotoResolver>,
    dom: Dom,
    tabs_container: NodeId,
    roster_container: NodeId,
    bus: EventBus,
    filter: Option<FilterController>,
    selectors: Option<SelectorList>,
    retry_control: Option<NodeId>,
    generation: u64,
    state: PageState,
    last_error: Option<LoadError>,
}

impl<S: RosterSource> RosterPage<S> {
    pub fn new(source: S, renderer: RosterRenderer) -> Self {
        let mut dom = Dom::new("main");
        let root = dom.root();
        let mut shell = Fragment::new();
        shell.push(Element::new("div").class("tabs"));
        shell.push(Element::new("div").attr("id", ROSTER_CONTAINER_ID));
        let ids = dom.append_fragment(root, &shell);

        Self {
            source,
            renderer,
            resolver: None,
            dom,
            tabs_container: ids[0],
            roster_container: ids[1],
            bus: EventBus::new(),
            filter: None,
            selectors: None,
            retry_control: None,
            generation: 0,
            state: PageState::Idle,
            last_error: None,
        }
    }

    /// Probe photo sources after rendering, so photos that cannot load get
    /// their avatar before the page is bound.
    pub fn with_photo_resolver(mut self, resolver: PhotoResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Full pipeline: load, render, resolve photos, bind.
    pub async fn run(&mut self) -> Applied {
        let ticket = self.begin_load();
        tracing::info!(
            "Loading roster from {} (generation {})",
            self.source.describe(),
            ticket.generation
        );
        let result = self.source.load().await;

        match self.accept(ticket, result) {
            Applied::Rendered { cohorts } => {
                if let Some(resolver) = self.resolver.clone() {
                    self.resolve_photos(&resolver).await;
                }
                self.bind();
                Applied::Rendered { cohorts }
            }
            other => other,
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = PageState::Loading;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Applies a load result without photo probing.
    pub fn apply(&mut self, ticket: LoadTicket, result: Result<Vec<Cohort>, LoadError>) -> Applied {
        let applied = self.accept(ticket, result);
        if matches!(applied, Applied::Rendered { .. }) {
            self.bind();
        }
        applied
    }

    fn accept(&mut self, ticket: LoadTicket, result: Result<Vec<Cohort>, LoadError>) -> Applied {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Dropping roster result of generation {} (current {})",
                ticket.generation,
                self.generation
            );
            return Applied::Stale;
        }

        match result {
            Ok(cohorts) => {
                self.render(&cohorts);
                self.state = PageState::Ready;
                self.last_error = None;
                tracing::info!("Rendered {} cohorts", cohorts.len());
                Applied::Rendered {
                    cohorts: cohorts.len(),
                }
            }
            Err(e) => {
                tracing::warn!("Roster load failed: {}", e);
                self.show_error();
                self.state = PageState::Failed;
                self.last_error = Some(e);
                Applied::Failed
            }
        }
    }

    fn render(&mut self, cohorts: &[Cohort]) {
        let sections = self.renderer.render(cohorts);
        self.dom.replace_children(self.roster_container, &sections);

        let selectors = self.renderer.render_selector_list(cohorts);
        let tabs = self.renderer.render_tabs(&selectors);
        self.dom.replace_children(self.tabs_container, &tabs);

        self.selectors = Some(selectors);
        self.retry_control = None;
        self.filter = None;
        self.bus.prune(&self.dom);
    }

    fn show_error(&mut self) {
        let view = self.renderer.render_error_view();
        self.dom.replace_children(self.roster_container, &view);
        self.dom.replace_children(self.tabs_container, &Fragment::new());

        self.selectors = None;
        self.filter = None;
        self.bus.prune(&self.dom);

        self.retry_control = self.dom.query(
            self.roster_container,
            &Selector::class("btn").attr_eq(ACTION_ATTR, RETRY_ACTION),
        );
        if let Some(retry) = self.retry_control {
            self.bus
                .subscribe(retry, EventKind::Click, Firing::Repeatable, Reaction::Retry);
        }
    }

    async fn resolve_photos(&mut self, resolver: &PhotoResolver) {
        let root = self.dom.root();
        let pending: Vec<(NodeId, String)> = [MEMBER_PHOTO_CLASS, COORDINATOR_PHOTO_CLASS]
            .iter()
            .flat_map(|class| self.dom.query_all(root, &Selector::class(class)))
            .filter(|photo| self.dom.image_state(*photo) == Some(&ImageState::Pending))
            .filter_map(|photo| {
                self.dom
                    .attr(photo, "src")
                    .map(|src| (photo, src.to_string()))
            })
            .collect();
        tracing::debug!("Probing {} photos", pending.len());

        for (photo, status) in resolver.resolve(pending).await {
            match status {
                ImageStatus::Loaded => self.dom.set_image_state(photo, ImageState::Loaded),
                ImageStatus::Failed(reason) => {
                    tracing::debug!(
                        "Photo {} unavailable: {}",
                        self.dom.attr(photo, "src").unwrap_or_default(),
                        reason
                    );
                    self.dom.set_image_state(photo, ImageState::Failed);
                }
            }
        }
    }

    fn bind(&mut self) {
        let root = self.dom.root();

        for photo in ImageFallbackBinder::bind(&self.dom, root, &mut self.bus) {
            self.dispatch(photo, EventKind::LoadFailed);
        }

        let filter = FilterController::bind(&mut self.dom, root);
        for tab in filter.tabs() {
            if let Some(key) = filter.key_of_tab(&self.dom, *tab) {
                self.bus
                    .subscribe(*tab, EventKind::Click, Firing::Repeatable, Reaction::SelectFilter(key));
            }
        }
        self.filter = Some(filter);

        let observed = reveal::bind(&self.dom, root, &mut self.bus);
        tracing::debug!("{} elements observed for reveal", observed);
    }

    fn dispatch(&mut self, target: NodeId, kind: EventKind) -> DispatchResult {
        let mut result = DispatchResult::default();
        for reaction in self.bus.dispatch(target, kind) {
            match reaction {
                Reaction::SelectFilter(key) => {
                    if let Some(filter) = self.filter.as_mut() {
                        result.transition = Some(filter.select(&mut self.dom, &key));
                    }
                }
                Reaction::ImageFallback { is_coordinator } => {
                    ImageFallbackBinder::substitute(&mut self.dom, target, is_coordinator);
                }
                Reaction::Reveal => reveal::reveal(&mut self.dom, target),
                Reaction::StaggerChildren => reveal::stagger_children(&mut self.dom, target),
                Reaction::Retry => result.retry = true,
            }
            result.handled += 1;
        }
        result
    }

    pub async fn click(&mut self, target: NodeId) -> ClickOutcome {
        let result = self.dispatch(target, EventKind::Click);
        if result.retry {
            tracing::info!("Retry requested");
            return ClickOutcome::Reloaded(self.run().await);
        }
        match result.transition {
            Some(transition) => ClickOutcome::Filter(transition),
            None => ClickOutcome::Ignored,
        }
    }

    /// Selects a filter the way a click on its tab would.
    pub fn select(&mut self, key: &FilterKey) -> Transition {
        let tab = self.dom.query(
            self.tabs_container,
            &Selector::class(TAB_CLASS).attr_eq(FILTER_ATTR, key.as_str()),
        );
        match tab {
            Some(tab) => self
                .dispatch(tab, EventKind::Click)
                .transition
                .unwrap_or(Transition::UnknownKey),
            None => {
                tracing::warn!("No tab for filter key '{}'", key);
                Transition::UnknownKey
            }
        }
    }

    /// The photo at `target` reported a load failure after binding.
    pub fn image_failed(&mut self, target: NodeId) -> bool {
        if self.dom.has_class(target, FALLBACK_CLASS) {
            return false;
        }
        self.dom.set_image_state(target, ImageState::Failed);
        self.dispatch(target, EventKind::LoadFailed).handled > 0
    }

    pub fn became_visible(&mut self, target: NodeId) -> bool {
        self.dispatch(target, EventKind::IntersectionVisible).handled > 0
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filter(&self) -> Option<&FilterController> {
        self.filter.as_ref()
    }

    pub fn selectors(&self) -> Option<&SelectorList> {
        self.selectors.as_ref()
    }

    pub fn retry_control(&self) -> Option<NodeId> {
        self.retry_control
    }

    pub fn roster_container(&self) -> NodeId {
        self.roster_container
    }

    pub fn tabs_container(&self) -> NodeId {
        self.tabs_container
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    pub fn take_load_error(&mut self) -> Option<LoadError> {
        self.last_error.take()
    }

    pub fn to_html(&self) -> String {
        self.dom.to_html()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let root = self.dom.root();
        let count = |class: &str| self.dom.query_all(root, &Selector::class(class)).len();

        PageSnapshot {
            state: self.state,
            generation: self.generation,
            selectors: self.selectors.as_ref().map(|s| s.labels()).unwrap_or_default(),
            active_filter: self.filter.as_ref().map(|f| f.active().clone()),
            visible_years: self
                .filter
                .as_ref()
                .map(|f| f.visible_years(&self.dom))
                .unwrap_or_default(),
            coordinator_cards: count("coordinator-card"),
            member_cards: count("student-card"),
            avatar_fallbacks: count("avatar-fallback"),
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct DispatchResult {
    handled: usize,
    transition: Option<Transition>,
    retry: bool,
}
