use crate::core::avatar;
use crate::core::dom::{Dom, ImageState, NodeId, Selector};
use crate::core::events::{EventBus, EventKind, Firing, Reaction};
use crate::core::renderer::{COORDINATOR_PHOTO_CLASS, FALLBACK_CLASS, MEMBER_PHOTO_CLASS};

const MEMBER_ALT_DEFAULT: &str = "Student";
const COORDINATOR_ALT_DEFAULT: &str = "Coordinator";

/// Wires placeholder avatars onto roster photos.
pub struct ImageFallbackBinder;

impl ImageFallbackBinder {
    /// Subscribes every photo under `scope` to a once-firing load failure and
    /// returns the photos that had already failed before binding. The caller
    /// dispatches `LoadFailed` for those so they take the same path.
    pub fn bind(dom: &Dom, scope: NodeId, bus: &mut EventBus) -> Vec<NodeId> {
        let mut already_failed = Vec::new();
        for (class, is_coordinator) in [(MEMBER_PHOTO_CLASS, false), (COORDINATOR_PHOTO_CLASS, true)] {
            for photo in dom.query_all(scope, &Selector::class(class)) {
                if dom.has_class(photo, FALLBACK_CLASS) {
                    continue;
                }
                bus.subscribe(
                    photo,
                    EventKind::LoadFailed,
                    Firing::Once,
                    Reaction::ImageFallback { is_coordinator },
                );
                if dom.image_state(photo) == Some(&ImageState::Failed) {
                    already_failed.push(photo);
                }
            }
        }
        tracing::debug!(
            "Image fallbacks bound, {} photos already failed",
            already_failed.len()
        );
        already_failed
    }

    /// Swaps the photo for its generated avatar. Returns false when the photo
    /// already shows one.
    pub fn substitute(dom: &mut Dom, photo: NodeId, is_coordinator: bool) -> bool {
        if dom.has_class(photo, FALLBACK_CLASS) {
            return false;
        }
        let default_alt = if is_coordinator {
            COORDINATOR_ALT_DEFAULT
        } else {
            MEMBER_ALT_DEFAULT
        };
        let name = dom
            .attr(photo, "alt")
            .filter(|alt| !alt.trim().is_empty())
            .unwrap_or(default_alt)
            .to_string();

        let uri = avatar::generate(&name, is_coordinator).data_uri();
        dom.set_attr(photo, "src", &uri);
        dom.set_image_state(photo, ImageState::Loaded);
        dom.add_class(photo, FALLBACK_CLASS);
        tracing::debug!("Photo of '{}' replaced by placeholder avatar", name);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::renderer::RosterRenderer;
    use crate::domain::model::{Cohort, CohortYear, Person};

    fn rendered() -> (Dom, Vec<NodeId>) {
        let mut photographed = Person::named("Youssef Benali");
        photographed.image_url = Some("images/youssef.jpg".to_string());
        let cohort = Cohort {
            year: CohortYear::new("2023"),
            coordinator: Person::named("Pr. Amina El Idrissi"),
            members: vec![photographed, Person::named("Sara Tazi")],
        };
        let mut dom = Dom::new("main");
        let root = dom.root();
        dom.append_fragment(root, &RosterRenderer::default().render(&[cohort]));
        let photos = dom.query_all(root, &Selector::class(MEMBER_PHOTO_CLASS));
        (dom, photos)
    }

    #[test]
    fn photos_without_source_are_reported_as_already_failed() {
        let (dom, photos) = rendered();
        let mut bus = EventBus::new();

        let failed = ImageFallbackBinder::bind(&dom, dom.root(), &mut bus);

        // Sara has no image; the coordinator has none either
        assert_eq!(failed.len(), 2);
        assert!(failed.contains(&photos[1]));
        assert!(!failed.contains(&photos[0]));
        assert!(bus.has_subscription(photos[0], EventKind::LoadFailed));
    }

    #[test]
    fn substitution_uses_alt_text_and_happens_once() {
        let (mut dom, photos) = rendered();

        assert!(ImageFallbackBinder::substitute(&mut dom, photos[0], false));
        let first_src = dom.attr(photos[0], "src").unwrap().to_string();
        assert!(!ImageFallbackBinder::substitute(&mut dom, photos[0], false));

        assert_eq!(first_src, avatar::generate("Youssef Benali", false).data_uri());
        assert_eq!(dom.attr(photos[0], "src"), Some(first_src.as_str()));
        assert!(dom.has_class(photos[0], FALLBACK_CLASS));
        assert_eq!(dom.image_state(photos[0]), Some(&ImageState::Loaded));
    }

    #[test]
    fn missing_alt_falls_back_to_role_word() {
        let (mut dom, photos) = rendered();
        dom.set_attr(photos[1], "alt", "");

        ImageFallbackBinder::substitute(&mut dom, photos[1], false);

        assert_eq!(
            dom.attr(photos[1], "src").map(str::to_string),
            Some(avatar::generate("Student", false).data_uri())
        );
    }

    #[test]
    fn photos_already_showing_an_avatar_are_not_rebound() {
        let (mut dom, photos) = rendered();
        ImageFallbackBinder::substitute(&mut dom, photos[1], false);
        let mut bus = EventBus::new();

        ImageFallbackBinder::bind(&dom, dom.root(), &mut bus);

        assert!(!bus.has_subscription(photos[1], EventKind::LoadFailed));
    }
}
