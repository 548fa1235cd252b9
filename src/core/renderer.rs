//! Roster markup: cohort sections, cards, selector tabs and the error view.
//!
//! Everything here is a pure function of the loaded cohorts; nothing touches
//! the page document.

use crate::core::avatar;
use crate::core::filter::FilterKey;
use crate::core::markup::{Element, Fragment, Node};
use crate::domain::labels::Labels;
use crate::domain::model::{Cohort, LinkKind, Person};

pub const SECTION_CLASS: &str = "batch-section";
pub const COORDINATOR_CARD_CLASS: &str = "coordinator-card";
pub const MEMBER_CARD_CLASS: &str = "student-card";
pub const COORDINATOR_PHOTO_CLASS: &str = "coordinator-card__image";
pub const MEMBER_PHOTO_CLASS: &str = "student-card__image";
pub const MEMBERS_GRID_CLASS: &str = "students-grid";
pub const TAB_CLASS: &str = "tab";
pub const FILTER_ATTR: &str = "data-batch";
pub const ACTION_ATTR: &str = "data-action";
pub const RETRY_ACTION: &str = "retry";
pub const FALLBACK_CLASS: &str = "avatar-fallback";

const PEOPLE_ICON: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M17 21v-2a4 4 0 0 0-4-4H5a4 4 0 0 0-4 4v2"></path><circle cx="9" cy="7" r="4"></circle><path d="M23 21v-2a4 4 0 0 0-3-3.87"></path><path d="M16 3.13a4 4 0 0 1 0 7.75"></path></svg>"#;
const ERROR_ICON: &str = r##"<svg width="60" height="60" viewBox="0 0 24 24" fill="none" stroke="#751A20" stroke-width="2"><circle cx="12" cy="12" r="10"></circle><line x1="12" y1="8" x2="12" y2="12"></line><line x1="12" y1="16" x2="12.01" y2="16"></line></svg>"##;
const LINKEDIN_ICON: &str = r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="M16 8a6 6 0 0 1 6 6v7h-4v-7a2 2 0 0 0-2-2 2 2 0 0 0-2 2v7h-4v-7a6 6 0 0 1 6-6z"></path><rect x="2" y="9" width="4" height="12"></rect><circle cx="4" cy="4" r="2"></circle></svg>"#;
const RESEARCHGATE_ICON: &str = r#"<svg viewBox="0 0 24 24" fill="currentColor"><rect x="1" y="1" width="22" height="22" rx="3" fill="none" stroke="currentColor" stroke-width="2"></rect><text x="12" y="16" font-size="10" font-weight="bold" text-anchor="middle">RG</text></svg>"#;
const GITHUB_ICON: &str = r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="M12 0C5.37 0 0 5.37 0 12c0 5.3 3.44 9.8 8.2 11.39.6.11.8-.26.8-.58v-2.23c-3.34.73-4.03-1.42-4.03-1.42-.55-1.39-1.33-1.76-1.33-1.76-1.09-.75.08-.73.08-.73 1.2.08 1.84 1.24 1.84 1.24 1.07 1.83 2.81 1.3 3.49 1 .11-.78.42-1.31.76-1.6-2.67-.31-5.47-1.34-5.47-5.93 0-1.31.47-2.38 1.24-3.22-.12-.3-.54-1.52.12-3.18 0 0 1-.32 3.3 1.23a11.5 11.5 0 0 1 6 0c2.29-1.55 3.3-1.23 3.3-1.23.65 1.66.24 2.88.12 3.18.77.84 1.23 1.91 1.23 3.22 0 4.61-2.81 5.62-5.48 5.92.43.37.82 1.1.82 2.22v3.29c0 .32.19.7.8.58C20.57 21.8 24 17.3 24 12c0-6.63-5.37-12-12-12z"></path></svg>"#;

/// Filter keys offered by the selector tabs: `all` first, then each distinct
/// year in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<FilterKey>);

impl SelectorList {
    pub fn keys(&self) -> &[FilterKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &FilterKey) -> bool {
        self.0.contains(key)
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|k| k.as_str().to_string()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RosterRenderer {
    labels: Labels,
}

impl RosterRenderer {
    pub fn new(labels: Labels) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn render(&self, cohorts: &[Cohort]) -> Fragment {
        cohorts
            .iter()
            .map(|cohort| Node::from(self.render_cohort(cohort)))
            .collect()
    }

    pub fn render_selector_list(&self, cohorts: &[Cohort]) -> SelectorList {
        let mut keys = vec![FilterKey::All];
        for cohort in cohorts {
            let key = FilterKey::Year(cohort.year.as_str().to_string());
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        SelectorList(keys)
    }

    pub fn render_tabs(&self, selectors: &SelectorList) -> Fragment {
        selectors
            .keys()
            .iter()
            .map(|key| {
                let tab = Element::new("button")
                    .class(TAB_CLASS)
                    .attr(FILTER_ATTR, key.as_str());
                let tab = match key {
                    FilterKey::All => tab.class("active").text(self.labels.all_tab.clone()),
                    FilterKey::Year(year) => tab.text(year.clone()),
                };
                Node::from(tab)
            })
            .collect()
    }

    pub fn render_error_view(&self) -> Fragment {
        let mut fragment = Fragment::new();
        fragment.push(
            Element::new("div")
                .class("error-message")
                .raw(ERROR_ICON)
                .child(Element::new("h3").text(self.labels.error_title.clone()))
                .child(Element::new("p").text(self.labels.error_hint.clone()))
                .child(
                    Element::new("button")
                        .class("btn btn--primary")
                        .attr(ACTION_ATTR, RETRY_ACTION)
                        .attr("onclick", "location.reload()")
                        .text(self.labels.retry.clone()),
                ),
        );
        fragment
    }

    fn render_cohort(&self, cohort: &Cohort) -> Element {
        let year = cohort.year.as_str();

        let header = Element::new("div")
            .class("batch-section__header")
            .child(
                Element::new("div")
                    .class("batch-section__title")
                    .child(Element::new("h2").text(self.labels.cohort_heading.clone()))
                    .child(Element::new("span").class("batch-section__year").text(year)),
            )
            .child(
                Element::new("div")
                    .class("batch-section__count")
                    .raw(PEOPLE_ICON)
                    .child(
                        Element::new("span").text(self.labels.member_count(cohort.members.len())),
                    ),
            );

        Element::new("div")
            .class(SECTION_CLASS)
            .attr(FILTER_ATTR, year)
            .child(header)
            .child(self.coordinator_card(&cohort.coordinator))
            .child(
                Element::new("h3")
                    .class("students-grid-title")
                    .text(self.labels.members_grid_title.clone()),
            )
            .child(
                Element::new("div")
                    .class(MEMBERS_GRID_CLASS)
                    .children(cohort.members.iter().map(|m| self.member_card(m, year))),
            )
    }

    fn coordinator_card(&self, person: &Person) -> Element {
        let mut info = Element::new("div")
            .class("coordinator-card__info")
            .child(
                Element::new("span")
                    .class("coordinator-card__title")
                    .text(self.labels.coordinator_title.clone()),
            )
            .child(
                Element::new("h3")
                    .class("coordinator-card__name")
                    .text(person.name.clone()),
            );
        if let Some(role) = &person.role {
            info = info.child(Element::new("p").class("coordinator-card__role").text(role.clone()));
        }

        let links = person.links.iter().map(|(kind, url)| {
            external_link(url)
                .class("coordinator-link")
                .raw(icon(kind))
                .text(kind.label())
        });
        info = info.child(Element::new("div").class("coordinator-card__links").children(links));

        Element::new("div")
            .class(COORDINATOR_CARD_CLASS)
            .child(
                Element::new("div")
                    .class("coordinator-card__image-wrapper")
                    .child(photo(person, COORDINATOR_PHOTO_CLASS, true)),
            )
            .child(info)
    }

    fn member_card(&self, person: &Person, year: &str) -> Element {
        let links = person.links.iter().map(|(kind, url)| {
            external_link(url)
                .class("student-card__link")
                .class(&format!("student-card__link--{}", kind.slug()))
                .attr("title", kind.label())
                .raw(icon(kind))
        });

        Element::new("div")
            .class(MEMBER_CARD_CLASS)
            .child(
                Element::new("div")
                    .class("student-card__image-wrapper")
                    .child(photo(person, MEMBER_PHOTO_CLASS, false)),
            )
            .child(
                Element::new("h4")
                    .class("student-card__name")
                    .text(person.name.clone()),
            )
            .child(
                Element::new("p")
                    .class("student-card__batch")
                    .text(format!("{} {}", self.labels.cohort_heading, year)),
            )
            .child(Element::new("div").class("student-card__links").children(links))
    }
}

fn photo(person: &Person, class: &str, is_coordinator: bool) -> Element {
    let fallback = avatar::generate(&person.name, is_coordinator).data_uri();
    Element::new("img")
        .class(class)
        .attr("src", person.image_url.clone().unwrap_or_default())
        .attr("alt", person.name.clone())
        .attr(
            "onerror",
            format!(
                "this.onerror=null;this.src='{}';this.classList.add('{}');",
                fallback, FALLBACK_CLASS
            ),
        )
}

fn external_link(url: &str) -> Element {
    Element::new("a")
        .attr("href", url)
        .attr("target", "_blank")
        .attr("rel", "noopener")
}

fn icon(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::LinkedIn => LINKEDIN_ICON,
        LinkKind::ResearchGate => RESEARCHGATE_ICON,
        LinkKind::GitHub => GITHUB_ICON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RosterDocument;

    fn example_cohorts() -> Vec<Cohort> {
        let doc: RosterDocument = serde_json::from_value(serde_json::json!({
            "batches": [{
                "year": 2023,
                "coordinator": {"name": "Pr. Amina El Idrissi", "role": "Professeure"},
                "students": [{"name": "Youssef Benali"}, {"name": "Sara Tazi"}]
            }]
        }))
        .unwrap();
        doc.batches
    }

    #[test]
    fn renders_example_document() {
        let renderer = RosterRenderer::default();
        let cohorts = example_cohorts();
        let fragment = renderer.render(&cohorts);

        assert_eq!(fragment.find_by_class(SECTION_CLASS).len(), 1);
        assert_eq!(fragment.find_by_class(COORDINATOR_CARD_CLASS).len(), 1);
        assert_eq!(fragment.find_by_class(MEMBER_CARD_CLASS).len(), 2);

        let count = fragment.find_by_class("batch-section__count")[0].text_content();
        assert_eq!(count, "2 Étudiants");

        let section = fragment.find_by_class(SECTION_CLASS)[0];
        assert_eq!(section.get_attr(FILTER_ATTR), Some("2023"));

        assert_eq!(
            renderer.render_selector_list(&cohorts).labels(),
            vec!["all", "2023"]
        );
    }

    #[test]
    fn member_cards_follow_input_order() {
        let renderer = RosterRenderer::default();
        let fragment = renderer.render(&example_cohorts());
        let names: Vec<String> = fragment
            .find_by_class("student-card__name")
            .iter()
            .map(|el| el.text_content())
            .collect();
        assert_eq!(names, vec!["Youssef Benali", "Sara Tazi"]);
    }

    #[test]
    fn single_member_label_is_singular() {
        let mut cohorts = example_cohorts();
        cohorts[0].members.truncate(1);
        let fragment = RosterRenderer::default().render(&cohorts);
        let count = fragment.find_by_class("batch-section__count")[0].text_content();
        assert_eq!(count, "1 Étudiant");
    }

    #[test]
    fn empty_roster_renders_nothing_but_all() {
        let renderer = RosterRenderer::default();
        assert!(renderer.render(&[]).is_empty());
        assert_eq!(renderer.render_selector_list(&[]).labels(), vec!["all"]);

        let tabs = renderer.render_tabs(&renderer.render_selector_list(&[]));
        let rendered = tabs.find_by_class(TAB_CLASS);
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].has_class("active"));
    }

    #[test]
    fn selector_list_deduplicates_years_in_first_seen_order() {
        let mut cohorts = example_cohorts();
        let mut second = cohorts[0].clone();
        second.year = crate::domain::model::CohortYear::new("2021");
        cohorts.push(second);
        cohorts.push(cohorts[0].clone());

        let selectors = RosterRenderer::default().render_selector_list(&cohorts);
        assert_eq!(selectors.labels(), vec!["all", "2023", "2021"]);
    }

    #[test]
    fn only_present_links_are_rendered() {
        let doc: RosterDocument = serde_json::from_value(serde_json::json!({
            "batches": [{
                "year": "2024",
                "coordinator": {
                    "name": "Dr. Karim Alaoui",
                    "linkedin": "#",
                    "researchgate": "https://researchgate.net/profile/karim"
                },
                "students": [{
                    "name": "Sara Tazi",
                    "linkedin": "https://linkedin.com/in/sara",
                    "github": "#"
                }]
            }]
        }))
        .unwrap();
        let fragment = RosterRenderer::default().render(&doc.batches);

        let coordinator_links = fragment.find_by_class("coordinator-link");
        assert_eq!(coordinator_links.len(), 1);
        assert_eq!(
            coordinator_links[0].get_attr("href"),
            Some("https://researchgate.net/profile/karim")
        );

        let member_links = fragment.find_by_class("student-card__link");
        assert_eq!(member_links.len(), 1);
        assert!(member_links[0].has_class("student-card__link--linkedin"));
        assert_eq!(member_links[0].get_attr("rel"), Some("noopener"));
    }

    #[test]
    fn photos_carry_alt_and_inline_fallback() {
        let fragment = RosterRenderer::default().render(&example_cohorts());
        let photo = fragment.find_by_class(COORDINATOR_PHOTO_CLASS)[0];

        assert_eq!(photo.get_attr("alt"), Some("Pr. Amina El Idrissi"));
        assert_eq!(photo.get_attr("src"), Some(""));
        let onerror = photo.get_attr("onerror").unwrap();
        assert!(onerror.contains(&avatar::generate("Pr. Amina El Idrissi", true).data_uri()));
    }

    #[test]
    fn error_view_offers_retry() {
        let fragment = RosterRenderer::default().render_error_view();
        let html = fragment.to_html();
        assert!(html.contains("Impossible de charger les données"));
        assert!(html.contains("data-action=\"retry\""));
        // the exported page has no host to dispatch the click
        assert!(html.contains("onclick=\"location.reload()\""));
    }

    #[test]
    fn sections_start_revealed() {
        let fragment = RosterRenderer::default().render(&example_cohorts());
        let section = fragment.find_by_class(SECTION_CLASS)[0];

        assert!(!section.has_class("animate"));
        assert!(fragment
            .to_html()
            .starts_with("<div class=\"batch-section\" data-batch=\"2023\">"));
    }
}
