use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Link value meaning "no profile" in the roster document.
pub const ABSENT_LINK: &str = "#";

/// Cohort label. The document may carry it as a JSON string or integer; both
/// compare by their string form, which is also the `data-batch` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CohortYear(String);

impl CohortYear {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CohortYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CohortYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawYear {
            Text(String),
            Integer(i64),
        }

        Ok(match RawYear::deserialize(deserializer)? {
            RawYear::Text(text) => CohortYear(text),
            RawYear::Integer(n) => CohortYear(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkKind {
    LinkedIn,
    ResearchGate,
    GitHub,
}

impl LinkKind {
    pub const ALL: [LinkKind; 3] = [LinkKind::LinkedIn, LinkKind::ResearchGate, LinkKind::GitHub];

    pub fn label(self) -> &'static str {
        match self {
            LinkKind::LinkedIn => "LinkedIn",
            LinkKind::ResearchGate => "ResearchGate",
            LinkKind::GitHub => "GitHub",
        }
    }

    /// Modifier used in `student-card__link--{slug}`.
    pub fn slug(self) -> &'static str {
        match self {
            LinkKind::LinkedIn => "linkedin",
            LinkKind::ResearchGate => "researchgate",
            LinkKind::GitHub => "github",
        }
    }
}

/// External profile links of a person, in `LinkKind::ALL` order. Only links
/// with a usable URL are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<(LinkKind, String)>);

impl Links {
    pub fn from_optional(entries: impl IntoIterator<Item = (LinkKind, Option<String>)>) -> Self {
        let mut links: Vec<(LinkKind, String)> = entries
            .into_iter()
            .filter_map(|(kind, url)| url.filter(|u| is_present_link(u)).map(|u| (kind, u)))
            .collect();
        links.sort_by_key(|(kind, _)| *kind);
        links.dedup_by_key(|(kind, _)| *kind);
        Self(links)
    }

    pub fn get(&self, kind: LinkKind) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, url)| url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkKind, &str)> {
        self.0.iter().map(|(kind, url)| (*kind, url.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

pub fn is_present_link(url: &str) -> bool {
    let trimmed = url.trim();
    !trimmed.is_empty() && trimmed != ABSENT_LINK
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPerson", into = "RawPerson")]
pub struct Person {
    pub name: String,
    pub image_url: Option<String>,
    pub role: Option<String>,
    pub links: Links,
}

/// Document shape of a person: flat optional link fields, photo under `image`.
#[derive(Serialize, Deserialize)]
struct RawPerson {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    researchgate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    github: Option<String>,
}

impl From<RawPerson> for Person {
    fn from(raw: RawPerson) -> Self {
        Person {
            name: raw.name,
            image_url: raw.image.filter(|src| !src.trim().is_empty()),
            role: raw.role,
            links: Links::from_optional([
                (LinkKind::LinkedIn, raw.linkedin),
                (LinkKind::ResearchGate, raw.researchgate),
                (LinkKind::GitHub, raw.github),
            ]),
        }
    }
}

impl From<Person> for RawPerson {
    fn from(person: Person) -> Self {
        let link = |kind| person.links.get(kind).map(str::to_string);
        RawPerson {
            linkedin: link(LinkKind::LinkedIn),
            researchgate: link(LinkKind::ResearchGate),
            github: link(LinkKind::GitHub),
            name: person.name,
            image: person.image_url,
            role: person.role,
        }
    }
}

impl Person {
    pub fn named(name: impl Into<String>) -> Self {
        Person {
            name: name.into(),
            image_url: None,
            role: None,
            links: Links::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    pub year: CohortYear,
    pub coordinator: Person,
    #[serde(rename = "students", default)]
    pub members: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDocument {
    pub batches: Vec<Cohort>,
}
