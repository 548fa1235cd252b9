use serde::{Deserialize, Serialize};

/// User-visible strings of the roster page. Defaults are the site's French copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub cohort_heading: String,
    pub member_singular: String,
    pub member_plural: String,
    pub coordinator_title: String,
    pub members_grid_title: String,
    pub all_tab: String,
    pub error_title: String,
    pub error_hint: String,
    pub retry: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            cohort_heading: "Promotion".to_string(),
            member_singular: "Étudiant".to_string(),
            member_plural: "Étudiants".to_string(),
            coordinator_title: "Coordinateur de la Formation".to_string(),
            members_grid_title: "Étudiants de la Promotion".to_string(),
            all_tab: "Toutes les Promotions".to_string(),
            error_title: "Impossible de charger les données".to_string(),
            error_hint: "Veuillez réessayer ultérieurement.".to_string(),
            retry: "Réessayer".to_string(),
        }
    }
}

impl Labels {
    /// `"1 Étudiant"`, `"0 Étudiants"`, `"2 Étudiants"`.
    pub fn member_count(&self, count: usize) -> String {
        let noun = if count == 1 {
            &self.member_singular
        } else {
            &self.member_plural
        };
        format!("{} {}", count, noun)
    }
}
