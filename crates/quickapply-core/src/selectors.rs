use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// What a located element must satisfy to count as a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementPredicate {
    /// Any element the locator returns
    Present,
    /// The element must be rendered
    Visible,
    /// The element must be rendered and its text or aria-label must contain
    /// the phrase (case-insensitive)
    VisibleWithLabel(String),
}

/// Observable state of an element, gathered once and fed to a predicate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    pub visible: bool,
    pub text: String,
    pub aria_label: Option<String>,
}

impl ElementPredicate {
    /// Whether the predicate needs the element's text and label
    pub fn needs_label(&self) -> bool {
        matches!(self, ElementPredicate::VisibleWithLabel(_))
    }

    pub fn accepts(&self, snapshot: &ElementSnapshot) -> bool {
        match self {
            ElementPredicate::Present => true,
            ElementPredicate::Visible => snapshot.visible,
            ElementPredicate::VisibleWithLabel(phrase) => {
                if !snapshot.visible {
                    return false;
                }
                let phrase = phrase.to_lowercase();
                snapshot.text.to_lowercase().contains(&phrase)
                    || snapshot
                        .aria_label
                        .as_deref()
                        .is_some_and(|label| label.to_lowercase().contains(&phrase))
            }
        }
    }
}

/// A locator paired with the predicate its matches must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorStrategy {
    pub locator: String,
    pub predicate: ElementPredicate,
}

/// Ordered list of strategies; earlier entries have priority and the first
/// accepted element wins
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorChain {
    strategies: Vec<SelectorStrategy>,
}

impl SelectorChain {
    /// Build a chain that applies one predicate to every locator
    pub fn new<I, S>(locators: I, predicate: ElementPredicate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategies: locators
                .into_iter()
                .map(|locator| SelectorStrategy {
                    locator: locator.into(),
                    predicate: predicate.clone(),
                })
                .collect(),
        }
    }

    pub fn strategies(&self) -> &[SelectorStrategy] {
        &self.strategies
    }
}

/// Site markup the driver relies on
///
/// Every list is tried in order. Kept in configuration so markup drift can be
/// handled without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    /// Containers whose presence means results have rendered
    pub results_container: Vec<String>,
    /// Listing cards on the results page
    pub listing_item: Vec<String>,
    /// Title link used to spot-check that listing cards are populated
    pub listing_title_probe: String,
    /// Title links inside a listing card, clicked to open the listing
    pub listing_title: Vec<String>,
    /// Buttons inspected by the eligibility check
    pub apply_button: Vec<String>,
    /// Buttons clicked to start a quick-apply flow
    pub apply_trigger: Vec<String>,
    /// Phrase marking a quick-apply button, matched case-insensitively
    pub quick_apply_marker: String,
    /// Control that closes the application overlay
    pub dismiss: Vec<String>,
    /// Control that advances a multi-step form
    pub continue_button: String,
    /// Control that submits the application
    pub submit_button: String,
    /// Elements scanned for fillable fields on each form step
    pub form_field: Vec<String>,
    pub login_username: String,
    pub login_password: String,
    pub login_submit: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            results_container: strings(&[
                "div.jobs-search-results-list",
                "ul.jobs-search-results__list",
                "div.scaffold-layout__list-container",
                "div.jobs-search__results-list",
            ]),
            listing_item: strings(&[
                "div.job-card-container",
                "li.jobs-search-results__list-item",
                "div.job-card-list__entity-lockup",
                "div[data-job-id]",
            ]),
            listing_title_probe: "a.job-card-list__title".to_string(),
            listing_title: strings(&[
                "a.job-card-list__title",
                "h3.job-card-list__title",
                "a.disabled.ember-view.job-card-container__link.job-card-list__title",
                ".job-card-container__link",
                ".jobs-search-results__list-item-title",
            ]),
            apply_button: strings(&[
                "button.jobs-apply-button.artdeco-button--3",
                "button.jobs-apply-button.artdeco-button--primary",
                "button[data-live-test-job-apply-button]",
                "button.artdeco-button--primary[aria-label*='Easy Apply to']",
                ".jobs-apply-button",
            ]),
            apply_trigger: strings(&[
                "button.jobs-apply-button.artdeco-button--3",
                "button.jobs-apply-button.artdeco-button--primary",
                "button[data-live-test-job-apply-button]",
                "button.artdeco-button--primary[aria-label*='Easy Apply to']",
            ]),
            quick_apply_marker: "easy apply".to_string(),
            dismiss: strings(&["button[aria-label='Dismiss']"]),
            continue_button: "button[aria-label='Continue to next step']".to_string(),
            submit_button: "button[aria-label='Submit application']".to_string(),
            form_field: strings(&["input", "textarea"]),
            login_username: "#username".to_string(),
            login_password: "#password".to_string(),
            login_submit: "button[type='submit']".to_string(),
        }
    }
}

impl SiteSelectors {
    pub fn container_chain(&self) -> SelectorChain {
        SelectorChain::new(self.results_container.iter().cloned(), ElementPredicate::Visible)
    }

    pub fn title_chain(&self) -> SelectorChain {
        SelectorChain::new(self.listing_title.iter().cloned(), ElementPredicate::Visible)
    }

    pub fn eligibility_chain(&self) -> SelectorChain {
        SelectorChain::new(
            self.apply_button.iter().cloned(),
            ElementPredicate::VisibleWithLabel(self.quick_apply_marker.clone()),
        )
    }

    pub fn trigger_chain(&self) -> SelectorChain {
        SelectorChain::new(
            self.apply_trigger.iter().cloned(),
            ElementPredicate::VisibleWithLabel(self.quick_apply_marker.clone()),
        )
    }

    pub fn dismiss_chain(&self) -> SelectorChain {
        SelectorChain::new(self.dismiss.iter().cloned(), ElementPredicate::Present)
    }

    pub fn validate(&self) -> Result<()> {
        let lists = [
            ("results_container", &self.results_container),
            ("listing_item", &self.listing_item),
            ("listing_title", &self.listing_title),
            ("apply_button", &self.apply_button),
            ("apply_trigger", &self.apply_trigger),
            ("form_field", &self.form_field),
        ];
        for (name, list) in lists {
            if list.is_empty() || list.iter().any(|s| s.trim().is_empty()) {
                return Err(Error::InvalidConfig(format!(
                    "selectors.{} must be a non-empty list of selectors",
                    name
                )));
            }
        }

        let single = [
            ("listing_title_probe", &self.listing_title_probe),
            ("quick_apply_marker", &self.quick_apply_marker),
            ("continue_button", &self.continue_button),
            ("submit_button", &self.submit_button),
            ("login_username", &self.login_username),
            ("login_password", &self.login_password),
            ("login_submit", &self.login_submit),
        ];
        for (name, value) in single {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("selectors.{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
