//! In-memory job board used by the driver tests

use async_trait::async_trait;
use quickapply_core::selectors::SiteSelectors;
use quickapply_core::session::BrowserSession;
use quickapply_core::{Error, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Container,
    Listing(usize),
    Title(usize),
    ApplyButton,
    Continue,
    Submit,
    Dismiss,
    Field(usize),
    LoginUsername,
    LoginPassword,
    LoginSubmit,
    /// Fixture element registered with `FakeSession::labelled`
    Label(usize),
}

#[derive(Debug, Clone)]
pub struct FakeField {
    pub kind: Option<String>,
    pub aria_label: Option<String>,
    pub placeholder: Option<String>,
    pub value: String,
    pub visible: bool,
    pub readonly: bool,
}

impl FakeField {
    pub fn text(label: &str) -> Self {
        Self {
            kind: Some("text".to_string()),
            aria_label: Some(label.to_string()),
            placeholder: None,
            value: String::new(),
            visible: true,
            readonly: false,
        }
    }

    pub fn kind(mut self, kind: Option<&str>) -> Self {
        self.kind = kind.map(str::to_string);
        self
    }

    pub fn placeholder_only(label: &str) -> Self {
        Self {
            aria_label: None,
            placeholder: Some(label.to_string()),
            ..Self::text(label)
        }
    }

    pub fn prefilled(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeStep {
    pub fields: Vec<FakeField>,
    pub submit: bool,
    pub enabled: bool,
}

impl FakeStep {
    pub fn next(fields: Vec<FakeField>) -> Self {
        Self {
            fields,
            submit: false,
            enabled: true,
        }
    }

    pub fn submit(fields: Vec<FakeField>) -> Self {
        Self {
            fields,
            submit: true,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeListing {
    pub title: Option<String>,
    pub quick_apply: bool,
    pub trigger_works: bool,
    pub steps: Vec<FakeStep>,
    /// Keep serving the last step after it is completed
    pub endless: bool,
}

impl FakeListing {
    pub fn quick(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            quick_apply: true,
            trigger_works: true,
            steps: vec![FakeStep::submit(Vec::new())],
            endless: false,
        }
    }

    pub fn external(title: &str) -> Self {
        Self {
            quick_apply: false,
            ..Self::quick(title)
        }
    }

    pub fn untitled() -> Self {
        Self {
            title: None,
            ..Self::quick("untitled")
        }
    }

    pub fn steps(mut self, steps: Vec<FakeStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn broken_trigger(mut self) -> Self {
        self.trigger_works = false;
        self
    }

    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct SiteState {
    pub listings: Vec<FakeListing>,
    pub container_after_reloads: Option<usize>,
    pub reloads: usize,
    pub visited: Vec<String>,
    pub open: Option<usize>,
    pub step: Option<usize>,
    pub fields: Vec<FakeField>,
    pub submitted: Vec<String>,
    pub dismissed: usize,
    pub credentials: Vec<(Node, String)>,
    pub logged_in: bool,
    pub disconnect_on_open: Option<usize>,
    pub disconnected: bool,
    pub quit: bool,
    pub scripts: usize,
}

pub struct FakeSession {
    selectors: SiteSelectors,
    state: Arc<Mutex<SiteState>>,
    /// Selectors answered as if they were another selector
    aliases: Vec<(String, String)>,
    /// Selectors that match nothing
    unmatched: Vec<String>,
    /// Selectors whose lookup fails with a non-fatal error
    broken: Vec<String>,
    /// Standalone elements with the given text, one per selector
    labelled: Vec<(String, String)>,
}

impl FakeSession {
    pub fn new(listings: Vec<FakeListing>) -> Self {
        Self {
            selectors: SiteSelectors::default(),
            state: Arc::new(Mutex::new(SiteState {
                listings,
                container_after_reloads: Some(0),
                ..SiteState::default()
            })),
            aliases: Vec::new(),
            unmatched: Vec::new(),
            broken: Vec::new(),
            labelled: Vec::new(),
        }
    }

    /// Answer `selector` with whatever `target` would match
    pub fn answer_as(mut self, selector: &str, target: &str) -> Self {
        self.aliases.push((selector.to_string(), target.to_string()));
        self
    }

    pub fn unmatched(mut self, selector: &str) -> Self {
        self.unmatched.push(selector.to_string());
        self
    }

    pub fn broken(mut self, selector: &str) -> Self {
        self.broken.push(selector.to_string());
        self
    }

    /// Add a visible element found by `selector` whose text is `text`
    pub fn labelled(mut self, selector: &str, text: &str) -> Self {
        self.labelled.push((selector.to_string(), text.to_string()));
        self
    }

    /// Results container shows up only after `reloads` page reloads
    pub fn container_after_reloads(self, reloads: Option<usize>) -> Self {
        self.state().container_after_reloads = reloads;
        self
    }

    /// Drop the connection when the listing at `index` is opened
    pub fn disconnect_on_open(self, index: usize) -> Self {
        self.state().disconnect_on_open = Some(index);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap()
    }

    /// Handle on the page state that outlives the session
    pub fn shared(&self) -> Arc<Mutex<SiteState>> {
        Arc::clone(&self.state)
    }

    fn live(&self) -> Result<MutexGuard<'_, SiteState>> {
        let state = self.state();
        if state.disconnected || state.quit {
            return Err(Error::Disconnected("browser is gone".to_string()));
        }
        Ok(state)
    }

    fn current_step(state: &SiteState) -> Option<&FakeStep> {
        let listing = state.listings.get(state.open?)?;
        let index = state.step?;
        listing.steps.get(index)
    }

    fn enter_step(state: &mut SiteState, index: usize) {
        let next = state
            .open
            .and_then(|i| state.listings.get(i))
            .and_then(|listing| {
                let index = if index >= listing.steps.len() && listing.endless {
                    listing.steps.len().saturating_sub(1)
                } else {
                    index
                };
                listing.steps.get(index).map(|step| (index, step.fields.clone()))
            });
        match next {
            Some((index, fields)) => {
                state.fields = fields;
                state.step = Some(index);
            }
            None => {
                state.fields.clear();
                state.step = None;
            }
        }
    }

    fn press(&self, node: Node) -> Result<()> {
        let mut state = self.live()?;
        match node {
            Node::Title(i) => {
                if state.disconnect_on_open == Some(i) {
                    state.disconnected = true;
                    return Err(Error::Disconnected("target crashed".to_string()));
                }
                state.open = Some(i);
                state.step = None;
                state.fields.clear();
            }
            Node::ApplyButton => {
                let works = state
                    .open
                    .and_then(|i| state.listings.get(i))
                    .is_some_and(|l| l.trigger_works);
                if !works {
                    return Err(Error::Element("click intercepted".to_string()));
                }
                Self::enter_step(&mut state, 0);
            }
            Node::Continue | Node::Submit => {
                let step = Self::current_step(&state)
                    .cloned()
                    .ok_or_else(|| Error::Element("stale element".to_string()))?;
                if !step.enabled {
                    return Err(Error::Element("element is disabled".to_string()));
                }
                if step.submit {
                    let title = state
                        .open
                        .and_then(|i| state.listings[i].title.clone())
                        .unwrap_or_default();
                    state.submitted.push(title);
                    state.step = None;
                    state.fields.clear();
                } else {
                    let next = state.step.map_or(0, |s| s + 1);
                    Self::enter_step(&mut state, next);
                }
            }
            Node::Dismiss => {
                state.dismissed += 1;
                state.step = None;
                state.fields.clear();
            }
            Node::LoginSubmit => state.logged_in = true,
            _ => {}
        }
        Ok(())
    }
}

fn first_is(candidates: &[String], selector: &str) -> bool {
    candidates.first().is_some_and(|c| c == selector)
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Element = Node;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.live()?;
        state.visited.push(url.to_string());
        state.open = None;
        state.step = None;
        state.fields.clear();
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.live()?.reloads += 1;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Node>> {
        let state = self.live()?;
        if self.broken.iter().any(|s| s == selector) {
            return Err(Error::Element(format!("invalid selector {}", selector)));
        }
        if self.unmatched.iter().any(|s| s == selector) {
            return Ok(Vec::new());
        }
        let labelled: Vec<Node> = self
            .labelled
            .iter()
            .enumerate()
            .filter(|(_, (s, _))| s == selector)
            .map(|(k, _)| Node::Label(k))
            .collect();
        if !labelled.is_empty() {
            return Ok(labelled);
        }
        let selector = self
            .aliases
            .iter()
            .find(|(from, _)| from == selector)
            .map_or(selector, |(_, to)| to.as_str());
        let sel = &self.selectors;
        let is = |candidates: &Vec<String>| first_is(candidates, selector);

        let nodes = if is(&sel.results_container) {
            let ready = state
                .container_after_reloads
                .is_some_and(|n| state.reloads >= n);
            if ready { vec![Node::Container] } else { Vec::new() }
        } else if is(&sel.listing_item) {
            let ready = state
                .container_after_reloads
                .is_some_and(|n| state.reloads >= n);
            if ready {
                (0..state.listings.len()).map(Node::Listing).collect()
            } else {
                Vec::new()
            }
        } else if is(&sel.apply_button) || is(&sel.apply_trigger) {
            state.open.map(|_| Node::ApplyButton).into_iter().collect()
        } else if selector == sel.continue_button {
            match Self::current_step(&state) {
                Some(step) if !step.submit => vec![Node::Continue],
                _ => Vec::new(),
            }
        } else if selector == sel.submit_button {
            match Self::current_step(&state) {
                Some(step) if step.submit => vec![Node::Submit],
                _ => Vec::new(),
            }
        } else if is(&sel.dismiss) {
            state.step.map(|_| Node::Dismiss).into_iter().collect()
        } else if is(&sel.form_field) {
            (0..state.fields.len()).map(Node::Field).collect()
        } else if selector == sel.login_username {
            vec![Node::LoginUsername]
        } else if selector == sel.login_password {
            vec![Node::LoginPassword]
        } else if selector == sel.login_submit {
            vec![Node::LoginSubmit]
        } else {
            Vec::new()
        };
        Ok(nodes)
    }

    async fn find_within(&self, parent: &Node, selector: &str) -> Result<Option<Node>> {
        let state = self.live()?;
        let title_selector = selector == self.selectors.listing_title_probe
            || self.selectors.listing_title.iter().any(|s| s == selector);
        match parent {
            Node::Listing(i) if title_selector => Ok(state.listings[*i]
                .title
                .as_ref()
                .map(|_| Node::Title(*i))),
            _ => Ok(None),
        }
    }

    async fn is_visible(&self, element: &Node) -> Result<bool> {
        let state = self.live()?;
        Ok(match element {
            Node::Field(j) => state.fields.get(*j).is_some_and(|f| f.visible),
            _ => true,
        })
    }

    async fn is_enabled(&self, element: &Node) -> Result<bool> {
        let state = self.live()?;
        Ok(match element {
            Node::Continue | Node::Submit => Self::current_step(&state).is_some_and(|s| s.enabled),
            _ => true,
        })
    }

    async fn text(&self, element: &Node) -> Result<String> {
        let state = self.live()?;
        let open = state.open.and_then(|i| state.listings.get(i));
        Ok(match element {
            Node::Title(i) => state.listings[*i].title.clone().unwrap_or_default(),
            Node::Label(k) => self.labelled.get(*k).map(|(_, t)| t.clone()).unwrap_or_default(),
            Node::ApplyButton => match open {
                Some(listing) if listing.quick_apply => "Easy Apply".to_string(),
                _ => "Apply".to_string(),
            },
            _ => String::new(),
        })
    }

    async fn attribute(&self, element: &Node, name: &str) -> Result<Option<String>> {
        let state = self.live()?;
        Ok(match element {
            Node::Field(j) => state.fields.get(*j).and_then(|f| match name {
                "type" => f.kind.clone(),
                "aria-label" => f.aria_label.clone(),
                "placeholder" => f.placeholder.clone(),
                "readonly" => f.readonly.then(|| "true".to_string()),
                _ => None,
            }),
            _ => None,
        })
    }

    async fn value(&self, element: &Node) -> Result<String> {
        let state = self.live()?;
        Ok(match element {
            Node::Field(j) => state.fields.get(*j).map(|f| f.value.clone()).unwrap_or_default(),
            _ => String::new(),
        })
    }

    async fn click(&self, element: &Node) -> Result<()> {
        self.press(*element)
    }

    async fn script_click(&self, element: &Node) -> Result<()> {
        self.live()?.scripts += 1;
        self.press(*element)
    }

    async fn scroll_into_view(&self, _element: &Node) -> Result<()> {
        self.live()?;
        Ok(())
    }

    async fn focus(&self, _element: &Node) -> Result<()> {
        self.live()?;
        Ok(())
    }

    async fn type_text(&self, element: &Node, text: &str) -> Result<()> {
        let mut state = self.live()?;
        match element {
            Node::Field(j) => {
                if let Some(field) = state.fields.get_mut(*j) {
                    field.value.push_str(text);
                }
            }
            other => {
                if let Some((node, typed)) = state.credentials.last_mut() {
                    if node == other {
                        typed.push_str(text);
                        return Ok(());
                    }
                }
                state.credentials.push((*other, text.to_string()));
            }
        }
        Ok(())
    }

    async fn execute(&self, _script: &str) -> Result<Value> {
        self.live()?;
        Ok(Value::Null)
    }

    async fn current_page_height(&self) -> Result<i64> {
        self.live()?;
        Ok(1200)
    }

    async fn quit(&mut self) -> Result<()> {
        self.state().quit = true;
        Ok(())
    }
}
