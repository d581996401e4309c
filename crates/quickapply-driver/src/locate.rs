//! Element lookup helpers shared by the driver steps

use quickapply_core::Result;
use quickapply_core::selectors::{ElementPredicate, ElementSnapshot, SelectorChain, SelectorStrategy};
use quickapply_core::session::BrowserSession;
use std::time::Duration;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Where a chain is evaluated
pub enum Scope<'a, E> {
    Page,
    Within(&'a E),
}

/// Gather what the predicate needs to know about `element`
pub async fn snapshot<S: BrowserSession>(
    session: &S,
    element: &S::Element,
    predicate: &ElementPredicate,
) -> Result<ElementSnapshot> {
    if matches!(predicate, ElementPredicate::Present) {
        return Ok(ElementSnapshot::default());
    }

    let visible = session.is_visible(element).await?;
    if !visible || !predicate.needs_label() {
        return Ok(ElementSnapshot {
            visible,
            ..ElementSnapshot::default()
        });
    }

    Ok(ElementSnapshot {
        visible,
        text: session.text(element).await?,
        aria_label: session.attribute(element, "aria-label").await?,
    })
}

async fn candidates<S: BrowserSession>(
    session: &S,
    scope: &Scope<'_, S::Element>,
    locator: &str,
) -> Result<Vec<S::Element>> {
    match scope {
        Scope::Page => session.find_all(locator).await,
        Scope::Within(parent) => Ok(session.find_within(parent, locator).await?.into_iter().collect()),
    }
}

/// Every element one strategy accepts, in document order
pub async fn accepted<S: BrowserSession>(
    session: &S,
    scope: &Scope<'_, S::Element>,
    strategy: &SelectorStrategy,
) -> Result<Vec<S::Element>> {
    let mut matched = Vec::new();
    for element in candidates(session, scope, &strategy.locator).await? {
        let snapshot = snapshot(session, &element, &strategy.predicate).await?;
        if strategy.predicate.accepts(&snapshot) {
            matched.push(element);
        }
    }
    Ok(matched)
}

/// First element accepted by the chain
///
/// A strategy that errors falls through to the next one; only fatal
/// errors are returned.
pub async fn first_match<S: BrowserSession>(
    session: &S,
    scope: Scope<'_, S::Element>,
    chain: &SelectorChain,
) -> Result<Option<S::Element>> {
    for strategy in chain.strategies() {
        match accepted(session, &scope, strategy).await {
            Ok(found) => {
                if let Some(element) = found.into_iter().next() {
                    tracing::debug!("Matched selector: {}", strategy.locator);
                    return Ok(Some(element));
                }
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => tracing::debug!("Selector {} failed: {}", strategy.locator, e),
        }
    }
    Ok(None)
}

/// Poll for an element until it appears or `timeout` runs out
pub async fn wait_for<S: BrowserSession>(
    session: &S,
    selector: &str,
    timeout: Duration,
) -> Result<Option<S::Element>> {
    let deadline = Instant::now() + timeout;
    loop {
        match session.find(selector).await {
            Ok(Some(element)) => return Ok(Some(element)),
            Ok(None) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => tracing::debug!("Lookup of {} failed: {}", selector, e),
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Native click, falling back to a scripted click when it is intercepted
pub async fn click_with_fallback<S: BrowserSession>(session: &S, element: &S::Element) -> Result<()> {
    match session.click(element).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::debug!("Direct click failed ({}), using scripted click", e);
            session.script_click(element).await
        }
    }
}

/// Swallow a non-fatal error after logging it
pub fn tolerate(result: Result<()>, what: &str) -> Result<()> {
    match result {
        Err(e) if !e.is_fatal() => {
            tracing::debug!("{} failed: {}", what, e);
            Ok(())
        }
        other => other,
    }
}
