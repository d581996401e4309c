//! Search navigation and listing discovery

use crate::Context;
use crate::locate::{self, Scope};
use quickapply_core::Result;
use quickapply_core::applicant::SearchCriteria;
use quickapply_core::session::BrowserSession;

/// Open the filtered search page and collect the listing cards on it
///
/// Returns an empty list when the results never load or no listing
/// selector yields verifiable items. Only fatal session errors are
/// returned as errors.
pub async fn discover_listings<S: BrowserSession>(
    ctx: &Context<'_, S>,
    criteria: &SearchCriteria,
) -> Result<Vec<S::Element>> {
    let url = ctx.settings.search.search_url(criteria)?;
    tracing::info!(
        "Searching jobs for: {} in {}",
        criteria.job_title,
        criteria.location
    );

    locate::tolerate(ctx.session.navigate(url.as_str()).await, "Navigation")?;
    ctx.pacer.pause(ctx.pacing().search_settle).await;

    if !wait_for_results(ctx).await? {
        tracing::error!(
            "Failed to load job listings after {} attempts",
            ctx.limits().discovery_retries
        );
        return Ok(Vec::new());
    }

    collect_listings(ctx).await
}

/// Wait for a visible results container, scrolling and reloading between attempts
async fn wait_for_results<S: BrowserSession>(ctx: &Context<'_, S>) -> Result<bool> {
    let attempts = ctx.limits().discovery_retries;
    let chain = ctx.selectors().container_chain();

    for attempt in 1..=attempts {
        tracing::info!("Waiting for job listings to load (attempt {})...", attempt);

        for strategy in chain.strategies() {
            let Some(container) =
                locate::wait_for(ctx.session, &strategy.locator, ctx.limits().container_wait())
                    .await?
            else {
                continue;
            };
            match ctx.session.is_visible(&container).await {
                Ok(true) => {
                    tracing::info!("Found job listings container: {}", strategy.locator);
                    return Ok(true);
                }
                Ok(false) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => tracing::debug!("Visibility check failed: {}", e),
            }
        }

        tracing::info!("Scrolling page to trigger job loading...");
        natural_scroll(ctx).await?;
        ctx.pacer.pause(ctx.pacing().lazy_load).await;

        if attempt < attempts {
            tracing::warn!("Job listings not found, refreshing page...");
            locate::tolerate(ctx.session.reload().await, "Reload")?;
            ctx.pacer.pause(ctx.pacing().reload_settle).await;
        }
    }

    Ok(false)
}

async fn collect_listings<S: BrowserSession>(ctx: &Context<'_, S>) -> Result<Vec<S::Element>> {
    for locator in &ctx.selectors().listing_item {
        let items = match ctx.session.find_all(locator).await {
            Ok(items) => items,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::debug!("Listing selector {} failed: {}", locator, e);
                continue;
            }
        };
        if items.is_empty() {
            continue;
        }

        tracing::info!("Found {} jobs using selector: {}", items.len(), locator);
        match verify_items(ctx, &items).await {
            Ok(()) => return Ok(items),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => tracing::error!("Error verifying jobs: {}", e),
        }
    }

    tracing::error!("No valid jobs found with any selector");
    Ok(Vec::new())
}

/// The first few cards must scroll into view and carry a readable title
async fn verify_items<S: BrowserSession>(ctx: &Context<'_, S>, items: &[S::Element]) -> Result<()> {
    let probe = &ctx.selectors().listing_title_probe;
    for (index, item) in items.iter().take(ctx.limits().verify_items).enumerate() {
        ctx.session.scroll_into_view(item).await?;
        ctx.pacer.pause(ctx.pacing().scroll_into_view).await;

        let title = ctx.session.find_within(item, probe).await?.ok_or_else(|| {
            quickapply_core::Error::Element(format!("job {} has no title matching {}", index + 1, probe))
        })?;
        let text = ctx.session.text(&title).await?;
        tracing::info!("Verified job {}: {}", index + 1, text);
    }
    Ok(())
}

/// Scroll down the page in small uneven steps, then back to the top
pub async fn natural_scroll<S: BrowserSession>(ctx: &Context<'_, S>) -> Result<()> {
    let height = match ctx.session.current_page_height().await {
        Ok(height) => height,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            tracing::debug!("Could not read page height: {}", e);
            return Ok(());
        }
    };

    let mut position = 0;
    while position < height {
        position = (position + ctx.pacer.draw_between(100, 400)).min(height);
        let script = format!("window.scrollTo(0, {});", position);
        locate::tolerate(ctx.session.execute(&script).await.map(|_| ()), "Scroll")?;
        ctx.pacer.pause(ctx.pacing().scroll_step).await;
    }

    locate::tolerate(
        ctx.session.execute("window.scrollTo(0, 0);").await.map(|_| ()),
        "Scroll",
    )
}

/// Find the title link inside a listing card
pub(crate) async fn listing_title<S: BrowserSession>(
    ctx: &Context<'_, S>,
    listing: &S::Element,
) -> Result<Option<S::Element>> {
    locate::first_match(ctx.session, Scope::Within(listing), &ctx.selectors().title_chain()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverSettings;
    use crate::testing::{FakeListing, FakeSession, Node};
    use quickapply_core::pacing::{PacingConfig, Pacer};
    use quickapply_core::selectors::SiteSelectors;

    fn settings() -> DriverSettings {
        DriverSettings {
            pacing: PacingConfig::immediate(),
            ..DriverSettings::default()
        }
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            job_title: "Rust Engineer".to_string(),
            location: "Remote".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovers_listings_on_first_attempt() {
        let session = FakeSession::new(vec![FakeListing::quick("A"), FakeListing::quick("B")]);
        let settings = settings();
        let pacer = Pacer::seeded(7);
        let ctx = Context::new(&session, &pacer, &settings);

        let listings = discover_listings(&ctx, &criteria()).await.unwrap();

        assert_eq!(listings, vec![Node::Listing(0), Node::Listing(1)]);
        let state = session.state();
        assert_eq!(state.reloads, 0);
        assert!(state.visited[0].contains("keywords=Rust+Engineer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reloads_until_container_appears() {
        let session =
            FakeSession::new(vec![FakeListing::quick("A")]).container_after_reloads(Some(2));
        let settings = settings();
        let pacer = Pacer::seeded(7);
        let ctx = Context::new(&session, &pacer, &settings);

        let listings = discover_listings(&ctx, &criteria()).await.unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(session.state().reloads, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_retries() {
        let session = FakeSession::new(vec![FakeListing::quick("A")]).container_after_reloads(None);
        let settings = settings();
        let pacer = Pacer::seeded(7);
        let ctx = Context::new(&session, &pacer, &settings);

        let listings = discover_listings(&ctx, &criteria()).await.unwrap();

        assert!(listings.is_empty());
        // no reload after the last attempt
        assert_eq!(
            session.state().reloads,
            settings.limits.discovery_retries as usize - 1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_later_selectors() {
        let defaults = SiteSelectors::default();
        let containers = &defaults.results_container;
        let items = &defaults.listing_item;
        let session = FakeSession::new(vec![FakeListing::quick("A"), FakeListing::quick("B")])
            .unmatched(&containers[0])
            .answer_as(&containers[1], &containers[0])
            .unmatched(&items[0])
            .broken(&items[1])
            .answer_as(&items[2], &items[0]);
        let settings = settings();
        let pacer = Pacer::seeded(7);
        let ctx = Context::new(&session, &pacer, &settings);

        let listings = discover_listings(&ctx, &criteria()).await.unwrap();

        assert_eq!(listings, vec![Node::Listing(0), Node::Listing(1)]);
        assert_eq!(session.state().reloads, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unverifiable_listings_are_rejected() {
        let session = FakeSession::new(vec![FakeListing::untitled(), FakeListing::quick("B")]);
        let settings = settings();
        let pacer = Pacer::seeded(7);
        let ctx = Context::new(&session, &pacer, &settings);

        let listings = discover_listings(&ctx, &criteria()).await.unwrap();
        assert!(listings.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_natural_scroll_reaches_bottom() {
        let session = FakeSession::new(Vec::new());
        let settings = settings();
        let pacer = Pacer::seeded(7);
        let ctx = Context::new(&session, &pacer, &settings);

        natural_scroll(&ctx).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_is_reported() {
        let session = FakeSession::new(vec![FakeListing::quick("A")]);
        session.state().disconnected = true;
        let settings = settings();
        let pacer = Pacer::seeded(7);
        let ctx = Context::new(&session, &pacer, &settings);

        let err = discover_listings(&ctx, &criteria()).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
