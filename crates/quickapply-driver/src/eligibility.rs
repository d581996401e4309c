use crate::Context;
use crate::locate::{self, Scope};
use quickapply_core::Result;
use quickapply_core::selectors::SelectorChain;
use quickapply_core::session::BrowserSession;

/// Whether the open listing offers quick apply
///
/// Read-only: repeated calls on the same page agree. Lookup failures count
/// as "no".
pub async fn is_quick_apply<S: BrowserSession>(session: &S, chain: &SelectorChain) -> bool {
    match locate::first_match(session, Scope::Page, chain).await {
        Ok(Some(_)) => true,
        Ok(None) => false,
        Err(e) => {
            tracing::error!("Error checking Easy Apply button: {}", e);
            false
        }
    }
}

/// Click the quick-apply trigger of the open listing
///
/// Each strategy is tried in order; a match that cannot be clicked moves on
/// to the next strategy. Returns `false` when nothing was clicked.
pub async fn click_quick_apply<S: BrowserSession>(ctx: &Context<'_, S>) -> Result<bool> {
    let chain = ctx.selectors().trigger_chain();
    for strategy in chain.strategies() {
        let matched = match locate::accepted(ctx.session, &Scope::Page, strategy).await {
            Ok(matched) => matched,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::debug!("Trigger selector {} failed: {}", strategy.locator, e);
                continue;
            }
        };
        let Some(trigger) = matched.into_iter().next() else {
            continue;
        };

        tracing::info!("Found Easy Apply button: {}", strategy.locator);
        locate::tolerate(ctx.session.scroll_into_view(&trigger).await, "Scroll")?;
        ctx.pacer.pause(ctx.pacing().scroll_into_view).await;

        match locate::click_with_fallback(ctx.session, &trigger).await {
            Ok(()) => {
                tracing::info!("Clicked Easy Apply button");
                ctx.pacer.pause(ctx.pacing().apply_settle).await;
                return Ok(true);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::debug!("Failed to click button with selector {}: {}", strategy.locator, e)
            }
        }
    }
    Ok(false)
}
