use crate::fields::fill_fields;
use crate::locate;
use crate::responder::ResponseGenerator;
use crate::{Context, Error, Result};
use quickapply_core::session::BrowserSession;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Submit,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Continue => f.write_str("continue"),
            Control::Submit => f.write_str("submit"),
        }
    }
}

/// Walk the multi-step application form to the end
///
/// Each step fills the visible fields, then clicks "continue" or "submit".
/// The form is done once neither control shows up. A disabled control
/// means a required answer is missing and yields [`Error::FormStuck`]; a
/// form that is still asking for more after `max_form_steps` steps yields
/// [`Error::StepLimitExceeded`]. Returns the number of steps completed.
pub async fn resolve_form<S, R>(ctx: &Context<'_, S>, responder: &R) -> Result<usize>
where
    S: BrowserSession,
    R: ResponseGenerator + ?Sized,
{
    let limit = ctx.limits().max_form_steps;
    let mut step = 0;

    loop {
        ctx.pacer.pause(ctx.pacing().form_step).await;

        let Some((control, button)) = next_control(ctx).await? else {
            tracing::debug!("No more form steps after {}", step);
            return Ok(step);
        };
        if step >= limit {
            return Err(Error::StepLimitExceeded { limit });
        }
        step += 1;

        let filled = fill_fields(ctx, responder).await?;
        tracing::debug!("Form step {}: filled {} fields", step, filled);

        if !ctx.session.is_enabled(&button).await? {
            tracing::warn!("Form step {}: {} button is disabled", step, control);
            return Err(Error::FormStuck { step });
        }
        ctx.session.click(&button).await?;
        tracing::debug!("Form step {}: clicked {}", step, control);
        ctx.pacer.pause(ctx.pacing().form_advance).await;
    }
}

/// The continue button, else the submit button
async fn next_control<S: BrowserSession>(
    ctx: &Context<'_, S>,
) -> Result<Option<(Control, S::Element)>> {
    let wait = ctx.limits().form_control_wait();
    let selectors = ctx.selectors();
    if let Some(button) = locate::wait_for(ctx.session, &selectors.continue_button, wait).await? {
        return Ok(Some((Control::Continue, button)));
    }
    Ok(locate::wait_for(ctx.session, &selectors.submit_button, wait)
        .await?
        .map(|button| (Control::Submit, button)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverSettings;
    use crate::testing::{FakeField, FakeListing, FakeSession, FakeStep, Node};
    use async_trait::async_trait;
    use quickapply_core::pacing::{PacingConfig, Pacer};

    struct Fixed;

    #[async_trait]
    impl ResponseGenerator for Fixed {
        async fn generate(&self, _question: &str, _context: &str) -> String {
            "yes".to_string()
        }
    }

    async fn opened(listing: FakeListing) -> FakeSession {
        let session = FakeSession::new(vec![listing]);
        session.click(&Node::Title(0)).await.unwrap();
        session.click(&Node::ApplyButton).await.unwrap();
        session
    }

    fn settings() -> DriverSettings {
        DriverSettings {
            pacing: PacingConfig::immediate(),
            ..DriverSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_walks_steps_to_submission() {
        let session = opened(FakeListing::quick("Rust Dev").steps(vec![
            FakeStep::next(vec![FakeField::text("Phone")]),
            FakeStep::next(Vec::new()),
            FakeStep::submit(vec![FakeField::text("Why us?")]),
        ]))
        .await;
        let settings = settings();
        let pacer = Pacer::seeded(9);
        let ctx = Context::new(&session, &pacer, &settings);

        let steps = resolve_form(&ctx, &Fixed).await.unwrap();

        assert_eq!(steps, 3);
        assert_eq!(session.state().submitted, vec!["Rust Dev".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_control_is_stuck() {
        let session = opened(FakeListing::quick("A").steps(vec![
            FakeStep::next(Vec::new()),
            FakeStep::next(vec![FakeField::text("Required")]).disabled(),
        ]))
        .await;
        let settings = settings();
        let pacer = Pacer::seeded(9);
        let ctx = Context::new(&session, &pacer, &settings);

        let err = resolve_form(&ctx, &Fixed).await.unwrap_err();
        assert!(matches!(err, Error::FormStuck { step: 2 }));
        assert!(session.state().submitted.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_endless_form_hits_step_limit() {
        let session = opened(
            FakeListing::quick("A")
                .steps(vec![FakeStep::next(Vec::new())])
                .endless(),
        )
        .await;
        let mut settings = settings();
        settings.limits.max_form_steps = 4;
        let pacer = Pacer::seeded(9);
        let ctx = Context::new(&session, &pacer, &settings);

        let err = resolve_form(&ctx, &Fixed).await.unwrap_err();
        assert!(matches!(err, Error::StepLimitExceeded { limit: 4 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_form_with_exactly_limit_steps_completes() {
        let session = opened(FakeListing::quick("A").steps(vec![
            FakeStep::next(Vec::new()),
            FakeStep::submit(Vec::new()),
        ]))
        .await;
        let mut settings = settings();
        settings.limits.max_form_steps = 2;
        let pacer = Pacer::seeded(9);
        let ctx = Context::new(&session, &pacer, &settings);

        assert_eq!(resolve_form(&ctx, &Fixed).await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_controls_means_done() {
        let session = opened(FakeListing::quick("A").steps(Vec::new())).await;
        let settings = settings();
        let pacer = Pacer::seeded(9);
        let ctx = Context::new(&session, &pacer, &settings);

        assert_eq!(resolve_form(&ctx, &Fixed).await.unwrap(), 0);
    }
}
