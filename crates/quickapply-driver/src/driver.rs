use crate::locate::{self, Scope};
use crate::responder::ResponseGenerator;
use crate::{Context, DriverSettings, Error, ListingState, Result, RunSummary, StopReason};
use crate::{discovery, eligibility, form, login};
use quickapply_core::applicant::ApplicantProfile;
use quickapply_core::budget::SessionBudget;
use quickapply_core::outcome::{Disposition, Outcome, SkipReason};
use quickapply_core::pacing::Pacer;
use quickapply_core::session::BrowserSession;

/// Drives one application run over a browser session
///
/// The driver owns the session and releases it when [`ApplicationDriver::run`]
/// returns, whichever way the run ended.
pub struct ApplicationDriver<S: BrowserSession, R: ResponseGenerator> {
    session: S,
    responder: R,
    profile: ApplicantProfile,
    settings: DriverSettings,
    pacer: Pacer,
    budget: SessionBudget,
    summary: RunSummary,
    skip_login: bool,
}

impl<S: BrowserSession, R: ResponseGenerator> ApplicationDriver<S, R> {
    /// The session clock starts here
    pub fn new(session: S, responder: R, profile: ApplicantProfile, settings: DriverSettings) -> Self {
        let budget = SessionBudget::new(
            settings.limits.daily_application_limit,
            settings.limits.session_limit(),
        );
        Self {
            session,
            responder,
            profile,
            settings,
            pacer: Pacer::new(),
            budget,
            summary: RunSummary::default(),
            skip_login: false,
        }
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Assume the browser profile is already signed in
    pub fn skip_login(mut self, skip: bool) -> Self {
        self.skip_login = skip;
        self
    }

    /// Log in, discover listings and apply until a limit or the listings run out
    ///
    /// Never fails: a fatal error ends the run and is reported through
    /// [`RunSummary::stop_reason`]. The browser session is released before
    /// returning.
    pub async fn run(mut self) -> RunSummary {
        tracing::info!("Starting application run");
        if let Err(e) = self.drive().await {
            tracing::error!("Critical error: {}", e);
            self.summary.stop_reason = StopReason::Fatal(e.to_string());
        }

        tracing::info!(
            "Session summary: applied to {} jobs",
            self.budget.submitted()
        );
        tracing::info!("{}", self.summary);

        if let Err(e) = self.session.quit().await {
            tracing::warn!("Failed to release browser session: {}", e);
        }
        tracing::info!("Shutting down");
        self.summary
    }

    async fn drive(&mut self) -> Result<()> {
        let ctx = Context::new(&self.session, &self.pacer, &self.settings);

        if !self.skip_login {
            login::login(&ctx, self.profile.credentials()).await?;
        }

        let decision = self.budget.gate(&self.pacer, self.settings.cooldown()).await;
        if let Some(reason) = StopReason::from_gate(decision) {
            self.summary.stop_reason = reason;
            return Ok(());
        }

        let listings = discovery::discover_listings(&ctx, self.profile.criteria()).await?;
        self.summary.discovered = listings.len();
        if listings.is_empty() {
            tracing::warn!("No job listings found");
        }

        self.apply_to_listings(&listings).await
    }

    async fn apply_to_listings(&mut self, listings: &[S::Element]) -> Result<()> {
        for (index, listing) in listings.iter().enumerate() {
            let decision = self.budget.gate(&self.pacer, self.settings.cooldown()).await;
            if let Some(reason) = StopReason::from_gate(decision) {
                self.summary.stop_reason = reason;
                return Ok(());
            }

            tracing::info!("Checking job {} of {}", index + 1, listings.len());
            match self.apply_to_listing(listing).await {
                Outcome::Success(()) => {
                    self.summary.submitted += 1;
                    tracing::info!(
                        "Successfully applied ({}/{})",
                        self.budget.submitted(),
                        self.budget.daily_limit()
                    );
                    self.pacer
                        .pause(self.settings.pacing.between_applications)
                        .await;
                }
                Outcome::Skip(reason) => {
                    let disposition = reason.disposition();
                    tracing::info!("Job {} {}: {}", index + 1, ListingState::from(disposition), reason);
                    self.summary.record(disposition);
                    self.pacer.pause(self.settings.pacing.between_listings).await;
                }
                Outcome::Fatal(e) => return Err(e.into()),
            }
        }

        self.summary.stop_reason = StopReason::ListingsExhausted;
        Ok(())
    }

    /// Run the apply flow for one listing
    async fn apply_to_listing(&mut self, listing: &S::Element) -> Outcome<()> {
        let outcome = match self.attempt(listing).await {
            Ok(outcome) => outcome,
            Err(Error::Session(e)) if e.is_fatal() => return Outcome::Fatal(e),
            Err(e) => {
                tracing::error!("Error applying to job: {}", e);
                Outcome::Skip(e.skip_reason())
            }
        };

        if let Outcome::Skip(reason) = &outcome {
            if overlay_may_be_open(reason) {
                if let Err(e) = self.dismiss_overlay().await {
                    if e.is_fatal() {
                        return Outcome::Fatal(e);
                    }
                }
            }
        }
        outcome
    }

    async fn attempt(&mut self, listing: &S::Element) -> Result<Outcome<()>> {
        let ctx = Context::new(&self.session, &self.pacer, &self.settings);
        let pacing = ctx.pacing();
        let mut state = ListingState::Discovered;

        let Some(title) = discovery::listing_title(&ctx, listing).await? else {
            tracing::warn!("Could not find job title element");
            return Ok(Outcome::Skip(SkipReason::TitleNotFound));
        };
        let title_text = ctx.session.text(&title).await.unwrap_or_default();
        tracing::info!("Found job: {}", title_text);

        locate::tolerate(ctx.session.scroll_into_view(&title).await, "Scroll")?;
        ctx.pacer.pause(pacing.scroll_into_view).await;
        locate::click_with_fallback(ctx.session, &title).await?;
        ctx.pacer.pause(pacing.open_settle).await;
        state = advance(state, ListingState::Opened);

        if !eligibility::is_quick_apply(ctx.session, &ctx.selectors().eligibility_chain()).await {
            tracing::info!("Not an Easy Apply job, skipping...");
            return Ok(Outcome::Skip(SkipReason::NotQuickApply));
        }
        state = advance(state, ListingState::EligibilityChecked);

        if !eligibility::click_quick_apply(&ctx).await? {
            tracing::error!("Could not click Easy Apply button");
            return Ok(Outcome::Skip(SkipReason::TriggerNotFound));
        }
        state = advance(state, ListingState::ApplyButtonClicked);

        state = advance(state, ListingState::FormInProgress);
        let steps = form::resolve_form(&ctx, &self.responder).await?;
        tracing::debug!("Form finished after {} steps", steps);

        self.budget.record_submission()?;
        advance(state, ListingState::Submitted);
        Ok(Outcome::Success(()))
    }

    /// Close a half-finished application dialog
    async fn dismiss_overlay(&self) -> quickapply_core::Result<()> {
        let chain = self.settings.selectors.dismiss_chain();
        match locate::first_match(&self.session, Scope::Page, &chain).await? {
            Some(button) => {
                locate::tolerate(
                    locate::click_with_fallback(&self.session, &button).await,
                    "Dismiss",
                )?;
                tracing::debug!("Dismissed application dialog");
            }
            None => tracing::debug!("No application dialog to dismiss"),
        }
        Ok(())
    }
}

/// Whether the failure happened after the application dialog opened
fn overlay_may_be_open(reason: &SkipReason) -> bool {
    reason.disposition() == Disposition::Abandoned && *reason != SkipReason::TriggerNotFound
}

fn advance(from: ListingState, to: ListingState) -> ListingState {
    tracing::trace!("Listing {} -> {}", from, to);
    to
}
