use crate::locate;
use crate::{Context, Error, Result};
use quickapply_core::applicant::Credentials;
use quickapply_core::session::BrowserSession;

/// Sign in through the site's login form
pub async fn login<S: BrowserSession>(ctx: &Context<'_, S>, credentials: &Credentials) -> Result<()> {
    tracing::info!("Attempting to log in");
    let url = ctx.settings.search.login_url()?;
    ctx.session.navigate(url.as_str()).await?;

    let selectors = ctx.selectors();
    let username = locate::wait_for(ctx.session, &selectors.login_username, ctx.limits().login_wait())
        .await?
        .ok_or_else(|| missing(&selectors.login_username))?;
    ctx.session.focus(&username).await?;
    ctx.session.type_text(&username, &credentials.email).await?;
    tracing::debug!("Email entered");

    let password = ctx
        .session
        .find(&selectors.login_password)
        .await?
        .ok_or_else(|| missing(&selectors.login_password))?;
    ctx.session.focus(&password).await?;
    ctx.session.type_text(&password, &credentials.password).await?;
    tracing::debug!("Password entered");

    let submit = ctx
        .session
        .find(&selectors.login_submit)
        .await?
        .ok_or_else(|| missing(&selectors.login_submit))?;
    locate::click_with_fallback(ctx.session, &submit).await?;
    tracing::info!("Login form submitted");

    ctx.pacer.pause(ctx.pacing().login_settle).await;
    tracing::info!("Login completed");
    Ok(())
}

fn missing(selector: &str) -> Error {
    Error::Login(format!("no element matches {}", selector))
}
