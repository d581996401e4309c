use crate::{Context, Result};
use crate::responder::ResponseGenerator;
use quickapply_core::session::BrowserSession;

/// Input types that take free text
const TEXT_TYPES: &[&str] = &["text", "email", "tel", "url", "number", "search"];

/// Fill every empty, labelled text control on the current form step
///
/// Answers come from `responder`; an empty answer leaves the field as is.
/// Characters are typed one at a time with a short pause between them.
/// Returns how many fields were filled.
pub async fn fill_fields<S, R>(ctx: &Context<'_, S>, responder: &R) -> Result<usize>
where
    S: BrowserSession,
    R: ResponseGenerator + ?Sized,
{
    let mut fields = Vec::new();
    for locator in &ctx.selectors().form_field {
        match ctx.session.find_all(locator).await {
            Ok(found) => fields.extend(found),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => tracing::debug!("Field selector {} failed: {}", locator, e),
        }
    }

    let mut filled = 0;
    for field in &fields {
        match fill_field(ctx, responder, field).await {
            Ok(true) => filled += 1,
            Ok(false) => {}
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => tracing::error!("Error filling field: {}", e),
        }
    }
    Ok(filled)
}

async fn fill_field<S, R>(
    ctx: &Context<'_, S>,
    responder: &R,
    field: &S::Element,
) -> quickapply_core::Result<bool>
where
    S: BrowserSession,
    R: ResponseGenerator + ?Sized,
{
    let session = ctx.session;
    if !session.is_visible(field).await? || session.attribute(field, "readonly").await?.is_some() {
        return Ok(false);
    }
    let kind = session.attribute(field, "type").await?;
    if !is_text_kind(kind.as_deref()) {
        return Ok(false);
    }
    let Some(label) = field_label(session, field).await? else {
        return Ok(false);
    };
    if !session.value(field).await?.is_empty() {
        return Ok(false);
    }

    let answer = responder.generate(&label, "").await;
    if answer.trim().is_empty() {
        tracing::debug!("No answer for '{}', leaving it blank", label);
        return Ok(false);
    }

    session.focus(field).await?;
    for ch in answer.chars() {
        session.type_text(field, &ch.to_string()).await?;
        ctx.pacer.pause(ctx.pacing().keystroke).await;
    }
    ctx.pacer.pause(ctx.pacing().field_settle).await;
    tracing::debug!("Filled field '{}'", label);
    Ok(true)
}

/// Controls without a type attribute (textareas, bare inputs) take text
fn is_text_kind(kind: Option<&str>) -> bool {
    match kind {
        None => true,
        Some(kind) => {
            let kind = kind.trim().to_ascii_lowercase();
            kind.is_empty() || TEXT_TYPES.contains(&kind.as_str())
        }
    }
}

/// The aria-label, else the placeholder
async fn field_label<S: BrowserSession>(
    session: &S,
    field: &S::Element,
) -> quickapply_core::Result<Option<String>> {
    for name in ["aria-label", "placeholder"] {
        if let Some(label) = session.attribute(field, name).await? {
            let label = label.trim();
            if !label.is_empty() {
                return Ok(Some(label.to_string()));
            }
        }
    }
    Ok(None)
}
