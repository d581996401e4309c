use crate::{ChromeFinder, ChromeLauncher, ProfileManager, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use quickapply_core::config::BrowserOptions;
use quickapply_core::session::BrowserSession;
use serde_json::Value;
use std::process::Child;
use std::time::Duration;
use tokio::task::JoinHandle;

const CONNECT_ATTEMPTS: u32 = 5;

const IS_VISIBLE_JS: &str = "function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}";
const IS_ENABLED_JS: &str = "function() { return !this.disabled; }";
const TEXT_JS: &str = "function() { return (this.innerText || this.textContent || '').trim(); }";
const VALUE_JS: &str = "function() { return this.value == null ? '' : String(this.value); }";
const CLICK_JS: &str = "function() { this.click(); return true; }";
const SCROLL_JS: &str =
    "function() { this.scrollIntoView({behavior: 'smooth', block: 'center'}); return true; }";

/// A browser tab driven over the Chrome DevTools Protocol
pub struct CdpSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    chrome: Option<Child>,
    profile: Option<ProfileManager>,
    closed: bool,
}

impl CdpSession {
    /// Find, launch and connect to a browser as configured
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_binary = ChromeFinder::new(options.chrome_path.clone()).find()?;
        tracing::info!("Using browser at {}", chrome_binary.display());

        let profile = ProfileManager::for_run(options.profile.as_deref())?;
        if profile.is_temporary() {
            tracing::info!("Using temporary profile");
        } else {
            tracing::info!("Using profile: {}", profile.path().display());
        }

        let launcher = ChromeLauncher::new(
            chrome_binary,
            profile.path().to_path_buf(),
            options.debugging_port,
        )
        .headless(options.headless)
        .random_user_agent(&options.user_agents);

        let mut child = launcher.launch()?;
        match Self::connect(launcher.debugging_port()).await {
            Ok(mut session) => {
                session.chrome = Some(child);
                session.profile = Some(profile);
                Ok(session)
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e)
            }
        }
    }

    /// Attach to a browser already listening on `debugging_port`
    pub async fn connect(debugging_port: u16) -> Result<Self> {
        // Chrome may not be accepting connections yet
        let ws_url = format!("http://localhost:{}", debugging_port);
        let (browser, mut handler) = {
            let mut retries = CONNECT_ATTEMPTS;
            loop {
                tracing::debug!("Attempting CDP connection to {}...", ws_url);
                match Browser::connect(&ws_url).await {
                    Ok(result) => {
                        tracing::info!("CDP connection established");
                        break result;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(crate::Error::Cdp(format!(
                                "Failed to connect to Chrome after {} attempts: {}",
                                CONNECT_ATTEMPTS, e
                            )));
                        }
                        tracing::debug!(
                            "CDP connection attempt failed, retrying... ({} left)",
                            retries
                        );
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        };

        // The handler must be polled for any command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        tokio::time::sleep(Duration::from_millis(500)).await;

        let page = match browser.pages().await?.into_iter().next() {
            Some(page) => page,
            None => browser.new_page("about:blank").await?,
        };

        Ok(Self {
            browser,
            page,
            handler_task,
            chrome: None,
            profile: None,
            closed: false,
        })
    }

    async fn call(&self, element: &Element, function: &str) -> quickapply_core::Result<Value> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(classify)?;
        if let Some(exception) = returns.exception_details {
            return Err(quickapply_core::Error::Script(exception.text));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }

    fn kill_process(&mut self) {
        if let Some(mut child) = self.chrome.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Map protocol errors onto the session error taxonomy
fn classify(err: CdpError) -> quickapply_core::Error {
    use quickapply_core::Error;
    match &err {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            Error::Disconnected(err.to_string())
        }
        CdpError::JavascriptException(_) => Error::Script(err.to_string()),
        _ => Error::Element(err.to_string()),
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> quickapply_core::Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| match classify(e) {
                quickapply_core::Error::Element(msg) => quickapply_core::Error::Navigation(msg),
                other => other,
            })?;
        Ok(())
    }

    async fn reload(&self) -> quickapply_core::Result<()> {
        self.page.reload().await.map_err(classify)?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> quickapply_core::Result<Vec<Element>> {
        self.page.find_elements(selector).await.map_err(classify)
    }

    async fn find_within(
        &self,
        parent: &Element,
        selector: &str,
    ) -> quickapply_core::Result<Option<Element>> {
        let found = parent.find_elements(selector).await.map_err(classify)?;
        Ok(found.into_iter().next())
    }

    async fn is_visible(&self, element: &Element) -> quickapply_core::Result<bool> {
        Ok(self.call(element, IS_VISIBLE_JS).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &Element) -> quickapply_core::Result<bool> {
        Ok(self.call(element, IS_ENABLED_JS).await?.as_bool().unwrap_or(false))
    }

    async fn text(&self, element: &Element) -> quickapply_core::Result<String> {
        Ok(self
            .call(element, TEXT_JS)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> quickapply_core::Result<Option<String>> {
        element.attribute(name).await.map_err(classify)
    }

    async fn value(&self, element: &Element) -> quickapply_core::Result<String> {
        Ok(self
            .call(element, VALUE_JS)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn click(&self, element: &Element) -> quickapply_core::Result<()> {
        element.click().await.map_err(classify)?;
        Ok(())
    }

    async fn script_click(&self, element: &Element) -> quickapply_core::Result<()> {
        self.call(element, CLICK_JS).await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> quickapply_core::Result<()> {
        self.call(element, SCROLL_JS).await?;
        Ok(())
    }

    async fn focus(&self, element: &Element) -> quickapply_core::Result<()> {
        element.focus().await.map_err(classify)?;
        Ok(())
    }

    async fn type_text(&self, element: &Element, text: &str) -> quickapply_core::Result<()> {
        element.type_str(text).await.map_err(classify)?;
        Ok(())
    }

    async fn execute(&self, script: &str) -> quickapply_core::Result<Value> {
        let result = self.page.evaluate(script).await.map_err(classify)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn current_page_height(&self) -> quickapply_core::Result<i64> {
        let height = self.execute("document.body.scrollHeight").await?;
        Ok(height.as_i64().unwrap_or(0))
    }

    async fn quit(&mut self) -> quickapply_core::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close command failed: {}", e);
        }
        self.kill_process();
        self.handler_task.abort();
        // dropping the profile removes a temporary user-data directory
        self.profile.take();
        tracing::info!("Browser session released");
        Ok(())
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        if !self.closed {
            self.kill_process();
            self.handler_task.abort();
        }
    }
}
