use crate::Result;
use async_trait::async_trait;

/// A single automated browser tab the driver steers
///
/// Element handles are only valid for the page they were found on; any
/// navigation invalidates them.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn reload(&self) -> Result<()>;

    /// First element matching the selector, if any
    async fn find(&self, selector: &str) -> Result<Option<Self::Element>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// All elements matching the selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// First descendant of `parent` matching the selector
    async fn find_within(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    /// Rendered text of the element
    async fn text(&self, element: &Self::Element) -> Result<String>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Current value of a form control
    async fn value(&self, element: &Self::Element) -> Result<String>;

    /// Native click
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Click dispatched from page script, for elements covered by overlays
    async fn script_click(&self, element: &Self::Element) -> Result<()>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    async fn focus(&self, element: &Self::Element) -> Result<()>;

    /// Type text into the focused element
    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Evaluate a script in the page and return its JSON value
    async fn execute(&self, script: &str) -> Result<serde_json::Value>;

    async fn current_page_height(&self) -> Result<i64>;

    /// Release the browser; further calls are errors
    async fn quit(&mut self) -> Result<()>;
}
