//! The seam between page objects and the browser.
//!
//! Page objects only ever talk to a [`Driver`]. [`EokaDriver`] is the bundled
//! implementation over an `eoka::Page`; anything else that can query and poke
//! a live DOM can stand in for it.

mod cdp;
#[cfg(test)]
pub(crate) mod mock;

pub use cdp::EokaDriver;

use crate::locators::Locator;
use crate::Result;
use std::fmt;

/// Opaque reference to one live DOM node.
///
/// The token only means something to the driver that produced it. Once the
/// node leaves the page every operation on it fails with
/// [`Error::StaleElement`](crate::Error::StaleElement).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    id: String,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.id)
    }
}

/// Element queries and interactions against one UI session.
///
/// Calls are issued one at a time; implementations need not be `Sync`.
#[allow(async_fn_in_trait)]
pub trait Driver {
    /// All elements matching `locator`, in document order. With a scope only
    /// descendants of that element are searched.
    async fn find_all(&self, scope: Option<&Element>, locator: &Locator) -> Result<Vec<Element>>;

    /// Rendered text, trimmed.
    async fn text(&self, element: &Element) -> Result<String>;

    /// Attribute value, `None` when the attribute is absent.
    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>>;

    /// Whether the element takes up space and is not hidden by style.
    async fn is_displayed(&self, element: &Element) -> Result<bool>;

    async fn click(&self, element: &Element) -> Result<()>;

    async fn focus(&self, element: &Element) -> Result<()>;

    /// Replace the value of an input or textarea.
    async fn set_value(&self, element: &Element, value: &str) -> Result<()>;

    /// Current value of an input or textarea.
    async fn value(&self, element: &Element) -> Result<String>;

    /// Press a key in the focused element (e.g. "Enter", "Escape", "PageDown").
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Visible option labels of a native `<select>`.
    async fn options(&self, element: &Element) -> Result<Vec<String>>;

    /// Label of the selected option of a native `<select>`.
    async fn selected_option(&self, element: &Element) -> Result<Option<String>>;

    /// Choose an option of a native `<select>` by label. `Ok(false)` when no
    /// option carries that label.
    async fn select_option(&self, element: &Element, label: &str) -> Result<bool>;

    /// Sleep between polls.
    async fn pause(&self, ms: u64);
}
