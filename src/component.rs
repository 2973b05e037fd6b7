//! Shared plumbing for page objects: one live root element plus the locator
//! section that names its parts.

use std::fmt;

use tracing::debug;

use crate::driver::{Driver, Element};
use crate::locators::{Locator, Locators};
use crate::{Error, Result};

/// Default wait timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval while waiting.
pub const DEFAULT_POLL_MS: u64 = 100;

/// Bounded polling settings for `wait` constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout_ms: u64,
    pub poll_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_ms: DEFAULT_POLL_MS,
        }
    }
}

impl WaitOptions {
    pub fn timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }
}

/// A page object's root element, its driver and its locator section.
pub struct Component<'a, D> {
    driver: &'a D,
    locators: &'a Locators,
    section: &'static str,
    root: Element,
}

impl<D> Clone for Component<'_, D> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver,
            locators: self.locators,
            section: self.section,
            root: self.root.clone(),
        }
    }
}

impl<D> fmt::Debug for Component<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("section", &self.section)
            .field("root", &self.root)
            .finish()
    }
}

impl<D> Component<'_, D> {
    pub fn root(&self) -> &Element {
        &self.root
    }
}

impl<'a, D: Driver> Component<'a, D> {
    pub fn new(driver: &'a D, locators: &'a Locators, section: &'static str, root: Element) -> Self {
        Self {
            driver,
            locators,
            section,
            root,
        }
    }

    /// Same driver and table, another section rooted at `root`.
    pub fn child(&self, section: &'static str, root: Element) -> Component<'a, D> {
        Component::new(self.driver, self.locators, section, root)
    }

    pub fn driver(&self) -> &'a D {
        self.driver
    }

    pub fn locators(&self) -> &'a Locators {
        self.locators
    }

    pub fn section(&self) -> &'static str {
        self.section
    }

    pub fn locator(&self, name: &str) -> Result<&'a Locator> {
        self.locators.get(self.section, name)
    }

    /// All parts called `name` below the root.
    pub async fn find_all(&self, name: &str) -> Result<Vec<Element>> {
        let locator = self.locator(name)?;
        self.driver.find_all(Some(&self.root), locator).await
    }

    /// First part called `name`, or `None`.
    pub async fn try_find(&self, name: &str) -> Result<Option<Element>> {
        Ok(self.find_all(name).await?.into_iter().next())
    }

    /// First part called `name`; `ElementNotFound` when missing.
    pub async fn find(&self, name: &str) -> Result<Element> {
        self.try_find(name).await?.ok_or_else(|| {
            let locator = self
                .locator(name)
                .map(|l| l.to_string())
                .unwrap_or_default();
            Error::ElementNotFound(format!("{}.{} ({})", self.section, name, locator))
        })
    }

    /// Text of the part called `name`; `ElementNotFound` when missing.
    pub async fn text_of(&self, name: &str) -> Result<String> {
        let el = self.find(name).await?;
        self.driver.text(&el).await
    }

    /// Text of the part called `name`, or `None`.
    pub async fn try_text_of(&self, name: &str) -> Result<Option<String>> {
        match self.try_find(name).await? {
            Some(el) => Ok(Some(self.driver.text(&el).await?)),
            None => Ok(None),
        }
    }

    /// Click the part called `name`.
    pub async fn click(&self, name: &str) -> Result<()> {
        let el = self.find(name).await?;
        debug!("click {}.{}", self.section, name);
        self.driver.click(&el).await
    }

    /// Attribute of the root element.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.driver.attribute(&self.root, name).await
    }

    /// Text of the root element.
    pub async fn text(&self) -> Result<String> {
        self.driver.text(&self.root).await
    }

    pub async fn is_displayed(&self) -> Result<bool> {
        self.driver.is_displayed(&self.root).await
    }

    /// Whether `element` carries `class` in its class list.
    pub async fn has_class(&self, element: &Element, class: &str) -> Result<bool> {
        let classes = self.driver.attribute(element, "class").await?;
        Ok(classes.is_some_and(|c| c.split_whitespace().any(|c| c == class)))
    }

    /// Parts called `name` wrapped as buttons.
    pub async fn buttons(&self, name: &str) -> Result<Vec<Button<'a, D>>> {
        Ok(self
            .find_all(name)
            .await?
            .into_iter()
            .map(|el| Button::new(self.driver, el))
            .collect())
    }

    /// The part called `name` whose label matches `label`.
    pub async fn button(&self, name: &str, label: &str) -> Result<Option<Button<'a, D>>> {
        for button in self.buttons(name).await? {
            if button.matches(label).await? {
                return Ok(Some(button));
            }
        }
        Ok(None)
    }
}

/// First document-level element matching `section.name`.
pub async fn locate<D: Driver>(
    driver: &D,
    locators: &Locators,
    section: &str,
    name: &str,
) -> Result<Option<Element>> {
    let locator = locators.get(section, name)?;
    Ok(driver.find_all(None, locator).await?.into_iter().next())
}

/// First document-level element matching `section.name` that is displayed.
pub async fn locate_displayed<D: Driver>(
    driver: &D,
    locators: &Locators,
    section: &str,
    name: &str,
) -> Result<Option<Element>> {
    let locator = locators.get(section, name)?;
    for el in driver.find_all(None, locator).await? {
        if driver.is_displayed(&el).await? {
            return Ok(Some(el));
        }
    }
    Ok(None)
}

/// Poll until a displayed `section.name` element exists.
pub async fn wait_displayed<D: Driver>(
    driver: &D,
    locators: &Locators,
    section: &str,
    name: &str,
    opts: WaitOptions,
) -> Result<Element> {
    let mut waited = 0;
    loop {
        if let Some(el) = locate_displayed(driver, locators, section, name).await? {
            return Ok(el);
        }
        if waited >= opts.timeout_ms {
            return Err(Error::Timeout(format!(
                "{}.{} not displayed after {}ms",
                section, name, opts.timeout_ms
            )));
        }
        driver.pause(opts.poll_ms).await;
        waited += opts.poll_ms.max(1);
    }
}

/// A clickable element identified by its label: dialog buttons, notification
/// actions, toolbar actions.
pub struct Button<'a, D> {
    driver: &'a D,
    element: Element,
}

impl<D> fmt::Debug for Button<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("element", &self.element)
            .finish()
    }
}

impl<'a, D: Driver> Button<'a, D> {
    pub fn new(driver: &'a D, element: Element) -> Self {
        Self { driver, element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Visible text, falling back to `aria-label` and then `title` for icon
    /// buttons.
    pub async fn label(&self) -> Result<String> {
        let text = self.driver.text(&self.element).await?;
        if !text.is_empty() {
            return Ok(text);
        }
        for attr in ["aria-label", "title"] {
            if let Some(v) = self.driver.attribute(&self.element, attr).await? {
                if !v.is_empty() {
                    return Ok(v);
                }
            }
        }
        Ok(String::new())
    }

    /// The `title` attribute, usually the tooltip with a keybinding.
    pub async fn title(&self) -> Result<Option<String>> {
        self.driver.attribute(&self.element, "title").await
    }

    /// True for an exact label match, or a title of the form
    /// `"<label> (<keybinding>)"`.
    pub async fn matches(&self, wanted: &str) -> Result<bool> {
        if self.label().await? == wanted {
            return Ok(true);
        }
        Ok(self
            .title()
            .await?
            .is_some_and(|t| t == wanted || t.starts_with(&format!("{} (", wanted))))
    }

    pub async fn click(&self) -> Result<()> {
        self.driver.click(&self.element).await
    }
}
