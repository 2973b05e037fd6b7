use std::fmt;

use tracing::info;

use crate::component::{Button, Component};
use crate::driver::Driver;
use crate::{Error, Result};

pub(crate) const CHANGE: &str = "ScmChange";

/// One changed file row in the source control view.
pub struct ScmChange<'a, D> {
    base: Component<'a, D>,
    staged: bool,
}

impl<D> fmt::Debug for ScmChange<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScmChange")
            .field("root", self.base.root())
            .field("staged", &self.staged)
            .finish()
    }
}

impl<D> Clone for ScmChange<'_, D> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            staged: self.staged,
        }
    }
}

impl<'a, D: Driver> ScmChange<'a, D> {
    pub fn new(base: Component<'a, D>, staged: bool) -> Self {
        Self { base, staged }
    }

    pub fn component(&self) -> &Component<'a, D> {
        &self.base
    }

    /// File name.
    pub async fn label(&self) -> Result<String> {
        self.base.text_of("label").await
    }

    /// Folder shown next to the file name.
    pub async fn description(&self) -> Result<Option<String>> {
        Ok(self
            .base
            .try_text_of("description")
            .await?
            .filter(|d| !d.is_empty()))
    }

    /// Status such as `Modified` or `Untracked`, taken from the decoration's
    /// tooltip, or its letter when there is none.
    pub async fn status(&self) -> Result<String> {
        let el = self.base.find("status").await?;
        let driver = self.base.driver();
        match driver.attribute(&el, "title").await? {
            Some(title) if !title.is_empty() => Ok(title),
            _ => driver.text(&el).await,
        }
    }

    /// Whether the change was listed under "Staged Changes".
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// Folder rows in tree view mode can be expanded.
    pub async fn is_expanded(&self) -> Result<bool> {
        Ok(self
            .base
            .attribute("aria-expanded")
            .await?
            .is_some_and(|v| v == "true"))
    }

    /// Click the row (opens the diff).
    pub async fn select(&self) -> Result<()> {
        self.base.driver().click(self.base.root()).await
    }

    /// Inline actions, shown on hover.
    pub async fn actions(&self) -> Result<Vec<Button<'a, D>>> {
        self.base.buttons("action").await
    }

    /// Click the inline action titled `title`.
    pub async fn take_action(&self, title: &str) -> Result<()> {
        let action = self
            .base
            .button("action", title)
            .await?
            .ok_or_else(|| Error::NotFound(format!("scm change action '{}'", title)))?;
        info!("scm change action: {}", title);
        action.click().await
    }
}
