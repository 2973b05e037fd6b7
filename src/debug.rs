//! Run and Debug view: launch configuration picker and start button.

use std::fmt;

use tracing::info;

use crate::component::{self, Component, WaitOptions};
use crate::driver::{Driver, Element};
use crate::locators::Locators;
use crate::{Error, Result};

const DEBUG_VIEW: &str = "DebugView";

/// The Run and Debug side bar view.
pub struct DebugView<'a, D> {
    base: Component<'a, D>,
}

impl<D> fmt::Debug for DebugView<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DebugView").field(self.base.root()).finish()
    }
}

/// Separator rows VS Code puts in the launch combo are drawn with box
/// characters and carry no configuration.
fn is_separator(label: &str) -> bool {
    let label = label.trim();
    label.is_empty() || label.chars().all(|c| c == '─' || c == '-')
}

impl<'a, D: Driver> DebugView<'a, D> {
    /// Wait for the Run and Debug view to be displayed.
    pub async fn wait(driver: &'a D, locators: &'a Locators, opts: WaitOptions) -> Result<Self> {
        let root = component::wait_displayed(driver, locators, DEBUG_VIEW, "view", opts).await?;
        Ok(Self {
            base: Component::new(driver, locators, DEBUG_VIEW, root),
        })
    }

    async fn select(&self) -> Result<Element> {
        let combo = self.base.find("launch_combo").await?;
        let select = self.base.locator("launch_select")?;
        self.base
            .driver()
            .find_all(Some(&combo), select)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ElementNotFound("DebugView.launch_select".into()))
    }

    /// The selected launch configuration.
    pub async fn launch_configuration(&self) -> Result<Option<String>> {
        let select = self.select().await?;
        Ok(self
            .base
            .driver()
            .selected_option(&select)
            .await?
            .filter(|l| !is_separator(l)))
    }

    /// All launch configurations offered by the combo box.
    pub async fn launch_configurations(&self) -> Result<Vec<String>> {
        let select = self.select().await?;
        Ok(self
            .base
            .driver()
            .options(&select)
            .await?
            .into_iter()
            .filter(|l| !is_separator(l))
            .collect())
    }

    /// Choose a launch configuration by its label. Separator rows are not
    /// configurations and fail with `NotFound` like unknown labels.
    pub async fn select_launch_configuration(&self, label: &str) -> Result<()> {
        let select = self.select().await?;
        if is_separator(label) || !self.base.driver().select_option(&select, label).await? {
            return Err(Error::NotFound(format!("launch configuration '{}'", label)));
        }
        info!("debug: selected '{}'", label);
        Ok(())
    }

    /// Start debugging with the selected configuration.
    pub async fn start(&self) -> Result<()> {
        info!("debug: start");
        self.base.click("start").await
    }
}
