//! Modal dialogs (save prompts, confirmations).

use std::fmt;

use tracing::info;

use crate::component::{self, Button, Component, WaitOptions};
use crate::driver::Driver;
use crate::locators::Locators;
use crate::{Error, Result};

const DIALOG: &str = "ModalDialog";

/// The modal dialog box.
pub struct ModalDialog<'a, D> {
    base: Component<'a, D>,
}

impl<D> fmt::Debug for ModalDialog<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModalDialog").field(self.base.root()).finish()
    }
}

impl<'a, D: Driver> ModalDialog<'a, D> {
    /// Wait for a dialog to be displayed.
    pub async fn wait(driver: &'a D, locators: &'a Locators, opts: WaitOptions) -> Result<Self> {
        let root = component::wait_displayed(driver, locators, DIALOG, "dialog", opts).await?;
        Ok(Self {
            base: Component::new(driver, locators, DIALOG, root),
        })
    }

    /// The dialog, if one is open right now.
    pub async fn current(driver: &'a D, locators: &'a Locators) -> Result<Option<Self>> {
        Ok(component::locate_displayed(driver, locators, DIALOG, "dialog")
            .await?
            .map(|root| Self {
                base: Component::new(driver, locators, DIALOG, root),
            }))
    }

    /// The main question or statement of the dialog.
    pub async fn message(&self) -> Result<String> {
        self.base.text_of("message").await
    }

    /// Secondary text under the message; empty when the dialog has none.
    pub async fn details(&self) -> Result<String> {
        Ok(self.base.try_text_of("details").await?.unwrap_or_default())
    }

    pub async fn buttons(&self) -> Result<Vec<Button<'a, D>>> {
        self.base.buttons("button").await
    }

    /// Labels of all buttons, in display order.
    pub async fn button_labels(&self) -> Result<Vec<String>> {
        let mut labels = Vec::new();
        for button in self.buttons().await? {
            labels.push(button.label().await?);
        }
        Ok(labels)
    }

    /// Button labelled `label`, or `None`.
    pub async fn button(&self, label: &str) -> Result<Option<Button<'a, D>>> {
        self.base.button("button", label).await
    }

    /// Click the button labelled `label`.
    pub async fn push_button(&self, label: &str) -> Result<()> {
        let button = self
            .button(label)
            .await?
            .ok_or_else(|| Error::NotFound(format!("dialog button '{}'", label)))?;
        info!("dialog: push '{}'", label);
        button.click().await
    }

    /// Close via the title bar X.
    pub async fn close(self) -> Result<()> {
        info!("dialog: close");
        self.base.click("close").await
    }
}
