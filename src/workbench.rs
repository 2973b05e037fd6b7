//! Entry point: a driver plus a locator table.

use std::fmt;

use tracing::info;

use crate::component::{self, WaitOptions};
use crate::debug::DebugView;
use crate::dialog::ModalDialog;
use crate::driver::Driver;
use crate::input::{Input, InputKind};
use crate::locators::Locators;
use crate::notifications::{self, Notification, NotificationType, NotificationsCenter};
use crate::scm::ScmView;
use crate::{Error, Result};

const WORKBENCH: &str = "Workbench";

/// The VS Code window.
///
/// Owns the driver and borrows the locator table; every page object it hands
/// out borrows both.
pub struct Workbench<'l, D> {
    driver: D,
    locators: &'l Locators,
    wait: WaitOptions,
}

impl<D> fmt::Debug for Workbench<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbench")
            .field("version", &self.locators.version)
            .field("wait", &self.wait)
            .finish()
    }
}

impl<'l, D: Driver> Workbench<'l, D> {
    pub fn new(driver: D, locators: &'l Locators) -> Self {
        Self {
            driver,
            locators,
            wait: WaitOptions::default(),
        }
    }

    /// Use `wait` for every page object this workbench waits for.
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn locators(&self) -> &'l Locators {
        self.locators
    }

    /// Toasts currently displayed, filtered by severity.
    pub async fn notifications(&self, kind: NotificationType) -> Result<Vec<Notification<'_, D>>> {
        let mut out = Vec::new();
        for toast in notifications::toasts(&self.driver, self.locators).await? {
            if kind.accepts(toast.kind().await?) {
                out.push(toast);
            }
        }
        Ok(out)
    }

    /// The notifications center, opened from the status bar if hidden.
    pub async fn open_notifications_center(&self) -> Result<NotificationsCenter<'_, D>> {
        NotificationsCenter::open(&self.driver, self.locators, self.wait).await
    }

    /// The input box opened by a prompt or an extension.
    pub async fn input_box(&self) -> Result<Input<'_, D>> {
        Input::wait(&self.driver, self.locators, InputKind::InputBox, self.wait).await
    }

    /// The quick open box (command palette, go to file).
    pub async fn quick_open_box(&self) -> Result<Input<'_, D>> {
        Input::wait(&self.driver, self.locators, InputKind::QuickOpenBox, self.wait).await
    }

    pub async fn modal_dialog(&self) -> Result<ModalDialog<'_, D>> {
        ModalDialog::wait(&self.driver, self.locators, self.wait).await
    }

    /// The Source Control view. It must already be open; see
    /// [`open_activity`](Self::open_activity).
    pub async fn scm_view(&self) -> Result<ScmView<'_, D>> {
        ScmView::wait(&self.driver, self.locators, self.wait).await
    }

    pub async fn debug_view(&self) -> Result<DebugView<'_, D>> {
        DebugView::wait(&self.driver, self.locators, self.wait).await
    }

    /// Click the activity bar entry whose label starts with `title`
    /// (e.g. "Source Control", "Run and Debug").
    pub async fn open_activity(&self, title: &str) -> Result<()> {
        let locator = self
            .locators
            .get(WORKBENCH, "activity")?
            .fill(&[("title", title)])?;
        let item = self
            .driver
            .find_all(None, &locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("activity bar entry '{}'", title)))?;
        info!("open activity: {}", title);
        self.driver.click(&item).await
    }

    /// Open the command palette with F1.
    pub async fn open_command_prompt(&self) -> Result<Input<'_, D>> {
        if let Some(input) = self.open_quick_input().await? {
            return Ok(input);
        }
        self.driver.press_key("F1").await?;
        self.quick_open_box().await
    }

    async fn open_quick_input(&self) -> Result<Option<Input<'_, D>>> {
        let open =
            component::locate_displayed(&self.driver, self.locators, "QuickOpenBox", "container")
                .await?
                .is_some();
        if !open {
            return Ok(None);
        }
        let input = self.quick_open_box().await?;
        let palette = input.text().await?.starts_with('>');
        Ok(palette.then_some(input))
    }

    /// Run a command by its palette label.
    pub async fn execute_command(&self, command: &str) -> Result<()> {
        let input = self.open_command_prompt().await?;
        info!("execute command: {}", command);
        input.set_text(&format!(">{}", command)).await?;
        input.confirm().await
    }
}
