//! Toast notifications and the notifications center.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::component::{self, Button, Component, WaitOptions};
use crate::driver::Driver;
use crate::locators::Locators;
use crate::{Error, Result};

const CENTER: &str = "NotificationsCenter";
const NOTIFICATION: &str = "Notification";
const WORKBENCH: &str = "Workbench";

/// Notification severity. `Any` only makes sense as a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    Info,
    Warning,
    Error,
    Any,
}

impl NotificationType {
    /// Severity from the icon's class list. VS Code renders info for anything
    /// it does not mark otherwise.
    pub fn from_classes(classes: &str) -> Self {
        let has = |c: &str| classes.split_whitespace().any(|x| x == c);
        if has("codicon-error") {
            Self::Error
        } else if has("codicon-warning") {
            Self::Warning
        } else {
            Self::Info
        }
    }

    /// Whether a notification of severity `actual` passes this filter.
    pub fn accepts(self, actual: NotificationType) -> bool {
        self == Self::Any || self == actual
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl FromStr for NotificationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "any" | "all" => Ok(Self::Any),
            other => Err(Error::Config(format!(
                "unknown notification type '{}', expected info, warning, error or any",
                other
            ))),
        }
    }
}

/// An action button on a notification.
pub type NotificationAction<'a, D> = Button<'a, D>;

/// One notification, either a toast or a row in the center.
pub struct Notification<'a, D> {
    base: Component<'a, D>,
}

impl<D> fmt::Debug for Notification<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Notification").field(self.base.root()).finish()
    }
}

impl<D> Clone for Notification<'_, D> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<'a, D: Driver> Notification<'a, D> {
    pub fn new(base: Component<'a, D>) -> Self {
        Self { base }
    }

    pub fn component(&self) -> &Component<'a, D> {
        &self.base
    }

    pub async fn message(&self) -> Result<String> {
        self.base.text_of("message").await
    }

    /// Severity, read from the icon's codicon class.
    pub async fn kind(&self) -> Result<NotificationType> {
        let icon = self.base.find("icon").await?;
        let classes = self
            .base
            .driver()
            .attribute(&icon, "class")
            .await?
            .unwrap_or_default();
        Ok(NotificationType::from_classes(&classes))
    }

    /// Originating extension, without the `Source: ` prefix.
    pub async fn source(&self) -> Result<Option<String>> {
        let Some(el) = self.base.try_find("source").await? else {
            return Ok(None);
        };
        let driver = self.base.driver();
        let raw = match driver.attribute(&el, "title").await? {
            Some(title) if !title.is_empty() => title,
            _ => driver.text(&el).await?,
        };
        let source = raw.trim();
        let source = source.strip_prefix("Source:").unwrap_or(source).trim();
        Ok((!source.is_empty()).then(|| source.to_string()))
    }

    /// Whether a progress bar is running.
    pub async fn has_progress(&self) -> Result<bool> {
        let Some(bar) = self.base.try_find("progress").await? else {
            return Ok(false);
        };
        if self.base.has_class(&bar, "done").await? {
            return Ok(false);
        }
        self.base.driver().is_displayed(&bar).await
    }

    /// Whether the notification is still on screen.
    pub async fn is_active(&self) -> Result<bool> {
        match self.base.is_displayed().await {
            Ok(shown) => Ok(shown),
            Err(Error::StaleElement(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Buttons under the message.
    pub async fn actions(&self) -> Result<Vec<NotificationAction<'a, D>>> {
        self.base.buttons("action").await
    }

    /// Click the action labelled `label`.
    pub async fn take_action(&self, label: &str) -> Result<()> {
        let action = self.base.button("action", label).await?.ok_or_else(|| {
            Error::NotFound(format!("notification action '{}'", label))
        })?;
        info!("notification action: {}", label);
        action.click().await
    }

    /// Clear this notification.
    pub async fn dismiss(&self) -> Result<()> {
        debug!("dismiss notification");
        self.base.click("dismiss").await
    }

    /// Expand a collapsed notification. No-op when there is nothing to expand.
    pub async fn expand(&self) -> Result<()> {
        if let Some(toggle) = self.base.try_find("expand").await? {
            self.base.driver().click(&toggle).await?;
        }
        Ok(())
    }
}

/// The notifications center panel.
pub struct NotificationsCenter<'a, D> {
    base: Component<'a, D>,
}

impl<D> fmt::Debug for NotificationsCenter<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NotificationsCenter")
            .field(self.base.root())
            .finish()
    }
}

impl<'a, D: Driver> NotificationsCenter<'a, D> {
    /// Return the center, opening it through the status bar bell if hidden.
    pub async fn open(driver: &'a D, locators: &'a Locators, opts: WaitOptions) -> Result<Self> {
        if let Some(root) = component::locate_displayed(driver, locators, CENTER, "center").await? {
            return Ok(Self::from_root(driver, locators, root));
        }

        let bell = component::locate(driver, locators, WORKBENCH, "status_bar_bell")
            .await?
            .ok_or_else(|| Error::ElementNotFound("status bar notifications item".into()))?;
        debug!("opening notifications center");
        driver.click(&bell).await?;

        let root = component::wait_displayed(driver, locators, CENTER, "center", opts).await?;
        Ok(Self::from_root(driver, locators, root))
    }

    fn from_root(driver: &'a D, locators: &'a Locators, root: crate::Element) -> Self {
        Self {
            base: Component::new(driver, locators, CENTER, root),
        }
    }

    /// Notifications in the center, filtered by severity.
    pub async fn notifications(&self, kind: NotificationType) -> Result<Vec<Notification<'a, D>>> {
        let mut out = Vec::new();
        for row in self.base.find_all("row").await? {
            let n = Notification::new(self.base.child(NOTIFICATION, row));
            if kind == NotificationType::Any || kind.accepts(n.kind().await?) {
                out.push(n);
            }
        }
        debug!("{} {} notification(s) in center", out.len(), kind);
        Ok(out)
    }

    pub async fn has_notifications(&self) -> Result<bool> {
        Ok(!self.base.find_all("row").await?.is_empty())
    }

    /// Header text of the center, e.g. "NOTIFICATIONS".
    pub async fn title(&self) -> Result<String> {
        self.base.text_of("header_title").await
    }

    pub async fn clear_all(&self) -> Result<()> {
        info!("clear all notifications");
        self.base.click("clear_all").await
    }

    pub async fn close(self) -> Result<()> {
        self.base.click("close").await
    }
}

/// Toasts currently shown in the corner of the workbench.
pub async fn toasts<'a, D: Driver>(
    driver: &'a D,
    locators: &'a Locators,
) -> Result<Vec<Notification<'a, D>>> {
    let Some(container) =
        component::locate_displayed(driver, locators, WORKBENCH, "notifications_toasts").await?
    else {
        return Ok(Vec::new());
    };
    let toast = locators.get(WORKBENCH, "notifications_toast")?;
    let mut out = Vec::new();
    for el in driver.find_all(Some(&container), toast).await? {
        if driver.is_displayed(&el).await? {
            out.push(Notification::new(Component::new(
                driver,
                locators,
                NOTIFICATION,
                el,
            )));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{FakeDom, NodeId};

    fn dom() -> FakeDom {
        FakeDom::new(Locators::base().unwrap())
    }

    fn notification(dom: &FakeDom, parent: NodeId, severity: &str, message: &str) -> NodeId {
        let row = dom.add(Some(parent)).is(CENTER, "row").id();
        dom.add(Some(row))
            .is(NOTIFICATION, "icon")
            .attr("class", &format!("notification-list-item-icon codicon codicon-{}", severity));
        dom.add(Some(row)).is(NOTIFICATION, "message").text(message);
        row
    }

    fn open_center(dom: &FakeDom) -> NodeId {
        dom.add(None).is(CENTER, "center").id()
    }

    #[test]
    fn type_from_classes() {
        assert_eq!(
            NotificationType::from_classes("codicon codicon-error"),
            NotificationType::Error
        );
        assert_eq!(
            NotificationType::from_classes("codicon codicon-warning"),
            NotificationType::Warning
        );
        assert_eq!(
            NotificationType::from_classes("codicon codicon-info"),
            NotificationType::Info
        );
        assert_eq!(NotificationType::from_classes(""), NotificationType::Info);
    }

    #[test]
    fn type_from_str() {
        assert_eq!("Warn".parse::<NotificationType>().unwrap(), NotificationType::Warning);
        assert_eq!("any".parse::<NotificationType>().unwrap(), NotificationType::Any);
        assert!("fatal".parse::<NotificationType>().is_err());
    }

    #[tokio::test]
    async fn filters_by_type() {
        let dom = dom();
        let center = open_center(&dom);
        notification(&dom, center, "info", "Indexing done");
        notification(&dom, center, "error", "Build failed");
        notification(&dom, center, "warning", "Low disk");

        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();

        let errors = nc.notifications(NotificationType::Error).await.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message().await.unwrap(), "Build failed");

        let all = nc.notifications(NotificationType::Any).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(nc.has_notifications().await.unwrap());
    }

    #[tokio::test]
    async fn open_clicks_bell_when_hidden() {
        let dom = dom();
        let center = dom.add(None).is(CENTER, "center").hidden().id();
        let bell = dom.add(None).is(WORKBENCH, "status_bar_bell").id();
        dom.on_click(bell, move |nodes| nodes[center].displayed = true);

        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(dom.clicks(), vec![bell]);
        assert!(!nc.has_notifications().await.unwrap());
    }

    #[tokio::test]
    async fn source_strips_prefix() {
        let dom = dom();
        let center = open_center(&dom);
        let row = notification(&dom, center, "info", "Pull complete");
        dom.add(Some(row))
            .is(NOTIFICATION, "source")
            .attr("title", "Source: Git (Extension)")
            .text("Source: Git");

        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        let n = &nc.notifications(NotificationType::Info).await.unwrap()[0];
        assert_eq!(n.source().await.unwrap().as_deref(), Some("Git (Extension)"));
    }

    #[tokio::test]
    async fn missing_parts_degrade() {
        let dom = dom();
        let center = open_center(&dom);
        notification(&dom, center, "info", "Plain");
        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        let n = &nc.notifications(NotificationType::Any).await.unwrap()[0];
        assert_eq!(n.source().await.unwrap(), None);
        assert!(!n.has_progress().await.unwrap());
        assert!(n.actions().await.unwrap().is_empty());
        n.expand().await.unwrap();
        assert!(dom.clicks().is_empty());
    }

    #[tokio::test]
    async fn progress_reflects_done_class() {
        let dom = dom();
        let center = open_center(&dom);
        let row = notification(&dom, center, "info", "Cloning");
        let bar = dom
            .add(Some(row))
            .is(NOTIFICATION, "progress")
            .attr("class", "monaco-progress-container active")
            .id();
        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        let n = &nc.notifications(NotificationType::Any).await.unwrap()[0];
        assert!(n.has_progress().await.unwrap());

        dom.detach(bar);
        dom.add(Some(row))
            .is(NOTIFICATION, "progress")
            .attr("class", "monaco-progress-container done");
        assert!(!n.has_progress().await.unwrap());
    }

    #[tokio::test]
    async fn take_action_by_label() {
        let dom = dom();
        let center = open_center(&dom);
        let row = notification(&dom, center, "warning", "Reload required");
        dom.add(Some(row)).is(NOTIFICATION, "action").text("Later");
        let reload = dom.add(Some(row)).is(NOTIFICATION, "action").text("Reload").id();

        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        let n = &nc.notifications(NotificationType::Warning).await.unwrap()[0];
        let labels = {
            let mut v = Vec::new();
            for a in n.actions().await.unwrap() {
                v.push(a.label().await.unwrap());
            }
            v
        };
        assert_eq!(labels, vec!["Later", "Reload"]);

        n.take_action("Reload").await.unwrap();
        assert_eq!(dom.clicks(), vec![reload]);

        let err = n.take_action("Ignore").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn dismiss_removes_from_center() {
        let dom = dom();
        let center = open_center(&dom);
        let row = notification(&dom, center, "info", "Bye");
        let close = dom.add(Some(row)).is(NOTIFICATION, "dismiss").id();
        dom.on_click(close, move |nodes| nodes[row].attached = false);

        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        let n = nc.notifications(NotificationType::Any).await.unwrap().remove(0);
        assert!(n.is_active().await.unwrap());
        n.dismiss().await.unwrap();
        assert!(!n.is_active().await.unwrap());
        assert!(!nc.has_notifications().await.unwrap());
    }

    #[tokio::test]
    async fn center_title() {
        let dom = dom();
        let center = open_center(&dom);
        dom.add(Some(center))
            .is(CENTER, "header_title")
            .text("NOTIFICATIONS");
        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(nc.title().await.unwrap(), "NOTIFICATIONS");
    }

    #[tokio::test]
    async fn clear_all_and_close() {
        let dom = dom();
        let center = open_center(&dom);
        let clear = dom.add(Some(center)).is(CENTER, "clear_all").id();
        let close = dom.add(Some(center)).is(CENTER, "close").id();
        let nc = NotificationsCenter::open(&dom, dom.locators(), WaitOptions::default())
            .await
            .unwrap();
        nc.clear_all().await.unwrap();
        nc.close().await.unwrap();
        assert_eq!(dom.clicks(), vec![clear, close]);
    }

    #[tokio::test]
    async fn toasts_lists_visible_only() {
        let dom = dom();
        let container = dom.add(None).is(WORKBENCH, "notifications_toasts").id();
        let toast = dom.add(Some(container)).is(WORKBENCH, "notifications_toast").id();
        dom.add(Some(toast)).is(NOTIFICATION, "message").text("Saved");
        dom.add(Some(container))
            .is(WORKBENCH, "notifications_toast")
            .hidden();

        let shown = toasts(&dom, dom.locators()).await.unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message().await.unwrap(), "Saved");
    }

    #[tokio::test]
    async fn no_toast_container_is_empty() {
        let dom = dom();
        assert!(toasts(&dom, dom.locators()).await.unwrap().is_empty());
    }
}
