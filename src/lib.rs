//! # vscode-pageobjects
//!
//! Typed page objects for the VS Code workbench. Each object wraps one live
//! DOM element, finds its parts through a versioned locator table, and
//! re-reads the page on every call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vscode_pageobjects::{EokaDriver, Locators, NotificationType, Workbench};
//!
//! # #[tokio::main]
//! # async fn main() -> vscode_pageobjects::Result<()> {
//! let browser = eoka::Browser::launch().await?;
//! let page = browser.new_page("http://localhost:8000").await?;
//!
//! let locators = Locators::for_version("1.86.0")?;
//! let workbench = Workbench::new(EokaDriver::new(&page), &locators);
//!
//! let center = workbench.open_notifications_center().await?;
//! for n in center.notifications(NotificationType::Error).await? {
//!     println!("{}", n.message().await?);
//! }
//!
//! workbench.execute_command("View: Toggle Terminal").await?;
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod component;
pub mod debug;
pub mod dialog;
pub mod driver;
pub mod input;
pub mod locators;
pub mod notifications;
pub mod scm;
pub mod workbench;

pub use component::{Component, WaitOptions};
pub use debug::DebugView;
pub use dialog::ModalDialog;
pub use driver::{Driver, Element, EokaDriver};
pub use input::{Input, InputKind, QuickPickItem, QuickPickQuery};
pub use locators::{Locator, Locators, Version};
pub use notifications::{
    Notification, NotificationAction, NotificationType, NotificationsCenter,
};
pub use scm::{ScmChange, ScmLayout, ScmProvider, ScmView};
pub use workbench::Workbench;

/// Result type for page-object operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading locators or talking to the page.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("unknown locator: {section}.{name}")]
    UnknownLocator { section: String, name: String },

    #[error("unsupported VS Code version: {0}")]
    UnsupportedVersion(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("stale element: {0}")]
    StaleElement(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("bad attribute: {0}")]
    Attribute(String),

    #[error("script error: {0}")]
    Script(String),
}
