//! Quick input widget: input boxes, the quick open box and quick pick rows.

use std::fmt;

use tracing::{debug, info};

use crate::component::{self, Component, WaitOptions};
use crate::driver::{Driver, Element};
use crate::locators::Locators;
use crate::{Error, Result};

const INPUT: &str = "Input";
const QUICK_PICK_ITEM: &str = "QuickPickItem";

/// Which flavour of the quick input widget to bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Input box opened by an extension or a prompt.
    InputBox,
    /// The command palette / go-to-file box.
    QuickOpenBox,
}

impl InputKind {
    fn container_section(self) -> &'static str {
        match self {
            Self::InputBox => INPUT,
            Self::QuickOpenBox => "QuickOpenBox",
        }
    }
}

/// How to pick a quick pick row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickPickQuery {
    /// Position in the full list (`data-index`).
    Index(usize),
    /// Substring of the row label.
    Label(String),
}

impl From<usize> for QuickPickQuery {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for QuickPickQuery {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

impl From<String> for QuickPickQuery {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

impl fmt::Display for QuickPickQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {}", i),
            Self::Label(l) => write!(f, "label '{}'", l),
        }
    }
}

/// The open quick input widget.
pub struct Input<'a, D> {
    base: Component<'a, D>,
    kind: InputKind,
}

impl<D> fmt::Debug for Input<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("kind", &self.kind)
            .field("root", self.base.root())
            .finish()
    }
}

impl<'a, D: Driver> Input<'a, D> {
    /// Wait for the widget to be displayed.
    pub async fn wait(
        driver: &'a D,
        locators: &'a Locators,
        kind: InputKind,
        opts: WaitOptions,
    ) -> Result<Self> {
        let root =
            component::wait_displayed(driver, locators, kind.container_section(), "container", opts)
                .await?;
        Ok(Self {
            base: Component::new(driver, locators, INPUT, root),
            kind,
        })
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn component(&self) -> &Component<'a, D> {
        &self.base
    }

    async fn input(&self) -> Result<Element> {
        self.base.find("input").await
    }

    /// Current text in the input field.
    pub async fn text(&self) -> Result<String> {
        let input = self.input().await?;
        self.base.driver().value(&input).await
    }

    /// Replace the text in the input field. Quick picks filter on it.
    pub async fn set_text(&self, text: &str) -> Result<()> {
        let input = self.input().await?;
        debug!("input set_text: '{}'", text);
        self.base.driver().set_value(&input, text).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.set_text("").await
    }

    /// Hint shown while the field is empty.
    pub async fn placeholder(&self) -> Result<Option<String>> {
        let input = self.input().await?;
        self.base.driver().attribute(&input, "placeholder").await
    }

    async fn press(&self, key: &str) -> Result<()> {
        let input = self.input().await?;
        let driver = self.base.driver();
        driver.focus(&input).await?;
        driver.press_key(key).await
    }

    /// Accept the current value (Enter).
    pub async fn confirm(&self) -> Result<()> {
        info!("input confirm");
        self.press("Enter").await
    }

    /// Dismiss the widget (Escape).
    pub async fn cancel(&self) -> Result<()> {
        info!("input cancel");
        self.press("Escape").await
    }

    /// Title bar of a multi-step input; `None` when not shown.
    pub async fn title(&self) -> Result<Option<String>> {
        Ok(self
            .base
            .try_text_of("title")
            .await?
            .filter(|t| !t.is_empty()))
    }

    /// Validation or hint message under the input.
    pub async fn message(&self) -> Result<Option<String>> {
        Ok(self
            .base
            .try_text_of("message")
            .await?
            .filter(|t| !t.is_empty()))
    }

    /// Whether the input box is flagged with a validation error.
    pub async fn has_error(&self) -> Result<bool> {
        match self.base.try_find("input_box").await? {
            Some(bx) => self.base.has_class(&bx, "error").await,
            None => Ok(false),
        }
    }

    /// Whether the busy bar above the list is showing.
    pub async fn has_progress(&self) -> Result<bool> {
        match self.base.try_find("progress").await? {
            Some(bar) => self.base.driver().is_displayed(&bar).await,
            None => Ok(false),
        }
    }

    pub async fn is_password(&self) -> Result<bool> {
        let input = self.input().await?;
        Ok(self
            .base
            .driver()
            .attribute(&input, "type")
            .await?
            .is_some_and(|t| t == "password"))
    }

    /// Click the back button of a multi-step input. `false` when there is none.
    pub async fn back(&self) -> Result<bool> {
        let Some(button) = self.base.try_find("back").await? else {
            return Ok(false);
        };
        let driver = self.base.driver();
        if !driver.is_displayed(&button).await? {
            return Ok(false);
        }
        driver.click(&button).await?;
        Ok(true)
    }

    /// Quick pick rows currently rendered.
    pub async fn quick_picks(&self) -> Result<Vec<QuickPickItem<'a, D>>> {
        let Some(list) = self.base.try_find("quick_list").await? else {
            return Ok(Vec::new());
        };
        let driver = self.base.driver();
        let rows = driver.find_all(Some(&list), self.base.locator("row")?).await?;
        Ok(rows
            .into_iter()
            .map(|row| QuickPickItem::new(self.base.child(QUICK_PICK_ITEM, row)))
            .collect())
    }

    /// Search the list for a row, paging down through the virtualized list.
    ///
    /// The list is first paged back up to its first row. The search stops at
    /// the end of the list: the last rendered row has
    /// `aria-posinset == aria-setsize`, the `last_row` sentinel is present, or
    /// paging revealed no new rows.
    pub async fn find_quick_pick(
        &self,
        query: impl Into<QuickPickQuery>,
    ) -> Result<Option<QuickPickItem<'a, D>>> {
        let query = query.into();
        self.scroll_to_top().await?;
        let mut last_seen: Option<usize> = None;
        let mut pages = 0;

        loop {
            let picks = self.quick_picks().await?;
            for pick in &picks {
                if pick.matches(&query).await? {
                    debug!("found quick pick by {} after {} page(s)", query, pages);
                    return Ok(Some(pick.clone()));
                }
            }

            let Some(last) = picks.last() else {
                return Ok(None);
            };
            if self.at_end_of_list(last).await? {
                debug!("quick pick {} not found, end of list", query);
                return Ok(None);
            }
            let last_index = last.index().await?;
            if last_seen == Some(last_index) {
                debug!("quick pick {} not found, list stopped scrolling", query);
                return Ok(None);
            }
            last_seen = Some(last_index);

            self.press("PageDown").await?;
            pages += 1;
        }
    }

    /// Page up until row 0 is rendered or the list stops moving.
    async fn scroll_to_top(&self) -> Result<()> {
        let mut first_seen: Option<usize> = None;
        loop {
            let picks = self.quick_picks().await?;
            let Some(first) = picks.first() else {
                return Ok(());
            };
            let first_index = first.index().await?;
            if first_index == 0 || first_seen == Some(first_index) {
                return Ok(());
            }
            first_seen = Some(first_index);
            self.press("PageUp").await?;
        }
    }

    async fn at_end_of_list(&self, last: &QuickPickItem<'a, D>) -> Result<bool> {
        let pos = last.base.attribute("aria-posinset").await?;
        let size = last.base.attribute("aria-setsize").await?;
        if let (Some(pos), Some(size)) = (pos, size) {
            if pos == size {
                return Ok(true);
            }
        }
        Ok(self.base.try_find("last_row").await?.is_some())
    }

    /// Find and click a quick pick. `Ok(false)` when no row matched.
    pub async fn select_quick_pick(&self, query: impl Into<QuickPickQuery>) -> Result<bool> {
        let query = query.into();
        match self.find_quick_pick(query.clone()).await? {
            Some(pick) => {
                info!("select quick pick: {}", query);
                pick.select().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// One row of the quick pick list.
pub struct QuickPickItem<'a, D> {
    base: Component<'a, D>,
}

impl<D> fmt::Debug for QuickPickItem<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("QuickPickItem").field(self.base.root()).finish()
    }
}

impl<D> Clone for QuickPickItem<'_, D> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<'a, D: Driver> QuickPickItem<'a, D> {
    pub fn new(base: Component<'a, D>) -> Self {
        Self { base }
    }

    pub fn component(&self) -> &Component<'a, D> {
        &self.base
    }

    /// Position in the full (virtualized) list.
    pub async fn index(&self) -> Result<usize> {
        let raw = self
            .base
            .attribute("data-index")
            .await?
            .ok_or_else(|| Error::Attribute("quick pick row without data-index".into()))?;
        raw.trim()
            .parse()
            .map_err(|_| Error::Attribute(format!("invalid data-index '{}'", raw)))
    }

    /// Row label without its description.
    pub async fn label(&self) -> Result<String> {
        self.base.text_of("label").await
    }

    pub async fn description(&self) -> Result<Option<String>> {
        Ok(self
            .base
            .try_text_of("description")
            .await?
            .filter(|d| !d.is_empty()))
    }

    /// Full row text.
    pub async fn text(&self) -> Result<String> {
        self.base.text().await
    }

    /// Click the row.
    pub async fn select(&self) -> Result<()> {
        self.base.driver().click(self.base.root()).await
    }

    async fn matches(&self, query: &QuickPickQuery) -> Result<bool> {
        match query {
            QuickPickQuery::Index(i) => Ok(self.index().await? == *i),
            QuickPickQuery::Label(l) => Ok(self.label().await?.contains(l.as_str())),
        }
    }
}
