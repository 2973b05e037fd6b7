//! Source control view.
//!
//! With one repository open the view lists groups and changes directly
//! ([`ScmLayout::Single`]). With several, each repository gets a header row
//! and its groups follow it ([`ScmLayout::Multi`]).

mod change;
pub mod rows;

use std::fmt;
use std::ops::Range;

use tracing::{debug, info};

use crate::component::{self, Button, Component, WaitOptions};
use crate::driver::{Driver, Element};
use crate::locators::Locators;
use crate::{Error, Result};

pub use change::ScmChange;
pub use rows::{Row, RowKind};

use change::CHANGE;

const VIEW: &str = "ScmView";
const PROVIDER: &str = "ScmProvider";

/// How the view presents a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScmLayout {
    Single,
    Multi,
}

/// Rows currently rendered, with their elements at the same positions.
struct Rendered {
    rows: Vec<Row>,
    elements: Vec<Element>,
}

async fn has_part<D: Driver>(view: &Component<'_, D>, row: &Element, name: &str) -> Result<bool> {
    let locator = view.locator(name)?;
    Ok(!view.driver().find_all(Some(row), locator).await?.is_empty())
}

async fn read_rows<D: Driver>(view: &Component<'_, D>) -> Result<Rendered> {
    let mut rendered = Rendered {
        rows: Vec::new(),
        elements: Vec::new(),
    };
    for el in view.find_all("row").await? {
        let kind = if has_part(view, &el, "provider_header").await? {
            RowKind::Provider
        } else if has_part(view, &el, "group_header").await? {
            RowKind::Group
        } else if has_part(view, &el, "change").await? {
            RowKind::Change
        } else {
            continue;
        };

        let driver = view.driver();
        let raw = driver
            .attribute(&el, "data-index")
            .await?
            .ok_or_else(|| Error::Attribute("scm row without data-index".into()))?;
        let index = raw
            .trim()
            .parse()
            .map_err(|_| Error::Attribute(format!("invalid data-index '{}'", raw)))?;
        let level = driver
            .attribute(&el, "aria-level")
            .await?
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(1);

        let (label, count) = match kind {
            RowKind::Provider => {
                let part = view.child(PROVIDER, el.clone());
                (part.try_text_of("name").await?, 0)
            }
            RowKind::Group => {
                let part = view.child(PROVIDER, el.clone());
                let count = part
                    .try_text_of("group_count")
                    .await?
                    .and_then(|c| c.trim().parse().ok())
                    .unwrap_or(0);
                (part.try_text_of("group_name").await?, count)
            }
            RowKind::Change => {
                let part = view.child(CHANGE, el.clone());
                (part.try_text_of("label").await?, 0)
            }
        };

        let row = Row::new(index, level, kind, label.unwrap_or_default()).with_count(count);
        rendered.rows.push(row);
        rendered.elements.push(el);
    }
    debug!("scm: {} row(s) rendered", rendered.rows.len());
    Ok(rendered)
}

/// The Source Control side bar view.
pub struct ScmView<'a, D> {
    base: Component<'a, D>,
}

impl<D> fmt::Debug for ScmView<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScmView").field(self.base.root()).finish()
    }
}

impl<'a, D: Driver> ScmView<'a, D> {
    /// Wait for the Source Control view to be displayed.
    pub async fn wait(driver: &'a D, locators: &'a Locators, opts: WaitOptions) -> Result<Self> {
        let root = component::wait_displayed(driver, locators, VIEW, "view", opts).await?;
        Ok(Self {
            base: Component::new(driver, locators, VIEW, root),
        })
    }

    /// Rendered rows as a flat list. Rows scrolled out of view are absent.
    pub async fn rows(&self) -> Result<Vec<Row>> {
        Ok(read_rows(&self.base).await?.rows)
    }

    /// One provider per rendered repository header, or a single provider
    /// covering the whole view when there are no headers.
    pub async fn providers(&self) -> Result<Vec<ScmProvider<'a, D>>> {
        let rendered = read_rows(&self.base).await?;
        let headers = rows::provider_headers(&rendered.rows);
        if headers.is_empty() {
            return Ok(vec![ScmProvider {
                view: self.base.clone(),
                header: None,
            }]);
        }
        Ok(headers
            .into_iter()
            .map(|p| ScmProvider {
                view: self.base.clone(),
                header: Some(rendered.rows[p].index),
            })
            .collect())
    }

    /// Provider whose title equals `title`.
    pub async fn provider(&self, title: &str) -> Result<Option<ScmProvider<'a, D>>> {
        for provider in self.providers().await? {
            if provider.title().await? == title {
                return Ok(Some(provider));
            }
        }
        Ok(None)
    }
}

/// One repository in the source control view.
pub struct ScmProvider<'a, D> {
    view: Component<'a, D>,
    /// `data-index` of the repository header row, `None` for a single
    /// provider.
    header: Option<usize>,
}

impl<D> fmt::Debug for ScmProvider<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScmProvider")
            .field("view", self.view.root())
            .field("header", &self.header)
            .finish()
    }
}

impl<D> Clone for ScmProvider<'_, D> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            header: self.header,
        }
    }
}

impl<'a, D: Driver> ScmProvider<'a, D> {
    pub fn layout(&self) -> ScmLayout {
        match self.header {
            Some(_) => ScmLayout::Multi,
            None => ScmLayout::Single,
        }
    }

    fn span(&self, rendered: &Rendered) -> Result<Range<usize>> {
        match self.header {
            None => Ok(0..rendered.rows.len()),
            Some(index) => rows::provider_span(&rendered.rows, index).ok_or_else(|| {
                Error::StaleElement(format!("scm provider row {}", index))
            }),
        }
    }

    /// Component rooted at the repository header row.
    async fn header_row(&self) -> Result<Option<Component<'a, D>>> {
        if self.header.is_none() {
            return Ok(None);
        }
        let rendered = read_rows(&self.view).await?;
        let span = self.span(&rendered)?;
        let el = rendered.elements[span.start].clone();
        Ok(Some(self.view.child(PROVIDER, el)))
    }

    /// Repository name, or the view title for a single provider.
    pub async fn title(&self) -> Result<String> {
        match self.header_row().await? {
            Some(header) => header.text_of("name").await,
            None => self.view.text_of("title").await,
        }
    }

    /// Provider type such as `Git`. Only multi-provider headers show it.
    pub async fn kind(&self) -> Result<Option<String>> {
        match self.header_row().await? {
            Some(header) => Ok(header.try_text_of("kind").await?.filter(|k| !k.is_empty())),
            None => Ok(None),
        }
    }

    /// Count badge of the staged or unstaged group; zero when the group is not shown.
    pub async fn change_count(&self, staged: bool) -> Result<usize> {
        let rendered = read_rows(&self.view).await?;
        let span = self.span(&rendered)?;
        Ok(rows::find_group(&rendered.rows, span, staged)
            .map_or(0, |g| rendered.rows[g].count))
    }

    /// Rendered changes of the staged or unstaged group.
    pub async fn changes(&self, staged: bool) -> Result<Vec<ScmChange<'a, D>>> {
        let rendered = read_rows(&self.view).await?;
        let span = self.span(&rendered)?;
        let Some(group) = rows::find_group(&rendered.rows, span.clone(), staged) else {
            debug!("scm: no '{}' group", rows::group_label(staged));
            return Ok(Vec::new());
        };
        let header = &rendered.rows[group];
        let own = &rendered.rows[span.clone()];
        let members: Vec<usize> = rows::changes_of(own, header, header.count)
            .into_iter()
            .map(|r| r.index)
            .collect();

        Ok(own
            .iter()
            .zip(&rendered.elements[span])
            .filter(|(row, _)| row.kind == RowKind::Change && members.contains(&row.index))
            .map(|(_, el)| ScmChange::new(self.view.child(CHANGE, el.clone()), staged))
            .collect())
    }

    /// Title bar actions for a single provider, header row actions otherwise.
    pub async fn actions(&self) -> Result<Vec<Button<'a, D>>> {
        match self.header_row().await? {
            Some(header) => header.buttons("action").await,
            None => self.view.buttons("title_action").await,
        }
    }

    /// Click the action titled `title`; `NotFound` when there is none.
    pub async fn take_action(&self, title: &str) -> Result<()> {
        for action in self.actions().await? {
            if action.matches(title).await? {
                info!("scm action: {}", title);
                return action.click().await;
            }
        }
        Err(Error::NotFound(format!("scm action '{}'", title)))
    }

    /// The commit message box of this provider.
    async fn input(&self) -> Result<Element> {
        let Some(index) = self.header else {
            return self.view.find("input").await;
        };
        let rendered = read_rows(&self.view).await?;
        let position = rows::provider_headers(&rendered.rows)
            .into_iter()
            .position(|p| rendered.rows[p].index == index)
            .ok_or_else(|| Error::StaleElement(format!("scm provider row {}", index)))?;
        self.view
            .find_all("input")
            .await?
            .into_iter()
            .nth(position)
            .ok_or_else(|| Error::ElementNotFound(format!("ScmView.input for provider {}", index)))
    }

    /// Type `message` into the commit box and run the Commit action.
    pub async fn commit(&self, message: &str) -> Result<()> {
        let input = self.input().await?;
        self.view.driver().set_value(&input, message).await?;
        info!("scm commit: '{}'", message);
        self.take_action("Commit").await
    }
}
