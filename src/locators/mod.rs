//! Versioned locator tables.
//!
//! Selectors are data: a base YAML table describes the oldest supported VS Code
//! release and each newer release ships a partial override. Resolving a
//! version layers every override up to and including that version on top of
//! the base.

mod version;

pub use version::Version;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

const BASE_TABLE: &str = include_str!("../../locators/base.yaml");

const OVERRIDES: &[&str] = &[
    include_str!("../../locators/1.84.yaml"),
    include_str!("../../locators/1.86.yaml"),
];

/// Sections every complete table must define.
const REQUIRED_SECTIONS: &[&str] = &[
    "Workbench",
    "NotificationsCenter",
    "Notification",
    "Input",
    "QuickOpenBox",
    "QuickPickItem",
    "ModalDialog",
    "ScmView",
    "ScmProvider",
    "ScmChange",
    "DebugView",
];

/// A DOM selector, either CSS or XPath.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }

    /// Classify a table string. XPath is recognised by an explicit `xpath:`
    /// prefix or by a leading `/`, `./` or `(`; everything else is CSS.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(v) = s.strip_prefix("xpath:") {
            return Self::XPath(v.trim().into());
        }
        if let Some(v) = s.strip_prefix("css:") {
            return Self::Css(v.trim().into());
        }
        if s.starts_with('/') || s.starts_with("./") || s.starts_with('(') {
            return Self::XPath(s.into());
        }
        Self::Css(s.into())
    }

    /// Short name of the selector language, as understood by the drivers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
        }
    }

    /// The raw selector expression.
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }

    /// Substitute `${name}` placeholders. Every placeholder must have a value.
    pub fn fill(&self, params: &[(&str, &str)]) -> Result<Locator> {
        let mut result = self.expression().to_string();
        let mut start = 0;

        while let Some(var_start) = result[start..].find("${") {
            let var_start = start + var_start;
            let Some(var_end) = result[var_start..].find('}') else {
                break;
            };
            let var_end = var_start + var_end;

            let var_name = &result[var_start + 2..var_end];
            let Some((_, value)) = params.iter().find(|(k, _)| *k == var_name) else {
                return Err(Error::Config(format!(
                    "missing locator parameter '{}' in {}",
                    var_name, self
                )));
            };
            let value = value.to_string();

            result.replace_range(var_start..=var_end, &value);
            start = var_start + value.len();
        }

        Ok(match self {
            Self::Css(_) => Self::Css(result),
            Self::XPath(_) => Self::XPath(result),
        })
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        match Locator::parse(locator.expression()) {
            parsed if parsed.kind() == locator.kind() => locator.expression().to_string(),
            _ => format!("{}:{}", locator.kind(), locator.expression()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.expression())
    }
}

/// A locator table: section (page object) -> logical name -> selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locators {
    /// Release this table describes.
    pub version: Version,

    #[serde(default)]
    sections: BTreeMap<String, BTreeMap<String, Locator>>,
}

impl Locators {
    /// The bundled base table, without any overrides.
    pub fn base() -> Result<Self> {
        Self::parse(BASE_TABLE)
    }

    /// Resolve the bundled tables for a VS Code release.
    pub fn for_version(version: &str) -> Result<Self> {
        let requested: Version = version.parse()?;
        let mut table = Self::base()?;
        if requested < table.version {
            return Err(Error::UnsupportedVersion(format!(
                "{} (oldest supported is {})",
                requested, table.version
            )));
        }

        let mut overrides = OVERRIDES
            .iter()
            .map(|yaml| Self::parse(yaml))
            .collect::<Result<Vec<_>>>()?;
        overrides.sort_by_key(|o| o.version);

        for layer in overrides.into_iter().filter(|o| o.version <= requested) {
            debug!("Applying locator overrides for {}", layer.version);
            table.merge(layer);
        }
        table.version = requested;
        table.validate()?;
        Ok(table)
    }

    /// Resolve the newest bundled release.
    pub fn latest() -> Result<Self> {
        let newest = OVERRIDES
            .iter()
            .map(|yaml| Self::parse(yaml).map(|o| o.version))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .max();
        match newest {
            Some(v) => Self::for_version(&v.to_string()),
            None => Self::base(),
        }
    }

    /// Load a table (complete or partial) from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a table (complete or partial) from YAML.
    pub fn parse(yaml: &str) -> Result<Self> {
        let table: Self = serde_yaml::from_str(yaml)?;
        for (section, entries) in &table.sections {
            for (name, locator) in entries {
                if locator.expression().is_empty() {
                    return Err(Error::Config(format!(
                        "locator {}.{} is empty",
                        section, name
                    )));
                }
            }
        }
        Ok(table)
    }

    /// Layer `other` on top of this table. Entries in `other` win.
    pub fn merge(&mut self, other: Locators) {
        for (section, entries) in other.sections {
            self.sections.entry(section).or_default().extend(entries);
        }
        if other.version > self.version {
            self.version = other.version;
        }
    }

    /// Check that every page object has its section.
    pub fn validate(&self) -> Result<()> {
        for section in REQUIRED_SECTIONS {
            if !self.sections.contains_key(*section) {
                return Err(Error::Config(format!(
                    "locator table {} is missing section '{}'",
                    self.version, section
                )));
            }
        }
        Ok(())
    }

    /// Look up a selector.
    pub fn get(&self, section: &str, name: &str) -> Result<&Locator> {
        self.sections
            .get(section)
            .and_then(|s| s.get(name))
            .ok_or_else(|| Error::UnknownLocator {
                section: section.to_string(),
                name: name.to_string(),
            })
    }

    /// Replace or add a single selector.
    pub fn set(&mut self, section: &str, name: &str, locator: Locator) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(name.to_string(), locator);
    }

    /// Section names in this table.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|s| s.as_str())
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_parse_css() {
        let l = Locator::parse(".monaco-list-row");
        assert_eq!(l, Locator::css(".monaco-list-row"));
        assert_eq!(l.kind(), "css");
    }

    #[test]
    fn test_locator_parse_xpath_forms() {
        assert_eq!(Locator::parse("//div").kind(), "xpath");
        assert_eq!(Locator::parse(".//a[@title]").kind(), "xpath");
        assert_eq!(Locator::parse("(//a)[1]").kind(), "xpath");
        assert_eq!(
            Locator::parse("xpath: ancestor::div"),
            Locator::xpath("ancestor::div")
        );
    }

    #[test]
    fn test_fill_placeholders() {
        let l = Locator::css("a[aria-label^='${title}']");
        let filled = l.fill(&[("title", "Source Control")]).unwrap();
        assert_eq!(filled, Locator::css("a[aria-label^='Source Control']"));

        let l = Locator::xpath("//div[@id='${id}']/span[text()='${id}']");
        let filled = l.fill(&[("id", "x")]).unwrap();
        assert_eq!(filled.expression(), "//div[@id='x']/span[text()='x']");

        let err = l.fill(&[]).unwrap_err();
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_locator_string_keeps_prefix_when_needed() {
        let s: String = Locator::xpath("ancestor::div").into();
        assert_eq!(s, "xpath:ancestor::div");
        let s: String = Locator::xpath("//div").into();
        assert_eq!(s, "//div");
        let s: String = Locator::css(".a").into();
        assert_eq!(s, ".a");
    }

    #[test]
    fn test_base_table_is_complete() {
        let table = Locators::base().unwrap();
        table.validate().unwrap();
        assert_eq!(table.version, Version::new(1, 80, 0));
        assert_eq!(
            table.get("ModalDialog", "message").unwrap().expression(),
            ".dialog-message-text"
        );
    }

    #[test]
    fn test_last_row_sentinel_is_xpath() {
        let table = Locators::base().unwrap();
        assert_eq!(table.get("Input", "last_row").unwrap().kind(), "xpath");
    }

    #[test]
    fn test_for_version_applies_overrides_in_order() {
        let old = Locators::for_version("1.80.0").unwrap();
        let mid = Locators::for_version("1.85.1").unwrap();
        let new = Locators::for_version("1.90.0").unwrap();

        assert_eq!(
            old.get("ScmView", "input").unwrap().expression(),
            ".scm-editor textarea"
        );
        assert_eq!(
            mid.get("ScmView", "input").unwrap().expression(),
            ".scm-input .monaco-editor textarea"
        );
        assert_eq!(
            mid.get("ModalDialog", "button").unwrap().expression(),
            ".dialog-buttons > .monaco-button"
        );
        assert_eq!(
            new.get("ModalDialog", "button").unwrap().expression(),
            ".dialog-buttons .monaco-text-button"
        );
        assert_eq!(new.version, Version::new(1, 90, 0));
    }

    #[test]
    fn test_for_version_rejects_older_releases() {
        let err = Locators::for_version("1.60.0").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(_)));
    }

    #[test]
    fn test_latest_uses_newest_override() {
        let table = Locators::latest().unwrap();
        assert_eq!(table.version, Version::new(1, 86, 0));
    }

    #[test]
    fn test_unknown_locator() {
        let table = Locators::base().unwrap();
        let err = table.get("ModalDialog", "nope").unwrap_err();
        assert!(err.to_string().contains("ModalDialog.nope"));
    }

    #[test]
    fn test_parse_rejects_empty_selector() {
        let yaml = r#"
version: "1.90.0"
sections:
  ModalDialog:
    message: ""
"#;
        let err = Locators::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("ModalDialog.message"));
    }

    #[test]
    fn test_partial_table_fails_validation() {
        let yaml = r#"
version: "1.90.0"
sections:
  ModalDialog:
    message: ".msg"
"#;
        let table = Locators::parse(yaml).unwrap();
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("missing section"));
    }

    #[test]
    fn test_merge_user_table() {
        let mut table = Locators::base().unwrap();
        let user = Locators::parse(
            r#"
version: "1.95.0"
sections:
  DebugView:
    start: "xpath: //a[@aria-label='Start Debugging']"
"#,
        )
        .unwrap();
        table.merge(user);
        assert_eq!(table.version, Version::new(1, 95, 0));
        assert_eq!(table.get("DebugView", "start").unwrap().kind(), "xpath");
        assert_eq!(
            table.get("DebugView", "view").unwrap().expression(),
            "div[id='workbench.view.debug']"
        );
    }

    #[test]
    fn test_yaml_round_trip_preserves_kinds() {
        let table = Locators::base().unwrap();
        let reparsed = Locators::parse(&table.to_yaml().unwrap()).unwrap();
        assert_eq!(table, reparsed);
    }

    #[test]
    fn test_load_bundled_file() {
        let table = Locators::load("locators/1.84.yaml").unwrap();
        assert_eq!(table.version, Version::new(1, 84, 0));
        assert!(table.sections().any(|s| s == "ScmView"));
    }
}
