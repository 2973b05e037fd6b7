//! [`Driver`] over an `eoka::Page`.
//!
//! Matched nodes are tagged with a `data-vscpo` attribute so later calls can
//! address them with a plain CSS selector, which is also what eoka's click and
//! fill primitives take.

use eoka::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{Driver, Element};
use crate::locators::Locator;
use crate::{Error, Result};

const REF_ATTR: &str = "data-vscpo";

/// Find elements under a scope and tag them. Returns JSON.
const FIND_JS: &str = r#"
((scope, kind, expr) => {
    const ATTR = 'data-vscpo';
    let root = document;
    if (scope !== null) {
        root = document.querySelector('[' + ATTR + '="' + scope + '"]');
        if (!root) return JSON.stringify({ stale: true, ids: [] });
    }

    let found = [];
    if (kind === 'css') {
        found = Array.from(root.querySelectorAll(expr));
    } else {
        const snap = document.evaluate(expr, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        for (let i = 0; i < snap.snapshotLength; i++) found.push(snap.snapshotItem(i));
    }

    const ids = found
        .filter(n => n.nodeType === 1)
        .map(el => {
            if (!el.hasAttribute(ATTR)) {
                window.__vscpo_next = (window.__vscpo_next || 0) + 1;
                el.setAttribute(ATTR, String(window.__vscpo_next));
            }
            return el.getAttribute(ATTR);
        });
    return JSON.stringify({ stale: false, ids });
})
"#;

/// Read or poke a tagged element. Returns JSON.
const ELEMENT_JS: &str = r#"
((id, op, arg) => {
    const el = document.querySelector('[data-vscpo="' + id + '"]');
    if (!el) return JSON.stringify({ stale: true, value: null });

    let value = null;
    switch (op) {
        case 'text':
            value = (el.innerText ?? el.textContent ?? '').trim();
            break;
        case 'attribute':
            value = el.getAttribute(arg);
            break;
        case 'displayed': {
            const r = el.getBoundingClientRect();
            const s = getComputedStyle(el);
            value = r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';
            break;
        }
        case 'value':
            value = el.value ?? '';
            break;
        case 'focus':
            el.focus();
            value = true;
            break;
        case 'options':
            value = el.options ? Array.from(el.options).map(o => o.text) : [];
            break;
        case 'selected': {
            const o = el.options && el.options[el.selectedIndex];
            value = o ? o.text : null;
            break;
        }
        case 'select': {
            const o = el.options ? Array.from(el.options).find(o => o.text === arg || o.value === arg) : null;
            if (o) {
                el.value = o.value;
                el.dispatchEvent(new Event('change', { bubbles: true }));
            }
            value = !!o;
            break;
        }
    }
    return JSON.stringify({ stale: false, value });
})
"#;

#[derive(Deserialize)]
struct FindResult {
    stale: bool,
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct OpResult {
    stale: bool,
    #[serde(default)]
    value: serde_json::Value,
}

/// Drives a page through eoka's CDP session.
pub struct EokaDriver<'a> {
    page: &'a Page,
}

impl<'a> EokaDriver<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// Get a reference to the underlying Page.
    pub fn page(&self) -> &Page {
        self.page
    }

    fn selector(element: &Element) -> String {
        format!("[{}=\"{}\"]", REF_ATTR, element.id())
    }

    async fn op<T: DeserializeOwned>(&self, element: &Element, op: &str, arg: &str) -> Result<T> {
        let js = format!(
            "{}({},{},{})",
            ELEMENT_JS,
            js_str(element.id()),
            js_str(op),
            js_str(arg)
        );
        let json_str: String = self.page.evaluate(&js).await?;
        let result: OpResult = serde_json::from_str(&json_str)
            .map_err(|e| Error::Script(format!("{} parse error: {}", op, e)))?;
        if result.stale {
            return Err(Error::StaleElement(element.to_string()));
        }
        serde_json::from_value(result.value)
            .map_err(|e| Error::Script(format!("{} returned unexpected value: {}", op, e)))
    }
}

fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

impl Driver for EokaDriver<'_> {
    async fn find_all(&self, scope: Option<&Element>, locator: &Locator) -> Result<Vec<Element>> {
        let scope_arg = scope.map_or_else(|| "null".to_string(), |el| js_str(el.id()));
        let js = format!(
            "{}({},{},{})",
            FIND_JS,
            scope_arg,
            js_str(locator.kind()),
            js_str(locator.expression())
        );
        let json_str: String = self.page.evaluate(&js).await?;
        let result: FindResult = serde_json::from_str(&json_str)
            .map_err(|e| Error::Script(format!("find parse error: {}", e)))?;
        if result.stale {
            let scope = scope.map(|el| el.to_string()).unwrap_or_default();
            return Err(Error::StaleElement(scope));
        }
        debug!("{} matched {} element(s)", locator, result.ids.len());
        Ok(result.ids.into_iter().map(Element::new).collect())
    }

    async fn text(&self, element: &Element) -> Result<String> {
        self.op(element, "text", "").await
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        self.op(element, "attribute", name).await
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        self.op(element, "displayed", "").await
    }

    async fn click(&self, element: &Element) -> Result<()> {
        self.page.click(&Self::selector(element)).await?;
        Ok(())
    }

    async fn focus(&self, element: &Element) -> Result<()> {
        let _: bool = self.op(element, "focus", "").await?;
        Ok(())
    }

    async fn set_value(&self, element: &Element, value: &str) -> Result<()> {
        self.page.fill(&Self::selector(element), value).await?;
        Ok(())
    }

    async fn value(&self, element: &Element) -> Result<String> {
        self.op(element, "value", "").await
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.page.human().press_key(key).await?;
        Ok(())
    }

    async fn options(&self, element: &Element) -> Result<Vec<String>> {
        self.op(element, "options", "").await
    }

    async fn selected_option(&self, element: &Element) -> Result<Option<String>> {
        self.op(element, "selected", "").await
    }

    async fn select_option(&self, element: &Element, label: &str) -> Result<bool> {
        self.op(element, "select", label).await
    }

    async fn pause(&self, ms: u64) {
        self.page.wait(ms).await;
    }
}
