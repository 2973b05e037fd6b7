//! In-memory DOM used by the unit tests.
//!
//! Nodes do not parse selectors: each node lists the locator expressions it
//! answers to, and `find_all` matches on those strings. Tag a node with
//! `.is(section, name)` to make it match that entry of the locator table.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use super::{Driver, Element};
use crate::locators::{Locator, Locators};
use crate::{Error, Result};

pub(crate) type NodeId = usize;

type KeyHook = Box<dyn FnMut(&str, &mut Vec<Node>)>;
type ClickHook = Box<dyn FnMut(&mut Vec<Node>)>;

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub parent: Option<NodeId>,
    pub matches: Vec<String>,
    pub text: String,
    pub attrs: BTreeMap<String, String>,
    pub value: String,
    pub displayed: bool,
    pub attached: bool,
    pub options: Vec<String>,
    pub selected: Option<usize>,
}

#[derive(Default)]
struct State {
    nodes: Vec<Node>,
    clicks: Vec<NodeId>,
    keys: Vec<String>,
    focused: Option<NodeId>,
    key_hook: Option<KeyHook>,
    click_hooks: HashMap<NodeId, ClickHook>,
}

pub(crate) struct FakeDom {
    locators: Locators,
    state: RefCell<State>,
}

pub(crate) struct NodeBuilder<'d> {
    dom: &'d FakeDom,
    id: NodeId,
}

impl NodeBuilder<'_> {
    fn edit(self, f: impl FnOnce(&mut Node)) -> Self {
        f(&mut self.dom.state.borrow_mut().nodes[self.id]);
        self
    }

    /// Match the locator table entry `section.name`.
    pub fn is(self, section: &str, name: &str) -> Self {
        let expr = self.dom.expr(section, name);
        self.edit(|n| n.matches.push(expr))
    }

    /// Match a literal selector expression (filled templates).
    pub fn matching(self, expr: &str) -> Self {
        let expr = expr.to_string();
        self.edit(|n| n.matches.push(expr))
    }

    pub fn text(self, text: &str) -> Self {
        self.edit(|n| n.text = text.to_string())
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.edit(|n| {
            n.attrs.insert(name.to_string(), value.to_string());
        })
    }

    pub fn value(self, value: &str) -> Self {
        self.edit(|n| n.value = value.to_string())
    }

    pub fn hidden(self) -> Self {
        self.edit(|n| n.displayed = false)
    }

    pub fn detached(self) -> Self {
        self.edit(|n| n.attached = false)
    }

    pub fn options(self, options: &[&str], selected: Option<usize>) -> Self {
        self.edit(|n| {
            n.options = options.iter().map(|o| o.to_string()).collect();
            n.selected = selected;
        })
    }

    pub fn id(self) -> NodeId {
        self.id
    }
}

impl FakeDom {
    pub fn new(locators: Locators) -> Self {
        Self {
            locators,
            state: RefCell::new(State::default()),
        }
    }

    pub fn locators(&self) -> &Locators {
        &self.locators
    }

    fn expr(&self, section: &str, name: &str) -> String {
        self.locators
            .get(section, name)
            .map(|l| l.expression().to_string())
            .unwrap_or_else(|_| panic!("no locator {}.{}", section, name))
    }

    /// Add a node under `parent` (or at document level).
    pub fn add(&self, parent: Option<NodeId>) -> NodeBuilder<'_> {
        let mut state = self.state.borrow_mut();
        state.nodes.push(Node {
            parent,
            displayed: true,
            attached: true,
            ..Node::default()
        });
        NodeBuilder {
            dom: self,
            id: state.nodes.len() - 1,
        }
    }

    pub fn element(id: NodeId) -> Element {
        Element::new(id.to_string())
    }

    pub fn detach(&self, id: NodeId) {
        self.state.borrow_mut().nodes[id].attached = false;
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.state.borrow().nodes[id].clone()
    }

    pub fn clicks(&self) -> Vec<NodeId> {
        self.state.borrow().clicks.clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.borrow().keys.clone()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.state.borrow().focused
    }

    pub fn on_key(&self, hook: impl FnMut(&str, &mut Vec<Node>) + 'static) {
        self.state.borrow_mut().key_hook = Some(Box::new(hook));
    }

    pub fn on_click(&self, id: NodeId, hook: impl FnMut(&mut Vec<Node>) + 'static) {
        self.state.borrow_mut().click_hooks.insert(id, Box::new(hook));
    }

    fn live(nodes: &[Node], id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(i) = cur {
            if !nodes[i].attached {
                return false;
            }
            cur = nodes[i].parent;
        }
        true
    }

    fn descends_from(nodes: &[Node], id: NodeId, ancestor: NodeId) -> bool {
        let mut cur = nodes[id].parent;
        while let Some(i) = cur {
            if i == ancestor {
                return true;
            }
            cur = nodes[i].parent;
        }
        false
    }

    fn resolve(&self, element: &Element) -> Result<NodeId> {
        let state = self.state.borrow();
        match element.id().parse::<NodeId>() {
            Ok(id) if id < state.nodes.len() && Self::live(&state.nodes, id) => Ok(id),
            _ => Err(Error::StaleElement(element.to_string())),
        }
    }

    fn with_node<T>(&self, element: &Element, f: impl FnOnce(&mut Node) -> T) -> Result<T> {
        let id = self.resolve(element)?;
        Ok(f(&mut self.state.borrow_mut().nodes[id]))
    }
}

impl Driver for FakeDom {
    async fn find_all(&self, scope: Option<&Element>, locator: &Locator) -> Result<Vec<Element>> {
        let scope = scope.map(|el| self.resolve(el)).transpose()?;
        let state = self.state.borrow();
        let found = (0..state.nodes.len())
            .filter(|&id| Self::live(&state.nodes, id))
            .filter(|&id| scope.map_or(true, |s| Self::descends_from(&state.nodes, id, s)))
            .filter(|&id| {
                state.nodes[id]
                    .matches
                    .iter()
                    .any(|m| m == locator.expression())
            })
            .map(Self::element)
            .collect();
        Ok(found)
    }

    async fn text(&self, element: &Element) -> Result<String> {
        self.with_node(element, |n| n.text.trim().to_string())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        self.with_node(element, |n| n.attrs.get(name).cloned())
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        self.with_node(element, |n| n.displayed)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        let id = self.resolve(element)?;
        let mut state = self.state.borrow_mut();
        state.clicks.push(id);
        let State {
            nodes, click_hooks, ..
        } = &mut *state;
        if let Some(hook) = click_hooks.get_mut(&id) {
            hook(nodes);
        }
        Ok(())
    }

    async fn focus(&self, element: &Element) -> Result<()> {
        let id = self.resolve(element)?;
        self.state.borrow_mut().focused = Some(id);
        Ok(())
    }

    async fn set_value(&self, element: &Element, value: &str) -> Result<()> {
        let id = self.resolve(element)?;
        let mut state = self.state.borrow_mut();
        state.nodes[id].value = value.to_string();
        state.focused = Some(id);
        Ok(())
    }

    async fn value(&self, element: &Element) -> Result<String> {
        self.with_node(element, |n| n.value.clone())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.keys.push(key.to_string());
        let State {
            nodes, key_hook, ..
        } = &mut *state;
        if let Some(hook) = key_hook.as_mut() {
            hook(key, nodes);
        }
        Ok(())
    }

    async fn options(&self, element: &Element) -> Result<Vec<String>> {
        self.with_node(element, |n| n.options.clone())
    }

    async fn selected_option(&self, element: &Element) -> Result<Option<String>> {
        self.with_node(element, |n| n.selected.and_then(|i| n.options.get(i).cloned()))
    }

    async fn select_option(&self, element: &Element, label: &str) -> Result<bool> {
        self.with_node(element, |n| match n.options.iter().position(|o| o == label) {
            Some(i) => {
                n.selected = Some(i);
                true
            }
            None => false,
        })
    }

    async fn pause(&self, _ms: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom() -> FakeDom {
        FakeDom::new(Locators::base().unwrap())
    }

    #[tokio::test]
    async fn find_all_respects_scope_and_detachment() {
        let dom = dom();
        let dialog = dom.add(None).is("ModalDialog", "dialog").id();
        let msg = dom.add(Some(dialog)).is("ModalDialog", "message").text("hi").id();
        dom.add(None).is("ModalDialog", "message").text("outside");

        let locator = dom.locators().get("ModalDialog", "message").unwrap().clone();
        let scoped = dom
            .find_all(Some(&FakeDom::element(dialog)), &locator)
            .await
            .unwrap();
        assert_eq!(scoped, vec![FakeDom::element(msg)]);

        let all = dom.find_all(None, &locator).await.unwrap();
        assert_eq!(all.len(), 2);

        dom.detach(dialog);
        let err = dom.text(&FakeDom::element(msg)).await.unwrap_err();
        assert!(matches!(err, Error::StaleElement(_)));
    }

    #[tokio::test]
    async fn key_hook_mutates_tree() {
        let dom = dom();
        let row = dom.add(None).is("Input", "row").detached().id();
        dom.on_key(move |key, nodes| {
            if key == "PageDown" {
                nodes[row].attached = true;
            }
        });
        dom.press_key("PageDown").await.unwrap();
        assert!(dom.node(row).attached);
        assert_eq!(dom.keys(), vec!["PageDown".to_string()]);
    }
}
