//! Arena-backed page document.
//!
//! Nodes are addressed by [`NodeId`]. Replacing a subtree frees the old nodes:
//! their slots are reused by later inserts, and the stale ids resolve to
//! nothing (`is_attached` is false, lookups return `None`, serializers yield
//! an empty string).

use crate::core::markup::{self, Element, Fragment, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// Load state of an `img` element, mirroring what a browser reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Loaded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    pub image: Option<ImageState>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(ElementData),
    Text(String),
    Raw(String),
}

#[derive(Debug, Clone)]
struct DomNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<DomNode>,
}

/// A class plus optional attribute constraint, e.g. `.tab[data-batch]` or
/// `.batch-section[data-batch="2023"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    class: Option<String>,
    attr: Option<(String, Option<String>)>,
}

impl Selector {
    pub fn class(class: &str) -> Self {
        Self {
            class: Some(class.to_string()),
            attr: None,
        }
    }

    pub fn has_attr(mut self, name: &str) -> Self {
        self.attr = Some((name.to_string(), None));
        self
    }

    pub fn attr_eq(mut self, name: &str, value: &str) -> Self {
        self.attr = Some((name.to_string(), Some(value.to_string())));
        self
    }

    fn matches(&self, el: &ElementData) -> bool {
        if let Some(class) = &self.class {
            if !el.classes.iter().any(|c| c == class) {
                return false;
            }
        }
        match &self.attr {
            None => true,
            Some((name, expected)) => {
                match el.attrs.iter().find(|(k, _)| k == name) {
                    None => false,
                    Some((_, actual)) => expected.as_ref().is_none_or(|e| e == actual),
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dom {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

impl Dom {
    /// A document whose root is `<tag>`.
    pub fn new(tag: &str) -> Self {
        let root = DomNode {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(element_data(&Element::new(tag))),
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)?
            .node
            .as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut DomNode> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?
            .node
            .as_mut()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Every live node hangs off the root; replaced subtrees are freed.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Element children only, in order.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| self.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Appends a fragment under `parent`; returns the ids of its top-level nodes.
    pub fn append_fragment(&mut self, parent: NodeId, fragment: &Fragment) -> Vec<NodeId> {
        if !self.is_attached(parent) {
            return Vec::new();
        }
        fragment
            .nodes
            .iter()
            .map(|node| self.insert(parent, node))
            .collect()
    }

    /// Frees every child of `parent` and attaches `fragment` in their place.
    pub fn replace_children(&mut self, parent: NodeId, fragment: &Fragment) -> Vec<NodeId> {
        let old = match self.node_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return Vec::new(),
        };
        for child in old {
            self.free_subtree(child);
        }
        self.append_fragment(parent, fragment)
    }

    fn insert(&mut self, parent: NodeId, node: &Node) -> NodeId {
        let data = match node {
            Node::Element(el) => NodeData::Element(element_data(el)),
            Node::Text(text) => NodeData::Text(text.clone()),
            Node::Raw(markup) => NodeData::Raw(markup.clone()),
        };
        let id = self.allocate(DomNode {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }

        if let Node::Element(el) = node {
            for child in &el.children {
                self.insert(id, child);
            }
        }
        id
    }

    fn allocate(&mut self, node: DomNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index) {
                slot.node = Some(node);
                return NodeId {
                    index,
                    generation: slot.generation,
                };
            }
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
    }

    /// Live descendants of `scope` matching `selector`, in document order.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        let Some(scope_node) = self.node(scope) else {
            return found;
        };
        let mut stack: Vec<NodeId> = scope_node.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if let NodeData::Element(el) = &node.data {
                if selector.matches(el) {
                    found.push(id);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        found
    }

    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => el.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)?
            .styles
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.styles.iter_mut().find(|(k, _)| k == property) {
                Some(slot) => slot.1 = value.to_string(),
                None => el.styles.push((property.to_string(), value.to_string())),
            }
        }
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.style(id, "display") == Some("none")
    }

    pub fn image_state(&self, id: NodeId) -> Option<&ImageState> {
        self.element(id)?.image.as_ref()
    }

    pub fn set_image_state(&mut self, id: NodeId, state: ImageState) {
        if let Some(el) = self.element_mut(id) {
            if el.image.is_some() {
                el.image = Some(state);
            }
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            match &node.data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element(_) => stack.extend(node.children.iter().rev().copied()),
                NodeData::Raw(_) => {}
            }
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, self.root);
        out
    }

    /// Serializes the children of `id` only.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            for child in &node.children {
                self.write(&mut out, *child);
            }
        }
        out
    }

    fn write(&self, out: &mut String, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(&markup::escape_text(text)),
            NodeData::Raw(raw) => out.push_str(raw),
            NodeData::Element(el) => {
                markup::write_open_tag(out, &el.tag, &el.classes, &el.attrs, &el.styles);
                if markup::is_void(&el.tag) {
                    return;
                }
                for child in &node.children {
                    self.write(out, *child);
                }
                markup::write_close_tag(out, &el.tag);
            }
        }
    }
}

fn element_data(el: &Element) -> ElementData {
    let image = if el.tag == "img" {
        // browsers report an img without a source as complete with no size
        if el.get_attr("src").is_none_or(|src| src.trim().is_empty()) {
            Some(ImageState::Failed)
        } else if el.get_attr("src").is_some_and(|src| src.starts_with("data:")) {
            Some(ImageState::Loaded)
        } else {
            Some(ImageState::Pending)
        }
    } else {
        None
    };

    ElementData {
        tag: el.tag.clone(),
        classes: el.classes.clone(),
        attrs: el.attrs.clone(),
        styles: Vec::new(),
        image,
    }
}
