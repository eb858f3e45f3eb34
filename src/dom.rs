use std::collections::{HashMap, HashSet};

use crate::core_dom_utils::{
    class_tokens, has_class, js_prop_to_css_name, parse_style_declarations, set_class_attr,
    serialize_style_declarations,
};
use crate::host::Rect;
use crate::html::{escape_attr, escape_text, is_void_tag};
use crate::selector::{
    SelectorAttrCondition, SelectorCombinator, SelectorPart, SelectorStep, parse_selector_groups,
};
use crate::{Error, Result};

// Text metrics used when no box has been assigned to an attached element.
const ESTIMATED_CHARS_PER_LINE: usize = 28;
const ESTIMATED_LINE_HEIGHT: f64 = 16.0;
const ESTIMATED_VERTICAL_PADDING: f64 = 16.0;

/// Handle to a node of a [`Page`](crate::Page) document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) rect: Option<Rect>,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let element = Element {
            tag_name,
            attrs,
            value,
            rect: None,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.entry(id_attr).or_insert(id);
        }
        id
    }

    pub(crate) fn create_detached_element(&mut self, tag_name: &str) -> NodeId {
        let element = Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: HashMap::new(),
            value: String::new(),
            rect: None,
        };
        self.create_node(None, NodeType::Element(element))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn is_valid_node(&self, node_id: NodeId) -> bool {
        node_id.0 < self.nodes.len()
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn expect_element(&self, node_id: NodeId, what: &str) -> Result<&Element> {
        self.element(node_id)
            .ok_or_else(|| Error::Dom(format!("{what} target is not an element")))
    }

    fn expect_element_mut(&mut self, node_id: NodeId, what: &str) -> Result<&mut Element> {
        self.element_mut(node_id)
            .ok_or_else(|| Error::Dom(format!("{what} target is not an element")))
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0)?.parent
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(&name.to_ascii_lowercase()).cloned())
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let element = self.expect_element_mut(node_id, "setAttribute")?;
        element.attrs.insert(name.clone(), value.to_string());
        if name == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        let Some(node) = self.nodes.get(node_id.0) else {
            return String::new();
        };
        match &node.node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &node.children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        self.expect_element(node_id, "textContent")?;
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        Ok(self.expect_element(node_id, "value")?.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self
            .tag_name(node_id)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("select"))
        {
            return self.set_select_value(node_id, value);
        }

        let element = self.expect_element_mut(node_id, "value")?;
        element.value = value.to_string();
        Ok(())
    }

    fn option_value(&self, option: NodeId) -> String {
        self.attr(option, "value")
            .unwrap_or_else(|| self.text_content(option).trim().to_string())
    }

    fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.collect_elements_descendants_dfs(select, &mut all);
        all.into_iter()
            .filter(|node| self.tag_name(*node) == Some("option"))
            .collect()
    }

    fn set_select_value(&mut self, select: NodeId, value: &str) -> Result<()> {
        let options = self.select_options(select);
        let chosen = options
            .iter()
            .copied()
            .find(|option| self.option_value(*option) == value);
        for option in &options {
            if let Some(element) = self.element_mut(*option) {
                if Some(*option) == chosen {
                    element.attrs.insert("selected".to_string(), String::new());
                } else {
                    element.attrs.remove("selected");
                }
            }
        }
        let element = self.expect_element_mut(select, "value")?;
        element.value = if chosen.is_some() {
            value.to_string()
        } else {
            String::new()
        };
        Ok(())
    }

    pub(crate) fn initialize_form_control_values(&mut self) {
        for node in self.all_element_nodes() {
            match self.tag_name(node) {
                Some("textarea") => {
                    let text = self.text_content(node);
                    if let Some(element) = self.element_mut(node) {
                        element.value = text;
                    }
                }
                Some("select") => {
                    let options = self.select_options(node);
                    let selected = options
                        .iter()
                        .copied()
                        .find(|option| self.attr(*option, "selected").is_some())
                        .or_else(|| options.first().copied());
                    let value = selected
                        .map(|option| self.option_value(option))
                        .unwrap_or_default();
                    if let Some(element) = self.element_mut(node) {
                        element.value = value;
                    }
                }
                _ => {}
            }
        }
    }

    fn can_have_children(&self, node_id: NodeId) -> bool {
        matches!(
            self.nodes.get(node_id.0).map(|node| &node.node_type),
            Some(NodeType::Document | NodeType::Element(_))
        )
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.can_have_children(parent) {
            return Err(Error::Dom("appendChild target cannot have children".into()));
        }
        if child == self.root || child == parent {
            return Err(Error::Dom("invalid appendChild node".into()));
        }
        if !self.is_valid_node(child) {
            return Err(Error::Dom("appendChild node is invalid".into()));
        }

        // Prevent cycles: parent must not be inside child's subtree.
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::Dom("appendChild would create a cycle".into()));
            }
            cursor = self.parent(node);
        }

        if let Some(old_parent) = self.parent(child) {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(Error::Dom("removeChild target is not a direct child".into()));
        }
        self.nodes[parent.0].children.retain(|id| *id != child);
        self.nodes[child.0].parent = None;
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if node == self.root {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if let NodeType::Element(element) = &self.nodes[node.0].node_type {
                if let Some(id) = element.attrs.get("id") {
                    if !id.is_empty() {
                        next.entry(id.clone()).or_insert(node);
                    }
                }
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    pub(crate) fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.all_element_nodes()
            .into_iter()
            .find(|node| self.tag_name(*node) == Some(tag))
    }

    /// Guarantees `html > head + body`, moving stray top-level content into
    /// `body`. Fragments parsed without a document shell end up wrapped.
    pub(crate) fn ensure_document_shell(&mut self) -> Result<()> {
        let html = match self.first_by_tag("html") {
            Some(html) => html,
            None => {
                let html = self.create_detached_element("html");
                let stray = self.nodes[self.root.0].children.clone();
                self.append_child(self.root, html)?;
                for child in stray {
                    self.append_child(html, child)?;
                }
                html
            }
        };

        let head = match self.first_by_tag("head") {
            Some(head) => head,
            None => {
                let head = self.create_detached_element("head");
                self.append_child(html, head)?;
                self.nodes[html.0].children.retain(|id| *id != head);
                self.nodes[html.0].children.insert(0, head);
                head
            }
        };

        let body = match self.first_by_tag("body") {
            Some(body) => body,
            None => {
                let body = self.create_detached_element("body");
                self.append_child(html, body)?;
                body
            }
        };

        let stray = self.nodes[html.0]
            .children
            .iter()
            .copied()
            .filter(|child| *child != head && *child != body)
            .collect::<Vec<_>>();
        for child in stray {
            self.append_child(body, child)?;
        }
        Ok(())
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let element = self.expect_element(node_id, "classList")?;
        Ok(has_class(element, class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.expect_element_mut(node_id, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn style_get(&self, node_id: NodeId, key: &str) -> Result<String> {
        let element = self.expect_element(node_id, "style")?;
        let name = js_prop_to_css_name(key);
        let decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        Ok(decls
            .iter()
            .find(|(prop, _)| prop == &name)
            .map(|(_, value)| value.clone())
            .unwrap_or_default())
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, key: &str, value: &str) -> Result<()> {
        let name = js_prop_to_css_name(key);
        let element = self.expect_element_mut(node_id, "style")?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == &name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name, value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }

        Ok(())
    }

    pub(crate) fn set_rect(&mut self, node_id: NodeId, rect: Rect) -> Result<()> {
        self.expect_element_mut(node_id, "layout")?.rect = Some(rect);
        Ok(())
    }

    pub(crate) fn bounding_rect(&self, node_id: NodeId) -> Result<Rect> {
        let element = self.expect_element(node_id, "getBoundingClientRect")?;
        if !self.is_connected(node_id) {
            return Ok(Rect::default());
        }
        Ok(element.rect.unwrap_or_else(|| Rect {
            height: self.estimated_height(node_id),
            ..Rect::default()
        }))
    }

    /// Detached elements have no rendered size, matching browsers.
    pub(crate) fn offset_height(&self, node_id: NodeId) -> Result<f64> {
        let element = self.expect_element(node_id, "offsetHeight")?;
        if !self.is_connected(node_id) {
            return Ok(0.0);
        }
        Ok(element
            .rect
            .map(|rect| rect.height)
            .unwrap_or_else(|| self.estimated_height(node_id)))
    }

    fn estimated_height(&self, node_id: NodeId) -> f64 {
        let text = self.text_content(node_id);
        let lines = text
            .split('\n')
            .map(|line| {
                let chars = line.chars().count();
                chars.div_ceil(ESTIMATED_CHARS_PER_LINE).max(1)
            })
            .sum::<usize>();
        lines as f64 * ESTIMATED_LINE_HEIGHT + ESTIMATED_VERTICAL_PADDING
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in self.all_element_nodes() {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        Ok(matched)
    }

    fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        let Some(last) = steps.last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }

        let mut current = node_id;
        for idx in (1..steps.len()).rev() {
            let prev_step = &steps[idx - 1].step;
            let combinator = steps[idx]
                .combinator
                .unwrap_or(SelectorCombinator::Descendant);

            let matched = match combinator {
                SelectorCombinator::Child => self
                    .parent(current)
                    .filter(|parent| self.matches_step(*parent, prev_step)),
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent(current);
                    let mut found = None;
                    while let Some(parent) = cursor {
                        if self.matches_step(parent, prev_step) {
                            found = Some(parent);
                            break;
                        }
                        cursor = self.parent(parent);
                    }
                    found
                }
            };

            let Some(matched) = matched else {
                return false;
            };
            current = matched;
        }

        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !has_class(element, class_name))
        {
            return false;
        }

        step.attrs.iter().all(|cond| {
            let actual = element.attrs.get(cond.key());
            match cond {
                SelectorAttrCondition::Exists { .. } => actual.is_some(),
                SelectorAttrCondition::Eq { value, .. } => actual == Some(value),
                SelectorAttrCondition::StartsWith { value, .. } => {
                    actual.is_some_and(|actual| !value.is_empty() && actual.starts_with(value))
                }
                SelectorAttrCondition::EndsWith { value, .. } => {
                    actual.is_some_and(|actual| !value.is_empty() && actual.ends_with(value))
                }
                SelectorAttrCondition::Contains { value, .. } => {
                    actual.is_some_and(|actual| !value.is_empty() && actual.contains(value))
                }
                SelectorAttrCondition::Includes { value, .. } => actual.is_some_and(|actual| {
                    actual.split_ascii_whitespace().any(|token| token == value)
                }),
                SelectorAttrCondition::DashMatch { value, .. } => actual.is_some_and(|actual| {
                    actual == value || actual.starts_with(&format!("{value}-"))
                }),
            }
        })
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        let Some(node) = self.nodes.get(node_id.0) else {
            return String::new();
        };
        match &node.node_type {
            NodeType::Document => node
                .children
                .iter()
                .map(|child| self.dump_node(*child))
                .collect(),
            NodeType::Text(text) => escape_text(text),
            NodeType::Element(element) => {
                let mut out = format!("<{}", element.tag_name);
                let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                attrs.sort_by(|a, b| a.0.cmp(b.0));
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
                }
                out.push('>');
                if is_void_tag(&element.tag_name) {
                    return out;
                }
                for child in &node.children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str(&format!("</{}>", element.tag_name));
                out
            }
        }
    }
}
