// crates/branchmap-core/src/render.rs

//! Declarative view tree.
//!
//! [`render`] is a pure function from selector state to a [`ViewTree`].
//! Frontends turn the tree into DOM (wasm) or text (CLI) and bind each
//! node's [`Action`] to a listener that calls back into the selector.

use crate::config::{NonOperationalPolicy, SelectorConfig};
use crate::geometry::MapLayer;
use crate::model::{Dataset, Region};
use crate::selector::{filter_branches, GeometryState, Notice, SelectionState, View};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LOADING_TEXT: &str = "Loading interactive map...";
pub const LOAD_ERROR_TITLE: &str = "Unable to load the map";
pub const RETRY_LABEL: &str = "Retry";
pub const BACK_LABEL: &str = "← Back to overview";
pub const SEARCH_PLACEHOLDER: &str = "Search by branch name...";
pub const NO_RESULTS_TEXT: &str = "No branches found";
pub const NO_RESULTS_HINT: &str = "Try a different search term";
pub const MAP_HINT: &str = "Click a highlighted region to view its branches";

/// What a node does when the user interacts with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    SelectRegion { region: String },
    SelectBranch { region: String, branch: String },
    Back,
    /// Input events on the search box; the payload is the input's value.
    Filter,
    Retry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text { text: String },
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            ..Self::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_owned(), value.into());
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::text(text))
    }

    pub fn on(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text { .. } => None,
        }
    }

    /// Pre-order walk over every element.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(self, &mut out);
        out
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text { text } => text.clone(),
            Node::Element(e) => e.text_content(),
        }
    }

    /// Serialize as HTML/SVG markup. Actions are emitted as `data-action`.
    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text { text } => escape_into(text, out),
            Node::Element(e) => {
                out.push('<');
                out.push_str(&e.tag);
                if !e.classes.is_empty() {
                    out.push_str(" class=\"");
                    escape_into(&e.classes.join(" "), out);
                    out.push('"');
                }
                for (k, v) in &e.attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    escape_into(v, out);
                    out.push('"');
                }
                if let Some(action) = &e.action {
                    out.push_str(" data-action=\"");
                    escape_into(action.kind(), out);
                    out.push('"');
                }
                if is_void(&e.tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for c in &e.children {
                    c.write_html(out);
                }
                out.push_str("</");
                out.push_str(&e.tag);
                out.push('>');
            }
        }
    }
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SelectRegion { .. } => "select_region",
            Action::SelectBranch { .. } => "select_branch",
            Action::Back => "back",
            Action::Filter => "filter",
            Action::Retry => "retry",
        }
    }
}

fn collect_elements<'a>(node: &'a Node, out: &mut Vec<&'a Element>) {
    if let Node::Element(e) = node {
        out.push(e);
        for c in &e.children {
            collect_elements(c, out);
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "img")
}

fn escape_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// The rendered view. Serializes as its root node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewTree {
    pub root: Node,
}

impl ViewTree {
    pub fn elements(&self) -> Vec<&Element> {
        self.root.elements()
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.elements()
            .into_iter()
            .filter(|e| e.has_class(class))
            .collect()
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.elements().into_iter().filter(|e| e.tag == tag).collect()
    }

    pub fn text_content(&self) -> String {
        self.root.text_content()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.write_html(&mut out);
        out
    }
}

/// Everything [`render`] reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub state: &'a SelectionState,
    pub dataset: &'a Dataset,
    pub geometry: &'a GeometryState,
    pub config: &'a SelectorConfig,
}

pub fn render(input: &RenderInput<'_>) -> ViewTree {
    let detail = match input.state.view() {
        View::RegionDetail => input
            .state
            .selected_region()
            .and_then(|name| input.dataset.region(name))
            .map(|region| region_detail(input, region)),
        View::Overview => None,
    };

    let root = detail.unwrap_or_else(|| match input.geometry {
        GeometryState::Loading => loading(),
        GeometryState::Failed(message) => failed(message),
        GeometryState::Ready(layer) => overview_map(input, layer),
        GeometryState::Idle => overview_list(input),
    });

    ViewTree { root: root.into() }
}

/// Hover text for a region.
pub fn tooltip_text(region: &Region) -> String {
    if region.is_operational() {
        format!(
            "{} branches available\nClick to view branches",
            region.branch_count()
        )
    } else {
        "No branches available".to_owned()
    }
}

fn shell(view: &str) -> Element {
    Element::new("div")
        .class("branchmap")
        .class(view)
        .attr("data-view", view)
}

fn loading() -> Element {
    shell("loading").child(Element::new("div").class("status").text(LOADING_TEXT))
}

fn failed(message: &str) -> Element {
    shell("failed").child(
        Element::new("div")
            .class("load-error")
            .child(Element::new("p").class("error-title").text(LOAD_ERROR_TITLE))
            .child(Element::new("p").class("error-detail").text(message))
            .child(
                Element::new("button")
                    .class("retry")
                    .attr("type", "button")
                    .text(RETRY_LABEL)
                    .on(Action::Retry),
            ),
    )
}

fn notice(input: &RenderInput<'_>) -> Option<Element> {
    if input.config.non_operational != NonOperationalPolicy::Notice {
        return None;
    }
    match input.state.notice()? {
        Notice::NoBranches { region } => Some(
            Element::new("div")
                .class("notice")
                .attr("role", "status")
                .text(format!("{region}: No branches available")),
        ),
    }
}

fn region_classes(el: Element, region: Option<&Region>) -> Element {
    let operational = region.is_some_and(Region::is_operational);
    el.class("region")
        .class(if operational { "operational" } else { "disabled" })
}

fn overview_map(input: &RenderInput<'_>, layer: &MapLayer) -> Element {
    let mut paths = Element::new("g").class("regions");
    let mut labels = Element::new("g").class("labels");

    for shape in &layer.shapes {
        let region = input.dataset.region(&shape.name);
        let title = region
            .map(tooltip_text)
            .unwrap_or_else(|| "No branches available".to_owned());
        let path = Element::new("path")
            .attr("d", shape.path.clone())
            .attr("data-region", shape.name.clone())
            .child(Element::new("title").text(format!("{}\n{title}", shape.name)))
            .on(Action::SelectRegion {
                region: shape.name.clone(),
            });
        paths = paths.child(region_classes(path, region));

        if let (Some(region), Some([cx, cy])) = (region, shape.centroid) {
            if region.is_operational() {
                let off = input.config.label_offset(region.name());
                labels = labels.child(
                    Element::new("text")
                        .class("region-label")
                        .attr("x", format!("{:.2}", cx + off.dx))
                        .attr("y", format!("{:.2}", cy + off.dy))
                        .attr("text-anchor", "middle")
                        .text(region.name()),
                );
            }
        }
    }

    let svg = Element::new("svg")
        .class("region-map")
        .attr("width", fmt_num(layer.width))
        .attr("height", fmt_num(layer.height))
        .attr("viewBox", format!("0 0 {} {}", fmt_num(layer.width), fmt_num(layer.height)))
        .child(paths)
        .child(labels);

    let mut root = shell("overview").child(svg);
    if let Some(n) = notice(input) {
        root = root.child(n);
    }
    root.child(Element::new("p").class("map-hint").text(MAP_HINT))
}

/// Overview without geometry: one button per region.
fn overview_list(input: &RenderInput<'_>) -> Element {
    let items = input.dataset.regions().iter().map(|region| {
        let button = Element::new("button")
            .attr("type", "button")
            .attr("data-region", region.name())
            .attr("title", tooltip_text(region))
            .text(region.name())
            .on(Action::SelectRegion {
                region: region.name().to_owned(),
            });
        Element::new("li").child(region_classes(button, Some(region)))
    });

    let mut root = shell("overview").child(Element::new("ul").class("region-list").children(items));
    if let Some(n) = notice(input) {
        root = root.child(n);
    }
    root
}

fn region_detail(input: &RenderInput<'_>, region: &Region) -> Element {
    let branches = input.dataset.branches_for_region(region);
    let outcome = filter_branches(branches, input.state.filter());
    let selected = input.state.selected_branch();

    let header = Element::new("header")
        .class("region-header")
        .child(Element::new("h3").class("region-title").text(region.name()))
        .child(
            Element::new("p")
                .class("branch-total")
                .child(Element::new("strong").text(branches.len().to_string()))
                .text(" branches available • Select your nearest location"),
        );

    let search = Element::new("input")
        .class("branch-search")
        .attr("type", "text")
        .attr("placeholder", SEARCH_PLACEHOLDER)
        .attr("value", input.state.filter())
        .on(Action::Filter);

    let mut count = Element::new("div").class("branch-count");
    if outcome.is_empty() {
        count = count.class("empty");
    }
    let count = count.text(outcome.summary());

    let listing = if outcome.is_empty() {
        Element::new("div")
            .class("no-results")
            .child(Element::new("p").class("no-results-title").text(NO_RESULTS_TEXT))
            .child(Element::new("p").class("no-results-hint").text(NO_RESULTS_HINT))
    } else {
        let cards = outcome.visible.iter().map(|branch| {
            let is_selected = selected == Some(branch.name());
            let mut card = Element::new("div").class("branch-card");
            if is_selected {
                card = card.class("selected");
            }
            card.attr("data-branch-name", branch.name().to_lowercase())
                .attr("title", branch.address())
                .child(
                    Element::new("div")
                        .class("branch-icon")
                        .text(if is_selected { "✓" } else { "🏢" }),
                )
                .child(Element::new("div").class("branch-name").text(branch.name()))
                .on(Action::SelectBranch {
                    region: region.name().to_owned(),
                    branch: branch.name().to_owned(),
                })
        });
        Element::new("div").class("branch-grid").children(cards)
    };

    shell("region-detail")
        .attr("data-region", region.name())
        .child(
            Element::new("button")
                .class("back")
                .attr("type", "button")
                .text(BACK_LABEL)
                .on(Action::Back),
        )
        .child(header)
        .child(search)
        .child(count)
        .child(listing)
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escapes_and_closes_void_tags() {
        let node: Node = Element::new("div")
            .class("a")
            .attr("title", "x\"y")
            .child(Element::new("input").attr("value", "<b>"))
            .text("A & B")
            .into();
        let mut html = String::new();
        node.write_html(&mut html);
        assert_eq!(
            html,
            r#"<div class="a" title="x&quot;y"><input value="&lt;b&gt;" />A &amp; B</div>"#
        );
    }

    #[test]
    fn text_content_concatenates() {
        let node: Node = Element::new("p")
            .child(Element::new("strong").text("7"))
            .text(" branches")
            .into();
        assert_eq!(node.text_content(), "7 branches");
    }

    #[test]
    fn actions_serialize_tagged() {
        let json = serde_json::to_value(Action::SelectBranch {
            region: "Goa".into(),
            branch: "Panaji".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "select_branch");
        assert_eq!(json["branch"], "Panaji");
    }
}
