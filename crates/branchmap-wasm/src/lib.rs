//! branchmap-wasm: WebAssembly bindings for branchmap-core
//!
//! Mounts the region/branch selector into a DOM container. The selector
//! state machine, filtering and rendering all live in `branchmap-core`; this
//! crate only fetches the topology, turns the view tree into DOM nodes and
//! wires listeners back to the instance.
//!
//! Quick start (browser)
//! ---------------------
//! ```javascript
//! import init, { BranchSelector } from 'branchmap-wasm';
//!
//! await init();
//! const selector = new BranchSelector('map-container', {
//!   width: 600,
//!   height: 600,
//!   geometryBase: '/js/topojsons',
//!   onRegionSelect: (region) => console.log('region', region),
//!   onBranchSelect: (region, branch, address) => fillForm(region, branch, address),
//! });
//! try {
//!   await selector.initialize();
//! } catch (e) {
//!   // the container already shows the retry control
//! }
//! console.log(selector.getSelection()); // { region: null, branch: null }
//! ```
//!
//! Notes
//! -----
//! - Every instance is independent; listeners hold a weak handle to their
//!   own instance, so there is no global object.
//! - Host callbacks run after the selector has finished its transition, so
//!   they may call back into the instance (e.g. `getSelection()`).
//! - `destroy()` drops late geometry responses and detaches all listeners.

use branchmap_core::render::{Action, Node};
use branchmap_core::{
    Dataset, HostEvent, LabelOffset, LoadOutcome, NonOperationalPolicy, Outcome, RecordingHost,
    Selector, SelectorConfig, SelectorError,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/* --------------------------------------------------------------------------
   Instance state
-------------------------------------------------------------------------- */

#[derive(Default, Clone)]
struct JsCallbacks {
    on_region: Option<js_sys::Function>,
    on_branch: Option<js_sys::Function>,
    on_reset: Option<js_sys::Function>,
}

type Listener = Closure<dyn FnMut(web_sys::Event)>;

struct Inner {
    selector: Selector<RecordingHost>,
    callbacks: JsCallbacks,
    container: web_sys::Element,
    listeners: Vec<Listener>,
    // Listeners of earlier renders. One of them may still be on the stack
    // when a host callback re-renders, so they are only dropped once the
    // outermost dispatch has returned.
    retired: Vec<Listener>,
    // Listener invocations currently on the stack.
    dispatching: u32,
}

type Shared = Rc<RefCell<Inner>>;

/// A selector mounted into one DOM container.
#[wasm_bindgen]
pub struct BranchSelector {
    inner: Shared,
}

#[wasm_bindgen]
impl BranchSelector {
    /// Create a selector inside the element with id `container_id`.
    ///
    /// `options` keys (all optional): `width`, `height`, `geometryBase`,
    /// `countryKey`, `topologyObject`, `nonOperational` (`"notice"` |
    /// `"silent"`), `labelOffsets` (`{ region: { dx, dy } }`), `dataset`
    /// (either dataset JSON form), `onRegionSelect(region)`,
    /// `onBranchSelect(region, branch, address)`, `onViewReset()`.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, options: JsValue) -> Result<BranchSelector, JsValue> {
        let document = document()?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| js_error(format!("container #{container_id} not found")))?;

        let dataset = match get(&options, "dataset") {
            Some(value) => {
                let json: serde_json::Value =
                    serde_wasm_bindgen::from_value(value).map_err(js_error)?;
                Dataset::from_json_value(json).map_err(js_error)?
            }
            None => Dataset::load().map_err(js_error)?,
        };
        let config = config_from_options(&options)?;
        let callbacks = JsCallbacks {
            on_region: get_function(&options, "onRegionSelect"),
            on_branch: get_function(&options, "onBranchSelect"),
            on_reset: get_function(&options, "onViewReset"),
        };

        let stats = dataset.stats();
        web_sys::console::log_1(
            &format!(
                "branchmap: {} regions, {} operational",
                stats.regions, stats.operational_regions
            )
            .into(),
        );

        let inner = Inner {
            selector: Selector::new(dataset, config, RecordingHost::default()),
            callbacks,
            container,
            listeners: Vec::new(),
            retired: Vec::new(),
            dispatching: 0,
        };
        let shared = Rc::new(RefCell::new(inner));
        render(&shared)?;
        Ok(BranchSelector { inner: shared })
    }

    /// Reset to the overview and fetch the map. Resolves `true` once the map
    /// is drawn; rejects with the load error (the retry control is shown).
    pub fn initialize(&self) -> js_sys::Promise {
        let shared = Rc::clone(&self.inner);
        future_to_promise(async move {
            shared.borrow_mut().selector.reset_to_overview();
            flush_events(&shared);
            load_geometry(shared).await
        })
    }

    /// Re-run a failed map load.
    pub fn retry(&self) -> js_sys::Promise {
        let shared = Rc::clone(&self.inner);
        future_to_promise(async move {
            if !shared.borrow().selector.can_retry() {
                return Ok(JsValue::FALSE);
            }
            load_geometry(shared).await
        })
    }

    #[wasm_bindgen(js_name = resetToOverview)]
    pub fn reset_to_overview(&self) -> Result<(), JsValue> {
        apply(&self.inner, |s| s.reset_to_overview())?;
        Ok(())
    }

    /// `{ region, branch }`, `null` when unset.
    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Result<JsValue, JsValue> {
        let selection = self.inner.borrow().selector.selection();
        selection
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = selectRegion)]
    pub fn select_region(&self, region: &str) -> Result<bool, JsValue> {
        apply(&self.inner, |s| s.select_region(region))
    }

    #[wasm_bindgen(js_name = selectBranch)]
    pub fn select_branch(&self, region: &str, branch: &str) -> Result<bool, JsValue> {
        apply(&self.inner, |s| s.select_branch(region, branch))
    }

    #[wasm_bindgen(js_name = filterBranches)]
    pub fn filter_branches(&self, text: &str) -> Result<bool, JsValue> {
        apply(&self.inner, |s| s.filter_branches(text))
    }

    pub fn back(&self) -> Result<bool, JsValue> {
        apply(&self.inner, |s| s.back())
    }

    /// Hover text for a region, `undefined` for unknown names.
    pub fn tooltip(&self, region: &str) -> Option<String> {
        self.inner.borrow().selector.tooltip(region)
    }

    /// Current view as markup (debugging / server-side snapshots).
    #[wasm_bindgen(js_name = renderHtml)]
    pub fn render_html(&self) -> String {
        self.inner.borrow().selector.render().to_html()
    }

    /// Detach listeners, clear the container and drop late responses.
    pub fn destroy(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.selector.destroy();
        inner.selector.host_mut().events.clear();
        inner.container.set_inner_html("");
        let old = std::mem::take(&mut inner.listeners);
        inner.retired.extend(old);
    }
}

/* --------------------------------------------------------------------------
   Standalone queries over the bundled dataset
-------------------------------------------------------------------------- */

#[wasm_bindgen]
pub fn get_region_count() -> Result<usize, JsValue> {
    Ok(Dataset::bundled().map_err(js_error)?.regions().len())
}

#[wasm_bindgen]
pub fn get_operational_region_count() -> Result<usize, JsValue> {
    Ok(Dataset::bundled().map_err(js_error)?.stats().operational_regions)
}

#[wasm_bindgen]
pub fn region_tooltip(region: &str) -> Option<String> {
    let db = Dataset::bundled().ok()?;
    db.region(region).map(branchmap_core::render::tooltip_text)
}

/* --------------------------------------------------------------------------
   Transitions and callbacks
-------------------------------------------------------------------------- */

/// Run one transition, notify the host, then re-render if anything changed.
fn apply(
    shared: &Shared,
    f: impl FnOnce(&mut Selector<RecordingHost>) -> Outcome,
) -> Result<bool, JsValue> {
    let outcome = f(&mut shared.borrow_mut().selector);
    flush_events(shared);
    match &outcome {
        Outcome::Unchanged => {}
        // Declined region selections may surface a notice.
        Outcome::Changed | Outcome::Declined(_) => render(shared)?,
    }
    Ok(outcome.is_changed())
}

/// Deliver queued host events. Runs with no borrow held so callbacks may
/// re-enter the instance.
fn flush_events(shared: &Shared) {
    let (events, callbacks) = {
        let mut inner = shared.borrow_mut();
        let events = std::mem::take(&mut inner.selector.host_mut().events);
        (events, inner.callbacks.clone())
    };

    for event in events {
        let result = match event {
            HostEvent::RegionSelected { region } => callbacks
                .on_region
                .as_ref()
                .map(|f| f.call1(&JsValue::NULL, &region.into())),
            HostEvent::BranchSelected {
                region,
                branch,
                address,
            } => callbacks.on_branch.as_ref().map(|f| {
                f.call3(&JsValue::NULL, &region.into(), &branch.into(), &address.into())
            }),
            HostEvent::ViewReset => callbacks.on_reset.as_ref().map(|f| f.call0(&JsValue::NULL)),
        };
        if let Some(Err(e)) = result {
            web_sys::console::error_2(&"branchmap: host callback threw".into(), &e);
        }
    }
}

/* --------------------------------------------------------------------------
   Geometry fetch
-------------------------------------------------------------------------- */

async fn load_geometry(shared: Shared) -> Result<JsValue, JsValue> {
    let started = {
        let mut inner = shared.borrow_mut();
        let url = inner
            .selector
            .geometry_request()
            .path_under(&inner.selector.config().geometry_base);
        inner.selector.begin_geometry_load().map(|t| (t, url))
    };
    let Some((ticket, url)) = started else {
        return Ok(JsValue::FALSE);
    };
    render(&shared)?;

    let response = fetch_bytes(&url).await;
    let outcome = shared
        .borrow_mut()
        .selector
        .finish_geometry_load(ticket, response);

    match outcome {
        LoadOutcome::Applied => {
            render(&shared)?;
            Ok(JsValue::TRUE)
        }
        LoadOutcome::Failed(message) => {
            render(&shared)?;
            web_sys::console::error_1(&format!("branchmap: {message}").into());
            Err(js_error(message))
        }
        // Stale or destroyed: leave the surface alone.
        LoadOutcome::Discarded | LoadOutcome::Skipped => Ok(JsValue::FALSE),
    }
}

async fn fetch_bytes(url: &str) -> branchmap_core::Result<Vec<u8>> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| SelectorError::DatasetLoad(format!("fetch error: {e}")))?;

    if !resp.ok() {
        return Err(SelectorError::DatasetLoad(format!(
            "HTTP {} for {url}",
            resp.status()
        )));
    }

    resp.binary()
        .await
        .map_err(|e| SelectorError::DatasetLoad(format!("read error: {e}")))
}

/* --------------------------------------------------------------------------
   DOM mounting
-------------------------------------------------------------------------- */

struct Mount<'a> {
    document: &'a web_sys::Document,
    owner: Weak<RefCell<Inner>>,
    listeners: Vec<Listener>,
}

/// Replace the container's content with the current view tree.
fn render(shared: &Shared) -> Result<(), JsValue> {
    let (tree, container) = {
        let inner = shared.borrow();
        if inner.selector.is_destroyed() {
            return Ok(());
        }
        (inner.selector.render(), inner.container.clone())
    };

    let document = document()?;
    let focused_search = document
        .active_element()
        .is_some_and(|el| el.class_list().contains("branch-search"));

    let mut mount = Mount {
        document: &document,
        owner: Rc::downgrade(shared),
        listeners: Vec::new(),
    };
    container.set_inner_html("");
    mount_node(&mut mount, &tree.root, &container, false)?;

    if focused_search {
        refocus_search(&container);
    }

    let mut inner = shared.borrow_mut();
    let previous = std::mem::replace(&mut inner.listeners, mount.listeners);
    inner.retired.extend(previous);
    Ok(())
}

fn mount_node(
    m: &mut Mount<'_>,
    node: &Node,
    parent: &web_sys::Element,
    in_svg: bool,
) -> Result<(), JsValue> {
    let el = match node {
        Node::Text { text } => {
            parent.append_child(&m.document.create_text_node(text))?;
            return Ok(());
        }
        Node::Element(el) => el,
    };

    let in_svg = in_svg || el.tag == "svg";
    let dom = if in_svg {
        m.document.create_element_ns(Some(SVG_NS), &el.tag)?
    } else {
        m.document.create_element(&el.tag)?
    };

    if !el.classes.is_empty() {
        dom.set_attribute("class", &el.classes.join(" "))?;
    }
    for (k, v) in &el.attrs {
        dom.set_attribute(k, v)?;
    }
    if let Some(input) = dom.dyn_ref::<web_sys::HtmlInputElement>() {
        if let Some(value) = el.attrs.get("value") {
            input.set_value(value);
        }
    }
    if let Some(action) = &el.action {
        bind(m, &dom, action.clone())?;
    }

    for child in &el.children {
        mount_node(m, child, &dom, in_svg)?;
    }
    parent.append_child(&dom)?;
    Ok(())
}

fn bind(m: &mut Mount<'_>, target: &web_sys::Element, action: Action) -> Result<(), JsValue> {
    let owner = m.owner.clone();
    let event = if action == Action::Filter { "input" } else { "click" };

    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |e: web_sys::Event| {
        let Some(shared) = owner.upgrade() else {
            return;
        };
        shared.borrow_mut().dispatching += 1;
        if let Err(err) = dispatch(&shared, &action, &e) {
            web_sys::console::error_1(&err);
        }
        let retired = {
            let mut inner = shared.borrow_mut();
            inner.dispatching -= 1;
            if inner.dispatching == 0 {
                std::mem::take(&mut inner.retired)
            } else {
                Vec::new()
            }
        };
        // May include this listener; nothing captured is touched afterwards.
        drop(retired);
    });
    target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
    m.listeners.push(listener);
    Ok(())
}

fn dispatch(shared: &Shared, action: &Action, event: &web_sys::Event) -> Result<(), JsValue> {
    match action {
        Action::SelectRegion { region } => apply(shared, |s| s.select_region(region)).map(drop),
        Action::SelectBranch { region, branch } => {
            apply(shared, |s| s.select_branch(region, branch)).map(drop)
        }
        Action::Back => apply(shared, |s| s.back()).map(drop),
        Action::Filter => {
            let text = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            apply(shared, |s| s.filter_branches(&text)).map(drop)
        }
        Action::Retry => {
            let shared = Rc::clone(shared);
            spawn_local(async move {
                // Failures are already rendered; nothing to report here.
                let _ = load_geometry(shared).await;
            });
            Ok(())
        }
    }
}

fn refocus_search(container: &web_sys::Element) {
    let input = container
        .query_selector(".branch-search")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok());
    if let Some(input) = input {
        // Selection offsets count UTF-16 code units.
        let end = input.value().encode_utf16().count() as u32;
        let _ = input.focus();
        let _ = input.set_selection_range(end, end);
    }
}

/* --------------------------------------------------------------------------
   Options and helpers
-------------------------------------------------------------------------- */

fn config_from_options(options: &JsValue) -> Result<SelectorConfig, JsValue> {
    let mut config = SelectorConfig::default();

    let width = get(options, "width").and_then(|v| v.as_f64());
    let height = get(options, "height").and_then(|v| v.as_f64());
    if width.is_some() || height.is_some() {
        let (w, h) = (width.unwrap_or(config.width), height.unwrap_or(config.height));
        config = config.with_size(w, h);
    }
    if let Some(base) = get(options, "geometryBase").and_then(|v| v.as_string()) {
        config = config.with_geometry_base(base);
    }
    if let Some(key) = get(options, "countryKey").and_then(|v| v.as_string()) {
        config.country_key = key;
    }
    if let Some(object) = get(options, "topologyObject").and_then(|v| v.as_string()) {
        config.topology_object = object;
    }
    if let Some(policy) = get(options, "nonOperational") {
        let policy: NonOperationalPolicy =
            serde_wasm_bindgen::from_value(policy).map_err(js_error)?;
        config = config.with_policy(policy);
    }
    if let Some(offsets) = get(options, "labelOffsets") {
        let offsets: HashMap<String, LabelOffset> =
            serde_wasm_bindgen::from_value(offsets).map_err(js_error)?;
        for (region, off) in offsets {
            config = config.with_label_offset(region, off.dx, off.dy);
        }
    }
    Ok(config)
}

/// Property `key` of `obj`, `None` when absent, `undefined` or `null`.
fn get(obj: &JsValue, key: &str) -> Option<JsValue> {
    if !obj.is_object() {
        return None;
    }
    js_sys::Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn get_function(obj: &JsValue, key: &str) -> Option<js_sys::Function> {
    get(obj, key).and_then(|v| v.dyn_into::<js_sys::Function>().ok())
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| js_error("no document available"))
}

fn js_error(e: impl ToString) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}
