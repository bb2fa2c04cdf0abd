use std::cell::RefCell;
use std::rc::Rc;

use branchmap_wasm::BranchSelector;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const DATASET: &str = r#"{
    "Rajasthan": { "Ajmer": "Ajmer Office", "Jaipur": "Jaipur Office", "Udaipur": "Udaipur Office" },
    "Tamil Nadu": { "Chennai": "Chennai Office" }
}"#;

fn container(id: &str) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let div = document.create_element("div").unwrap();
    div.set_id(id);
    document.body().unwrap().append_child(&div).unwrap();
    div
}

fn options() -> JsValue {
    let options = js_sys::Object::new();
    let dataset = js_sys::JSON::parse(DATASET).unwrap();
    js_sys::Reflect::set(&options, &"dataset".into(), &dataset).unwrap();
    options.into()
}

fn selected_cards(container: &web_sys::Element) -> u32 {
    container
        .query_selector_all(".branch-card.selected")
        .unwrap()
        .length()
}

fn card(container: &web_sys::Element, name: &str) -> web_sys::HtmlElement {
    container
        .query_selector(&format!(".branch-card[data-branch-name='{name}']"))
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

#[wasm_bindgen_test]
fn one_card_stays_selected_and_destroy_empties_the_container() {
    let div = container("selector-basic");
    let selector = BranchSelector::new("selector-basic", options()).unwrap();

    assert!(selector.select_region("Rajasthan").unwrap());
    assert_eq!(div.query_selector_all(".branch-card").unwrap().length(), 3);

    assert!(selector.select_branch("Rajasthan", "Ajmer").unwrap());
    assert!(selector.select_branch("Rajasthan", "Jaipur").unwrap());
    assert_eq!(selected_cards(&div), 1);
    assert!(card(&div, "jaipur").class_list().contains("selected"));

    selector.destroy();
    assert_eq!(div.child_element_count(), 0);
    assert!(div.inner_html().is_empty());
    assert!(!selector.select_region("Tamil Nadu").unwrap());
    assert_eq!(div.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn clicking_a_card_reports_the_branch_to_the_host() {
    let div = container("selector-click");
    let calls: Rc<RefCell<Vec<(String, String, String)>>> = Rc::default();
    let sink = Rc::clone(&calls);
    let on_branch = Closure::<dyn FnMut(String, String, String)>::new(move |r, b, a| {
        sink.borrow_mut().push((r, b, a));
    });
    let opts = options();
    js_sys::Reflect::set(&opts, &"onBranchSelect".into(), on_branch.as_ref()).unwrap();

    let selector = BranchSelector::new("selector-click", opts).unwrap();
    selector.select_region("Rajasthan").unwrap();
    card(&div, "udaipur").click();

    assert_eq!(
        calls.borrow().as_slice(),
        &[(
            "Rajasthan".to_owned(),
            "Udaipur".to_owned(),
            "Udaipur Office".to_owned()
        )]
    );
    assert_eq!(selected_cards(&div), 1);
    selector.destroy();
}

#[wasm_bindgen_test]
fn host_callback_may_click_while_a_listener_is_running() {
    let div = container("selector-nested");
    let nested = div.clone();
    let on_branch = Closure::<dyn FnMut(String, String, String)>::new(
        move |_r: String, b: String, _a: String| {
            if b == "Ajmer" {
                card(&nested, "jaipur").click();
            }
        },
    );
    let opts = options();
    js_sys::Reflect::set(&opts, &"onBranchSelect".into(), on_branch.as_ref()).unwrap();

    let selector = BranchSelector::new("selector-nested", opts).unwrap();
    selector.select_region("Rajasthan").unwrap();
    card(&div, "ajmer").click();

    assert_eq!(selected_cards(&div), 1);
    assert!(card(&div, "jaipur").class_list().contains("selected"));

    // Listeners of the re-rendered cards still respond.
    card(&div, "udaipur").click();
    assert!(card(&div, "udaipur").class_list().contains("selected"));
    assert_eq!(selected_cards(&div), 1);
    selector.destroy();
}

#[wasm_bindgen_test]
fn search_caret_lands_after_non_ascii_text() {
    let div = container("selector-search");
    let selector = BranchSelector::new("selector-search", options()).unwrap();
    selector.select_region("Rajasthan").unwrap();

    let search = |div: &web_sys::Element| -> web_sys::HtmlInputElement {
        div.query_selector(".branch-search")
            .unwrap()
            .unwrap()
            .dyn_into()
            .unwrap()
    };
    let input = search(&div);
    input.focus().unwrap();
    input.set_value("Jaipür");
    let event = web_sys::Event::new("input").unwrap();
    input.dispatch_event(&event).unwrap();

    let input = search(&div);
    assert_eq!(input.value(), "Jaipür");
    assert_eq!(input.selection_start().unwrap(), Some(6));
    assert_eq!(div.query_selector_all(".branch-card").unwrap().length(), 1);
    selector.destroy();
}
