//! The page's smaller collaborators: header, navigation, service cards,
//! upload preview, anchors, date inputs and the secondary forms.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, Node, ScrollBehavior, ScrollToOptions};

use crate::application::FileList as UploadList;
use crate::domain::{
    anchor_scroll_target, default_date_value, HeaderState, InquiryForm, NavMenu, UploadedFileEntry,
};
use crate::web::dom;

const ERROR_STYLE: &str = "
    .form-control.error {
        border-color: #dc3545 !important;
        box-shadow: 0 0 0 3px rgba(220, 53, 69, 0.1) !important;
    }
";

const FILE_ITEM_STYLE: &str = "display: flex; align-items: center; justify-content: space-between; \
    padding: 10px 15px; background: #F8F9FA; border-radius: 8px; margin-bottom: 8px;";
const FILE_NAME_STYLE: &str = "font-size: 0.9rem; color: #333;";
const FILE_SIZE_STYLE: &str = "font-size: 0.85rem; color: #6C757D;";

pub fn init_header(document: &Document) -> Result<(), JsValue> {
    let Some(header) = document.get_element_by_id("header") else {
        return Ok(());
    };
    let window = dom::window()?;
    let state = Rc::new(RefCell::new(HeaderState::default()));
    let scroll_window = window.clone();
    dom::on(&window, "scroll", move |_| {
        let scroll_y = scroll_window.scroll_y().unwrap_or(0.0);
        let mut state = state.borrow_mut();
        if state.update(scroll_y) {
            let _ = dom::set_class(&header, "scrolled", state.scrolled);
        }
    })
}

fn render_nav(menu: &NavMenu, nav: &Element, toggle: &Element) {
    let _ = dom::set_class(nav, "active", menu.open);
    let _ = dom::set_class(toggle, "active", menu.open);
}

pub fn init_mobile_menu(document: &Document) -> Result<(), JsValue> {
    let (Some(toggle), Some(nav)) = (
        document.get_element_by_id("mobileToggle"),
        document.get_element_by_id("navMenu"),
    ) else {
        return Ok(());
    };
    let menu = Rc::new(RefCell::new(NavMenu::default()));

    {
        let (menu, nav, toggle_el) = (Rc::clone(&menu), nav.clone(), toggle.clone());
        dom::on(&toggle, "click", move |_| {
            let mut menu = menu.borrow_mut();
            menu.toggle();
            render_nav(&menu, &nav, &toggle_el);
        })?;
    }

    let window = dom::window()?;
    for link in dom::query_all(&nav, ".nav-link")? {
        let (menu, nav, toggle, window) = (Rc::clone(&menu), nav.clone(), toggle.clone(), window.clone());
        dom::on(&link, "click", move |_| {
            let width = window
                .inner_width()
                .ok()
                .and_then(|w| w.as_f64())
                .unwrap_or(0.0);
            let mut menu = menu.borrow_mut();
            menu.on_link_click(width);
            render_nav(&menu, &nav, &toggle);
        })?;
    }

    let outside_nav = nav.clone();
    let outside_toggle = toggle.clone();
    dom::on(document, "click", move |event| {
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        let inside_menu = outside_nav.contains(target.as_ref());
        let inside_toggle = outside_toggle.contains(target.as_ref());
        let mut menu = menu.borrow_mut();
        menu.on_document_click(inside_menu, inside_toggle);
        render_nav(&menu, &outside_nav, &outside_toggle);
    })
}

/// Keeps each card's `selected` class equal to its checkbox state.
pub fn init_service_cards(document: &Document) -> Result<(), JsValue> {
    for card in dom::query_document(document, ".service-select-card")? {
        let Some(checkbox) = card
            .query_selector("input[type=\"checkbox\"]")?
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };

        let (card_for_change, box_for_change) = (card.clone(), checkbox.clone());
        dom::on(&checkbox, "change", move |_| {
            let _ = dom::set_class(&card_for_change, "selected", box_for_change.checked());
        })?;

        let card_for_click = card.clone();
        dom::on(&card, "click", move |_| {
            let _ = dom::set_class(&card_for_click, "selected", checkbox.checked());
        })?;
    }
    Ok(())
}

fn render_files(document: &Document, container: &Element, files: &UploadList) -> Result<(), JsValue> {
    container.set_inner_html("");
    for (name, size) in files.rows() {
        let item = document.create_element("div")?;
        item.set_class_name("file-item");
        item.set_attribute("style", FILE_ITEM_STYLE)?;

        let name_el = document.create_element("span")?;
        name_el.set_class_name("file-name");
        name_el.set_attribute("style", FILE_NAME_STYLE)?;
        name_el.set_text_content(Some(&name));

        let size_el = document.create_element("span")?;
        size_el.set_class_name("file-size");
        size_el.set_attribute("style", FILE_SIZE_STYLE)?;
        size_el.set_text_content(Some(&size));

        item.append_child(&name_el)?;
        item.append_child(&size_el)?;
        container.append_child(&item)?;
    }
    Ok(())
}

pub fn init_file_upload(document: &Document, files: Rc<RefCell<UploadList>>) -> Result<(), JsValue> {
    let (Some(input), Some(container)) = (
        dom::by_id::<HtmlInputElement>(document, "documentUpload"),
        document.get_element_by_id("fileList"),
    ) else {
        return Ok(());
    };

    let picker = input.clone();
    let document = document.clone();
    dom::on(&input, "change", move |_| {
        let entries = picker
            .files()
            .map(|list| {
                (0..list.length())
                    .filter_map(|i| list.get(i))
                    .map(|f| UploadedFileEntry::new(f.name(), f.size() as u64))
                    .collect()
            })
            .unwrap_or_default();
        let mut files = files.borrow_mut();
        files.replace(entries);
        debug!(count = files.entries().len(), "files selected");
        if let Err(error) = render_files(&document, &container, &files) {
            warn!(?error, "file list render failed");
        }
    })
}

pub fn init_smooth_scroll(document: &Document) -> Result<(), JsValue> {
    let window = dom::window()?;
    for anchor in dom::query_document(document, "a[href^=\"#\"]")? {
        let (document, window, link) = (document.clone(), window.clone(), anchor.clone());
        dom::on(&anchor, "click", move |event| {
            let Some(href) = link.get_attribute("href") else {
                return;
            };
            if href == "#" {
                return;
            }
            // Anything that is not a valid selector is left to the browser.
            let Some(target) = document
                .query_selector(&href)
                .ok()
                .flatten()
                .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            let header_height = dom::by_id::<HtmlElement>(&document, "header")
                .map(|h| f64::from(h.offset_height()))
                .filter(|h| *h > 0.0);
            let Some(top) = anchor_scroll_target(&href, f64::from(target.offset_top()), header_height) else {
                return;
            };
            event.prevent_default();
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        })?;
    }
    Ok(())
}

/// Today in the browser's local time zone.
fn local_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
}

pub fn init_date_defaults(document: &Document) -> Result<(), JsValue> {
    let Some(today) = local_today() else {
        return Ok(());
    };
    for element in dom::query_document(document, "input[type=\"date\"]")? {
        let Ok(input) = element.dyn_into::<HtmlInputElement>() else {
            continue;
        };
        if let Some(value) = default_date_value(&input.id(), &input.value(), today) {
            input.set_value(&value);
        }
    }
    Ok(())
}

pub fn init_inquiry_forms(document: &Document) -> Result<(), JsValue> {
    for kind in [InquiryForm::Contact, InquiryForm::Referral] {
        let Some(form) = dom::by_id::<HtmlFormElement>(document, kind.element_id()) else {
            continue;
        };
        let target = form.clone();
        dom::on(&form, "submit", move |event| {
            event.prevent_default();
            dom::alert(kind.acknowledgement());
            target.reset();
        })?;
    }
    Ok(())
}

/// Adds the rule that outlines flagged form controls.
pub fn inject_error_style(document: &Document) -> Result<(), JsValue> {
    let Some(head) = document.head() else {
        return Ok(());
    };
    let style = document.create_element("style")?;
    style.set_text_content(Some(ERROR_STYLE));
    head.append_child(&style)?;
    Ok(())
}
