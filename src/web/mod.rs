//! Browser host, compiled with the `web` feature.
//!
//! Each component is wired on its own; a page that lacks a component's
//! elements simply skips it.

mod console;
mod dom;
mod form;
mod page;
mod signature;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::Document;

use crate::application::FileList;

pub use form::AlertNotifier;
pub use signature::{CanvasSurface, SharedPad, SIGNATURE_CANVAS_ID};

thread_local! {
    static SIGNATURE: RefCell<Option<SharedPad>> = const { RefCell::new(None) };
}

fn component(name: &str, result: Result<(), JsValue>) {
    if let Err(error) = result {
        warn!(component = name, ?error, "component not initialized");
    }
}

fn init_page(document: &Document) {
    component("header", page::init_header(document));
    component("mobile menu", page::init_mobile_menu(document));
    component("service cards", page::init_service_cards(document));

    let pad = match signature::init(document) {
        Ok(pad) => pad,
        Err(error) => {
            warn!(?error, "signature pad not initialized");
            None
        }
    };
    SIGNATURE.with(|slot| *slot.borrow_mut() = pad.clone());

    let files = Rc::new(RefCell::new(FileList::default()));
    component("form wizard", form::init(document, pad, Rc::clone(&files)));
    component("file upload", page::init_file_upload(document, files));
    component("error style", page::inject_error_style(document));
    component("inquiry forms", page::init_inquiry_forms(document));
    component("smooth scroll", page::init_smooth_scroll(document));
    component("date defaults", page::init_date_defaults(document));
    info!("page ready");
}

/// Runs when the module is instantiated, deferring to `DOMContentLoaded`
/// while the document is still loading.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console::init(tracing::Level::DEBUG);
    let document = dom::document()?;
    if document.ready_state() == "loading" {
        let loaded = document.clone();
        dom::once(&document, "DOMContentLoaded", move |_| init_page(&loaded))?;
    } else {
        init_page(&document);
    }
    Ok(())
}

/// Wipes the signature canvas. Called from the page's clear button.
#[wasm_bindgen(js_name = clearSignature)]
pub fn clear_signature() {
    SIGNATURE.with(|slot| {
        if let Some(pad) = slot.borrow().as_ref() {
            pad.borrow_mut().clear();
        }
    });
}
