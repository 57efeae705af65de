//! Binds the step wizard to the service request form markup.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

use crate::application::{
    control_key, in_step_order, markup_definition, markup_panel, step_ordinal, FileList, IndicatorState,
    MarkupControl, Notice, Notifier, StepView, StepWizard, SUCCESS_MESSAGE,
};
use crate::domain::{FormDefinition, SignatureCheck, SERVICES_GROUP};
use crate::web::dom;
use crate::web::signature::{SharedPad, SIGNATURE_CANVAS_ID};

const FORM_ID: &str = "serviceRequestForm";
const TERMS_ID: &str = "agreeTerms";
const UPLOAD_ID: &str = "documentUpload";

/// Shows notices with the browser's modal alert.
pub struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn notify(&mut self, notice: Notice) {
        dom::alert(&notice.message);
    }
}

struct PanelBinding {
    element: Element,
    fields: Vec<(String, Element)>,
    services: Vec<HtmlInputElement>,
}

struct FormHost {
    form: Element,
    wizard: StepWizard,
    panels: Vec<PanelBinding>,
    indicators: Vec<Element>,
    previous: Option<HtmlElement>,
    next: Option<HtmlElement>,
    submit: Option<HtmlElement>,
    terms: Option<HtmlInputElement>,
    signature: Option<SharedPad>,
    files: Rc<RefCell<FileList>>,
}

impl FormHost {
    /// Copies control values from the page into the wizard model.
    fn sync_from_page(&mut self) {
        for (index, panel) in self.panels.iter().enumerate() {
            let step = index + 1;
            for (name, element) in &panel.fields {
                self.wizard.field_input(step, name, &dom::control_value(element));
            }
            for checkbox in &panel.services {
                self.wizard.set_service(&checkbox.value(), checkbox.checked());
            }
        }
        if let Some(terms) = self.terms.as_ref() {
            self.wizard.set_terms_agreed(terms.checked());
        }
    }

    /// Marks fields the last validation flagged; each mark goes away on
    /// the field's next input.
    fn render_errors(&self, step: usize) -> Result<(), JsValue> {
        let (Some(panel), Some(model)) = (self.panels.get(step - 1), self.wizard.panel(step)) else {
            return Ok(());
        };
        for (name, element) in &panel.fields {
            if model.field(name).is_some_and(|f| f.error) {
                dom::set_class(element, "error", true)?;
                let target = element.clone();
                dom::once(element, "input", move |_| {
                    let _ = dom::set_class(&target, "error", false);
                })?;
            }
        }
        Ok(())
    }

    fn render_view(&self, view: &StepView) -> Result<(), JsValue> {
        for (panel, active) in self.panels.iter().zip(&view.panels) {
            dom::set_class(&panel.element, "active", *active)?;
        }
        for (indicator, state) in self.indicators.iter().zip(&view.indicators) {
            dom::set_class(indicator, "active", *state == IndicatorState::Active)?;
            dom::set_class(indicator, "completed", *state == IndicatorState::Completed)?;
        }
        if let Some(button) = self.previous.as_ref() {
            dom::set_visible(button, view.show_previous)?;
        }
        if let Some(button) = self.next.as_ref() {
            dom::set_visible(button, view.show_next)?;
        }
        if let Some(button) = self.submit.as_ref() {
            dom::set_visible(button, view.show_submit)?;
        }
        if view.scroll_into_view {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            self.form.scroll_into_view_with_scroll_into_view_options(&options);
        }
        Ok(())
    }

    fn next(&mut self) -> Result<(), JsValue> {
        self.sync_from_page();
        let step = self.wizard.current_step();
        match self.wizard.next() {
            Ok(view) => self.render_view(&view),
            Err(error) => {
                debug!(%error, "next rejected");
                self.render_errors(step)?;
                if let Some(notice) = Notice::for_wizard_error(&error) {
                    AlertNotifier.notify(notice);
                }
                Ok(())
            }
        }
    }

    fn previous(&mut self) -> Result<(), JsValue> {
        match self.wizard.previous() {
            Ok(view) => self.render_view(&view),
            Err(error) => {
                warn!(%error, "previous rejected");
                Ok(())
            }
        }
    }

    fn submit(&mut self) -> Result<(), JsValue> {
        self.sync_from_page();
        let step = self.wizard.current_step();
        let pad = self.signature.as_ref().map(|p| p.borrow());
        let check = pad.as_deref().map(|p| p as &dyn SignatureCheck);
        let files = self.files.borrow();
        let outcome = self.wizard.submit(check, files.entries());
        drop(files);
        drop(pad);

        match outcome {
            Ok(submission) => {
                debug!(fields = submission.fields.len(), files = submission.files.len(), "request accepted");
                AlertNotifier.notify(Notice::success(SUCCESS_MESSAGE));
            }
            Err(error) => {
                self.render_errors(step)?;
                if let Some(notice) = Notice::for_submit_error(&error) {
                    AlertNotifier.notify(notice);
                }
            }
        }
        Ok(())
    }
}

/// Reads the panel structure from the page into a form definition.
fn read_panels(document: &Document, form: &Element) -> Result<(FormDefinition, Vec<PanelBinding>), JsValue> {
    let mut panels = Vec::new();
    let mut bindings = Vec::new();

    for element in dom::query_all(form, ".form-step")? {
        let Some(step) = step_ordinal(element.get_attribute("data-step").as_deref()) else {
            warn!("form step without a numeric data-step");
            continue;
        };

        let required = dom::query_all(&element, "[required]")?;
        let controls: Vec<MarkupControl> = required
            .iter()
            .map(|control| MarkupControl {
                id: control.get_attribute("id").filter(|id| !id.is_empty()),
                name: control.get_attribute("name").filter(|name| !name.is_empty()),
            })
            .collect();

        let selector = format!("input[name=\"{}\"]", SERVICES_GROUP);
        let services: Vec<HtmlInputElement> = dom::query_all(&element, &selector)?
            .into_iter()
            .filter_map(|e| e.dyn_into::<HtmlInputElement>().ok())
            .collect();
        let values: Vec<String> = services.iter().map(|c| c.value()).collect();

        panels.push(markup_panel(step, &controls, &values));
        let fields = required
            .into_iter()
            .enumerate()
            .map(|(index, control)| (control_key(step, index), control))
            .collect();
        bindings.push((step, PanelBinding {
            element,
            fields,
            services,
        }));
    }

    let definition = markup_definition(
        FORM_ID,
        panels,
        document.get_element_by_id(TERMS_ID).is_some(),
        document.get_element_by_id(SIGNATURE_CANVAS_ID).is_some(),
        document.get_element_by_id(UPLOAD_ID).is_some(),
    );
    Ok((definition, in_step_order(bindings)))
}

/// Wires the multi-step form. Returns without error when the page has no
/// form or its steps are malformed; only the wizard is disabled then.
pub fn init(
    document: &Document,
    signature: Option<SharedPad>,
    files: Rc<RefCell<FileList>>,
) -> Result<(), JsValue> {
    let Some(form) = document.get_element_by_id(FORM_ID) else {
        return Ok(());
    };

    let (definition, panels) = read_panels(document, &form)?;
    let wizard = match StepWizard::new(definition) {
        Ok(wizard) => wizard,
        Err(error) => {
            warn!(%error, "form wizard disabled");
            return Ok(());
        }
    };

    let host = FormHost {
        form: form.clone(),
        indicators: dom::query_document(document, ".step-indicator .step")?,
        previous: dom::by_id(document, "prevBtn"),
        next: dom::by_id(document, "nextBtn"),
        submit: dom::by_id(document, "submitBtn"),
        terms: dom::by_id(document, TERMS_ID),
        signature,
        files,
        wizard,
        panels,
    };
    host.render_view(host.wizard.view())?;
    let host = Rc::new(RefCell::new(host));

    if let Some(button) = host.borrow().next.as_ref() {
        let host = Rc::clone(&host);
        dom::on(button, "click", move |_| {
            if let Err(error) = host.borrow_mut().next() {
                warn!(?error, "next failed");
            }
        })?;
    }

    if let Some(button) = host.borrow().previous.as_ref() {
        let host = Rc::clone(&host);
        dom::on(button, "click", move |_| {
            if let Err(error) = host.borrow_mut().previous() {
                warn!(?error, "previous failed");
            }
        })?;
    }

    let submit_host = Rc::clone(&host);
    dom::on(&form, "submit", move |event| {
        event.prevent_default();
        if let Err(error) = submit_host.borrow_mut().submit() {
            warn!(?error, "submit failed");
        }
    })?;

    debug!(steps = host.borrow().wizard.total_steps(), "form wizard ready");
    Ok(())
}
