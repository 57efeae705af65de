//! Application state for the terminal host.
//!
//! Wraps the wizard, signature pad and file list with the focus, editing
//! and notice state a keyboard-and-mouse interface needs.

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::application::{FileList, Notice, Notifier, SignaturePad, StepWizard, SUCCESS_MESSAGE};
use crate::domain::{
    DefinitionResult, FieldKind, FormDefinition, PixelSurface, Point, SignatureCheck, Submission,
    WizardError, BORDER_ALLOWANCE,
};
use crate::infrastructure::FileProbe;

/// Horizontal surface pixels covered by one terminal cell.
pub const PIXELS_PER_CELL: u32 = 8;
/// Container width used until the first layout is known.
const INITIAL_CONTAINER_WIDTH: u32 = 304;

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Moving focus and activating controls
    Normal,
    /// Typing into a field or the document list
    Editing,
    /// A modal notice is shown and must be dismissed
    Notice,
}

/// Something on the current step that can hold focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Service(usize),
    Field(usize),
    Terms,
    Documents,
    ClearSignature,
    Previous,
    Next,
    Submit,
}

/// Terminal cells occupied by the signature surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl CellArea {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x && col < self.x + self.width && row >= self.y && row < self.y + self.height
    }
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use servform::application::{App, AppMode};
/// use servform::domain::FormDefinition;
///
/// let app = App::new(FormDefinition::default()).unwrap();
/// assert_eq!(app.wizard.current_step(), 1);
/// assert_eq!(app.mode, AppMode::Normal);
/// ```
#[derive(Debug)]
pub struct App {
    pub wizard: StepWizard,
    /// Present when the form has a signature surface
    pub signature: Option<SignaturePad<PixelSurface>>,
    pub files: FileList,
    pub mode: AppMode,
    /// Index into `focus_targets()`
    pub focus: usize,
    /// What the input buffer will be written to
    pub editing: Option<FocusTarget>,
    pub input: String,
    pub cursor_position: usize,
    pub notice: Option<Notice>,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Last known position of the signature surface on screen
    pub signature_area: Option<CellArea>,
    pub last_submission: Option<Submission>,
}

impl App {
    pub fn new(definition: FormDefinition) -> DefinitionResult<Self> {
        Self::new_on(definition, Local::now().date_naive())
    }

    /// Like [`App::new`] with an explicit "today" for date defaults.
    pub fn new_on(definition: FormDefinition, today: NaiveDate) -> DefinitionResult<Self> {
        let has_signature = definition.signature;
        let mut wizard = StepWizard::new(definition)?;
        wizard.apply_date_defaults(today);

        Ok(Self {
            wizard,
            signature: has_signature.then(|| SignaturePad::new(PixelSurface::new(INITIAL_CONTAINER_WIDTH))),
            files: FileList::default(),
            mode: AppMode::Normal,
            focus: 0,
            editing: None,
            input: String::new(),
            cursor_position: 0,
            notice: None,
            status_message: None,
            signature_area: None,
            last_submission: None,
        })
    }

    /// Focusable items of the current step, in tab order.
    pub fn focus_targets(&self) -> Vec<FocusTarget> {
        let mut targets = Vec::new();
        if let Some(panel) = self.wizard.current_panel() {
            targets.extend((0..panel.services.len()).map(FocusTarget::Service));
            targets.extend((0..panel.fields.len()).map(FocusTarget::Field));
        }

        if self.wizard.is_last_step() {
            let definition = self.wizard.definition();
            if definition.uploads {
                targets.push(FocusTarget::Documents);
            }
            if self.wizard.terms_agreed().is_some() {
                targets.push(FocusTarget::Terms);
            }
            if self.signature.is_some() {
                targets.push(FocusTarget::ClearSignature);
            }
        }

        let view = self.wizard.view();
        if view.show_previous {
            targets.push(FocusTarget::Previous);
        }
        if view.show_next {
            targets.push(FocusTarget::Next);
        }
        if view.show_submit {
            targets.push(FocusTarget::Submit);
        }
        targets
    }

    pub fn focused(&self) -> Option<FocusTarget> {
        self.focus_targets().get(self.focus).copied()
    }

    pub fn focus_next(&mut self) {
        let count = self.focus_targets().len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_previous(&mut self) {
        let count = self.focus_targets().len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Enter on the focused item.
    pub fn activate(&mut self) {
        let Some(target) = self.focused() else {
            return;
        };
        match target {
            FocusTarget::Field(index) if self.field_kind(index) == Some(FieldKind::Select) => {
                self.cycle_option(index);
            }
            FocusTarget::Field(_) | FocusTarget::Documents => self.start_editing(target),
            FocusTarget::Service(_) | FocusTarget::Terms => self.toggle_focused(),
            FocusTarget::ClearSignature => self.clear_signature(),
            FocusTarget::Previous => self.previous(),
            FocusTarget::Next => self.next(),
            FocusTarget::Submit => self.submit(),
        }
    }

    /// Space on the focused item: flips checkboxes, cycles selects.
    pub fn toggle_focused(&mut self) {
        match self.focused() {
            Some(FocusTarget::Service(index)) => {
                let value = self
                    .wizard
                    .current_panel()
                    .and_then(|p| p.services.get(index))
                    .map(|s| s.value.clone());
                if let Some(value) = value {
                    self.wizard.toggle_service(&value);
                }
            }
            Some(FocusTarget::Terms) => {
                let agreed = self.wizard.terms_agreed().unwrap_or(false);
                self.wizard.set_terms_agreed(!agreed);
            }
            Some(FocusTarget::Field(index)) if self.field_kind(index) == Some(FieldKind::Select) => {
                self.cycle_option(index);
            }
            _ => {}
        }
    }

    fn field_kind(&self, index: usize) -> Option<FieldKind> {
        self.wizard.current_panel()?.fields.get(index).map(|f| f.kind)
    }

    fn cycle_option(&mut self, index: usize) {
        let step = self.wizard.current_step();
        let Some(field) = self.wizard.current_panel().and_then(|p| p.fields.get(index)) else {
            return;
        };
        if field.options.is_empty() {
            return;
        }
        let next = field
            .options
            .iter()
            .position(|o| *o == field.value)
            .map(|i| (i + 1) % field.options.len())
            .unwrap_or(0);
        let (name, value) = (field.name.clone(), field.options[next].clone());
        self.wizard.field_input(step, &name, &value);
    }

    pub fn start_editing(&mut self, target: FocusTarget) {
        self.input = match target {
            FocusTarget::Field(index) => self
                .wizard
                .current_panel()
                .and_then(|p| p.fields.get(index))
                .map(|f| f.value.clone())
                .unwrap_or_default(),
            FocusTarget::Documents => String::new(),
            _ => return,
        };
        self.mode = AppMode::Editing;
        self.editing = Some(target);
        self.cursor_position = self.input.len();
        self.status_message = None;
    }

    /// Writes the input buffer back to the field or probes the listed
    /// documents, then returns to normal mode.
    pub fn finish_editing(&mut self) {
        match self.editing.take() {
            Some(FocusTarget::Field(index)) => {
                let step = self.wizard.current_step();
                let name = self
                    .wizard
                    .current_panel()
                    .and_then(|p| p.fields.get(index))
                    .map(|f| f.name.clone());
                if let Some(name) = name {
                    self.wizard.field_input(step, &name, &self.input);
                }
            }
            Some(FocusTarget::Documents) => match FileProbe::probe_list(&self.input) {
                Ok(entries) => {
                    self.status_message = Some(format!("{} file(s) attached", entries.len()));
                    self.files.replace(entries);
                }
                Err(error) => {
                    warn!(%error, "could not attach documents");
                    self.status_message = Some(format!("Attach failed: {}", error));
                }
            },
            _ => {}
        }
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.editing = None;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn next(&mut self) {
        match self.wizard.next() {
            Ok(view) => self.on_step_shown(view.step),
            Err(error) => self.on_wizard_error(error),
        }
    }

    pub fn previous(&mut self) {
        match self.wizard.previous() {
            Ok(view) => self.on_step_shown(view.step),
            Err(error) => self.on_wizard_error(error),
        }
    }

    fn on_step_shown(&mut self, step: usize) {
        self.focus = 0;
        self.status_message = Some(format!("Step {} of {}", step, self.wizard.total_steps()));
    }

    fn on_wizard_error(&mut self, error: WizardError) {
        match error {
            WizardError::Navigation(e) => {
                warn!(error = %e, "navigation rejected");
                self.status_message = Some(e.to_string());
            }
            WizardError::Validation(_) => self.notify(Notice::from(&error)),
        }
    }

    pub fn submit(&mut self) {
        let signature = self.signature.as_ref().map(|pad| pad as &dyn SignatureCheck);
        match self.wizard.submit(signature, self.files.entries()) {
            Ok(submission) => {
                self.last_submission = Some(submission);
                self.notify(Notice::success(SUCCESS_MESSAGE));
            }
            Err(error) => self.notify(Notice::from(&error)),
        }
    }

    pub fn clear_signature(&mut self) {
        if let Some(pad) = self.signature.as_mut() {
            pad.clear();
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.mode = AppMode::Normal;
    }

    /// The signature surface is on screen only on the last step.
    pub fn signature_visible(&self) -> bool {
        self.signature.is_some() && self.wizard.is_last_step()
    }

    /// Records where the surface is drawn; a width change resizes it.
    pub fn sync_signature_area(&mut self, area: CellArea) {
        let width_changed = self.signature_area.map(|a| a.width) != Some(area.width);
        if width_changed {
            if let Some(pad) = self.signature.as_mut() {
                pad.resize(area.width as u32 * PIXELS_PER_CELL + BORDER_ALLOWANCE);
            }
        }
        self.signature_area = Some(area);
    }

    fn surface_point(&self, col: u16, row: u16) -> Option<Point> {
        let area = self.signature_area?;
        let pad = self.signature.as_ref()?;
        if !area.contains(col, row) || area.width == 0 || area.height == 0 {
            return None;
        }
        let surface = pad.surface();
        let x = (f64::from(col - area.x) + 0.5) * f64::from(surface.width()) / f64::from(area.width);
        let y = (f64::from(row - area.y) + 0.5) * f64::from(surface.height()) / f64::from(area.height);
        Some(Point::new(x, y))
    }

    pub fn pointer_down(&mut self, col: u16, row: u16) {
        if !self.signature_visible() {
            return;
        }
        if let Some(point) = self.surface_point(col, row) {
            if let Some(pad) = self.signature.as_mut() {
                debug!(x = point.x, y = point.y, "stroke started");
                pad.pointer_down(point);
            }
        }
    }

    pub fn pointer_drag(&mut self, col: u16, row: u16) {
        let point = self.surface_point(col, row);
        if let Some(pad) = self.signature.as_mut() {
            match point {
                Some(point) => {
                    pad.pointer_move(point);
                }
                None => pad.pointer_leave(),
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(pad) = self.signature.as_mut() {
            pad.pointer_up();
        }
    }
}

impl Notifier for App {
    fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mode = AppMode::Notice;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NoticeLevel;

    fn app() -> App {
        let today = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        App::new_on(FormDefinition::default(), today).unwrap()
    }

    fn fill(app: &mut App, values: &[(&str, &str)]) {
        let step = app.wizard.current_step();
        for (name, value) in values {
            assert!(app.wizard.field_input(step, name, value), "no field {name}");
        }
    }

    fn focus_on(app: &mut App, target: FocusTarget) {
        app.focus = app
            .focus_targets()
            .iter()
            .position(|t| *t == target)
            .expect("target not focusable");
    }

    fn sign(app: &mut App) {
        app.sync_signature_area(CellArea { x: 2, y: 10, width: 40, height: 6 });
        app.pointer_down(5, 12);
        app.pointer_drag(12, 13);
        app.pointer_drag(20, 12);
        app.pointer_up();
    }

    fn reach_last_step(app: &mut App) {
        app.wizard.set_service("residential", true);
        fill(app, &[("fullName", "Ada"), ("email", "ada@example.com"), ("phone", "555-0100")]);
        app.next();
        fill(
            app,
            &[
                ("propertyAddress", "1 Main St"),
                ("city", "Springfield"),
                ("state", "IL"),
                ("zip", "62701"),
                ("propertyType", "Condo"),
            ],
        );
        app.next();
        fill(app, &[("signerName", "Ada")]);
    }

    #[test]
    fn test_app_new() {
        let app = app();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.focus, 0);
        assert!(app.signature.is_some());
        assert!(app.notice.is_none());
        let panel = app.wizard.panel(3).unwrap();
        assert_eq!(panel.field("signatureDate").unwrap().value, "2024-03-07");
        assert_eq!(panel.field("instructionDate").unwrap().value, "2024-03-07");
    }

    #[test]
    fn test_focus_targets_first_step() {
        let app = app();
        let targets = app.focus_targets();
        assert_eq!(targets.first(), Some(&FocusTarget::Service(0)));
        assert!(targets.contains(&FocusTarget::Field(3)));
        assert_eq!(targets.last(), Some(&FocusTarget::Next));
        assert!(!targets.contains(&FocusTarget::Previous));
        assert!(!targets.contains(&FocusTarget::Submit));
        assert!(!targets.contains(&FocusTarget::Terms));
    }

    #[test]
    fn test_focus_wraps() {
        let mut app = app();
        let count = app.focus_targets().len();
        app.focus_previous();
        assert_eq!(app.focus, count - 1);
        app.focus_next();
        assert_eq!(app.focus, 0);
    }

    #[test]
    fn test_next_without_service_shows_notice() {
        let mut app = app();
        fill(&mut app, &[("fullName", "Ada"), ("email", "a@b.c"), ("phone", "1")]);
        app.next();
        assert_eq!(app.wizard.current_step(), 1);
        assert_eq!(app.mode, AppMode::Notice);
        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Please select at least one service.");
        app.dismiss_notice();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_space_toggles_service() {
        let mut app = app();
        focus_on(&mut app, FocusTarget::Service(1));
        app.toggle_focused();
        assert!(app.wizard.panel(1).unwrap().services[1].checked);
        app.activate();
        assert!(!app.wizard.panel(1).unwrap().services[1].checked);
    }

    #[test]
    fn test_editing_writes_back_field() {
        let mut app = app();
        focus_on(&mut app, FocusTarget::Field(0));
        app.activate();
        assert_eq!(app.mode, AppMode::Editing);
        app.input = "Grace Hopper".to_string();
        app.finish_editing();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.wizard.panel(1).unwrap().field("fullName").unwrap().value, "Grace Hopper");
    }

    #[test]
    fn test_cancel_editing_keeps_value() {
        let mut app = app();
        fill(&mut app, &[("fullName", "Ada")]);
        focus_on(&mut app, FocusTarget::Field(0));
        app.activate();
        app.input.push_str(" Lovelace");
        app.cancel_editing();
        assert_eq!(app.wizard.panel(1).unwrap().field("fullName").unwrap().value, "Ada");
    }

    #[test]
    fn test_select_field_cycles_options() {
        let mut app = app();
        reach_last_step(&mut app);
        app.previous();
        assert_eq!(app.wizard.current_step(), 2);
        focus_on(&mut app, FocusTarget::Field(4));
        app.activate();
        // "Condo" -> "Multi-Family"
        assert_eq!(
            app.wizard.panel(2).unwrap().field("propertyType").unwrap().value,
            "Multi-Family"
        );
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_previous_at_first_step_sets_status() {
        let mut app = app();
        app.previous();
        assert_eq!(app.wizard.current_step(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Already on the first step"));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_last_step_targets() {
        let mut app = app();
        reach_last_step(&mut app);
        assert_eq!(app.wizard.current_step(), 3);
        let targets = app.focus_targets();
        assert!(targets.contains(&FocusTarget::Documents));
        assert!(targets.contains(&FocusTarget::Terms));
        assert!(targets.contains(&FocusTarget::ClearSignature));
        assert!(targets.contains(&FocusTarget::Previous));
        assert!(targets.contains(&FocusTarget::Submit));
        assert!(!targets.contains(&FocusTarget::Next));
    }

    #[test]
    fn test_submit_end_to_end() {
        let mut app = app();
        reach_last_step(&mut app);
        focus_on(&mut app, FocusTarget::Terms);
        app.toggle_focused();
        sign(&mut app);

        focus_on(&mut app, FocusTarget::Submit);
        app.activate();

        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, SUCCESS_MESSAGE);
        assert_eq!(app.wizard.current_step(), 3);
        let submission = app.last_submission.as_ref().unwrap();
        assert_eq!(submission.services, vec!["residential".to_string()]);
        assert_eq!(submission.fields.get("zip").map(String::as_str), Some("62701"));
    }

    #[test]
    fn test_submit_without_terms() {
        let mut app = app();
        reach_last_step(&mut app);
        sign(&mut app);
        app.submit();
        assert_eq!(app.notice.unwrap().message, "Please agree to the Terms & Conditions.");
        assert_eq!(app.wizard.current_step(), 3);
        assert!(app.last_submission.is_none());
    }

    #[test]
    fn test_submit_without_signature() {
        let mut app = app();
        reach_last_step(&mut app);
        app.wizard.set_terms_agreed(true);
        sign(&mut app);
        app.clear_signature();
        app.submit();
        assert_eq!(app.notice.unwrap().message, "Please provide your signature.");
    }

    #[test]
    fn test_pointer_ignored_before_last_step() {
        let mut app = app();
        app.sync_signature_area(CellArea { x: 0, y: 0, width: 20, height: 5 });
        app.pointer_down(3, 2);
        app.pointer_drag(8, 3);
        assert!(!app.signature.as_ref().unwrap().has_signature());
    }

    #[test]
    fn test_drag_outside_area_ends_stroke() {
        let mut app = app();
        reach_last_step(&mut app);
        app.sync_signature_area(CellArea { x: 0, y: 0, width: 20, height: 5 });
        app.pointer_down(3, 2);
        app.pointer_drag(50, 30);
        assert!(!app.signature.as_ref().unwrap().is_drawing());
        app.pointer_drag(6, 2);
        assert!(!app.signature.as_ref().unwrap().has_signature());
    }

    #[test]
    fn test_area_width_change_resizes_surface() {
        let mut app = app();
        reach_last_step(&mut app);
        sign(&mut app);
        assert!(app.signature.as_ref().unwrap().has_signature());

        // Same width, different row: drawing kept.
        app.sync_signature_area(CellArea { x: 2, y: 12, width: 40, height: 6 });
        assert!(app.signature.as_ref().unwrap().has_signature());

        app.sync_signature_area(CellArea { x: 2, y: 12, width: 30, height: 6 });
        let pad = app.signature.as_ref().unwrap();
        assert!(!pad.has_signature());
        assert_eq!(pad.surface().width(), 30 * PIXELS_PER_CELL);
    }

    #[test]
    fn test_attach_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.pdf");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let mut app = app();
        reach_last_step(&mut app);
        focus_on(&mut app, FocusTarget::Documents);
        app.activate();
        app.input = path.display().to_string();
        app.finish_editing();

        assert_eq!(app.files.rows(), vec![("survey.pdf".to_string(), "2 KB".to_string())]);
        assert_eq!(app.status_message.as_deref(), Some("1 file(s) attached"));
    }

    #[test]
    fn test_attach_missing_document_reports_failure() {
        let mut app = app();
        reach_last_step(&mut app);
        app.start_editing(FocusTarget::Documents);
        app.input = "/definitely/not/here.pdf".to_string();
        app.finish_editing();
        assert!(app.files.is_empty());
        assert!(app.status_message.unwrap().starts_with("Attach failed"));
    }
}
