use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlElement, MouseEvent, TouchEvent};

use crate::application::SignaturePad;
use crate::domain::{
    any_alpha, DrawingSurface, LineCap, LineJoin, Point, SignatureDetection, StrokeStyle, BORDER_ALLOWANCE,
    SURFACE_HEIGHT,
};
use crate::web::dom;

/// Id of the signature canvas.
pub const SIGNATURE_CANVAS_ID: &str = "signatureCanvas";

pub type SharedPad = Rc<RefCell<SignaturePad<CanvasSurface>>>;

/// Signature surface backed by an HTML canvas.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    detection: SignatureDetection,
    segments: usize,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            context,
            detection: SignatureDetection::default(),
            segments: 0,
        })
    }

    pub fn with_detection(mut self, detection: SignatureDetection) -> Self {
        self.detection = detection;
        self
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn container_width(&self) -> u32 {
        self.canvas
            .parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok())
            .map(|p| p.offset_width().max(0) as u32)
            .unwrap_or(0)
    }

    fn apply_style(&self, style: &StrokeStyle) {
        self.context.set_stroke_style_str(&style.css_color());
        self.context.set_line_width(style.line_width);
        self.context.set_line_cap(match style.cap {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        });
        self.context.set_line_join(match style.join {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        });
    }
}

impl DrawingSurface for CanvasSurface {
    fn resize(&mut self, container_width: u32) {
        // Setting the size wipes the bitmap and the context state.
        self.canvas.set_width(container_width.saturating_sub(BORDER_ALLOWANCE));
        self.canvas.set_height(SURFACE_HEIGHT);
        self.apply_style(&StrokeStyle::default());
        self.segments = 0;
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        self.context.begin_path();
        self.context.move_to(from.x, from.y);
        self.context.line_to(to.x, to.y);
        self.context.stroke();
        self.segments += 1;
    }

    fn clear(&mut self) {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.context.clear_rect(0.0, 0.0, f64::from(w), f64::from(h));
        self.segments = 0;
    }

    fn has_signature(&self) -> bool {
        self.detection.detect(self.segments, || {
            let (w, h) = (self.canvas.width(), self.canvas.height());
            if w == 0 || h == 0 {
                return false;
            }
            self.context
                .get_image_data(0.0, 0.0, f64::from(w), f64::from(h))
                .map(|image| any_alpha(&image.data()))
                .unwrap_or(false)
        })
    }
}

/// Pointer position relative to the canvas, from a mouse or touch event.
fn event_position(canvas: &HtmlCanvasElement, event: &Event) -> Option<Point> {
    let (client_x, client_y) = if let Some(touch_event) = event.dyn_ref::<TouchEvent>() {
        let touch = touch_event.touches().get(0)?;
        (f64::from(touch.client_x()), f64::from(touch.client_y()))
    } else {
        let mouse = event.dyn_ref::<MouseEvent>()?;
        (f64::from(mouse.client_x()), f64::from(mouse.client_y()))
    };
    let rect = canvas.get_bounding_client_rect();
    Some(Point::new(client_x - rect.left(), client_y - rect.top()))
}

/// Wires the signature canvas, or returns `None` if the page has none.
///
/// A `data-detection="strokes"` attribute on the canvas switches detection
/// from the pixel scan to counting drawn segments.
pub fn init(document: &web_sys::Document) -> Result<Option<SharedPad>, JsValue> {
    let Some(canvas) = dom::by_id::<HtmlCanvasElement>(document, SIGNATURE_CANVAS_ID) else {
        return Ok(None);
    };

    let detection = match canvas.get_attribute("data-detection").as_deref() {
        Some("strokes") => SignatureDetection::StrokeCount,
        _ => SignatureDetection::AlphaScan,
    };
    let surface = CanvasSurface::new(canvas.clone())?.with_detection(detection);
    let width = surface.container_width();
    let pad = Rc::new(RefCell::new(SignaturePad::new(surface)));
    pad.borrow_mut().resize(width);

    let window = dom::window()?;
    let resize_pad = Rc::clone(&pad);
    dom::on(&window, "resize", move |_| {
        let mut pad = resize_pad.borrow_mut();
        let width = pad.surface().container_width();
        pad.resize(width);
    })?;

    for event in ["mousedown", "touchstart"] {
        let pad = Rc::clone(&pad);
        let canvas_for_cb = canvas.clone();
        dom::on(&canvas, event, move |e| {
            if let Some(point) = event_position(&canvas_for_cb, &e) {
                pad.borrow_mut().pointer_down(point);
            }
        })?;
    }

    for event in ["mousemove", "touchmove"] {
        let pad = Rc::clone(&pad);
        let canvas_for_cb = canvas.clone();
        dom::on(&canvas, event, move |e| {
            let mut pad = pad.borrow_mut();
            if !pad.is_drawing() {
                return;
            }
            e.prevent_default();
            if let Some(point) = event_position(&canvas_for_cb, &e) {
                pad.pointer_move(point);
            }
        })?;
    }

    for event in ["mouseup", "touchend"] {
        let pad = Rc::clone(&pad);
        dom::on(&canvas, event, move |_| pad.borrow_mut().pointer_up())?;
    }

    let leave_pad = Rc::clone(&pad);
    dom::on(&canvas, "mouseout", move |_| leave_pad.borrow_mut().pointer_leave())?;

    debug!(width, "signature pad ready");
    Ok(Some(pad))
}
