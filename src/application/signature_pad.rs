use tracing::debug;

use crate::domain::{DrawingSurface, Point, SignatureCheck};

/// Pointer state of a signature pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeState {
    Idle,
    Drawing { last: Point },
}

/// Turns pointer and touch events into strokes on a drawing surface.
#[derive(Debug, Clone)]
pub struct SignaturePad<S: DrawingSurface> {
    surface: S,
    state: StrokeState,
}

impl<S: DrawingSurface> SignaturePad<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            state: StrokeState::Idle,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    pub fn pointer_down(&mut self, at: Point) {
        self.state = StrokeState::Drawing { last: at };
    }

    /// Extends the current stroke to `at`. Returns false when idle.
    pub fn pointer_move(&mut self, at: Point) -> bool {
        let StrokeState::Drawing { last } = self.state else {
            return false;
        };
        self.surface.draw_segment(last, at);
        self.state = StrokeState::Drawing { last: at };
        true
    }

    pub fn pointer_up(&mut self) {
        self.state = StrokeState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.state = StrokeState::Idle;
    }

    pub fn resize(&mut self, container_width: u32) {
        debug!(container_width, "signature surface resized");
        self.surface.resize(container_width);
        self.state = StrokeState::Idle;
    }

    pub fn clear(&mut self) {
        debug!("signature cleared");
        self.surface.clear();
    }

    pub fn has_signature(&self) -> bool {
        self.surface.has_signature()
    }
}

impl<S: DrawingSurface> SignatureCheck for SignaturePad<S> {
    fn has_signature(&self) -> bool {
        self.surface.has_signature()
    }
}
