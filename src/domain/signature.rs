//! Pixel-level signature surface.
//!
//! The surface is an RGBA buffer of fixed height whose width follows its
//! container. Strokes are rasterized directly into the buffer so that
//! "is anything drawn" can be answered from the alpha channel alone.

use crate::domain::models::Point;

/// Height of the signature surface in pixels.
pub const SURFACE_HEIGHT: u32 = 150;
/// Pixels taken by the container border on each resize.
pub const BORDER_ALLOWANCE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: [u8; 3],
    pub line_width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl StrokeStyle {
    /// CSS form of the stroke color.
    pub fn css_color(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.color[0], self.color[1], self.color[2])
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: [0x00, 0x23, 0x66],
            line_width: 2.0,
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }
}

/// How a surface decides that a signature is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureDetection {
    /// Any pixel with a non-zero alpha.
    #[default]
    AlphaScan,
    /// At least one segment drawn since the last clear.
    StrokeCount,
}

impl SignatureDetection {
    /// Applies the strategy. `scan` reads the surface's pixels and is only
    /// called for [`SignatureDetection::AlphaScan`].
    pub fn detect(self, segments: usize, scan: impl FnOnce() -> bool) -> bool {
        match self {
            SignatureDetection::AlphaScan => scan(),
            SignatureDetection::StrokeCount => segments > 0,
        }
    }
}

/// True iff any pixel of an RGBA buffer has a non-zero alpha.
pub fn any_alpha(rgba: &[u8]) -> bool {
    rgba.chunks_exact(4).any(|px| px[3] > 0)
}

/// Anything that can be asked whether a signature was provided.
pub trait SignatureCheck {
    fn has_signature(&self) -> bool;
}

/// Backend a signature pad draws onto.
pub trait DrawingSurface {
    /// Re-derives the pixel size from the container width. Discards strokes
    /// and resets the stroke style.
    fn resize(&mut self, container_width: u32);
    fn draw_segment(&mut self, from: Point, to: Point);
    fn clear(&mut self);
    fn has_signature(&self) -> bool;
}

/// In-memory RGBA surface.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    style: StrokeStyle,
    detection: SignatureDetection,
    segments: usize,
}

impl PixelSurface {
    pub fn new(container_width: u32) -> Self {
        let mut surface = Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            style: StrokeStyle::default(),
            detection: SignatureDetection::default(),
            segments: 0,
        };
        surface.resize(container_width);
        surface
    }

    pub fn with_detection(mut self, detection: SignatureDetection) -> Self {
        self.detection = detection;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    pub fn detection(&self) -> SignatureDetection {
        self.detection
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = ((y * self.width + x) * 4 + 3) as usize;
        self.pixels.get(index).copied()
    }

    /// True when any pixel in the half-open box `[x0, x1) × [y0, y1)` is
    /// painted. The box is clipped to the surface.
    pub fn region_inked(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        (y0..y1).any(|y| (x0..x1).any(|x| self.alpha_at(x, y).is_some_and(|a| a > 0)))
    }

    fn paint(&mut self, x: u32, y: u32) {
        let base = ((y * self.width + x) * 4) as usize;
        let [r, g, b] = self.style.color;
        self.pixels[base..base + 4].copy_from_slice(&[r, g, b, 255]);
    }
}

impl DrawingSurface for PixelSurface {
    fn resize(&mut self, container_width: u32) {
        self.width = container_width.saturating_sub(BORDER_ALLOWANCE);
        self.height = SURFACE_HEIGHT;
        self.pixels = vec![0; (self.width * self.height * 4) as usize];
        self.style = StrokeStyle::default();
        self.segments = 0;
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        self.segments += 1;
        if self.width == 0 || self.height == 0 {
            return;
        }

        // Round caps and joins fall out of painting every pixel whose centre
        // is within half a line width of the segment.
        let radius = (self.style.line_width / 2.0).max(0.5);
        let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
        let max_x = (from.x.max(to.x) + radius).ceil().min(self.width as f64 - 1.0);
        let max_y = (from.y.max(to.y) + radius).ceil().min(self.height as f64 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let centre = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if distance_to_segment(centre, from, to) <= radius {
                    self.paint(x, y);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
        self.segments = 0;
    }

    fn has_signature(&self) -> bool {
        self.detection.detect(self.segments, || any_alpha(&self.pixels))
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_subtracts_border_and_fixes_height() {
        let surface = PixelSurface::new(404);
        assert_eq!(surface.width(), 400);
        assert_eq!(surface.height(), SURFACE_HEIGHT);
        assert_eq!(surface.pixels().len(), 400 * 150 * 4);

        let narrow = PixelSurface::new(2);
        assert_eq!(narrow.width(), 0);
        assert!(narrow.pixels().is_empty());
    }

    #[test]
    fn test_fresh_surface_has_no_signature() {
        let surface = PixelSurface::new(300);
        assert!(!surface.has_signature());
    }

    #[test]
    fn test_segment_paints_pixels() {
        let mut surface = PixelSurface::new(300);
        surface.draw_segment(Point::new(10.0, 10.0), Point::new(40.0, 30.0));
        assert!(surface.has_signature());
        assert_eq!(surface.alpha_at(10, 10), Some(255));
        assert_eq!(surface.alpha_at(200, 100), Some(0));
    }

    #[test]
    fn test_clear_erases_everything() {
        let mut surface = PixelSurface::new(300);
        surface.draw_segment(Point::new(5.0, 5.0), Point::new(50.0, 50.0));
        surface.clear();
        assert!(!surface.has_signature());
        assert!(surface.pixels().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_resize_discards_strokes_and_style() {
        let mut surface = PixelSurface::new(300);
        surface.set_style(StrokeStyle {
            line_width: 8.0,
            ..StrokeStyle::default()
        });
        surface.draw_segment(Point::new(5.0, 5.0), Point::new(50.0, 50.0));
        surface.resize(500);
        assert!(!surface.has_signature());
        assert_eq!(surface.width(), 496);
        assert_eq!(*surface.style(), StrokeStyle::default());
    }

    #[test]
    fn test_segment_outside_surface_paints_nothing() {
        let mut surface = PixelSurface::new(104);
        surface.draw_segment(Point::new(-50.0, -50.0), Point::new(-20.0, -20.0));
        assert!(!surface.has_signature());
    }

    #[test]
    fn test_stroke_count_detection() {
        let mut surface = PixelSurface::new(2).with_detection(SignatureDetection::StrokeCount);
        assert!(!surface.has_signature());
        // Zero-width surface still counts the stroke.
        surface.draw_segment(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert!(surface.has_signature());
        surface.clear();
        assert!(!surface.has_signature());
    }

    #[test]
    fn test_detect_only_scans_for_alpha_strategy() {
        assert!(SignatureDetection::AlphaScan.detect(0, || true));
        assert!(!SignatureDetection::AlphaScan.detect(5, || false));
        assert!(SignatureDetection::StrokeCount.detect(1, || panic!("scanned")));
        assert!(!SignatureDetection::StrokeCount.detect(0, || panic!("scanned")));
    }

    #[test]
    fn test_region_inked() {
        let mut surface = PixelSurface::new(104);
        surface.draw_segment(Point::new(50.0, 75.0), Point::new(50.0, 75.0));
        assert!(surface.region_inked(40, 70, 60, 80));
        assert!(!surface.region_inked(0, 0, 20, 20));
        assert!(!surface.region_inked(90, 140, 500, 500));
    }

    #[test]
    fn test_any_alpha_reads_only_alpha_channel() {
        assert!(!any_alpha(&[255, 255, 255, 0, 10, 20, 30, 0]));
        assert!(any_alpha(&[0, 0, 0, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn test_css_color() {
        assert_eq!(StrokeStyle::default().css_color(), "#002366");
    }
}
