//! Stateless rules behind the page's smaller collaborators.

use chrono::NaiveDate;

/// Scroll offset past which the header switches to its compact look.
pub const HEADER_SCROLL_THRESHOLD: f64 = 50.0;
/// Widest viewport at which the navigation menu behaves as a drawer.
pub const MOBILE_NAV_BREAKPOINT: f64 = 992.0;
/// Header height assumed when the page has no header element.
pub const DEFAULT_HEADER_HEIGHT: f64 = 80.0;
/// Gap kept between the header and an anchor's target.
pub const ANCHOR_MARGIN: f64 = 20.0;
/// Date inputs that default to today when left empty.
pub const DEFAULTED_DATE_FIELDS: [&str; 2] = ["instructionDate", "signatureDate"];

const FILE_SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count with binary prefixes and at most two decimals.
///
/// # Examples
///
/// ```
/// use servform::domain::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1048576), "1 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < FILE_SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{scaled:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, FILE_SIZE_UNITS[unit])
}

/// Header scroll affordance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderState {
    pub scrolled: bool,
}

impl HeaderState {
    /// Applies a new scroll position; returns true when the look changed.
    pub fn update(&mut self, scroll_y: f64) -> bool {
        let scrolled = scroll_y > HEADER_SCROLL_THRESHOLD;
        let changed = scrolled != self.scrolled;
        self.scrolled = scrolled;
        changed
    }
}

/// Mobile navigation drawer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavMenu {
    pub open: bool,
}

impl NavMenu {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Following a menu link closes the drawer on narrow viewports only.
    pub fn on_link_click(&mut self, viewport_width: f64) {
        if viewport_width <= MOBILE_NAV_BREAKPOINT {
            self.close();
        }
    }

    pub fn on_document_click(&mut self, inside_menu: bool, inside_toggle: bool) {
        if !inside_menu && !inside_toggle {
            self.close();
        }
    }
}

/// Scroll position for an in-page anchor, or `None` for a bare `#`.
pub fn anchor_scroll_target(href: &str, target_top: f64, header_height: Option<f64>) -> Option<f64> {
    if href == "#" {
        return None;
    }
    let header = header_height.unwrap_or(DEFAULT_HEADER_HEIGHT);
    Some(target_top - header - ANCHOR_MARGIN)
}

/// Value to pre-fill into a date input, if it is one of the defaulted
/// fields and still empty.
pub fn default_date_value(field_id: &str, current: &str, today: NaiveDate) -> Option<String> {
    if !current.is_empty() || !DEFAULTED_DATE_FIELDS.contains(&field_id) {
        return None;
    }
    Some(today.format("%Y-%m-%d").to_string())
}

/// Secondary single-page forms that only acknowledge a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryForm {
    Contact,
    Referral,
}

impl InquiryForm {
    pub fn element_id(&self) -> &'static str {
        match self {
            InquiryForm::Contact => "contactForm",
            InquiryForm::Referral => "referralForm",
        }
    }

    pub fn acknowledgement(&self) -> &'static str {
        match self {
            InquiryForm::Contact => "Thank you for your message! We will get back to you shortly.",
            InquiryForm::Referral => "Thank you for your referral! We will contact your referral shortly.",
        }
    }
}
