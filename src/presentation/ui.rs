use crate::application::{App, AppMode, CellArea, FocusTarget, IndicatorState, NoticeLevel};
use crate::domain::PixelSurface;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Rows given to the signature box, borders included.
const SIGNATURE_ROWS: u16 = 8;

/// Where each part of the screen goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub form: Rect,
    pub signature: Option<Rect>,
    pub status: Rect,
}

pub fn screen_layout(area: Rect, with_signature: bool) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let (form, signature) = if with_signature {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(SIGNATURE_ROWS)])
            .split(chunks[1]);
        (body[0], Some(body[1]))
    } else {
        (chunks[1], None)
    };

    ScreenLayout {
        header: chunks[0],
        form,
        signature,
        status: chunks[2],
    }
}

fn signature_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title("Signature (draw with the mouse)")
}

/// Cells inside the signature box for a frame of size `area`, if the
/// current step shows one.
pub fn signature_cells(area: Rect, app: &App) -> Option<CellArea> {
    let outer = screen_layout(area, app.signature_visible()).signature?;
    let inner = signature_block().inner(outer);
    Some(CellArea {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: inner.height,
    })
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let layout = screen_layout(f.area(), app.signature_visible());

    render_header(f, app, layout.header);
    render_form(f, app, layout.form);
    if let Some(area) = layout.signature {
        render_signature(f, app, area);
    }
    render_status_bar(f, app, layout.status);

    if matches!(app.mode, AppMode::Notice) {
        render_notice_popup(f, app);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let definition = app.wizard.definition();
    let mut spans = Vec::new();
    for (index, state) in app.wizard.view().indicators.iter().enumerate() {
        let title = definition.steps.get(index).map(|p| p.title.as_str()).unwrap_or("");
        let (marker, style) = match state {
            IndicatorState::Completed => ("✓", Style::default().fg(Color::Green)),
            IndicatorState::Active => (
                "●",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            IndicatorState::Neutral => ("○", Style::default().fg(Color::DarkGray)),
        };
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!("{} {}. {}", marker, index + 1, title), style));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(definition.title.clone()),
    );
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let Some(panel) = app.wizard.current_panel() else {
        return;
    };
    let focused = app.focused();
    let mut lines = Vec::new();

    for target in app.focus_targets() {
        let highlight = if focused == Some(target) {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        match target {
            FocusTarget::Service(index) => {
                let Some(service) = panel.services.get(index) else {
                    continue;
                };
                let style = if service.selected() {
                    highlight.fg(Color::Green)
                } else {
                    highlight
                };
                let mark = if service.checked { "x" } else { " " };
                lines.push(Line::styled(format!("[{}] {}", mark, service.label), style));
            }
            FocusTarget::Field(index) => {
                let Some(field) = panel.fields.get(index) else {
                    continue;
                };
                let required = if field.required { "*" } else { "" };
                let value = if app.editing == Some(target) {
                    let mut shown = app.input.clone();
                    shown.insert(app.cursor_position, '|');
                    shown
                } else {
                    field.value.clone()
                };
                let mut spans = vec![Span::styled(
                    format!("{}{}: {}", field.label, required, value),
                    highlight,
                )];
                if field.error {
                    spans.push(Span::styled(
                        "  (required)",
                        Style::default().fg(Color::Red),
                    ));
                }
                lines.push(Line::from(spans));
            }
            FocusTarget::Documents => {
                let summary = if app.editing == Some(target) {
                    let mut shown = app.input.clone();
                    shown.insert(app.cursor_position, '|');
                    format!("Documents: {}", shown)
                } else if app.files.is_empty() {
                    "Documents: none attached".to_string()
                } else {
                    format!("Documents: {} attached", app.files.entries().len())
                };
                lines.push(Line::styled(summary, highlight));
                for (name, size) in app.files.rows() {
                    lines.push(Line::styled(
                        format!("    {}  {}", name, size),
                        Style::default().fg(Color::Gray),
                    ));
                }
            }
            FocusTarget::Terms => {
                let mark = if app.wizard.terms_agreed() == Some(true) { "x" } else { " " };
                lines.push(Line::styled(
                    format!("[{}] I agree to the Terms & Conditions", mark),
                    highlight,
                ));
            }
            FocusTarget::ClearSignature => {
                lines.push(Line::styled("[ Clear signature ]", highlight));
            }
            FocusTarget::Previous => lines.push(Line::styled("< Previous", highlight)),
            FocusTarget::Next => lines.push(Line::styled("Next >", highlight)),
            FocusTarget::Submit => lines.push(Line::styled(
                "Submit Request",
                highlight.fg(Color::Yellow),
            )),
        }
    }

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Step {}: {}", panel.step, panel.title)),
    );
    f.render_widget(form, area);
}

fn render_signature(f: &mut Frame, app: &App, area: Rect) {
    let block = signature_block();
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(pad) = app.signature.as_ref() {
        let lines: Vec<Line> = signature_lines(pad.surface(), inner.width, inner.height)
            .into_iter()
            .map(|l| Line::styled(l, Style::default().fg(Color::Blue)))
            .collect();
        f.render_widget(Paragraph::new(lines), inner);
    }
}

/// Down-samples the surface into braille cells, 2x4 dots per cell.
pub fn signature_lines(surface: &PixelSurface, cols: u16, rows: u16) -> Vec<String> {
    const DOTS: [[u32; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];
    let (width, height) = (surface.width(), surface.height());
    let (sub_cols, sub_rows) = (u32::from(cols) * 2, u32::from(rows) * 4);
    if sub_cols == 0 || sub_rows == 0 {
        return Vec::new();
    }

    (0..u32::from(rows))
        .map(|row| {
            (0..u32::from(cols))
                .map(|col| {
                    let mut bits = 0;
                    for (dx, column) in DOTS.iter().enumerate() {
                        for (dy, bit) in column.iter().enumerate() {
                            let sx = col * 2 + dx as u32;
                            let sy = row * 4 + dy as u32;
                            let x0 = sx * width / sub_cols;
                            let x1 = ((sx + 1) * width).div_ceil(sub_cols);
                            let y0 = sy * height / sub_rows;
                            let y1 = ((sy + 1) * height).div_ceil(sub_rows);
                            if surface.region_inked(x0, y0, x1, y1) {
                                bits |= bit;
                            }
                        }
                    }
                    if bits == 0 {
                        ' '
                    } else {
                        char::from_u32(0x2800 + bits).unwrap_or('#')
                    }
                })
                .collect()
        })
        .collect()
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                format!(
                    "Step {} of {} | Tab/↑↓: move | Enter: edit/press | Space: toggle | Ctrl+N/P: next/previous | Ctrl+S: submit | q: quit",
                    app.wizard.current_step(),
                    app.wizard.total_steps()
                )
            }
        }
        AppMode::Editing => match app.editing {
            Some(FocusTarget::Documents) => {
                "Comma-separated file paths (Enter to attach, Esc to cancel)".to_string()
            }
            _ => "Editing (Enter to save, Esc to cancel)".to_string(),
        },
        AppMode::Notice => "Enter/Esc: dismiss".to_string(),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Notice => Style::default().fg(Color::Cyan),
        });
    f.render_widget(status, area);
}

fn render_notice_popup(f: &mut Frame, app: &App) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 5,
        y: area.height / 3,
        width: area.width * 3 / 5,
        height: 5.min(area.height),
    };

    let (title, color) = match notice.level {
        NoticeLevel::Success => ("Submitted", Color::Green),
        NoticeLevel::Error => ("Please check the form", Color::Red),
    };

    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(notice.message.clone())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(color)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(popup, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Notice;
    use crate::application::Notifier;
    use crate::domain::{DrawingSurface, FormDefinition, Point};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_layout_reserves_signature_rows() {
        let area = Rect::new(0, 0, 80, 30);
        let with = screen_layout(area, true);
        let without = screen_layout(area, false);
        assert_eq!(with.signature.unwrap().height, SIGNATURE_ROWS);
        assert!(without.signature.is_none());
        assert_eq!(with.form.height + SIGNATURE_ROWS, without.form.height);
    }

    #[test]
    fn test_signature_cells_only_on_last_step() {
        let mut app = App::new(FormDefinition::default()).unwrap();
        let area = Rect::new(0, 0, 80, 30);
        assert!(signature_cells(area, &app).is_none());
        app.wizard.show_step(3).unwrap();
        let cells = signature_cells(area, &app).unwrap();
        assert_eq!(cells.width, 78);
        assert_eq!(cells.height, SIGNATURE_ROWS - 2);
    }

    #[test]
    fn test_signature_lines_blank_and_inked() {
        let mut surface = PixelSurface::new(84);
        let blank = signature_lines(&surface, 10, 3);
        assert_eq!(blank.len(), 3);
        assert!(blank.iter().all(|l| l.chars().all(|c| c == ' ')));

        surface.draw_segment(Point::new(0.0, 0.0), Point::new(79.0, 149.0));
        let inked = signature_lines(&surface, 10, 3);
        assert!(inked[0].chars().next().is_some_and(|c| c != ' '));
        assert!(inked[2].chars().last().is_some_and(|c| c != ' '));
    }

    #[test]
    fn test_render_first_step() {
        let app = App::new(FormDefinition::default()).unwrap();
        let text = screen_text(&app);
        assert!(text.contains("Service Request"));
        assert!(text.contains("Residential Appraisal"));
        assert!(text.contains("Next >"));
        assert!(!text.contains("Submit Request"));
    }

    #[test]
    fn test_render_notice_popup() {
        let mut app = App::new(FormDefinition::default()).unwrap();
        app.notify(Notice::error("Please provide your signature."));
        let text = screen_text(&app);
        assert!(text.contains("Please provide your signature."));
    }
}
