//! Clickable building blocks. Each one renders its text and registers
//! matching click targets, so the two can never drift apart.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::Style;
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::Paragraph;
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── ClickableList ──────────────────────────────────────────────

/// Lines for a `Paragraph`, some of them bound to an action.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Your turn"));
/// cl.push_clickable(Line::from("[1] Attack"), MENU_BASE);
/// cl.register_targets(area, &mut cs, 1, 1);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line index, action id)`
    actions: Vec<(usize, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len(), action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register one row target per clickable line. Offsets are the rows
    /// taken by borders above and below the content; lines past the bottom
    /// are clipped. Assumes no wrapping.
    pub fn register_targets(&self, area: Rect, cs: &mut ClickState, top_offset: u16, bottom_offset: u16) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);
        for &(idx, action_id) in &self.actions {
            let row = content_y as usize + idx;
            if row >= content_end as usize {
                continue;
            }
            cs.add_row_target(area, row as u16, action_id);
        }
    }
}

impl Default for ClickableList<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// ── ButtonRow ──────────────────────────────────────────────────

/// A single row of bracketed buttons with per-button hit regions.
///
/// ```ignore
/// ButtonRow::new(" ")
///     .button("[←]", style, PAD_LEFT)
///     .button("[→]", style, PAD_RIGHT)
///     .render(f, area, &mut cs);
/// ```
pub struct ButtonRow<'a> {
    buttons: Vec<(&'a str, Style, u16)>,
    gap: &'a str,
}

impl<'a> ButtonRow<'a> {
    pub fn new(gap: &'a str) -> Self {
        Self {
            buttons: Vec::new(),
            gap,
        }
    }

    pub fn button(mut self, label: &'a str, style: Style, action_id: u16) -> Self {
        self.buttons.push((label, style, action_id));
        self
    }

    /// `(x offset, width, action)` of each button, relative to the row start.
    pub fn layout(&self) -> Vec<(u16, u16, u16)> {
        let gap = Line::from(self.gap).width() as u16;
        let mut x = 0u16;
        let mut out = Vec::with_capacity(self.buttons.len());
        for (i, (label, _, action_id)) in self.buttons.iter().enumerate() {
            if i > 0 {
                x += gap;
            }
            let w = Line::from(*label).width() as u16;
            out.push((x, w, *action_id));
            x += w;
        }
        out
    }

    /// Draw on the first row of `area` and register the hit regions,
    /// clipped to the area's width.
    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        if area.height == 0 {
            return;
        }
        for (x, w, action_id) in self.layout() {
            if x >= area.width {
                break;
            }
            let w = w.min(area.width - x);
            cs.add_click_target(Rect::new(area.x + x, area.y, w, 1), action_id);
        }

        let mut spans = Vec::new();
        for (i, (label, style, _)) in self.buttons.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(self.gap));
            }
            spans.push(Span::styled(label, style));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), Rect::new(area.x, area.y, area.width, 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_targets_follow_their_lines() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("header"));
        cl.push_clickable(Line::from("[1] first"), 10);
        cl.push(Line::from("spacer"));
        cl.push_clickable(Line::from("[2] second"), 11);

        let area = Rect::new(0, 5, 40, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(3, 6), None);
        assert_eq!(cs.hit_test(3, 7), Some(10));
        assert_eq!(cs.hit_test(3, 8), None);
        assert_eq!(cs.hit_test(3, 9), Some(11));
    }

    #[test]
    fn list_clips_at_bottom_border() {
        let mut cl = ClickableList::new();
        for i in 0..10u16 {
            cl.push_clickable(Line::from(format!("item {}", i)), 50 + i);
        }
        let area = Rect::new(0, 0, 40, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);
        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 3), Some(52));
        assert_eq!(cs.hit_test(0, 4), None);
    }

    #[test]
    fn empty_list() {
        let cl: ClickableList = ClickableList::new();
        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 0, 10, 10), &mut cs, 0, 0);
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn button_row_layout_counts_gaps() {
        let row = ButtonRow::new("  ")
            .button("[←]", Style::default(), 3)
            .button("[↓]", Style::default(), 2)
            .button("[Z] OK", Style::default(), 5);
        assert_eq!(row.layout(), vec![(0, 3, 3), (5, 3, 2), (10, 6, 5)]);
    }
}
