//! Screen layout
//!
//! Computed from the frame size and state alone so that input handling can
//! map mouse positions onto panels without asking the renderer.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the chart coordinate box
pub const CHART_WIDTH: f64 = 260.0;
/// Height of the chart coordinate box
pub const CHART_HEIGHT: f64 = 100.0;

/// Suggestions shown at most
const MAX_SUGGESTION_ROWS: u16 = 6;

/// Areas of the dashboard screen, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub search: Rect,
    pub suggestions: Rect,
    pub favorites: Rect,
    pub current: Rect,
    pub chart: Rect,
    pub hourly: Rect,
    pub daily: Rect,
    pub footer: Rect,
}

/// Splits `area` into dashboard panels.
pub fn dashboard_layout(area: Rect, suggestion_count: usize) -> DashboardLayout {
    let suggestion_rows = (suggestion_count as u16).min(MAX_SUGGESTION_ROWS);
    let suggestions_height = if suggestion_rows == 0 {
        0
    } else {
        suggestion_rows + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(suggestions_height),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(1),
        ])
        .split(area);

    DashboardLayout {
        search: chunks[0],
        suggestions: chunks[1],
        favorites: chunks[2],
        current: chunks[3],
        chart: chunks[4],
        hourly: chunks[5],
        daily: chunks[6],
        footer: chunks[7],
    }
}

/// Area inside a one-cell border
pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Maps a terminal cell to a horizontal chart coordinate.
///
/// `plot` is the area the curve is drawn in. Its leftmost column maps to 0 and
/// its rightmost to [`CHART_WIDTH`]; cells outside it map to `None`.
pub fn pointer_to_chart_x(plot: Rect, column: u16, row: u16) -> Option<f64> {
    if !contains(plot, column, row) {
        return None;
    }
    let offset = f64::from(column - plot.x);
    let span = f64::from(plot.width.saturating_sub(1).max(1));
    Some((offset / span).min(1.0) * CHART_WIDTH)
}

/// Maps a terminal cell inside the suggestion box to a suggestion index.
pub fn suggestion_at(suggestions: Rect, count: usize, column: u16, row: u16) -> Option<usize> {
    let rows = inner(suggestions);
    if !contains(rows, column, row) {
        return None;
    }
    let index = usize::from(row - rows.y);
    (index < count).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_without_suggestions() {
        let layout = dashboard_layout(Rect::new(0, 0, 80, 45), 0);
        assert_eq!(layout.search.height, 3);
        assert_eq!(layout.suggestions.height, 0);
        assert_eq!(layout.footer.y, 44);
        assert!(layout.chart.height >= 7);
    }

    #[test]
    fn test_layout_grows_with_suggestions() {
        let layout = dashboard_layout(Rect::new(0, 0, 80, 50), 4);
        assert_eq!(layout.suggestions.height, 6);
        assert_eq!(layout.suggestions.y, 3);

        let capped = dashboard_layout(Rect::new(0, 0, 80, 50), 20);
        assert_eq!(capped.suggestions.height, 8);
    }

    #[test]
    fn test_pointer_edges_map_to_chart_edges() {
        let plot = Rect::new(10, 5, 41, 6);
        assert_eq!(pointer_to_chart_x(plot, 10, 7), Some(0.0));
        assert_eq!(pointer_to_chart_x(plot, 50, 7), Some(CHART_WIDTH));
        assert_eq!(pointer_to_chart_x(plot, 30, 7), Some(CHART_WIDTH / 2.0));
    }

    #[test]
    fn test_pointer_outside_plot_is_none() {
        let plot = Rect::new(10, 5, 41, 6);
        assert_eq!(pointer_to_chart_x(plot, 9, 7), None);
        assert_eq!(pointer_to_chart_x(plot, 51, 7), None);
        assert_eq!(pointer_to_chart_x(plot, 20, 4), None);
        assert_eq!(pointer_to_chart_x(plot, 20, 11), None);
    }

    #[test]
    fn test_suggestion_at() {
        let area = Rect::new(0, 3, 40, 5); // three rows inside the border
        assert_eq!(suggestion_at(area, 3, 5, 4), Some(0));
        assert_eq!(suggestion_at(area, 3, 5, 6), Some(2));
        assert_eq!(suggestion_at(area, 2, 5, 6), None);
        assert_eq!(suggestion_at(area, 3, 5, 3), None);
    }
}
