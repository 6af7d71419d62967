//! Dashboard screen UI
//!
//! Renders search, favourites, current conditions, the temperature curve, the
//! hourly strip and the weekly outlook from a [`DashboardState`].

use chrono::{NaiveDateTime, Timelike};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{DashboardState, Focus};
use crate::chart::round_display;
use crate::data::{DailyForecast, Forecast, HourlyForecast};
use crate::theme::{icon_for, theme_for, Theme};

use super::help_overlay;
use super::layout::{dashboard_layout, inner};
use super::widgets::TemperatureCurve;

/// Slots in the hourly strip
pub const HOURLY_SLOTS: usize = 12;
/// Days in the outlook
pub const OUTLOOK_DAYS: usize = 7;

const PLACEHOLDER: &str = "\u{2014}"; // —

/// Colours shared by every theme
mod colors {
    use ratatui::style::Color;

    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Unfocused borders and missing data
    pub const MUTED: Color = Color::DarkGray;
    /// Key names in hints
    pub const KEY: Color = Color::Yellow;
}

/// Renders the whole dashboard
pub fn render(frame: &mut Frame, state: &DashboardState) {
    let area = frame.area();
    let theme = theme_for(state.classification());
    let layout = dashboard_layout(area, state.suggestions.len());

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    render_search(frame, layout.search, state, &theme);
    if !state.suggestions.is_empty() {
        render_suggestions(frame, layout.suggestions, state, &theme);
    }
    render_favorites(frame, layout.favorites, state, &theme);
    render_current(frame, layout.current, state, &theme);
    render_chart(frame, layout.chart, state, &theme);
    render_hourly(frame, layout.hourly, state.forecast.as_ref(), &theme);
    render_daily(frame, layout.daily, state.forecast.as_ref(), &theme);
    render_footer(frame, layout.footer, state);

    if state.loading {
        render_loading(frame, layout.chart, &theme);
    }
    if state.show_help {
        help_overlay::render(frame);
    }
}

fn panel<'a>(title: &'a str, theme: &Theme, focused: bool) -> Block<'a> {
    let border = if focused { theme.accent } else { colors::MUTED };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_search(frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
    let focused = state.focus == Focus::Search;
    let content = if state.query.is_empty() && !focused {
        Line::from(Span::styled(
            "Press / to search for a city",
            Style::default().fg(colors::MUTED),
        ))
    } else {
        Line::from(Span::styled(
            state.query.clone(),
            Style::default().fg(colors::PRIMARY),
        ))
    };

    frame.render_widget(
        Paragraph::new(content).block(panel(" Search ", theme, focused)),
        area,
    );

    if focused {
        let text_area = inner(area);
        let offset = state.query.chars().count() as u16;
        if text_area.width > 0 {
            frame.set_cursor_position(Position::new(
                text_area.x + offset.min(text_area.width - 1),
                text_area.y,
            ));
        }
    }
}

fn render_suggestions(frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
    let lines: Vec<Line> = state
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, suggestion)| {
            let style = if state.selected_suggestion == Some(i) {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default().fg(colors::PRIMARY)
            };
            Line::from(Span::styled(format!(" {} ", suggestion.name), style))
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(panel(" Suggestions ", theme, true)),
        area,
    );
}

fn render_favorites(frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
    let mut spans = vec![Span::styled(" ★ ", Style::default().fg(theme.accent))];
    for (i, favorite) in state.favorites.iter().enumerate() {
        let mut style = theme.favorite_button;
        if favorite.name == state.location.name {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        if i < 9 {
            spans.push(Span::styled(format!("{}", i + 1), Style::default().fg(colors::KEY)));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(favorite.name.clone(), style));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled("f", Style::default().fg(colors::KEY)));
    spans.push(Span::styled(" add", Style::default().fg(colors::SECONDARY)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn temperature_text(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}°C", round_display(v)),
        None => "--°C".to_string(),
    }
}

fn measurement_text(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}{}", round_display(v), unit),
        None => PLACEHOLDER.to_string(),
    }
}

/// Builds the lines of the current conditions panel
fn build_current_lines(state: &DashboardState, theme: &Theme) -> Vec<Line<'static>> {
    let forecast = state.forecast.as_ref();
    let current = forecast.map(|f| &f.current);
    let slot = forecast.and_then(Forecast::current_hour);

    let icon = current.map(|c| icon_for(c.weather_code));
    let glyph = icon.map(|i| i.glyph()).unwrap_or(PLACEHOLDER);
    let label = icon
        .map(|i| i.label())
        .filter(|l| !l.is_empty())
        .unwrap_or(PLACEHOLDER);

    vec![
        Line::from(vec![
            Span::styled(
                temperature_text(current.map(|c| c.temperature)),
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(glyph.to_string()),
            Span::raw(" "),
            Span::styled(label.to_string(), Style::default().fg(theme.accent)),
        ]),
        Line::from(vec![
            Span::styled("Feels like ", Style::default().fg(colors::SECONDARY)),
            Span::raw(measurement_text(
                slot.and_then(|h| h.apparent_temperature),
                "°C",
            )),
            Span::styled("   Wind ", Style::default().fg(colors::SECONDARY)),
            Span::raw(measurement_text(current.map(|c| c.wind_speed), " km/h")),
            Span::styled("   Humidity ", Style::default().fg(colors::SECONDARY)),
            Span::raw(measurement_text(slot.and_then(|h| h.humidity), "%")),
        ]),
        Line::from(Span::styled(
            forecast
                .and_then(|f| f.timezone.clone())
                .unwrap_or_default(),
            Style::default().fg(colors::MUTED),
        )),
    ]
}

fn render_current(frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
    let title = format!(" {} ", state.location.name);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(
            title,
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(
        Paragraph::new(build_current_lines(state, theme)).block(block),
        area,
    );
}

fn render_chart(frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
    let block = panel(" Next 24 hours ", theme, false);

    match state.chart.as_ref() {
        Some(chart) if !chart.geometry.is_empty() => {
            let curve = TemperatureCurve::new(&chart.geometry, &chart.samples, *theme)
                .tooltip(state.tooltip())
                .block(block);
            frame.render_widget(curve, area);
        }
        _ => {
            let message = Paragraph::new(Line::from(Span::styled(
                "No forecast data",
                Style::default().fg(colors::MUTED),
            )))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(message, area);
        }
    }
}

/// Formats an hour (0-23) as "12 AM", "3 PM" and so on
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        13..=23 => format!("{} PM", hour - 12),
        _ => format!("{}:00", hour),
    }
}

fn build_hourly_slot(hour: &HourlyForecast) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            hour_label(hour.time.hour()),
            Style::default().fg(colors::SECONDARY),
        )),
        Line::from(icon_for(hour.weather_code).glyph()),
        Line::from(Span::styled(
            format!("{}°", round_display(hour.temperature)),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{:.1}mm", hour.precipitation),
            Style::default().fg(colors::SECONDARY),
        )),
    ]
}

fn render_hourly(frame: &mut Frame, area: Rect, forecast: Option<&Forecast>, theme: &Theme) {
    let block = panel(" Hourly ", theme, false);
    let slots_area = block.inner(area);
    frame.render_widget(block, area);

    let hours = forecast
        .map(|f| f.upcoming_hours(HOURLY_SLOTS))
        .unwrap_or_default();
    if hours.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No hourly forecast available",
                Style::default().fg(colors::MUTED),
            ))
            .alignment(Alignment::Center),
            slots_area,
        );
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Fill(1); HOURLY_SLOTS])
        .split(slots_area);

    for (hour, column) in hours.iter().zip(columns.iter()) {
        frame.render_widget(
            Paragraph::new(build_hourly_slot(hour)).alignment(Alignment::Center),
            *column,
        );
    }
}

fn clock(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Builds a single line of the weekly outlook
fn build_daily_line(day: &DailyForecast) -> Line<'static> {
    let icon = icon_for(day.weather_code);
    Line::from(vec![
        Span::styled(
            format!(" {:<4}", day.date.format("%a")),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{}  ", icon.glyph())),
        Span::styled(
            format!("{:<14}", icon.label()),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::styled(
            format!("☀ {} · {}", clock(day.sunrise), clock(day.sunset)),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{}°", round_display(day.temperature_max)),
            Style::default().fg(Color::LightRed),
        ),
        Span::raw(" / "),
        Span::styled(
            format!("{}°", round_display(day.temperature_min)),
            Style::default().fg(Color::LightBlue),
        ),
    ])
}

fn render_daily(frame: &mut Frame, area: Rect, forecast: Option<&Forecast>, theme: &Theme) {
    let days = forecast.map(|f| f.daily.as_slice()).unwrap_or_default();
    let lines: Vec<Line> = if days.is_empty() {
        vec![Line::from(Span::styled(
            "No daily forecast available",
            Style::default().fg(colors::MUTED),
        ))]
    } else {
        days.iter().take(OUTLOOK_DAYS).map(build_daily_line).collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(panel(" 7-day outlook ", theme, false)),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let updated = clock(state.forecast.as_ref().map(|f| f.current.time));
    let mut spans = vec![
        Span::styled(
            format!(" Updated: {}", updated),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::raw("   "),
    ];

    let hints: &[(&str, &str)] = match state.focus {
        Focus::Search => &[("↑/↓", "Select"), ("Enter", "Go"), ("Esc", "Clear"), ("Tab", "Dashboard")],
        Focus::Dashboard => &[("/", "Search"), ("1-9", "Favorite"), ("←/→", "Chart"), ("r", "Refresh"), ("?", "Help"), ("q", "Quit")],
    };
    for (key, description) in hints {
        spans.push(Span::styled(*key, Style::default().fg(colors::KEY)));
        spans.push(Span::styled(
            format!(" {}  ", description),
            Style::default().fg(colors::SECONDARY),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme) {
    let width = 24.min(area.width);
    let height = 3.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new("Loading forecast…")
            .alignment(Alignment::Center)
            .block(panel("", theme, true)),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Action;
    use crate::data::{Location, Suggestion, WeatherSnapshot};
    use chrono::{Duration, NaiveDate};
    use ratatui::{backend::TestBackend, Terminal};

    fn sample_forecast() -> Forecast {
        let start = NaiveDate::from_ymd_opt(2024, 7, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let hourly = (0..48)
            .map(|i| HourlyForecast {
                time: start + Duration::hours(i),
                temperature: 12.0 + (i % 24) as f64 * 0.5,
                apparent_temperature: Some(11.4),
                precipitation: 0.2,
                weather_code: 61,
                humidity: Some(81.0),
                wind_speed: Some(14.0),
            })
            .collect();
        let daily = (0..7)
            .map(|i| DailyForecast {
                date: start.date() + Duration::days(i),
                temperature_max: 24.6,
                temperature_min: 13.2,
                weather_code: 3,
                sunrise: Some(start + Duration::days(i) + Duration::minutes(5 * 60 + 48)),
                sunset: Some(start + Duration::days(i) + Duration::minutes(20 * 60 + 31)),
            })
            .collect();
        Forecast {
            current: WeatherSnapshot {
                temperature: 18.5,
                wind_speed: 14.2,
                weather_code: 61,
                time: start + Duration::hours(15) + Duration::minutes(30),
            },
            hourly,
            daily,
            timezone: Some("America/Los_Angeles".to_string()),
        }
    }

    fn loaded_state() -> DashboardState {
        DashboardState::default()
            .reduce(Action::ForecastRequested { seq: 1 })
            .reduce(Action::ForecastLoaded {
                seq: 1,
                forecast: Some(sample_forecast()),
            })
    }

    fn render_to_string(state: &DashboardState, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_hour_label() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(9), "9 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(15), "3 PM");
        assert_eq!(hour_label(23), "11 PM");
    }

    #[test]
    fn test_placeholders_without_forecast() {
        let content = render_to_string(&DashboardState::default(), 100, 45);
        assert!(content.contains("San Francisco"));
        assert!(content.contains("--°C"));
        assert!(content.contains(PLACEHOLDER));
        assert!(content.contains("No forecast data"));
        assert!(content.contains("Updated: \u{2014}"));
    }

    #[test]
    fn test_current_conditions_render() {
        let content = render_to_string(&loaded_state(), 100, 45);
        // 18.5 rounds half up
        assert!(content.contains("19°C"));
        assert!(content.contains("Rain"));
        assert!(content.contains("14 km/h"));
        assert!(content.contains("81%"));
        assert!(content.contains("Updated: 15:30"));
    }

    #[test]
    fn test_hourly_strip_starts_at_current_hour() {
        let content = render_to_string(&loaded_state(), 120, 45);
        // 3 PM through 2 AM
        assert!(content.contains("3 PM"));
        assert!(content.contains("2 AM"));
        assert!(!content.contains("2 PM"));
        assert!(content.contains("0.2mm"));
    }

    #[test]
    fn test_daily_outlook_renders() {
        let content = render_to_string(&loaded_state(), 100, 45);
        assert!(content.contains("Mon"));
        assert!(content.contains("05:48 · 20:31"));
        assert!(content.contains("25° / 13°"));
    }

    #[test]
    fn test_suggestions_render_when_present() {
        let state = DashboardState::default()
            .reduce(Action::FocusChanged(Focus::Search))
            .reduce(Action::QueryChanged("par".to_string()))
            .reduce(Action::SuggestionsReplaced(vec![Suggestion {
                name: "Paris, Île-de-France, France".to_string(),
                latitude: 48.85,
                longitude: 2.35,
            }]));
        let content = render_to_string(&state, 100, 50);
        assert!(content.contains("par"));
        assert!(content.contains("Paris, Île-de-France, France"));
    }

    #[test]
    fn test_favorites_render() {
        let state = DashboardState::new(Location::new("Tokyo", 35.6762, 139.6503));
        let content = render_to_string(&state, 100, 45);
        assert!(content.contains("Denver"));
        assert!(content.contains("Bali"));
        assert!(content.contains("Tokyo"));
    }

    #[test]
    fn test_loading_indicator() {
        let state = DashboardState::default().reduce(Action::ForecastRequested { seq: 1 });
        let content = render_to_string(&state, 100, 45);
        assert!(content.contains("Loading forecast"));
    }

    #[test]
    fn test_help_overlay_shown() {
        let state = DashboardState::default().reduce(Action::HelpToggled);
        let content = render_to_string(&state, 100, 45);
        assert!(content.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        let _ = render_to_string(&loaded_state(), 20, 10);
        let _ = render_to_string(&DashboardState::default().reduce(Action::ForecastRequested { seq: 1 }), 5, 3);
    }
}
