//! Application state management for WeatherNow
//!
//! [`DashboardState`] is an immutable record; every event is turned into an
//! [`Action`] and [`DashboardState::reduce`] returns the replacement record.
//! [`App`] owns the state together with the search controller and the forecast
//! refresher, and translates terminal events into actions and side effects.

use std::sync::Arc;

use chrono::Timelike;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::chart::{build_curve, resolve_tooltip, CurveGeometry, Tooltip};
use crate::cli::StartupConfig;
use crate::data::{
    default_favorites, default_location, Forecast, ForecastSource, Location, Suggestion,
    SuggestionSource,
};
use crate::refresh::{ForecastRefresher, RefreshMessage};
use crate::search::{QueryController, SearchEvent, SearchUpdate};
use crate::theme::{classify, ClassificationKey};
use crate::ui::layout::{
    dashboard_layout, inner, pointer_to_chart_x, suggestion_at, CHART_HEIGHT, CHART_WIDTH,
};

/// Hours covered by the temperature curve
pub const CHART_HOURS: usize = 24;

/// Which part of the screen receives typed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Dashboard,
}

/// Curve samples and the geometry built from them
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub samples: Vec<f64>,
    pub geometry: CurveGeometry,
}

impl ChartData {
    /// Builds the curve for the next [`CHART_HOURS`] hours of `forecast`.
    pub fn from_forecast(forecast: &Forecast) -> Self {
        let samples = forecast.temperature_window(CHART_HOURS);
        let geometry = build_curve(&samples, CHART_WIDTH, CHART_HEIGHT);
        Self { samples, geometry }
    }
}

/// Every way the dashboard state can change
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    QueryChanged(String),
    SuggestionsReplaced(Vec<Suggestion>),
    SuggestionsCleared,
    /// Move the highlighted suggestion by the given offset, wrapping
    SuggestionMoved(isize),
    LocationSelected(Location),
    /// Add the active location to favourites
    FavoriteAdded,
    ForecastRequested { seq: u64 },
    ForecastLoaded { seq: u64, forecast: Option<Forecast> },
    PointerMoved(Option<f64>),
    FocusChanged(Focus),
    HelpToggled,
}

/// Snapshot of everything the dashboard shows
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// Search field text
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    /// Highlighted suggestion, when the list is non-empty
    pub selected_suggestion: Option<usize>,
    /// Location the forecast is for
    pub location: Location,
    pub favorites: Vec<Location>,
    /// Latest forecast; `None` before the first load and after a failure
    pub forecast: Option<Forecast>,
    /// Curve for the forecast's next hours
    pub chart: Option<ChartData>,
    /// A forecast request is in flight
    pub loading: bool,
    /// Sequence of the latest forecast request
    pub forecast_seq: u64,
    /// Pointer position in chart space, while over the chart
    pub pointer_x: Option<f64>,
    pub focus: Focus,
    pub show_help: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(default_location())
    }
}

impl DashboardState {
    pub fn new(location: Location) -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            selected_suggestion: None,
            location,
            favorites: default_favorites(),
            forecast: None,
            chart: None,
            loading: false,
            forecast_seq: 0,
            pointer_x: None,
            focus: Focus::Dashboard,
            show_help: false,
        }
    }

    /// Applies `action`, returning the replacement state.
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::QueryChanged(query) => Self { query, ..self },
            Action::SuggestionsReplaced(suggestions) => Self {
                selected_suggestion: (!suggestions.is_empty()).then_some(0),
                suggestions,
                ..self
            },
            Action::SuggestionsCleared => Self {
                suggestions: Vec::new(),
                selected_suggestion: None,
                ..self
            },
            Action::SuggestionMoved(offset) => {
                let count = self.suggestions.len() as isize;
                if count == 0 {
                    return self;
                }
                let current = self.selected_suggestion.unwrap_or(0) as isize;
                let next = (current + offset).rem_euclid(count) as usize;
                Self {
                    selected_suggestion: Some(next),
                    ..self
                }
            }
            Action::LocationSelected(location) => Self {
                location,
                query: String::new(),
                suggestions: Vec::new(),
                selected_suggestion: None,
                pointer_x: None,
                focus: Focus::Dashboard,
                ..self
            },
            Action::FavoriteAdded => {
                if self.favorites.iter().any(|f| f.name == self.location.name) {
                    return self;
                }
                let mut favorites = self.favorites.clone();
                favorites.push(self.location.clone());
                Self { favorites, ..self }
            }
            Action::ForecastRequested { seq } => Self {
                forecast_seq: seq,
                loading: true,
                ..self
            },
            Action::ForecastLoaded { seq, forecast } => {
                if seq != self.forecast_seq {
                    tracing::debug!(seq, latest = self.forecast_seq, "stale forecast discarded");
                    return self;
                }
                Self {
                    chart: forecast.as_ref().map(ChartData::from_forecast),
                    forecast,
                    loading: false,
                    ..self
                }
            }
            Action::PointerMoved(pointer_x) => Self { pointer_x, ..self },
            Action::FocusChanged(focus) => Self { focus, ..self },
            Action::HelpToggled => Self {
                show_help: !self.show_help,
                ..self
            },
        }
    }

    /// Highlighted suggestion
    pub fn selected(&self) -> Option<&Suggestion> {
        self.selected_suggestion
            .and_then(|i| self.suggestions.get(i))
    }

    /// Tooltip under the pointer, if the pointer is over the chart
    pub fn tooltip(&self) -> Option<Tooltip> {
        let chart = self.chart.as_ref()?;
        resolve_tooltip(self.pointer_x?, &chart.geometry, &chart.samples)
    }

    /// Classification driving the theme; daytime until a forecast arrives
    pub fn classification(&self) -> ClassificationKey {
        match &self.forecast {
            Some(forecast) => classify(forecast.current.weather_code, forecast.current.time.hour()),
            None => ClassificationKey::Day,
        }
    }
}

/// Receivers the main loop listens on
pub struct AppChannels {
    pub search: mpsc::UnboundedReceiver<SearchEvent>,
    pub refresh: mpsc::Receiver<RefreshMessage>,
}

/// Main application struct managing state and background work
pub struct App {
    /// Current dashboard state
    pub state: DashboardState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Terminal size, for mapping mouse positions
    pub viewport: Rect,
    search: QueryController,
    refresher: ForecastRefresher,
}

impl App {
    /// Creates the app and the channels its background tasks report on.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        config: &StartupConfig,
        suggestions: Arc<dyn SuggestionSource>,
        forecasts: Arc<dyn ForecastSource>,
    ) -> (Self, AppChannels) {
        let (search, search_rx) = QueryController::new(suggestions, config.quiet_period);
        let (refresher, refresh_rx) = ForecastRefresher::spawn(forecasts, config.refresh.clone());

        let app = Self {
            state: DashboardState::new(config.location.clone()),
            should_quit: false,
            viewport: Rect::default(),
            search,
            refresher,
        };
        let channels = AppChannels {
            search: search_rx,
            refresh: refresh_rx,
        };
        (app, channels)
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    /// Requests a forecast for the active location
    pub fn request_forecast(&mut self) {
        let seq = self.state.forecast_seq + 1;
        self.dispatch(Action::ForecastRequested { seq });
        self.refresher.request(seq, self.state.location.clone());
    }

    /// Makes `location` active and fetches its forecast
    pub fn select_location(&mut self, location: Location) {
        tracing::info!(location = %location.name, "location selected");
        self.search.cancel();
        self.dispatch(Action::LocationSelected(location));
        self.request_forecast();
    }

    fn choose_suggestion(&mut self, index: usize) {
        if let Some(location) = self.state.suggestions.get(index).map(Suggestion::to_location) {
            self.select_location(location);
        }
    }

    fn update_query(&mut self, query: String) {
        let update = self.search.on_input(&query);
        self.dispatch(Action::QueryChanged(query));
        if update == SearchUpdate::Cleared {
            self.dispatch(Action::SuggestionsCleared);
        }
    }

    /// Clears the search field and anything pending for it
    fn clear_search(&mut self) {
        self.search.cancel();
        self.dispatch(Action::QueryChanged(String::new()));
        self.dispatch(Action::SuggestionsCleared);
    }

    /// Applies a message from the search controller's tasks
    pub fn handle_search_event(&mut self, event: SearchEvent) {
        if let Some(suggestions) = self.search.handle(event) {
            self.dispatch(Action::SuggestionsReplaced(suggestions));
        }
    }

    /// Applies a message from the refresher's tasks
    pub fn handle_refresh_message(&mut self, message: RefreshMessage) {
        match message {
            RefreshMessage::ForecastLoaded { seq, forecast, .. } => {
                self.dispatch(Action::ForecastLoaded { seq, forecast });
            }
            RefreshMessage::Tick => {
                if !self.state.loading {
                    self.request_forecast();
                }
            }
        }
    }

    /// Handles any terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Rect::new(0, 0, width, height);
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `Ctrl-C`: Quit from anywhere
    /// - Search focus: type to search, `Up`/`Down` highlight, `Enter` choose,
    ///   `Esc` clear (or leave when empty), `Tab` switch to dashboard
    /// - Dashboard focus: `/` or `Tab` search, `1`-`9` favourite, `f` add
    ///   favourite, `r` refresh, `Left`/`Right` chart cursor, `Esc` hide
    ///   tooltip, `?` help, `q` quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Help overlay intercepts all keys when shown
        if self.state.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.dispatch(Action::HelpToggled);
            }
            return;
        }

        match self.state.focus {
            Focus::Search => self.handle_search_key(key_event),
            Focus::Dashboard => self.handle_dashboard_key(key_event),
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char(c) => {
                let mut query = self.state.query.clone();
                query.push(c);
                self.update_query(query);
            }
            KeyCode::Backspace => {
                let mut query = self.state.query.clone();
                query.pop();
                self.update_query(query);
            }
            KeyCode::Up => self.dispatch(Action::SuggestionMoved(-1)),
            KeyCode::Down => self.dispatch(Action::SuggestionMoved(1)),
            KeyCode::Enter => {
                if let Some(index) = self.state.selected_suggestion {
                    self.choose_suggestion(index);
                }
            }
            KeyCode::Esc => {
                if self.state.query.is_empty() {
                    self.dispatch(Action::FocusChanged(Focus::Dashboard));
                } else {
                    self.clear_search();
                }
            }
            KeyCode::Tab => self.dispatch(Action::FocusChanged(Focus::Dashboard)),
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('/') | KeyCode::Tab => {
                self.dispatch(Action::FocusChanged(Focus::Search));
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                if let Some(favorite) = self.state.favorites.get(index).cloned() {
                    self.select_location(favorite);
                }
            }
            KeyCode::Char('f') => {
                self.dispatch(Action::FavoriteAdded);
            }
            KeyCode::Char('r') => {
                self.request_forecast();
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_chart_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_chart_cursor(1),
            KeyCode::Esc => {
                self.dispatch(Action::PointerMoved(None));
            }
            KeyCode::Char('?') => {
                self.dispatch(Action::HelpToggled);
            }
            _ => {}
        }
    }

    /// Moves the keyboard chart cursor by `offset` samples
    ///
    /// With no cursor shown, left starts at the last sample and right at the
    /// first.
    fn move_chart_cursor(&mut self, offset: isize) {
        let Some(chart) = self.state.chart.as_ref() else {
            return;
        };
        let count = chart.samples.len();
        if count == 0 {
            return;
        }

        let next = match self.state.tooltip() {
            Some(tooltip) => (tooltip.index as isize + offset).clamp(0, count as isize - 1) as usize,
            None if offset < 0 => count - 1,
            None => 0,
        };
        let x = chart.geometry.points[next].x;
        self.dispatch(Action::PointerMoved(Some(x)));
    }

    /// Handles mouse hover over the chart and clicks on suggestions
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let layout = dashboard_layout(self.viewport, self.state.suggestions.len());
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let pointer = pointer_to_chart_x(inner(layout.chart), mouse.column, mouse.row);
                if pointer != self.state.pointer_x {
                    self.dispatch(Action::PointerMoved(pointer));
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let count = self.state.suggestions.len();
                if let Some(index) = suggestion_at(layout.suggestions, count, mouse.column, mouse.row) {
                    self.choose_suggestion(index);
                }
            }
            _ => {}
        }
    }
}
