//! Weather classification and visual theming
//!
//! Maps Open-Meteo WMO weather codes and the local hour to a small set of
//! classification keys, and each key to a fixed colour theme. Also maps raw
//! codes to the icon shown next to conditions.

use ratatui::style::{Color, Modifier, Style};

/// Semantic weather/time category used to select a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationKey {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Day,
    Night,
}

impl ClassificationKey {
    /// All keys, in declaration order
    pub const ALL: [ClassificationKey; 6] = [
        ClassificationKey::Clear,
        ClassificationKey::Cloudy,
        ClassificationKey::Rain,
        ClassificationKey::Snow,
        ClassificationKey::Day,
        ClassificationKey::Night,
    ];
}

/// First hour (inclusive) considered daytime
const DAY_START_HOUR: u32 = 6;
/// First hour (inclusive) considered night again
const NIGHT_START_HOUR: u32 = 19;

/// Classifies a weather code observed at a local hour (0-23).
///
/// Rules are checked top to bottom and the first match wins:
/// 1. 71 -> Snow
/// 2. 61, 80, 95, 96, 99 -> Rain
/// 3. 2, 3, 45, 48 -> Cloudy
/// 4. 0, 1 -> Clear (regardless of hour)
/// 5. hour in [6, 19) -> Day
/// 6. otherwise Night
pub fn classify(weather_code: u8, local_hour: u32) -> ClassificationKey {
    match weather_code {
        71 => ClassificationKey::Snow,
        61 | 80 | 95 | 96 | 99 => ClassificationKey::Rain,
        2 | 3 | 45 | 48 => ClassificationKey::Cloudy,
        0 | 1 => ClassificationKey::Clear,
        _ if (DAY_START_HOUR..NIGHT_START_HOUR).contains(&local_hour) => ClassificationKey::Day,
        _ => ClassificationKey::Night,
    }
}

/// Colours and styles applied to the dashboard for one classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Panel background
    pub background: Color,
    /// Border and heading accent
    pub accent: Color,
    /// Stroke colour of the temperature curve
    pub curve: Color,
    /// Filled area under the curve
    pub curve_fill: Color,
    /// Tooltip label style
    pub tooltip: Style,
    /// Favourite button style
    pub favorite_button: Style,
}

/// Returns the theme for a classification key.
pub fn theme_for(key: ClassificationKey) -> Theme {
    match key {
        ClassificationKey::Clear => Theme {
            background: Color::Rgb(120, 90, 20),
            accent: Color::Yellow,
            curve: Color::LightYellow,
            curve_fill: Color::Rgb(170, 140, 50),
            tooltip: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            favorite_button: Style::default().fg(Color::Yellow),
        },
        ClassificationKey::Cloudy => Theme {
            background: Color::Rgb(60, 66, 78),
            accent: Color::Gray,
            curve: Color::White,
            curve_fill: Color::Rgb(110, 116, 128),
            tooltip: Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            favorite_button: Style::default().fg(Color::Gray),
        },
        ClassificationKey::Rain => Theme {
            background: Color::Rgb(24, 46, 96),
            accent: Color::LightBlue,
            curve: Color::LightCyan,
            curve_fill: Color::Rgb(50, 90, 150),
            tooltip: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            favorite_button: Style::default().fg(Color::LightBlue),
        },
        ClassificationKey::Snow => Theme {
            background: Color::Rgb(70, 90, 110),
            accent: Color::White,
            curve: Color::White,
            curve_fill: Color::Rgb(150, 170, 190),
            tooltip: Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
            favorite_button: Style::default().fg(Color::White),
        },
        ClassificationKey::Day => Theme {
            background: Color::Rgb(30, 70, 110),
            accent: Color::Cyan,
            curve: Color::White,
            curve_fill: Color::Rgb(70, 120, 170),
            tooltip: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            favorite_button: Style::default().fg(Color::Cyan),
        },
        ClassificationKey::Night => Theme {
            background: Color::Rgb(15, 20, 45),
            accent: Color::Magenta,
            curve: Color::LightMagenta,
            curve_fill: Color::Rgb(50, 45, 95),
            tooltip: Style::default()
                .fg(Color::White)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            favorite_button: Style::default().fg(Color::LightMagenta),
        },
    }
}

/// Display icon for a raw weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    RimeFog,
    Drizzle,
    Rain,
    Showers,
    Thunderstorm,
    Snow,
    /// Neutral icon for codes without a dedicated entry
    Unknown,
}

impl WeatherIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            WeatherIcon::Clear => "\u{2600}",            // ☀
            WeatherIcon::MainlyClear => "\u{1F324}",     // 🌤
            WeatherIcon::PartlyCloudy => "\u{26C5}",     // ⛅
            WeatherIcon::Overcast => "\u{2601}",         // ☁
            WeatherIcon::Fog | WeatherIcon::RimeFog => "\u{1F32B}", // 🌫
            WeatherIcon::Drizzle | WeatherIcon::Showers => "\u{1F326}", // 🌦
            WeatherIcon::Rain => "\u{1F327}",            // 🌧
            WeatherIcon::Thunderstorm => "\u{26C8}",     // ⛈
            WeatherIcon::Snow => "\u{2744}",             // ❄
            WeatherIcon::Unknown => "\u{1F325}",         // 🌥
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherIcon::Clear => "Clear",
            WeatherIcon::MainlyClear => "Mainly clear",
            WeatherIcon::PartlyCloudy => "Partly cloudy",
            WeatherIcon::Overcast => "Overcast",
            WeatherIcon::Fog => "Fog",
            WeatherIcon::RimeFog => "Rime fog",
            WeatherIcon::Drizzle => "Drizzle",
            WeatherIcon::Rain => "Rain",
            WeatherIcon::Showers => "Showers",
            WeatherIcon::Thunderstorm => "Thunderstorm",
            WeatherIcon::Snow => "Snow",
            WeatherIcon::Unknown => "",
        }
    }
}

/// Maps a raw weather code to its icon, falling back to `WeatherIcon::Unknown`.
pub fn icon_for(weather_code: u8) -> WeatherIcon {
    match weather_code {
        0 => WeatherIcon::Clear,
        1 => WeatherIcon::MainlyClear,
        2 => WeatherIcon::PartlyCloudy,
        3 => WeatherIcon::Overcast,
        45 => WeatherIcon::Fog,
        48 => WeatherIcon::RimeFog,
        51 => WeatherIcon::Drizzle,
        61 => WeatherIcon::Rain,
        71 => WeatherIcon::Snow,
        80 => WeatherIcon::Showers,
        95 | 96 | 99 => WeatherIcon::Thunderstorm,
        _ => WeatherIcon::Unknown,
    }
}
