//! WeatherNow - terminal weather dashboard
//!
//! Shows current conditions, a 24 hour temperature curve, an hourly strip and
//! a weekly outlook for a location picked through debounced city search.

use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};

use weathernow::app::{App, AppChannels};
use weathernow::cli::{Cli, StartupConfig};
use weathernow::data::{ForecastClient, ForecastSource, GeocodeClient, SuggestionSource};
use weathernow::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Draws and dispatches events until the user quits
async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    mut channels: AppChannels,
) -> io::Result<()> {
    let mut events = EventStream::new();

    let (width, height) = crossterm::terminal::size()?;
    app.resize(width, height);
    app.request_forecast();

    loop {
        terminal.draw(|f| ui::render(f, &app.state))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => app.handle_event(event),
                Some(Err(e)) => return Err(e),
                None => break,
            },
            Some(event) = channels.search.recv() => app.handle_search_event(event),
            Some(message) = channels.refresh.recv() => app.handle_refresh_message(message),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    match logging::init(config.log_file.as_deref(), config.verbose) {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "log file ready"),
        Ok(None) => {}
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    let suggestions: Arc<dyn SuggestionSource> = Arc::new(GeocodeClient::new());
    let forecasts: Arc<dyn ForecastSource> = Arc::new(ForecastClient::new());
    let (app, channels) = App::new(&config, suggestions, forecasts);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, app, channels).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal event loop failed");
    }
    result?;
    Ok(())
}
