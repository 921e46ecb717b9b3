use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing_subscriber::EnvFilter;

use nowplaying::config::Config;
use nowplaying::formatter::Formatter;
use nowplaying::lastfm::LastFmApi;
use nowplaying::models::Track;
use nowplaying::poller::Poller;

const DEFAULT_CONFIG_PATH: &str = "nowplaying.toml";

fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nowplaying=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load(&config_path)?;
    config.lastfm.validate();

    println!(
        "Available template tags: {}",
        Formatter::tags::<Track>().join(", ")
    );
    println!("Keys: [s] start/stop polling, [r] reload config, [q] quit");
    println!("State: Stopped");

    let config = Arc::new(Mutex::new(config));
    let running = Arc::new(AtomicBool::new(false));

    let poller = Poller::new(LastFmApi::new(), Arc::clone(&config), Arc::clone(&running));
    thread::spawn(move || poller.run());

    enable_raw_mode()?;
    let result = control_loop(&config_path, &config, &running);
    disable_raw_mode()?;
    result
}

/// The control surface: flips the run flag and swaps in freshly loaded
/// configuration. Neither action waits on the poller.
fn control_loop(
    config_path: &Path,
    config: &Arc<Mutex<Config>>,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('s') => {
                        let now_running = !running.load(Ordering::SeqCst);
                        running.store(now_running, Ordering::SeqCst);
                        status_line(if now_running {
                            "State: Running..."
                        } else {
                            "State: Stopped"
                        });
                    }
                    KeyCode::Char('r') => match Config::load(config_path) {
                        Ok(fresh) => {
                            fresh.lastfm.validate();
                            *config.lock().unwrap() = fresh;
                            status_line("Configuration reloaded");
                        }
                        Err(e) => status_line(&format!("Failed to reload configuration: {e:#}")),
                    },
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

// raw mode needs explicit carriage returns
fn status_line(message: &str) {
    print!("{message}\r\n");
    let _ = io::stdout().flush();
}
