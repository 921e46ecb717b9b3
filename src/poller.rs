use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::{Config, DEFAULT_POLL_INTERVAL};
use crate::formatter::Formatter;
use crate::lastfm::TrackSource;
use crate::output;

/// The poll-fetch-format-write loop.
///
/// The loop runs forever on its own thread; the `running` flag is the only
/// control the outside world has over it. While stopped, ticks do nothing but
/// wait. Configuration is shared behind a mutex so the control surface can
/// edit it live; each tick works from a snapshot taken under a short lock, so
/// a slow network call never blocks a state flip or a config edit.
pub struct Poller<S: TrackSource> {
    source: S,
    config: Arc<Mutex<Config>>,
    running: Arc<AtomicBool>,
}

impl<S: TrackSource> Poller<S> {
    pub fn new(source: S, config: Arc<Mutex<Config>>, running: Arc<AtomicBool>) -> Self {
        Self {
            source,
            config,
            running,
        }
    }

    /// Run until process shutdown. Ticks never overlap; one that overruns its
    /// interval simply delays the next.
    pub fn run(&self) {
        loop {
            self.tick();
            thread::sleep(self.wait_interval());
        }
    }

    /// One poll cycle. No failure in here escalates; a bad tick degrades to
    /// "no output this round" and the next tick starts from scratch.
    fn tick(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        let config = self.config.lock().unwrap().clone();
        if config.lastfm.poll_interval <= 0 {
            warn!(
                interval = config.lastfm.poll_interval,
                "invalid poll interval, skipping tick"
            );
            return;
        }

        let track = self.source.now_playing(&config.lastfm);
        match &track {
            Some(track) => debug!(track = %track, "currently playing"),
            None => debug!("no track currently playing"),
        }

        let mut formatter = Formatter::new();
        formatter.set_null_message(config.no_track_message.clone());
        let content = match formatter.format(track.as_ref(), &config.template) {
            Some(content) => content,
            // no track and no message configured: leave the file untouched
            None => return,
        };

        let path = match &config.output_file {
            Some(path) => path,
            None => {
                warn!("no output file configured");
                return;
            }
        };
        if let Err(e) = output::write_track_file(path, &content) {
            error!("failed to write track to file: {e:#}");
        }
    }

    // Re-read fresh before every wait so a live interval edit takes effect on
    // the next tick. A degenerate value falls back to the default interval
    // rather than busy-looping.
    fn wait_interval(&self) -> Duration {
        let interval = self.config.lock().unwrap().lastfm.poll_interval;
        if interval > 0 {
            Duration::from_secs(interval as u64)
        } else {
            Duration::from_secs(DEFAULT_POLL_INTERVAL as u64)
        }
    }
}
