//! Last.fm integration: the recent-tracks client and its response mapping.

pub mod api;
pub mod mapper;

pub use api::LastFmApi;
pub use mapper::InvalidTrackFormat;

use crate::config::LastFmConfig;
use crate::models::Track;

// The poller only needs these two lookups; keeping them behind a trait lets
// tests drive it without the network.
pub trait TrackSource {
    /// The track playing right now, if any.
    fn now_playing(&self, config: &LastFmConfig) -> Option<Track>;

    /// The most recently scrobbled track, playing or not.
    fn last_track(&self, config: &LastFmConfig) -> Option<Track>;
}
