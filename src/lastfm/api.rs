use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};
use urlencoding::encode;

use super::{mapper, TrackSource};
use crate::config::LastFmConfig;
use crate::models::Track;

const METHOD: &str = "user.getrecenttracks";
// one entry is enough; the first is always the most recent
const RESULT_LIMIT: &str = "1";

/// Client for the handful of Last.fm API calls this application needs.
///
/// Every failure mode (transport errors, non-JSON bodies, API-level errors,
/// invalid track entries) is logged and collapses to `None`. A failed poll
/// must never take the polling loop down with it.
pub struct LastFmApi {
    client: reqwest::blocking::Client,
}

impl Default for LastFmApi {
    fn default() -> Self {
        Self::new()
    }
}

impl LastFmApi {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("nowplaying/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self { client }
    }

    fn request_url(config: &LastFmConfig) -> String {
        format!(
            "{}://{}{}?method={METHOD}&user={}&api_key={}&format=json&limit={RESULT_LIMIT}&extended=0",
            config.api_scheme,
            config.api_host,
            config.api_path,
            encode(&config.user),
            encode(&config.api_key),
        )
    }

    /// Fetch the most recent entry of the user's recent-tracks list.
    fn last_track_node(&self, config: &LastFmConfig) -> Option<Value> {
        let url = Self::request_url(config);
        // Last.fm requires UTF-8 requests; reqwest sends nothing else
        let response = match self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                error!("failed to execute recent-tracks request: {e}");
                return None;
            }
        };
        let root: Value = match response.json() {
            Ok(root) => root,
            Err(e) => {
                error!("recent-tracks response was not valid JSON: {e}");
                return None;
            }
        };
        debug!(response = %root, "last.fm api returned");
        extract_last_track(&root)
    }

    fn map_entry(node: &Value) -> Option<Track> {
        match mapper::track_from_json(node) {
            Ok(track) => Some(track),
            Err(e) => {
                error!("response contained an invalid track: {e}");
                None
            }
        }
    }
}

impl TrackSource for LastFmApi {
    fn now_playing(&self, config: &LastFmConfig) -> Option<Track> {
        let node = self.last_track_node(config)?;
        if !is_now_playing(&node) {
            return None;
        }
        Self::map_entry(&node)
    }

    fn last_track(&self, config: &LastFmConfig) -> Option<Track> {
        let node = self.last_track_node(config)?;
        Self::map_entry(&node)
    }
}

/// Pull the most recent track entry out of a recent-tracks response body.
///
/// A body carrying an API error, or one without any track entries, yields
/// `None`; an absent `track` field just means the user never listened to
/// anything.
fn extract_last_track(root: &Value) -> Option<Value> {
    if root.get("error").is_some_and(|e| !e.is_null()) {
        let message = root
            .get("message")
            .and_then(|message| message.as_str())
            .unwrap_or("");
        error!("error returned by api: {message}");
        return None;
    }
    root.get("recenttracks")
        .and_then(|recent| recent.get("track"))
        .and_then(|tracks| tracks.as_array())
        .and_then(|tracks| tracks.first())
        .cloned()
}

// The flag arrives as the string "true", but tolerate a plain boolean too.
fn is_now_playing(node: &Value) -> bool {
    node.get("@attr")
        .and_then(|attr| attr.get("nowplaying"))
        .map(|flag| flag.as_str() == Some("true") || flag.as_bool() == Some(true))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response(nowplaying: Option<&str>) -> Value {
        let mut entry = json!({
            "artist": {"#text": "Passenger", "mbid": ""},
            "name": "Let Her Go (Peer Kusiv Edit)",
            "album": {"#text": "", "mbid": ""}
        });
        if let Some(flag) = nowplaying {
            entry["@attr"] = json!({ "nowplaying": flag });
        }
        json!({ "recenttracks": { "track": [entry] } })
    }

    #[test]
    fn test_request_url_contains_fixed_parameters() {
        let config = LastFmConfig {
            user: "volker".to_string(),
            api_key: "secret".to_string(),
            ..LastFmConfig::default()
        };
        let url = LastFmApi::request_url(&config);
        assert_eq!(
            url,
            "http://ws.audioscrobbler.com/2.0?method=user.getrecenttracks\
             &user=volker&api_key=secret&format=json&limit=1&extended=0"
        );
    }

    #[test]
    fn test_request_url_encodes_user_and_key() {
        let config = LastFmConfig {
            user: "some user&co".to_string(),
            api_key: "a/b".to_string(),
            ..LastFmConfig::default()
        };
        let url = LastFmApi::request_url(&config);
        assert!(url.contains("user=some%20user%26co"));
        assert!(url.contains("api_key=a%2Fb"));
    }

    #[test]
    fn test_extract_last_track_picks_first_entry() {
        let root = sample_response(Some("true"));
        let node = extract_last_track(&root).unwrap();
        assert_eq!(node["name"], "Let Her Go (Peer Kusiv Edit)");
    }

    #[test]
    fn test_extract_last_track_on_api_error_body() {
        let root = json!({ "error": 10, "message": "Invalid API key" });
        assert_eq!(extract_last_track(&root), None);
    }

    #[test]
    fn test_extract_last_track_without_track_field() {
        // no tracks ever listened to
        let root = json!({ "recenttracks": { "@attr": { "total": "0" } } });
        assert_eq!(extract_last_track(&root), None);
    }

    #[test]
    fn test_extract_last_track_empty_list() {
        let root = json!({ "recenttracks": { "track": [] } });
        assert_eq!(extract_last_track(&root), None);
    }

    #[test]
    fn test_now_playing_flag_true_selects_entry() {
        let node = extract_last_track(&sample_response(Some("true"))).unwrap();
        assert!(is_now_playing(&node));
        let track = LastFmApi::map_entry(&node).unwrap();
        assert_eq!(track.artist, "Passenger");
    }

    #[test]
    fn test_now_playing_flag_false_or_absent() {
        let node = extract_last_track(&sample_response(Some("false"))).unwrap();
        assert!(!is_now_playing(&node));

        let node = extract_last_track(&sample_response(None)).unwrap();
        assert!(!is_now_playing(&node));

        // the entry itself is still a valid most-recent track
        let track = LastFmApi::map_entry(&node).unwrap();
        assert_eq!(track.name, "Let Her Go (Peer Kusiv Edit)");
    }

    #[test]
    fn test_now_playing_flag_as_boolean() {
        let node = json!({ "@attr": { "nowplaying": true } });
        assert!(is_now_playing(&node));
    }

    #[test]
    fn test_invalid_entry_maps_to_none() {
        let node = json!({ "name": "only a name" });
        assert_eq!(LastFmApi::map_entry(&node), None);
    }
}
