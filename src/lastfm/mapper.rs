//! Maps a single entry of the `user.getrecenttracks` response to a [`Track`].
//!
//! Sample entry from the Last.fm API v2.0:
//!
//! ```json
//! {
//!   "artist": {"#text": "Passenger", "mbid": "186e216a-2f8a-41a1-935f-8e30c018a8fe"},
//!   "name": "Let Her Go (Peer Kusiv Edit)",
//!   "streamable": "0",
//!   "mbid": "",
//!   "album": {"#text": "", "mbid": ""},
//!   "url": "http://www.last.fm/music/Passenger/_/Let+Her+Go+(Peer+Kusiv+Edit)",
//!   "@attr": {"nowplaying": "true"}
//! }
//! ```
//!
//! Artist and album live in a nested `{"#text": ...}` shape because those
//! fields may also carry an identifier; name is a plain text value.

use serde_json::Value;
use thiserror::Error;

use crate::models::Track;

const ARTIST: &str = "artist";
const NAME: &str = "name";
const ALBUM: &str = "album";
const TEXT_KEY: &str = "#text";

/// Why a track entry could not be turned into a [`Track`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidTrackFormat {
    #[error("track has no artist attribute")]
    MissingArtist,
    #[error("artist has no text value")]
    MissingArtistText,
    #[error("track has no name attribute")]
    MissingName,
    #[error("track has no album attribute")]
    MissingAlbum,
    #[error("album has no text value")]
    MissingAlbumText,
}

/// Parse a [`Track`] from a recent-tracks entry.
///
/// Validity is checked wholesale before any field is extracted; a failure
/// never yields a partially constructed track.
pub fn track_from_json(node: &Value) -> Result<Track, InvalidTrackFormat> {
    validate(node)?;
    Ok(Track {
        artist: nested_text(node, ARTIST).unwrap_or_default(),
        name: non_null(node, NAME).and_then(scalar_text).unwrap_or_default(),
        album: nested_text(node, ALBUM).unwrap_or_default(),
    })
}

fn validate(node: &Value) -> Result<(), InvalidTrackFormat> {
    if non_null(node, ARTIST).is_none() {
        return Err(InvalidTrackFormat::MissingArtist);
    }
    if nested_text(node, ARTIST).is_none() {
        return Err(InvalidTrackFormat::MissingArtistText);
    }
    if non_null(node, NAME).and_then(scalar_text).is_none() {
        return Err(InvalidTrackFormat::MissingName);
    }
    if non_null(node, ALBUM).is_none() {
        return Err(InvalidTrackFormat::MissingAlbum);
    }
    if nested_text(node, ALBUM).is_none() {
        return Err(InvalidTrackFormat::MissingAlbumText);
    }
    Ok(())
}

fn non_null<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

// Scalars stringify; arrays and objects have no text value.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn nested_text(node: &Value, key: &str) -> Option<String> {
    non_null(node, key)
        .and_then(|value| value.get(TEXT_KEY))
        .and_then(scalar_text)
}
