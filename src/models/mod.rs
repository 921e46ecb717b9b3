use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formatter::{Attribute, Formattable};

/// The track a user is (or was last) listening to.
///
/// A `Track` is either fully derived from a valid API response or not
/// constructed at all; "no current track" is an absence, never a
/// partially-filled record. Artist and album may legitimately be empty
/// strings (the API reports them that way for unknown releases).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub artist: String,
    pub name: String,
    pub album: String,
}

impl Track {
    pub fn new(
        artist: impl Into<String>,
        name: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            name: name.into(),
            album: album.into(),
        }
    }
}

// Log lines render the track as JSON
impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

impl Formattable for Track {
    const ATTRIBUTES: &'static [Attribute<Track>] = &[
        Attribute {
            name: "artist",
            get: |track| Some(track.artist.clone()),
        },
        Attribute {
            name: "name",
            get: |track| Some(track.name.clone()),
        },
        Attribute {
            name: "album",
            get: |track| Some(track.album.clone()),
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::Formatter;

    #[test]
    fn test_track_attribute_set() {
        assert_eq!(
            Formatter::tags::<Track>(),
            vec!["{artist}", "{name}", "{album}"]
        );
    }

    #[test]
    fn test_track_formats_through_its_attributes() {
        let track = Track::new("Beyonce", "Halo", "I Am... Sasha Fierce");
        let formatter = Formatter::new();
        assert_eq!(
            formatter.format(Some(&track), "{name} / {artist} / {album}"),
            Some("Halo / Beyonce / I Am... Sasha Fierce".to_string())
        );
    }

    #[test]
    fn test_display_renders_json() {
        let track = Track::new("Passenger", "Let Her Go (Peer Kusiv Edit)", "");
        let rendered = track.to_string();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["artist"], "Passenger");
        assert_eq!(parsed["name"], "Let Her Go (Peer Kusiv Edit)");
        assert_eq!(parsed["album"], "");
    }
}
