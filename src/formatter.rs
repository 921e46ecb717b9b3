use tracing::warn;

const OPEN_TAG: char = '{';
const CLOSE_TAG: char = '}';

/// One formattable attribute of a record type: the tag name it answers to and
/// the accessor used to resolve it.
///
/// An accessor returning `None` means the lookup failed; the formatter logs it
/// and substitutes an empty value instead of propagating.
pub struct Attribute<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Option<String>,
}

/// A record type that declares which of its attributes may appear as `{tags}`
/// inside a format template.
///
/// The table is the complete attribute set: a `{tag}` substitutes if and only
/// if its name matches an entry here.
pub trait Formattable: Sized + 'static {
    const ATTRIBUTES: &'static [Attribute<Self>];
}

/// Prints a record to a String in a given format.
///
/// Tags of the form `{attribute}` inside the format string are replaced by the
/// record's attribute values. There is no escaping: an unbalanced `{` is
/// copied verbatim, and a `{` can never appear inside a tag body.
pub struct Formatter {
    null_message: Option<String>,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self { null_message: None }
    }

    /// The message returned when formatting an absent record. With no message
    /// configured, formatting an absent record yields `None` and the caller
    /// is expected to skip its output entirely.
    pub fn set_null_message(&mut self, message: Option<String>) {
        self.null_message = message;
    }

    pub fn null_message(&self) -> Option<&str> {
        self.null_message.as_deref()
    }

    /// Format the given record according to the given template.
    ///
    /// Recognized `{tags}` (see [`Formatter::tags`]) are replaced by the
    /// record's attribute values; everything else is copied unchanged. An
    /// absent record yields the configured null message, independent of the
    /// template.
    pub fn format<T: Formattable>(&self, record: Option<&T>, template: &str) -> Option<String> {
        let record = match record {
            Some(record) => record,
            None => return self.null_message.clone(),
        };

        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while !rest.is_empty() {
            if rest.starts_with(OPEN_TAG) {
                let close = match rest.find(CLOSE_TAG) {
                    Some(close) => close,
                    None => {
                        // no more tags
                        out.push_str(rest);
                        break;
                    }
                };
                if let Some(open) = rest[1..].find(OPEN_TAG).map(|i| i + 1) {
                    if open < close {
                        // just a single '{', not a tag; restart the scan there
                        out.push_str(&rest[..open]);
                        rest = &rest[open..];
                        continue;
                    }
                }
                let name = &rest[1..close];
                match T::ATTRIBUTES.iter().find(|attr| attr.name == name) {
                    Some(attr) => out.push_str(&resolve(attr, record)),
                    // not a tag, keep the braces
                    None => out.push_str(&rest[..=close]),
                }
                rest = &rest[close + 1..];
            } else {
                match rest.find(OPEN_TAG) {
                    Some(open) => {
                        out.push_str(&rest[..open]);
                        rest = &rest[open..];
                    }
                    None => {
                        out.push_str(rest);
                        break;
                    }
                }
            }
        }

        Some(out)
    }

    /// The tags usable in templates for records of type `T`, in table order.
    pub fn tags<T: Formattable>() -> Vec<String> {
        T::ATTRIBUTES
            .iter()
            .map(|attr| format!("{OPEN_TAG}{}{CLOSE_TAG}", attr.name))
            .collect()
    }
}

fn resolve<T: Formattable>(attr: &Attribute<T>, record: &T) -> String {
    match (attr.get)(record) {
        Some(value) => value,
        None => {
            warn!(
                attribute = attr.name,
                "attribute lookup failed, substituting empty value"
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Song {
        title: String,
        artist: String,
    }

    impl Formattable for Song {
        const ATTRIBUTES: &'static [Attribute<Song>] = &[
            Attribute {
                name: "title",
                get: |s| Some(s.title.clone()),
            },
            Attribute {
                name: "artist",
                get: |s| Some(s.artist.clone()),
            },
            Attribute {
                name: "broken",
                get: |_| None,
            },
        ];
    }

    fn halo() -> Song {
        Song {
            title: "Halo".to_string(),
            artist: "Beyonce".to_string(),
        }
    }

    #[test]
    fn test_template_without_tags_is_unchanged() {
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "just some plain text");
        assert_eq!(result, Some("just some plain text".to_string()));
    }

    #[test]
    fn test_tags_are_substituted() {
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "Listening to {title} --- performed by {artist}");
        assert_eq!(
            result,
            Some("Listening to Halo --- performed by Beyonce".to_string())
        );
    }

    #[test]
    fn test_unrecognized_tag_is_kept_verbatim() {
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "{title} from {album}");
        assert_eq!(result, Some("Halo from {album}".to_string()));
    }

    #[test]
    fn test_unbalanced_open_brace_copies_remainder() {
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "Now: {title");
        assert_eq!(result, Some("Now: {title".to_string()));
    }

    #[test]
    fn test_open_brace_inside_candidate_restarts_scan() {
        // the first '{' is not a tag because another '{' comes before the '}'
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "{{title}");
        assert_eq!(result, Some("{Halo".to_string()));

        let result = formatter.format(Some(&halo()), "{no {title} yet");
        assert_eq!(result, Some("{no Halo yet".to_string()));
    }

    #[test]
    fn test_lone_braces_are_literal() {
        let formatter = Formatter::new();
        assert_eq!(
            formatter.format(Some(&halo()), "a { b } c"),
            Some("a { b } c".to_string())
        );
        assert_eq!(formatter.format(Some(&halo()), "}"), Some("}".to_string()));
        assert_eq!(formatter.format(Some(&halo()), "{}"), Some("{}".to_string()));
    }

    #[test]
    fn test_adjacent_tags() {
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "{artist}{title}");
        assert_eq!(result, Some("BeyonceHalo".to_string()));
    }

    #[test]
    fn test_absent_record_returns_null_message() {
        let mut formatter = Formatter::new();
        formatter.set_null_message(Some("nothing playing".to_string()));
        let result = formatter.format::<Song>(None, "{title} ignored entirely");
        assert_eq!(result, Some("nothing playing".to_string()));
    }

    #[test]
    fn test_absent_record_without_null_message_yields_none() {
        let formatter = Formatter::new();
        assert_eq!(formatter.format::<Song>(None, "{title}"), None);
    }

    #[test]
    fn test_failed_attribute_lookup_substitutes_empty_value() {
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "[{broken}]");
        assert_eq!(result, Some("[]".to_string()));
    }

    #[test]
    fn test_tags_lists_declared_attributes() {
        assert_eq!(Formatter::tags::<Song>(), vec!["{title}", "{artist}", "{broken}"]);
    }

    #[test]
    fn test_multibyte_template_text() {
        let formatter = Formatter::new();
        let result = formatter.format(Some(&halo()), "♫ {title} ♫");
        assert_eq!(result, Some("♫ Halo ♫".to_string()));
    }
}
