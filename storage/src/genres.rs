//! Normalization of the genre field.
//!
//! Upstream exports store genre tags in several shapes: a real list, the textual form of a list
//! literal (`"['pop', 'dance pop']"`), a single bare tag, or nothing at all. Everything downstream
//! only ever sees a plain `Vec<String>`.

use crate::errors::GenreParseError;

/// The raw genre value of a row, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenreField {
    #[default]
    Missing,
    Text(String),
    List(Vec<String>),
}

impl From<Option<String>> for GenreField {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }
}

impl From<&str> for GenreField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for GenreField {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for GenreField {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl GenreField {
    /// Convert the field into a list of genre tags.
    ///
    /// - lists are returned unchanged
    /// - text that looks like a list literal is parsed as one, if parsing fails the text itself
    ///   becomes the only tag
    /// - blank text and missing values become an empty list
    /// - any other text becomes a single tag
    ///
    /// Text is never evaluated, only parsed.
    #[must_use]
    pub fn normalize(self) -> Vec<String> {
        match self {
            Self::List(list) => list,
            Self::Missing => Vec::new(),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Vec::new()
                } else if trimmed.starts_with('[') {
                    parse_list_literal(trimmed).unwrap_or_else(|e| {
                        log::debug!("Keeping unparseable genre text as a single tag ({e})");
                        vec![text]
                    })
                } else {
                    vec![text]
                }
            }
        }
    }
}

/// Normalize anything that can be viewed as a [`GenreField`].
#[must_use]
pub fn normalize(field: impl Into<GenreField>) -> Vec<String> {
    field.into().normalize()
}

/// Parse the textual form of a list of quoted strings, e.g. `['pop', "rock"]`.
///
/// # Errors
///
/// Returns an error if the input is anything other than a bracketed, comma separated list of
/// single or double quoted strings.
pub fn parse_list_literal(s: &str) -> Result<Vec<String>, GenreParseError> {
    parser::list_literal()
        .parse(s.as_bytes())
        .map_err(|e| GenreParseError::Malformed(format!("{s} ({e})")))
}

mod parser {
    use pom::parser::{end, list, none_of, one_of, sym, Parser};

    pub fn list_literal<'a>() -> Parser<'a, u8, Vec<String>> {
        let elems = list(string(), space() * sym(b',') * space());
        space() * sym(b'[') * space() * elems
            - space()
            - (sym(b',') * space()).opt()
            - sym(b']')
            - space()
            - end()
    }

    pub fn string<'a>() -> Parser<'a, u8, String> {
        quoted(b'\'', b"\\'") | quoted(b'"', b"\\\"")
    }

    /// A string delimited by `quote`, where `stop` holds the quote and the escape character.
    fn quoted<'a>(quote: u8, stop: &'static [u8]) -> Parser<'a, u8, String> {
        let special_char = sym(b'\\')
            | sym(b'"')
            | sym(b'\'')
            | sym(b'n').map(|_| b'\n')
            | sym(b'r').map(|_| b'\r')
            | sym(b't').map(|_| b'\t');
        let escape_sequence = sym(b'\\') * special_char;
        let char_string = (none_of(stop) | escape_sequence)
            .repeat(1..)
            .convert(String::from_utf8);

        (sym(quote) * char_string.repeat(0..) - sym(quote)).map(|strings| strings.concat())
    }

    pub fn space<'a>() -> Parser<'a, u8, ()> {
        one_of(b" \t\r\n").repeat(0..).discard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tags(tags: &[&str]) -> Vec<String> {
        tags.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    #[case::missing(GenreField::Missing, vec![])]
    #[case::empty_text("".into(), vec![])]
    #[case::blank_text("   ".into(), vec![])]
    #[case::list(GenreField::List(tags(&["pop", "rock"])), tags(&["pop", "rock"]))]
    #[case::empty_list(GenreField::List(vec![]), vec![])]
    #[case::literal("['pop', 'dance pop']".into(), tags(&["pop", "dance pop"]))]
    #[case::double_quoted("[\"hip hop\", \"rap\"]".into(), tags(&["hip hop", "rap"]))]
    #[case::mixed_quotes("['r&b', \"soul\"]".into(), tags(&["r&b", "soul"]))]
    #[case::empty_literal("[]".into(), vec![])]
    #[case::padded_literal("  [ 'pop' ,'rock' , ]  ".into(), tags(&["pop", "rock"]))]
    #[case::apostrophe("[\"children's music\"]".into(), tags(&["children's music"]))]
    #[case::escaped_quote("['children\\'s music']".into(), tags(&["children's music"]))]
    #[case::bare("pop".into(), tags(&["pop"]))]
    #[case::malformed("['pop'".into(), tags(&["['pop'"]))]
    #[case::not_strings("[1, 2]".into(), tags(&["[1, 2]"]))]
    #[case::code("[__import__('os')]".into(), tags(&["[__import__('os')]"]))]
    fn test_normalize(#[case] field: GenreField, #[case] expected: Vec<String>) {
        assert_eq!(field.normalize(), expected);
    }

    #[rstest]
    #[case(GenreField::Missing)]
    #[case("['pop', 'rock']".into())]
    #[case("['pop'".into())]
    #[case("edm".into())]
    #[case(GenreField::List(tags(&["a", "b", "a"])))]
    fn test_normalize_is_idempotent(#[case] field: GenreField) {
        let once = field.normalize();
        let twice = GenreField::List(once.clone()).normalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_from_option() {
        assert_eq!(normalize(None::<String>), Vec::<String>::new());
        assert_eq!(normalize(Some("['k-pop']".to_string())), tags(&["k-pop"]));
    }

    #[rstest]
    #[case("['a','b']", Ok(tags(&["a", "b"])))]
    #[case("['tab\\tbed']", Ok(tags(&["tab\tbed"])))]
    #[case("['unterminated]", Err(()))]
    #[case("['a'] trailing", Err(()))]
    #[case("'a', 'b'", Err(()))]
    fn test_parse_list_literal(#[case] input: &str, #[case] expected: Result<Vec<String>, ()>) {
        assert_eq!(parse_list_literal(input).map_err(|_| ()), expected);
    }
}
