//! Dotted field paths for partial conversion
//!
//! Provides [`FieldPath`] for addressing fields through nested records and
//! containers, and [`FieldFilter`] for splitting a list of paths into the
//! fields selected at one level plus the suffixes forwarded to the next.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;

/// Path to a field, possibly through nested records
///
/// Written dotted: `albums.songs.name` reaches `name` on every song of every
/// album. Segments are identifiers (letters, digits, underscore).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

fn check_segment(segment: &str) -> Result<String, PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if let Some(bad) = segment.chars().find(|c| !(c.is_alphanumeric() || *c == '_')) {
        return Err(PathError::InvalidCharacter {
            segment: segment.to_string(),
            found: bad,
        });
    }
    Ok(segment.to_string())
}

impl FieldPath {
    /// Path naming one field at the current level
    #[must_use]
    pub fn single(field: impl Into<String>) -> Self {
        Self(vec![field.into()])
    }

    /// Field this path selects at the current level
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Path below [`field`](Self::field), `None` when nothing remains
    #[must_use]
    pub fn suffix(&self) -> Option<Self> {
        match self.0.as_slice() {
            [_, rest @ ..] if !rest.is_empty() => Some(Self(rest.to_vec())),
            _ => None,
        }
    }

    /// Number of levels the path descends
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Parse a list of dotted strings
    ///
    /// # Errors
    /// Returns the first malformed path
    pub fn parse_all<S: AsRef<str>>(paths: &[S]) -> Result<Vec<Self>, PathError> {
        paths.iter().map(|p| p.as_ref().parse()).collect()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(dotted: &str) -> Result<Self, Self::Err> {
        if dotted.trim().is_empty() {
            return Err(PathError::Blank);
        }
        let segments = dotted
            .split('.')
            .map(check_segment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }
}

/// Malformed field path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Nothing to parse
    #[error("field path is blank")]
    Blank,

    /// Two dots in a row, or a leading/trailing dot
    #[error("field path has an empty segment")]
    EmptySegment,

    /// A segment holds something other than letters, digits or `_`
    #[error("field path segment {segment:?} contains {found:?}")]
    InvalidCharacter {
        /// Offending segment
        segment: String,
        /// First character not allowed in a segment
        found: char,
    },
}

/// One level of a parsed field-path list
///
/// Maps each selected top-level field to the suffix paths forwarded into it.
/// `None` as the suffix list means the field is selected whole.
///
/// `["name", "albums.name", "albums.songs.name"]` parses to
/// `{name: None, albums: ["name", "songs.name"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    entries: IndexMap<String, Option<Vec<FieldPath>>>,
}

impl FieldFilter {
    /// Parse paths into a filter; an empty list means no filtering
    #[must_use]
    pub fn parse(paths: &[FieldPath]) -> Option<Self> {
        if paths.is_empty() {
            return None;
        }

        let mut entries: IndexMap<String, Option<Vec<FieldPath>>> = IndexMap::new();
        for path in paths {
            let Some(head) = path.field() else {
                continue;
            };
            match path.suffix() {
                // A bare field name selects the whole subtree
                None => {
                    entries.insert(head.to_string(), None);
                }
                Some(rest) => {
                    let slot = entries
                        .entry(head.to_string())
                        .or_insert_with(|| Some(Vec::new()));
                    if let Some(subpaths) = slot {
                        subpaths.push(rest);
                    }
                }
            }
        }

        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// Check if a field is selected at this level
    #[inline]
    #[must_use]
    pub fn selects(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    /// Suffix paths to forward into a selected field
    #[inline]
    #[must_use]
    pub fn subpaths(&self, field: &str) -> Option<&[FieldPath]> {
        self.entries
            .get(field)
            .and_then(|s| s.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Selected top-level field names, in first-mention order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(raw: &[&str]) -> Vec<FieldPath> {
        FieldPath::parse_all(raw).unwrap()
    }

    #[test]
    fn parses_dotted_path() {
        let path: FieldPath = "albums.songs.name".parse().unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.field(), Some("albums"));
        assert_eq!(path.suffix().unwrap().to_string(), "songs.name");
        assert_eq!(path.to_string(), "albums.songs.name");
    }

    #[test]
    fn single_field_has_no_suffix() {
        let path = FieldPath::single("name");
        assert_eq!(path.depth(), 1);
        assert!(path.suffix().is_none());
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!("".parse::<FieldPath>(), Err(PathError::Blank));
        assert_eq!("  ".parse::<FieldPath>(), Err(PathError::Blank));
        assert_eq!("albums..name".parse::<FieldPath>(), Err(PathError::EmptySegment));
        assert_eq!("name.".parse::<FieldPath>(), Err(PathError::EmptySegment));
        assert_eq!(
            "albums.song-name".parse::<FieldPath>(),
            Err(PathError::InvalidCharacter {
                segment: "song-name".to_string(),
                found: '-',
            })
        );
    }

    #[test]
    fn filter_empty_is_unrestricted() {
        assert!(FieldFilter::parse(&[]).is_none());
    }

    #[test]
    fn filter_splits_levels() {
        let filter = FieldFilter::parse(&paths(&[
            "name",
            "albums.name",
            "albums.songs.name",
            "albums.songs.created_at",
        ]))
        .unwrap();

        assert!(filter.selects("name"));
        assert!(filter.selects("albums"));
        assert!(!filter.selects("created_at"));
        assert!(filter.subpaths("name").is_none());

        let album_paths: Vec<String> = filter
            .subpaths("albums")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(album_paths, ["name", "songs.name", "songs.created_at"]);
        assert_eq!(filter.fields().collect::<Vec<_>>(), ["name", "albums"]);
    }

    #[test]
    fn filter_bare_field_wins_over_subpaths() {
        let filter = FieldFilter::parse(&paths(&["albums.name", "albums"])).unwrap();
        assert!(filter.selects("albums"));
        assert!(filter.subpaths("albums").is_none());

        let filter = FieldFilter::parse(&paths(&["albums", "albums.name"])).unwrap();
        assert!(filter.subpaths("albums").is_none());
    }
}
