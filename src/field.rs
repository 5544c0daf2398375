use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::version::LocalSegment;

/// The kind of a pre-release.
///
/// Ordered the way the scheme orders them: `Alpha < Beta < Rc`. The canonical
/// spellings are `a`, `b`, and `rc`; alternate spellings (`alpha`, `beta`,
/// `c`, `pre`, `preview`) are accepted wherever version text is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreKind {
    /// An alpha pre-release, spelled `a`.
    Alpha,
    /// A beta pre-release, spelled `b`.
    Beta,
    /// A release candidate, spelled `rc`.
    Rc,
}

impl PreKind {
    /// The canonical spelling of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            PreKind::Alpha => "a",
            PreKind::Beta => "b",
            PreKind::Rc => "rc",
        }
    }

    /// Maps any accepted spelling (already lowercased) to a kind.
    pub(crate) fn from_spelling(spelling: &str) -> Option<Self> {
        match spelling {
            "a" | "alpha" => Some(PreKind::Alpha),
            "b" | "beta" => Some(PreKind::Beta),
            "rc" | "c" | "pre" | "preview" => Some(PreKind::Rc),
            _ => None,
        }
    }
}

impl fmt::Display for PreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutable position in a version.
///
/// The enumeration is closed: the engine matches on it exhaustively, so a new
/// field is a compile-time change, not a runtime string lookup. Strings only
/// enter the picture in [`Field::from_str`], which maps the user-facing
/// vocabulary:
///
/// | input | field |
/// |---|---|
/// | `epoch` | `Epoch` |
/// | `major` | `Release(0)` |
/// | `minor` | `Release(1)` |
/// | `micro`, `patch` | `Release(2)` |
/// | `release.N` | `Release(N)` |
/// | `pre` | `Pre(None)` (the current pre-release) |
/// | `a`, `alpha` | `Pre(Some(Alpha))` |
/// | `b`, `beta` | `Pre(Some(Beta))` |
/// | `rc`, `c`, `preview` | `Pre(Some(Rc))` |
/// | `post`, `rev`, `r` | `Post` |
/// | `dev` | `Dev` |
/// | `local` | `Local` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The epoch, the `N!` prefix.
    Epoch,
    /// A release position by index: 0 is major, 1 is minor, 2 is micro.
    Release(usize),
    /// The pre-release. `Pre(None)` addresses whatever pair is present,
    /// `Pre(Some(kind))` addresses that specific kind.
    Pre(Option<PreKind>),
    /// The post-release number.
    Post,
    /// The development-release number.
    Dev,
    /// The local identifier after `+`.
    Local,
}

impl Field {
    /// Position rank in the fixed segment order: epoch, then each release
    /// position, then pre, post, dev, local. Clearing right of a field
    /// affects exactly the fields with a greater rank. Both `Pre` forms
    /// share the pre rank.
    pub fn rank(self) -> (u8, usize) {
        match self {
            Field::Epoch => (0, 0),
            Field::Release(index) => (1, index),
            Field::Pre(_) => (2, 0),
            Field::Post => (3, 0),
            Field::Dev => (4, 0),
            Field::Local => (5, 0),
        }
    }

    /// Validates a raw string against this field's value domain, with the
    /// same numeric and keyword rules parsing uses. Pre, post, and dev
    /// numbers may be empty, meaning the implicit 0 (just like `1.2a` means
    /// `1.2a0`); epoch and release positions require digits. An empty local
    /// value means "no local identifier".
    pub fn parse_value(self, raw: &str) -> Result<FieldValue> {
        let raw = raw.trim().to_ascii_lowercase();
        match self {
            Field::Epoch | Field::Release(_) => {
                parse_number(self, &raw, false).map(FieldValue::Number)
            }
            Field::Pre(Some(_)) | Field::Post | Field::Dev => {
                parse_number(self, &raw, true).map(FieldValue::Number)
            }
            Field::Pre(None) => {
                if raw.is_empty() || raw.bytes().all(|b| b.is_ascii_digit()) {
                    parse_number(self, &raw, true).map(FieldValue::Number)
                } else {
                    let (kind, number) = parse_pre_pair(&raw).ok_or_else(|| {
                        Error::invalid_value(
                            self,
                            &raw,
                            "expected a number or a pre-release pair like `a1` or `rc2`",
                        )
                    })?;
                    Ok(FieldValue::Pre(kind, number))
                }
            }
            Field::Local => {
                let segments = LocalSegment::parse_list(&raw).ok_or_else(|| {
                    Error::invalid_value(
                        self,
                        &raw,
                        "expected dot-separated alphanumeric segments",
                    )
                })?;
                Ok(FieldValue::Local(segments))
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Epoch => f.write_str("epoch"),
            Field::Release(0) => f.write_str("major"),
            Field::Release(1) => f.write_str("minor"),
            Field::Release(2) => f.write_str("micro"),
            Field::Release(index) => write!(f, "release.{index}"),
            Field::Pre(None) => f.write_str("pre"),
            Field::Pre(Some(kind)) => kind.fmt(f),
            Field::Post => f.write_str("post"),
            Field::Dev => f.write_str("dev"),
            Field::Local => f.write_str("local"),
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        let field = match name.as_str() {
            "epoch" => Field::Epoch,
            "major" => Field::Release(0),
            "minor" => Field::Release(1),
            "micro" | "patch" => Field::Release(2),
            "pre" => Field::Pre(None),
            "post" | "rev" | "r" => Field::Post,
            "dev" => Field::Dev,
            "local" => Field::Local,
            other => {
                if let Some(kind) = PreKind::from_spelling(other) {
                    Field::Pre(Some(kind))
                } else if let Some(index) = other
                    .strip_prefix("release.")
                    .and_then(|index| index.parse::<usize>().ok())
                {
                    Field::Release(index)
                } else {
                    return Err(Error::UnknownField {
                        name: s.trim().to_owned(),
                    });
                }
            }
        };
        Ok(field)
    }
}

/// A value to read out of or write into a single [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// A plain number: epoch, a release position, a pre-release number
    /// (keeping the kind), post, or dev.
    Number(u64),
    /// A full pre-release pair, kind and number.
    Pre(PreKind, u64),
    /// A local identifier. The empty list stands for "none".
    Local(Vec<LocalSegment>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(number) => number.fmt(f),
            FieldValue::Pre(kind, number) => write!(f, "{kind}{number}"),
            FieldValue::Local(segments) => {
                let mut first = true;
                for segment in segments {
                    if !first {
                        f.write_str(".")?;
                    }
                    first = false;
                    segment.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

fn parse_number(field: Field, raw: &str, empty_is_zero: bool) -> Result<u64> {
    if raw.is_empty() {
        if empty_is_zero {
            return Ok(0);
        }
        return Err(Error::invalid_value(
            field,
            raw,
            "expected a non-negative integer",
        ));
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_value(
            field,
            raw,
            "expected a non-negative integer",
        ));
    }
    raw.parse::<u64>()
        .map_err(|_| Error::invalid_value(field, raw, "number out of range"))
}

/// Splits a lowercased pair like `a5`, `beta.3`, or `rc` into kind and
/// number. A missing number means 0.
fn parse_pre_pair(raw: &str) -> Option<(PreKind, u64)> {
    let digits_at = raw
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (word, digits) = raw.split_at(digits_at);
    let word = word.trim_end_matches(['.', '-', '_']);
    let kind = PreKind::from_spelling(word)?;
    if digits.is_empty() {
        return Some((kind, 0));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok().map(|number| (kind, number))
}
