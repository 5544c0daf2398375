use core::fmt::{self, Display};
use core::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::field::{Field, FieldValue, PreKind};

/// The version grammar from the PEP 440 appendix
/// (<https://peps.python.org/pep-0440/#appendix-b-parsing-version-strings-with-regular-expressions>).
///
/// Accepts every legacy spelling the spec allows: alternate pre-release words,
/// `-`/`_`/`.` (or no) separators, the bare-dash post form (`1.0-1`), and a
/// leading `v`. Everything normalizes to one model on read.
const VERSION_PATTERN: &str = r"
    (?:v?)
    (?:
        (?:(?P<epoch>[0-9]+)!)?                           # epoch
        (?P<release>[0-9]+(?:\.[0-9]+)*)                  # release segment
        (?P<pre>                                          # pre-release
            [-_\.]?
            (?P<pre_l>(a|b|c|rc|alpha|beta|pre|preview))
            [-_\.]?
            (?P<pre_n>[0-9]+)?
        )?
        (?P<post>                                         # post release
            (?:-(?P<post_n1>[0-9]+))
            |
            (?:
                [-_\.]?
                (?P<post_l>post|rev|r)
                [-_\.]?
                (?P<post_n2>[0-9]+)?
            )
        )?
        (?P<dev>                                          # dev release
            [-_\.]?
            dev
            [-_\.]?
            (?P<dev_n>[0-9]+)?
        )?
    )
    (?:\+(?P<local>[a-z0-9]+(?:[-_\.][a-z0-9]+)*))?       # local version
";

/// Upper bound on addressable release positions. Real versions carry a
/// handful; the cap keeps `release.N` names from forcing huge allocations.
const MAX_RELEASE_POSITIONS: usize = 4096;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?xi)^{VERSION_PATTERN}$")).unwrap());

/// Same grammar, unanchored at the end. Used on parse failure to find the
/// longest valid prefix, so the error can point at the first bad byte.
static VERSION_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?xi)^{VERSION_PATTERN}")).unwrap());

/// One dot-separated part of a local version identifier.
///
/// An all-digit part is kept as a number (so `001` re-encodes as `1`); any
/// other part is kept as a lowercased string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalSegment {
    /// A part with at least one letter, e.g. `ubuntu`.
    String(String),
    /// An all-digit part, e.g. the `1` in `ubuntu.1`.
    Number(u64),
}

impl LocalSegment {
    fn new(part: &str) -> Self {
        match part.parse::<u64>() {
            Ok(number) => Self::Number(number),
            Err(_) => Self::String(part.to_ascii_lowercase()),
        }
    }

    /// Splits a raw local identifier on `.`, `-`, or `_` into segments.
    /// Returns `None` when any separator-delimited run is empty or contains
    /// a non-alphanumeric byte. The empty string is the empty list.
    pub(crate) fn parse_list(raw: &str) -> Option<Vec<Self>> {
        if raw.is_empty() {
            return Some(Vec::new());
        }
        let mut segments = Vec::new();
        for part in raw.split(['.', '-', '_']) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return None;
            }
            segments.push(Self::new(part));
        }
        Some(segments)
    }
}

impl Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(string) => f.write_str(string),
            Self::Number(number) => number.fmt(f),
        }
    }
}

/// A PEP 440 version, such as `1.2.3` or `4!5.6.7a8.post9.dev0+deadbeef`.
///
/// The shape is `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`. Parse with
/// [`Version::parse`] or [`FromStr`]; the [`Display`] impl emits the
/// canonical form (epoch only when non-zero, lowercase throughout, legacy
/// spellings already normalized away).
///
/// Values are immutable: [`set`](Self::set), [`bump`](Self::bump), and
/// [`bump_release`](Self::bump_release) return new versions and leave the
/// receiver untouched.
///
/// ```
/// use pepver::{Field, Version};
///
/// let version: Version = "1.2.3a5+54321".parse().unwrap();
/// let bumped = version.bump(Field::Pre(None)).unwrap();
/// assert_eq!(bumped.to_string(), "1.2.3a6");
/// assert_eq!(version.to_string(), "1.2.3a5+54321");
/// ```
///
/// Equality is structural. There is deliberately no `Ord`: this crate
/// constructs and rewrites single versions, it does not sort them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

impl Default for Version {
    /// The "unset" starting point, `0`.
    fn default() -> Self {
        Self {
            epoch: 0,
            release: vec![0],
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }
}

impl Version {
    /// Parses a version string. Alias for the [`FromStr`] impl.
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }

    /// The epoch, 0 unless the version carries an `N!` prefix.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release numbers, e.g. `[1, 2, 3]` for `1.2.3`. Never empty.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The pre-release pair, if any.
    pub fn pre(&self) -> Option<(PreKind, u64)> {
        self.pre
    }

    /// The post-release number, if any.
    pub fn post(&self) -> Option<u64> {
        self.post
    }

    /// The dev-release number, if any.
    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// The local identifier segments, if any.
    pub fn local(&self) -> Option<&[LocalSegment]> {
        self.local.as_deref()
    }

    /// Reads the addressed field.
    ///
    /// Release positions past the stored length read as the implicit 0, so
    /// `micro` on `1.2` is `Number(0)`. `Pre(Some(kind))` yields the number
    /// only when the current pre-release has that kind. `None` means the
    /// segment is unset.
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Epoch => Some(FieldValue::Number(self.epoch)),
            Field::Release(index) => Some(FieldValue::Number(
                self.release.get(index).copied().unwrap_or(0),
            )),
            Field::Pre(None) => self.pre.map(|(kind, number)| FieldValue::Pre(kind, number)),
            Field::Pre(Some(kind)) => match self.pre {
                Some((current, number)) if current == kind => Some(FieldValue::Number(number)),
                _ => None,
            },
            Field::Post => self.post.map(FieldValue::Number),
            Field::Dev => self.dev.map(FieldValue::Number),
            Field::Local => self
                .local
                .as_ref()
                .map(|segments| FieldValue::Local(segments.clone())),
        }
    }

    /// Returns a new version with `value` written into the addressed field.
    ///
    /// With `clear_right`, every field strictly to the right of the addressed
    /// position is discarded: release positions after it reset to 0, and
    /// pre/post/dev/local become unset. Clearing right of the epoch keeps
    /// release position 0, so the release stays meaningful.
    ///
    /// Writing 0 to the epoch returns it to the implicit default (no `N!` is
    /// serialized). Writing the empty segment list to `local` unsets it.
    /// A `Number` written through `Pre(None)` keeps the current kind and
    /// fails when no pre-release is present; switching kind takes an
    /// explicit `Pre(Some(kind))` or a full pair.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidValue`] when the value does not fit the field, or
    /// when a release position is beyond the addressable range.
    pub fn set(&self, field: Field, value: FieldValue, clear_right: bool) -> Result<Self> {
        let mut next = self.clone();
        match (field, value) {
            (Field::Epoch, FieldValue::Number(number)) => next.epoch = number,
            (Field::Release(index), FieldValue::Number(number)) => {
                next.reserve_release(index)?;
                next.release[index] = number;
            }
            (Field::Pre(Some(kind)), FieldValue::Number(number)) => {
                next.pre = Some((kind, number));
            }
            (Field::Pre(None), FieldValue::Pre(kind, number)) => {
                next.pre = Some((kind, number));
            }
            (Field::Pre(None), FieldValue::Number(number)) => match next.pre {
                Some((kind, _)) => next.pre = Some((kind, number)),
                None => {
                    return Err(Error::invalid_value(
                        field,
                        number.to_string(),
                        "no pre-release to renumber; use `a`, `b`, or `rc` to pick a kind",
                    ));
                }
            },
            (Field::Post, FieldValue::Number(number)) => next.post = Some(number),
            (Field::Dev, FieldValue::Number(number)) => next.dev = Some(number),
            (Field::Local, FieldValue::Local(segments)) => {
                next.local = if segments.is_empty() {
                    None
                } else {
                    Some(segments)
                };
            }
            (field, value) => {
                return Err(Error::invalid_value(
                    field,
                    value.to_string(),
                    "value does not fit this field",
                ));
            }
        }
        if clear_right {
            next.clear_right_of(field);
        }
        Ok(next)
    }

    /// Returns a new version with the addressed field incremented and
    /// everything to its right cleared — except for the epoch, which bumps
    /// without clearing anything, so in-flight pre/post/dev work survives an
    /// epoch change.
    ///
    /// Absent fields count as 0, so bumping `post` on `1.2` gives
    /// `1.2.post1` and bumping a release position past the stored length
    /// extends it with zeros first (`micro` on `1.2` gives `1.2.1`).
    /// Bumping a specific kind (`a`/`b`/`rc`) when the current pre-release
    /// has a different kind, or none, restarts at 1 under the requested
    /// kind. Bumping `local` increments a trailing digit run of the last
    /// segment, preserving its zero-padded width (`foo0100` becomes
    /// `foo0101`); with no local set it becomes `1`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidValue`] for `bump(pre)` when no pre-release exists
    /// (the generic `pre` names no kind to start from), for a release
    /// position beyond the addressable range, and for a number already at
    /// `u64::MAX`.
    pub fn bump(&self, field: Field) -> Result<Self> {
        let mut next = self.clone();
        match field {
            Field::Epoch => {
                next.epoch = bump_number(field, self.epoch)?;
                return Ok(next);
            }
            Field::Release(index) => {
                next.reserve_release(index)?;
                next.release[index] = bump_number(field, next.release[index])?;
            }
            Field::Pre(Some(kind)) => {
                next.pre = Some(match self.pre {
                    Some((current, number)) if current == kind => {
                        (kind, bump_number(field, number)?)
                    }
                    _ => (kind, 1),
                });
            }
            Field::Pre(None) => match self.pre {
                Some((kind, number)) => next.pre = Some((kind, bump_number(field, number)?)),
                None => {
                    return Err(Error::invalid_value(
                        field,
                        "",
                        "no pre-release to bump; use `a`, `b`, or `rc` to pick a kind",
                    ));
                }
            },
            Field::Post => next.post = Some(bump_number(field, self.post.unwrap_or(0))?),
            Field::Dev => next.dev = Some(bump_number(field, self.dev.unwrap_or(0))?),
            Field::Local => {
                let mut segments = self.local.clone().unwrap_or_default();
                match segments.pop() {
                    None => segments.push(LocalSegment::Number(1)),
                    Some(last) => segments.push(bump_local_segment(last)?),
                }
                next.local = Some(segments);
            }
        }
        next.clear_right_of(field);
        Ok(next)
    }

    /// Returns the final-release form: pre, post, dev, and local dropped,
    /// epoch and release untouched. Idempotent.
    pub fn bump_release(&self) -> Self {
        Self {
            epoch: self.epoch,
            release: self.release.clone(),
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Extends the release with zeros so that `index` is addressable.
    /// Rejects indices past [`MAX_RELEASE_POSITIONS`]: `Field::from_str`
    /// accepts any `release.N`, so the bound has to hold here.
    fn reserve_release(&mut self, index: usize) -> Result<()> {
        if index >= MAX_RELEASE_POSITIONS {
            return Err(Error::invalid_value(
                Field::Release(index),
                index.to_string(),
                "release position out of range",
            ));
        }
        if index >= self.release.len() {
            self.release.resize(index + 1, 0);
        }
        Ok(())
    }

    /// Discards every field strictly to the right of `field` in the segment
    /// order. Release positions are zeroed rather than removed; position 0
    /// survives even when clearing right of the epoch.
    fn clear_right_of(&mut self, field: Field) {
        match field {
            Field::Epoch => {
                for slot in self.release.iter_mut().skip(1) {
                    *slot = 0;
                }
            }
            Field::Release(index) => {
                for slot in self.release.iter_mut().skip(index + 1) {
                    *slot = 0;
                }
            }
            _ => {}
        }
        let rank = field.rank();
        if rank < Field::Pre(None).rank() {
            self.pre = None;
        }
        if rank < Field::Post.rank() {
            self.post = None;
        }
        if rank < Field::Dev.rank() {
            self.dev = None;
        }
        if rank < Field::Local.rank() {
            self.local = None;
        }
    }
}

/// `number + 1`, or `InvalidValue` at the `u64` ceiling.
fn bump_number(field: Field, number: u64) -> Result<u64> {
    number.checked_add(1).ok_or_else(|| {
        Error::invalid_value(field, number.to_string(), "number already at its maximum")
    })
}

/// Increments the trailing digit run of a local segment, keeping its
/// zero-padded width. A segment whose digits do not fit (or carry) in a
/// `u64` gets `1` appended, like a segment with no digits at all.
fn bump_local_segment(segment: LocalSegment) -> Result<LocalSegment> {
    match segment {
        LocalSegment::Number(number) => {
            Ok(LocalSegment::Number(bump_number(Field::Local, number)?))
        }
        LocalSegment::String(text) => {
            let stem_len = text.len()
                - text
                    .bytes()
                    .rev()
                    .take_while(u8::is_ascii_digit)
                    .count();
            let (stem, digits) = text.split_at(stem_len);
            let bumped = match digits.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
                Some(next) => format!("{stem}{next:0width$}", width = digits.len()),
                None => format!("{text}1"),
            };
            Ok(LocalSegment::String(bumped))
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    /// Parses any spelling the grammar accepts, normalizing to the canonical
    /// model: surrounding whitespace and a leading `v` are dropped, letters
    /// lowercase, legacy pre/post words map to `a`/`b`/`rc`/`post`, omitted
    /// numbers mean 0, and numeric segments re-encode without leading zeros.
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let base = trimmed.as_ptr() as usize - input.as_ptr() as usize;
        let Some(captures) = VERSION_RE.captures(trimmed) else {
            // Point at the first byte past the longest parseable prefix.
            let consumed = VERSION_PREFIX_RE
                .find(trimmed)
                .map(|prefix| prefix.end())
                .unwrap_or(0);
            return Err(Error::Malformed {
                input: input.to_owned(),
                fragment: trimmed[consumed..].to_owned(),
                offset: base + consumed,
            });
        };

        let number = |name: &str| -> Result<Option<u64>> {
            match captures.name(name) {
                Some(digits) => {
                    digits
                        .as_str()
                        .parse::<u64>()
                        .map(Some)
                        .map_err(|_| Error::Malformed {
                            input: input.to_owned(),
                            fragment: digits.as_str().to_owned(),
                            offset: base + digits.start(),
                        })
                }
                None => Ok(None),
            }
        };

        let epoch = number("epoch")?.unwrap_or(0);
        let release = parse_release(&captures, input, base)?;
        let pre = match captures.name("pre_l") {
            // The spelling is constrained by the grammar, so the table lookup
            // cannot miss.
            Some(word) => {
                let kind = PreKind::from_spelling(&word.as_str().to_ascii_lowercase())
                    .ok_or_else(|| Error::Malformed {
                        input: input.to_owned(),
                        fragment: word.as_str().to_owned(),
                        offset: base + word.start(),
                    })?;
                Some((kind, number("pre_n")?.unwrap_or(0)))
            }
            None => None,
        };
        let post = if captures.name("post").is_some() {
            Some(number("post_n2")?.or(number("post_n1")?).unwrap_or(0))
        } else {
            None
        };
        let dev = if captures.name("dev").is_some() {
            Some(number("dev_n")?.unwrap_or(0))
        } else {
            None
        };
        let local = captures.name("local").and_then(|raw| {
            // Character set and shape already enforced by the grammar.
            LocalSegment::parse_list(&raw.as_str().to_ascii_lowercase())
        });

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

fn parse_release(captures: &Captures, input: &str, base: usize) -> Result<Vec<u64>> {
    let raw = captures.name("release").ok_or_else(|| Error::Malformed {
        input: input.to_owned(),
        fragment: input.trim().to_owned(),
        offset: base,
    })?;
    let mut release = Vec::new();
    let mut cursor = raw.start();
    for digits in raw.as_str().split('.') {
        let value = digits.parse::<u64>().map_err(|_| Error::Malformed {
            input: input.to_owned(),
            fragment: digits.to_owned(),
            offset: base + cursor,
        })?;
        release.push(value);
        cursor += digits.len() + 1;
    }
    Ok(release)
}

impl Display for Version {
    /// The canonical form. Round-trips: for canonical `s`,
    /// `Version::parse(s)?.to_string() == s`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let mut first = true;
        for part in &self.release {
            if !first {
                f.write_str(".")?;
            }
            first = false;
            part.fmt(f)?;
        }
        if let Some((kind, number)) = self.pre {
            write!(f, "{kind}{number}")?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        if let Some(segments) = &self.local {
            f.write_str("+")?;
            let mut first = true;
            for segment in segments {
                if !first {
                    f.write_str(".")?;
                }
                first = false;
                segment.fmt(f)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}
