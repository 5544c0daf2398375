//! # pepver
//!
//! A library (and CLI) for parsing, inspecting, and rewriting [PEP 440]
//! version strings, such as the version keys of a Python project's
//! `pyproject.toml`.
//!
//! [PEP 440]: https://packaging.python.org/en/latest/specifications/version-specifiers/
//!
//! A PEP 440 version has the shape `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`,
//! with the segments in a fixed order: epoch, release, pre-release,
//! post-release, dev-release, local. Every mutable position is named by a
//! [`Field`], and every operation returns a new [`Version`] — values are
//! never mutated in place.
//!
//! ## Examples
//!
//! Parse, bump, and serialize:
//!
//! ```
//! use pepver::prelude::*;
//!
//! let version: Version = "1.2.3a4+54321".parse()?;
//!
//! // bumping clears everything to the right of the bumped field...
//! let bumped = version.bump(Field::Pre(None))?;
//! assert_eq!(bumped.to_string(), "1.2.3a5");
//!
//! // ...except the epoch, which preserves in-flight work
//! let bumped = bumped.bump(Field::Epoch)?;
//! assert_eq!(bumped.to_string(), "1!1.2.3a5");
//! # Ok::<(), pepver::Error>(())
//! ```
//!
//! Set a single field, with or without clearing:
//!
//! ```
//! use pepver::prelude::*;
//!
//! let version: Version = "1.2.3a4+54321".parse()?;
//! let minor: Field = "minor".parse()?;
//!
//! let kept = version.set(minor, FieldValue::Number(4), false)?;
//! assert_eq!(kept.to_string(), "1.4.3a4+54321");
//!
//! let cleared = version.set(minor, FieldValue::Number(4), true)?;
//! assert_eq!(cleared.to_string(), "1.4.0");
//! # Ok::<(), pepver::Error>(())
//! ```
//!
//! Promote a pre-release to a final release:
//!
//! ```
//! use pepver::prelude::*;
//!
//! let version: Version = "1.5.0rc1.dev2+build7".parse()?;
//! assert_eq!(version.bump_release().to_string(), "1.5.0");
//! # Ok::<(), pepver::Error>(())
//! ```
//!
//! ## Fields
//!
//! [`Field`] names every mutable position. The string vocabulary (accepted
//! by `Field::from_str`) is:
//!
//! | Name | Segment |
//! |---|---|
//! | `epoch` | the `N!` prefix |
//! | `major`, `minor`, `micro` (or `patch`) | release positions 0, 1, 2 |
//! | `release.N` | any release position by ordinal |
//! | `pre` | the current pre-release pair |
//! | `a`/`alpha`, `b`/`beta`, `rc`/`c`/`preview` | a specific pre-release kind |
//! | `post` (or `rev`, `r`) | the post-release number |
//! | `dev` | the dev-release number |
//! | `local` | the `+label` suffix |
//!
//! ## Legacy spellings
//!
//! Parsing accepts everything the specification's normalization rules
//! allow — `v1.0`, `1.1RC1`, `1.0-alpha.3`, `1.0-1`, `1.0.rev4`,
//! `1.2.post` — and always serializes the canonical lowercase form.
//!
//! ```
//! use pepver::Version;
//!
//! assert_eq!(Version::parse("v1.1RC1")?.to_string(), "1.1rc1");
//! assert_eq!(Version::parse("1.0.0-1")?, Version::parse("1.0.0.post1")?);
//! # Ok::<(), pepver::Error>(())
//! ```
//!
//! ## pyproject.toml
//!
//! The [`pyproject`] module reads and writes the two version keys of a
//! `pyproject.toml` (`project.version`, and `tool.poetry.version` when
//! present), which is what the `pepver` binary drives.
//!
//! ## Prelude
//!
//! Everything needed to work with versions, for glob import:
//!
//! ```
//! use pepver::prelude::*;
//! ```
#![warn(missing_docs)]

mod error;
mod field;
pub mod pyproject;
mod version;

pub use crate::error::{Error, Result};
pub use crate::field::{Field, FieldValue, PreKind};
pub use crate::pyproject::{PyProject, PyProjectError, PyProjectResult};
pub use crate::version::{LocalSegment, Version};

/// A convenience module appropriate for glob imports (`use pepver::prelude::*;`).
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::Error;
    #[doc(no_inline)]
    pub use crate::Field;
    #[doc(no_inline)]
    pub use crate::FieldValue;
    #[doc(no_inline)]
    pub use crate::LocalSegment;
    #[doc(no_inline)]
    pub use crate::PreKind;
    #[doc(no_inline)]
    pub use crate::PyProject;
    #[doc(no_inline)]
    pub use crate::PyProjectError;
    #[doc(no_inline)]
    pub use crate::Version;
}
