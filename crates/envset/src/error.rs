//! Error types for value conversion and the parse pass.
//!
//! Two layers of failure exist. [`ValueError`] describes why a single raw
//! string could not become a typed value (bad literal, failed pre-check).
//! [`Error`] ties a `ValueError` (or a missing lookup) to the environment
//! variable it belongs to. A parse pass never stops at the first failure;
//! it collects every per-variable [`Error`] into one [`Errors`] aggregate
//! so an operator sees the whole picture in a single run.
//!
//! All types carry [`miette`] diagnostic codes (`envset::…`) so callers can
//! render them with `miette::Report` for terminal output.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

use miette::Diagnostic;
use thiserror::Error as ThisError;

/// A conversion or validation failure for a single raw value.
///
/// Produced by [`Value::set`](crate::Value::set) implementations and by the
/// built-in pre-checks. Caller-defined value types can return arbitrary
/// failures through [`ValueError::Other`].
#[derive(Debug, ThisError, Diagnostic)]
#[non_exhaustive]
pub enum ValueError {
    /// Base-10 integer parse failure.
    #[error("invalid integer {literal:?}: {source}")]
    #[diagnostic(code(envset::invalid_int))]
    Int {
        /// The offending literal.
        literal: String,

        /// The underlying numeric error.
        #[source]
        source: std::num::ParseIntError,
    },

    /// Base-10 64-bit integer parse failure.
    #[error("invalid 64-bit integer {literal:?}: {source}")]
    #[diagnostic(code(envset::invalid_int64))]
    Int64 {
        /// The offending literal.
        literal: String,

        /// The underlying numeric error.
        #[source]
        source: std::num::ParseIntError,
    },

    /// Floating-point parse failure.
    #[error("invalid float {literal:?}: {source}")]
    #[diagnostic(code(envset::invalid_float))]
    Float {
        /// The offending literal.
        literal: String,

        /// The underlying numeric error.
        #[source]
        source: std::num::ParseFloatError,
    },

    /// The literal is not one of the accepted boolean forms.
    #[error("invalid bool {literal:?}: invalid syntax")]
    #[diagnostic(
        code(envset::invalid_bool),
        help("accepted values: 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False")
    )]
    Bool {
        /// The offending literal.
        literal: String,
    },

    /// Compound duration literal parse failure.
    #[error("invalid duration {literal:?}: {source}")]
    #[diagnostic(code(envset::invalid_duration), help("use a form like \"90s\" or \"1m 30s\""))]
    Duration {
        /// The offending literal.
        literal: String,

        /// The underlying duration parser error.
        #[source]
        source: humantime::DurationError,
    },

    /// URL syntax failure.
    #[error(transparent)]
    #[diagnostic(code(envset::invalid_url))]
    Url(#[from] url::ParseError),

    /// The raw value is empty where a non-empty value is required.
    #[error("empty")]
    #[diagnostic(code(envset::empty))]
    Empty,

    /// The raw value does not have the required `host:port` shape.
    #[error("address {literal:?}: {reason}")]
    #[diagnostic(code(envset::invalid_addr))]
    Addr {
        /// The offending literal.
        literal: String,

        /// What was wrong with it.
        reason: &'static str,
    },

    /// The raw value does not name an existing filesystem entry.
    #[error("stat {path:?}: {source}")]
    #[diagnostic(code(envset::invalid_path))]
    Stat {
        /// The path that failed the stat call.
        path: String,

        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A failure from a caller-defined value type.
    #[error(transparent)]
    #[diagnostic(code(envset::invalid_value))]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl ValueError {
    /// Wraps an arbitrary failure from a caller-defined value type.
    pub fn other(source: impl StdError + Send + Sync + 'static) -> Self {
        ValueError::Other(Box::new(source))
    }

    /// Creates an address-shape failure for `literal`.
    pub(crate) fn addr(literal: impl Into<String>, reason: &'static str) -> Self {
        ValueError::Addr {
            literal: literal.into(),
            reason,
        }
    }
}

/// A single per-variable failure recorded during a parse pass.
#[derive(Debug, ThisError, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// The lookup source had no entry for the variable.
    #[error("missing environment variable {var}")]
    #[diagnostic(code(envset::missing_var))]
    Missing {
        /// The qualified variable name.
        var: String,

        /// Where to set it.
        #[help]
        help: String,
    },

    /// The raw value was found but could not be stored.
    #[error("could not set environment variable {var}: {source}")]
    #[diagnostic(code(envset::set_var))]
    Set {
        /// The qualified variable name.
        var: String,

        /// Why the raw value was rejected.
        #[source]
        source: ValueError,
    },
}

impl Error {
    /// Creates a missing-variable error for `var`.
    pub fn missing(var: impl Into<String>) -> Self {
        let var = var.into();
        let help = format!("set {var} in the environment");
        Error::Missing { var, help }
    }

    /// Creates a conversion/validation error for `var`.
    pub fn set(var: impl Into<String>, source: ValueError) -> Self {
        Error::Set {
            var: var.into(),
            source,
        }
    }

    /// The qualified name of the variable this error is about.
    #[must_use]
    pub fn var(&self) -> &str {
        match self {
            Error::Missing { var, .. } | Error::Set { var, .. } => var,
        }
    }
}

/// The ordered aggregate of every failure from one parse pass.
///
/// A parse pass either succeeds completely or returns one of these; an
/// aggregate surfaced by [`VarSet::parse`](crate::VarSet::parse) is never
/// empty. Entries appear in variable declaration order. The rendered form
/// shows the first failure plus a count of the rest; iterate (or index)
/// to reach every entry.
#[derive(Debug, Default, Diagnostic)]
#[diagnostic(
    code(envset::parse_errors),
    help("fix every listed variable and parse again")
)]
pub struct Errors {
    /// All recorded failures, in declaration order.
    #[related]
    errors: Vec<Error>,
}

impl Errors {
    pub(crate) fn push(&mut self, err: Error) {
        self.errors.push(err);
    }

    pub(crate) fn into_result(self) -> Result<(), Errors> {
        if self.errors.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Deref for Errors {
    type Target = [Error];

    fn deref(&self) -> &[Error] {
        &self.errors
    }
}

impl IntoIterator for Errors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl Display for Errors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "(0 errors)"),
            [only] => write!(f, "{only}"),
            [first, _] => write!(f, "{first} (and 1 other error)"),
            [first, rest @ ..] => write!(f, "{first} (and {} other errors)", rest.len()),
        }
    }
}

impl StdError for Errors {}
