//! The [`Value`] capability and the built-in typed values.
//!
//! A [`Value`] converts a raw environment string into typed storage and
//! renders that storage back to its canonical string form. Every built-in
//! value writes through a [`Binding`], the cheap-clone handle returned by
//! the [`VarSet`](crate::VarSet) declarators.
//!
//! # Best-effort writes
//!
//! Numeric, boolean and duration values overwrite their binding *before*
//! returning a conversion error: a malformed integer still zeroes the bound
//! storage. String-shaped values wrapped in a [`Checked`](crate::Checked)
//! pre-check behave differently: the check runs first and the binding is
//! left untouched on rejection. Both behaviors are part of the observable
//! contract; see the individual `set` implementations.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use url::Url;

use crate::error::ValueError;

// ============================================================================
// Binding
// ============================================================================

/// A caller-visible storage cell bound to a declared variable.
///
/// Declarators such as [`VarSet::int`](crate::VarSet::int) allocate a
/// zero-valued cell, register a value that writes into it, and hand the
/// binding back to the caller. The binding holds the zero value until a
/// parse pass succeeds for its variable; read it after
/// [`VarSet::parse_from`](crate::VarSet::parse_from) returns.
///
/// Bindings are cheap to clone; every clone refers to the same cell.
pub struct Binding<T> {
    cell: Arc<RwLock<T>>,
}

impl<T> Binding<T> {
    pub(crate) fn new(initial: T) -> Self {
        Self {
            cell: Arc::new(RwLock::new(initial)),
        }
    }

    /// Returns a copy of the stored value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.read().clone()
    }

    /// Calls `f` with a shared reference to the stored value.
    ///
    /// Useful for reading without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.read())
    }

    /// Overwrites the stored value.
    ///
    /// [`Value::set`] implementations write through this; caller-defined
    /// value types use it the same way.
    pub fn store(&self, value: T) {
        *self.cell.write() = value;
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Default> Default for Binding<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for Binding<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&*self.cell.read()).finish()
    }
}

// ============================================================================
// Value Trait
// ============================================================================

/// The conversion capability stored in a [`Var`](crate::Var).
///
/// This is the extension point for caller-defined variable types: implement
/// it and register the value with [`VarSet::var`](crate::VarSet::var).
///
/// # Example
///
/// ```rust,ignore
/// struct PositiveInt(Binding<i32>);
///
/// impl Value for PositiveInt {
///     fn set(&mut self, raw: &str) -> Result<(), ValueError> {
///         let n: i32 = raw.parse().map_err(ValueError::other)?;
///         if n < 0 {
///             return Err(ValueError::other(NegativeError));
///         }
///         self.0.store(n);
///         Ok(())
///     }
///
///     fn render(&self) -> String {
///         self.0.get().to_string()
///     }
/// }
/// ```
pub trait Value: Send + Sync {
    /// Assigns a new value from its raw string representation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] when the raw string cannot be converted or
    /// fails a pre-check. Whether the bound storage is mutated on failure
    /// depends on the value type; see the module docs.
    fn set(&mut self, raw: &str) -> Result<(), ValueError>;

    /// Renders the current storage back to its canonical string form.
    ///
    /// Not guaranteed to equal the raw input: booleans normalize to
    /// `true`/`false`, durations to `humantime` syntax.
    fn render(&self) -> String;
}

// ============================================================================
// Built-in Values
// ============================================================================

pub(crate) struct StringValue {
    cell: Binding<String>,
}

impl StringValue {
    pub(crate) fn new(cell: Binding<String>) -> Self {
        Self { cell }
    }
}

impl Value for StringValue {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        self.cell.store(raw.to_owned());
        Ok(())
    }

    fn render(&self) -> String {
        self.cell.get()
    }
}

pub(crate) struct IntValue {
    cell: Binding<i32>,
}

impl IntValue {
    pub(crate) fn new(cell: Binding<i32>) -> Self {
        Self { cell }
    }
}

impl Value for IntValue {
    // Best-effort write: the binding is zeroed before a parse error returns.
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match raw.parse::<i32>() {
            Ok(n) => {
                self.cell.store(n);
                Ok(())
            }
            Err(source) => {
                self.cell.store(0);
                Err(ValueError::Int {
                    literal: raw.to_owned(),
                    source,
                })
            }
        }
    }

    fn render(&self) -> String {
        self.cell.get().to_string()
    }
}

pub(crate) struct Int64Value {
    cell: Binding<i64>,
}

impl Int64Value {
    pub(crate) fn new(cell: Binding<i64>) -> Self {
        Self { cell }
    }
}

impl Value for Int64Value {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match raw.parse::<i64>() {
            Ok(n) => {
                self.cell.store(n);
                Ok(())
            }
            Err(source) => {
                self.cell.store(0);
                Err(ValueError::Int64 {
                    literal: raw.to_owned(),
                    source,
                })
            }
        }
    }

    fn render(&self) -> String {
        self.cell.get().to_string()
    }
}

pub(crate) struct Float32Value {
    cell: Binding<f32>,
}

impl Float32Value {
    pub(crate) fn new(cell: Binding<f32>) -> Self {
        Self { cell }
    }
}

impl Value for Float32Value {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match raw.parse::<f32>() {
            Ok(n) => {
                self.cell.store(n);
                Ok(())
            }
            Err(source) => {
                self.cell.store(0.0);
                Err(ValueError::Float {
                    literal: raw.to_owned(),
                    source,
                })
            }
        }
    }

    fn render(&self) -> String {
        self.cell.get().to_string()
    }
}

pub(crate) struct Float64Value {
    cell: Binding<f64>,
}

impl Float64Value {
    pub(crate) fn new(cell: Binding<f64>) -> Self {
        Self { cell }
    }
}

impl Value for Float64Value {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match raw.parse::<f64>() {
            Ok(n) => {
                self.cell.store(n);
                Ok(())
            }
            Err(source) => {
                self.cell.store(0.0);
                Err(ValueError::Float {
                    literal: raw.to_owned(),
                    source,
                })
            }
        }
    }

    fn render(&self) -> String {
        self.cell.get().to_string()
    }
}

pub(crate) struct BoolValue {
    cell: Binding<bool>,
}

impl BoolValue {
    pub(crate) fn new(cell: Binding<bool>) -> Self {
        Self { cell }
    }
}

/// The exact literal set accepted for boolean variables.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

impl Value for BoolValue {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match parse_bool(raw) {
            Some(b) => {
                self.cell.store(b);
                Ok(())
            }
            None => {
                self.cell.store(false);
                Err(ValueError::Bool {
                    literal: raw.to_owned(),
                })
            }
        }
    }

    fn render(&self) -> String {
        if self.cell.get() { "true" } else { "false" }.to_owned()
    }
}

pub(crate) struct DurationValue {
    cell: Binding<Duration>,
}

impl DurationValue {
    pub(crate) fn new(cell: Binding<Duration>) -> Self {
        Self { cell }
    }
}

impl Value for DurationValue {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match humantime::parse_duration(raw) {
            Ok(d) => {
                self.cell.store(d);
                Ok(())
            }
            Err(source) => {
                self.cell.store(Duration::ZERO);
                Err(ValueError::Duration {
                    literal: raw.to_owned(),
                    source,
                })
            }
        }
    }

    fn render(&self) -> String {
        humantime::format_duration(self.cell.get()).to_string()
    }
}

pub(crate) struct UrlValue {
    cell: Binding<Option<Url>>,
}

impl UrlValue {
    pub(crate) fn new(cell: Binding<Option<Url>>) -> Self {
        Self { cell }
    }
}

impl Value for UrlValue {
    // Unlike the numeric values, the binding is left untouched on failure.
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        if raw.is_empty() {
            return Err(ValueError::Empty);
        }
        let url = Url::parse(raw)?;
        self.cell.store(Some(url));
        Ok(())
    }

    fn render(&self) -> String {
        self.cell
            .with(|url| url.as_ref().map_or_else(String::new, |u| u.as_str().to_owned()))
    }
}
