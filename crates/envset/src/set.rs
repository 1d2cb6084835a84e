//! The variable registry and the parse engine.
//!
//! A [`VarSet`] holds declared variables in declaration order. Each typed
//! declarator allocates a zero-valued [`Binding`], registers a value that
//! writes into it, and returns the binding for the caller to read after
//! parsing. [`VarSet::parse_from`] resolves every variable through a
//! [`Lookup`] and aggregates every failure into one [`Errors`]. A pass
//! never stops at the first bad variable, so an operator sees the whole
//! misconfiguration in a single run.
//!
//! Declaration and parsing are startup activities; the registry makes no
//! guarantees for concurrent declaration or concurrent parsing of the same
//! set. Callers sharing a registry across threads must serialize access
//! themselves.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use url::Url;

use crate::check::{self, Checked};
use crate::error::{Error, Errors};
use crate::lookup::{Lookup, OsEnv};
use crate::value::{
    Binding, BoolValue, DurationValue, Float32Value, Float64Value, Int64Value, IntValue,
    StringValue, UrlValue, Value,
};

/// A declared variable: qualified name, usage text and conversion value.
///
/// Created by the [`VarSet`] declarators and never mutated afterwards.
pub struct Var {
    name: String,
    usage: String,
    value: Box<dyn Value>,
}

impl Var {
    /// The qualified environment key, prefix included.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The usage text supplied at declaration.
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Renders the currently stored value.
    #[must_use]
    pub fn render(&self) -> String {
        self.value.render()
    }
}

impl Debug for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("value", &self.value.render())
            .finish()
    }
}

/// An ordered set of declared variables sharing a name-derived prefix.
///
/// The prefix is the uppercased set name with `-` replaced by `_`; an empty
/// name yields no prefix. Declaring `PORT` on a set named `my-app` binds
/// the environment key `MY_APP_PORT`.
///
/// Duplicate names are permitted: each declaration looks up the same key
/// independently and writes its own binding.
///
/// # Example
///
/// ```rust,ignore
/// let mut set = VarSet::new("app");
/// let listen = set.bind_addr("LISTEN", "address to listen on");
/// let timeout = set.duration("TIMEOUT", "request timeout");
///
/// set.parse_from(&OsEnv)?;
/// println!("listening on {}", listen.get());
/// ```
pub struct VarSet {
    name: String,
    prefix: String,
    vars: Vec<Var>,
}

impl VarSet {
    /// Creates an empty set with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let prefix = name.to_uppercase().replace('-', "_");
        Self {
            name,
            prefix,
            vars: Vec::new(),
        }
    }

    /// The name of the set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The prefix applied to all variables declared on this set.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn qualified(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_owned()
        } else {
            format!("{}_{}", self.prefix, name)
        }
    }

    /// Declares a variable backed by a caller-supplied [`Value`].
    ///
    /// This is the extension point for variable types beyond the built-in
    /// declarators. No uniqueness check is applied; a duplicate name is
    /// registered and parsed independently.
    pub fn var(&mut self, value: impl Value + 'static, name: &str, usage: &str) {
        self.vars.push(Var {
            name: self.qualified(name),
            usage: usage.to_owned(),
            value: Box::new(value),
        });
    }

    /// Declares a string variable. The binding stores the raw value verbatim.
    pub fn string(&mut self, name: &str, usage: &str) -> Binding<String> {
        let cell = Binding::default();
        self.var(StringValue::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a string variable that rejects the empty string.
    pub fn string_required(&mut self, name: &str, usage: &str) -> Binding<String> {
        let cell = Binding::default();
        self.var(
            Checked::new(check::non_empty, StringValue::new(cell.clone())),
            name,
            usage,
        );
        cell
    }

    /// Declares an integer variable.
    pub fn int(&mut self, name: &str, usage: &str) -> Binding<i32> {
        let cell = Binding::default();
        self.var(IntValue::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a 64-bit integer variable.
    pub fn int64(&mut self, name: &str, usage: &str) -> Binding<i64> {
        let cell = Binding::default();
        self.var(Int64Value::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a 32-bit float variable.
    pub fn float32(&mut self, name: &str, usage: &str) -> Binding<f32> {
        let cell = Binding::default();
        self.var(Float32Value::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a 64-bit float variable.
    pub fn float64(&mut self, name: &str, usage: &str) -> Binding<f64> {
        let cell = Binding::default();
        self.var(Float64Value::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a boolean variable.
    ///
    /// Accepts exactly `1`, `t`, `T`, `true`, `TRUE`, `True` and their
    /// false counterparts; renders canonical `true`/`false`.
    pub fn bool(&mut self, name: &str, usage: &str) -> Binding<bool> {
        let cell = Binding::default();
        self.var(BoolValue::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a duration variable using `humantime` syntax (`1m 30s`).
    pub fn duration(&mut self, name: &str, usage: &str) -> Binding<Duration> {
        let cell = Binding::default();
        self.var(DurationValue::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a string variable validated as a bind address.
    ///
    /// `host:port` with a non-empty port; the host may be empty for
    /// wildcard binds like `:1234`.
    pub fn bind_addr(&mut self, name: &str, usage: &str) -> Binding<String> {
        let cell = Binding::default();
        self.var(
            Checked::new(check::bind_addr, StringValue::new(cell.clone())),
            name,
            usage,
        );
        cell
    }

    /// Declares a string variable validated as a dial address.
    ///
    /// `host:port` where both host and port must be non-empty.
    pub fn dial_addr(&mut self, name: &str, usage: &str) -> Binding<String> {
        let cell = Binding::default();
        self.var(
            Checked::new(check::dial_addr, StringValue::new(cell.clone())),
            name,
            usage,
        );
        cell
    }

    /// Declares a URL variable.
    ///
    /// The binding holds `None` until a parse succeeds; empty or malformed
    /// input leaves it untouched.
    pub fn url(&mut self, name: &str, usage: &str) -> Binding<Option<Url>> {
        let cell = Binding::default();
        self.var(UrlValue::new(cell.clone()), name, usage);
        cell
    }

    /// Declares a string variable validated as an existing filesystem path.
    pub fn path(&mut self, name: &str, usage: &str) -> Binding<String> {
        let cell = Binding::default();
        self.var(
            Checked::new(check::path_exists, StringValue::new(cell.clone())),
            name,
            usage,
        );
        cell
    }

    /// Calls `fn` once per declared variable, in declaration order.
    ///
    /// Read-only with respect to the set; renderers use this to list
    /// `{name, usage, value}` triples.
    pub fn visit(&self, mut f: impl FnMut(&Var)) {
        for var in &self.vars {
            f(var);
        }
    }

    /// Parses every declared variable from the process environment.
    ///
    /// Equivalent to `parse_from(&OsEnv)`.
    ///
    /// # Errors
    ///
    /// Returns the full ordered aggregate when any variable is missing or
    /// rejected.
    pub fn parse(&mut self) -> Result<(), Errors> {
        self.parse_from(&OsEnv)
    }

    /// Parses every declared variable through `lookup`.
    ///
    /// Variables are resolved in declaration order. A missing name or a
    /// failed conversion is recorded and the pass moves on to the next
    /// variable; nothing aborts early.
    ///
    /// # Errors
    ///
    /// Returns the aggregate of every recorded failure; `Ok(())` only when
    /// every variable resolved and converted.
    pub fn parse_from<L: Lookup + ?Sized>(&mut self, lookup: &L) -> Result<(), Errors> {
        let mut errs = Errors::default();

        for var in &mut self.vars {
            let Some(raw) = lookup.get(&var.name) else {
                tracing::debug!(var = %var.name, "environment variable not found");
                errs.push(Error::missing(&var.name));
                continue;
            };

            if let Err(cause) = var.value.set(&raw) {
                tracing::debug!(var = %var.name, %cause, "environment variable rejected");
                errs.push(Error::set(&var.name, cause));
            } else {
                tracing::debug!(var = %var.name, "environment variable set");
            }
        }

        tracing::debug!(
            set = %self.name,
            vars = self.vars.len(),
            errors = errs.len(),
            "parse pass complete"
        );
        errs.into_result()
    }
}
