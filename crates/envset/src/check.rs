//! Pre-checks and the [`Checked`] validating decorator.
//!
//! A [`Checked`] value runs a check function over the raw string before
//! delegating to the wrapped [`Value`]. When the check rejects, the wrapped
//! value is never invoked, so its binding keeps whatever it held before.
//! This is the opposite of the best-effort write the numeric values
//! perform.

use std::fs;

use crate::error::ValueError;
use crate::value::Value;

/// A [`Value`] wrapper that validates raw input before conversion.
///
/// Used by the address, path and required-string declarators; also usable
/// with caller-defined checks through
/// [`VarSet::var`](crate::VarSet::var):
///
/// ```rust,ignore
/// set.var(
///     Checked::new(|raw| forbid_whitespace(raw), StringValue::new(cell)),
///     "TOKEN",
///     "API token",
/// );
/// ```
pub struct Checked<V> {
    check: Box<dyn Fn(&str) -> Result<(), ValueError> + Send + Sync>,
    value: V,
}

impl<V: Value> Checked<V> {
    /// Wraps `value` so that `check` must pass before any `set` reaches it.
    pub fn new(
        check: impl Fn(&str) -> Result<(), ValueError> + Send + Sync + 'static,
        value: V,
    ) -> Self {
        Self {
            check: Box::new(check),
            value,
        }
    }
}

impl<V: Value> Value for Checked<V> {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        (self.check)(raw)?;
        self.value.set(raw)
    }

    fn render(&self) -> String {
        self.value.render()
    }
}

/// Rejects the empty string.
pub(crate) fn non_empty(raw: &str) -> Result<(), ValueError> {
    if raw.is_empty() {
        return Err(ValueError::Empty);
    }
    Ok(())
}

/// Splits `host:port`, honoring bracketed IPv6 hosts like `[::1]:80`.
///
/// A bare address with more than one colon is rejected, as is one with no
/// colon at all.
fn split_host_port(raw: &str) -> Result<(&str, &str), ValueError> {
    if let Some(rest) = raw.strip_prefix('[') {
        let Some((host, after)) = rest.split_once(']') else {
            return Err(ValueError::addr(raw, "missing ']' in address"));
        };
        let Some(port) = after.strip_prefix(':') else {
            return Err(ValueError::addr(raw, "missing port in address"));
        };
        return Ok((host, port));
    }

    let Some((host, port)) = raw.rsplit_once(':') else {
        return Err(ValueError::addr(raw, "missing port in address"));
    };
    if host.contains(':') {
        return Err(ValueError::addr(raw, "too many colons in address"));
    }
    Ok((host, port))
}

/// Checks that `raw` is a valid bind address.
///
/// A bind address has the form `host:port` with a non-empty port. The host
/// may be empty, which binds the wildcard address (`:1234`).
pub(crate) fn bind_addr(raw: &str) -> Result<(), ValueError> {
    let (_, port) = split_host_port(raw)?;
    if port.is_empty() {
        return Err(ValueError::addr(raw, "empty port"));
    }
    Ok(())
}

/// Checks that `raw` is a valid dial address.
///
/// A dial target must name both a host and a port.
pub(crate) fn dial_addr(raw: &str) -> Result<(), ValueError> {
    let (host, port) = split_host_port(raw)?;
    if host.is_empty() {
        return Err(ValueError::addr(raw, "empty host"));
    }
    if port.is_empty() {
        return Err(ValueError::addr(raw, "empty port"));
    }
    Ok(())
}

/// Checks that `raw` names an existing filesystem entry.
///
/// Performs a synchronous stat call; on a slow filesystem this blocks with
/// no timeout.
pub(crate) fn path_exists(raw: &str) -> Result<(), ValueError> {
    match fs::metadata(raw) {
        Ok(_) => Ok(()),
        Err(source) => Err(ValueError::Stat {
            path: raw.to_owned(),
            source,
        }),
    }
}
