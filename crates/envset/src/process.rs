//! The process-wide default registry.
//!
//! A singleton [`VarSet`] named after the program's invocation name
//! (`argv[0]` basename, computed once). The free functions here mirror
//! every declarator on [`VarSet`] and forward to the singleton, so a
//! binary can declare and parse without threading a registry around:
//!
//! ```rust,ignore
//! let listen = envset::process::bind_addr("LISTEN", "address to listen on");
//! let timeout = envset::process::duration("TIMEOUT", "request timeout");
//!
//! envset::process::parse()?;
//! ```
//!
//! The singleton is guarded by a lock so the free functions are safe to
//! call from any thread, but the registry itself makes no ordering
//! guarantees for concurrent declaration or parsing; treat both as
//! sequential startup steps.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use parking_lot::RwLock;
use url::Url;

use crate::error::Errors;
use crate::lookup::Lookup;
use crate::set::{Var, VarSet};
use crate::value::{Binding, Value};

static PROGRAM_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::args()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .unwrap_or_default()
});

static PROCESS: LazyLock<RwLock<VarSet>> =
    LazyLock::new(|| RwLock::new(VarSet::new(PROGRAM_NAME.as_str())));

/// The name of the process-wide set (normally the program name).
#[must_use]
pub fn name() -> String {
    PROCESS.read().name().to_owned()
}

/// The prefix applied to variables declared on the process-wide set.
#[must_use]
pub fn prefix() -> String {
    PROCESS.read().prefix().to_owned()
}

/// Declares a variable backed by a caller-supplied [`Value`] on the
/// process-wide set.
pub fn var(value: impl Value + 'static, name: &str, usage: &str) {
    PROCESS.write().var(value, name, usage);
}

/// Declares a string variable on the process-wide set.
pub fn string(name: &str, usage: &str) -> Binding<String> {
    PROCESS.write().string(name, usage)
}

/// Declares a required (non-empty) string variable on the process-wide set.
pub fn string_required(name: &str, usage: &str) -> Binding<String> {
    PROCESS.write().string_required(name, usage)
}

/// Declares an integer variable on the process-wide set.
pub fn int(name: &str, usage: &str) -> Binding<i32> {
    PROCESS.write().int(name, usage)
}

/// Declares a 64-bit integer variable on the process-wide set.
pub fn int64(name: &str, usage: &str) -> Binding<i64> {
    PROCESS.write().int64(name, usage)
}

/// Declares a 32-bit float variable on the process-wide set.
pub fn float32(name: &str, usage: &str) -> Binding<f32> {
    PROCESS.write().float32(name, usage)
}

/// Declares a 64-bit float variable on the process-wide set.
pub fn float64(name: &str, usage: &str) -> Binding<f64> {
    PROCESS.write().float64(name, usage)
}

/// Declares a boolean variable on the process-wide set.
pub fn bool(name: &str, usage: &str) -> Binding<bool> {
    PROCESS.write().bool(name, usage)
}

/// Declares a duration variable on the process-wide set.
pub fn duration(name: &str, usage: &str) -> Binding<Duration> {
    PROCESS.write().duration(name, usage)
}

/// Declares a bind-address variable on the process-wide set.
pub fn bind_addr(name: &str, usage: &str) -> Binding<String> {
    PROCESS.write().bind_addr(name, usage)
}

/// Declares a dial-address variable on the process-wide set.
pub fn dial_addr(name: &str, usage: &str) -> Binding<String> {
    PROCESS.write().dial_addr(name, usage)
}

/// Declares a URL variable on the process-wide set.
pub fn url(name: &str, usage: &str) -> Binding<Option<Url>> {
    PROCESS.write().url(name, usage)
}

/// Declares a path variable on the process-wide set.
pub fn path(name: &str, usage: &str) -> Binding<String> {
    PROCESS.write().path(name, usage)
}

/// Parses the process-wide set from the process environment.
///
/// # Errors
///
/// Returns the full ordered aggregate when any variable is missing or
/// rejected.
pub fn parse() -> Result<(), Errors> {
    PROCESS.write().parse()
}

/// Parses the process-wide set through an injected lookup source.
///
/// # Errors
///
/// Returns the full ordered aggregate when any variable is missing or
/// rejected.
pub fn parse_from<L: Lookup + ?Sized>(lookup: &L) -> Result<(), Errors> {
    PROCESS.write().parse_from(lookup)
}

/// Visits the process-wide set's variables in declaration order.
pub fn visit(f: impl FnMut(&Var)) {
    PROCESS.read().visit(f);
}

/// Calls `f` with read access to the process-wide set.
///
/// For renderers that need more than a single [`visit`] pass.
pub fn with<R>(f: impl FnOnce(&VarSet) -> R) -> R {
    f(&PROCESS.read())
}

/// Replaces the process-wide set with a fresh one named `test`.
///
/// Variables declared after a reset use the `TEST_` prefix regardless of
/// the binary name, so tests get deterministic keys. Call this at the top
/// of every test that touches the process-wide set; without it,
/// declarations leak from one test into the next.
pub fn reset_for_testing() {
    *PROCESS.write() = VarSet::new("test");
}
