//! Service wiring around the process-wide registry.
//!
//! Long-running services usually want the same small surface: a flag to
//! check the environment without starting, and flags to dump the declared
//! variables in a format another tool can consume. [`parse_with_exit_fn`]
//! provides that surface over the process-wide registry, and the `dump_*`
//! functions are the individual renderers for callers that wire their own
//! CLI.
//!
//! A typical `main`:
//!
//! ```rust,ignore
//! use clap::Parser;
//!
//! let listen = envset::process::bind_addr("LISTEN", "address to listen on");
//!
//! envset::svc::parse(&envset::svc::Flags::parse());
//! // every binding is populated past this point
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::lookup::{Lookup, OsEnv};
use crate::manifest;
use crate::process;

/// The environment-handling flag set.
///
/// Derive-based, so it can be parsed standalone with [`Flags::parse`] or
/// embedded into a larger clap command with `#[command(flatten)]`.
#[derive(Parser, Debug, Default)]
#[command(about = "environment variable handling", long_about = None)]
pub struct Flags {
    /// Check env variables, then exit.
    #[arg(long = "env-check")]
    pub env_check: bool,

    /// Dump env variables in shell-export format, then exit.
    #[arg(long = "env-dump")]
    pub env_dump: bool,

    /// Dump env variables in YAML format, then exit.
    #[arg(long = "env-dump-yaml")]
    pub env_dump_yaml: bool,

    /// Dump env variables in JSON format, then exit.
    #[arg(long = "env-dump-json")]
    pub env_dump_json: bool,

    /// Dump env variables as a CUE schema, then exit.
    #[arg(long = "env-dump-cue")]
    pub env_dump_cue: bool,

    /// Path to a pod manifest to read env values from.
    #[arg(long = "env-pod-spec", value_name = "PATH")]
    pub env_pod_spec: Option<PathBuf>,

    /// Container to extract env from (required if the pod has more than
    /// one container).
    #[arg(long = "env-pod-spec-container-name", value_name = "NAME")]
    pub env_pod_spec_container_name: Option<String>,
}

fn resolve<L: Lookup + ?Sized>(lookup: &L, name: &str) -> String {
    lookup.get(name).unwrap_or_default()
}

/// Writes each declared variable as `# usage` plus an `export` line.
///
/// Entries are separated by a blank line; values are resolved through
/// `lookup` and double-quoted.
///
/// # Errors
///
/// Propagates failures from the writer.
pub fn dump_exports<L: Lookup + ?Sized>(out: &mut dyn Write, lookup: &L) -> io::Result<()> {
    let mut result = Ok(());
    let mut first = true;
    process::visit(|v| {
        if result.is_err() {
            return;
        }
        if !first {
            result = writeln!(out);
        }
        first = false;
        if result.is_ok() {
            result = writeln!(
                out,
                "# {}\nexport {}={:?}",
                v.usage(),
                v.name(),
                resolve(lookup, v.name())
            );
        }
    });
    result
}

/// Writes the declared variables as one JSON object, in declaration order.
///
/// # Errors
///
/// Propagates failures from the writer.
pub fn dump_json<L: Lookup + ?Sized>(out: &mut dyn Write, lookup: &L) -> io::Result<()> {
    let mut result = writeln!(out, "{{");
    let mut first = true;
    process::visit(|v| {
        if result.is_err() {
            return;
        }
        if !first {
            result = writeln!(out, ",");
        }
        first = false;
        if result.is_ok() {
            let name = serde_json::Value::String(v.name().to_owned());
            let value = serde_json::Value::String(resolve(lookup, v.name()));
            result = write!(out, "    {name}: {value}");
        }
    });
    result?;
    writeln!(out, "\n}}")
}

/// Writes the declared variables as a YAML list of `name`/`value` pairs.
///
/// # Errors
///
/// Propagates failures from the writer.
pub fn dump_yaml<L: Lookup + ?Sized>(out: &mut dyn Write, lookup: &L) -> io::Result<()> {
    let mut result = Ok(());
    process::visit(|v| {
        if result.is_err() {
            return;
        }
        result = writeln!(
            out,
            "- name: {}\n  value: {:?}",
            v.name(),
            resolve(lookup, v.name())
        );
    });
    result
}

/// Writes the declared variables as a CUE schema under the program name.
///
/// # Errors
///
/// Propagates failures from the writer.
pub fn dump_cue(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "package {}\n", process::name())?;
    write!(out, "#Env: [string]: string")?;

    let mut result = Ok(());
    process::visit(|v| {
        if result.is_err() {
            return;
        }
        // Blank line between fields keeps `cue fmt` happy.
        result = write!(out, "\n\n#Env: {:?}: string", v.name());
    });
    result?;
    writeln!(out)
}

/// Equivalent to [`parse_with_exit_fn`] wired to [`std::process::exit`].
pub fn parse(flags: &Flags) {
    parse_with_exit_fn(flags, |code| std::process::exit(code));
}

/// Drives the process-wide registry according to `flags`.
///
/// When `--env-pod-spec` is given, values are resolved through the
/// manifest-derived lookup (process environment layered on top); otherwise
/// through the process environment alone. The selected dump, if any, is
/// written to stderr followed by `exit_fn(0)`. Otherwise the registry is
/// parsed: on failure every aggregate entry is written to stderr and
/// `exit_fn(1)` is called; on success `--env-check` calls `exit_fn(0)` and
/// plain invocations simply return with every binding populated.
pub fn parse_with_exit_fn(flags: &Flags, exit_fn: impl FnOnce(i32)) {
    let mut err_out = io::stderr();

    let lookup: Box<dyn Lookup> = match &flags.env_pod_spec {
        Some(path) => {
            let container = flags.env_pod_spec_container_name.as_deref().unwrap_or("");
            match manifest::pod_env_lookup_file(path, container) {
                Ok(lookup) => Box::new(lookup),
                Err(err) => {
                    let _ = writeln!(err_out, "could not read pod spec: {err}");
                    exit_fn(1);
                    return;
                }
            }
        }
        None => Box::new(OsEnv),
    };

    if flags.env_dump_json {
        let _ = dump_json(&mut err_out, lookup.as_ref());
        exit_fn(0);
        return;
    }

    if flags.env_dump_yaml {
        let _ = dump_yaml(&mut err_out, lookup.as_ref());
        exit_fn(0);
        return;
    }

    if flags.env_dump_cue {
        let _ = dump_cue(&mut err_out);
        exit_fn(0);
        return;
    }

    if flags.env_dump {
        let _ = dump_exports(&mut err_out, lookup.as_ref());
        exit_fn(0);
        return;
    }

    if let Err(errs) = process::parse_from(lookup.as_ref()) {
        for err in &errs {
            let _ = writeln!(err_out, "{err}");
        }
        exit_fn(1);
        return;
    }

    if flags.env_check {
        exit_fn(0);
    }
}
