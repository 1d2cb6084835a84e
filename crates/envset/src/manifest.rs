//! Lookup sources extracted from pod manifests.
//!
//! A deployment manifest already lists the environment a container will
//! run with. [`pod_env_lookup`] turns that list into a [`Lookup`] so the
//! same registry that drives production can be parsed against the manifest
//! locally, for example to check a deployment before rolling it out. The
//! live process environment stays layered on top: anything exported in the
//! shell shadows the manifest value.
//!
//! Construction failures (malformed YAML, ambiguous or unknown container)
//! are returned eagerly as [`ManifestError`]; they are never mixed into a
//! parse-time aggregate.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error as ThisError;

use crate::lookup::{Layered, MapLookup, OsEnv};

/// A failure constructing a manifest-derived lookup.
#[derive(Debug, ThisError, Diagnostic)]
#[non_exhaustive]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("could not read pod manifest {path:?}: {source}")]
    #[diagnostic(code(envset::manifest::read))]
    Read {
        /// The path that failed to open.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid YAML, or does not match the pod shape.
    #[error("could not parse pod manifest: {0}")]
    #[diagnostic(code(envset::manifest::parse))]
    Parse(#[from] serde_saphyr::Error),

    /// The manifest declares no containers.
    #[error("no containers in pod manifest")]
    #[diagnostic(code(envset::manifest::no_containers))]
    NoContainers,

    /// More than one container but no selector to pick one.
    #[error("container name empty but {count} containers in pod manifest, must set name")]
    #[diagnostic(
        code(envset::manifest::ambiguous_container),
        help("pass the name of the container whose env should be read")
    )]
    AmbiguousContainer {
        /// How many containers the manifest declares.
        count: usize,
    },

    /// The selector matched no container.
    #[error("no container named {name:?} in pod manifest")]
    #[diagnostic(code(envset::manifest::unknown_container))]
    UnknownContainer {
        /// The selector that matched nothing.
        name: String,
    },
}

#[derive(Debug, Deserialize)]
struct PodManifest {
    #[serde(default)]
    spec: PodSpec,
}

#[derive(Debug, Default, Deserialize)]
struct PodSpec {
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
struct Container {
    #[serde(default)]
    name: String,

    #[serde(default)]
    env: Vec<EnvEntry>,
}

#[derive(Debug, Deserialize)]
struct EnvEntry {
    name: String,

    #[serde(default)]
    value: String,
}

/// Builds a lookup from the env list of one container in a pod manifest.
///
/// `container` selects which container's env to extract; it may be empty
/// only when the manifest declares exactly one container. The returned
/// lookup layers the process environment over the extracted pairs, so
/// exported variables shadow manifest values.
///
/// # Errors
///
/// Fails when the YAML does not parse, the manifest has no containers, the
/// selector is empty while several containers exist, or the selector
/// matches no container.
pub fn pod_env_lookup(
    yaml: &str,
    container: &str,
) -> Result<Layered<OsEnv, MapLookup>, ManifestError> {
    let pod: PodManifest = serde_saphyr::from_str(yaml)?;
    let containers = pod.spec.containers;

    if containers.is_empty() {
        return Err(ManifestError::NoContainers);
    }

    let selected = if container.is_empty() {
        if containers.len() != 1 {
            return Err(ManifestError::AmbiguousContainer {
                count: containers.len(),
            });
        }
        &containers[0]
    } else {
        containers
            .iter()
            .find(|c| c.name == container)
            .ok_or_else(|| ManifestError::UnknownContainer {
                name: container.to_owned(),
            })?
    };

    let entries: HashMap<String, String> = selected
        .env
        .iter()
        .map(|e| (e.name.clone(), e.value.clone()))
        .collect();

    tracing::debug!(
        container = %selected.name,
        vars = entries.len(),
        "constructed pod manifest lookup"
    );
    Ok(Layered::new(OsEnv, MapLookup::new(entries)))
}

/// Reads a pod manifest from `path` and builds a lookup via
/// [`pod_env_lookup`].
///
/// # Errors
///
/// Fails when the file cannot be read, plus every failure of
/// [`pod_env_lookup`].
pub fn pod_env_lookup_file(
    path: impl AsRef<Path>,
    container: &str,
) -> Result<Layered<OsEnv, MapLookup>, ManifestError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_owned(),
        source,
    })?;
    pod_env_lookup(&yaml, container)
}
