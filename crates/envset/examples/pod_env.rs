//! Parse a registry against a pod manifest instead of the live environment.
//!
//! The manifest simulates the deployment environment; anything exported in
//! the local shell still shadows it.

use envset::{VarSet, manifest};

const POD: &str = "\
spec:
  containers:
    - name: api
      env:
        - name: DEMO_MODE
          value: replay
        - name: DEMO_UPSTREAM
          value: upstream.internal:9000
    - name: sidecar
      env: []
";

fn main() -> miette::Result<()> {
    let mut set = VarSet::new("demo");
    let mode = set.string("MODE", "run mode");
    let upstream = set.dial_addr("UPSTREAM", "upstream service address");

    let lookup = manifest::pod_env_lookup(POD, "api")?;
    set.parse_from(&lookup)?;

    println!("mode={} upstream={}", mode.get(), upstream.get());
    Ok(())
}
