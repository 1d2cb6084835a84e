//! Declare a few variables, parse the environment, report every failure.
//!
//! ```sh
//! DEMO_LISTEN=:8080 DEMO_WORKERS=4 DEMO_DEBUG=true cargo run --example basic
//! ```

use envset::{OsEnv, VarSet};

fn main() {
    let mut set = VarSet::new("demo");

    let listen = set.bind_addr("LISTEN", "address to listen on");
    let workers = set.int("WORKERS", "worker pool size");
    let debug = set.bool("DEBUG", "enable debug logging");

    match set.parse_from(&OsEnv) {
        Ok(()) => println!(
            "listen={} workers={} debug={}",
            listen.get(),
            workers.get(),
            debug.get()
        ),
        Err(errs) => {
            // One report per restart cycle beats one error per restart cycle.
            eprintln!("{:?}", miette::Report::new(errs));
            std::process::exit(1);
        }
    }
}
