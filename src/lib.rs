
#[macro_use]
pub mod diag;
pub mod shared;
pub mod ast;
pub mod hier_block;
pub mod options;
pub mod global;

use derive_more::Display;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::global::Global;
use crate::hier_block::HierBlockPlan;
use crate::options::Options;
use crate::shared::error;

pub use crate::global::{CompilerFlags, WidthMinUsage};

#[derive(Debug, Display)]
pub enum ErrorKind {
    #[display(fmt = "failed to parse options")]
    Options,
    #[display(fmt = "failed to read input netlists")]
    ReadFiles,
    #[display(fmt = "failed to plan hierarchical blocks")]
    HierPlan,
    #[display(fmt = "checkpoint '{}' failed", _0)]
    Checkpoint(String),
}

pub type Error = error::Error<ErrorKind>;

const LOG_LEVELS: [&str; 4] = ["warn", "info", "debug", "trace"];

/// Install the log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u64) {
    let level = LOG_LEVELS[(verbosity as usize).min(LOG_LEVELS.len() - 1)];

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // Fails only if a subscriber is already installed, which is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parse the command line and run the coordinator over the given netlists.
///
/// `--help` and `--version` print to stdout and succeed.
pub fn run(args: Vec<String>) -> Result<(), Error> {
    let options = match Options::from_args(args) {
        Ok(options) => options,
        Err(err) => {
            if let options::ErrorKind::InfoRequested(text) = err.kind() {
                if !text.is_empty() {
                    println!("{}", text);
                }
                return Ok(());
            }
            return Err(Error::with_source(ErrorKind::Options, err));
        }
    };

    init_logging(options.verbosity);

    let mut global = Global::new(options);
    global.boot();

    global.read_files()
        .map_err(|err| Error::with_source(ErrorKind::ReadFiles, err))?;

    if global.options().hierarchical {
        let plan = HierBlockPlan::create(global.root())
            .map_err(|err| Error::with_source(ErrorKind::HierPlan, err))?;

        match plan {
            Some(plan) => global.set_hier_plan(plan),
            None => warn!("--hierarchical given but the design has no hierarchical blocks"),
        }
    }

    if global.options().build_jobs > 1 {
        global.set_use_parallel_build(true);
    }

    global.dump_check_global_tree("boot", 0, true)
        .map_err(|err| Error::with_source(ErrorKind::Checkpoint("boot".to_string()), err))?;

    if let Some(plan) = global.hier_plan() {
        for block in plan.blocks_sorted() {
            info!(block = %block.module_name, id = %global.ptr_to_id(block.id), children = block.children.len(), "hierarchical block");
        }
    }

    info!(
        modules = global.root().modules().len(),
        width_min_usage = %global.width_min_usage(),
        parallel_build = global.use_parallel_build(),
        "design loaded"
    );

    global.shutdown();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use matches::assert_matches;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("hdlc")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn runs_hierarchical_design_and_dumps() {
        let dir = tempfile::tempdir().unwrap();

        let design = dir.path().join("design.json");
        fs::write(&design, r#"{
            "modules": [
                { "name": "top", "is_top": true, "cells": [ { "name": "u_cpu", "module_name": "cpu" } ] },
                { "name": "cpu", "hier_block": true, "cells": [ { "name": "u_alu", "module_name": "alu" } ] },
                { "name": "alu", "hier_block": true }
            ]
        }"#).unwrap();

        let out = dir.path().join("obj");
        let out = out.to_str().unwrap();

        run(args(&["-M", out, "--dump-tree", "1", "--hierarchical", "-j", "2", design.to_str().unwrap()])).unwrap();

        assert!(dir.path().join("obj").join("Vtop_001_boot.tree").is_file());
    }

    #[test]
    fn broken_design_fails_checkpoint() {
        let dir = tempfile::tempdir().unwrap();

        let design = dir.path().join("design.json");
        fs::write(&design, r#"{ "modules": [ { "name": "top", "cells": [ { "name": "u_x", "module_name": "x" } ] } ] }"#).unwrap();

        let result = run(args(&["-M", dir.path().to_str().unwrap(), design.to_str().unwrap()]));

        assert_matches!(result.map_err(|err| err.kind), Err(ErrorKind::Checkpoint(_)));
    }

    #[test]
    fn recursive_hier_blocks_fail_planning() {
        let dir = tempfile::tempdir().unwrap();

        let design = dir.path().join("design.json");
        fs::write(&design, r#"{
            "modules": [
                { "name": "top", "is_top": true, "cells": [ { "name": "u_cpu", "module_name": "cpu" } ] },
                { "name": "cpu", "hier_block": true, "cells": [ { "name": "u_pipe", "module_name": "pipe" } ] },
                { "name": "pipe", "cells": [ { "name": "u_cpu", "module_name": "cpu" } ] }
            ]
        }"#).unwrap();

        let result = run(args(&["-M", dir.path().to_str().unwrap(), "--hierarchical", design.to_str().unwrap()]));

        assert_matches!(result.map_err(|err| err.kind), Err(ErrorKind::HierPlan));
    }

    #[test]
    fn help_succeeds() {
        assert!(run(args(&["--help"])).is_ok());
        assert!(run(args(&["--version"])).is_ok());
    }

    #[test]
    fn bad_options() {
        let result = run(args(&["--dump-tree", "lots"]));

        assert_matches!(result.map_err(|err| err.kind), Err(ErrorKind::Options));
    }
}
