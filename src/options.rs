
use std::path::PathBuf;

use clap::{App, Arg};
use derive_more::Display;

use crate::shared::error;

#[derive(Debug, Display)]
pub enum ErrorKind {
    #[display(fmt = "invalid command line")]
    CommandLine,
    #[display(fmt = "invalid value '{}' for {}", _1, _0)]
    InvalidValue(&'static str, String),
    /// `--help` or `--version`; carries the text still to be printed, clap
    /// prints the version itself
    #[display(fmt = "{}", _0)]
    InfoRequested(String),
}

pub type Error = error::Error<ErrorKind>;

/// Run wide options. The coordinator reads the output location from here; the
/// rest is for the passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Output directory of this run
    pub make_dir: String,
    /// Prefix of generated and debug file names
    pub prefix: String,
    /// Output directory of the top level run when this run builds one
    /// hierarchical block
    pub hier_top_dir: Option<String>,
    /// Tree dump level, 0 disables checkpoint dumps
    pub dump_tree: u32,
    /// Serialized netlists to read after boot
    pub netlist_files: Vec<PathBuf>,
    pub hierarchical: bool,
    pub build_jobs: u32,
    pub verbosity: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            make_dir: "obj_dir".to_string(),
            prefix: "Vtop".to_string(),
            hier_top_dir: None,
            dump_tree: 0,
            netlist_files: Vec::new(),
            hierarchical: false,
            build_jobs: 1,
            verbosity: 0,
        }
    }
}

impl Options {
    /// Directory debug files go to. A hierarchical child writes into its top's
    /// directory so all checkpoints of the run end up together.
    pub fn hier_top_data_dir(&self) -> &str {
        self.hier_top_dir.as_deref().unwrap_or(&self.make_dir)
    }

    pub fn hier_child(&self) -> bool {
        self.hier_top_dir.is_some()
    }

    pub fn from_args(args: Vec<String>) -> Result<Options, Error> {
        let defaults = Options::default();

        let matches = App::new("hdlc")
            .version("0.1")
            .author("Max Klein <max@maxkl.de>")
            .arg(Arg::with_name("make_dir")
                .long("Mdir")
                .short("M")
                .value_name("DIR")
                .help("Write output and debug files to DIR"))
            .arg(Arg::with_name("prefix")
                .long("prefix")
                .value_name("NAME")
                .help("Prefix generated and debug file names with NAME"))
            .arg(Arg::with_name("hier_top_dir")
                .long("hier-top-dir")
                .value_name("DIR")
                .help("Build a hierarchical block whose top level run writes to DIR"))
            .arg(Arg::with_name("dump_tree")
                .long("dump-tree")
                .value_name("LEVEL")
                .help("Dump the netlist at each checkpoint when LEVEL > 0"))
            .arg(Arg::with_name("hierarchical")
                .long("hierarchical")
                .help("Split the design into separately built hierarchical blocks"))
            .arg(Arg::with_name("build_jobs")
                .short("j")
                .value_name("JOBS")
                .help("Build the generated model with JOBS parallel jobs"))
            .arg(Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"))
            .arg(Arg::with_name("netlist_files")
                .value_name("FILE")
                .help("Netlist files to read")
                .multiple(true))
            .get_matches_from_safe(args)
            .map_err(|err| match err.kind {
                clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => ErrorKind::InfoRequested(err.message).into(),
                _ => Error::with_source(ErrorKind::CommandLine, err),
            })?;

        let dump_tree = match matches.value_of("dump_tree") {
            Some(level) => parse_number("--dump-tree", level)?,
            None => defaults.dump_tree,
        };

        let build_jobs = match matches.value_of("build_jobs") {
            Some(jobs) => parse_number("-j", jobs)?,
            None => defaults.build_jobs,
        };

        let netlist_files = matches.values_of("netlist_files")
            .map(|files| files.map(PathBuf::from).collect())
            .unwrap_or_default();

        Ok(Options {
            make_dir: matches.value_of("make_dir").map(str::to_string).unwrap_or(defaults.make_dir),
            prefix: matches.value_of("prefix").map(str::to_string).unwrap_or(defaults.prefix),
            hier_top_dir: matches.value_of("hier_top_dir").map(str::to_string),
            dump_tree,
            netlist_files,
            hierarchical: matches.is_present("hierarchical"),
            build_jobs,
            verbosity: matches.occurrences_of("verbosity"),
        })
    }
}

fn parse_number(option: &'static str, value: &str) -> Result<u32, Error> {
    value.parse()
        .map_err(|err| Error::with_source(ErrorKind::InvalidValue(option, value.to_string()), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    use matches::assert_matches;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("hdlc")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn defaults_without_arguments() {
        let options = Options::from_args(args(&[])).unwrap();

        assert_eq!(Options::default(), options);
        assert_eq!("obj_dir", options.hier_top_data_dir());
        assert!(!options.hier_child());
    }

    #[test]
    fn all_options() {
        let options = Options::from_args(args(&[
            "-M", "out", "--prefix", "Vcpu", "--dump-tree", "3", "--hierarchical", "-j", "4", "-vv", "a.json", "b.json",
        ])).unwrap();

        assert_eq!("out", options.make_dir);
        assert_eq!("Vcpu", options.prefix);
        assert_eq!(3, options.dump_tree);
        assert!(options.hierarchical);
        assert_eq!(4, options.build_jobs);
        assert_eq!(2, options.verbosity);
        assert_eq!(vec![PathBuf::from("a.json"), PathBuf::from("b.json")], options.netlist_files);
    }

    #[test]
    fn hier_child_writes_to_top_dir() {
        let options = Options::from_args(args(&["-M", "out/alu", "--hier-top-dir", "out"])).unwrap();

        assert!(options.hier_child());
        assert_eq!("out", options.hier_top_data_dir());
    }

    #[test]
    fn bad_number() {
        let result = Options::from_args(args(&["-j", "many"]));

        assert_matches!(result.map_err(|err| err.kind), Err(ErrorKind::InvalidValue("-j", _)));
    }

    #[test]
    fn help_is_not_a_command_line_error() {
        let result = Options::from_args(args(&["--help"]));

        assert_matches!(result.map_err(|err| err.kind), Err(ErrorKind::InfoRequested(ref text)) if text.contains("--dump-tree"));
    }

    #[test]
    fn version_is_not_a_command_line_error() {
        let result = Options::from_args(args(&["--version"]));

        assert_matches!(result.map_err(|err| err.kind), Err(ErrorKind::InfoRequested(_)));
    }

    #[test]
    fn unknown_flag() {
        let result = Options::from_args(args(&["--frobnicate"]));

        assert_matches!(result.map_err(|err| err.kind), Err(ErrorKind::CommandLine));
    }
}
