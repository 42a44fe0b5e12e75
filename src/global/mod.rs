
//! The top level state of a compilation run.
//!
//! One `Global` is created before any pass runs and handed to every pass. Setup
//! happens through `&mut Global`; once passes fan out in parallel they only get
//! `&Global`, which still allows naming debug files and looking up debug ids.

pub mod width_usage;
pub mod ptr_id;
pub mod debug_file;
pub mod flags;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use derive_more::Display;
use tracing::{debug, info};

use crate::ast::{self, Netlist, ObjectId};
use crate::hier_block::HierBlockPlan;
use crate::options::Options;
use crate::shared::error;

pub use self::debug_file::DebugFileNamer;
pub use self::flags::CompilerFlags;
pub use self::ptr_id::PtrIdMap;
pub use self::width_usage::WidthMinUsage;

#[derive(Debug, Display)]
pub enum ErrorKind {
    #[display(fmt = "{} requires resolved data types on every node", _0)]
    DTypesNotResolved(String),
    #[display(fmt = "netlist check failed")]
    BrokenTree,
    #[display(fmt = "failed to read netlist file {}", _0)]
    ReadNetlist(String),
    #[display(fmt = "failed to write debug file {}", _0)]
    WriteDump(String),
}

pub type Error = error::Error<ErrorKind>;

impl From<ast::Error> for Error {
    fn from(err: ast::Error) -> Self {
        Error::with_source(ErrorKind::BrokenTree, err)
    }
}

pub struct Global {
    /// Root of the entire netlist, created by `boot`
    root: Option<Netlist>,
    /// Hierarchical build plan, `None` unless the design uses hier blocks
    hier_plan: Option<HierBlockPlan>,
    width_min_usage: WidthMinUsage,
    flags: CompilerFlags,

    debug_files: DebugFileNamer,
    ptr_ids: PtrIdMap,

    opt: Options,
}

impl Global {
    /// The netlist is not built here but in `boot`, after all other run wide
    /// state is ready.
    pub fn new(opt: Options) -> Global {
        Global {
            root: None,
            hier_plan: None,
            width_min_usage: WidthMinUsage::LintWidth,
            flags: CompilerFlags::default(),
            debug_files: DebugFileNamer::new(),
            ptr_ids: PtrIdMap::new(),
            opt,
        }
    }

    fn make_netlist() -> Netlist {
        Netlist::new()
    }

    pub fn boot(&mut self) {
        uassert!(self.root.is_none(), "call once");

        self.root = Some(Self::make_netlist());

        debug!(prefix = %self.opt.prefix, "netlist created");
    }

    /// Release everything the coordinator owns.
    pub fn shutdown(mut self) {
        let nodes = self.root.as_ref().map_or(0, Netlist::node_count);
        let blocks = self.hier_plan.as_ref().map_or(0, HierBlockPlan::len);

        self.root = None;
        self.hier_plan = None;
        self.ptr_ids.clear();

        info!(nodes, blocks, debug_files = self.debug_files.current(), "shutdown");
    }

    pub fn is_booted(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> &Netlist {
        match &self.root {
            Some(root) => root,
            None => crate::diag::internal_error("netlist accessed before boot"),
        }
    }

    pub fn root_mut(&mut self) -> &mut Netlist {
        match &mut self.root {
            Some(root) => root,
            None => crate::diag::internal_error("netlist accessed before boot"),
        }
    }

    pub fn options(&self) -> &Options {
        &self.opt
    }

    pub fn flags(&self) -> CompilerFlags {
        self.flags
    }

    pub fn width_min_usage(&self) -> WidthMinUsage {
        self.width_min_usage
    }

    pub fn set_width_min_usage(&mut self, usage: WidthMinUsage) {
        if usage != self.width_min_usage {
            debug!(from = %self.width_min_usage, to = %usage, "width min usage");
        }

        self.width_min_usage = usage;
    }

    pub fn assert_dtypes_resolved(&self) -> bool {
        self.flags.assert_dtypes_resolved
    }

    pub fn set_assert_dtypes_resolved(&mut self, flag: bool) {
        self.flags.assert_dtypes_resolved = flag;
    }

    /// Fail unless every node is known to carry a data type.
    pub fn require_dtypes_resolved(&self, pass: &str) -> Result<(), Error> {
        if self.flags.assert_dtypes_resolved {
            Ok(())
        } else {
            Err(ErrorKind::DTypesNotResolved(pass.to_string()).into())
        }
    }

    pub fn const_remove_xs(&self) -> bool {
        self.flags.const_remove_xs
    }

    pub fn set_const_remove_xs(&mut self, flag: bool) {
        self.flags.const_remove_xs = flag;
    }

    pub fn need_heavy(&self) -> bool {
        self.flags.need_heavy
    }

    pub fn set_need_heavy(&mut self, flag: bool) {
        self.flags.need_heavy = flag;
    }

    pub fn need_trace_dumper(&self) -> bool {
        self.flags.need_trace_dumper
    }

    pub fn set_need_trace_dumper(&mut self, flag: bool) {
        self.flags.need_trace_dumper = flag;
    }

    pub fn dpi(&self) -> bool {
        self.flags.dpi
    }

    pub fn set_dpi(&mut self, flag: bool) {
        self.flags.dpi = flag;
    }

    pub fn use_parallel_build(&self) -> bool {
        self.flags.use_parallel_build
    }

    pub fn set_use_parallel_build(&mut self, flag: bool) {
        self.flags.use_parallel_build = flag;
    }

    pub fn hier_plan(&self) -> Option<&HierBlockPlan> {
        self.hier_plan.as_ref()
    }

    /// Hand the plan over to the coordinator. Can only happen once per run.
    pub fn set_hier_plan(&mut self, plan: HierBlockPlan) {
        uassert!(self.hier_plan.is_none(), "call once");

        debug!(blocks = plan.len(), "hierarchical plan installed");

        self.hier_plan = Some(plan);
    }

    /// Name of the next debug checkpoint file.
    pub fn debug_filename(&self, comment: &str) -> String {
        self.debug_filename_numbered(comment, 0)
    }

    /// Like `debug_filename`, but a non-zero `new_number` restarts the numbering
    /// there.
    pub fn debug_filename_numbered(&self, comment: &str, new_number: u32) -> String {
        self.debug_files.next(self.opt.hier_top_data_dir(), &self.opt.prefix, comment, new_number)
    }

    pub fn ptr_to_id(&self, id: ObjectId) -> String {
        self.ptr_ids.ptr_to_id(id)
    }

    /// Read the netlist files named in the options into the root.
    pub fn read_files(&mut self) -> Result<(), Error> {
        let files = self.opt.netlist_files.clone();

        for path in files {
            let name = path.display().to_string();

            let text = fs::read_to_string(&path)
                .map_err(|err| Error::with_source(ErrorKind::ReadNetlist(name.clone()), err))?;
            let netlist = Netlist::from_json(&text)
                .map_err(|err| Error::with_source(ErrorKind::ReadNetlist(name.clone()), err))?;

            let modules = self.root_mut().adopt(netlist)
                .map_err(|err| Error::with_source(ErrorKind::ReadNetlist(name.clone()), err))?;

            info!(file = %name, modules, "read netlist");
        }

        Ok(())
    }

    pub fn check_tree(&self) -> Result<(), Error> {
        self.root().check(self.flags.assert_dtypes_resolved)?;

        Ok(())
    }

    /// Check the tree and, if asked to and dumps are enabled, write it to the next
    /// checkpoint file. The checkpoint number advances either way.
    pub fn dump_check_global_tree(&self, stage: &str, new_number: u32, do_dump: bool) -> Result<Option<PathBuf>, Error> {
        let filename = self.debug_filename_numbered(&format!("{}.tree", stage), new_number);

        self.check_tree()?;

        if !do_dump || self.opt.dump_tree == 0 {
            return Ok(None);
        }

        let path = PathBuf::from(filename);
        self.write_tree(&path)
            .map_err(|err| Error::with_source(ErrorKind::WriteDump(path.display().to_string()), err))?;

        debug!(path = %path.display(), stage, "tree dumped");

        Ok(Some(path))
    }

    fn write_tree(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self.root())?;
        writer.flush()?;

        Ok(())
    }
}
