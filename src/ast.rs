
//! Netlist tree owned by the global coordinator.
//!
//! Only the node kinds the coordinator itself checks and dumps live here; the
//! passes that build and rewrite the tree are outside this crate.

use std::collections::{HashMap, HashSet};
use std::fmt;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::shared::error;

#[derive(Debug, Display)]
pub enum ErrorKind {
    #[display(fmt = "duplicate definition of module '{}'", _0)]
    DuplicateModule(String),
    #[display(fmt = "node {} appears more than once in the netlist", _0)]
    DuplicateNode(ObjectId),
    #[display(fmt = "cell '{}' instantiates undefined module '{}'", _0, _1)]
    UndefinedModule(String, String),
    #[display(fmt = "variable '{}.{}' has no resolved data type", _0, _1)]
    UnresolvedDType(String, String),
}

pub type Error = error::Error<ErrorKind>;

/// Stable surrogate identity of a tree object.
///
/// Nodes never hand out their addresses; debug output and the identity map use
/// these instead.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn new(raw: u64) -> ObjectId {
        ObjectId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarDirection {
    Input,
    Output,
    Wire,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DType {
    pub width: u32,
    #[serde(default)]
    pub signed: bool,
}

impl DType {
    pub fn logic(width: u32) -> DType {
        DType {
            width,
            signed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarNode {
    #[serde(default)]
    pub id: ObjectId,
    pub name: String,
    pub direction: VarDirection,
    /// `None` until width inference has run
    #[serde(default)]
    pub dtype: Option<DType>,
}

impl VarNode {
    pub fn new(id: ObjectId, name: &str, direction: VarDirection, dtype: Option<DType>) -> VarNode {
        VarNode {
            id,
            name: name.to_string(),
            direction,
            dtype,
        }
    }
}

/// Instance of another module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellNode {
    #[serde(default)]
    pub id: ObjectId,
    pub name: String,
    pub module_name: String,
}

impl CellNode {
    pub fn new(id: ObjectId, name: &str, module_name: &str) -> CellNode {
        CellNode {
            id,
            name: name.to_string(),
            module_name: module_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleNode {
    #[serde(default)]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub is_top: bool,
    /// Compiled as an independent hierarchical block
    #[serde(default)]
    pub hier_block: bool,
    #[serde(default)]
    pub vars: Vec<VarNode>,
    #[serde(default)]
    pub cells: Vec<CellNode>,
}

impl ModuleNode {
    pub fn new(id: ObjectId, name: &str) -> ModuleNode {
        ModuleNode {
            id,
            name: name.to_string(),
            is_top: false,
            hier_block: false,
            vars: Vec::new(),
            cells: Vec::new(),
        }
    }

    fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        std::iter::once(self.id)
            .chain(self.vars.iter().map(|var| var.id))
            .chain(self.cells.iter().map(|cell| cell.id))
    }
}

/// Root of the whole design.
#[derive(Debug, Serialize, Deserialize)]
pub struct Netlist {
    #[serde(default)]
    id: ObjectId,
    #[serde(default)]
    modules: Vec<ModuleNode>,
    #[serde(skip)]
    modules_map: HashMap<String, usize>,
    #[serde(skip)]
    next_id: u64,
}

impl Netlist {
    /// Only the global coordinator's `boot` should call this for the run's root.
    pub(crate) fn new() -> Netlist {
        Netlist {
            id: ObjectId(0),
            modules: Vec::new(),
            modules_map: HashMap::new(),
            next_id: 1,
        }
    }

    /// Parse a serialized netlist. Identities in the input are not trusted; they
    /// are replaced when the result is adopted into the root.
    pub fn from_json(text: &str) -> serde_json::Result<Netlist> {
        let mut netlist: Netlist = serde_json::from_str(text)?;

        netlist.modules_map = netlist.modules.iter()
            .enumerate()
            .map(|(index, module)| (module.name.clone(), index))
            .collect();
        netlist.next_id = 1;

        Ok(netlist)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_module(&mut self, module: ModuleNode) -> Result<(), Error> {
        if self.modules_map.contains_key(&module.name) {
            return Err(ErrorKind::DuplicateModule(module.name).into());
        }

        self.modules_map.insert(module.name.clone(), self.modules.len());
        self.modules.push(module);

        Ok(())
    }

    pub fn find_module(&self, name: &str) -> Option<&ModuleNode> {
        self.modules_map.get(name)
            .map(|&index| &self.modules[index])
    }

    pub fn find_module_mut(&mut self, name: &str) -> Option<&mut ModuleNode> {
        match self.modules_map.get(name) {
            Some(&index) => Some(&mut self.modules[index]),
            None => None,
        }
    }

    pub fn modules(&self) -> &[ModuleNode] {
        &self.modules
    }

    /// The module flagged as top, or the first one if none is.
    pub fn top_module(&self) -> Option<&ModuleNode> {
        self.modules.iter()
            .find(|module| module.is_top)
            .or_else(|| self.modules.first())
    }

    /// Move all modules of `other` into this netlist, giving every node a fresh
    /// identity. Nothing is moved if any module name clashes.
    pub fn adopt(&mut self, other: Netlist) -> Result<usize, Error> {
        if let Some(clash) = other.modules.iter().find(|module| self.modules_map.contains_key(&module.name)) {
            return Err(ErrorKind::DuplicateModule(clash.name.clone()).into());
        }

        let count = other.modules.len();

        for mut module in other.modules {
            module.id = self.next_id();
            for var in &mut module.vars {
                var.id = self.next_id();
            }
            for cell in &mut module.cells {
                cell.id = self.next_id();
            }

            self.add_module(module)?;
        }

        Ok(count)
    }

    /// Structural sanity check: identities are unique and every cell refers to
    /// a module of this netlist. With `dtypes_resolved`, every variable must
    /// also carry a data type.
    pub fn check(&self, dtypes_resolved: bool) -> Result<(), Error> {
        let mut seen = HashSet::new();
        seen.insert(self.id);

        for module in &self.modules {
            for id in module.ids() {
                if !seen.insert(id) {
                    return Err(ErrorKind::DuplicateNode(id).into());
                }
            }

            for cell in &module.cells {
                if !self.modules_map.contains_key(&cell.module_name) {
                    return Err(ErrorKind::UndefinedModule(cell.name.clone(), cell.module_name.clone()).into());
                }
            }

            if dtypes_resolved {
                if let Some(var) = module.vars.iter().find(|var| var.dtype.is_none()) {
                    return Err(ErrorKind::UnresolvedDType(module.name.clone(), var.name.clone()).into());
                }
            }
        }

        Ok(())
    }

    /// Number of nodes in the tree, the root included.
    pub fn node_count(&self) -> usize {
        1 + self.modules.iter()
            .map(|module| module.ids().count())
            .sum::<usize>()
    }
}
