
//! Plan for compiling a design as separately built hierarchical blocks.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use derive_more::Display;

use crate::ast::{ModuleNode, Netlist, ObjectId};
use crate::shared::error;

#[derive(Debug, Display)]
pub enum ErrorKind {
    #[display(fmt = "hierarchical block '{}' instantiates itself", _0)]
    RecursiveBlocks(String),
}

pub type Error = error::Error<ErrorKind>;

#[derive(Debug, Clone, PartialEq)]
pub struct HierBlock {
    pub id: ObjectId,
    pub module_name: String,
    /// Hier blocks that instantiate this one, directly or through plain modules
    pub parents: BTreeSet<String>,
    pub children: BTreeSet<String>,
}

impl HierBlock {
    pub fn new(id: ObjectId, module_name: &str) -> HierBlock {
        HierBlock {
            id,
            module_name: module_name.to_string(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct HierBlockPlan {
    blocks: BTreeMap<String, HierBlock>,
}

impl HierBlockPlan {
    pub fn new() -> HierBlockPlan {
        HierBlockPlan {
            blocks: BTreeMap::new(),
        }
    }

    /// Build the plan from the modules marked as hierarchical blocks.
    ///
    /// Returns `None` if the design has none. A block that ends up among its own
    /// descendants is an error in the design.
    pub fn create(netlist: &Netlist) -> Result<Option<HierBlockPlan>, Error> {
        let mut plan = HierBlockPlan::new();

        for module in netlist.modules().iter().filter(|module| module.hier_block) {
            let mut children = BTreeSet::new();
            let mut visited = HashSet::new();
            Self::collect_children(netlist, module, &mut visited, &mut children);

            let mut block = HierBlock::new(module.id, &module.name);
            block.children = children;
            plan.blocks.insert(module.name.clone(), block);
        }

        if plan.blocks.is_empty() {
            return Ok(None);
        }

        let edges = plan.blocks.values()
            .flat_map(|block| block.children.iter().map(move |child| (block.module_name.clone(), child.clone())))
            .collect::<Vec<_>>();

        for (parent, child) in edges {
            if let Some(block) = plan.blocks.get_mut(&child) {
                block.parents.insert(parent);
            }
        }

        if let Err(recursive) = plan.sort() {
            return Err(ErrorKind::RecursiveBlocks(recursive.to_string()).into());
        }

        Ok(Some(plan))
    }

    /// Hier blocks reachable from `module` through cells, not looking inside them.
    fn collect_children<'a>(netlist: &'a Netlist, module: &'a ModuleNode, visited: &mut HashSet<&'a str>, children: &mut BTreeSet<String>) {
        for cell in &module.cells {
            let sub = match netlist.find_module(&cell.module_name) {
                Some(sub) => sub,
                None => continue,
            };

            if sub.hier_block {
                children.insert(sub.name.clone());
            } else if visited.insert(sub.name.as_str()) {
                Self::collect_children(netlist, sub, visited, children);
            }
        }
    }

    /// Add a block built elsewhere. Replaces a block of the same module.
    pub fn add(&mut self, block: HierBlock) {
        self.blocks.insert(block.module_name.clone(), block);
    }

    pub fn find(&self, module_name: &str) -> Option<&HierBlock> {
        self.blocks.get(module_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HierBlock> {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks ordered so that every block comes after all of its children.
    ///
    /// Plans from `create` are acyclic; a cycle here means a block was added
    /// wrongly afterwards.
    pub fn blocks_sorted(&self) -> Vec<&HierBlock> {
        match self.sort() {
            Ok(sorted) => sorted,
            Err(_) => crate::diag::internal_error("hierarchical blocks instantiate each other recursively"),
        }
    }

    /// Bottom-up order, or the first block (by name) left on a cycle.
    fn sort(&self) -> Result<Vec<&HierBlock>, &str> {
        let mut sorted: Vec<&HierBlock> = Vec::with_capacity(self.blocks.len());
        let mut done = HashSet::new();

        while sorted.len() < self.blocks.len() {
            let ready = self.blocks.values()
                .filter(|block| !done.contains(block.module_name.as_str()))
                .filter(|block| block.children.iter()
                    .all(|child| done.contains(child.as_str()) || !self.blocks.contains_key(child)))
                .collect::<Vec<_>>();

            if ready.is_empty() {
                let stuck = self.blocks.values()
                    .find(|block| !done.contains(block.module_name.as_str()))
                    .map_or("", |block| block.module_name.as_str());
                return Err(stuck);
            }

            for block in ready {
                done.insert(block.module_name.as_str());
                sorted.push(block);
            }
        }

        Ok(sorted)
    }
}
