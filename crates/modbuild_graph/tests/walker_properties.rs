//! Property-based tests for the dependency walker
//!
//! Random acyclic import graphs are generated as lower-triangular adjacency matrices: module `Mi` may only
//! import `Mj` with `j < i`, and the root is always the highest-numbered module.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use modbuild_graph::{
    DependencyWalker, GraphError, ImportScanner, ModuleName, ModuleResolver, Resolution, SourceLayout,
};
use proptest::prelude::*;

// =============================================================================
// In-memory project
// =============================================================================

struct MemoryProject {
    layout: SourceLayout,
    files: HashMap<PathBuf, Vec<ModuleName>>,
}

impl MemoryProject {
    fn new(imports: &[Vec<usize>], std_imports: &[bool]) -> Self {
        let layout = SourceLayout::new("/mem/src", "/mem/test");
        let mut files = HashMap::new();
        for (i, deps) in imports.iter().enumerate() {
            let mut names: Vec<ModuleName> = deps.iter().map(|j| name(*j)).collect();
            if std_imports.get(i).copied().unwrap_or(false) {
                names.insert(0, ModuleName::from("std.core"));
            }
            let Resolution::File(path) = layout.resolve(&name(i)) else {
                panic!("source module resolved as external");
            };
            files.insert(path, names);
        }
        Self { layout, files }
    }

    fn imports_of(&self, module: &ModuleName) -> &[ModuleName] {
        match self.layout.resolve(module) {
            Resolution::File(path) => self.files.get(&path).map(Vec::as_slice).unwrap_or(&[]),
            Resolution::External => &[],
        }
    }

    /// Every non-std module reachable from `root`, including `root`.
    fn reachable(&self, root: &ModuleName) -> HashSet<ModuleName> {
        let mut seen = HashSet::new();
        let mut pending = vec![root.clone()];
        while let Some(module) = pending.pop() {
            if module.is_in_namespace("std") || !seen.insert(module.clone()) {
                continue;
            }
            pending.extend(self.imports_of(&module).iter().cloned());
        }
        seen
    }

    fn walk(&self, root: &ModuleName) -> Result<Vec<ModuleName>, GraphError> {
        let mut walker = DependencyWalker::new(&self.layout, self);
        let mut order = Vec::new();
        walker.walk(root, |record| {
            order.push(record.name);
            Ok::<(), GraphError>(())
        })?;
        Ok(order)
    }
}

impl ImportScanner for MemoryProject {
    fn scan(&self, path: &Path) -> io::Result<Vec<ModuleName>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not in project"))
    }
}

fn name(i: usize) -> ModuleName {
    ModuleName::new(format!("M{i}"))
}

// =============================================================================
// Strategies
// =============================================================================

/// `(imports, std_imports)`: per-module import lists over lower indices, and whether each module also imports std.
fn dag_strategy() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<bool>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::collection::vec(any::<bool>(), n), n),
            prop::collection::vec(any::<bool>(), n),
        )
            .prop_map(|(matrix, std_imports)| {
                let imports = matrix
                    .iter()
                    .enumerate()
                    .map(|(i, row)| (0..i).filter(|j| row[*j]).collect())
                    .collect();
                (imports, std_imports)
            })
    })
}

proptest! {
    /// Property: every reachable module is visited exactly once, and nothing else is
    #[test]
    fn walk_visits_each_reachable_module_once((imports, std_imports) in dag_strategy()) {
        let project = MemoryProject::new(&imports, &std_imports);
        let root = name(imports.len() - 1);

        let order = project.walk(&root).expect("acyclic graph walks cleanly");

        let unique: HashSet<ModuleName> = order.iter().cloned().collect();
        prop_assert_eq!(unique.len(), order.len(), "a module was visited twice: {:?}", order);
        prop_assert_eq!(unique, project.reachable(&root));
    }

    /// Property: every import is visited before the module that imports it, and the root comes last
    #[test]
    fn walk_order_is_topological((imports, std_imports) in dag_strategy()) {
        let project = MemoryProject::new(&imports, &std_imports);
        let root = name(imports.len() - 1);

        let order = project.walk(&root).expect("acyclic graph walks cleanly");

        let position: HashMap<&ModuleName, usize> = order.iter().enumerate().map(|(i, m)| (m, i)).collect();
        for module in &order {
            for import in project.imports_of(module) {
                if import.is_in_namespace("std") {
                    prop_assert!(!position.contains_key(import));
                    continue;
                }
                prop_assert!(position[import] < position[module], "{} visited after {}", import, module);
            }
        }
        prop_assert_eq!(order.last(), Some(&root));
    }

    /// Property: an import edge back to the root from anything it reaches is always reported as a cycle
    #[test]
    fn back_edge_to_root_is_a_cycle(
        (imports, std_imports) in dag_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let root_index = imports.len() - 1;
        let root = name(root_index);
        let acyclic = MemoryProject::new(&imports, &std_imports);
        let mut reachable: Vec<ModuleName> = acyclic.reachable(&root).into_iter().collect();
        reachable.sort();
        let from = pick.get(&reachable).clone();
        let from_index: usize = from.as_str()[1..].parse().expect("generated names are M<index>");

        let mut cyclic_imports = imports.clone();
        cyclic_imports[from_index].push(root_index);
        let project = MemoryProject::new(&cyclic_imports, &std_imports);

        match project.walk(&root) {
            Err(GraphError::Cycle { chain, .. }) => {
                prop_assert!(chain.len() >= 2);
                prop_assert_eq!(chain.first(), chain.last());
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    }
}
