//! Structural analysis based on a [`NeighborList`]: connectivity between
//! atoms, coordination numbers and connected components (molecules, chains,
//! ...) of the structure.
use ndarray::Array2;

use crate::neighbors::NeighborList;

/// Compute the connectivity matrix of the atoms in `neighbors`.
///
/// The entry `(i, j)` of the matrix contains the number of pairs between
/// atoms `i` and `j`, and the matrix is symmetric for both half and full
/// lists. Multiple periodic images of the same atom each count for one pair,
/// and pairs between an atom and its own images contribute to the diagonal.
pub fn connectivity_matrix(neighbors: &NeighborList) -> Array2<usize> {
    let n_atoms = neighbors.size();
    let mut matrix = Array2::zeros((n_atoms, n_atoms));

    for pair in neighbors {
        matrix[[pair.first, pair.second]] += 1;
        if !neighbors.is_full() && !pair.is_self_pair() {
            matrix[[pair.second, pair.first]] += 1;
        }
    }

    return matrix;
}

/// Get the number of neighbors of each atom. Pairs from self interactions are
/// not counted, but pairs with periodic images of the atom itself are.
pub fn coordination_numbers(neighbors: &NeighborList) -> Vec<usize> {
    let mut coordination = vec![0; neighbors.size()];
    for pair in neighbors {
        if pair.is_self_pair() {
            continue;
        }

        coordination[pair.first] += 1;
        if !neighbors.is_full() {
            coordination[pair.second] += 1;
        }
    }
    return coordination;
}

/// Find the connected components of the graph defined by `neighbors`,
/// ignoring periodic shifts.
///
/// This returns the number of components and the component of each atom.
/// Components are numbered in the order of their lowest atom index, so atom 0
/// is always in component 0.
pub fn connected_components(neighbors: &NeighborList) -> (usize, Vec<usize>) {
    let mut sets = DisjointSets::new(neighbors.size());
    for pair in neighbors {
        sets.union(pair.first, pair.second);
    }

    let mut component_of_root = vec![usize::MAX; neighbors.size()];
    let mut n_components = 0;
    let mut components = Vec::with_capacity(neighbors.size());
    for atom in 0..neighbors.size() {
        let root = sets.find(atom);
        if component_of_root[root] == usize::MAX {
            component_of_root[root] = n_components;
            n_components += 1;
        }
        components.push(component_of_root[root]);
    }

    return (n_components, components);
}

/// Union-find data structure with path halving and union by size
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new(count: usize) -> DisjointSets {
        DisjointSets {
            parent: (0..count).collect(),
            size: vec![1; count],
        }
    }

    fn find(&mut self, mut element: usize) -> usize {
        while self.parent[element] != element {
            self.parent[element] = self.parent[self.parent[element]];
            element = self.parent[element];
        }
        return element;
    }

    fn union(&mut self, first: usize, second: usize) {
        let mut first = self.find(first);
        let mut second = self.find(second);
        if first == second {
            return;
        }

        if self.size[first] < self.size[second] {
            std::mem::swap(&mut first, &mut second);
        }
        self.parent[second] = first;
        self.size[first] += self.size[second];
    }
}
