//! Binary morphology and connected-component labelling on N-D masks.
//!
//! Dilation reads neighbours in convolution order and erosion in correlation
//! order, so both agree for symmetric structures and stay duals of each other
//! for asymmetric ones.

use std::collections::VecDeque;

use rayon::prelude::*;

use super::{Boundary, Labels, Mask, Structure, neighbour_index, sample, unravel};

/// Set every cell that has a set neighbour under `structure`.
pub fn binary_dilation(input: &Mask, structure: &Structure, boundary: Boundary) -> Mask {
    debug_assert_eq!(input.ndim(), structure.ndim());

    let offsets = structure.convolution_offsets();
    let shape = input.shape();

    let data: Vec<bool> = (0..input.len())
        .into_par_iter()
        .map(|flat| {
            let coords = unravel(shape, flat);
            offsets
                .iter()
                .any(|offset| sample(input, &coords, offset, boundary))
        })
        .collect();

    Mask::from_parts(shape.to_vec(), data)
}

/// Keep only cells whose every neighbour under `structure` is set.
pub fn binary_erosion(input: &Mask, structure: &Structure, boundary: Boundary) -> Mask {
    debug_assert_eq!(input.ndim(), structure.ndim());

    let offsets = structure.correlation_offsets();
    let shape = input.shape();

    let data: Vec<bool> = (0..input.len())
        .into_par_iter()
        .map(|flat| {
            let coords = unravel(shape, flat);
            offsets
                .iter()
                .all(|offset| sample(input, &coords, offset, boundary))
        })
        .collect();

    Mask::from_parts(shape.to_vec(), data)
}

/// Erosion followed by dilation.
pub fn binary_opening(input: &Mask, structure: &Structure, boundary: Boundary) -> Mask {
    let eroded = binary_erosion(input, structure, boundary);
    binary_dilation(&eroded, structure, boundary)
}

/// Dilation followed by erosion.
pub fn binary_closing(input: &Mask, structure: &Structure, boundary: Boundary) -> Mask {
    let dilated = binary_dilation(input, structure, boundary);
    binary_erosion(&dilated, structure, boundary)
}

/// Cells that read each cell through a set of offsets, in CSR layout.
///
/// `readers[starts[c]..starts[c + 1]]` lists every cell whose neighbourhood
/// resolves to `c`. Cells whose neighbourhood leaves the grid under a constant
/// boundary are collected in `edge_cells`.
struct Readers {
    starts: Vec<usize>,
    readers: Vec<usize>,
    edge_cells: Vec<usize>,
}

impl Readers {
    fn new(shape: &[usize], offsets: &[Vec<isize>], boundary: Boundary) -> Self {
        let len = shape.iter().product::<usize>();
        let k = offsets.len();

        // sources[x * k + i] is the cell that x reads through offset i.
        let sources: Vec<Option<usize>> = (0..len)
            .into_par_iter()
            .flat_map_iter(|flat| {
                let coords = unravel(shape, flat);
                offsets
                    .iter()
                    .map(|offset| neighbour_index(shape, &coords, offset, boundary))
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut starts = vec![0usize; len + 1];
        for &source in sources.iter().flatten() {
            starts[source + 1] += 1;
        }
        for i in 0..len {
            starts[i + 1] += starts[i];
        }

        let mut fill = starts.clone();
        let mut readers = vec![0usize; starts[len]];
        let mut edge_cells = Vec::new();
        for (slot, &source) in sources.iter().enumerate() {
            let reader = slot / k;
            match source {
                Some(source) => {
                    readers[fill[source]] = reader;
                    fill[source] += 1;
                }
                None if edge_cells.last() != Some(&reader) => edge_cells.push(reader),
                None => {}
            }
        }

        Self {
            starts,
            readers,
            edge_cells,
        }
    }

    #[inline]
    fn of(&self, cell: usize) -> &[usize] {
        &self.readers[self.starts[cell]..self.starts[cell + 1]]
    }
}

/// Grow `input` by repeated dilation until nothing changes.
///
/// Set cells stay set, so a structure without its centre still converges.
/// When `mask` is given, only cells set in it can change. The flood visits
/// each cell once, so the cost is linear in cells times structure size.
pub fn binary_propagation(
    input: &Mask,
    structure: &Structure,
    boundary: Boundary,
    mask: Option<&Mask>,
) -> Mask {
    debug_assert_eq!(input.ndim(), structure.ndim());

    let offsets = structure.convolution_offsets();
    if offsets.is_empty() {
        return input.clone();
    }
    let readers = Readers::new(input.shape(), &offsets, boundary);
    let allowed = |flat: usize| mask.is_none_or(|mask| mask.as_slice()[flat]);

    let mut out = input.clone();
    let cells = out.as_mut_slice();
    let mut queue: VecDeque<usize> = (0..cells.len()).filter(|&flat| cells[flat]).collect();

    // A filled boundary acts as a set neighbour of every edge cell.
    if boundary.constant() {
        for &flat in &readers.edge_cells {
            if !cells[flat] && allowed(flat) {
                cells[flat] = true;
                queue.push_back(flat);
            }
        }
    }

    while let Some(source) = queue.pop_front() {
        for &reader in readers.of(source) {
            if !cells[reader] && allowed(reader) {
                cells[reader] = true;
                queue.push_back(reader);
            }
        }
    }

    out
}

/// Fill background regions that cannot be reached from outside the grid.
///
/// Background is flooded inwards from a filled border through `structure`;
/// anything the flood does not reach becomes foreground.
pub fn binary_fill_holes(input: &Mask, structure: &Structure) -> Mask {
    let background = input.inverted();
    let outside = binary_propagation(
        &Mask::full(input.shape(), false),
        structure,
        Boundary::Filled,
        Some(&background),
    );
    outside.inverted()
}

/// Union-find over flat cell indices.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Label connected components of set cells.
///
/// Two set cells are connected when one is reachable from the other through an
/// offset of `structure`; `boundary` decides whether offsets cross the edges
/// (only `Wrap`, `Nearest` and `Reflect` map to real cells). Labels are
/// numbered from 1 in row-major order of first appearance; 0 is background.
/// Returns the label grid and the number of components.
pub fn label(mask: &Mask, structure: &Structure, boundary: Boundary) -> (Labels, u32) {
    debug_assert_eq!(mask.ndim(), structure.ndim());

    let offsets = structure.correlation_offsets();
    let shape = mask.shape();
    let cells = mask.as_slice();
    let mut sets = DisjointSet::new(mask.len());

    for flat in (0..mask.len()).filter(|&flat| cells[flat]) {
        let coords = unravel(shape, flat);
        for offset in &offsets {
            if let Some(other) = neighbour_index(shape, &coords, offset, boundary)
                && cells[other]
            {
                sets.union(flat, other);
            }
        }
    }

    let mut root_labels = vec![0u32; mask.len()];
    let mut count = 0;
    let mut labels = vec![0u32; mask.len()];
    for flat in (0..mask.len()).filter(|&flat| cells[flat]) {
        let root = sets.find(flat);
        if root_labels[root] == 0 {
            count += 1;
            root_labels[root] = count;
        }
        labels[flat] = root_labels[root];
    }

    (Labels::from_parts(shape.to_vec(), labels), count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_2d(rows: &[&str]) -> Mask {
        let shape = vec![rows.len(), rows[0].len()];
        let data = rows.iter().flat_map(|r| r.chars().map(|c| c == '#')).collect();
        Mask::from_vec(shape, data).unwrap()
    }

    #[test]
    fn test_dilation_cross() {
        let input = mask_2d(&["...", ".#.", "..."]);
        let out = binary_dilation(&input, &Structure::von_neumann(2), Boundary::Empty);
        // Centre is not part of the structure, so the seed itself is dropped.
        assert_eq!(out, mask_2d(&[".#.", "#.#", ".#."]));

        let out = binary_dilation(&input, &Structure::full(2), Boundary::Empty);
        assert_eq!(out, mask_2d(&["###", "###", "###"]));
    }

    #[test]
    fn test_erosion_border() {
        let input = mask_2d(&["###", "###", "###"]);
        let out = binary_erosion(&input, &Structure::full(2), Boundary::Empty);
        assert_eq!(out, mask_2d(&["...", ".#.", "..."]));

        let out = binary_erosion(&input, &Structure::full(2), Boundary::Filled);
        assert_eq!(out, input);
    }

    #[test]
    fn test_opening_removes_specks() {
        let input = mask_2d(&["#....", ".....", ".###.", ".###.", ".###."]);
        let out = binary_opening(&input, &Structure::full(2), Boundary::Empty);
        assert_eq!(out, mask_2d(&[".....", ".....", ".###.", ".###.", ".###."]));
    }

    #[test]
    fn test_closing_fills_gap() {
        let input = mask_2d(&[".....", ".###.", ".#.#.", ".###.", "....."]);
        let out = binary_closing(&input, &Structure::full(2), Boundary::Empty);
        assert_eq!(out, mask_2d(&[".....", ".###.", ".###.", ".###.", "....."]));
    }

    #[test]
    fn test_propagation_within_mask() {
        let seed = mask_2d(&["#....", ".....", "....."]);
        let allowed = mask_2d(&["###..", "..#..", "..###"]);
        let out = binary_propagation(
            &seed,
            &Structure::von_neumann(2),
            Boundary::Empty,
            Some(&allowed),
        );
        assert_eq!(out, allowed);
    }

    #[test]
    fn test_fill_holes() {
        let input = mask_2d(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let out = binary_fill_holes(&input, &Structure::von_neumann(2));
        assert_eq!(out, Mask::full(&[5, 5], true));

        // An open ring is not a hole.
        let open = mask_2d(&["##.##", "#...#", "#####"]);
        assert_eq!(binary_fill_holes(&open, &Structure::von_neumann(2)), open);
    }

    /// Single winding corridor: even rows are open, odd rows are walls with
    /// one gap, alternating between the right and left ends.
    fn serpentine(n: usize) -> Mask {
        Mask::from_fn(&[n, n], |c| {
            let (row, col) = (c[0], c[1]);
            if row % 2 == 0 {
                true
            } else if (row / 2) % 2 == 0 {
                col == n - 1
            } else {
                col == 0
            }
        })
    }

    #[test]
    fn test_propagation_long_corridor() {
        let n = 255;
        let corridor = serpentine(n);
        let mut seed = Mask::full(&[n, n], false);
        *seed.get_mut(&[0, 0]).unwrap() = true;

        let out = binary_propagation(
            &seed,
            &Structure::von_neumann(2),
            Boundary::Empty,
            Some(&corridor),
        );
        assert_eq!(out, corridor);
        assert_eq!(out.get(&[n - 1, 0]), Some(&true));
    }

    #[test]
    fn test_propagation_filled_boundary_seeds_edges() {
        let seed = Mask::full(&[3, 4], false);
        let out = binary_propagation(
            &seed,
            &Structure::von_neumann(2),
            Boundary::Filled,
            None,
        );
        assert_eq!(out, Mask::full(&[3, 4], true));

        let out = binary_propagation(&seed, &Structure::von_neumann(2), Boundary::Wrap, None);
        assert_eq!(out, seed);
    }

    #[test]
    fn test_propagation_matches_iterated_dilation() {
        let structure = Structure::new(
            Mask::from_vec(
                vec![3, 3],
                vec![false, true, false, true, false, false, false, false, true],
            )
            .unwrap(),
        );
        let input = mask_2d(&["#.....", "......", "...#..", "......"]);
        let allowed = mask_2d(&["###.##", ".#.###", "##.#.#", "#.####"]);

        for boundary in Boundary::ALL {
            let mut expected = input.clone();
            loop {
                let grown = binary_dilation(&expected, &structure, boundary);
                let next = Mask::from_fn(input.shape(), |c| {
                    expected.get(c) == Some(&true)
                        || (allowed.get(c) == Some(&true) && grown.get(c) == Some(&true))
                });
                if next == expected {
                    break;
                }
                expected = next;
            }

            let out = binary_propagation(&input, &structure, boundary, Some(&allowed));
            assert_eq!(out, expected, "boundary {}", boundary);
        }
    }

    #[test]
    fn test_fill_holes_long_corridor() {
        let n = 127;
        let inner = serpentine(n - 2);
        let walls = Mask::from_fn(&[n, n], |c| {
            let border = c.iter().any(|&i| i == 0 || i == n - 1);
            border || !inner.as_slice()[(c[0] - 1) * (n - 2) + (c[1] - 1)]
        });

        // Sealed corridor is a single hole.
        let filled = binary_fill_holes(&walls, &Structure::von_neumann(2));
        assert_eq!(filled, Mask::full(&[n, n], true));

        // One opening in the frame connects the whole corridor to the outside.
        let mut open = walls.clone();
        *open.get_mut(&[0, 1]).unwrap() = false;
        assert_eq!(binary_fill_holes(&open, &Structure::von_neumann(2)), open);
    }

    #[test]
    fn test_label_components() {
        let mask = mask_2d(&["##..#", "....#", "#...."]);
        let (labels, count) = label(&mask, &Structure::von_neumann(2), Boundary::Empty);
        assert_eq!(count, 3);
        assert_eq!(labels.as_slice()[0], 1);
        assert_eq!(labels.as_slice()[1], 1);
        assert_eq!(labels.as_slice()[4], 2);
        assert_eq!(labels.as_slice()[9], 2);
        assert_eq!(labels.as_slice()[10], 3);
        assert_eq!(labels.as_slice()[2], 0);
    }

    #[test]
    fn test_label_wrap_joins_edges() {
        let mask = mask_2d(&["#...#"]);
        let (_, count) = label(&mask, &Structure::von_neumann(2), Boundary::Empty);
        assert_eq!(count, 2);
        let (labels, count) = label(&mask, &Structure::von_neumann(2), Boundary::Wrap);
        assert_eq!(count, 1);
        assert_eq!(labels.as_slice()[0], labels.as_slice()[4]);
    }

    #[test]
    fn test_label_moore_connects_diagonals() {
        let mask = mask_2d(&["#..", ".#.", "..#"]);
        assert_eq!(label(&mask, &Structure::von_neumann(2), Boundary::Empty).1, 3);
        assert_eq!(label(&mask, &Structure::moore(2), Boundary::Empty).1, 1);
    }
}
