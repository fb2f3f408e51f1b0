//! Boundary-aware neighbour sampling and counting.
//!
//! Counting is a direct convolution of a boolean mask with a structuring
//! element. The five boundary modes match constant-0, constant-1,
//! edge-replicate, periodic and symmetric padding of the input.

use rayon::prelude::*;

use super::{Boundary, Counts, Mask, Structure, unravel};

/// Flat index of `coords + offset` under `boundary`, or `None` when the cell
/// falls outside the grid and the boundary supplies a constant.
#[inline]
pub fn neighbour_index(
    shape: &[usize],
    coords: &[usize],
    offset: &[isize],
    boundary: Boundary,
) -> Option<usize> {
    let mut flat = 0;
    for ((&len, &c), &o) in shape.iter().zip(coords).zip(offset) {
        let i = boundary.resolve(c as isize + o, len)?;
        flat = flat * len + i;
    }
    Some(flat)
}

/// Value of `mask` at `coords + offset` under `boundary`.
#[inline]
pub fn sample(mask: &Mask, coords: &[usize], offset: &[isize], boundary: Boundary) -> bool {
    match neighbour_index(mask.shape(), coords, offset, boundary) {
        Some(flat) => mask.as_slice()[flat],
        None => boundary.constant(),
    }
}

/// Count set neighbours of every cell.
///
/// The structure must have the same rank as the mask; callers validate this.
pub fn count_neighbours(mask: &Mask, structure: &Structure, boundary: Boundary) -> Counts {
    debug_assert_eq!(mask.ndim(), structure.ndim());

    let offsets = structure.convolution_offsets();
    let shape = mask.shape();

    let counts: Vec<u32> = (0..mask.len())
        .into_par_iter()
        .map(|flat| {
            let coords = unravel(shape, flat);
            offsets
                .iter()
                .filter(|offset| sample(mask, &coords, offset, boundary))
                .count() as u32
        })
        .collect();

    Counts::from_parts(shape.to_vec(), counts)
}
