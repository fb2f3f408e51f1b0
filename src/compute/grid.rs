//! N-dimensional grid storage, boundary modes and structuring elements.
//!
//! Data is stored as a flat row-major buffer alongside its shape, so a cell at
//! `[i0, i1, ..., in]` lives at `i0 * stride0 + i1 * stride1 + ... + in`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Flat row-major N-dimensional array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NdGrid<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

/// Cell states of an automaton, one byte per cell.
pub type Grid = NdGrid<u8>;

/// Boolean occupancy mask.
pub type Mask = NdGrid<bool>;

/// Per-cell neighbour counts.
pub type Counts = NdGrid<u32>;

/// Connected-component labels (0 = background).
pub type Labels = NdGrid<u32>;

/// Grid construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Shape {shape:?} holds {expected} cells but {actual} values were given")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("Shape {0:?} must have at least one axis and no zero-length axes")]
    InvalidShape(Vec<usize>),
}

/// Check that a shape has at least one axis and every axis is non-empty.
pub fn validate_shape(shape: &[usize]) -> Result<(), GridError> {
    if shape.is_empty() || shape.contains(&0) {
        return Err(GridError::InvalidShape(shape.to_vec()));
    }
    Ok(())
}

/// Convert a flat index to per-axis coordinates.
#[inline]
pub fn unravel(shape: &[usize], mut flat: usize) -> Vec<usize> {
    let mut coords = vec![0; shape.len()];
    for (coord, &len) in coords.iter_mut().zip(shape).rev() {
        *coord = flat % len;
        flat /= len;
    }
    coords
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NdGrid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<U> {
            shape: Vec<usize>,
            data: Vec<U>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        Self::from_vec(raw.shape, raw.data).map_err(serde::de::Error::custom)
    }
}

impl<T> NdGrid<T> {
    /// Build from parts whose sizes are already known to agree.
    pub(crate) fn from_parts(shape: Vec<usize>, data: Vec<T>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { shape, data }
    }

    /// Create a grid from a shape and a row-major buffer.
    pub fn from_vec(shape: Vec<usize>, data: Vec<T>) -> Result<Self, GridError> {
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(GridError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Create a grid by evaluating `f` at every coordinate.
    pub fn from_fn(shape: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let len = shape.iter().product::<usize>();
        let data = (0..len).map(|flat| f(&unravel(shape, flat))).collect();
        Self::from_parts(shape.to_vec(), data)
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Row-major flat index of `index`, or `None` if it is out of range.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &len) in index.iter().zip(&self.shape) {
            if i >= len {
                return None;
            }
            flat = flat * len + i;
        }
        Some(flat)
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.flat_index(index).map(|flat| &self.data[flat])
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        self.flat_index(index).map(move |flat| &mut self.data[flat])
    }

    /// Apply `f` to every cell, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> NdGrid<U> {
        NdGrid::from_parts(self.shape.clone(), self.data.iter().map(f).collect())
    }
}

impl<T: Clone> NdGrid<T> {
    /// Grid of the given shape with every cell set to `value`.
    pub fn full(shape: &[usize], value: T) -> Self {
        let len = shape.iter().product::<usize>();
        Self::from_parts(shape.to_vec(), vec![value; len])
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl Grid {
    /// Zero-filled grid of the given shape.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0)
    }

    /// Mask of cells holding `state`.
    pub fn mask_of(&self, state: u8) -> Mask {
        self.map(|&cell| cell == state)
    }

    /// Histogram of state values.
    pub fn count_states(&self) -> [u64; 256] {
        let mut counts = [0u64; 256];
        for &cell in &self.data {
            counts[cell as usize] += 1;
        }
        counts
    }
}

impl Mask {
    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&set| set).count()
    }

    /// Element-wise logical not.
    pub fn inverted(&self) -> Mask {
        self.map(|&set| !set)
    }
}

/// Policy for cells outside the grid extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Out-of-bounds cells are background (constant 0).
    #[default]
    Empty,
    /// Out-of-bounds cells are foreground (constant 1).
    Filled,
    /// Edge value repeated.
    Nearest,
    /// Periodic (toroidal).
    Wrap,
    /// Mirrored about the edge, edge cell included (`d c b a | a b c d`).
    Reflect,
}

impl Boundary {
    pub const ALL: [Boundary; 5] = [
        Boundary::Empty,
        Boundary::Filled,
        Boundary::Nearest,
        Boundary::Wrap,
        Boundary::Reflect,
    ];

    /// Map a coordinate onto an axis of length `len`.
    ///
    /// Returns `None` when the coordinate is out of range and the boundary
    /// supplies a constant instead (see [`Boundary::constant`]).
    #[inline]
    pub fn resolve(self, coord: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&coord) {
            return Some(coord as usize);
        }
        match self {
            Boundary::Empty | Boundary::Filled => None,
            Boundary::Nearest => Some(coord.clamp(0, n - 1) as usize),
            Boundary::Wrap => Some(coord.rem_euclid(n) as usize),
            Boundary::Reflect => {
                let period = 2 * n;
                let m = coord.rem_euclid(period);
                Some((if m < n { m } else { period - 1 - m }) as usize)
            }
        }
    }

    /// Value used for unresolved out-of-bounds cells.
    #[inline]
    pub fn constant(self) -> bool {
        matches!(self, Boundary::Filled)
    }

    pub fn name(self) -> &'static str {
        match self {
            Boundary::Empty => "empty",
            Boundary::Filled => "filled",
            Boundary::Nearest => "nearest",
            Boundary::Wrap => "wrap",
            Boundary::Reflect => "reflect",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown boundary mode '{0}' (expected empty, filled, nearest, wrap or reflect)")]
pub struct ParseBoundaryError(pub String);

impl FromStr for Boundary {
    type Err = ParseBoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Boundary::ALL
            .into_iter()
            .find(|boundary| boundary.name() == s)
            .ok_or_else(|| ParseBoundaryError(s.to_string()))
    }
}

/// Structuring element: which offsets around a cell count as its neighbours.
///
/// The rank of the structure is the rank of grids it can be applied to. The
/// origin is the element at `shape / 2` along every axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Structure(Mask);

impl Structure {
    pub fn new(mask: Mask) -> Self {
        Self(mask)
    }

    /// 3^n block with every element set.
    pub fn full(ndim: usize) -> Self {
        Self(Mask::full(&vec![3; ndim], true))
    }

    /// 3^n block without the centre (8 neighbours in 2-D).
    pub fn moore(ndim: usize) -> Self {
        Self(Mask::from_fn(&vec![3; ndim], |coords| {
            coords.iter().any(|&c| c != 1)
        }))
    }

    /// Orthogonal neighbours only, centre excluded (4 neighbours in 2-D).
    pub fn von_neumann(ndim: usize) -> Self {
        Self(Mask::from_fn(&vec![3; ndim], |coords| {
            coords.iter().filter(|&&c| c != 1).count() == 1
        }))
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }

    pub fn as_mask(&self) -> &Mask {
        &self.0
    }

    fn offsets(&self, sign: isize) -> Vec<Vec<isize>> {
        let shape = self.0.shape();
        self.0
            .as_slice()
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(|(flat, _)| {
                unravel(shape, flat)
                    .into_iter()
                    .zip(shape)
                    .map(|(j, &len)| sign * (j as isize - (len / 2) as isize))
                    .collect()
            })
            .collect()
    }

    /// Offsets `origin - j` for every set element `j` (convolution order).
    pub fn convolution_offsets(&self) -> Vec<Vec<isize>> {
        self.offsets(-1)
    }

    /// Offsets `j - origin` for every set element `j` (correlation order).
    pub fn correlation_offsets(&self) -> Vec<Vec<isize>> {
        self.offsets(1)
    }
}

impl From<Mask> for Structure {
    fn from(mask: Mask) -> Self {
        Self(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_checks_length() {
        let grid: Grid = serde_json::from_str(r#"{"shape": [2, 2], "data": [1, 0, 0, 1]}"#).unwrap();
        assert_eq!(grid.get(&[1, 1]), Some(&1));

        let bad = serde_json::from_str::<Grid>(r#"{"shape": [2, 2], "data": [1, 0, 0]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_flat_index_row_major() {
        let grid = Grid::from_vec(vec![2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(&[1, 0]), Some(&3));
        assert_eq!(grid.get(&[0, 2]), Some(&2));
        assert_eq!(grid.get(&[2, 0]), None);
        assert_eq!(unravel(&[2, 3], 4), vec![1, 1]);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = Grid::from_vec(vec![2, 2], vec![0; 3]).unwrap_err();
        assert_eq!(
            err,
            GridError::ShapeMismatch {
                shape: vec![2, 2],
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_validate_shape() {
        assert!(validate_shape(&[4, 4]).is_ok());
        assert!(validate_shape(&[]).is_err());
        assert!(validate_shape(&[4, 0]).is_err());
    }

    #[test]
    fn test_boundary_resolve() {
        // axis: a b c
        assert_eq!(Boundary::Empty.resolve(-1, 3), None);
        assert_eq!(Boundary::Filled.resolve(3, 3), None);
        assert_eq!(Boundary::Nearest.resolve(-2, 3), Some(0));
        assert_eq!(Boundary::Nearest.resolve(5, 3), Some(2));
        assert_eq!(Boundary::Wrap.resolve(-1, 3), Some(2));
        assert_eq!(Boundary::Wrap.resolve(4, 3), Some(1));
        assert_eq!(Boundary::Reflect.resolve(-1, 3), Some(0));
        assert_eq!(Boundary::Reflect.resolve(-4, 3), Some(2));
        assert_eq!(Boundary::Reflect.resolve(3, 3), Some(2));
        assert_eq!(Boundary::Reflect.resolve(4, 3), Some(1));
    }

    #[test]
    fn test_boundary_parse() {
        for boundary in Boundary::ALL {
            assert_eq!(boundary.name().parse::<Boundary>(), Ok(boundary));
        }
        assert!("mirror".parse::<Boundary>().is_err());
    }

    #[test]
    fn test_structures() {
        assert_eq!(Structure::moore(2).as_mask().count(), 8);
        assert_eq!(Structure::von_neumann(2).as_mask().count(), 4);
        assert_eq!(Structure::von_neumann(3).as_mask().count(), 6);
        assert_eq!(Structure::full(1).as_mask().count(), 3);
        assert!(!Structure::moore(2).as_mask().get(&[1, 1]).unwrap());
    }

    #[test]
    fn test_offsets_are_mirrored() {
        let structure = Structure::new(Mask::from_vec(vec![3], vec![true, false, false]).unwrap());
        assert_eq!(structure.correlation_offsets(), vec![vec![-1]]);
        assert_eq!(structure.convolution_offsets(), vec![vec![1]]);
    }

    #[test]
    fn test_count_states() {
        let grid = Grid::from_vec(vec![4], vec![0, 2, 2, 255]).unwrap();
        let counts = grid.count_states();
        assert_eq!(counts[0], 1);
        assert_eq!(counts[2], 2);
        assert_eq!(counts[255], 1);
        assert_eq!(counts.iter().sum::<u64>(), 4);
    }
}
