//! Lattice geometry and neighbor resolution.
//!
//! A [`Geometry`] describes a hypercube of side length `S` in `D`
//! dimensions. Cell `i` has coordinate `(i / S^dim) % S` along axis `dim`,
//! with dimension 0 least significant. The stride of each dimension is
//! precomputed so that [`Geometry::neighbor`] is O(1).
//!
//! # Adjacency
//!
//! | Mode      | Neighbor of `i` along `dim`      | Row boundary behavior        |
//! |-----------|----------------------------------|------------------------------|
//! | `Flat`    | `i ± S^dim` if inside `[0, S^D)` | wraps into the adjacent row  |
//! | `Bounded` | `i ± S^dim` if the axis allows   | no neighbor past the edge    |
//!
//! `Flat` treats the lattice as one contiguous buffer. Stepping forward in
//! dimension 0 from the last cell of a row lands on the first cell of the
//! next row. Aggregate statistics of existing runs depend on it, so it
//! stays the default.

use serde::{Deserialize, Serialize};

use crate::error::LatticeError;

/// Upper bound on the number of dimensions.
///
/// Any side length of 2 or more overflows `usize` well before this; the
/// bound only matters for degenerate `S = 1` lattices.
pub const MAX_DIMENSIONS: u32 = 64;

/// Default cell budget for a single lattice (16M cells).
pub const DEFAULT_MAX_CELLS: usize = 1 << 24;

/// How neighbor indices are derived from a linear index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborMode {
    /// Linear offset `i ± S^dim`, bounded only by the buffer.
    #[default]
    Flat,
    /// Linear offset restricted to stay on the same axis line.
    Bounded,
}

/// Step direction along one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward lower indices (`-S^dim`).
    Backward,
    /// Toward higher indices (`+S^dim`).
    Forward,
}

impl Direction {
    /// Both directions, backward first.
    pub const ALL: [Self; 2] = [Self::Backward, Self::Forward];
}

/// Shape of a hypercube lattice and its adjacency rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// Side length `S` of every axis.
    side_length: usize,
    /// Linear stride `S^dim` for each dimension.
    strides: Vec<usize>,
    /// Total number of cells, `S^D`.
    total: usize,
    /// Adjacency rule.
    mode: NeighborMode,
}

impl Geometry {
    /// Build a geometry for `dimensions` axes of length `side_length`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidGeometry`] if the side length or the
    /// dimension count is zero or the dimension count exceeds
    /// [`MAX_DIMENSIONS`], [`LatticeError::SizeOverflow`] if `S^D` does not
    /// fit in `usize`, and [`LatticeError::CapacityExceeded`] if `S^D` is
    /// larger than `max_cells`.
    pub fn new(
        side_length: usize,
        dimensions: u32,
        max_cells: usize,
        mode: NeighborMode,
    ) -> Result<Self, LatticeError> {
        if side_length == 0 {
            return Err(LatticeError::InvalidGeometry {
                reason: "side length must be at least 1".to_owned(),
            });
        }
        if dimensions == 0 {
            return Err(LatticeError::InvalidGeometry {
                reason: "dimensions must be at least 1".to_owned(),
            });
        }
        if dimensions > MAX_DIMENSIONS {
            return Err(LatticeError::InvalidGeometry {
                reason: format!("dimensions must be at most {MAX_DIMENSIONS}, got {dimensions}"),
            });
        }

        let total = side_length
            .checked_pow(dimensions)
            .ok_or(LatticeError::SizeOverflow)?;
        if total > max_cells {
            return Err(LatticeError::CapacityExceeded {
                requested: total,
                max: max_cells,
            });
        }

        // Strides never exceed `total`, so saturation never triggers.
        let mut strides = Vec::with_capacity(dimensions.try_into().unwrap_or(0));
        let mut stride: usize = 1;
        for _ in 0..dimensions {
            strides.push(stride);
            stride = stride.saturating_mul(side_length);
        }

        Ok(Self {
            side_length,
            strides,
            total,
            mode,
        })
    }

    /// Side length `S`.
    pub const fn side_length(&self) -> usize {
        self.side_length
    }

    /// Number of dimensions `D`.
    pub fn dimensions(&self) -> usize {
        self.strides.len()
    }

    /// Total number of cells, `S^D`.
    pub const fn total_cells(&self) -> usize {
        self.total
    }

    /// The adjacency rule in effect.
    pub const fn mode(&self) -> NeighborMode {
        self.mode
    }

    /// Linear stride of dimension `dim`, or `None` if `dim >= D`.
    pub fn stride(&self, dim: usize) -> Option<usize> {
        self.strides.get(dim).copied()
    }

    /// Resolve the neighbor of `index` one step along `dim` in `direction`.
    ///
    /// Returns `None` if `index` or `dim` is out of range, or if the
    /// neighbor falls outside the lattice under the current
    /// [`NeighborMode`].
    pub fn neighbor(&self, index: usize, dim: usize, direction: Direction) -> Option<usize> {
        if index >= self.total {
            return None;
        }
        let stride = self.stride(dim)?;
        match self.mode {
            NeighborMode::Flat => match direction {
                Direction::Backward => index.checked_sub(stride),
                Direction::Forward => index.checked_add(stride).filter(|&n| n < self.total),
            },
            NeighborMode::Bounded => {
                let coord = self.axis_coordinate(index, stride)?;
                match direction {
                    Direction::Backward if coord == 0 => None,
                    Direction::Backward => index.checked_sub(stride),
                    Direction::Forward if coord.saturating_add(1) >= self.side_length => None,
                    Direction::Forward => index.checked_add(stride),
                }
            }
        }
    }

    /// All reachable neighbors of `index`, dimension by dimension, backward
    /// before forward.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.dimensions()).flat_map(move |dim| {
            Direction::ALL
                .into_iter()
                .filter_map(move |direction| self.neighbor(index, dim, direction))
        })
    }

    /// Position of `index` along the axis with the given stride.
    fn axis_coordinate(&self, index: usize, stride: usize) -> Option<usize> {
        index.checked_div(stride)?.checked_rem(self.side_length)
    }
}
