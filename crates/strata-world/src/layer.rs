use crate::palette::{PaletteId16, VOID_ID};

use either::Either;
use ndshape::{RuntimeShape, Shape};
use serde::Serialize;
use smallvec::SmallVec;
use strata_core::geometry::BoundingBox;

/// Linearization of one horizontal plane: z-major, x-minor, so `offset = z * x_extent + x`.
pub type PlaneShape = RuntimeShape<u32, 2>;

pub fn plane_shape(bounds: &BoundingBox) -> PlaneShape {
    PlaneShape::new([bounds.x_extent(), bounds.z_extent()])
}

/// One occupied cell of a sparse plane: `(z, x, code)`, box-relative.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SparseCell(pub u32, pub u32, pub PaletteId16);

/// A horizontal (fixed-y) slice of the bounding box.
///
/// The encoding is chosen once, while scanning, by comparing occupancy density against a
/// threshold; a layer never changes its own encoding afterwards. Mutations preserve whichever
/// encoding was chosen.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Non-void cells only. May accumulate explicit void entries through mutation; lookups
    /// treat those identically to absent cells.
    Sparse(SmallVec<[SparseCell; 8]>),
    /// Every cell of the plane, flat in z-major, x-minor order.
    Dense(Vec<PaletteId16>),
}

impl Layer {
    /// Encodes a fully-scanned plane. `codes` must hold exactly one code per cell, in the
    /// [`PlaneShape`] order.
    pub fn from_scan(
        codes: Vec<PaletteId16>,
        shape: &PlaneShape,
        sparse_density_threshold: f64,
    ) -> Self {
        let occupied = codes.iter().filter(|&&c| c != VOID_ID).count();
        let density = occupied as f64 / codes.len() as f64;
        if density <= sparse_density_threshold {
            Self::Sparse(
                codes
                    .iter()
                    .enumerate()
                    .filter(|(_, &c)| c != VOID_ID)
                    .map(|(i, &c)| {
                        let [x, z] = shape.delinearize(i as u32);
                        SparseCell(z, x, c)
                    })
                    .collect(),
            )
        } else {
            Self::Dense(codes)
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Self::Sparse(_))
    }

    pub fn get(&self, z: u32, x: u32, shape: &PlaneShape) -> PaletteId16 {
        match self {
            Self::Sparse(cells) => cells
                .iter()
                .find(|c| c.0 == z && c.1 == x)
                .map(|c| c.2)
                .unwrap_or(VOID_ID),
            Self::Dense(plane) => plane[shape.linearize([x, z]) as usize],
        }
    }

    /// Overwrites one cell. Sparse planes update a matching `(z, x)` entry in place and only
    /// append when none exists, so repeated writes to a cell keep a single entry.
    pub fn set(&mut self, z: u32, x: u32, code: PaletteId16, shape: &PlaneShape) {
        match self {
            Self::Sparse(cells) => {
                if let Some(cell) = cells.iter_mut().find(|c| c.0 == z && c.1 == x) {
                    cell.2 = code;
                } else {
                    cells.push(SparseCell(z, x, code));
                }
            }
            Self::Dense(plane) => plane[shape.linearize([x, z]) as usize] = code,
        }
    }

    /// Iterates the non-void cells of the plane in unspecified order.
    pub fn occupied_cells<'a>(
        &'a self,
        shape: &'a PlaneShape,
    ) -> impl Iterator<Item = SparseCell> + 'a {
        match self {
            Self::Sparse(cells) => Either::Left(cells.iter().copied().filter(|c| c.2 != VOID_ID)),
            Self::Dense(plane) => Either::Right(
                plane
                    .iter()
                    .enumerate()
                    .filter(|(_, &c)| c != VOID_ID)
                    .map(|(i, &c)| {
                        let [x, z] = shape.delinearize(i as u32);
                        SparseCell(z, x, c)
                    }),
            ),
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
