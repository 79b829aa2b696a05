use crate::glam::IVec3;
use crate::ilattice::prelude::Extent;

use std::fmt;
use std::ops::Range;

/// An axis-aligned box of voxels, given by three closed-open integer intervals.
///
/// Every spatial query in a reconstruction is clipped to one of these. Construction is checked:
/// each interval must have positive length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    extent: Extent<IVec3>,
}

impl BoundingBox {
    /// Builds a box from `[[x0, x1], [y0, y1], [z0, z1]]` intervals, each `[lo, hi)`.
    pub fn checked_from_intervals(intervals: [[i32; 2]; 3]) -> Result<Self, InvalidBounds> {
        let [[x0, x1], [y0, y1], [z0, z1]] = intervals;
        Self::checked_from_min_and_lub(IVec3::new(x0, y0, z0), IVec3::new(x1, y1, z1))
    }

    /// Builds a box from its inclusive minimum and exclusive least upper bound.
    pub fn checked_from_min_and_lub(min: IVec3, lub: IVec3) -> Result<Self, InvalidBounds> {
        if lub.x <= min.x || lub.y <= min.y || lub.z <= min.z {
            return Err(InvalidBounds { min, lub });
        }
        Ok(Self {
            extent: Extent::from_min_and_lub(min, lub),
        })
    }

    pub fn extent(&self) -> &Extent<IVec3> {
        &self.extent
    }

    pub fn minimum(&self) -> IVec3 {
        self.extent.minimum
    }

    pub fn least_upper_bound(&self) -> IVec3 {
        self.extent.least_upper_bound()
    }

    pub fn shape(&self) -> IVec3 {
        self.extent.shape
    }

    /// Interval lengths are positive by construction, so these casts are lossless.
    pub fn x_extent(&self) -> u32 {
        self.extent.shape.x as u32
    }

    pub fn y_extent(&self) -> u32 {
        self.extent.shape.y as u32
    }

    pub fn z_extent(&self) -> u32 {
        self.extent.shape.z as u32
    }

    /// Cell count of one horizontal (fixed-y) plane.
    pub fn plane_area(&self) -> usize {
        self.x_extent() as usize * self.z_extent() as usize
    }

    pub fn contains(&self, p: IVec3) -> bool {
        self.extent.contains(p)
    }

    /// Offset of a global coordinate from the box minimum. Non-negative iff `p` is inside.
    pub fn relative(&self, p: IVec3) -> IVec3 {
        p - self.extent.minimum
    }

    pub fn x_range(&self) -> Range<i32> {
        self.extent.minimum.x..self.least_upper_bound().x
    }

    pub fn y_range(&self) -> Range<i32> {
        self.extent.minimum.y..self.least_upper_bound().y
    }

    pub fn z_range(&self) -> Range<i32> {
        self.extent.minimum.z..self.least_upper_bound().z
    }

    pub fn intervals(&self) -> [[i32; 2]; 3] {
        let min = self.minimum();
        let lub = self.least_upper_bound();
        [[min.x, lub.x], [min.y, lub.y], [min.z, lub.z]]
    }
}

/// A requested box had a non-positive extent on some axis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidBounds {
    pub min: IVec3,
    pub lub: IVec3,
}

impl fmt::Display for InvalidBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bounding box must have positive extent on every axis, got min = {}, upper bound = {}",
            self.min, self.lub
        )
    }
}

impl std::error::Error for InvalidBounds {}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
