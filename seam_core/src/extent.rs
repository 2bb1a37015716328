//! Index-space extent boxes for partitioned structured grids.
//!
//! An [`Extent`] is the closed integer box `[imin, imax] x [jmin, jmax] x
//! [kmin, kmax]` bounding one partition of a structured dataset. Adjacent
//! partitions share their boundary nodes: `[0,5]` and `[5,10]` both own the
//! node plane at `i = 5`.

use core::fmt;

use crate::error::CoreError;

/// A closed index-space box along three axes.
///
/// Degenerate axes (`min == max`) are valid and describe lower-dimensional
/// data: a 2D partition in the ij-plane has `kmin == kmax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Lowest i index (inclusive).
    pub imin: i32,
    /// Highest i index (inclusive).
    pub imax: i32,
    /// Lowest j index (inclusive).
    pub jmin: i32,
    /// Highest j index (inclusive).
    pub jmax: i32,
    /// Lowest k index (inclusive).
    pub kmin: i32,
    /// Highest k index (inclusive).
    pub kmax: i32,
}

impl Extent {
    /// Create a new extent from its six bounds.
    #[inline]
    pub const fn new(imin: i32, imax: i32, jmin: i32, jmax: i32, kmin: i32, kmax: i32) -> Self {
        Self {
            imin,
            imax,
            jmin,
            jmax,
            kmin,
            kmax,
        }
    }

    /// Create an extent from a `[imin, imax, jmin, jmax, kmin, kmax]` array.
    #[inline]
    pub const fn from_array(e: [i32; 6]) -> Self {
        Self::new(e[0], e[1], e[2], e[3], e[4], e[5])
    }

    /// The six bounds as a `[imin, imax, jmin, jmax, kmin, kmax]` array.
    #[inline]
    pub const fn as_array(&self) -> [i32; 6] {
        [
            self.imin, self.imax, self.jmin, self.jmax, self.kmin, self.kmax,
        ]
    }

    /// True iff `min <= max` along every axis.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.imin <= self.imax && self.jmin <= self.jmax && self.kmin <= self.kmax
    }

    /// Validate the extent, returning `InvalidExtent` when a bound pair is
    /// inverted.
    #[inline]
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoreError::InvalidExtent {
                extent: self.as_array(),
            })
        }
    }

    /// Number of nodes along each axis.
    #[inline]
    pub fn node_dims(&self) -> [usize; 3] {
        debug_assert!(self.is_valid(), "extent bounds are inverted");
        [
            (self.imax - self.imin) as usize + 1,
            (self.jmax - self.jmin) as usize + 1,
            (self.kmax - self.kmin) as usize + 1,
        ]
    }

    /// Total node count.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        let [ni, nj, nk] = self.node_dims();
        ni * nj * nk
    }

    /// Number of cells along each axis.
    ///
    /// A flat axis (one node wide) still contributes one cell layer, so a 2D
    /// extent `[0,5, 0,5, 0,0]` has `5 x 5 x 1` cells.
    #[inline]
    pub fn cell_dims(&self) -> [usize; 3] {
        let [ni, nj, nk] = self.node_dims();
        [ni.max(2) - 1, nj.max(2) - 1, nk.max(2) - 1]
    }

    /// Total cell count.
    #[inline]
    pub fn num_cells(&self) -> usize {
        let [ci, cj, ck] = self.cell_dims();
        ci * cj * ck
    }

    /// The extent of this box's cell grid, where each cell is identified by
    /// its lowest corner node.
    ///
    /// A flat axis stays flat: the cell space of `[0,5, 0,5, 0,0]` is
    /// `[0,4, 0,4, 0,0]`. `cell_space().num_nodes() == num_cells()` always
    /// holds, which lets node-indexing helpers address cells too.
    #[inline]
    pub fn cell_space(&self) -> Extent {
        Extent::new(
            self.imin,
            if self.imax > self.imin { self.imax - 1 } else { self.imax },
            self.jmin,
            if self.jmax > self.jmin { self.jmax - 1 } else { self.jmax },
            self.kmin,
            if self.kmax > self.kmin { self.kmax - 1 } else { self.kmax },
        )
    }

    /// True iff the node `(i, j, k)` lies inside this extent.
    #[inline]
    pub const fn contains_node(&self, i: i32, j: i32, k: i32) -> bool {
        i >= self.imin
            && i <= self.imax
            && j >= self.jmin
            && j <= self.jmax
            && k >= self.kmin
            && k <= self.kmax
    }

    /// True iff `other` lies entirely inside this extent.
    #[inline]
    pub const fn contains_extent(&self, other: &Extent) -> bool {
        self.contains_node(other.imin, other.jmin, other.kmin)
            && self.contains_node(other.imax, other.jmax, other.kmax)
    }

    /// The closed intersection of two extents, or `None` when they do not
    /// touch.
    ///
    /// Partitions that share only a boundary plane, line, or single node
    /// produce a valid degenerate intersection; that degeneracy is what
    /// adjacency classification reads off.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        let r = Extent::new(
            max(self.imin, other.imin),
            min(self.imax, other.imax),
            max(self.jmin, other.jmin),
            min(self.jmax, other.jmax),
            max(self.kmin, other.kmin),
            min(self.kmax, other.kmax),
        );
        if r.is_valid() {
            Some(r)
        } else {
            None
        }
    }

    /// The smallest extent containing both boxes.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent::new(
            min(self.imin, other.imin),
            max(self.imax, other.imax),
            min(self.jmin, other.jmin),
            max(self.jmax, other.jmax),
            min(self.kmin, other.kmin),
            max(self.kmax, other.kmax),
        )
    }

    /// Expand every non-flat axis by `width` on both sides.
    ///
    /// Flat axes are left alone so that growing a 2D extent never fabricates
    /// a third dimension. A non-positive `width` returns the extent
    /// unchanged.
    pub fn grown(&self, width: i32) -> Extent {
        if width <= 0 {
            return *self;
        }
        let mut g = *self;
        if self.imax > self.imin {
            g.imin -= width;
            g.imax += width;
        }
        if self.jmax > self.jmin {
            g.jmin -= width;
            g.jmax += width;
        }
        if self.kmax > self.kmin {
            g.kmin -= width;
            g.kmax += width;
        }
        g
    }

    /// Clamp this extent to lie within `bounds`.
    ///
    /// Used to keep grown ghosted extents inside the whole dataset: there is
    /// no donor for index space that no partition covers.
    pub fn clamped(&self, bounds: &Extent) -> Extent {
        Extent::new(
            max(self.imin, bounds.imin),
            min(self.imax, bounds.imax),
            max(self.jmin, bounds.jmin),
            min(self.jmax, bounds.jmax),
            max(self.kmin, bounds.kmin),
            min(self.kmax, bounds.kmax),
        )
    }

    /// Row-major offset of a node within this extent's flat storage.
    ///
    /// i varies fastest, then j, then k. The node must lie inside the
    /// extent; this is a programmer-error contract checked in debug builds.
    #[inline]
    pub fn node_offset(&self, i: i32, j: i32, k: i32) -> usize {
        debug_assert!(
            self.contains_node(i, j, k),
            "node ({}, {}, {}) outside extent {}",
            i,
            j,
            k,
            self
        );
        let [ni, nj, _] = self.node_dims();
        let di = (i - self.imin) as usize;
        let dj = (j - self.jmin) as usize;
        let dk = (k - self.kmin) as usize;
        (dk * nj + dj) * ni + di
    }

    /// Checked variant of [`Extent::node_offset`] for data-driven index
    /// paths (decoded wire payloads), where out-of-range is an input error
    /// rather than a programming error.
    pub fn checked_node_offset(&self, i: i32, j: i32, k: i32) -> Result<usize, CoreError> {
        if self.contains_node(i, j, k) {
            Ok(self.node_offset(i, j, k))
        } else {
            Err(CoreError::NodeOutOfBounds {
                node: [i, j, k],
                extent: self.as_array(),
            })
        }
    }

    /// Iterate all nodes `(i, j, k)` in the same row-major order as
    /// [`Extent::node_offset`].
    pub fn nodes(&self) -> impl Iterator<Item = (i32, i32, i32)> {
        let (imin, imax) = (self.imin, self.imax);
        let (jmin, jmax) = (self.jmin, self.jmax);
        let (kmin, kmax) = (self.kmin, self.kmax);
        (kmin..=kmax).flat_map(move |k| {
            (jmin..=jmax).flat_map(move |j| (imin..=imax).map(move |i| (i, j, k)))
        })
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}, {}..{}, {}..{}]",
            self.imin, self.imax, self.jmin, self.jmax, self.kmin, self.kmax
        )
    }
}

#[inline]
const fn min(a: i32, b: i32) -> i32 {
    if a < b {
        a
    } else {
        b
    }
}

#[inline]
const fn max(a: i32, b: i32) -> i32 {
    if a > b {
        a
    } else {
        b
    }
}
