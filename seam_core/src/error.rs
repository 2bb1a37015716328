//! Error types for seam_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std
//! compatibility.

use core::fmt;

/// Errors that can occur during seam_core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// An extent has inverted bounds along at least one axis.
    InvalidExtent {
        /// The offending `[imin, imax, jmin, jmax, kmin, kmax]` bounds.
        extent: [i32; 6],
    },
    /// A node index fell outside the extent it was resolved against.
    NodeOutOfBounds {
        /// The `(i, j, k)` node index.
        node: [i32; 3],
        /// The extent the node was checked against.
        extent: [i32; 6],
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidExtent { extent } => {
                write!(
                    f,
                    "invalid extent [{}..{}, {}..{}, {}..{}]",
                    extent[0], extent[1], extent[2], extent[3], extent[4], extent[5]
                )
            }
            CoreError::NodeOutOfBounds { node, extent } => {
                write!(
                    f,
                    "node ({}, {}, {}) outside extent [{}..{}, {}..{}, {}..{}]",
                    node[0], node[1], node[2], extent[0], extent[1], extent[2], extent[3],
                    extent[4], extent[5]
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    #[test]
    fn test_error_display() {
        use std::format;

        let err = CoreError::InvalidExtent {
            extent: [2, 1, 0, 1, 0, 0],
        };
        assert_eq!(format!("{}", err), "invalid extent [2..1, 0..1, 0..0]");

        let err = CoreError::NodeOutOfBounds {
            node: [9, 0, 0],
            extent: [0, 5, 0, 5, 0, 0],
        };
        assert!(format!("{}", err).contains("(9, 0, 0)"));
    }
}
