/// Ocean basin classification.
///
/// Submodules:
/// - `grid`    : the loaded basin raster and its nearest-point lookup.
/// - `resolver`: direct lookup with nearest-valid-neighbor fallback.

pub mod grid;
pub mod resolver;

pub use grid::{BasinGrid, BasinMask};
pub use resolver::{resolve, surrounding_grid_points, BasinResolution, BasinResolver};
