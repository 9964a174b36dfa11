//! Rebase the Liu et al. mouse genetic map and build a cM-uniform
//! marker grid.
//!
//! The pipeline loads the three sex-variant genetic-map tables, rebases
//! their physical coordinates onto GRCm38, anchors each chromosome at
//! its physical origin and telomere, shifts genetic positions so each
//! chromosome starts at 0 cM, and then constructs an evenly-spaced
//! (in centiMorgans) marker grid across the genome. The grid is
//! densified wherever uniform genetic spacing leaves physical gaps
//! beyond 0.5 Mbp, and is used to annotate the GigaMUGA and MegaMUGA
//! array manifests and to recompute nearest-grid-point indices for a
//! gene table.
//!
//! The numeric core is axis-agnostic piecewise-linear interpolation
//! with end-segment extrapolation; everything else is table reshaping
//! around it:
//!
//! ```no_run
//! use gridmap::prelude::*;
//!
//! let seqlens = read_seqlens("mm10.chrom.sizes")
//!     .expect("could not read chromosome lengths");
//! let average = load_sex_map("liu2014_average.csv", PositionScale::Mbp)
//!     .expect("cannot read map");
//! let map = GeneticMap::new(drop_known_inversions(average));
//! let shifted = anchor_and_shift(map, &seqlens).expect("anchoring failed");
//!
//! let grid = Grid::build(&shifted, DEFAULT_STEP_CM).expect("grid failed");
//! let dense = grid.densify(DEFAULT_MAX_GAP_BP).expect("densify failed");
//! dense.write_tsv(None).expect("write failed");
//! ```

pub mod anchor;
pub mod arrays;
pub mod chrom;
#[cfg(feature = "cli")]
pub mod fetch;
pub mod file;
pub mod genes;
pub mod grid;
pub mod interp;
pub mod liftover;
pub mod map;
pub mod numeric;

pub use chrom::Chrom;
pub use grid::{Grid, GridIndex};
pub use map::{GeneticMap, GridMapError, MapRecord, Position};


pub mod prelude {
    pub use crate::anchor::anchor_and_shift;
    pub use crate::arrays::{annotate, load_array_markers, write_annotated};
    pub use crate::chrom::Chrom;
    pub use crate::genes::{assign_grid_indices, load_genes, write_genes};
    pub use crate::grid::{Grid, GridIndex, DEFAULT_MAX_GAP_BP, DEFAULT_STEP_CM};
    pub use crate::interp::{interpolate_chrom, interpolate_split, series, swap_axes};
    pub use crate::liftover::{read_liftover, rebase};
    pub use crate::map::{
        check_cm_sorted, check_sorted, drop_known_inversions, load_sex_map, merge_sex_maps,
        read_seqlens,
        GeneticMap, GridMapError, MapRecord, Position, PositionScale,
    };
}
