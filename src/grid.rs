//! The evenly-spaced marker grid and its pseudomarker densification.
//!
//! The grid is uniform in *genetic* distance: per chromosome, an
//! arithmetic cM sequence runs from the 3 Mbp anchor to the telomere and
//! is reverse-interpolated onto physical coordinates. Uniform cM spacing
//! leaves large physical gaps where recombination is suppressed, so a
//! second pass subdivides any physical gap beyond a maximum, producing
//! the densified ("plus") grid. Downstream tables reference grid rows by
//! positional index, resolved with [`GridIndex::nearest`].

use indexmap::IndexMap;
use std::io::{self, Write};
use std::path::Path;

use crate::chrom::Chrom;
use crate::interp::{interpolate_chrom, series, swap_axes, ChromSeries};
use crate::map::{
    format_float, marker_id, GeneticMap, GridMapError, Position, ValueColumn, MBP,
};

/// Physical offset of the start-of-grid anchor, conventionally reserved
/// for the centromere.
pub const CENTROMERE_OFFSET_BP: Position = 3_000_000;

/// Default genetic spacing between grid points.
pub const DEFAULT_STEP_CM: f64 = 0.02;

/// Default maximum physical gap tolerated between adjacent grid points
/// before pseudomarkers are inserted (0.5 Mbp).
pub const DEFAULT_MAX_GAP_BP: Position = 500_000;

/// One synthetic grid marker.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub marker: String,
    pub chrom: Chrom,
    pub pos_bp: Position,
    pub pos_mbp: f64,
    pub cm: f64,
}

impl GridPoint {
    fn new(chrom: Chrom, pos_bp: Position, cm: f64) -> Self {
        Self {
            marker: marker_id(chrom, pos_bp),
            chrom,
            pos_bp,
            pos_mbp: pos_bp as f64 / MBP,
            cm,
        }
    }
}

/// The marker grid, ordered by chromosome level order then ascending
/// genetic position. Always built fresh; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub points: Vec<GridPoint>,
}

impl Grid {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Build the uniform-cM grid from an anchored, zero-shifted map.
    ///
    /// Per chromosome: interpolate the cM value at
    /// [`CENTROMERE_OFFSET_BP`], step from there to the last known cM in
    /// increments of `step_cm`, and reverse-interpolate each step onto
    /// basepairs, rounding to the nearest basepair. The rare rounding
    /// collision on a cM plateau drops the later duplicate so physical
    /// positions stay strictly increasing.
    pub fn build(map: &GeneticMap, step_cm: f64) -> Result<Grid, GridMapError> {
        let forward = series(&map.records, ValueColumn::PosBp, ValueColumn::Cm);
        let reverse = swap_axes(&forward);

        let mut points = Vec::new();
        for (&chrom, chrom_series) in &forward {
            let cm_start = map.interpolate_cm(chrom, &[CENTROMERE_OFFSET_BP])?[0];
            let cm_end = *chrom_series
                .y
                .last()
                .ok_or(GridMapError::MissingMapData(chrom, 0))?;
            if cm_end < cm_start {
                return Err(GridMapError::NotSorted(chrom, CENTROMERE_OFFSET_BP));
            }

            let steps = ((cm_end - cm_start) / step_cm + 1e-9).floor() as usize;
            let targets: Vec<f64> = (0..=steps)
                .map(|i| cm_start + i as f64 * step_cm)
                .collect();
            let positions = interpolate_chrom(chrom, &reverse[&chrom], &targets)?;

            let mut last_bp: Option<Position> = None;
            for (&cm, bp) in targets.iter().zip(positions) {
                let bp = bp.round() as Position;
                if last_bp.map_or(false, |prev| bp <= prev) {
                    continue;
                }
                last_bp = Some(bp);
                points.push(GridPoint::new(chrom, bp, cm));
            }
        }

        points.sort_by(|a, b| {
            a.chrom
                .cmp(&b.chrom)
                .then(a.cm.partial_cmp(&b.cm).unwrap_or(std::cmp::Ordering::Equal))
        });
        Ok(Grid { points })
    }

    /// Subdivide any physical gap wider than `max_gap_bp`.
    ///
    /// Between each offending pair, evenly spaced pseudomarkers are
    /// inserted so no sub-gap exceeds the maximum; their genetic
    /// positions are reinterpolated from the grid itself. Original
    /// points are never removed or reordered.
    pub fn densify(&self, max_gap_bp: Position) -> Result<Grid, GridMapError> {
        // the grid itself is the interpolation reference
        let mut reference: IndexMap<Chrom, ChromSeries> = IndexMap::new();
        for p in &self.points {
            let entry = reference.entry(p.chrom).or_default();
            entry.x.push(p.pos_bp as f64);
            entry.y.push(p.cm);
        }

        let mut points = Vec::with_capacity(self.points.len());
        for (i, point) in self.points.iter().enumerate() {
            points.push(point.clone());
            let next = match self.points.get(i + 1) {
                Some(n) if n.chrom == point.chrom => n,
                _ => continue,
            };
            let gap = next.pos_bp - point.pos_bp;
            if gap <= max_gap_bp {
                continue;
            }

            // smallest split count that brings every sub-gap under the cap
            let pieces = (gap + max_gap_bp - 1) / max_gap_bp;
            let inserts: Vec<f64> = (1..pieces)
                .map(|j| (point.pos_bp + gap * j / pieces) as f64)
                .collect();
            let cms = interpolate_chrom(point.chrom, &reference[&point.chrom], &inserts)?;
            for (bp, cm) in inserts.into_iter().zip(cms) {
                points.push(GridPoint::new(point.chrom, bp.round() as Position, cm));
            }
        }

        Ok(Grid { points })
    }

    /// Build the per-chromosome position index over this grid's rows.
    pub fn index(&self) -> GridIndex {
        let mut per_chrom: IndexMap<Chrom, Vec<(Position, usize)>> = IndexMap::new();
        for (row, point) in self.points.iter().enumerate() {
            per_chrom
                .entry(point.chrom)
                .or_default()
                .push((point.pos_bp, row));
        }
        GridIndex { per_chrom }
    }

    /// Write the grid as TSV (gzip if the path ends in `.gz`), or to
    /// standard out when no path is given.
    pub fn write_tsv(&self, filepath: Option<&Path>) -> Result<(), GridMapError> {
        let mut writer: Box<dyn Write> = match filepath {
            Some(path) => crate::file::OutputFile::new(path).writer()?,
            None => Box::new(io::stdout()),
        };
        writeln!(writer, "marker\tchr\tpos_mbp\tpos_bp\tcm")?;
        for p in &self.points {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                p.marker,
                p.chrom,
                format_float(p.pos_mbp),
                p.pos_bp,
                format_float(p.cm),
            )?;
        }
        Ok(())
    }
}

/// Physical positions of grid rows, grouped by chromosome, for nearest
/// lookups. Row indices are positions in the grid's row ordering, which
/// downstream tables use as a foreign key.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    per_chrom: IndexMap<Chrom, Vec<(Position, usize)>>,
}

impl GridIndex {
    /// Row index of the grid point physically closest to `pos_bp` on the
    /// named chromosome.
    ///
    /// Returns `None` when the label is outside the grid's chromosome
    /// set (Y, MT annotations have no grid). Tie-break between two
    /// equidistant points: the earlier grid row (lower position) wins.
    pub fn nearest(&self, chrom_label: &str, pos_bp: Position) -> Option<usize> {
        let chrom: Chrom = chrom_label.parse().ok()?;
        let rows = self.per_chrom.get(&chrom)?;

        let split = rows.partition_point(|&(bp, _)| bp < pos_bp);
        let left = split.checked_sub(1).and_then(|i| rows.get(i));
        let right = rows.get(split);
        match (left, right) {
            (Some(&(lbp, lrow)), Some(&(rbp, rrow))) => {
                if pos_bp - lbp <= rbp - pos_bp {
                    Some(lrow)
                } else {
                    Some(rrow)
                }
            }
            (Some(&(_, row)), None) | (None, Some(&(_, row))) => Some(row),
            (None, None) => None,
        }
    }
}
