//! The per-chromosome interpolation contract.
//!
//! Everything here is axis-agnostic: a [`ChromSeries`] pairs one
//! increasing numeric sequence with another, and the same machinery
//! serves bp-to-cM and cM-to-bp by building the series with swapped
//! columns (or via [`swap_axes`]). Interpolation within the range uses
//! the bracketing segment; outside it, the nearest end segment is
//! extended linearly (see [`crate::numeric::interp1d`]).

use indexmap::IndexMap;

use crate::chrom::Chrom;
use crate::map::{GridMapError, MapRecord, Position, ValueColumn};
use crate::numeric::interp1d;

/// One chromosome's interpolation source: `x` sorted ascending, paired
/// 1:1 with `y`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ChromSeries {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len());
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Interpolation sources grouped by chromosome, in table order.
pub type SeriesMap = IndexMap<Chrom, ChromSeries>;

/// Extract `(x, y)` series per chromosome from a map table.
///
/// Rows where either column is missing are skipped, so a sex-specific
/// series only covers the markers that sex map has. Chromosomes end up
/// in table encounter order.
pub fn series(records: &[MapRecord], x: ValueColumn, y: ValueColumn) -> SeriesMap {
    let mut out: SeriesMap = IndexMap::new();
    for record in records {
        if let (Some(xv), Some(yv)) = (x.get(record), y.get(record)) {
            let entry = out.entry(record.chrom).or_default();
            entry.x.push(xv);
            entry.y.push(yv);
        }
    }
    out
}

/// Swap the axes of every series, turning a bp→cM source into a cM→bp
/// one (and vice versa).
pub fn swap_axes(source: &SeriesMap) -> SeriesMap {
    source
        .iter()
        .map(|(&chrom, s)| (chrom, ChromSeries::new(s.y.clone(), s.x.clone())))
        .collect()
}

/// Interpolate one chromosome's series at the given targets.
///
/// The source must hold at least two points; fewer is a
/// [`GridMapError::MissingMapData`] rather than silently producing
/// undefined values. The output has exactly one value per target, in
/// target order.
pub fn interpolate_chrom(
    chrom: Chrom,
    source: &ChromSeries,
    targets: &[f64],
) -> Result<Vec<f64>, GridMapError> {
    if source.len() < 2 {
        return Err(GridMapError::MissingMapData(chrom, source.len()));
    }
    if let Some(pos) = first_unsorted(&source.x) {
        return Err(GridMapError::NotSorted(chrom, pos));
    }
    let values = targets
        .iter()
        .map(|&t| {
            // len >= 2 was checked above, so interp1d cannot be None
            interp1d(&source.x, &source.y, t)
                .ok_or_else(|| GridMapError::MissingMapData(chrom, source.len()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values)
}

/// Index of the first out-of-order x value, as a physical position, or
/// `None` when sorted. Equal adjacent values are allowed: they occur
/// legitimately on the cM axis where recombination is suppressed.
fn first_unsorted(x: &[f64]) -> Option<Position> {
    x.windows(2)
        .find(|pair| pair[1] < pair[0])
        .map(|pair| pair[1].round() as Position)
}

/// Interpolate a per-chromosome grouping of target positions against a
/// source mapping.
///
/// Target groups are keyed by their raw chromosome label so callers can
/// pass through out-of-set chromosomes (Y, MT): a label that does not
/// parse, or parses to a chromosome absent from the source, resolves to
/// missing values for every position in that group, not an error. A
/// chromosome that *is* present but too short to interpolate is still
/// fatal.
pub fn interpolate_split(
    source: &SeriesMap,
    targets: &IndexMap<String, Vec<f64>>,
) -> Result<IndexMap<String, Vec<Option<f64>>>, GridMapError> {
    let mut out = IndexMap::new();
    for (label, positions) in targets {
        let chrom_series = label
            .parse::<Chrom>()
            .ok()
            .and_then(|chrom| source.get(&chrom).map(|s| (chrom, s)));
        let values = match chrom_series {
            Some((chrom, s)) => interpolate_chrom(chrom, s, positions)?
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None; positions.len()],
        };
        out.insert(label.clone(), values);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapRecord;
    use crate::numeric::assert_floats_eq;
    use indexmap::indexmap;

    fn toy_source() -> SeriesMap {
        indexmap! {
            Chrom::C1 => ChromSeries::new(
                vec![0.0, 1_000_000.0, 2_000_000.0],
                vec![0.0, 1.0, 2.5],
            ),
            Chrom::C2 => ChromSeries::new(
                vec![0.0, 2_000_000.0],
                vec![0.0, 4.0],
            ),
        }
    }

    #[test]
    fn test_series_extraction_pairs_present_values() {
        let mut r1 = MapRecord::new(Chrom::C1, 1_000_000, 0.5);
        r1.cm_male = Some(0.4);
        let r2 = MapRecord::new(Chrom::C1, 2_000_000, 1.2);
        let records = vec![r1, r2];

        let avg = series(&records, ValueColumn::PosBp, ValueColumn::Cm);
        assert_eq!(avg[&Chrom::C1].len(), 2);

        let male = series(&records, ValueColumn::PosBp, ValueColumn::CmMale);
        assert_eq!(male[&Chrom::C1].len(), 1);
    }

    #[test]
    fn test_interpolate_chrom_preserves_target_order_and_length() {
        let source = toy_source();
        let targets = vec![1_500_000.0, 500_000.0, 0.0];
        let out = interpolate_chrom(Chrom::C1, &source[&Chrom::C1], &targets).unwrap();
        assert_eq!(out.len(), targets.len());
        assert_floats_eq(&out, &[1.75, 0.5, 0.0], 1e-12);
    }

    #[test]
    fn test_single_point_chromosome_is_fatal() {
        let short = ChromSeries::new(vec![5.0], vec![1.0]);
        let err = interpolate_chrom(Chrom::C3, &short, &[6.0]).unwrap_err();
        assert!(matches!(err, GridMapError::MissingMapData(Chrom::C3, 1)));
    }

    #[test]
    fn test_unsorted_source_is_fatal() {
        let bad = ChromSeries::new(vec![10.0, 5.0], vec![0.0, 1.0]);
        let err = interpolate_chrom(Chrom::C3, &bad, &[6.0]).unwrap_err();
        assert!(matches!(err, GridMapError::NotSorted(Chrom::C3, 5)));
    }

    #[test]
    fn test_interpolate_split_unknown_chrom_is_missing() {
        let source = toy_source();
        let targets = indexmap! {
            "1".to_string() => vec![1_000_000.0],
            "Y".to_string() => vec![123.0, 456.0],
            "19".to_string() => vec![5.0],
        };
        let out = interpolate_split(&source, &targets).unwrap();
        assert_eq!(out["1"], vec![Some(1.0)]);
        // out-of-set label: missing, not an error
        assert_eq!(out["Y"], vec![None, None]);
        // in-set label absent from the source: also missing
        assert_eq!(out["19"], vec![None]);
    }

    #[test]
    fn test_swap_axes_reverses_direction() {
        let source = toy_source();
        let swapped = swap_axes(&source);
        let bp = interpolate_chrom(Chrom::C2, &swapped[&Chrom::C2], &[2.0]).unwrap();
        assert_floats_eq(&bp, &[1_000_000.0], 1e-9);
    }
}
