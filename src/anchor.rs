//! Boundary anchoring and zero-shifting of the genetic map.
//!
//! Each chromosome gets two synthetic boundary markers, at physical
//! position 0 and at the chromosome end, with genetic positions
//! extrapolated from the existing series. Every genetic value on the
//! chromosome is then shifted so its minimum (normally the new origin
//! anchor) becomes exactly 0 cM.

use indexmap::IndexMap;

use crate::chrom::Chrom;
use crate::interp::{interpolate_chrom, ChromSeries};
use crate::map::{GeneticMap, GridMapError, MapRecord, Position};

/// Interpolate a sex-specific column at the two boundary positions.
///
/// A chromosome the sex map does not cover at all (male X) yields
/// missing values; a single stray point is not interpolatable and is
/// fatal.
fn boundary_sex_values(
    chrom: Chrom,
    records: &[&MapRecord],
    get: impl Fn(&MapRecord) -> Option<f64>,
    boundaries: &[f64],
) -> Result<Vec<Option<f64>>, GridMapError> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for record in records {
        if let Some(v) = get(record) {
            x.push(record.pos_bp as f64);
            y.push(v);
        }
    }
    match x.len() {
        0 => Ok(vec![None; boundaries.len()]),
        1 => Err(GridMapError::MissingMapData(chrom, 1)),
        _ => {
            let s = ChromSeries::new(x, y);
            let values = interpolate_chrom(chrom, &s, boundaries)?;
            Ok(values.into_iter().map(Some).collect())
        }
    }
}

/// Subtract the column minimum from every present value on one
/// chromosome, in place.
fn shift_column(records: &mut [MapRecord], get: impl Fn(&mut MapRecord) -> &mut Option<f64>) {
    let mut min: Option<f64> = None;
    for record in records.iter_mut() {
        if let Some(v) = *get(record) {
            min = Some(match min {
                Some(m) if m <= v => m,
                _ => v,
            });
        }
    }
    if let Some(min) = min {
        for record in records.iter_mut() {
            if let Some(v) = get(record).as_mut() {
                *v -= min;
            }
        }
    }
}

/// Anchor every chromosome at 0 bp and its telomere, then shift all
/// genetic columns so each chromosome's minimum is 0 cM.
///
/// Expects a table whose physical positions are strictly increasing per
/// chromosome (run [`crate::map::drop_known_inversions`] and
/// [`crate::map::check_sorted`] first). A map position beyond the
/// supplied chromosome length is an assembly inconsistency and fatal.
pub fn anchor_and_shift(
    map: GeneticMap,
    seqlens: &IndexMap<Chrom, Position>,
) -> Result<GeneticMap, GridMapError> {
    // group rows by chromosome, preserving table order
    let mut groups: IndexMap<Chrom, Vec<MapRecord>> = IndexMap::new();
    for record in map.records {
        groups.entry(record.chrom).or_default().push(record);
    }

    let mut out = Vec::new();
    for (chrom, rows) in groups {
        let seq_len = *seqlens
            .get(&chrom)
            .ok_or(GridMapError::NoSeqLen(chrom))?;

        let first_pos = rows.first().map(|r| r.pos_bp).unwrap_or(0);
        let last_pos = rows.last().map(|r| r.pos_bp).unwrap_or(0);
        if last_pos > seq_len {
            return Err(GridMapError::BeyondChromEnd(chrom, last_pos, seq_len));
        }

        // boundary positions that are not already in the map
        let mut boundaries = Vec::new();
        if first_pos > 0 {
            boundaries.push(0.0);
        }
        if last_pos < seq_len {
            boundaries.push(seq_len as f64);
        }

        let avg = ChromSeries::new(
            rows.iter().map(|r| r.pos_bp as f64).collect(),
            rows.iter().map(|r| r.cm).collect(),
        );
        let avg_values = interpolate_chrom(chrom, &avg, &boundaries)?;

        let refs: Vec<&MapRecord> = rows.iter().collect();
        let female_values =
            boundary_sex_values(chrom, &refs, |r| r.cm_female, &boundaries)?;
        let male_values = boundary_sex_values(chrom, &refs, |r| r.cm_male, &boundaries)?;

        let mut anchored: Vec<MapRecord> = Vec::with_capacity(rows.len() + 2);
        let mut boundary_iter = boundaries
            .iter()
            .zip(avg_values)
            .zip(female_values)
            .zip(male_values)
            .map(|(((b, avg), female), male)| {
                let mut record = MapRecord::new(chrom, b.round() as Position, avg);
                record.cm_female = female;
                record.cm_male = male;
                record
            });

        if first_pos > 0 {
            // first boundary is the origin anchor
            if let Some(origin) = boundary_iter.next() {
                anchored.push(origin);
            }
        }
        anchored.extend(rows);
        anchored.extend(boundary_iter);

        // shift the averaged column by its chromosome minimum
        let cm_min = anchored
            .iter()
            .map(|r| r.cm)
            .fold(f64::INFINITY, f64::min);
        for record in anchored.iter_mut() {
            record.cm -= cm_min;
        }
        // and each sex-specific column by its own minimum
        shift_column(&mut anchored, |r| &mut r.cm_female);
        shift_column(&mut anchored, |r| &mut r.cm_male);

        out.extend(anchored);
    }

    Ok(GeneticMap::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::assert_float_eq;
    use indexmap::indexmap;

    fn toy_map() -> GeneticMap {
        let mut a = MapRecord::new(Chrom::C1, 1_000_000, 1.0);
        a.cm_female = Some(2.0);
        let mut b = MapRecord::new(Chrom::C1, 3_000_000, 3.0);
        b.cm_female = Some(6.0);
        let x1 = MapRecord::new(Chrom::X, 2_000_000, 0.5);
        let x2 = MapRecord::new(Chrom::X, 4_000_000, 1.5);
        GeneticMap::new(vec![a, b, x1, x2])
    }

    fn toy_seqlens() -> IndexMap<Chrom, Position> {
        indexmap! {
            Chrom::C1 => 5_000_000,
            Chrom::X => 6_000_000,
        }
    }

    #[test]
    fn test_boundary_anchors_inserted() {
        let shifted = anchor_and_shift(toy_map(), &toy_seqlens()).unwrap();
        let chr1: Vec<_> = shifted
            .records
            .iter()
            .filter(|r| r.chrom == Chrom::C1)
            .collect();
        assert_eq!(chr1.len(), 4);
        assert_eq!(chr1[0].pos_bp, 0);
        assert_eq!(chr1[0].marker, "1_0");
        assert_eq!(chr1[3].pos_bp, 5_000_000);
        assert_eq!(chr1[3].marker, "1_5000000");
    }

    #[test]
    fn test_minimum_cm_is_exactly_zero() {
        let shifted = anchor_and_shift(toy_map(), &toy_seqlens()).unwrap();
        for chrom in [Chrom::C1, Chrom::X] {
            let min = shifted
                .records
                .iter()
                .filter(|r| r.chrom == chrom)
                .map(|r| r.cm)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(min, 0.0);
        }
        let female_min = shifted
            .records
            .iter()
            .filter_map(|r| (r.chrom == Chrom::C1).then_some(r.cm_female).flatten())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(female_min, 0.0);
    }

    #[test]
    fn test_shift_preserves_spans() {
        // slope on chr1 is 1 cM/Mbp, so the anchored map runs 0..5 cM
        let shifted = anchor_and_shift(toy_map(), &toy_seqlens()).unwrap();
        let chr1: Vec<_> = shifted
            .records
            .iter()
            .filter(|r| r.chrom == Chrom::C1)
            .collect();
        assert_float_eq(chr1[0].cm, 0.0, 1e-12);
        assert_float_eq(chr1[1].cm, 1.0, 1e-12);
        assert_float_eq(chr1[3].cm, 5.0, 1e-12);
    }

    #[test]
    fn test_absent_sex_column_stays_missing() {
        let shifted = anchor_and_shift(toy_map(), &toy_seqlens()).unwrap();
        assert!(shifted
            .records
            .iter()
            .filter(|r| r.chrom == Chrom::X)
            .all(|r| r.cm_male.is_none() && r.cm_female.is_none()));
    }

    #[test]
    fn test_position_beyond_chrom_end_is_fatal() {
        let map = GeneticMap::new(vec![
            MapRecord::new(Chrom::C1, 1_000_000, 1.0),
            MapRecord::new(Chrom::C1, 9_000_000, 3.0),
        ]);
        let err = anchor_and_shift(map, &toy_seqlens()).unwrap_err();
        assert!(matches!(err, GridMapError::BeyondChromEnd(Chrom::C1, ..)));
    }

    #[test]
    fn test_missing_seqlen_is_fatal() {
        let map = GeneticMap::new(vec![
            MapRecord::new(Chrom::C7, 1_000_000, 1.0),
            MapRecord::new(Chrom::C7, 2_000_000, 2.0),
        ]);
        let err = anchor_and_shift(map, &toy_seqlens()).unwrap_err();
        assert!(matches!(err, GridMapError::NoSeqLen(Chrom::C7)));
    }
}
