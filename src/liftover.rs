//! Rebase map coordinates using UCSC liftOver output.
//!
//! The liftOver web tool emits one region per input marker, formatted as
//! `chrN:start-end`. The output preserves input order, so rebasing is a
//! positional pairing of lifted intervals against map rows, with the
//! chromosome label cross-checked on every row.

use std::path::Path;

use crate::chrom::Chrom;
use crate::file::InputFile;
use crate::map::{marker_id, GeneticMap, GridMapError, Position, MBP};

/// One lifted region, as parsed from a `chr:start-end` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftedInterval {
    pub chrom: String,
    pub start: Position,
    pub end: Position,
}

/// Parse a single `chrN:start-end` line. Commas in the coordinates (as
/// pasted from the browser) are tolerated.
pub fn parse_region(line: &str) -> Result<LiftedInterval, GridMapError> {
    let bad = || GridMapError::Parse(format!("liftOver region from '{}'", line));
    let (chrom, range) = line.trim().split_once(':').ok_or_else(bad)?;
    let (start, end) = range.split_once('-').ok_or_else(bad)?;
    let parse_pos = |s: &str| -> Result<Position, GridMapError> {
        s.trim().replace(',', "").parse().map_err(|_| bad())
    };
    Ok(LiftedInterval {
        chrom: chrom.trim().to_string(),
        start: parse_pos(start)?,
        end: parse_pos(end)?,
    })
}

/// Read a liftOver output file: one region per line, comment lines
/// starting with `#` skipped.
pub fn read_liftover<P: AsRef<Path>>(path: P) -> Result<Vec<LiftedInterval>, GridMapError> {
    let input = InputFile::new(path);
    let mut intervals = Vec::new();
    for line in input.lines()? {
        if line.starts_with('#') {
            continue;
        }
        intervals.push(parse_region(&line)?);
    }
    Ok(intervals)
}

/// Replace every map position with its lifted build-38 coordinate.
///
/// Intervals pair with rows positionally, so the counts must match
/// exactly, and a lifted interval landing on a different chromosome than
/// the map row is an assembly inconsistency. Marker ids are regenerated
/// from the new coordinates.
pub fn rebase(map: GeneticMap, lifted: &[LiftedInterval]) -> Result<GeneticMap, GridMapError> {
    if lifted.len() != map.len() {
        return Err(GridMapError::RowCountMismatch {
            expected: map.len(),
            actual: lifted.len(),
        });
    }
    let mut records = map.records;
    for (record, interval) in records.iter_mut().zip(lifted) {
        let lifted_chrom: Chrom = interval
            .chrom
            .parse()
            .map_err(|_| {
                GridMapError::AssemblyMismatch(
                    record.marker.clone(),
                    record.chrom,
                    interval.chrom.clone(),
                )
            })?;
        if lifted_chrom != record.chrom {
            return Err(GridMapError::AssemblyMismatch(
                record.marker.clone(),
                record.chrom,
                interval.chrom.clone(),
            ));
        }
        record.pos_bp = interval.start;
        record.pos_mbp = interval.start as f64 / MBP;
        record.marker = marker_id(record.chrom, record.pos_bp);
    }
    Ok(GeneticMap::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapRecord;

    #[test]
    fn test_parse_region() {
        let r = parse_region("chr4:123029724-123029725").unwrap();
        assert_eq!(r.chrom, "chr4");
        assert_eq!(r.start, 123_029_724);
        assert_eq!(r.end, 123_029_725);
    }

    #[test]
    fn test_parse_region_with_commas() {
        let r = parse_region("chrX:1,234,567-1,234,568").unwrap();
        assert_eq!(r.start, 1_234_567);
    }

    #[test]
    fn test_parse_region_malformed() {
        assert!(parse_region("chr4 123 124").is_err());
        assert!(parse_region("chr4:abc-def").is_err());
    }

    #[test]
    fn test_rebase_replaces_positions_and_ids() {
        let map = GeneticMap::new(vec![MapRecord::new(Chrom::C4, 1_000_000, 0.5)]);
        let lifted = vec![LiftedInterval {
            chrom: "chr4".to_string(),
            start: 1_100_000,
            end: 1_100_001,
        }];
        let rebased = rebase(map, &lifted).unwrap();
        assert_eq!(rebased.records[0].pos_bp, 1_100_000);
        assert_eq!(rebased.records[0].marker, "4_1100000");
        assert_eq!(rebased.records[0].cm, 0.5);
    }

    #[test]
    fn test_rebase_count_mismatch() {
        let map = GeneticMap::new(vec![MapRecord::new(Chrom::C4, 1_000_000, 0.5)]);
        let err = rebase(map, &[]).unwrap_err();
        assert!(matches!(err, GridMapError::RowCountMismatch { .. }));
    }

    #[test]
    fn test_rebase_inversion_survives_sort_but_fails_cm_check() {
        use crate::map::{check_cm_sorted, check_sorted};

        // two chr4 markers whose lifted coordinates come back swapped:
        // the later marker (higher cM) now sits at the lower bp
        let map = GeneticMap::new(vec![
            MapRecord::new(Chrom::C4, 1_000_000, 1.0),
            MapRecord::new(Chrom::C4, 2_000_000, 2.0),
        ]);
        let lifted = vec![
            LiftedInterval {
                chrom: "chr4".to_string(),
                start: 2_100_000,
                end: 2_100_001,
            },
            LiftedInterval {
                chrom: "chr4".to_string(),
                start: 1_100_000,
                end: 1_100_001,
            },
        ];
        let mut rebased = rebase(map, &lifted).unwrap();
        rebased.sort();

        // the sort makes the position check trivially pass...
        assert!(check_sorted(&rebased.records).is_ok());
        // ...but the inversion is still there in the cM column and must
        // surface as an error, never reach the outputs
        let err = check_cm_sorted(&rebased.records).unwrap_err();
        assert!(matches!(err, GridMapError::NotSorted(Chrom::C4, _)));
    }

    #[test]
    fn test_rebase_chromosome_mismatch() {
        let map = GeneticMap::new(vec![MapRecord::new(Chrom::C4, 1_000_000, 0.5)]);
        let lifted = vec![LiftedInterval {
            chrom: "chr5".to_string(),
            start: 1_100_000,
            end: 1_100_001,
        }];
        let err = rebase(map, &lifted).unwrap_err();
        assert!(matches!(err, GridMapError::AssemblyMismatch(..)));
    }
}
