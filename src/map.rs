//! The genetic-map table: records, loading, reshaping, and persistence.
//!
//! A map table is a flat list of [`MapRecord`]s ordered by chromosome
//! (categorical level order `1..19, X`) and physical position. Each record
//! carries the sex-averaged genetic position and, after merging, the
//! optional female- and male-specific positions. The table is reshaped
//! into a per-chromosome grouping ([`split`]) before every interpolation
//! call and reassembled ([`join`]) afterwards.

use csv::ReaderBuilder;
use indexmap::IndexMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

use crate::chrom::Chrom;
use crate::file::{FileError, InputFile, OutputFile};
use crate::interp::{interpolate_chrom, series};

/// The integer type for physical genomic positions, in basepairs.
pub type Position = u64;

/// The float type for genetic positions, in centiMorgans.
pub type MapDistance = f64;

/// Basepairs per megabasepair.
pub const MBP: f64 = 1_000_000.0;

/// The single physical position known to be inverted relative to the
/// GRCm38 assembly ordering: one chromosome 4 marker present only on the
/// female map. It must be dropped before anchoring or the
/// strictly-increasing invariant fails on that chromosome. Any other
/// detected inversion is an error, not a drop.
pub const CHR4_INVERTED_BP: Position = 123_029_724;

#[derive(Error, Debug)]
pub enum GridMapError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("file reading error: {0}")]
    File(#[from] FileError),
    #[error("column '{0}' not found in input header")]
    MissingColumn(String),
    #[error("chromosome label '{0}' outside the recognized set 1..19, X")]
    UnknownChrom(String),
    #[error("failed to parse field: {0}")]
    Parse(String),
    #[error("chromosome {0} has {1} usable positions; at least 2 are required to interpolate")]
    MissingMapData(Chrom, usize),
    #[error("physical positions on chromosome {0} are not strictly increasing at {1} bp")]
    NotSorted(Chrom, Position),
    #[error("assembly mismatch for marker '{0}': map has chromosome {1}, lifted coordinates have '{2}'")]
    AssemblyMismatch(String, Chrom, String),
    #[error("map position {1} bp lies beyond the chromosome {0} length of {2} bp")]
    BeyondChromEnd(Chrom, Position, Position),
    #[error("no sequence length known for chromosome {0}")]
    NoSeqLen(Chrom),
    #[error("row count mismatch after rejoin: expected {expected}, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },
    #[cfg(feature = "cli")]
    #[error("download of {0} failed: {1}")]
    Fetch(String, String),
}

/// Whether a physical-position column stores raw basepairs or
/// Mbp-scaled values.
///
/// The two published revisions of the Liu map differ here, as do the
/// array manifests, so callers always state the scale explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionScale {
    Bp,
    Mbp,
}

impl PositionScale {
    /// Convert a raw column value into basepairs.
    pub fn to_bp(&self, value: f64) -> Position {
        match self {
            PositionScale::Bp => value.round() as Position,
            PositionScale::Mbp => (value * MBP).round() as Position,
        }
    }
}

/// Synthesize a marker identifier from chromosome and physical position.
pub fn marker_id(chrom: Chrom, pos_bp: Position) -> String {
    format!("{}_{}", chrom, pos_bp)
}

/// One row of the genetic-map table.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    pub marker: String,
    pub chrom: Chrom,
    pub pos_bp: Position,
    pub pos_mbp: f64,
    /// Sex-averaged genetic position.
    pub cm: MapDistance,
    /// Female-specific genetic position, where the female map covers
    /// this marker.
    pub cm_female: Option<MapDistance>,
    /// Male-specific genetic position; absent for all of chromosome X.
    pub cm_male: Option<MapDistance>,
}

impl MapRecord {
    pub fn new(chrom: Chrom, pos_bp: Position, cm: MapDistance) -> Self {
        Self {
            marker: marker_id(chrom, pos_bp),
            chrom,
            pos_bp,
            pos_mbp: pos_bp as f64 / MBP,
            cm,
            cm_female: None,
            cm_male: None,
        }
    }
}

/// Which value column of the map table an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    PosBp,
    PosMbp,
    Cm,
    CmFemale,
    CmMale,
}

impl ValueColumn {
    /// Extract the column value from a record; `None` for a sex-specific
    /// column the record does not carry.
    pub fn get(&self, record: &MapRecord) -> Option<f64> {
        match self {
            ValueColumn::PosBp => Some(record.pos_bp as f64),
            ValueColumn::PosMbp => Some(record.pos_mbp),
            ValueColumn::Cm => Some(record.cm),
            ValueColumn::CmFemale => record.cm_female,
            ValueColumn::CmMale => record.cm_male,
        }
    }
}

/// One chromosome's slice of a split table: marker ids paired 1:1 with
/// values, in the row order of the table they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSeries {
    pub markers: Vec<String>,
    pub values: Vec<f64>,
}

impl SplitSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A map table reshaped into per-chromosome sequences, preserving the
/// chromosome encounter order and within-chromosome row order.
pub type SplitMap = IndexMap<Chrom, SplitSeries>;

/// Group a table's value column by chromosome.
///
/// Rows where a sex-specific column is missing are skipped; for the
/// always-present columns every row appears. Row order within each
/// chromosome is the table's row order.
///
/// The exact [`join`] round trip requires the table to be
/// chromosome-contiguous (all of a chromosome's rows adjacent, as map
/// tables are); an interleaved table regroups at each chromosome's
/// first occurrence, so the rebuild preserves rows and counts but not
/// the interleaved global order.
pub fn split(records: &[MapRecord], column: ValueColumn) -> SplitMap {
    let mut out: SplitMap = IndexMap::new();
    for record in records {
        if let Some(value) = column.get(record) {
            let entry = out.entry(record.chrom).or_default();
            entry.markers.push(record.marker.clone());
            entry.values.push(value);
        }
    }
    out
}

/// Reassemble a split mapping into flat `(chromosome, marker, value)`
/// rows, preserving the split's chromosome order and per-chromosome
/// row order. Reproduces a chromosome-contiguous input exactly (see
/// [`split`]).
pub fn join(split: &SplitMap) -> Vec<(Chrom, String, f64)> {
    let mut rows = Vec::new();
    for (&chrom, s) in split {
        for (marker, &value) in s.markers.iter().zip(s.values.iter()) {
            rows.push((chrom, marker.clone(), value));
        }
    }
    rows
}

/// [`join`] with the row-count invariant enforced: the rebuilt rows must
/// number exactly `expected`.
pub fn join_checked(
    split: &SplitMap,
    expected: usize,
) -> Result<Vec<(Chrom, String, f64)>, GridMapError> {
    let rows = join(split);
    if rows.len() != expected {
        return Err(GridMapError::RowCountMismatch {
            expected,
            actual: rows.len(),
        });
    }
    Ok(rows)
}

/// Verify that physical positions are strictly increasing within every
/// chromosome. Anything else is an assembly-order inconsistency.
pub fn check_sorted(records: &[MapRecord]) -> Result<(), GridMapError> {
    let mut last: IndexMap<Chrom, Position> = IndexMap::new();
    for record in records {
        if let Some(&prev) = last.get(&record.chrom) {
            if record.pos_bp <= prev {
                return Err(GridMapError::NotSorted(record.chrom, record.pos_bp));
            }
        }
        last.insert(record.chrom, record.pos_bp);
    }
    Ok(())
}

/// Verify that every genetic-position column is non-decreasing along
/// each chromosome's physical row order.
///
/// Position sorting cannot catch a marker whose lifted coordinates
/// landed out of assembly order: after the sort its bp value fits, but
/// its cM value is inverted against its neighbors. A decreasing value
/// in any of the three columns is that inversion and must surface as an
/// error, not be coerced.
pub fn check_cm_sorted(records: &[MapRecord]) -> Result<(), GridMapError> {
    for column in [ValueColumn::Cm, ValueColumn::CmFemale, ValueColumn::CmMale] {
        let mut last: IndexMap<Chrom, f64> = IndexMap::new();
        for record in records {
            if let Some(v) = column.get(record) {
                if let Some(&prev) = last.get(&record.chrom) {
                    if v < prev {
                        return Err(GridMapError::NotSorted(record.chrom, record.pos_bp));
                    }
                }
                last.insert(record.chrom, v);
            }
        }
    }
    Ok(())
}

/// Remove the documented chromosome 4 inversion ([`CHR4_INVERTED_BP`]).
///
/// This is a data-quality patch tied to one snapshot of the published
/// map; it is a named step so future revisions can skip it. It never
/// removes anything else, so a later [`check_sorted`] still surfaces any
/// other inversion.
pub fn drop_known_inversions(records: Vec<MapRecord>) -> Vec<MapRecord> {
    records
        .into_iter()
        .filter(|r| !(r.chrom == Chrom::C4 && r.pos_bp == CHR4_INVERTED_BP))
        .collect()
}

/// Locate the first header matching any of the candidate names,
/// case-insensitively.
fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Result<usize, GridMapError> {
    for (idx, header) in headers.iter().enumerate() {
        let header = header.trim();
        if candidates.iter().any(|c| header.eq_ignore_ascii_case(c)) {
            return Ok(idx);
        }
    }
    Err(GridMapError::MissingColumn(candidates[0].to_string()))
}

fn parse_f64(field: &str, what: &str) -> Result<f64, GridMapError> {
    field
        .trim()
        .parse()
        .map_err(|_| GridMapError::Parse(format!("{} from '{}'", what, field)))
}

/// Read one sex-variant of the published map (a CSV with chromosome,
/// physical position, and cM columns) into map records.
///
/// The numeric code 20 for X is recoded during chromosome parsing; any
/// label outside `1..19, X` is fatal. `scale` states whether the position
/// column is basepairs or Mbp; the two published revisions differ, so
/// normalization is always explicit.
pub fn load_sex_map<P: AsRef<Path>>(
    path: P,
    scale: PositionScale,
) -> Result<Vec<MapRecord>, GridMapError> {
    let input = InputFile::new(path);
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(input.reader()?);

    let headers = rdr.headers()?.clone();
    let chrom_col = find_column(&headers, &["chr", "chrom", "chromosome"])?;
    let pos_col = find_column(&headers, &["pos", "bp", "mbp", "position"])?;
    let cm_col = find_column(&headers, &["cm", "map", "sex_averaged_cm"])?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let chrom_str = row.get(chrom_col).ok_or(GridMapError::MissingColumn(
            headers[chrom_col].to_string(),
        ))?;
        let chrom: Chrom = chrom_str.parse()?;
        let pos_raw = parse_f64(&row[pos_col], "physical position")?;
        let cm = parse_f64(&row[cm_col], "genetic position")?;
        records.push(MapRecord::new(chrom, scale.to_bp(pos_raw), cm));
    }
    Ok(records)
}

/// Merge the three sex-variant maps into one table.
///
/// The sex-averaged table drives row identity and order; female and male
/// values are matched by marker id, and a marker absent from a sex map
/// stays missing in that column (the male map has no chromosome X rows
/// at all, so every X row ends up with a missing male value).
pub fn merge_sex_maps(
    average: Vec<MapRecord>,
    female: &[MapRecord],
    male: &[MapRecord],
) -> Vec<MapRecord> {
    let by_marker = |records: &[MapRecord]| -> IndexMap<String, f64> {
        records
            .iter()
            .map(|r| (r.marker.clone(), r.cm))
            .collect()
    };
    let female_cm = by_marker(female);
    let male_cm = by_marker(male);

    average
        .into_iter()
        .map(|mut record| {
            record.cm_female = female_cm.get(&record.marker).copied();
            record.cm_male = male_cm.get(&record.marker).copied();
            record
        })
        .collect()
}

/// The merged, ordered genetic-map table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneticMap {
    pub records: Vec<MapRecord>,
}

impl GeneticMap {
    pub fn new(records: Vec<MapRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sort rows by chromosome level order, then physical position.
    pub fn sort(&mut self) {
        self.records
            .sort_by(|a, b| a.chrom.cmp(&b.chrom).then(a.pos_bp.cmp(&b.pos_bp)));
    }

    /// Interpolate sex-averaged genetic positions at arbitrary physical
    /// positions on one chromosome.
    pub fn interpolate_cm(
        &self,
        chrom: Chrom,
        positions: &[Position],
    ) -> Result<Array1<MapDistance>, GridMapError> {
        let source = series(&self.records, ValueColumn::PosBp, ValueColumn::Cm);
        let chrom_series = source
            .get(&chrom)
            .ok_or_else(|| GridMapError::MissingMapData(chrom, 0))?;
        let targets: Vec<f64> = positions.iter().map(|&p| p as f64).collect();
        let values = interpolate_chrom(chrom, chrom_series, &targets)?;
        Ok(Array1::from_vec(values))
    }

    /// Write the table as TSV (gzip if the path ends in `.gz`), or to
    /// standard out when no path is given. Missing sex-specific values
    /// serialize as `NA`.
    pub fn write_tsv(&self, filepath: Option<&Path>) -> Result<(), GridMapError> {
        let mut writer: Box<dyn Write> = match filepath {
            Some(path) => OutputFile::new(path).writer()?,
            None => Box::new(io::stdout()),
        };
        writeln!(
            writer,
            "marker\tchr\tpos_mbp\tpos_bp\tcm\tcm_female\tcm_male"
        )?;
        for r in &self.records {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.marker,
                r.chrom,
                format_float(r.pos_mbp),
                r.pos_bp,
                format_float(r.cm),
                format_opt(r.cm_female),
                format_opt(r.cm_male),
            )?;
        }
        Ok(())
    }

    /// Reload a table previously written by [`GeneticMap::write_tsv`].
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self, GridMapError> {
        let input = InputFile::new(path);
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(input.reader()?);

        let headers = rdr.headers()?.clone();
        let chrom_col = find_column(&headers, &["chr"])?;
        let pos_col = find_column(&headers, &["pos_bp"])?;
        let cm_col = find_column(&headers, &["cm"])?;
        let female_col = find_column(&headers, &["cm_female"])?;
        let male_col = find_column(&headers, &["cm_male"])?;

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let chrom: Chrom = row[chrom_col].parse()?;
            let pos_bp = parse_f64(&row[pos_col], "physical position")?.round() as Position;
            let cm = parse_f64(&row[cm_col], "genetic position")?;
            let mut record = MapRecord::new(chrom, pos_bp, cm);
            record.cm_female = parse_opt(&row[female_col], "female cM")?;
            record.cm_male = parse_opt(&row[male_col], "male cM")?;
            records.push(record);
        }
        Ok(Self::new(records))
    }
}

/// Format a float with six decimals, trimming the trailing zeros that
/// otherwise bloat the output tables.
pub fn format_float(value: f64) -> String {
    let s = format!("{:.6}", value);
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn format_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format_float(v),
        None => "NA".to_string(),
    }
}

fn parse_opt(field: &str, what: &str) -> Result<Option<f64>, GridMapError> {
    let field = field.trim();
    if field == "NA" || field.is_empty() {
        Ok(None)
    } else {
        parse_f64(field, what).map(Some)
    }
}

/// Read a tab-delimited table of sequence names and lengths (UCSC
/// `chrom.sizes` style, no header).
///
/// Entries whose label falls outside the closed chromosome set (Y, MT,
/// unplaced scaffolds) are skipped; lengths are a lookup table, not a
/// map input, so their presence is expected rather than fatal.
pub fn read_seqlens<P: AsRef<Path>>(
    path: P,
) -> Result<IndexMap<Chrom, Position>, GridMapError> {
    let input = InputFile::new(path);
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_reader(input.reader()?);

    #[derive(Debug, Serialize, Deserialize)]
    struct SeqLenEntry {
        chrom: String,
        length: Position,
    }

    let mut seqlens = IndexMap::new();
    for result in rdr.deserialize() {
        let entry: SeqLenEntry = result?;
        if let Ok(chrom) = entry.chrom.parse::<Chrom>() {
            seqlens.insert(chrom, entry.length);
        }
    }
    seqlens.sort_keys();
    Ok(seqlens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn toy_records() -> Vec<MapRecord> {
        vec![
            MapRecord::new(Chrom::C1, 1_000_000, 0.5),
            MapRecord::new(Chrom::C1, 2_000_000, 1.2),
            MapRecord::new(Chrom::C2, 500_000, 0.1),
            MapRecord::new(Chrom::X, 3_000_000, 2.0),
        ]
    }

    #[test]
    fn test_marker_id_convention() {
        assert_eq!(marker_id(Chrom::C3, 1_234_567), "3_1234567");
        assert_eq!(marker_id(Chrom::X, 10), "X_10");
    }

    #[test]
    fn test_split_join_roundtrip_is_exact() {
        let records = toy_records();
        let split_map = split(&records, ValueColumn::PosBp);
        let rows = join_checked(&split_map, records.len()).unwrap();
        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(records.iter()) {
            assert_eq!(row.0, record.chrom);
            assert_eq!(row.1, record.marker);
            assert_eq!(row.2, record.pos_bp as f64);
        }
    }

    #[test]
    fn test_split_join_interleaved_regroups() {
        // not chromosome-contiguous: chr1 rows straddle a chr2 row
        let records = vec![
            MapRecord::new(Chrom::C1, 1_000_000, 0.5),
            MapRecord::new(Chrom::C2, 500_000, 0.1),
            MapRecord::new(Chrom::C1, 2_000_000, 1.2),
        ];
        let rows = join_checked(&split(&records, ValueColumn::PosBp), records.len()).unwrap();
        // every row survives, grouped at each chromosome's first
        // occurrence rather than in the interleaved order
        let chroms: Vec<Chrom> = rows.iter().map(|r| r.0).collect();
        assert_eq!(chroms, vec![Chrom::C1, Chrom::C1, Chrom::C2]);
        assert_eq!(rows[1].1, "1_2000000");
    }

    #[test]
    fn test_split_skips_missing_sex_values() {
        let mut records = toy_records();
        records[0].cm_male = Some(0.4);
        records[1].cm_male = Some(1.0);
        let split_map = split(&records, ValueColumn::CmMale);
        assert_eq!(split_map.len(), 1);
        assert_eq!(split_map[&Chrom::C1].len(), 2);
        // rejoining against the full row count must fail
        let err = join_checked(&split_map, records.len()).unwrap_err();
        assert!(matches!(err, GridMapError::RowCountMismatch { .. }));
    }

    #[test]
    fn test_check_sorted_detects_inversion() {
        let records = vec![
            MapRecord::new(Chrom::C4, 2_000_000, 1.0),
            MapRecord::new(Chrom::C4, 1_500_000, 1.1),
        ];
        let err = check_sorted(&records).unwrap_err();
        assert!(matches!(err, GridMapError::NotSorted(Chrom::C4, 1_500_000)));
    }

    #[test]
    fn test_check_cm_sorted_detects_inverted_marker() {
        // bp order is fine; the cM values say the second marker is
        // inverted relative to the assembly
        let records = vec![
            MapRecord::new(Chrom::C4, 1_000_000, 2.0),
            MapRecord::new(Chrom::C4, 1_500_000, 1.4),
            MapRecord::new(Chrom::C4, 2_000_000, 3.0),
        ];
        assert!(check_sorted(&records).is_ok());
        let err = check_cm_sorted(&records).unwrap_err();
        assert!(matches!(err, GridMapError::NotSorted(Chrom::C4, 1_500_000)));
    }

    #[test]
    fn test_check_cm_sorted_covers_sex_columns() {
        let mut a = MapRecord::new(Chrom::C2, 1_000_000, 1.0);
        a.cm_female = Some(5.0);
        let mut b = MapRecord::new(Chrom::C2, 2_000_000, 2.0);
        b.cm_female = Some(4.0);
        let records = vec![a, b];
        let err = check_cm_sorted(&records).unwrap_err();
        assert!(matches!(err, GridMapError::NotSorted(Chrom::C2, 2_000_000)));
    }

    #[test]
    fn test_check_cm_sorted_allows_plateaus() {
        // equal adjacent cM is legitimate where recombination is
        // suppressed
        let records = vec![
            MapRecord::new(Chrom::C1, 1_000_000, 1.0),
            MapRecord::new(Chrom::C1, 2_000_000, 1.0),
            MapRecord::new(Chrom::C1, 3_000_000, 1.5),
        ];
        assert!(check_cm_sorted(&records).is_ok());
    }

    #[test]
    fn test_drop_known_inversions_is_surgical() {
        let records = vec![
            MapRecord::new(Chrom::C4, 1_000_000, 0.2),
            MapRecord::new(Chrom::C4, CHR4_INVERTED_BP, 55.0),
            MapRecord::new(Chrom::C5, CHR4_INVERTED_BP, 60.0),
        ];
        let kept = drop_known_inversions(records);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.chrom != Chrom::C4 || r.pos_bp != CHR4_INVERTED_BP));
        // the same position on another chromosome is untouched
        assert!(kept.iter().any(|r| r.chrom == Chrom::C5));
    }

    #[test]
    fn test_merge_sex_maps_male_x_missing() {
        let average = vec![
            MapRecord::new(Chrom::C1, 1_000_000, 0.5),
            MapRecord::new(Chrom::X, 2_000_000, 1.0),
        ];
        let female = vec![
            MapRecord::new(Chrom::C1, 1_000_000, 0.6),
            MapRecord::new(Chrom::X, 2_000_000, 1.1),
        ];
        let male = vec![MapRecord::new(Chrom::C1, 1_000_000, 0.4)];
        let merged = merge_sex_maps(average, &female, &male);
        assert_eq!(merged[0].cm_male, Some(0.4));
        assert_eq!(merged[0].cm_female, Some(0.6));
        assert_eq!(merged[1].cm_male, None);
        assert_eq!(merged[1].cm_female, Some(1.1));
    }

    #[test]
    fn test_load_sex_map_recode_and_scale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "chr,pos,cM").unwrap();
        writeln!(f, "1,3.5,1.25").unwrap();
        writeln!(f, "20,10.0,4.0").unwrap();
        drop(f);

        let records = load_sex_map(&path, PositionScale::Mbp).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pos_bp, 3_500_000);
        assert_eq!(records[0].marker, "1_3500000");
        assert_eq!(records[1].chrom, Chrom::X);
        assert_eq!(records[1].pos_bp, 10_000_000);
    }

    #[test]
    fn test_load_sex_map_rejects_unknown_chrom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "chr,pos,cM").unwrap();
        writeln!(f, "Y,3.5,1.25").unwrap();
        drop(f);

        let err = load_sex_map(&path, PositionScale::Mbp).unwrap_err();
        assert!(matches!(err, GridMapError::UnknownChrom(_)));
    }

    #[test]
    fn test_tsv_roundtrip_preserves_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.tsv");

        let mut record = MapRecord::new(Chrom::X, 2_000_000, 1.0);
        record.cm_female = Some(1.5);
        let map = GeneticMap::new(vec![record]);
        map.write_tsv(Some(&path)).unwrap();

        let reloaded = GeneticMap::from_tsv(&path).unwrap();
        assert_eq!(reloaded.records.len(), 1);
        assert_eq!(reloaded.records[0].cm_female, Some(1.5));
        assert_eq!(reloaded.records[0].cm_male, None);
        assert_eq!(reloaded.records[0].marker, "X_2000000");
    }

    #[test]
    fn test_read_seqlens_skips_extra_sequences() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chrom.sizes");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "chr1\t195471971").unwrap();
        writeln!(f, "chrX\t171031299").unwrap();
        writeln!(f, "chrY\t91744698").unwrap();
        writeln!(f, "chrM\t16299").unwrap();
        drop(f);

        let seqlens = read_seqlens(&path).unwrap();
        assert_eq!(seqlens.len(), 2);
        assert_eq!(seqlens[&Chrom::C1], 195_471_971);
        assert_eq!(seqlens[&Chrom::X], 171_031_299);
    }

    #[test]
    fn test_format_float_trims() {
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(2.0), "2");
        assert_eq!(format_float(0.123456789), "0.123457");
    }

    #[test]
    fn test_interpolate_cm_array() {
        let map = GeneticMap::new(vec![
            MapRecord::new(Chrom::C1, 0, 0.0),
            MapRecord::new(Chrom::C1, 2_000_000, 4.0),
        ]);
        let out = map.interpolate_cm(Chrom::C1, &[1_000_000, 3_000_000]).unwrap();
        assert_eq!(out.len(), 2);
        crate::numeric::assert_float_eq(out[0], 2.0, 1e-12);
        crate::numeric::assert_float_eq(out[1], 6.0, 1e-12);
    }
}
