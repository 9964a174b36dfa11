//! Genetic-position annotation of the genotyping-array marker sets.
//!
//! The GigaMUGA and MegaMUGA manifests carry a chromosome and a physical
//! position per marker but no genetic position. Markers are grouped by
//! their raw chromosome label, each group is interpolated against the
//! shifted map (Y/MT/unplaced labels resolve to missing rather than
//! erroring), and the groups are scattered back into the manifest's
//! original row order.

use csv::ReaderBuilder;
use indexmap::IndexMap;
use std::io::{self, Write};
use std::path::Path;

use crate::file::{InputFile, OutputFile};
use crate::interp::{interpolate_split, series};
use crate::map::{
    format_float, GeneticMap, GridMapError, Position, PositionScale, ValueColumn, MBP,
};

/// One marker from an array manifest. The chromosome is kept as the raw
/// label because manifests list Y, MT, and unplaced markers too.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMarker {
    pub marker: String,
    pub chrom: String,
    pub pos_bp: Position,
}

/// An array marker with its interpolated genetic positions. All three
/// columns are missing for markers off the mapped chromosomes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedMarker {
    pub marker: String,
    pub chrom: String,
    pub pos_bp: Position,
    pub pos_mbp: f64,
    pub cm: Option<f64>,
    pub cm_female: Option<f64>,
    pub cm_male: Option<f64>,
}

/// Read an array manifest CSV (marker name, chromosome, physical
/// position columns). `scale` states the unit of the position column.
pub fn load_array_markers<P: AsRef<Path>>(
    path: P,
    scale: PositionScale,
) -> Result<Vec<ArrayMarker>, GridMapError> {
    let input = InputFile::new(path);
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(input.reader()?);

    let headers = rdr.headers()?.clone();
    let marker_col = find(&headers, &["marker", "snp", "name", "id"])?;
    let chrom_col = find(&headers, &["chr", "chrom", "chromosome"])?;
    let pos_col = find(&headers, &["pos", "bp", "mbp", "position", "bp_mm10"])?;

    let mut markers = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let pos_raw: f64 = row[pos_col].trim().parse().map_err(|_| {
            GridMapError::Parse(format!("array position from '{}'", &row[pos_col]))
        })?;
        markers.push(ArrayMarker {
            marker: row[marker_col].trim().to_string(),
            chrom: row[chrom_col].trim().to_string(),
            pos_bp: scale.to_bp(pos_raw),
        });
    }
    Ok(markers)
}

fn find(headers: &csv::StringRecord, candidates: &[&str]) -> Result<usize, GridMapError> {
    for (idx, header) in headers.iter().enumerate() {
        if candidates.iter().any(|c| header.trim().eq_ignore_ascii_case(c)) {
            return Ok(idx);
        }
    }
    Err(GridMapError::MissingColumn(candidates[0].to_string()))
}

/// Interpolate the three genetic-position columns for every marker.
///
/// Grouping preserves manifest order within each chromosome, and the
/// scatter back verifies that every row was assigned exactly once.
pub fn annotate(
    markers: &[ArrayMarker],
    map: &GeneticMap,
) -> Result<Vec<AnnotatedMarker>, GridMapError> {
    // group target positions by raw chromosome label, remembering where
    // each row came from
    let mut targets: IndexMap<String, Vec<f64>> = IndexMap::new();
    let mut origins: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (row, m) in markers.iter().enumerate() {
        targets
            .entry(m.chrom.clone())
            .or_default()
            .push(m.pos_bp as f64);
        origins.entry(m.chrom.clone()).or_default().push(row);
    }

    let mut out: Vec<AnnotatedMarker> = markers
        .iter()
        .map(|m| AnnotatedMarker {
            marker: m.marker.clone(),
            chrom: m.chrom.clone(),
            pos_bp: m.pos_bp,
            pos_mbp: m.pos_bp as f64 / MBP,
            cm: None,
            cm_female: None,
            cm_male: None,
        })
        .collect();

    let columns: [(ValueColumn, fn(&mut AnnotatedMarker) -> &mut Option<f64>); 3] = [
        (ValueColumn::Cm, |m| &mut m.cm),
        (ValueColumn::CmFemale, |m| &mut m.cm_female),
        (ValueColumn::CmMale, |m| &mut m.cm_male),
    ];

    for (column, slot) in columns {
        let source = series(&map.records, ValueColumn::PosBp, column);
        let interpolated = interpolate_split(&source, &targets)?;
        let mut assigned = 0usize;
        for (label, values) in &interpolated {
            let rows = &origins[label];
            if rows.len() != values.len() {
                return Err(GridMapError::RowCountMismatch {
                    expected: rows.len(),
                    actual: values.len(),
                });
            }
            for (&row, &value) in rows.iter().zip(values) {
                *slot(&mut out[row]) = value;
                assigned += 1;
            }
        }
        if assigned != markers.len() {
            return Err(GridMapError::RowCountMismatch {
                expected: markers.len(),
                actual: assigned,
            });
        }
    }

    Ok(out)
}

/// Write annotated markers as TSV; missing genetic positions serialize
/// as `NA`.
pub fn write_annotated(
    rows: &[AnnotatedMarker],
    filepath: Option<&Path>,
) -> Result<(), GridMapError> {
    let mut writer: Box<dyn Write> = match filepath {
        Some(path) => OutputFile::new(path).writer()?,
        None => Box::new(io::stdout()),
    };
    writeln!(
        writer,
        "marker\tchr\tpos_mbp\tpos_bp\tcm\tcm_female\tcm_male"
    )?;
    for r in rows {
        let fmt = |v: Option<f64>| v.map(format_float).unwrap_or_else(|| "NA".to_string());
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.marker,
            r.chrom,
            format_float(r.pos_mbp),
            r.pos_bp,
            fmt(r.cm),
            fmt(r.cm_female),
            fmt(r.cm_male),
        )?;
    }
    Ok(())
}
