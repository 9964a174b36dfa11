//! Gene annotations and their nearest-grid-point indices.
//!
//! Downstream consumers index genomic neighborhoods by the grid row
//! nearest a gene's midpoint. When the grid is rebuilt, every stored
//! index is stale; this module recomputes them all against the new grid
//! and overwrites the old values.

use csv::ReaderBuilder;
use std::io::{self, Write};
use std::path::Path;

use crate::file::{InputFile, OutputFile};
use crate::grid::GridIndex;
use crate::map::{GridMapError, Position};

/// One gene annotation row. The chromosome stays a raw label: gene
/// tables legitimately include Y and MT entries, which simply get no
/// grid index.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneAnnotation {
    pub name: String,
    pub chrom: String,
    pub start_bp: Position,
    pub end_bp: Position,
    pub grid_index: Option<usize>,
}

impl GeneAnnotation {
    /// Physical midpoint of the gene body.
    pub fn midpoint(&self) -> Position {
        self.start_bp + (self.end_bp - self.start_bp) / 2
    }
}

/// Read a gene annotation TSV with `name`, `chr`, `start`, `end`
/// columns. Any previously stored grid index column is ignored; it is
/// about to be recomputed anyway.
pub fn load_genes<P: AsRef<Path>>(path: P) -> Result<Vec<GeneAnnotation>, GridMapError> {
    let input = InputFile::new(path);
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(input.reader()?);

    let headers = rdr.headers()?.clone();
    let name_col = column(&headers, &["name", "gene", "symbol"])?;
    let chrom_col = column(&headers, &["chr", "chrom", "chromosome"])?;
    let start_col = column(&headers, &["start", "start_bp"])?;
    let end_col = column(&headers, &["end", "end_bp", "stop"])?;

    let mut genes = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let parse_bp = |idx: usize| -> Result<Position, GridMapError> {
            row[idx]
                .trim()
                .parse()
                .map_err(|_| GridMapError::Parse(format!("gene position from '{}'", &row[idx])))
        };
        let start_bp = parse_bp(start_col)?;
        let end_bp = parse_bp(end_col)?;
        if end_bp < start_bp {
            return Err(GridMapError::Parse(format!(
                "gene '{}' ends at {} bp, before its start at {} bp",
                row[name_col].trim(),
                end_bp,
                start_bp
            )));
        }
        genes.push(GeneAnnotation {
            name: row[name_col].trim().to_string(),
            chrom: row[chrom_col].trim().to_string(),
            start_bp,
            end_bp,
            grid_index: None,
        });
    }
    Ok(genes)
}

fn column(headers: &csv::StringRecord, candidates: &[&str]) -> Result<usize, GridMapError> {
    for (idx, header) in headers.iter().enumerate() {
        if candidates.iter().any(|c| header.trim().eq_ignore_ascii_case(c)) {
            return Ok(idx);
        }
    }
    Err(GridMapError::MissingColumn(candidates[0].to_string()))
}

/// Recompute every gene's nearest-grid-row index from its midpoint,
/// overwriting whatever was stored before.
pub fn assign_grid_indices(genes: &mut [GeneAnnotation], index: &GridIndex) {
    for gene in genes {
        gene.grid_index = index.nearest(&gene.chrom, gene.midpoint());
    }
}

/// Write the gene table with its recomputed indices; genes off the grid
/// chromosomes get `NA`.
pub fn write_genes(genes: &[GeneAnnotation], filepath: Option<&Path>) -> Result<(), GridMapError> {
    let mut writer: Box<dyn Write> = match filepath {
        Some(path) => OutputFile::new(path).writer()?,
        None => Box::new(io::stdout()),
    };
    writeln!(writer, "name\tchr\tstart\tend\tmidpoint\tgrid_index")?;
    for g in genes {
        let idx = g
            .grid_index
            .map(|i| i.to_string())
            .unwrap_or_else(|| "NA".to_string());
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            g.name,
            g.chrom,
            g.start_bp,
            g.end_bp,
            g.midpoint(),
            idx,
        )?;
    }
    Ok(())
}
