use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use gridmap::fetch::fetch_cached;
use gridmap::prelude::*;

const INFO: &str = "\
gridmap: rebase the mouse genetic map and build a cM-uniform marker grid
usage: gridmap [--help] <subcommand>

Subcommands:

  run:    fetch inputs, rebuild the shifted map, grid, and annotations.
  interp: interpolate genetic positions for arbitrary physical positions.

";

// Published inputs. Files already present in the cache directory are
// not re-fetched.
const LIU_AVERAGE_URL: &str =
    "https://phenome.jax.org/grpdoc/Liu1/liu2014_map_average.csv";
const LIU_FEMALE_URL: &str = "https://phenome.jax.org/grpdoc/Liu1/liu2014_map_female.csv";
const LIU_MALE_URL: &str = "https://phenome.jax.org/grpdoc/Liu1/liu2014_map_male.csv";
const SEQLENS_URL: &str =
    "https://hgdownload.soe.ucsc.edu/goldenPath/mm10/bigZips/mm10.chrom.sizes";
const GIGAMUGA_URL: &str =
    "https://raw.githubusercontent.com/kbroman/MUGAarrays/main/UWisc/gm_uwisc_v1.csv";
const MEGAMUGA_URL: &str =
    "https://raw.githubusercontent.com/kbroman/MUGAarrays/main/UWisc/mm_uwisc_v1.csv";

#[derive(Parser)]
#[clap(name = "gridmap")]
#[clap(about = INFO)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: fetch inputs, rebase and shift the map,
    /// build the base and densified grids, annotate the arrays, and
    /// recompute gene grid indices.
    ///
    /// Steps are strictly sequential; if one fails, no downstream
    /// output is written.
    Run {
        /// directory for downloaded inputs (reused across runs)
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
        /// directory for output tables
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
        /// genetic spacing of the grid, in cM
        #[arg(long, default_value_t = DEFAULT_STEP_CM)]
        step_cm: f64,
        /// maximum physical gap between grid points before
        /// pseudomarkers are inserted, in bp
        #[arg(long, default_value_t = DEFAULT_MAX_GAP_BP)]
        max_gap_bp: u64,
        /// liftOver output (chr:start-end lines, one per averaged-map
        /// row) rebasing the map onto GRCm38; without it the map is
        /// assumed to be on GRCm38 already
        #[arg(long)]
        liftover: Option<PathBuf>,
        /// gene annotation TSV whose nearest-grid indices should be
        /// recomputed
        #[arg(long)]
        genes: Option<PathBuf>,
    },
    /// Interpolate sex-averaged, female, and male genetic positions for
    /// a TSV of chromosome and basepair columns, against a shifted map
    /// produced by `run`.
    Interp {
        /// the shifted map TSV written by `run`
        #[arg(long, required = true)]
        map: PathBuf,
        /// a TSV of chromosome, position(bp) rows to interpolate at
        #[arg(required = true)]
        positions: PathBuf,
        /// the output path (standard out if not set)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn fetch_inputs(cache_dir: &Path) -> Result<[PathBuf; 6], GridMapError> {
    let inputs = [
        (LIU_AVERAGE_URL, "liu2014_map_average.csv"),
        (LIU_FEMALE_URL, "liu2014_map_female.csv"),
        (LIU_MALE_URL, "liu2014_map_male.csv"),
        (SEQLENS_URL, "mm10.chrom.sizes"),
        (GIGAMUGA_URL, "gm_uwisc_v1.csv"),
        (MEGAMUGA_URL, "mm_uwisc_v1.csv"),
    ];
    let mut paths: [PathBuf; 6] = Default::default();
    for (slot, (url, name)) in paths.iter_mut().zip(inputs) {
        let dest = cache_dir.join(name);
        if fetch_cached(url, &dest)? {
            eprintln!("fetched {}", name);
        } else {
            eprintln!("cached  {}", name);
        }
        *slot = dest;
    }
    Ok(paths)
}

fn run_pipeline(
    cache_dir: &Path,
    out_dir: &Path,
    step_cm: f64,
    max_gap_bp: u64,
    liftover: Option<&Path>,
    genes: Option<&Path>,
) -> Result<(), GridMapError> {
    fs::create_dir_all(out_dir)?;
    let [avg_path, female_path, male_path, seqlens_path, gigamuga_path, megamuga_path] =
        fetch_inputs(cache_dir)?;

    let seqlens = read_seqlens(&seqlens_path)?;

    // The published revision stores Mbp-scaled positions.
    let average = load_sex_map(&avg_path, PositionScale::Mbp)?;
    let female = load_sex_map(&female_path, PositionScale::Mbp)?;
    let male = load_sex_map(&male_path, PositionScale::Mbp)?;
    eprintln!(
        "loaded maps: {} average, {} female, {} male markers",
        average.len(),
        female.len(),
        male.len()
    );

    // the chr4 inversion lives on the female map only
    let female = drop_known_inversions(female);
    let mut map = GeneticMap::new(merge_sex_maps(average, &female, &male));

    if let Some(liftover_path) = liftover {
        let lifted = read_liftover(liftover_path)?;
        map = rebase(map, &lifted)?;
        map.sort();
        eprintln!("rebased {} markers onto GRCm38", map.len());
    }
    check_sorted(&map.records)?;
    // position sorting after rebasing cannot hide an inverted marker:
    // its cM values would now decrease along the chromosome
    check_cm_sorted(&map.records)?;

    let shifted = anchor_and_shift(map, &seqlens)?;
    shifted.write_tsv(Some(&out_dir.join("liu_map_shifted.tsv")))?;
    eprintln!("wrote shifted map ({} rows)", shifted.len());

    let grid = Grid::build(&shifted, step_cm)?;
    grid.write_tsv(Some(&out_dir.join("grid.tsv")))?;
    let dense = grid.densify(max_gap_bp)?;
    dense.write_tsv(Some(&out_dir.join("grid_plus.tsv")))?;
    eprintln!(
        "wrote grid ({} points) and densified grid ({} points)",
        grid.len(),
        dense.len()
    );

    for (array_path, out_name) in [
        (&gigamuga_path, "gigamuga_cm.tsv"),
        (&megamuga_path, "megamuga_cm.tsv"),
    ] {
        let markers = load_array_markers(array_path, PositionScale::Bp)?;
        let annotated = annotate(&markers, &shifted)?;
        write_annotated(&annotated, Some(&out_dir.join(out_name)))?;
        eprintln!("wrote {} ({} markers)", out_name, annotated.len());
    }

    if let Some(genes_path) = genes {
        let mut gene_rows = load_genes(genes_path)?;
        assign_grid_indices(&mut gene_rows, &dense.index());
        write_genes(&gene_rows, Some(&out_dir.join("genes_grid_index.tsv")))?;
        eprintln!("wrote gene grid indices ({} genes)", gene_rows.len());
    }

    Ok(())
}

fn interp_positions(
    map_path: &Path,
    positions_path: &Path,
    output: Option<&Path>,
) -> Result<(), GridMapError> {
    let map = GeneticMap::from_tsv(map_path)?;

    let input = gridmap::file::InputFile::new(positions_path);
    let mut markers = Vec::new();
    for line in input.lines()? {
        if line.starts_with('#') || line.starts_with("chr\t") {
            continue;
        }
        let mut fields = line.split_whitespace();
        let chrom = fields
            .next()
            .ok_or_else(|| GridMapError::Parse(format!("chromosome from '{}'", line)))?;
        let pos: Position = fields
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| GridMapError::Parse(format!("position from '{}'", line)))?;
        markers.push(gridmap::arrays::ArrayMarker {
            marker: format!("{}_{}", chrom, pos),
            chrom: chrom.to_string(),
            pos_bp: pos,
        });
    }

    let annotated = annotate(&markers, &map)?;
    write_annotated(&annotated, output)?;
    Ok(())
}

fn run() -> Result<(), GridMapError> {
    let cli = Cli::parse();
    match &cli.command {
        Some(Commands::Run {
            cache_dir,
            out_dir,
            step_cm,
            max_gap_bp,
            liftover,
            genes,
        }) => run_pipeline(
            cache_dir,
            out_dir,
            *step_cm,
            *max_gap_bp,
            liftover.as_deref(),
            genes.as_deref(),
        ),
        Some(Commands::Interp {
            map,
            positions,
            output,
        }) => interp_positions(map, positions, output.as_deref()),
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    }
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
