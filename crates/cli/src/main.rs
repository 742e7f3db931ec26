//! rowdedup CLI
//!
//! Linear-time, order-preserving deduplication of fixed-width binary records

mod config;
mod io;
mod report;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use rowdedup_core::memory::{format_bytes, DedupFootprint};
use rowdedup_core::{unique, RecordView};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{InputConfig, JobConfig, OutputConfig};
use report::RunSummary;

#[derive(Parser)]
#[command(name = "rowdedup")]
#[command(version, about = "Linear-time deduplication of fixed-width binary records", long_about = None)]
#[command(author = "rowdedup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output statistics in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the unique records (or sub-arrays along an axis) of a binary file
    Unique {
        /// Input file of raw records
        #[arg(short, long)]
        input: PathBuf,

        /// Bytes per record (flat record file)
        #[arg(short, long, conflicts_with = "shape")]
        stride: Option<usize>,

        /// Array shape, outermost first (e.g. 1000,16)
        #[arg(long, value_delimiter = ',')]
        shape: Option<Vec<usize>>,

        /// Bytes per array item when --shape is given
        #[arg(long, default_value = "1")]
        item_size: usize,

        /// Axis along which sub-arrays are compared
        #[arg(short, long, default_value = "0")]
        axis: usize,

        /// Write the unique records here (raw bytes)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write first-occurrence positions here (little-endian u64)
        #[arg(long)]
        index: Option<PathBuf>,

        /// Write the group rank of every record here (little-endian u64)
        #[arg(long)]
        inverse: Option<PathBuf>,

        /// Write the population of every group here (little-endian u64)
        #[arg(long)]
        counts: Option<PathBuf>,

        /// Hash records on all cores
        #[arg(short, long)]
        parallel: bool,

        /// Save this invocation as a job file (YAML or TOML) and exit
        #[arg(long, value_name = "FILE")]
        write_config: Option<PathBuf>,

        /// Show the layout and memory estimate without deduplicating
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a job described in a YAML or TOML file
    Run {
        /// Job file
        #[arg(short, long)]
        config: PathBuf,

        /// Show the layout and memory estimate without deduplicating
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the first records of a file as hex
    Inspect {
        /// Path to the record file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Bytes per record
        #[arg(short, long)]
        stride: usize,

        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Bytes per hex group
        #[arg(short, long, default_value = "4")]
        group: usize,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.json) // Disable colors if JSON output
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Unique {
            input,
            stride,
            shape,
            item_size,
            axis,
            output,
            index,
            inverse,
            counts,
            parallel,
            write_config,
            dry_run,
        } => {
            let path_string = |p: Option<PathBuf>| p.map(|p| p.to_string_lossy().to_string());
            let mut job = JobConfig {
                input: InputConfig {
                    path: input.to_string_lossy().to_string(),
                    stride,
                    item_size: shape.as_ref().map(|_| item_size),
                    shape,
                },
                output: OutputConfig {
                    values: path_string(output),
                    index: path_string(index),
                    inverse: path_string(inverse),
                    counts: path_string(counts),
                },
                options: Default::default(),
            };
            job.options.axis = axis;
            job.options.parallel = parallel;

            if let Some(path) = write_config {
                job.save(&path)?;
                info!("Saved job to {}", path.display());
                return Ok(());
            }
            run_job(&job, dry_run, cli.json)?;
        }
        Commands::Run { config, dry_run } => {
            let job = JobConfig::load(&config)?;
            info!("Loaded job from {}", config.display());
            run_job(&job, dry_run, cli.json)?;
        }
        Commands::Inspect {
            input,
            stride,
            limit,
            group,
        } => {
            inspect_records(&input, stride, limit, group)?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Execute one job: read, deduplicate, write the requested outputs, report
fn run_job(job: &JobConfig, dry_run: bool, json_output: bool) -> Result<()> {
    let input = Path::new(&job.input.path);
    let options = job.unique_options();

    info!("Starting deduplication");
    info!("  Input: {:?}", input);
    info!("  Axis: {}", options.axis);
    info!("  Parallel: {}", options.parallel);

    let data = io::read_records(input)?;
    let layout = job.input.layout(data.len())?;
    if options.axis >= layout.ndim() {
        bail!(
            "Axis {} is out of bounds for shape {:?}",
            options.axis,
            layout.shape
        );
    }
    info!("  Shape: {:?} ({})", layout.shape, format_bytes(data.len()));

    let requested = [
        options.return_index,
        options.return_inverse,
        options.return_counts,
    ]
    .iter()
    .filter(|&&r| r)
    .count();
    let footprint = DedupFootprint::estimate(
        layout.shape[options.axis],
        // The index buffer is always allocated by the front-end
        requested + usize::from(!options.return_index),
        options.parallel,
    );
    debug!("Estimated working memory: {:?}", footprint);

    if dry_run {
        let summary = RunSummary {
            input,
            shape: &layout.shape,
            axis: options.axis,
            stats: None,
            footprint,
            written: Vec::new(),
        };
        emit(&summary, json_output)?;
        return Ok(());
    }

    let result = unique(&data, &layout, &options)?;

    let mut written = Vec::new();
    if let Some(path) = &job.output.values {
        io::write_bytes(Path::new(path), &result.values)?;
        written.push(path.as_str());
    }
    let arrays = [
        (&job.output.index, &result.index),
        (&job.output.inverse, &result.inverse),
        (&job.output.counts, &result.counts),
    ];
    for (path, values) in arrays {
        if let (Some(path), Some(values)) = (path, values) {
            io::write_u64_le(Path::new(path), values)?;
            written.push(path.as_str());
        }
    }

    let summary = RunSummary {
        input,
        shape: &result.layout.shape,
        axis: options.axis,
        stats: Some(&result.stats),
        footprint,
        written,
    };
    emit(&summary, json_output)
}

fn emit(summary: &RunSummary<'_>, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
    } else {
        summary.print();
    }
    Ok(())
}

fn inspect_records(input: &Path, stride: usize, limit: usize, group: usize) -> Result<()> {
    let data = io::read_records(input)?;
    let records = RecordView::from_bytes(&data, stride)?;

    println!(
        "{}: {} records of {} bytes",
        input.display(),
        records.len(),
        stride
    );
    for (i, record) in records.iter().take(limit).enumerate() {
        println!("{:>8}  {}", i, io::hex_record(record, group));
    }
    if records.len() > limit {
        println!("     ...  ({} more)", records.len() - limit);
    }
    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read_u64s(path: &Path) -> Vec<u64> {
        std::fs::read(path)
            .unwrap()
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }

    fn job_in(dir: &Path, data: &[u8], input: InputConfig) -> JobConfig {
        std::fs::write(&input.path, data).unwrap();
        let out = |name: &str| Some(dir.join(name).to_string_lossy().to_string());
        JobConfig {
            input,
            output: OutputConfig {
                values: out("unique.bin"),
                index: out("index.bin"),
                inverse: out("inverse.bin"),
                counts: out("counts.bin"),
            },
            options: Default::default(),
        }
    }

    #[test]
    fn test_run_job_flat_records() {
        let dir = tempdir().unwrap();
        let input = InputConfig {
            path: dir.path().join("rows.bin").to_string_lossy().to_string(),
            stride: Some(4),
            shape: None,
            item_size: None,
        };
        let job = job_in(dir.path(), b"AAAABBBBAAAACCCCBBBB", input);

        run_job(&job, false, true).unwrap();

        let values = std::fs::read(dir.path().join("unique.bin")).unwrap();
        assert_eq!(values, b"AAAABBBBCCCC");
        assert_eq!(read_u64s(&dir.path().join("index.bin")), vec![0, 1, 3]);
        assert_eq!(read_u64s(&dir.path().join("inverse.bin")), vec![0, 1, 0, 2, 1]);
        assert_eq!(read_u64s(&dir.path().join("counts.bin")), vec![2, 2, 1]);
    }

    #[test]
    fn test_run_job_columns() {
        let dir = tempdir().unwrap();
        let input = InputConfig {
            path: dir.path().join("matrix.bin").to_string_lossy().to_string(),
            stride: None,
            shape: Some(vec![2, 4]),
            item_size: Some(1),
        };
        let mut job = job_in(dir.path(), b"ababcdcd", input);
        job.options.axis = 1;

        run_job(&job, false, true).unwrap();

        let values = std::fs::read(dir.path().join("unique.bin")).unwrap();
        assert_eq!(values, b"abcd");
        assert_eq!(read_u64s(&dir.path().join("inverse.bin")), vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = InputConfig {
            path: dir.path().join("rows.bin").to_string_lossy().to_string(),
            stride: Some(2),
            shape: None,
            item_size: None,
        };
        let job = job_in(dir.path(), b"aabbaa", input);

        run_job(&job, true, true).unwrap();
        assert!(!dir.path().join("unique.bin").exists());
    }

    #[test]
    fn test_bad_axis_rejected() {
        let dir = tempdir().unwrap();
        let input = InputConfig {
            path: dir.path().join("rows.bin").to_string_lossy().to_string(),
            stride: Some(2),
            shape: None,
            item_size: None,
        };
        let mut job = job_in(dir.path(), b"aabb", input);
        job.options.axis = 5;
        assert!(run_job(&job, false, true).is_err());
    }

    #[test]
    fn test_cli_parses_shape() {
        let cli = Cli::try_parse_from([
            "rowdedup",
            "unique",
            "-i",
            "in.bin",
            "--shape",
            "10,4",
            "--item-size",
            "8",
            "--axis",
            "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Unique {
                shape, item_size, axis, ..
            } => {
                assert_eq!(shape, Some(vec![10, 4]));
                assert_eq!(item_size, 8);
                assert_eq!(axis, 1);
            }
            _ => panic!("expected unique subcommand"),
        }
    }

    #[test]
    fn test_cli_rejects_stride_with_shape() {
        let result = Cli::try_parse_from([
            "rowdedup", "unique", "-i", "in.bin", "--stride", "4", "--shape", "2,2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
