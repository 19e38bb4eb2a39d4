//! LOFT: Line OFfset Table
//!
//! Usage: loft <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use loft::commands::{FetchCommand, GenerateCommand, GenerateConfig, IndexCommand, VerifyCommand};
use loft::config::{parse_size, IndexConfig};
use loft::streaming::buffers::{index_capacity, DEFAULT_CHUNK_SIZE};
use loft::LoftError;

#[derive(Parser)]
#[command(name = "loft")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "LOFT: Line OFfset Table - byte-offset record indexes for large line-oriented files", long_about = None)]
struct Cli {
    /// Log pipeline state changes and flushes to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a comma-separated byte-offset index of record starts
    Index {
        /// Input file to scan (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output index file, truncated if it exists (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Bytes read per I/O call (e.g. 4096, 200K, 0x32000)
        #[arg(long, value_parser = parse_size, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Bytes of offset text held in memory between flushes
        #[arg(long, value_parser = parse_size)]
        buffer_size: Option<usize>,

        /// Use a small index buffer
        #[arg(long)]
        low_memory: bool,

        /// Memory-map the input instead of reading it
        #[arg(long)]
        mmap: bool,

        /// Print indexing statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Print records by number using an offset index
    Fetch {
        /// Indexed input file
        #[arg(short, long)]
        input: PathBuf,

        /// Offset index built by `loft index`
        #[arg(short = 'x', long)]
        index: PathBuf,

        /// First record to print (0-based)
        #[arg(short, long)]
        record: u64,

        /// Number of records to print
        #[arg(short = 'n', long, default_value = "1")]
        count: u64,
    },

    /// Check that an offset index matches its input
    Verify {
        /// Indexed input file
        #[arg(short, long)]
        input: PathBuf,

        /// Offset index built by `loft index`
        #[arg(short = 'x', long)]
        index: PathBuf,

        /// Bytes read per I/O call for the re-scan
        #[arg(long, value_parser = parse_size, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },

    /// Generate a synthetic VCF file for benchmarking
    Generate {
        /// Output VCF file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of records (e.g. 1000, 10K, 5M)
        #[arg(short = 'n', long, default_value = "100K")]
        records: String,

        /// Number of sample columns
        #[arg(long, default_value = "10")]
        samples: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Print generation statistics to stderr
        #[arg(long)]
        stats: bool,
    },
}

/// Usage errors share the invalid-configuration status so that 2 stays
/// reserved for an unreadable input.
const USAGE_EXIT_CODE: i32 = 1;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(USAGE_EXIT_CODE);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Index {
            input,
            output,
            chunk_size,
            buffer_size,
            low_memory,
            mmap,
            stats,
        } => run_index(
            input,
            output,
            chunk_size,
            buffer_size,
            low_memory,
            mmap,
            stats,
        ),

        Commands::Fetch {
            input,
            index,
            record,
            count,
        } => run_fetch(input, index, record, count),

        Commands::Verify {
            input,
            index,
            chunk_size,
        } => run_verify(input, index, chunk_size),

        Commands::Generate {
            output,
            records,
            samples,
            seed,
            stats,
        } => run_generate(output, records, samples, seed, stats),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run_index(
    input: PathBuf,
    output: PathBuf,
    chunk_size: usize,
    buffer_size: Option<usize>,
    low_memory: bool,
    mmap: bool,
    stats: bool,
) -> Result<(), LoftError> {
    let config = IndexConfig::new(input, output)
        .with_chunk_size(chunk_size)
        .with_buffer_capacity(buffer_size.unwrap_or(index_capacity(low_memory)))
        .with_mmap(mmap);

    let result = IndexCommand::run_config(&config)?;

    if stats {
        eprintln!("Index stats: {}", result);
    }

    Ok(())
}

fn run_fetch(input: PathBuf, index: PathBuf, record: u64, count: u64) -> Result<(), LoftError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    FetchCommand::new()
        .with_record(record)
        .with_count(count)
        .run(&input, &index, &mut handle)?;

    Ok(())
}

fn run_verify(input: PathBuf, index: PathBuf, chunk_size: usize) -> Result<(), LoftError> {
    let cmd = VerifyCommand::new().with_index_command(IndexCommand::new().with_chunk_size(chunk_size));
    let checked = cmd.run(&input, &index)?;
    println!("OK: {} offsets", checked);
    Ok(())
}

fn run_generate(
    output: PathBuf,
    records: String,
    samples: usize,
    seed: u64,
    stats: bool,
) -> Result<(), LoftError> {
    use loft::commands::generate::parse_count;

    let records = parse_count(&records).ok_or_else(|| {
        LoftError::InvalidConfig(format!(
            "Invalid record count '{}'. Use formats like 1K, 5M, 100",
            records
        ))
    })?;

    let config = GenerateConfig {
        output,
        records,
        samples,
        seed,
        ..Default::default()
    };

    let result = GenerateCommand::new(config).run()?;

    if stats {
        eprintln!("Generate stats: {}", result);
    }

    Ok(())
}
