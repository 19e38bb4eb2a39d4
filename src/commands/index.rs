//! Build a byte-offset index of record boundaries.
//!
//! Pipeline: chunked reader -> terminator scan -> index buffer -> flusher.
//! Single pass, strictly sequential.
//!
//! Memory: O(chunk_size + buffer_capacity), independent of input size.
//!
//! Flushing is incremental. If a run fails after one or more flushes, the
//! offsets written so far stay in the output file; there is no rollback.

use crate::config::{is_stdio, IndexConfig};
use crate::error::{LoftError, Result};
use crate::streaming::buffers::{DEFAULT_CHUNK_SIZE, DEFAULT_INDEX_CAPACITY};
use crate::streaming::{scan_chunk, ChunkedReader, IndexBuffer, OffsetWriter};
use memmap2::Mmap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline states, logged at debug level as the run progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Scanning,
    Flushing,
    Draining,
    Done,
    Aborted,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Scanning => "scanning",
            Self::Flushing => "flushing",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Offset index command.
#[derive(Debug, Clone)]
pub struct IndexCommand {
    /// Bytes read per I/O call
    pub chunk_size: usize,
    /// Bytes of offset text buffered between flushes
    pub buffer_capacity: usize,
    /// File offset of the first input byte
    pub base_offset: u64,
    /// Memory-map file inputs instead of reading them
    pub use_mmap: bool,
}

impl Default for IndexCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexCommand {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_capacity: DEFAULT_INDEX_CAPACITY,
            base_offset: 0,
            use_mmap: false,
        }
    }

    /// Take sizes and read mode from a validated config.
    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            buffer_capacity: config.buffer_capacity,
            base_offset: 0,
            use_mmap: config.use_mmap,
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Start the running offset at `offset` instead of 0.
    ///
    /// Useful when the input is a byte range cut from a larger file and the
    /// index should be expressed in the larger file's coordinates.
    pub fn with_base_offset(mut self, offset: u64) -> Self {
        self.base_offset = offset;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Index `input` into `output`. Either may be `-` for stdin/stdout.
    ///
    /// The input is opened first so a missing input never creates or
    /// truncates the output. An output that names the input file is
    /// rejected before anything is truncated.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<IndexStats> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let source = self.open_source(input)?;
        ensure_distinct(input, output)?;
        let sink = open_output(output)?;
        self.run_source(source, sink)
    }

    /// Index `input` (a path or `-`) into an arbitrary writer.
    pub fn run_to<P: AsRef<Path>, W: Write>(&self, input: P, output: W) -> Result<IndexStats> {
        let source = self.open_source(input.as_ref())?;
        self.run_source(source, output)
    }

    fn open_source(&self, path: &Path) -> Result<Source> {
        if is_stdio(path) {
            return Ok(Source::Stdin);
        }

        let file = File::open(path).map_err(|source| LoftError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;

        if self.use_mmap {
            let len = file.metadata().map_err(LoftError::Read)?.len();
            if len > 0 {
                // SAFETY: the map is read-only and lives only for this run.
                // Truncating the input while it is being indexed is not
                // supported.
                let mmap = unsafe { Mmap::map(&file) }.map_err(LoftError::Read)?;
                return Ok(Source::Mapped(mmap));
            }
            warn!(path = %path.display(), "empty input, skipping mmap");
        }

        Ok(Source::File(file))
    }

    fn run_source<W: Write>(&self, source: Source, output: W) -> Result<IndexStats> {
        match source {
            Source::Stdin => self.run_reader(io::stdin().lock(), output),
            Source::File(file) => self.run_reader(file, output),
            Source::Mapped(mmap) => self.scan_slice(&mmap, output, true),
        }
    }

    /// Run the pipeline over a config's paths.
    pub fn run_config(config: &IndexConfig) -> Result<IndexStats> {
        Self::from_config(config)?.run(&config.input, &config.output)
    }

    /// Core loop: read chunks until a read returns 0 bytes.
    pub fn run_reader<R: Read, W: Write>(&self, reader: R, output: W) -> Result<IndexStats> {
        let result = ChunkedReader::new(reader, self.chunk_size).and_then(|mut reader| {
            let mut pipeline = Pipeline::new(self, output, false)?;
            loop {
                let chunk = reader.read_chunk()?;
                if chunk.is_empty() {
                    break;
                }
                pipeline.scan(chunk)?;
            }
            pipeline.finish()
        });
        log_outcome(result)
    }

    /// Same pipeline over an in-memory or mapped slice, `chunk_size` bytes at
    /// a time.
    pub fn run_slice<W: Write>(&self, data: &[u8], output: W) -> Result<IndexStats> {
        self.scan_slice(data, output, false)
    }

    fn scan_slice<W: Write>(&self, data: &[u8], output: W, mapped: bool) -> Result<IndexStats> {
        if self.chunk_size == 0 {
            return log_outcome(Err(LoftError::InvalidConfig(
                "chunk size must be at least 1 byte".to_string(),
            )));
        }
        let result = Pipeline::new(self, output, mapped).and_then(|mut pipeline| {
            for chunk in data.chunks(self.chunk_size) {
                pipeline.scan(chunk)?;
            }
            pipeline.finish()
        });
        log_outcome(result)
    }
}

/// An opened input.
enum Source {
    Stdin,
    File(File),
    Mapped(Mmap),
}

/// Refuse to index a file into itself: creating the output would truncate
/// the input before it is read.
fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if is_stdio(input) || is_stdio(output) {
        return Ok(());
    }
    // A missing output cannot alias the input.
    if let (Ok(a), Ok(b)) = (fs::canonicalize(input), fs::canonicalize(output)) {
        if a == b {
            return Err(LoftError::InvalidConfig(format!(
                "output {} is the input file",
                output.display()
            )));
        }
    }
    Ok(())
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path).map_err(|source| LoftError::OutputOpen {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(file))
}

fn log_outcome(result: Result<IndexStats>) -> Result<IndexStats> {
    match &result {
        Ok(stats) => info!(
            bytes = stats.bytes_scanned,
            offsets = stats.offsets,
            flushes = stats.flushes,
            "index complete"
        ),
        Err(e) => debug!(state = %PipelineState::Aborted, error = %e, "index aborted"),
    }
    result
}

/// State owned by one scanning pass.
struct Pipeline<W: Write> {
    index: IndexBuffer,
    writer: OffsetWriter<W>,
    base_offset: u64,
    offset: u64,
    state: PipelineState,
    used_mmap: bool,
    started: Instant,
}

impl<W: Write> Pipeline<W> {
    fn new(cmd: &IndexCommand, output: W, used_mmap: bool) -> Result<Self> {
        debug!(
            state = %PipelineState::Init,
            chunk_size = cmd.chunk_size,
            buffer_capacity = cmd.buffer_capacity,
            "allocating index buffer"
        );
        let pipeline = Self {
            index: IndexBuffer::with_capacity(cmd.buffer_capacity)?,
            writer: OffsetWriter::new(output),
            base_offset: cmd.base_offset,
            offset: cmd.base_offset,
            state: PipelineState::Init,
            used_mmap,
            started: Instant::now(),
        };
        Ok(pipeline.enter(PipelineState::Scanning))
    }

    fn enter(mut self, next: PipelineState) -> Self {
        transition(&mut self.state, next);
        self
    }

    fn scan(&mut self, chunk: &[u8]) -> Result<()> {
        let writer = &mut self.writer;
        let state = &mut self.state;
        self.offset = scan_chunk(chunk, self.offset, &mut self.index, |index| {
            transition(state, PipelineState::Flushing);
            writer.flush(index)?;
            transition(state, PipelineState::Scanning);
            Ok(())
        })?;
        Ok(())
    }

    fn finish(self) -> Result<IndexStats> {
        let mut pipeline = self.enter(PipelineState::Draining);
        pipeline.writer.flush(&mut pipeline.index)?;

        let stats = IndexStats {
            bytes_scanned: pipeline.offset - pipeline.base_offset,
            offsets: pipeline.index.entries(),
            flushes: pipeline.writer.flushes(),
            bytes_written: pipeline.writer.bytes_written(),
            peak_buffer: pipeline.index.peak(),
            buffer_capacity: pipeline.index.capacity(),
            used_mmap: pipeline.used_mmap,
            elapsed_secs: 0.0,
        };
        let started = pipeline.started;
        pipeline.writer.finish()?;
        debug!(from = %PipelineState::Draining, to = %PipelineState::Done, "pipeline state");

        Ok(IndexStats {
            elapsed_secs: started.elapsed().as_secs_f64(),
            ..stats
        })
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    let from = *state;
    debug!(from = %from, to = %next, "pipeline state");
    *state = next;
}

/// Statistics from an index run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexStats {
    pub bytes_scanned: u64,
    pub offsets: u64,
    /// Includes the final drain flush.
    pub flushes: u64,
    pub bytes_written: u64,
    /// Largest index buffer fill seen during the run.
    pub peak_buffer: usize,
    pub buffer_capacity: usize,
    pub used_mmap: bool,
    pub elapsed_secs: f64,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scanned: {} bytes, Offsets: {}, Flushes: {}, Written: {} bytes, Mmap: {}, Time: {:.3}s",
            self.bytes_scanned,
            self.offsets,
            self.flushes,
            self.bytes_written,
            self.used_mmap,
            self.elapsed_secs
        )
    }
}
