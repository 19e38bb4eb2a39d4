//! Generate synthetic VCF files for benchmarking the indexer.
//!
//! Features:
//! - Human genome model (23 chromosomes, weighted by size)
//! - Biallelic SNPs and short indels
//! - Per-sample genotypes with a simple five-population structure
//! - Records sorted by chromosome then position, streamed in constant memory
//! - Deterministic reproducibility via seed

#![allow(clippy::manual_is_multiple_of)]

use crate::error::{LoftError, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// Buffer size for generated output (8MB).
const BUF_SIZE: usize = 8 * 1024 * 1024;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Population labels used for sample names and genotype frequencies.
const POPULATIONS: [(&str, f64); 5] = [
    ("EUR", 0.7),
    ("AFR", 0.5),
    ("EAS", 0.6),
    ("AMR", 0.65),
    ("SAS", 0.6),
];

/// Configuration for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub output: PathBuf,
    pub records: u64,
    pub samples: usize,
    pub seed: u64,
    /// Fraction of records that are indels rather than SNPs
    pub indel_frac: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("synthetic.vcf"),
            records: 100_000,
            samples: 10,
            seed: 42,
            indel_frac: 0.1,
        }
    }
}

/// Statistics from generate operation.
#[derive(Debug, Default, Clone)]
pub struct GenerateStats {
    pub records: u64,
    pub header_lines: u64,
    pub bytes: u64,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for GenerateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} header lines, {} bytes ({:.1}s)",
            format_count(self.records),
            self.header_lines,
            self.bytes,
            self.elapsed_secs
        )
    }
}

/// Human genome model with 23 chromosomes weighted by size.
struct HumanGenome {
    /// Chromosome names and sizes
    chromosomes: Vec<(&'static str, u64)>,
    /// Cumulative sizes for weighted sampling
    cumulative: Vec<u64>,
    total_size: u64,
}

impl HumanGenome {
    /// hg38 approximate sizes.
    fn new() -> Self {
        let chromosomes: Vec<(&'static str, u64)> = vec![
            ("chr1", 248_956_422),
            ("chr2", 242_193_529),
            ("chr3", 198_295_559),
            ("chr4", 190_214_555),
            ("chr5", 181_538_259),
            ("chr6", 170_805_979),
            ("chr7", 159_345_973),
            ("chr8", 145_138_636),
            ("chr9", 138_394_717),
            ("chr10", 133_797_422),
            ("chr11", 135_086_622),
            ("chr12", 133_275_309),
            ("chr13", 114_364_328),
            ("chr14", 107_043_718),
            ("chr15", 101_991_189),
            ("chr16", 90_338_345),
            ("chr17", 83_257_441),
            ("chr18", 80_373_285),
            ("chr19", 58_617_616),
            ("chr20", 64_444_167),
            ("chr21", 46_709_983),
            ("chr22", 50_818_468),
            ("chrX", 156_040_895),
        ];

        let mut cumulative = Vec::with_capacity(chromosomes.len());
        let mut running_total = 0u64;
        for (_, size) in &chromosomes {
            running_total += size;
            cumulative.push(running_total);
        }

        Self {
            chromosomes,
            cumulative,
            total_size: running_total,
        }
    }

    /// Sample a chromosome weighted by size.
    #[inline]
    fn sample_chromosome(&self, rng: &mut SmallRng) -> (usize, u64) {
        let target = rng.gen_range(0..self.total_size);
        let idx = self.cumulative.partition_point(|&x| x <= target);
        (idx, self.chromosomes[idx].1)
    }
}

/// Variant site before genotypes are drawn.
#[derive(Clone, Copy, Debug)]
struct RawSite {
    chrom_idx: u16,
    pos: u32,
    /// 0 = SNP, >0 = insertion length, <0 = deletion length
    indel: i8,
}

/// Generate command.
pub struct GenerateCommand {
    config: GenerateConfig,
    genome: HumanGenome,
}

impl GenerateCommand {
    pub fn new(config: GenerateConfig) -> Self {
        Self {
            config,
            genome: HumanGenome::new(),
        }
    }

    /// Write the configured VCF file.
    pub fn run(&self) -> Result<GenerateStats> {
        let path = &self.config.output;
        let file = File::create(path).map_err(|source| LoftError::OutputOpen {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::with_capacity(BUF_SIZE, file);
        let stats = self.write_to(&mut writer)?;
        writer.flush().map_err(LoftError::Write)?;
        debug!(path = %path.display(), records = stats.records, "generated VCF");
        Ok(stats)
    }

    /// Write the VCF to any writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<GenerateStats> {
        let start = Instant::now();
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut counter = CountingWriter { inner: writer, bytes: 0 };

        let header_lines = self.write_header(&mut counter).map_err(LoftError::Write)?;

        let counts = self.chromosome_counts(&mut rng);
        let mut itoa_buf = itoa::Buffer::new();
        let mut line = Vec::with_capacity(256 + self.config.samples * 4);
        let mut records = 0u64;
        for (chrom_idx, &count) in counts.iter().enumerate() {
            let mut positions = SortedPositions::new(count, self.genome.chromosomes[chrom_idx].1);
            while let Some(pos) = positions.next_pos(&mut rng) {
                let site = RawSite {
                    chrom_idx: chrom_idx as u16,
                    pos,
                    indel: self.draw_indel(&mut rng),
                };
                line.clear();
                self.format_record(&mut line, records, &site, &mut rng, &mut itoa_buf);
                counter.write_all(&line).map_err(LoftError::Write)?;
                records += 1;
            }
        }

        Ok(GenerateStats {
            records,
            header_lines,
            bytes: counter.bytes,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    fn write_header<W: Write>(&self, w: &mut W) -> std::io::Result<u64> {
        let mut lines = 0u64;
        writeln!(w, "##fileformat=VCFv4.2")?;
        writeln!(w, "##source=loft-generate")?;
        lines += 2;
        for (name, size) in &self.genome.chromosomes {
            writeln!(w, "##contig=<ID={},length={}>", name, size)?;
            lines += 1;
        }
        writeln!(
            w,
            "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">"
        )?;
        writeln!(
            w,
            "##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele Frequency\">"
        )?;
        writeln!(
            w,
            "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">"
        )?;
        lines += 3;

        write!(w, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT")?;
        for i in 0..self.config.samples {
            write!(w, "\t{}", sample_name(i))?;
        }
        writeln!(w)?;
        lines += 1;

        Ok(lines)
    }

    /// Split the record count across chromosomes, weighted by size.
    fn chromosome_counts(&self, rng: &mut SmallRng) -> Vec<u64> {
        let mut counts = vec![0u64; self.genome.chromosomes.len()];
        for _ in 0..self.config.records {
            counts[self.genome.sample_chromosome(rng).0] += 1;
        }
        counts
    }

    fn draw_indel(&self, rng: &mut SmallRng) -> i8 {
        if !rng.gen_bool(self.config.indel_frac.clamp(0.0, 1.0)) {
            return 0;
        }
        let len = rng.gen_range(1..=5i8);
        if rng.gen_bool(0.5) {
            len
        } else {
            -len
        }
    }

    fn format_record(
        &self,
        line: &mut Vec<u8>,
        idx: u64,
        site: &RawSite,
        rng: &mut SmallRng,
        itoa_buf: &mut itoa::Buffer,
    ) {
        let chrom = self.genome.chromosomes[site.chrom_idx as usize].0;
        line.extend_from_slice(chrom.as_bytes());
        line.push(b'\t');
        line.extend_from_slice(itoa_buf.format(site.pos).as_bytes());
        line.extend_from_slice(b"\trs");
        line.extend_from_slice(itoa_buf.format(idx + 1).as_bytes());
        line.push(b'\t');

        let ref_base = BASES[rng.gen_range(0..4)];
        let alt_base = BASES[(BASES.iter().position(|&b| b == ref_base).unwrap_or(0)
            + rng.gen_range(1..4))
            % 4];
        match site.indel {
            0 => {
                line.push(ref_base);
                line.push(b'\t');
                line.push(alt_base);
            }
            n if n > 0 => {
                line.push(ref_base);
                line.push(b'\t');
                line.push(ref_base);
                for _ in 0..n {
                    line.push(BASES[rng.gen_range(0..4)]);
                }
            }
            n => {
                line.push(ref_base);
                for _ in 0..n.unsigned_abs() {
                    line.push(BASES[rng.gen_range(0..4)]);
                }
                line.push(b'\t');
                line.push(ref_base);
            }
        }

        line.push(b'\t');
        line.extend_from_slice(itoa_buf.format(rng.gen_range(10..100u32)).as_bytes());
        line.extend_from_slice(b"\tPASS\tDP=");
        line.extend_from_slice(itoa_buf.format(rng.gen_range(10..500u32)).as_bytes());

        let mut alt_alleles = 0usize;
        let mut genotypes = Vec::with_capacity(self.config.samples);
        for i in 0..self.config.samples {
            let ref_freq = POPULATIONS[i % POPULATIONS.len()].1;
            let a = !rng.gen_bool(ref_freq);
            let b = !rng.gen_bool(ref_freq);
            alt_alleles += a as usize + b as usize;
            genotypes.push((a, b));
        }
        if self.config.samples > 0 {
            let af = alt_alleles as f64 / (2 * self.config.samples) as f64;
            line.extend_from_slice(format!(";AF={:.3}", af).as_bytes());
        }

        line.extend_from_slice(b"\tGT");
        for (a, b) in genotypes {
            line.push(b'\t');
            line.push(if a { b'1' } else { b'0' });
            line.push(b'/');
            line.push(if b { b'1' } else { b'0' });
        }
        line.push(b'\n');
    }
}

/// Draws `count` uniform positions in `1..size` in ascending order without
/// holding them in memory.
///
/// Each step samples the minimum of the remaining uniforms on the interval
/// left above the previous position.
struct SortedPositions {
    remaining: u64,
    /// Fraction of the chromosome already passed, in [0, 1].
    cursor: f64,
    span: u64,
}

impl SortedPositions {
    fn new(count: u64, size: u64) -> Self {
        Self {
            remaining: count,
            cursor: 0.0,
            span: size.clamp(2, u32::MAX as u64) - 1,
        }
    }

    fn next_pos(&mut self, rng: &mut SmallRng) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let u: f64 = rng.gen();
        let step = 1.0 - u.powf(1.0 / self.remaining as f64);
        self.cursor = (self.cursor + (1.0 - self.cursor) * step).min(1.0);
        self.remaining -= 1;
        let offset = ((self.cursor * self.span as f64) as u64).min(self.span - 1);
        Some((offset + 1) as u32)
    }
}

/// Sample name like `EUR001`, cycling through populations.
fn sample_name(i: usize) -> String {
    format!("{}{:03}", POPULATIONS[i % POPULATIONS.len()].0, i + 1)
}

struct CountingWriter<'a, W: Write> {
    inner: &'a mut W,
    bytes: u64,
}

impl<W: Write> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Parse a record count (e.g. "100", "10K", "5M").
pub fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim().to_uppercase();
    if s.is_empty() {
        return None;
    }
    let (num_part, multiplier) = if let Some(n) = s.strip_suffix('K') {
        (n, 1_000u64)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1_000_000u64)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1_000_000_000u64)
    } else {
        (s.as_str(), 1u64)
    };
    num_part.parse::<u64>().ok()?.checked_mul(multiplier)
}

/// Format a count for display (e.g., 1000000 -> "1M").
fn format_count(count: u64) -> String {
    if count >= 1_000_000_000 && count % 1_000_000_000 == 0 {
        format!("{}G", count / 1_000_000_000)
    } else if count >= 1_000_000 && count % 1_000_000 == 0 {
        format!("{}M", count / 1_000_000)
    } else if count >= 1_000 && count % 1_000 == 0 {
        format!("{}K", count / 1_000)
    } else {
        count.to_string()
    }
}
