extern crate clap;
extern crate env_logger;
extern crate flate2;
extern crate gibbsmotif;
extern crate log;
extern crate noodles_fasta;
extern crate rand;
extern crate rand_xoshiro;

use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::File;
use std::io::BufRead;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use clap::Parser;
use gibbsmotif::abc::Dna;
use gibbsmotif::err::InvalidData;
use gibbsmotif::err::InvalidSymbol;
use gibbsmotif::err::SamplerError;
use gibbsmotif::sampler::Sampler;
use gibbsmotif::sampler::SamplerData;
use gibbsmotif::sampler::SamplerResult;
use gibbsmotif::sampler::DEFAULT_MAX_PASSES;
use gibbsmotif::seq::EncodedSequence;
use log::debug;
use log::info;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

// --- Error -------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Error {
    Io(Arc<std::io::Error>),
    InvalidSymbol(InvalidSymbol),
    InvalidData(Option<String>),
    Sampler(SamplerError),
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(Arc::new(error))
    }
}

impl From<InvalidSymbol> for Error {
    fn from(error: InvalidSymbol) -> Self {
        Error::InvalidSymbol(error)
    }
}

impl From<InvalidData> for Error {
    fn from(_error: InvalidData) -> Self {
        Error::InvalidData(None)
    }
}

impl From<SamplerError> for Error {
    fn from(error: SamplerError) -> Self {
        Error::Sampler(error)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::InvalidSymbol(err) => err.fmt(f),
            Error::InvalidData(None) => f.write_str("invalid data"),
            Error::InvalidData(Some(x)) => write!(f, "invalid data: {}", x),
            Error::Sampler(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::InvalidSymbol(e) => Some(e),
            Error::InvalidData(_) => None,
            Error::Sampler(e) => Some(e),
        }
    }
}

// --- Parameters --------------------------------------------------------------

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct MotifLengthParameters {
    /// length of the motif to find
    #[arg(short = 'w', long)]
    motif_length: Option<usize>,
    /// file containing the length of the motif to find
    #[arg(long)]
    motif_length_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Parameters {
    /// sequence file to load
    #[arg(short, long, required = true)]
    sequences: PathBuf,

    #[command(flatten)]
    motif_length: MotifLengthParameters,

    /// output directory to write to
    #[arg(short, long, required = true)]
    output: PathBuf,

    /// seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// maximum number of passes over the sequences
    #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// increase the logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// --- Input -------------------------------------------------------------------

fn open_compressed<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, std::io::Error> {
    let mut file = File::open(path).map(std::io::BufReader::new)?;
    match file.fill_buf()? {
        &[0x1f, 0x8b, ..] => Ok(flate2::read::MultiGzDecoder::new(file))
            .map(std::io::BufReader::new)
            .map(|r| Box::new(r) as Box<dyn BufRead>),
        _ => Ok(Box::new(file)),
    }
}

fn read_sequences<B: BufRead>(reader: B) -> Result<Vec<EncodedSequence<Dna>>, Error> {
    let mut sequences = Vec::new();
    for res in noodles_fasta::io::Reader::new(reader).records() {
        let record = res?;
        let raw: &[u8] = record.sequence().as_ref();
        let sequence = EncodedSequence::<Dna>::from_ascii(&raw.to_ascii_uppercase())?;
        debug!(
            "Loaded sequence {} (L={})",
            String::from_utf8_lossy(record.name()),
            sequence.len()
        );
        sequences.push(sequence);
    }
    Ok(sequences)
}

fn read_motif_length<B: BufRead>(mut reader: B) -> Result<usize, Error> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    line.trim()
        .parse::<usize>()
        .map_err(|e| Error::InvalidData(Some(format!("motif length {:?}: {}", line.trim(), e))))
}

// --- Output ------------------------------------------------------------------

fn write_motif<W: Write>(mut writer: W, result: &SamplerResult<Dna>) -> Result<(), Error> {
    writeln!(writer, ">PMOTIF {}", result.frequencies.len())?;
    for row in result.frequencies.matrix().iter() {
        let fields = row.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        writeln!(writer, "{}", fields.join("\t"))?;
    }
    write!(writer, "<")?;
    Ok(())
}

fn write_sites<W: Write>(mut writer: W, result: &SamplerResult<Dna>) -> Result<(), Error> {
    let lines = result
        .starts
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    write!(writer, "{}", lines.join("\n"))?;
    Ok(())
}

fn write_output<P: AsRef<Path>>(output: P, result: &SamplerResult<Dna>) -> Result<(), Error> {
    let output = output.as_ref();
    std::fs::create_dir_all(output)?;

    let mut file = File::create(output.join("predictedmotif.txt")).map(BufWriter::new)?;
    write_motif(&mut file, result)?;
    file.flush()?;

    let mut file = File::create(output.join("predictedsites.txt")).map(BufWriter::new)?;
    write_sites(&mut file, result)?;
    file.flush()?;

    let mut file = File::create(output.join("runtime.txt"))?;
    write!(file, "{}", result.elapsed.as_secs_f64())?;
    Ok(())
}

// --- Main --------------------------------------------------------------------

fn main() -> Result<(), Error> {
    let params = Parameters::parse();

    let level = match params.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("Loading sequences from {:?}", params.sequences);
    let reader = open_compressed(&params.sequences)?;
    let sequences = read_sequences(reader)?;
    let width = match (
        params.motif_length.motif_length,
        &params.motif_length.motif_length_file,
    ) {
        (Some(w), _) => w,
        (None, Some(path)) => read_motif_length(open_compressed(path)?)?,
        (None, None) => return Err(Error::InvalidData(Some("missing motif length".into()))),
    };
    info!("Loaded {} sequences (ML={})", sequences.len(), width);

    let seed = params.seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);
    let rng = Xoshiro256StarStar::seed_from_u64(seed);

    let start = Instant::now();
    let data = SamplerData::new(sequences);
    let mut result = Sampler::new(&data, width, rng)?
        .with_max_passes(params.max_passes)
        .run();
    result.elapsed = start.elapsed();
    info!(
        "Finished after {} passes in {:?}",
        result.passes, result.elapsed
    );

    write_output(&params.output, &result)?;
    Ok(())
}
