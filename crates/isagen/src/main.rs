#![forbid(unsafe_code)]

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use isagen_core::GrammarError;
use isagen_permute::Permutation;
use isagen_random::{ConfigError, Program, ProgramConfig};
use isagen_schema::{Schema, SchemaError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::level_filters::LevelFilter;


#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log more (`-v` for debug, `-vv` for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a random LC-3 program, each line paired with its encoding.
    Random {
        /// Number of generation steps after the first `.orig`.
        #[arg(short = 'n', long, default_value_t = ProgramConfig::default().instruction_count)]
        count: usize,

        /// Chance of starting a new load region at each step.
        #[arg(long, default_value_t = ProgramConfig::default().origin_probability)]
        origin_probability: f64,

        /// Seed for the random source, picked at random (and logged) if absent.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every encoding of every instruction in a schema.
    Exhaustive {
        #[arg(long, default_value = "res/encodings.json")]
        schema: PathBuf,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("{}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Error> {
    let (corpus, output) = match command {
        Command::Random { count, origin_probability, seed, output } => {
            let config = ProgramConfig { instruction_count: count, origin_probability };
            let seed = seed.unwrap_or_else(rand::random);

            tracing::info!(seed, count, origin_probability, "generating random program");

            (Corpus::random(&config, seed)?, output)
        }

        Command::Exhaustive { schema, output } => {
            let json = fs::read_to_string(&schema)
                .map_err(|source| Error::File { path: schema.clone(), source })?;

            (Corpus::exhaustive(&json)?, output)
        }
    };

    // a failed run leaves an existing output file alone.
    let mut out = open_output(output.as_deref())?;
    corpus.write_to(&mut out)?;
    out.flush()?;

    Ok(())
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, Error> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };

    let file =
        File::create(path).map_err(|source| Error::File { path: path.to_owned(), source })?;

    Ok(Box::new(BufWriter::new(file)))
}

/// Everything a run writes, built in full before any output is opened.
enum Corpus {
    Program(Program),
    Listing { schema: Schema, permutations: Vec<Permutation> },
}

impl Corpus {
    /// A random program generated from `seed`.
    fn random(config: &ProgramConfig, seed: u64) -> Result<Self, Error> {
        let isa = isagen_random::lc3::isa()?;
        let mut rng = StdRng::seed_from_u64(seed);

        Ok(Self::Program(isagen_random::generate(&isa, config, &mut rng)?))
    }

    /// Every permutation of the schema in `json`.
    fn exhaustive(json: &str) -> Result<Self, Error> {
        let schema = isagen_schema::load(json)?;
        let permutations = isagen_permute::exhaustive(&schema);

        Ok(Self::Listing { schema, permutations })
    }

    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Self::Program(program) => write!(out, "{program}"),
            Self::Listing { schema, permutations } => {
                isagen_permute::write_listing(out, schema, permutations)
            }
        }
    }
}
