//! Barcode sweep CLI.
//!
//! - `run`: encode payloads, sweep each through 360° with noise, print the
//!   per-image outcome and the scan-time table
//! - `capacity`: find the largest payload a symbology accepts

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::error::Error;
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::{Args, Parser, Subcommand};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use barcode_sweep::capacity::{CapacityProbe, DEFAULT_STEP};
    use barcode_sweep::oracle::Strategy;
    use barcode_sweep::{
        BarcodeEncoder, BatchConfig, BatchRunner, DataMatrixOracle, EncodeJob, ErrorCorrection,
        OracleSet, RqrrOracle, SymbolType,
    };

    // ---------------------------------------------------------------------------
    // CLI
    // ---------------------------------------------------------------------------

    /// Rotation and noise robustness sweeps for barcode decoders.
    #[derive(Parser)]
    #[command(version, about)]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Sweep each encoded payload through every integer degree.
        Run(RunArgs),

        /// Print the largest payload length a symbology can encode.
        Capacity {
            /// Symbology to probe.
            #[arg(long, default_value = "qrcode", value_parser = parse_symbol)]
            symbol: SymbolType,

            /// QR error-correction level (L, M, Q, H).
            #[arg(long, default_value = "H", value_parser = parse_ec_level)]
            ec_level: ErrorCorrection,

            /// Growth step before bisecting.
            #[arg(long, default_value_t = DEFAULT_STEP)]
            step: usize,

            /// Seed for the random payload bytes.
            #[arg(short, long)]
            seed: Option<u64>,
        },
    }

    #[derive(Args)]
    struct RunArgs {
        /// Job as `payload:symbol`. Repeatable. Defaults to data1 as Data Matrix
        /// and data2 as QR.
        #[arg(short, long = "encode", value_name = "PAYLOAD:SYMBOL")]
        encode: Vec<EncodeJob>,

        /// JSON file with a batch configuration; flags override it.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Noise standard deviation.
        #[arg(long)]
        stddev: Option<f64>,

        /// Base seed for reproducible noise.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Worker threads per sweep.
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-decode timeout in milliseconds.
        #[arg(long, conflicts_with = "no_timeout")]
        timeout_ms: Option<u64>,

        /// Wait for every decode however long it takes.
        #[arg(long)]
        no_timeout: bool,

        /// Pixels per symbol module.
        #[arg(long)]
        scale: Option<u32>,

        /// QR error-correction level (L, M, Q, H).
        #[arg(long, value_parser = parse_ec_level)]
        ec_level: Option<ErrorCorrection>,

        /// QR preprocessing passes tried in order (raw, blur, adaptive, otsu, quiet_zone).
        #[arg(long, value_delimiter = ',', value_parser = parse_strategy)]
        strategy: Vec<Strategy>,

        /// Do not stretch images to a common size.
        #[arg(long)]
        keep_sizes: bool,

        /// Print the batch report as JSON.
        #[arg(long)]
        json: bool,
    }

    fn parse_symbol(s: &str) -> Result<SymbolType, String> {
        SymbolType::parse(s).ok_or_else(|| format!("unknown symbology `{s}`"))
    }

    fn parse_ec_level(s: &str) -> Result<ErrorCorrection, String> {
        ErrorCorrection::parse(s).ok_or_else(|| format!("unknown error-correction level `{s}`"))
    }

    fn parse_strategy(s: &str) -> Result<Strategy, String> {
        Strategy::parse(s).ok_or_else(|| format!("unknown strategy `{s}`"))
    }

    // ---------------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------------

    fn load_config(args: &RunArgs) -> Result<BatchConfig, Box<dyn Error>> {
        let mut config = match &args.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
                BatchConfig::from_json(&text)?
            }
            None => BatchConfig::default(),
        };

        if let Some(stddev) = args.stddev {
            config.sweep.noise_stddev = stddev;
        }
        if args.seed.is_some() {
            config.sweep.seed = args.seed;
        }
        if let Some(workers) = args.workers {
            config.sweep.workers = workers;
        }
        if args.timeout_ms.is_some() {
            config.sweep.decode_timeout_ms = args.timeout_ms;
        }
        if args.no_timeout {
            config.sweep.decode_timeout_ms = None;
        }
        if let Some(scale) = args.scale {
            config.encoder.scale = scale;
        }
        if let Some(level) = args.ec_level {
            config.encoder.ec_level = level;
        }
        if args.keep_sizes {
            config.match_sizes = false;
        }
        Ok(config)
    }

    fn run_sweeps(args: RunArgs) -> Result<(), Box<dyn Error>> {
        let config = load_config(&args)?;
        let jobs = if args.encode.is_empty() {
            EncodeJob::defaults()
        } else {
            args.encode
        };
        let oracle = OracleSet::empty()
            .with(RqrrOracle::with_strategies(args.strategy))
            .with(DataMatrixOracle::new());

        let report = BatchRunner::from_config(oracle, config)?.run(&jobs)?.report();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{report}");
        }
        Ok(())
    }

    fn run_capacity(
        symbol: SymbolType,
        ec_level: ErrorCorrection,
        step: usize,
        seed: Option<u64>,
    ) -> Result<(), Box<dyn Error>> {
        let encoder = BarcodeEncoder {
            ec_level,
            scale: 1,
            ..BarcodeEncoder::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or_else(rand::random));
        let found = CapacityProbe::with_step(step).probe(&encoder, symbol, &mut rng)?;
        println!("{found} seems to be the largest size we can generate for {symbol}");
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // main
    // ---------------------------------------------------------------------------

    pub fn main() -> ExitCode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let cli = Cli::parse();

        let result = match cli.command {
            Commands::Run(args) => run_sweeps(args),
            Commands::Capacity {
                symbol,
                ec_level,
                step,
                seed,
            } => run_capacity(symbol, ec_level, step, seed),
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
