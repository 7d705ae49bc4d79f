//! Sweep transfer lengths and print per-variant timings as CSV.
//!
//! Every timed call is verified against the reference transformation; the
//! first mismatch aborts with exit status 1.

use std::error::Error;
use std::io::{self, BufWriter};

use clap::{ArgAction, Parser};
use fastmem::DispatchConfig;
use fastmem::sweep::{CsvReport, Op, Sweep, SweepConfig};
use fastmem::tier::Ladder;
use log::{LevelFilter, Log, Metadata, Record};

#[derive(Parser, Debug)]
#[command(name = "memsweep", about = "Time and verify tiered memory transfers", version)]
struct Cli {
    /// copy, move or fill
    #[arg(long, default_value = "copy")]
    op: Op,

    #[arg(long, default_value_t = 0)]
    min_len: usize,

    /// Exclusive upper bound on the transfer length
    #[arg(long, default_value_t = 4096)]
    max_len: usize,

    #[arg(long, default_value_t = 1)]
    step: usize,

    #[arg(long, default_value_t = 1)]
    iterations: u32,

    /// Source and destination offsets from an aligned base, as `src:dst`.
    /// Repeat for several pairs.
    #[arg(long = "offset", value_parser = parse_offset)]
    offsets: Vec<(usize, usize)>,

    #[arg(long, default_value_t = 0x5eed_f00d)]
    seed: u64,

    /// Fill byte for `--op fill`
    #[arg(long, default_value_t = 0)]
    value: u8,

    /// Hold an interrupt mask across each timed call
    #[arg(long)]
    mask_interrupts: bool,

    /// Copy tier widths, widest first (e.g. `32,8,4,2,1`)
    #[arg(long)]
    copy_tiers: Option<Ladder>,

    #[arg(long)]
    move_tiers: Option<Ladder>,

    #[arg(long)]
    fill_tiers: Option<Ladder>,

    /// Log to stderr: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn sweep_config(&self) -> SweepConfig {
        let mut dispatch = DispatchConfig::default();
        if let Some(ladder) = self.copy_tiers {
            dispatch = dispatch.with_copy(ladder);
        }
        if let Some(ladder) = self.move_tiers {
            dispatch = dispatch.with_move(ladder);
        }
        if let Some(ladder) = self.fill_tiers {
            dispatch = dispatch.with_fill(ladder);
        }

        let offsets = if self.offsets.is_empty() {
            vec![(0, 0)]
        } else {
            self.offsets.clone()
        };

        SweepConfig {
            op: self.op,
            lengths: self.min_len..self.max_len,
            step: self.step,
            iterations: self.iterations,
            offsets,
            seed: self.seed,
            value: self.value,
            mask_interrupts: self.mask_interrupts,
            dispatch,
        }
    }
}

fn parse_offset(s: &str) -> Result<(usize, usize), String> {
    let (src, dst) = s
        .split_once(':')
        .ok_or_else(|| format!("expected src:dst, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<usize>().map_err(|e| format!("{v:?}: {e}"));
    Ok((parse(src)?, parse(dst)?))
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.sweep_config();
    if config.mask_interrupts {
        log::warn!("interrupts cannot be masked from user space; timing runs unmasked");
    }
    let sweep = Sweep::new(config)?;

    let mut report = CsvReport::new(BufWriter::new(io::stdout().lock()));
    report.write_header()?;
    sweep.run_with(|sample| Ok(report.write_sample(sample)?))?;
    report.into_inner()?;
    Ok(())
}
