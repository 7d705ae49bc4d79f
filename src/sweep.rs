//! Throughput sweep over the tiered engines.
//!
//! For every length, pointer offset pair and iteration the sweep fills its
//! buffers with pseudo-random bytes, times exactly one call per variant, and
//! checks the destination byte for byte against a reference transformation
//! before recording the time. A mismatch ends the run: it is a defect, not a
//! condition to retry.
//!
//! Results are reported one [`BenchmarkSample`] per length, as CSV with the
//! header `Bytes,Reference,Bytewise,Tiered`.
#![allow(unsafe_code)]

use std::fmt;
use std::io::{self, Write};
use std::ops::Range;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::dispatch::{DispatchConfig, Dispatcher};
use crate::error::SweepError;
use crate::primitive::{Portable, TransferPrimitives};
use crate::timing::{Clock, InterruptMask, MonotonicClock, NoMask};

/// Pointer offsets are measured from a base aligned to this many bytes and
/// must stay below it.
pub const MAX_OFFSET: usize = 64;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Engine under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Copy,
    Move,
    Fill,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Copy => "copy",
            Op::Move => "move",
            Op::Fill => "fill",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Op {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "copy" | "memcpy" => Ok(Op::Copy),
            "move" | "memmove" => Ok(Op::Move),
            "fill" | "memset" => Ok(Op::Fill),
            other => Err(SweepError::Config(format!("unknown op {other:?}"))),
        }
    }
}

/// Implementations compared in each row, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `core::ptr` intrinsics.
    Reference,
    /// One volatile byte per step.
    Bytewise,
    /// The alignment-tiered dispatcher.
    Tiered,
}

impl Variant {
    pub const COUNT: usize = 3;
    pub const ALL: [Variant; Variant::COUNT] =
        [Variant::Reference, Variant::Bytewise, Variant::Tiered];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Reference => "Reference",
            Variant::Bytewise => "Bytewise",
            Variant::Tiered => "Tiered",
        }
    }
}

/// What to sweep and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub op: Op,
    /// Transfer lengths, end exclusive.
    pub lengths: Range<usize>,
    pub step: usize,
    /// Timed calls per variant, length and offset pair.
    pub iterations: u32,
    /// `(src_off, dst_off)` pairs. Move sweeps place both in one buffer.
    pub offsets: Vec<(usize, usize)>,
    pub seed: u64,
    /// Fill byte for [`Op::Fill`].
    pub value: u8,
    pub mask_interrupts: bool,
    pub dispatch: DispatchConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            op: Op::Copy,
            lengths: 0..4096,
            step: 1,
            iterations: 1,
            offsets: vec![(0, 0)],
            seed: 0x5eed_f00d,
            value: 0,
            mask_interrupts: false,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.step == 0 {
            return Err(SweepError::Config("step must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(SweepError::Config("iterations must be at least 1".into()));
        }
        if self.lengths.start > self.lengths.end {
            return Err(SweepError::Config(format!(
                "empty length range {}..{}",
                self.lengths.start, self.lengths.end
            )));
        }
        if self.offsets.is_empty() {
            return Err(SweepError::Config("no pointer offsets given".into()));
        }
        if let Some(&(s, d)) = self
            .offsets
            .iter()
            .find(|&&(s, d)| s >= MAX_OFFSET || d >= MAX_OFFSET)
        {
            return Err(SweepError::Config(format!(
                "offset pair {s}:{d} must stay below {MAX_OFFSET}"
            )));
        }
        self.dispatch.validate()?;
        Ok(())
    }
}

// =============================================================================
// SAMPLES
// =============================================================================

/// Summed per-variant time for one length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSample {
    pub len: usize,
    pub elapsed_ns: [u64; Variant::COUNT],
}

impl BenchmarkSample {
    pub fn elapsed(&self, variant: Variant) -> u64 {
        self.elapsed_ns[variant as usize]
    }
}

/// Running totals for the length currently being swept.
#[derive(Debug, Default, Clone)]
pub struct Accumulator {
    totals: [u64; Variant::COUNT],
    runs: u64,
}

impl Accumulator {
    pub fn record(&mut self, variant: Variant, ns: u64) {
        let slot = &mut self.totals[variant as usize];
        *slot = slot.saturating_add(ns);
        self.runs += 1;
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Emit the totals for `len` and start over.
    pub fn take_sample(&mut self, len: usize) -> BenchmarkSample {
        let sample = BenchmarkSample {
            len,
            elapsed_ns: self.totals,
        };
        *self = Self::default();
        sample
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Source and destination windows, each starting on a `MAX_OFFSET` boundary.
struct Workspace {
    src: Vec<u8>,
    dst: Vec<u8>,
    expected: Vec<u8>,
    src_base: usize,
    dst_base: usize,
    span: usize,
}

impl Workspace {
    fn new(span: usize) -> Self {
        let src = vec![0u8; span + MAX_OFFSET];
        let dst = vec![0u8; span + MAX_OFFSET];
        // Byte pointers can always be aligned at runtime; the vectors never
        // reallocate, so the bases stay put.
        let src_base = src.as_ptr().align_offset(MAX_OFFSET);
        let dst_base = dst.as_ptr().align_offset(MAX_OFFSET);
        Self {
            src,
            dst,
            expected: vec![0u8; span],
            src_base,
            dst_base,
            span,
        }
    }

    fn src_window(&mut self) -> &mut [u8] {
        &mut self.src[self.src_base..self.src_base + self.span]
    }

    fn dst_window(&mut self) -> &mut [u8] {
        &mut self.dst[self.dst_base..self.dst_base + self.span]
    }
}

/// A configured sweep.
pub struct Sweep<P = Portable, C = MonotonicClock, M = NoMask> {
    config: SweepConfig,
    engine: Dispatcher<P>,
    clock: C,
    mask: M,
}

impl Sweep {
    pub fn new(config: SweepConfig) -> Result<Self, SweepError> {
        config.validate()?;
        let engine = Dispatcher::with_config(Portable, config.dispatch)?;
        Ok(Self {
            config,
            engine,
            clock: MonotonicClock::new(),
            mask: NoMask,
        })
    }
}

impl<P: TransferPrimitives, C: Clock, M: InterruptMask> Sweep<P, C, M> {
    /// Swap in other transfer primitives for the tiered variant.
    pub fn with_primitives<Q: TransferPrimitives>(self, prims: Q) -> Result<Sweep<Q, C, M>, SweepError> {
        let engine = Dispatcher::with_config(prims, self.config.dispatch)?;
        Ok(Sweep {
            config: self.config,
            engine,
            clock: self.clock,
            mask: self.mask,
        })
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> Sweep<P, C2, M> {
        Sweep {
            config: self.config,
            engine: self.engine,
            clock,
            mask: self.mask,
        }
    }

    pub fn with_mask<M2: InterruptMask>(self, mask: M2) -> Sweep<P, C, M2> {
        Sweep {
            config: self.config,
            engine: self.engine,
            clock: self.clock,
            mask,
        }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run the whole sweep and collect every sample.
    pub fn run(&self) -> Result<Vec<BenchmarkSample>, SweepError> {
        let mut samples = Vec::new();
        self.run_with(|sample| {
            samples.push(sample.clone());
            Ok(())
        })?;
        Ok(samples)
    }

    /// Run the sweep, handing each length's sample to `on_sample` as soon as
    /// it is complete.
    pub fn run_with<F>(&self, mut on_sample: F) -> Result<(), SweepError>
    where
        F: FnMut(&BenchmarkSample) -> Result<(), SweepError>,
    {
        let cfg = &self.config;
        log::info!(
            "sweeping {} over lengths {:?} step {} ({} offset pairs x {} iterations)",
            cfg.op,
            cfg.lengths,
            cfg.step,
            cfg.offsets.len(),
            cfg.iterations
        );

        let mut ws = Workspace::new(cfg.lengths.end + MAX_OFFSET);
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut acc = Accumulator::default();

        for len in cfg.lengths.clone().step_by(cfg.step) {
            for &(src_off, dst_off) in &cfg.offsets {
                for _ in 0..cfg.iterations {
                    for variant in Variant::ALL {
                        let ns = self.measure(&mut ws, &mut rng, variant, len, src_off, dst_off)?;
                        acc.record(variant, ns);
                    }
                }
            }
            let runs = acc.runs();
            let sample = acc.take_sample(len);
            log::trace!("len {len}: {:?} over {runs} runs", sample.elapsed_ns);
            on_sample(&sample)?;
        }

        log::info!("sweep of {} verified", cfg.op);
        Ok(())
    }

    /// One populate / time / verify cycle.
    fn measure(
        &self,
        ws: &mut Workspace,
        rng: &mut StdRng,
        variant: Variant,
        len: usize,
        src_off: usize,
        dst_off: usize,
    ) -> Result<u64, SweepError> {
        let op = self.config.op;
        let value = self.config.value;

        rng.fill_bytes(ws.src_window());
        rng.fill_bytes(ws.dst_window());

        let (src_base, dst_base, span) = (ws.src_base, ws.dst_base, ws.span);
        ws.expected.copy_from_slice(&ws.dst[dst_base..dst_base + span]);
        match op {
            Op::Copy => ws.expected[dst_off..dst_off + len]
                .copy_from_slice(&ws.src[src_base + src_off..src_base + src_off + len]),
            Op::Move => ws.expected.copy_within(src_off..src_off + len, dst_off),
            Op::Fill => ws.expected[dst_off..dst_off + len].fill(value),
        }

        // SAFETY: offsets < MAX_OFFSET and len < lengths.end keep every
        // pointer and run inside the windows. Move derives both pointers from
        // the destination window.
        let (dst, src) = unsafe {
            let window = ws.dst.as_mut_ptr().add(dst_base);
            match op {
                Op::Copy => (window.add(dst_off), ws.src.as_ptr().add(src_base + src_off)),
                Op::Move => (window.add(dst_off), window.add(src_off) as *const u8),
                Op::Fill => (window.add(dst_off), core::ptr::null()),
            }
        };

        let guard = self.config.mask_interrupts.then(|| self.mask.mask());
        let start = self.clock.now_ns();
        // SAFETY: as above; copy offsets address two distinct buffers.
        unsafe { self.execute(variant, dst, src, len) };
        let elapsed = self.clock.now_ns().saturating_sub(start);
        drop(guard);

        let got = &ws.dst[dst_base..dst_base + span];
        if let Some(index) = got.iter().zip(&ws.expected).position(|(a, b)| a != b) {
            let err = SweepError::Mismatch {
                op: op.name(),
                variant: variant.name(),
                len,
                src_off,
                dst_off,
                index,
                expected: ws.expected[index],
                actual: got[index],
            };
            log::error!("{err}");
            return Err(err);
        }

        Ok(elapsed)
    }

    unsafe fn execute(&self, variant: Variant, dst: *mut u8, src: *const u8, len: usize) {
        let value = self.config.value;
        unsafe {
            match (variant, self.config.op) {
                (Variant::Reference, Op::Copy) => core::ptr::copy_nonoverlapping(src, dst, len),
                (Variant::Reference, Op::Move) => core::ptr::copy(src, dst, len),
                (Variant::Reference, Op::Fill) => core::ptr::write_bytes(dst, value, len),
                (Variant::Bytewise, Op::Copy) => bytewise_copy(dst, src, len),
                (Variant::Bytewise, Op::Move) => bytewise_move(dst, src, len),
                (Variant::Bytewise, Op::Fill) => bytewise_fill(dst, value, len),
                (Variant::Tiered, Op::Copy) => {
                    self.engine.memcpy(dst, src, len);
                }
                (Variant::Tiered, Op::Move) => {
                    self.engine.memmove(dst, src, len);
                }
                (Variant::Tiered, Op::Fill) => {
                    self.engine.memset(dst, value, len);
                }
            }
        }
    }
}

// Volatile accesses keep the compiler from turning these back into the
// platform routines.

unsafe fn bytewise_copy(dst: *mut u8, src: *const u8, n: usize) {
    for i in 0..n {
        unsafe { dst.add(i).write_volatile(src.add(i).read_volatile()) };
    }
}

unsafe fn bytewise_move(dst: *mut u8, src: *const u8, n: usize) {
    if (dst as usize) <= (src as usize) {
        unsafe { bytewise_copy(dst, src, n) };
    } else {
        for i in (0..n).rev() {
            unsafe { dst.add(i).write_volatile(src.add(i).read_volatile()) };
        }
    }
}

unsafe fn bytewise_fill(dst: *mut u8, value: u8, n: usize) {
    for i in 0..n {
        unsafe { dst.add(i).write_volatile(value) };
    }
}

// =============================================================================
// CSV REPORT
// =============================================================================

/// Writes samples as `Bytes,<variant columns…>` CSV.
pub struct CsvReport<W: Write> {
    out: W,
}

impl<W: Write> CsvReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        write!(self.out, "Bytes")?;
        for variant in Variant::ALL {
            write!(self.out, ",{}", variant.name())?;
        }
        writeln!(self.out)
    }

    pub fn write_sample(&mut self, sample: &BenchmarkSample) -> io::Result<()> {
        write!(self.out, "{}", sample.len)?;
        for ns in sample.elapsed_ns {
            write!(self.out, ",{ns}")?;
        }
        writeln!(self.out)
    }

    /// Flush and hand back the writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
