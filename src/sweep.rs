//! The 360° robustness sweep.
//!
//! For one source image: pad it onto a white square canvas twice its longest
//! side, then for every integer degree add noise, rotate, and time a decode.
//! The per-angle outcome lands in a [`SweepRecord`] indexed by degree.
//!
//! Decode failures (errors, panics, timeouts) count as zero results for that
//! angle and never stop the sweep. Transform failures do.
//!
//! Noise for each angle comes from its own ChaCha stream derived from one base
//! seed, so a seeded sweep produces the same frames however many workers run
//! it and in whatever order they finish.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::clock::Stopwatch;
use crate::config::SweepConfig;
use crate::error::{DecodeError, SweepError};
use crate::image::ImageBuffer;
use crate::noise;
use crate::oracle::{count_valid, guarded_decode, DecodeOracle, DecodeResult};
use crate::report::LatencyStats;
use crate::rotate;

/// Angles per sweep: one integer degree each, 0 through 359.
pub const FULL_TURN: usize = 360;

/// Outcome of the decode at one angle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleSample {
    pub degrees: u16,
    /// Valid results at this angle. Several valid detections all count.
    pub found: usize,
    /// Wall-clock time of the decode call alone.
    pub elapsed: Duration,
    /// Why the decode produced nothing, if it failed outright.
    pub failure: Option<DecodeError>,
}

/// Which image a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub label: String,
    pub width: usize,
    pub height: usize,
}

/// Per-angle results of one sweep plus, optionally, every rotated frame.
#[derive(Debug, Clone, Serialize)]
pub struct SweepRecord {
    pub source: SourceInfo,
    pub samples: Vec<AngleSample>,
    #[serde(skip)]
    pub frames: Vec<ImageBuffer>,
}

impl SweepRecord {
    /// Sum of valid results over all angles.
    pub fn total_found(&self) -> usize {
        self.samples.iter().map(|s| s.found).sum()
    }

    /// `total_found / 360`. Exceeds 1.0 if angles report several symbols.
    pub fn success_ratio(&self) -> f64 {
        self.total_found() as f64 / FULL_TURN as f64
    }

    /// `(total_found, success_ratio)`.
    pub fn outcome(&self) -> (usize, f64) {
        (self.total_found(), self.success_ratio())
    }

    /// Angles where the oracle call itself failed.
    pub fn failed_angles(&self) -> usize {
        self.samples.iter().filter(|s| s.failure.is_some()).count()
    }

    pub fn latency(&self) -> Option<LatencyStats> {
        LatencyStats::from_durations(self.samples.iter().map(|s| s.elapsed))
    }

    /// Inclusive runs of consecutive degrees with at least one valid result.
    pub fn decodable_ranges(&self) -> Vec<(u16, u16)> {
        let mut ranges: Vec<(u16, u16)> = Vec::new();
        for sample in self.samples.iter().filter(|s| s.found > 0) {
            match ranges.last_mut() {
                Some((_, end)) if *end + 1 == sample.degrees => *end = sample.degrees,
                _ => ranges.push((sample.degrees, sample.degrees)),
            }
        }
        ranges
    }
}

/// Runs sweeps against one oracle with one configuration.
pub struct SweepController<O> {
    oracle: Arc<O>,
    config: SweepConfig,
    /// Timeout helper threads still alive, abandoned ones included.
    helpers: Arc<AtomicUsize>,
}

impl<O: DecodeOracle + 'static> SweepController<O> {
    pub fn new(oracle: O, config: SweepConfig) -> Result<Self, SweepError> {
        Self::with_shared(Arc::new(oracle), config)
    }

    /// Share an oracle that other sweeps or workers also use.
    pub fn with_shared(oracle: Arc<O>, config: SweepConfig) -> Result<Self, SweepError> {
        config.validate()?;
        Ok(Self {
            oracle,
            config,
            helpers: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn oracle(&self) -> &Arc<O> {
        &self.oracle
    }

    /// White (or `background`) square canvas of side `2 * max(w, h)` with the
    /// source centered, so no rotation clips the symbol.
    pub fn prepare_canvas(&self, source: &ImageBuffer) -> Result<ImageBuffer, SweepError> {
        let side = 2 * source.width().max(source.height());
        source.pad_centered(side, self.config.background)
    }

    /// Run a full sweep.
    pub fn run(&self, source: &ImageBuffer, label: &str) -> Result<SweepRecord, SweepError> {
        self.execute(source, label, None)
    }

    /// Run a full sweep, calling `hook` once per angle in degree order with
    /// the sample and the rotated frame.
    pub fn run_with<F>(
        &self,
        source: &ImageBuffer,
        label: &str,
        mut hook: F,
    ) -> Result<SweepRecord, SweepError>
    where
        F: FnMut(&AngleSample, &ImageBuffer),
    {
        self.execute(source, label, Some(&mut hook))
    }

    /// Lazy, sequential view of a sweep: one `(sample, frame)` per degree.
    pub fn frames(&self, source: &ImageBuffer) -> Result<SweepFrames<'_, O>, SweepError> {
        Ok(SweepFrames {
            controller: self,
            canvas: self.prepare_canvas(source)?,
            base_seed: self.base_seed(),
            next: 0,
        })
    }

    fn execute(
        &self,
        source: &ImageBuffer,
        label: &str,
        mut hook: Option<&mut dyn FnMut(&AngleSample, &ImageBuffer)>,
    ) -> Result<SweepRecord, SweepError> {
        let canvas = self.prepare_canvas(source)?;
        let base_seed = self.base_seed();
        log::info!(
            "sweeping {} ({}x{}) on a {}x{} canvas with {} worker(s), seed {}",
            label,
            source.width(),
            source.height(),
            canvas.width(),
            canvas.height(),
            self.config.workers,
            base_seed
        );

        let mut record = SweepRecord {
            source: SourceInfo {
                label: label.to_string(),
                width: source.width(),
                height: source.height(),
            },
            samples: Vec::with_capacity(FULL_TURN),
            frames: Vec::new(),
        };
        let keep_frames = self.config.retain_frames || hook.is_some();

        if self.config.workers <= 1 {
            for degree in 0..FULL_TURN {
                let (sample, frame) = self.process_angle(&canvas, base_seed, degree)?;
                if let Some(hook) = hook.as_mut() {
                    hook(&sample, &frame);
                }
                record.samples.push(sample);
                if self.config.retain_frames {
                    record.frames.push(frame);
                }
            }
        } else {
            for (sample, frame) in self.process_parallel(&canvas, base_seed, keep_frames)? {
                if let (Some(hook), Some(frame)) = (hook.as_mut(), frame.as_ref()) {
                    hook(&sample, frame);
                }
                record.samples.push(sample);
                if let (true, Some(frame)) = (self.config.retain_frames, frame) {
                    record.frames.push(frame);
                }
            }
        }

        let (found, ratio) = record.outcome();
        log::info!(
            "{}: {} found over {} angles ({:.2}%), {} decode failure(s)",
            label,
            found,
            FULL_TURN,
            ratio * 100.0,
            record.failed_angles()
        );
        Ok(record)
    }

    /// Split the 360 slots into contiguous chunks, one per worker. Each worker
    /// writes only its own chunk, so the table needs no locking.
    fn process_parallel(
        &self,
        canvas: &ImageBuffer,
        base_seed: u64,
        keep_frames: bool,
    ) -> Result<Vec<(AngleSample, Option<ImageBuffer>)>, SweepError> {
        let mut slots: Vec<Option<(AngleSample, Option<ImageBuffer>)>> =
            (0..FULL_TURN).map(|_| None).collect();
        let chunk = FULL_TURN.div_ceil(self.config.workers);

        thread::scope(|scope| -> Result<(), SweepError> {
            let handles: Vec<_> = slots
                .chunks_mut(chunk)
                .enumerate()
                .map(|(index, slice)| {
                    let start = index * chunk;
                    scope.spawn(move || -> Result<(), SweepError> {
                        for (offset, slot) in slice.iter_mut().enumerate() {
                            let (sample, frame) =
                                self.process_angle(canvas, base_seed, start + offset)?;
                            *slot = Some((sample, keep_frames.then_some(frame)));
                        }
                        Ok(())
                    })
                })
                .collect();

            for handle in handles {
                handle
                    .join()
                    .map_err(|_| SweepError::Transform("sweep worker panicked".to_string()))??;
            }
            Ok(())
        })?;

        slots
            .into_iter()
            .enumerate()
            .map(|(degree, slot)| {
                slot.ok_or_else(|| {
                    SweepError::Transform(format!("angle {} was never processed", degree))
                })
            })
            .collect()
    }

    /// Noise → rotate → timed decode for one angle.
    fn process_angle(
        &self,
        canvas: &ImageBuffer,
        base_seed: u64,
        degree: usize,
    ) -> Result<(AngleSample, ImageBuffer), SweepError> {
        let mut rng = angle_rng(base_seed, degree);
        let noised = noise::add_noise(canvas, self.config.noise_stddev, &mut rng)?;
        let frame = rotate::rotate(&noised, degree as f64, self.config.background)?;

        let (decoded, elapsed) = self.decode(&frame);

        let (found, failure) = match decoded {
            Ok(results) => (count_valid(&results), None),
            Err(err) => {
                log::warn!("decode failed at {}°: {}", degree, err);
                (0, Some(err))
            }
        };
        log::debug!("{:>3}° found={} in {:?}", degree, found, elapsed);

        let sample = AngleSample {
            degrees: degree as u16,
            found,
            elapsed,
            failure,
        };
        Ok((sample, frame))
    }

    /// Call the oracle, bounded by `decode_timeout_ms` when set, and return
    /// the result with the time the oracle call itself took. A timed-out call
    /// keeps running on its helper thread; its result is discarded and the
    /// sample is charged the full limit.
    fn decode(&self, frame: &ImageBuffer) -> (Result<Vec<DecodeResult>, DecodeError>, Duration) {
        let Some(limit_ms) = self.config.decode_timeout_ms else {
            return timed_decode(&*self.oracle, frame);
        };
        let slot = match self.reserve_helper() {
            Ok(slot) => slot,
            Err(err) => return (Err(err), Duration::ZERO),
        };

        let (tx, rx) = mpsc::channel();
        let oracle = Arc::clone(&self.oracle);
        let owned = frame.clone();
        let spawned = thread::Builder::new()
            .name("sweep-decode".to_string())
            .spawn(move || {
                let _slot = slot;
                // receiver may already have given up
                let _ = tx.send(timed_decode(&*oracle, &owned));
            });
        if let Err(err) = spawned {
            log::debug!("cannot spawn decode thread ({}), decoding inline", err);
            return timed_decode(&*self.oracle, frame);
        }

        let limit = Duration::from_millis(limit_ms);
        match rx.recv_timeout(limit) {
            Ok(timed) => timed,
            Err(RecvTimeoutError::Timeout) => (Err(DecodeError::Timeout(limit_ms)), limit),
            Err(RecvTimeoutError::Disconnected) => (Err(DecodeError::Disconnected), Duration::ZERO),
        }
    }

    /// Claim a helper thread, unless `max_stalled_decodes` abandoned ones
    /// are already running. Up to `workers - 1` live helpers belong to
    /// decodes other workers are waiting on and are not counted as stalled.
    fn reserve_helper(&self) -> Result<HelperSlot, DecodeError> {
        let live = self.helpers.fetch_add(1, Ordering::SeqCst);
        let slot = HelperSlot(Arc::clone(&self.helpers));
        let stalled = live.saturating_sub(self.config.workers - 1);
        if stalled >= self.config.max_stalled_decodes {
            return Err(DecodeError::Stalled(stalled));
        }
        Ok(slot)
    }

    fn base_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }
}

/// One live helper thread; released when the helper exits.
struct HelperSlot(Arc<AtomicUsize>);

impl Drop for HelperSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Run one guarded oracle call under a stopwatch.
fn timed_decode<O: DecodeOracle + ?Sized>(
    oracle: &O,
    frame: &ImageBuffer,
) -> (Result<Vec<DecodeResult>, DecodeError>, Duration) {
    let watch = Stopwatch::start();
    let result = guarded_decode(oracle, frame);
    (result, watch.elapsed())
}

/// Independent, reproducible noise stream for one angle.
fn angle_rng(base_seed: u64, degree: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
    rng.set_stream(degree as u64);
    rng
}

/// Iterator returned by [`SweepController::frames`].
pub struct SweepFrames<'a, O> {
    controller: &'a SweepController<O>,
    canvas: ImageBuffer,
    base_seed: u64,
    next: usize,
}

impl<O: DecodeOracle + 'static> Iterator for SweepFrames<'_, O> {
    type Item = Result<(AngleSample, ImageBuffer), SweepError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= FULL_TURN {
            return None;
        }
        let degree = self.next;
        self.next += 1;
        Some(
            self.controller
                .process_angle(&self.canvas, self.base_seed, degree),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = FULL_TURN - self.next;
        (left, Some(left))
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelMode;
    use crate::oracle::SymbolFormat;

    /// Reports `per_call` valid results on every call.
    struct Constant {
        per_call: usize,
    }

    impl DecodeOracle for Constant {
        fn decode(&self, _: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
            Ok((0..self.per_call)
                .map(|_| DecodeResult::valid(SymbolFormat::QrCode, "data1"))
                .collect())
        }
    }

    /// Sequential stub: the n-th call is degree n.
    struct ByCall<F> {
        calls: AtomicUsize,
        answer: F,
    }

    impl<F> ByCall<F> {
        fn new(answer: F) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
            }
        }
    }

    impl<F> DecodeOracle for ByCall<F>
    where
        F: Fn(usize) -> Result<Vec<DecodeResult>, DecodeError> + Send + Sync,
    {
        fn decode(&self, _: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
            let degree = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)(degree)
        }
    }

    fn small_source() -> ImageBuffer {
        ImageBuffer::filled(6, 4, PixelMode::Rgb, 0).unwrap()
    }

    fn config() -> SweepConfig {
        SweepConfig {
            seed: Some(1234),
            decode_timeout_ms: None,
            ..SweepConfig::default()
        }
    }

    fn one_valid() -> Vec<DecodeResult> {
        vec![DecodeResult::valid(SymbolFormat::QrCode, "data1")]
    }

    #[test]
    fn always_valid_oracle_finds_every_angle() {
        let sweep = SweepController::new(Constant { per_call: 1 }, config()).unwrap();
        let record = sweep.run(&small_source(), "constant").unwrap();
        assert_eq!(record.outcome(), (360, 1.0));
        assert_eq!(record.decodable_ranges(), vec![(0, 359)]);
    }

    #[test]
    fn empty_oracle_finds_nothing() {
        let sweep = SweepController::new(Constant { per_call: 0 }, config()).unwrap();
        let record = sweep.run(&small_source(), "empty").unwrap();
        assert_eq!(record.outcome(), (0, 0.0));
        assert_eq!(record.samples.len(), FULL_TURN);
        assert!(record.decodable_ranges().is_empty());
    }

    #[test]
    fn near_identity_window_scores_21() {
        let oracle = ByCall::new(|degree| {
            Ok(if degree <= 10 || degree >= 350 {
                one_valid()
            } else {
                Vec::new()
            })
        });
        let sweep = SweepController::new(oracle, config()).unwrap();
        let record = sweep.run(&small_source(), "window").unwrap();
        let (found, ratio) = record.outcome();
        assert_eq!(found, 21);
        assert!((ratio - 21.0 / 360.0).abs() < 1e-12);
        assert!((ratio - 0.0583).abs() < 1e-4);
        assert_eq!(record.decodable_ranges(), vec![(0, 10), (350, 359)]);
    }

    #[test]
    fn decode_failures_count_as_zero_and_keep_length() {
        let oracle = ByCall::new(|degree| {
            if degree % 3 == 0 {
                Err(DecodeError::Backend("sensor glitch".to_string()))
            } else {
                Ok(one_valid())
            }
        });
        let sweep = SweepController::new(oracle, config()).unwrap();
        let record = sweep.run(&small_source(), "flaky").unwrap();
        assert_eq!(record.samples.len(), FULL_TURN);
        assert_eq!(record.failed_angles(), 120);
        assert_eq!(record.total_found(), 240);
        assert!(record.samples[0].failure.is_some());
        assert_eq!(record.samples[0].found, 0);
    }

    #[test]
    fn multiple_valid_results_are_summed() {
        let sweep = SweepController::new(Constant { per_call: 2 }, config()).unwrap();
        let record = sweep.run(&small_source(), "double").unwrap();
        assert_eq!(record.total_found(), 720);
        assert_eq!(record.success_ratio(), 2.0);
    }

    #[test]
    fn samples_are_indexed_by_degree() {
        let sweep = SweepController::new(Constant { per_call: 1 }, config()).unwrap();
        let record = sweep.run(&small_source(), "order").unwrap();
        for (i, sample) in record.samples.iter().enumerate() {
            assert_eq!(sample.degrees as usize, i);
        }
    }

    #[test]
    fn hook_sees_every_frame_in_order() {
        let sweep = SweepController::new(Constant { per_call: 1 }, config()).unwrap();
        let mut seen = Vec::new();
        let record = sweep
            .run_with(&small_source(), "hook", |sample, frame| {
                assert_eq!((frame.width(), frame.height()), (12, 12));
                seen.push(sample.degrees);
            })
            .unwrap();
        assert_eq!(seen, (0..360).collect::<Vec<u16>>());
        // frames are not kept unless asked
        assert!(record.frames.is_empty());
    }

    #[test]
    fn retained_frames_match_across_worker_counts() {
        let source = ImageBuffer::new(4, 2, PixelMode::Luma, vec![0, 40, 80, 120, 160, 200, 240, 20])
            .unwrap();
        let sequential = SweepController::new(
            Constant { per_call: 1 },
            SweepConfig {
                retain_frames: true,
                ..config()
            },
        )
        .unwrap()
        .run(&source, "seq")
        .unwrap();
        let parallel = SweepController::new(
            Constant { per_call: 1 },
            SweepConfig {
                retain_frames: true,
                workers: 7,
                ..config()
            },
        )
        .unwrap()
        .run(&source, "par")
        .unwrap();

        assert_eq!(sequential.frames.len(), FULL_TURN);
        assert_eq!(sequential.frames, parallel.frames);
        assert_eq!(parallel.outcome(), (360, 1.0));
        let degrees: Vec<u16> = parallel.samples.iter().map(|s| s.degrees).collect();
        assert_eq!(degrees, (0..360).collect::<Vec<u16>>());
    }

    #[test]
    fn parallel_hook_runs_in_degree_order() {
        let sweep = SweepController::new(
            Constant { per_call: 1 },
            SweepConfig {
                workers: 4,
                ..config()
            },
        )
        .unwrap();
        let mut seen = Vec::new();
        sweep
            .run_with(&small_source(), "par-hook", |sample, _| seen.push(sample.degrees))
            .unwrap();
        assert_eq!(seen, (0..360).collect::<Vec<u16>>());
    }

    #[test]
    fn hung_decode_times_out_and_sweep_completes() {
        let oracle = ByCall::new(|degree| {
            if degree == 5 {
                std::thread::sleep(Duration::from_millis(300));
            }
            Ok(one_valid())
        });
        let sweep = SweepController::new(
            oracle,
            SweepConfig {
                decode_timeout_ms: Some(50),
                ..config()
            },
        )
        .unwrap();
        let record = sweep.run(&small_source(), "slow").unwrap();
        assert_eq!(record.samples.len(), FULL_TURN);
        assert_eq!(record.samples[5].failure, Some(DecodeError::Timeout(50)));
        assert_eq!(record.samples[5].elapsed, Duration::from_millis(50));
        assert_eq!(record.total_found(), 359);
    }

    #[test]
    fn timed_decode_on_helper_measures_the_oracle_call() {
        let oracle = ByCall::new(|degree| {
            if degree == 3 {
                std::thread::sleep(Duration::from_millis(40));
            }
            Ok(one_valid())
        });
        let sweep = SweepController::new(
            oracle,
            SweepConfig {
                decode_timeout_ms: Some(5_000),
                ..config()
            },
        )
        .unwrap();
        let record = sweep.run(&small_source(), "timed").unwrap();
        assert!(record.samples[3].elapsed >= Duration::from_millis(40));
        assert!(record.samples[3].elapsed < Duration::from_millis(5_000));
        assert_eq!(record.total_found(), 360);
    }

    #[test]
    fn panicking_decoder_costs_one_angle_in_every_mode() {
        let modes = [
            ("inline", config()),
            (
                "parallel",
                SweepConfig {
                    workers: 4,
                    ..config()
                },
            ),
            (
                "timeout",
                SweepConfig {
                    decode_timeout_ms: Some(5_000),
                    ..config()
                },
            ),
            (
                "parallel-timeout",
                SweepConfig {
                    workers: 3,
                    decode_timeout_ms: Some(5_000),
                    ..config()
                },
            ),
        ];
        for (mode, config) in modes {
            // exactly one call panics, whichever worker makes it
            let oracle = ByCall::new(|call| {
                if call == 5 {
                    panic!("decoder exploded");
                }
                Ok(one_valid())
            });
            let sweep = SweepController::new(oracle, config).unwrap();
            let record = sweep.run(&small_source(), mode).unwrap();

            assert_eq!(record.samples.len(), FULL_TURN, "{mode}");
            assert_eq!(record.total_found(), 359, "{mode}");
            let failures: Vec<_> = record.samples.iter().filter_map(|s| s.failure.clone()).collect();
            assert_eq!(
                failures,
                vec![DecodeError::Panicked("decoder exploded".to_string())],
                "{mode}"
            );
        }
    }

    #[test]
    fn abandoned_decodes_are_capped() {
        struct Hangs;
        impl DecodeOracle for Hangs {
            fn decode(&self, _: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
                std::thread::sleep(Duration::from_millis(800));
                Ok(one_valid())
            }
        }

        let sweep = SweepController::new(
            Hangs,
            SweepConfig {
                decode_timeout_ms: Some(10),
                max_stalled_decodes: 2,
                ..config()
            },
        )
        .unwrap();
        let record = sweep.run(&small_source(), "hangs").unwrap();

        assert_eq!(record.samples.len(), FULL_TURN);
        assert_eq!(record.total_found(), 0);
        assert_eq!(record.samples[0].failure, Some(DecodeError::Timeout(10)));
        assert_eq!(record.samples[1].failure, Some(DecodeError::Timeout(10)));
        assert_eq!(record.samples[2].failure, Some(DecodeError::Stalled(2)));
        assert_eq!(record.samples[2].elapsed, Duration::ZERO);
        assert!(sweep.helpers.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn frames_iterator_yields_full_turn() {
        let sweep = SweepController::new(Constant { per_call: 1 }, config()).unwrap();
        let frames = sweep.frames(&small_source()).unwrap();
        assert_eq!(frames.size_hint(), (360, Some(360)));
        let collected: Vec<_> = frames.collect::<Result<_, _>>().unwrap();
        assert_eq!(collected.len(), FULL_TURN);
        assert_eq!(collected[359].0.degrees, 359);
    }

    #[test]
    fn zero_noise_quarter_turn_frame_is_exact() {
        let source = ImageBuffer::new(2, 1, PixelMode::Luma, vec![0, 100]).unwrap();
        let sweep = SweepController::new(
            Constant { per_call: 0 },
            SweepConfig {
                noise_stddev: 0.0,
                ..config()
            },
        )
        .unwrap();
        let canvas = sweep.prepare_canvas(&source).unwrap();
        let frames: Vec<_> = sweep
            .frames(&source)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(frames[0].1, canvas);
        assert_eq!(frames[90].1, rotate::rotate(&canvas, 90.0, 255).unwrap());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let bad = SweepConfig {
            workers: 0,
            ..config()
        };
        assert!(matches!(
            SweepController::new(Constant { per_call: 1 }, bad),
            Err(SweepError::Config(_))
        ));
    }

    #[test]
    fn latency_stats_cover_all_angles() {
        let sweep = SweepController::new(Constant { per_call: 1 }, config()).unwrap();
        let record = sweep.run(&small_source(), "latency").unwrap();
        let stats = record.latency().unwrap();
        assert!(stats.min_ms <= stats.median_ms && stats.median_ms <= stats.max_ms);
    }
}
