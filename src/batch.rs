//! Batch runner: encode several payloads and sweep each resulting image.
//!
//! A job whose payload cannot be encoded is logged, listed as skipped and
//! does not stop the batch. A sweep that aborts does.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::BatchConfig;
use crate::encoder::{BarcodeEncoder, SymbolEncoder, SymbolType};
use crate::error::SweepError;
use crate::image::ImageBuffer;
use crate::oracle::DecodeOracle;
use crate::report::{BatchReport, SkippedJob, SweepSummary};
use crate::sweep::{AngleSample, SweepController, SweepRecord};

/// One payload to encode as one symbology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeJob {
    pub payload: String,
    pub symbol: SymbolType,
}

impl EncodeJob {
    pub fn new(payload: impl Into<String>, symbol: SymbolType) -> Self {
        Self {
            payload: payload.into(),
            symbol,
        }
    }

    /// The jobs the sweep is usually run with: one symbol of each
    /// symbology, so their scan times can be compared side by side.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("data1", SymbolType::DataMatrix),
            Self::new("data2", SymbolType::QrCode),
        ]
    }
}

/// `payload:symbol`. The payload itself may contain colons.
impl FromStr for EncodeJob {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (payload, symbol) = s
            .rsplit_once(':')
            .ok_or_else(|| SweepError::Config(format!("expected payload:symbol, got `{}`", s)))?;
        let symbol = SymbolType::parse(symbol)
            .ok_or_else(|| SweepError::Config(format!("unknown symbology `{}`", symbol)))?;
        if payload.is_empty() {
            return Err(SweepError::Config("payload must not be empty".to_string()));
        }
        Ok(Self::new(payload, symbol))
    }
}

/// Records of every completed sweep plus the skipped jobs.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub records: Vec<SweepRecord>,
    pub skipped: Vec<SkippedJob>,
}

impl BatchRun {
    pub fn report(&self) -> BatchReport {
        BatchReport::new(
            self.records.iter().map(SweepSummary::from).collect(),
            self.skipped.clone(),
        )
    }
}

pub struct BatchRunner<E, O> {
    encoder: E,
    controller: SweepController<O>,
    match_sizes: bool,
}

impl<O: DecodeOracle + 'static> BatchRunner<BarcodeEncoder, O> {
    /// Encode with the settings from `config.encoder`.
    pub fn from_config(oracle: O, config: BatchConfig) -> Result<Self, SweepError> {
        let encoder = config.encoder;
        Self::new(encoder, Arc::new(oracle), config)
    }
}

impl<E: SymbolEncoder, O: DecodeOracle + 'static> BatchRunner<E, O> {
    pub fn new(encoder: E, oracle: Arc<O>, config: BatchConfig) -> Result<Self, SweepError> {
        config.validate()?;
        Ok(Self {
            encoder,
            controller: SweepController::with_shared(oracle, config.sweep)?,
            match_sizes: config.match_sizes,
        })
    }

    pub fn controller(&self) -> &SweepController<O> {
        &self.controller
    }

    pub fn run(&self, jobs: &[EncodeJob]) -> Result<BatchRun, SweepError> {
        self.run_with(jobs, |_, _, _| {})
    }

    /// Like [`run`](Self::run), calling `hook(label, sample, frame)` for every
    /// angle of every sweep.
    pub fn run_with<F>(&self, jobs: &[EncodeJob], mut hook: F) -> Result<BatchRun, SweepError>
    where
        F: FnMut(&str, &AngleSample, &ImageBuffer),
    {
        log::info!("batch of {} job(s)", jobs.len());
        let (images, skipped) = self.encode_all(jobs);
        let images = if self.match_sizes {
            match_sizes(images)?
        } else {
            images
        };

        let mut records = Vec::with_capacity(images.len());
        for (label, image) in &images {
            let record = self
                .controller
                .run_with(image, label, |sample, frame| hook(label.as_str(), sample, frame))?;
            records.push(record);
        }

        log::info!(
            "batch finished: {} swept, {} skipped",
            records.len(),
            skipped.len()
        );
        Ok(BatchRun { records, skipped })
    }

    fn encode_all(&self, jobs: &[EncodeJob]) -> (Vec<(String, ImageBuffer)>, Vec<SkippedJob>) {
        let mut images = Vec::new();
        let mut skipped = Vec::new();
        for job in jobs {
            match self.encoder.encode(job.payload.as_bytes(), job.symbol) {
                Ok(image) => images.push((job.payload.clone(), image)),
                Err(err) => {
                    log::warn!("skipping {} ({}): {}", job.payload, job.symbol, err);
                    skipped.push(SkippedJob {
                        label: job.payload.clone(),
                        symbol: job.symbol,
                        reason: err.to_string(),
                    });
                }
            }
        }
        (images, skipped)
    }
}

/// Stretch every image to the largest width and height in the set.
fn match_sizes(
    images: Vec<(String, ImageBuffer)>,
) -> Result<Vec<(String, ImageBuffer)>, SweepError> {
    let width = images.iter().map(|(_, i)| i.width()).max().unwrap_or(0);
    let height = images.iter().map(|(_, i)| i.height()).max().unwrap_or(0);
    images
        .into_iter()
        .map(|(label, image)| {
            if (image.width(), image.height()) == (width, height) {
                return Ok((label, image));
            }
            log::debug!(
                "resizing {} from {}x{} to {}x{}",
                label,
                image.width(),
                image.height(),
                width,
                height
            );
            Ok((label, image.resize_nearest(width, height)?))
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SweepConfig;
    use crate::error::{DecodeError, EncodeError};
    use crate::image::PixelMode;
    use crate::oracle::{DecodeResult, SymbolFormat};

    /// Square grey image whose side is the payload length.
    struct LengthEncoder;

    impl SymbolEncoder for LengthEncoder {
        fn encode(&self, payload: &[u8], symbol: SymbolType) -> Result<ImageBuffer, EncodeError> {
            if symbol == SymbolType::DataMatrix {
                return Err(EncodeError::Unsupported(symbol.to_string()));
            }
            ImageBuffer::filled(payload.len(), payload.len(), PixelMode::Luma, 0)
                .map_err(|e| EncodeError::Payload(e.to_string()))
        }
    }

    struct Always;

    impl DecodeOracle for Always {
        fn decode(&self, _: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
            Ok(vec![DecodeResult::valid(SymbolFormat::QrCode, "x")])
        }
    }

    fn config(match_sizes: bool) -> BatchConfig {
        BatchConfig {
            sweep: SweepConfig {
                seed: Some(9),
                decode_timeout_ms: None,
                ..SweepConfig::default()
            },
            match_sizes,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn unsupported_jobs_are_skipped() {
        let runner = BatchRunner::new(LengthEncoder, Arc::new(Always), config(false)).unwrap();
        let jobs = [
            EncodeJob::new("abcd", SymbolType::DataMatrix),
            EncodeJob::new("abcdef", SymbolType::QrCode),
        ];
        let run = runner.run(&jobs).unwrap();
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].source.label, "abcdef");
        assert_eq!(run.records[0].outcome(), (360, 1.0));
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].symbol, SymbolType::DataMatrix);
    }

    #[test]
    fn sizes_are_matched_to_the_largest() {
        let runner = BatchRunner::new(LengthEncoder, Arc::new(Always), config(true)).unwrap();
        let jobs = [
            EncodeJob::new("ab", SymbolType::QrCode),
            EncodeJob::new("abcde", SymbolType::QrCode),
        ];
        let run = runner.run(&jobs).unwrap();
        let sizes: Vec<_> = run
            .records
            .iter()
            .map(|r| (r.source.width, r.source.height))
            .collect();
        assert_eq!(sizes, vec![(5, 5), (5, 5)]);
    }

    #[test]
    fn sizes_left_alone_when_disabled() {
        let runner = BatchRunner::new(LengthEncoder, Arc::new(Always), config(false)).unwrap();
        let run = runner
            .run(&[EncodeJob::new("ab", SymbolType::QrCode), EncodeJob::new("abc", SymbolType::QrCode)])
            .unwrap();
        assert_eq!(run.records[0].source.width, 2);
        assert_eq!(run.records[1].source.width, 3);
    }

    #[test]
    fn hook_is_labelled_per_sweep() {
        let runner = BatchRunner::new(LengthEncoder, Arc::new(Always), config(false)).unwrap();
        let mut labels = Vec::new();
        runner
            .run_with(
                &[EncodeJob::new("ab", SymbolType::QrCode), EncodeJob::new("cd", SymbolType::QrCode)],
                |label, _, _| labels.push(label.to_string()),
            )
            .unwrap();
        assert_eq!(labels.len(), 720);
        assert_eq!(labels[0], "ab");
        assert_eq!(labels[719], "cd");
    }

    #[test]
    fn report_lists_everything() {
        let runner = BatchRunner::new(LengthEncoder, Arc::new(Always), config(false)).unwrap();
        let report = runner
            .run(&[EncodeJob::new("ab", SymbolType::QrCode), EncodeJob::new("zz", SymbolType::DataMatrix)])
            .unwrap()
            .report();
        assert_eq!(report.sweeps.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.sweeps[0].total_found, 360);
    }

    #[test]
    fn job_strings_parse() {
        assert_eq!(
            "data1:qrcode".parse::<EncodeJob>().unwrap(),
            EncodeJob::new("data1", SymbolType::QrCode)
        );
        assert_eq!(
            "http://x:datamatrix".parse::<EncodeJob>().unwrap(),
            EncodeJob::new("http://x", SymbolType::DataMatrix)
        );
        assert!("data1".parse::<EncodeJob>().is_err());
        assert!("data1:ean13".parse::<EncodeJob>().is_err());
        assert!(":qrcode".parse::<EncodeJob>().is_err());
    }

    #[test]
    fn default_jobs_cover_both_symbologies() {
        let runner = BatchRunner::from_config(Always, config(true)).unwrap();
        let jobs = EncodeJob::defaults();
        assert_eq!(
            jobs.iter().map(|j| j.symbol).collect::<Vec<_>>(),
            vec![SymbolType::DataMatrix, SymbolType::QrCode]
        );
        let run = runner.run(&jobs).unwrap();
        assert!(run.skipped.is_empty());
        assert_eq!(run.records.len(), 2);
        assert_eq!(run.records[0].source.label, "data1");
        assert_eq!(run.records[0].source.width, run.records[1].source.width);
        assert_eq!(run.records[0].source.height, run.records[1].source.height);
    }
}
