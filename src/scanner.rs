use serde::Serialize;
use std::io::{Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ScanError;
use crate::view::Controls;

/// Where decoded barcodes are delivered while a session runs.
pub type DetectionSink = mpsc::UnboundedSender<String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DecoderError {
    pub message: String,
}

impl DecoderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    Environment,
    User,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    #[serde(rename = "ean_reader")]
    Ean13,
    #[serde(rename = "ean_8_reader")]
    Ean8,
}

impl Symbology {
    fn length(self) -> usize {
        match self {
            Symbology::Ean13 => 13,
            Symbology::Ean8 => 8,
        }
    }

    /// True when `code` is a well-formed symbol of this family, check digit included.
    pub fn accepts(self, code: &str) -> bool {
        if code.len() != self.length() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();
        let (check, data) = match digits.split_last() {
            Some(split) => split,
            None => return false,
        };
        let sum: u32 = data
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
            .sum();
        (10 - sum % 10) % 10 == *check
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PatchSize {
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LocatorConfig {
    pub patch_size: PatchSize,
    pub half_sample: bool,
}

/// Live-stream decoder settings: rear camera, EAN only, medium patches at half resolution.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DecoderConfig {
    pub facing_mode: FacingMode,
    pub readers: Vec<Symbology>,
    pub locator: LocatorConfig,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            readers: vec![Symbology::Ean13],
            locator: LocatorConfig {
                patch_size: PatchSize::Medium,
                half_sample: true,
            },
        }
    }
}

/// A live barcode decoding engine.
pub trait BarcodeDecoder {
    fn start(&mut self, config: &DecoderConfig, sink: DetectionSink) -> Result<(), DecoderError>;
    fn stop(&mut self);
}

/// Blocking user notification, used only when the decoder cannot start.
pub trait Notifier {
    fn alert(&self, message: &str);
}

pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("\n!! {message}\n");
    }
}

/// Owns the decoder and the camera session flag.
pub struct ScannerAdapter {
    decoder: Box<dyn BarcodeDecoder>,
    config: DecoderConfig,
    sink: DetectionSink,
    active: bool,
}

impl ScannerAdapter {
    pub fn new(decoder: Box<dyn BarcodeDecoder>, sink: DetectionSink) -> Self {
        Self::with_config(decoder, DecoderConfig::default(), sink)
    }

    pub fn with_config(
        decoder: Box<dyn BarcodeDecoder>,
        config: DecoderConfig,
        sink: DetectionSink,
    ) -> Self {
        Self { decoder, config, sink, active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn start(
        &mut self,
        controls: &mut Controls,
        notifier: &dyn Notifier,
    ) -> Result<(), ScanError> {
        if self.active {
            return Ok(());
        }
        debug!("Starting decoder with {:?}", self.config);

        if let Err(e) = self.decoder.start(&self.config, self.sink.clone()) {
            warn!("Decoder failed to start: {e}");
            let err = ScanError::CameraInit(e);
            notifier.alert(&err.to_string());
            self.stop(controls);
            return Err(err);
        }

        self.active = true;
        controls.set_camera_engaged(true);
        info!("Camera session started");
        Ok(())
    }

    /// No-op unless a session is running.
    pub fn stop(&mut self, controls: &mut Controls) {
        if !self.active {
            return;
        }
        self.decoder.stop();
        self.active = false;
        controls.set_camera_engaged(false);
        info!("Camera session stopped");
    }

    pub fn toggle(
        &mut self,
        controls: &mut Controls,
        notifier: &dyn Notifier,
    ) -> Result<(), ScanError> {
        if self.active {
            self.stop(controls);
            Ok(())
        } else {
            self.start(controls, notifier)
        }
    }

    /// Consumes one detection per activation: ends the session and fills the
    /// manual field. Detections arriving while inactive are dropped.
    pub fn on_detected(&mut self, controls: &mut Controls, code: &str) -> Option<String> {
        if !self.active {
            debug!("Dropping detection {code} outside a camera session");
            return None;
        }
        info!("Barcode detected: {code}");
        self.stop(controls);
        controls.manual_input = code.to_string();
        Some(code.to_string())
    }
}

/// Reads already-decoded barcodes line by line from a device or file, the way
/// USB and serial scanners present themselves. Lines that are not a valid
/// symbol of a configured reader are skipped. Each session reads up to its
/// first valid code; on a regular file the next session resumes after it.
pub struct LineFeedDecoder {
    path: PathBuf,
    consumed: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl LineFeedDecoder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            consumed: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    /// Bytes of a regular-file feed already read by earlier sessions.
    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::SeqCst)
    }
}

impl BarcodeDecoder for LineFeedDecoder {
    fn start(&mut self, config: &DecoderConfig, sink: DetectionSink) -> Result<(), DecoderError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| DecoderError::new(format!("no async runtime: {e}")))?;
        let feed_error =
            |e: std::io::Error| DecoderError::new(format!("{}: {e}", self.path.display()));

        let mut file = std::fs::File::open(&self.path).map_err(feed_error)?;
        let seekable = file.metadata().map(|m| m.is_file()).unwrap_or(false);
        if seekable {
            file.seek(SeekFrom::Start(self.consumed())).map_err(feed_error)?;
        }
        let file = tokio::fs::File::from_std(file);
        let readers = config.readers.clone();
        let consumed = self.consumed.clone();

        self.stop();
        self.task = Some(runtime.spawn(async move {
            let mut reader = BufReader::new(file);
            let mut line = String::new();
            loop {
                line.clear();
                let read = match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(read) => read,
                    Err(e) => {
                        warn!("Barcode feed read failed: {e}");
                        break;
                    }
                };
                if seekable {
                    consumed.fetch_add(read as u64, Ordering::SeqCst);
                }
                let code = line.trim();
                if !readers.iter().any(|r| r.accepts(code)) {
                    debug!("Skipping unreadable frame {code:?}");
                    continue;
                }
                if sink.send(code.to_string()).is_err() {
                    debug!("Detection sink closed");
                }
                break;
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for LineFeedDecoder {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decoder used when no barcode feed is configured.
pub struct NoCamera;

impl BarcodeDecoder for NoCamera {
    fn start(&mut self, _config: &DecoderConfig, _sink: DetectionSink) -> Result<(), DecoderError> {
        Err(DecoderError::new("no barcode feed configured (set HEALTH_SCANNER_FEED or --feed)"))
    }

    fn stop(&mut self) {}
}
