//! Edit pipeline
//!
//! Applies an [`EditSet`] to an image in caller order:
//!
//! ```text
//! decode → resize → per-edit processing → encode → base64
//! ```
//!
//! Edits that compute parameters from the image size (`overlayWith`,
//! `TEPWatermark`, `smartCrop`) see post-resize dimensions: when the
//! resize directive comes later in the set, it is applied before them
//! and skipped at its own position.

mod request;

pub use request::ImageRequest;

use aws_sdk_rekognition::Client as RekognitionClient;
use aws_sdk_s3::Client as S3Client;
use base64::Engine;
use std::sync::Arc;
use tracing::{debug, info};

use crate::aws::load_sdk_config;
use crate::config::{Config, ProcessingConfig};
use crate::edits::{EditDirective, EditSet, ResizeOptions};
use crate::error::EditError;
use crate::imaging::{ensure_within_limit, ImageHandle, ImageMetadata};
use crate::overlay::{build_overlay_layer, OverlayFetcher, S3OverlayFetcher};
use crate::smart_crop::{apply_smart_crop, FaceDetector, RekognitionFaceDetector};
use crate::watermark::WatermarkComposer;

/// Runs edit requests against injected storage and face detection.
///
/// Holds no per-request state; one handler serves any number of
/// concurrent requests.
pub struct ImageHandler {
    fetcher: Arc<dyn OverlayFetcher>,
    detector: Arc<dyn FaceDetector>,
    watermark: WatermarkComposer,
    processing: ProcessingConfig,
    watermark_enabled: bool,
}

/// Tracks the set's resize directive so it runs exactly once.
struct ResizeState<'a> {
    options: Option<&'a ResizeOptions>,
    position: Option<usize>,
    applied: bool,
}

impl<'a> ResizeState<'a> {
    fn new(edits: &'a EditSet) -> Self {
        let position = edits
            .iter()
            .position(|d| matches!(d, EditDirective::Resize(_)));
        Self {
            options: edits.resize(),
            position,
            applied: false,
        }
    }

    fn pending(&self) -> Option<&'a ResizeOptions> {
        if self.applied {
            None
        } else {
            self.options
        }
    }

    /// Dimensions the image will have once the pending resize has run.
    ///
    /// Fails up front when those dimensions exceed the handle's pixel limit,
    /// before anything is fetched or rendered for them.
    fn projected(&self, handle: &ImageHandle) -> Result<ImageMetadata, EditError> {
        let Some(options) = self.pending() else {
            return Ok(handle.metadata());
        };
        let plan = options.plan(handle.metadata());
        ensure_within_limit(plan.scaled, handle.max_pixels())?;
        ensure_within_limit(plan.output, handle.max_pixels())?;
        Ok(plan.output)
    }

    fn flush(&mut self, handle: &mut ImageHandle) -> Result<(), EditError> {
        if let Some(options) = self.pending() {
            debug!("Applying pending resize ahead of its position");
            handle.resize(options)?;
            self.applied = true;
        }
        Ok(())
    }
}

impl ImageHandler {
    pub fn new(
        fetcher: Arc<dyn OverlayFetcher>,
        detector: Arc<dyn FaceDetector>,
        watermark: WatermarkComposer,
        processing: ProcessingConfig,
    ) -> Self {
        Self {
            fetcher,
            detector,
            watermark,
            processing,
            watermark_enabled: true,
        }
    }

    /// Accept watermark edits without compositing them when `enabled` is false.
    pub fn with_watermark_enabled(mut self, enabled: bool) -> Self {
        self.watermark_enabled = enabled;
        self
    }

    /// Build a handler with S3 and Rekognition clients from configuration.
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = load_sdk_config(&config.aws).await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.aws.force_path_style)
            .build();
        let fetcher = S3OverlayFetcher::new(S3Client::from_conf(s3_config), &config.overlay_cache);
        let detector = RekognitionFaceDetector::new(RekognitionClient::new(&sdk_config));

        info!(
            region = ?sdk_config.region().map(|r| r.as_ref().to_string()),
            endpoint = ?config.aws.endpoint,
            overlay_cache_entries = config.overlay_cache.max_entries,
            watermark_enabled = config.watermark.enabled,
            "Image handler initialized"
        );

        Self::new(
            Arc::new(fetcher),
            Arc::new(detector),
            WatermarkComposer::new(),
            config.processing.clone(),
        )
        .with_watermark_enabled(config.watermark.enabled)
    }

    pub fn processing(&self) -> &ProcessingConfig {
        &self.processing
    }

    /// Decode `original` and apply `edits` in order.
    pub async fn apply(&self, original: &[u8], edits: &EditSet) -> Result<ImageHandle, EditError> {
        let max_pixels = self.processing.max_input_pixels;
        let mut handle = ImageHandle::open(original, max_pixels)?;
        let mut resize = ResizeState::new(edits);

        for (index, directive) in edits.iter().enumerate() {
            debug!(edit = directive.name(), index = index, "Applying edit");

            match directive {
                EditDirective::Resize(options) => {
                    if resize.position == Some(index) {
                        resize.flush(&mut handle)?;
                    } else {
                        handle.resize(options)?;
                    }
                }
                EditDirective::Rotate(angle) => handle.rotate(*angle)?,
                EditDirective::Overlay(spec) => {
                    let base = resize.projected(&handle)?;
                    let layer =
                        build_overlay_layer(self.fetcher.as_ref(), spec, base, max_pixels).await?;
                    resize.flush(&mut handle)?;
                    handle.composite(vec![layer]);
                }
                EditDirective::SmartCrop(options) => {
                    resize.flush(&mut handle)?;
                    apply_smart_crop(&mut handle, self.detector.as_ref(), options).await?;
                }
                EditDirective::Watermark(spec) => {
                    if !self.watermark_enabled {
                        debug!("Watermarking disabled, skipping");
                        continue;
                    }
                    let base = resize.projected(&handle)?;
                    let layer = self
                        .watermark
                        .build_layer(self.fetcher.as_ref(), spec, base, max_pixels)
                        .await?;
                    resize.flush(&mut handle)?;
                    if let Some(layer) = layer {
                        handle.composite(vec![layer]);
                    }
                }
                EditDirective::Operation { name, params } => {
                    handle.apply_operation(name, params)?;
                }
            }
        }

        Ok(handle)
    }

    /// Run a request end to end and return the result base64-encoded.
    ///
    /// A request without edits returns the original bytes unchanged.
    pub async fn process(&self, request: &ImageRequest) -> Result<String, EditError> {
        let engine = &base64::engine::general_purpose::STANDARD;

        let Some(edits) = request.applicable_edits() else {
            debug!(bytes = request.original.len(), "No edits requested, returning original");
            return Ok(engine.encode(&request.original));
        };

        let handle = self.apply(&request.original, edits).await?;
        let format = handle.output_format(request.output_format, self.processing.fallback_format);
        let encoded = handle.encode(format, self.processing.default_quality)?;

        let size = handle.metadata();
        info!(
            edits = edits.requested_len(),
            input_bytes = request.original.len(),
            width = size.width,
            height = size.height,
            format = %format,
            bytes = encoded.data.len(),
            "Processed image"
        );

        Ok(engine.encode(&encoded.data))
    }
}

impl std::fmt::Debug for ImageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandler")
            .field("watermark", &self.watermark)
            .field("processing", &self.processing)
            .field("watermark_enabled", &self.watermark_enabled)
            .finish()
    }
}
