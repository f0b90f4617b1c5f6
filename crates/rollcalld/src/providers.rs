//! Bus adapters for the inference sidecar.
//!
//! The daemon never owns the camera or runs model inference itself; both
//! live in a sidecar service on the bus, and these adapters bridge it to
//! the engine's collaborator traits. Structured payloads cross the bus as
//! JSON strings.

use async_trait::async_trait;
use rollcall_core::{DetectedFace, Embedding};
use rollcall_engine::{
    DetectOptions, DetectorError, FaceDetector, Frame, VideoError, VideoSource,
};
use zbus::proxy;

/// Client side of the inference sidecar.
///
/// Bus name: org.rollcall.Inference1
/// Object path: /org/rollcall/Inference1
#[proxy(
    interface = "org.rollcall.Inference1",
    default_service = "org.rollcall.Inference1",
    default_path = "/org/rollcall/Inference1"
)]
pub trait Inference {
    /// Current camera frame as (grayscale bytes, width, height).
    /// Empty data means no frame is available right now.
    fn capture_frame(&self) -> zbus::Result<(Vec<u8>, u32, u32)>;

    /// Detect faces in a frame; returns a JSON array of detections.
    fn detect_faces(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        min_score: f64,
        input_size: u32,
    ) -> zbus::Result<String>;

    /// Derive one embedding from a reference image; returns a JSON
    /// embedding, or `null` when the image has no detectable face.
    fn embed_face(&self, image_ref: &str) -> zbus::Result<String>;
}

/// [`FaceDetector`] backed by the inference sidecar.
pub struct BusDetector {
    proxy: InferenceProxy<'static>,
}

impl BusDetector {
    pub fn new(proxy: InferenceProxy<'static>) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl FaceDetector for BusDetector {
    async fn detect_faces(
        &self,
        frame: &Frame,
        options: &DetectOptions,
    ) -> Result<Vec<DetectedFace>, DetectorError> {
        let raw = self
            .proxy
            .detect_faces(
                &frame.data,
                frame.width,
                frame.height,
                options.min_score as f64,
                options.input_size,
            )
            .await
            .map_err(|e| DetectorError::BackendUnavailable(e.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| DetectorError::InferenceFailed(format!("bad detection payload: {e}")))
    }

    async fn embed_single_face(
        &self,
        image_ref: &str,
    ) -> Result<Option<Embedding>, DetectorError> {
        let raw = self
            .proxy
            .embed_face(image_ref)
            .await
            .map_err(|e| DetectorError::BackendUnavailable(e.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| DetectorError::InferenceFailed(format!("bad embedding payload: {e}")))
    }
}

/// [`VideoSource`] backed by the sidecar's camera.
pub struct BusVideo {
    proxy: InferenceProxy<'static>,
}

impl BusVideo {
    pub fn new(proxy: InferenceProxy<'static>) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl VideoSource for BusVideo {
    async fn current_frame(&self) -> Result<Option<Frame>, VideoError> {
        let (data, width, height) = self
            .proxy
            .capture_frame()
            .await
            .map_err(|e| VideoError::CaptureFailed(e.to_string()))?;
        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(Frame {
            data,
            width,
            height,
        }))
    }
}
