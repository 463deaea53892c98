//! ffmpeg-backed media probe/extractor
//!
//! Production `MediaProbe` implementation shelling out to `ffprobe` for the
//! duration and `ffmpeg` for single-frame extraction. Binary paths come
//! from configuration and default to PATH lookup.

use crate::types::{ExtractionError, MediaProbe, ProbeError};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Media probe/extractor backed by the ffmpeg command-line tools
pub struct FfmpegMediaProbe {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl Default for FfmpegMediaProbe {
    fn default() -> Self {
        Self::new("ffmpeg".to_string(), "ffprobe".to_string())
    }
}

impl FfmpegMediaProbe {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }
}

#[async_trait::async_trait]
impl MediaProbe for FfmpegMediaProbe {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn probe_duration(&self, video: &Path) -> Result<f64, ProbeError> {
        let output = Command::new(&self.ffprobe_path)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(video)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::Process(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration: f64 = stdout
            .trim()
            .parse()
            .map_err(|_| ProbeError::Parse(stdout.trim().to_string()))?;

        if !duration.is_finite() || duration <= 0.0 {
            return Err(ProbeError::InvalidDuration(duration));
        }

        debug!(video = %video.display(), duration, "probed video duration");
        Ok(duration)
    }

    async fn extract_frame(&self, video: &Path, t: f64) -> Result<Vec<u8>, ExtractionError> {
        let workspace = tempfile::Builder::new()
            .prefix("formcheck-frame-")
            .tempdir()?;
        let out_path = workspace.path().join("frame.jpg");

        // Seek before the input for fast keyframe-relative seeking; frame
        // accuracy beyond that is out of scope.
        let output = Command::new(&self.ffmpeg_path)
            .arg("-v")
            .arg("error")
            .arg("-ss")
            .arg(format!("{:.3}", t.max(0.0)))
            .arg("-i")
            .arg(video)
            .arg("-frames:v")
            .arg("1")
            .arg("-q:v")
            .arg("2")
            .arg("-y")
            .arg(&out_path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Process(stderr.trim().to_string()));
        }

        let bytes = tokio::fs::read(&out_path).await.map_err(|_| {
            ExtractionError::Process(format!("no frame produced at t={:.3}", t))
        })?;
        debug!(video = %video.display(), t, bytes = bytes.len(), "extracted frame");
        Ok(bytes)
    }
}
