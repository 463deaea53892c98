//! HTTP emotion detector client
//!
//! Production `EmotionDetector` implementation posting frames to an
//! external face/emotion detection service as base64-encoded JSON. Labels
//! outside the closed emotion set are skipped, not treated as errors.

use crate::types::{
    BoundingBox, DetectedFace, DetectionError, EmotionDetector, EmotionLabel, EmotionReading,
};
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default timeout for detector requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Face/emotion detector reached over HTTP
pub struct HttpEmotionDetector {
    http_client: Client,
    endpoint: String,
}

impl HttpEmotionDetector {
    /// Client for the detector service at `endpoint` (base URL)
    pub fn new(endpoint: String) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    faces: Vec<WireFace>,
}

#[derive(Debug, Deserialize)]
struct WireFace {
    #[serde(default)]
    bounding_box: BoundingBox,
    #[serde(default)]
    emotions: Vec<WireEmotion>,
}

#[derive(Debug, Deserialize)]
struct WireEmotion {
    label: String,
    #[serde(default)]
    confidence: f64,
}

/// Parse a detector response body into the face model
///
/// Unknown labels are dropped with a debug log; confidences are clamped to
/// [0,100] on the way in.
fn parse_response(body: &str) -> Result<Vec<DetectedFace>, DetectionError> {
    let wire: WireResponse =
        serde_json::from_str(body).map_err(|e| DetectionError::Parse(e.to_string()))?;

    let faces = wire
        .faces
        .into_iter()
        .map(|face| DetectedFace {
            bounding_box: face.bounding_box,
            emotions: face
                .emotions
                .into_iter()
                .filter_map(|emotion| match EmotionLabel::parse(&emotion.label) {
                    Some(label) => Some(EmotionReading {
                        label,
                        confidence: emotion.confidence.clamp(0.0, 100.0),
                    }),
                    None => {
                        debug!(label = %emotion.label, "unknown emotion label skipped");
                        None
                    }
                })
                .collect(),
        })
        .collect();
    Ok(faces)
}

#[async_trait::async_trait]
impl EmotionDetector for HttpEmotionDetector {
    fn name(&self) -> &'static str {
        "http-detector"
    }

    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<DetectedFace>, DetectionError> {
        let payload = json!({
            "image": base64::engine::general_purpose::STANDARD.encode(image),
        });

        let response = self
            .http_client
            .post(format!("{}/detect", self.endpoint))
            .json(&payload)
            .send()
            .await
            .map_err(|e| DetectionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DetectionError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(DetectionError::Api(format!(
                "detector returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_faces_with_known_labels() {
        let body = r#"{
            "faces": [{
                "bounding_box": { "left": 0.1, "top": 0.2, "width": 0.3, "height": 0.4 },
                "emotions": [
                    { "label": "HAPPY", "confidence": 93.5 },
                    { "label": "CALM", "confidence": 4.1 }
                ]
            }]
        }"#;
        let faces = parse_response(body).unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].emotions.len(), 2);
        assert_eq!(faces[0].emotions[0].label, EmotionLabel::Happy);
        assert!((faces[0].bounding_box.area() - 0.12).abs() < 1e-12);
    }

    #[test]
    fn unknown_labels_are_skipped_not_fatal() {
        let body = r#"{
            "faces": [{
                "emotions": [
                    { "label": "BORED", "confidence": 80.0 },
                    { "label": "sad", "confidence": 20.0 }
                ]
            }]
        }"#;
        let faces = parse_response(body).unwrap();
        assert_eq!(faces[0].emotions.len(), 1);
        assert_eq!(faces[0].emotions[0].label, EmotionLabel::Sad);
    }

    #[test]
    fn confidences_are_clamped_on_ingest() {
        let body = r#"{
            "faces": [{
                "emotions": [
                    { "label": "HAPPY", "confidence": 250.0 },
                    { "label": "ANGRY", "confidence": -5.0 }
                ]
            }]
        }"#;
        let faces = parse_response(body).unwrap();
        assert_eq!(faces[0].emotions[0].confidence, 100.0);
        assert_eq!(faces[0].emotions[1].confidence, 0.0);
    }

    #[test]
    fn empty_and_absent_faces_parse_to_no_faces() {
        assert!(parse_response(r#"{ "faces": [] }"#).unwrap().is_empty());
        assert!(parse_response("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(
            parse_response("not json"),
            Err(DetectionError::Parse(_))
        ));
    }
}
