//! Service layer
//!
//! Orchestration components and the production collaborator
//! implementations (ffmpeg media probe, HTTP emotion detector).

pub mod emotion_client;
pub mod ffmpeg;
pub mod frame_sampler;
pub mod landmark_aggregator;

pub use emotion_client::HttpEmotionDetector;
pub use ffmpeg::FfmpegMediaProbe;
pub use frame_sampler::{FrameSampler, VideoAnalysis};
pub use landmark_aggregator::LandmarkAggregator;
