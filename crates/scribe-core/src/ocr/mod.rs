//! OCR engine abstraction and its process-wide cache.
//!
//! The production backend is the oar-ocr pipeline (ONNX text detection +
//! recognition). The engine is loaded lazily on the first image request
//! and then shared read-only for the life of the process.

mod cache;
mod engine;

pub use cache::{EngineFactory, OcrEngineCache};
pub use engine::{OcrEngine, PaddleOcrEngine};
