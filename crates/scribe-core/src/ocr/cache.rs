//! Process-wide lazy cache for the OCR engine.
//!
//! Model loading is memory- and time-intensive, so the engine is
//! constructed at most once per process, on first use, and shared
//! read-only by every request afterward. `tokio::sync::OnceCell` provides
//! the construct-once guarantee under concurrent first requests: only one
//! initializer runs, the rest await its outcome. A failed initialization
//! is not cached, so a later request retries the load.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::OnceCell;

use crate::config::OcrConfig;
use crate::error::OcrError;

use super::engine::{OcrEngine, PaddleOcrEngine};

/// Factory that produces the engine on first use.
pub type EngineFactory =
    Box<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn OcrEngine>, OcrError>> + Send + Sync>;

/// Lazily-initialized, process-wide OCR engine handle.
pub struct OcrEngineCache {
    cell: OnceCell<Arc<dyn OcrEngine>>,
    factory: EngineFactory,
}

impl OcrEngineCache {
    /// Create a cache whose first use loads the oar-ocr pipeline from the
    /// configured model directory.
    ///
    /// The load runs inside `spawn_blocking`: it reads model files and
    /// builds ONNX sessions, which must not block the async runtime.
    pub fn new(config: OcrConfig) -> Self {
        let factory: EngineFactory = Box::new(move || {
            let config = config.clone();
            Box::pin(async move {
                let engine = tokio::task::spawn_blocking(move || PaddleOcrEngine::load(&config))
                    .await
                    .map_err(|e| OcrError::Init {
                        message: format!("Engine load task failed: {e}"),
                    })??;
                Ok(Arc::new(engine) as Arc<dyn OcrEngine>)
            })
        });
        Self::with_factory(factory)
    }

    /// Create a cache with a custom engine factory.
    pub fn with_factory(factory: EngineFactory) -> Self {
        Self {
            cell: OnceCell::new(),
            factory,
        }
    }

    /// Get the engine, constructing it on first call.
    pub async fn get(&self) -> Result<Arc<dyn OcrEngine>, OcrError> {
        let engine = self.cell.get_or_try_init(|| (self.factory)()).await?;
        Ok(engine.clone())
    }

    /// Whether the engine has been constructed yet.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
