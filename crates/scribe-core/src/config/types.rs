//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_upload_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Per-attempt LLM call timeout in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 10,
            max_image_dimension: 10000,
            llm_timeout_ms: 60000,
        }
    }
}

/// OCR engine settings.
///
/// The engine loads a text detection model, a text recognition model, and
/// the recognition character dictionary from `model_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory where OCR models are stored
    pub model_dir: PathBuf,

    /// Text detection model filename
    pub detection_model: String,

    /// Text recognition model filename
    pub recognition_model: String,

    /// Character dictionary filename for the recognition model
    pub character_dict: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.scribe/models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "rec.onnx".to_string(),
            character_dict: "dict.txt".to_string(),
        }
    }
}

impl OcrConfig {
    /// Get the resolved model directory path (with ~ expansion).
    pub fn resolved_model_dir(&self) -> PathBuf {
        let path_str = self.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }
}

/// Workflow settings: retry policy and summarization shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Number of bullet points requested from the summarizer
    pub summary_points: usize,

    /// Max total attempts per LLM call (first try included)
    pub retry_attempts: u32,

    /// Base backoff delay between retries in milliseconds
    pub retry_delay_ms: u64,

    /// Max characters of document text sent to the guardrail classifier
    pub max_validation_chars: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            summary_points: 3,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            max_validation_chars: 4000,
        }
    }
}

/// LLM provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Active provider: "gemini", "openai", or "ollama"
    pub provider: String,

    /// Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            gemini: None,
            openai: None,
            ollama: None,
        }
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// API endpoint base URL
    pub endpoint: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        }
    }
}
