//! Error types for gitmuse modules using thiserror.

use thiserror::Error;

/// Errors from configuration and API-key storage.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write config file: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Config file is not valid JSON: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error(
        "Invalid API key format. Keys must be at least 10 printable ASCII characters. \
         Get one at https://aistudio.google.com/"
    )]
    InvalidApiKey,

    #[error("Failed to read API key input: {0}")]
    PromptFailed(#[source] dialoguer::Error),
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository. Run gitmuse from within a git repository.")]
    NotARepository(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to read repository status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to read commit history: {0}")]
    LogFailed(#[source] git2::Error),

    #[error("No files in the working tree match '{path}'")]
    NoMatchingFiles { path: String },

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from the Gemini API transport.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API error (HTTP {code}): {message}")]
    Api {
        code: u16,
        /// Symbolic status from the error envelope, e.g. `RESOURCE_EXHAUSTED`.
        status: Option<String>,
        message: String,
    },

    #[error("Failed to reach the Gemini API: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Gemini returned a response with no candidate text")]
    EmptyResponse,
}

/// Errors from the model fallback controller.
#[derive(Error, Debug)]
pub enum FallbackError {
    #[error(
        "All models are rate limited right now ({}). Wait for the quota window to reset and try again.",
        attempted.join(", ")
    )]
    AllModelsExhausted { attempted: Vec<String> },

    #[error("Generation failed: {0}")]
    Generation(#[from] GeminiError),
}

/// Errors from the commit execution engine.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(
        "Aborted at commit {step} of {total} ({completed} committed before the failure): {source}"
    )]
    Aborted {
        /// 1-based index of the step that failed.
        step: usize,
        /// Total number of operations in the plan.
        total: usize,
        /// Number of operations fully committed before the failure.
        completed: usize,
        #[source]
        source: GitError,
    },
}
