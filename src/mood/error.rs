use crate::llm::LlmError;
use crate::music_catalog::CatalogError;
use std::fmt;
use thiserror::Error;

/// Which outbound step of a generation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStage {
    MoodAnalysis,
    DescriptionGeneration,
    Auth,
    CatalogSearch,
}

impl UpstreamStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamStage::MoodAnalysis => "mood-analysis",
            UpstreamStage::DescriptionGeneration => "description-generation",
            UpstreamStage::Auth => "auth",
            UpstreamStage::CatalogSearch => "catalog-search",
        }
    }
}

impl fmt::Display for UpstreamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MoodError {
    /// Bad or missing input. The message is safe to show to the caller.
    #[error("{0}")]
    Validation(String),

    #[error("upstream {stage} failed: {message}")]
    Upstream {
        stage: UpstreamStage,
        message: String,
    },
}

impl MoodError {
    pub fn validation(message: impl Into<String>) -> Self {
        MoodError::Validation(message.into())
    }

    pub fn upstream(stage: UpstreamStage, message: impl Into<String>) -> Self {
        MoodError::Upstream {
            stage,
            message: message.into(),
        }
    }

    pub fn from_llm(stage: UpstreamStage, err: LlmError) -> Self {
        Self::upstream(stage, err.to_string())
    }

    pub fn from_catalog(stage: UpstreamStage, err: CatalogError) -> Self {
        Self::upstream(stage, err.to_string())
    }

    pub fn stage(&self) -> Option<UpstreamStage> {
        match self {
            MoodError::Validation(_) => None,
            MoodError::Upstream { stage, .. } => Some(*stage),
        }
    }
}
