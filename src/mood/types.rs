//! Request and response model for mood playlist generation.

use super::error::MoodError;
use crate::music_catalog::Track;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Image and genre are required";

pub const MAX_GENRE_LEN: usize = 64;
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Single-word emotional classification drawn from a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Melancholic,
    Excited,
    Peaceful,
    Anxious,
    Confident,
    Thoughtful,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Energetic,
        Mood::Calm,
        Mood::Melancholic,
        Mood::Excited,
        Mood::Peaceful,
        Mood::Anxious,
        Mood::Confident,
        Mood::Thoughtful,
    ];

    /// Substituted whenever the vision model answers outside the vocabulary.
    pub const DEFAULT: Mood = Mood::Calm;

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
            Mood::Melancholic => "melancholic",
            Mood::Excited => "excited",
            Mood::Peaceful => "peaceful",
            Mood::Anxious => "anxious",
            Mood::Confident => "confident",
            Mood::Thoughtful => "thoughtful",
        }
    }

    /// Case-insensitive lookup, ignoring surrounding whitespace and
    /// punctuation ("Happy." is happy).
    pub fn parse(raw: &str) -> Option<Mood> {
        let word = raw
            .trim()
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        Mood::ALL.into_iter().find(|m| m.as_str() == word)
    }

    /// Interpret a model reply. Never fails: anything that is not a
    /// vocabulary word becomes [`Mood::DEFAULT`].
    pub fn from_model_output(raw: &str) -> Mood {
        Mood::parse(raw).unwrap_or(Mood::DEFAULT)
    }

    /// Comma separated vocabulary, in prompt order.
    pub fn vocabulary() -> String {
        Mood::ALL
            .iter()
            .map(Mood::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, base64 encoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    mime_type: String,
    base64: String,
    decoded_len: usize,
}

impl ImagePayload {
    /// Accepts either a `data:<mime>;base64,<payload>` URL or a bare
    /// base64 payload (assumed to be JPEG).
    pub fn parse(raw: &str) -> Result<Self, MoodError> {
        let raw = raw.trim();

        let (mime_type, payload) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    MoodError::validation("Image data URL is missing its payload")
                })?;
                let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
                    MoodError::validation("Image must be base64-encoded")
                })?;
                if !mime_type.starts_with("image/") {
                    return Err(MoodError::validation(format!(
                        "Unsupported image type: {}",
                        mime_type
                    )));
                }
                (mime_type.to_string(), payload.trim())
            }
            None => (DEFAULT_IMAGE_MIME.to_string(), raw),
        };

        if payload.is_empty() {
            return Err(MoodError::validation(REQUIRED_FIELDS_MESSAGE));
        }

        let decoded = STANDARD
            .decode(payload)
            .map_err(|_| MoodError::validation("Image must be base64-encoded"))?;

        Ok(Self {
            mime_type,
            base64: payload.to_string(),
            decoded_len: decoded.len(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn decoded_len(&self) -> usize {
        self.decoded_len
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Which pair of prompts a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Classify the mood, then describe it.
    #[default]
    Mood,
    /// Describe the image, then write a short story around it.
    Story,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Mood => "mood",
            StrategyKind::Story => "story",
        }
    }
}

/// Inbound JSON body. Every field is optional on the wire so that
/// missing values surface as validation errors rather than parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoodRequest {
    pub image: Option<String>,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub variant: Option<StrategyKind>,
}

#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub image: ImagePayload,
    pub genre: String,
    pub mood_hint: Option<Mood>,
    pub strategy: StrategyKind,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl MoodRequest {
    /// Checks the request without performing any I/O.
    pub fn validate(&self) -> Result<ValidatedRequest, MoodError> {
        let (Some(image), Some(genre)) = (non_blank(&self.image), non_blank(&self.genre)) else {
            return Err(MoodError::validation(REQUIRED_FIELDS_MESSAGE));
        };

        if genre.chars().count() > MAX_GENRE_LEN || genre.chars().any(char::is_control) {
            return Err(MoodError::validation("Invalid genre"));
        }

        let image = ImagePayload::parse(image)?;

        let mood_hint = match non_blank(&self.mood) {
            None => None,
            Some(raw) => Some(Mood::parse(raw).ok_or_else(|| {
                MoodError::validation(format!(
                    "Unknown mood '{}', expected one of: {}",
                    raw,
                    Mood::vocabulary()
                ))
            })?),
        };

        Ok(ValidatedRequest {
            image,
            genre: genre.to_string(),
            mood_hint,
            strategy: self.variant.unwrap_or_default(),
        })
    }
}

/// Narrative part of the response. Field names are the ones the frontend reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoryData {
    Mood {
        mood: Mood,
        #[serde(rename = "moodDescription")]
        mood_description: String,
        genre: String,
    },
    Story {
        story: String,
        genre: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodResult {
    #[serde(rename = "storyData")]
    pub story_data: StoryData,
    pub tracks: Vec<Track>,
}
