//! Prompt strategies.
//!
//! A generation runs two text-model calls: an analysis of the uploaded
//! image, then a narrative built from that analysis. The strategy owns the
//! prompts and decides how the replies are interpreted, so the
//! orchestrator stays the same for every variant.

use super::error::{MoodError, UpstreamStage};
use super::types::{ImagePayload, Mood, StoryData, StrategyKind};
use crate::llm::Message;

pub const MOOD_ANALYSIS_MAX_TOKENS: u32 = 50;
pub const IMAGE_DESCRIPTION_MAX_TOKENS: u32 = 300;
pub const STORY_MAX_TOKENS: u32 = 500;

pub trait GenerationStrategy: Send + Sync {
    /// What the first call produces.
    type Analysis: Send;

    const KIND: StrategyKind;

    /// Vision prompt sent together with the image.
    fn analysis_messages(&self, image: &ImagePayload) -> Vec<Message>;

    fn analysis_max_tokens(&self) -> u32;

    /// Turn the raw model reply into an analysis.
    fn interpret_analysis(&self, raw: &str) -> Result<Self::Analysis, MoodError>;

    /// Mood used in the catalog query. A caller supplied hint always wins.
    fn search_mood(&self, analysis: &Self::Analysis, hint: Option<Mood>) -> Mood;

    fn narrative_messages(&self, analysis: &Self::Analysis, genre: &str, mood: Mood)
        -> Vec<Message>;

    fn narrative_max_tokens(&self) -> Option<u32>;

    fn story_data(&self, analysis: Self::Analysis, narrative: String, genre: String) -> StoryData;
}

/// Classifies the mood from the selfie and explains the classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoodStrategy;

impl GenerationStrategy for MoodStrategy {
    type Analysis = Mood;

    const KIND: StrategyKind = StrategyKind::Mood;

    fn analysis_messages(&self, image: &ImagePayload) -> Vec<Message> {
        let prompt = format!(
            "Analyze this selfie/portrait and determine the person's emotional state or mood. \
             Focus on facial expressions, body language, and overall emotional context. \
             Respond with a single word representing their primary mood from this list: {}.",
            Mood::vocabulary()
        );
        vec![Message::user_with_image(prompt, image.to_data_url())]
    }

    fn analysis_max_tokens(&self) -> u32 {
        MOOD_ANALYSIS_MAX_TOKENS
    }

    fn interpret_analysis(&self, raw: &str) -> Result<Mood, MoodError> {
        Ok(Mood::from_model_output(raw))
    }

    fn search_mood(&self, detected: &Mood, hint: Option<Mood>) -> Mood {
        hint.unwrap_or(*detected)
    }

    fn narrative_messages(&self, detected: &Mood, _genre: &str, _mood: Mood) -> Vec<Message> {
        vec![Message::user(format!(
            "Write a brief, friendly description analyzing the person's mood. Format: \
             \"After analyzing your photo, we can see that you appear to be in a {} mood. \
             This was determined by [specific visual cues like facial expressions, posture, \
             or other relevant details]. Based on this mood, we'll create a playlist that \
             [brief explanation of how the music will match their mood].\"",
            detected
        ))]
    }

    fn narrative_max_tokens(&self) -> Option<u32> {
        None
    }

    fn story_data(&self, detected: Mood, narrative: String, genre: String) -> StoryData {
        StoryData::Mood {
            mood: detected,
            mood_description: narrative,
            genre,
        }
    }
}

/// Describes the photo, then writes a short story set to the chosen genre.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoryStrategy;

impl GenerationStrategy for StoryStrategy {
    /// Plain-language description of the photo.
    type Analysis = String;

    const KIND: StrategyKind = StrategyKind::Story;

    fn analysis_messages(&self, image: &ImagePayload) -> Vec<Message> {
        vec![Message::user_with_image(
            "Describe this photo in two or three sentences: the setting, the person's \
             expression and body language, and the overall atmosphere.",
            image.to_data_url(),
        )]
    }

    fn analysis_max_tokens(&self) -> u32 {
        IMAGE_DESCRIPTION_MAX_TOKENS
    }

    fn interpret_analysis(&self, raw: &str) -> Result<String, MoodError> {
        let description = raw.trim();
        if description.is_empty() {
            return Err(MoodError::upstream(
                UpstreamStage::MoodAnalysis,
                "image description was empty",
            ));
        }
        Ok(description.to_string())
    }

    fn search_mood(&self, _description: &String, hint: Option<Mood>) -> Mood {
        hint.unwrap_or(Mood::DEFAULT)
    }

    fn narrative_messages(&self, description: &String, genre: &str, mood: Mood) -> Vec<Message> {
        vec![Message::user(format!(
            "Write a short story (under 200 words) inspired by this scene: \"{}\". \
             The story should feel {} and read like the liner notes of a {} record. \
             Address the reader as \"you\".",
            description, mood, genre
        ))]
    }

    fn narrative_max_tokens(&self) -> Option<u32> {
        Some(STORY_MAX_TOKENS)
    }

    fn story_data(&self, _description: String, narrative: String, genre: String) -> StoryData {
        StoryData::Story {
            story: narrative,
            genre,
        }
    }
}
