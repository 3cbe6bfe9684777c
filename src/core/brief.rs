//! Assignment brief supplied by the caller

use serde::{Deserialize, Serialize};

/// Generation parameters for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    /// Subject to research and write about
    pub topic: String,

    /// Angle or thesis the article should argue
    pub angle: String,

    /// Intended readership
    pub audience: String,

    /// Voice of the piece (e.g. "investigative", "playful")
    pub tone: String,

    /// Target length, kept as free text ("800", "about 600")
    pub word_count: String,
}

impl Brief {
    /// Create a brief for a topic with empty framing fields
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            angle: String::new(),
            audience: String::new(),
            tone: String::new(),
            word_count: String::new(),
        }
    }

    pub fn with_angle(mut self, angle: impl Into<String>) -> Self {
        self.angle = angle.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_word_count(mut self, word_count: impl Into<String>) -> Self {
        self.word_count = word_count.into();
        self
    }

    /// Check the brief can drive a run
    ///
    /// Only the topic is required: it is the search query and the image
    /// subject. The framing fields are passed to the writer as given.
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("topic must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let brief = Brief::new("orbital debris policy")
            .with_angle("cleanup is underfunded")
            .with_audience("policy makers")
            .with_tone("measured")
            .with_word_count("800");

        assert_eq!(brief.topic, "orbital debris policy");
        assert_eq!(brief.angle, "cleanup is underfunded");
        assert_eq!(brief.audience, "policy makers");
        assert_eq!(brief.tone, "measured");
        assert_eq!(brief.word_count, "800");
        assert!(brief.validate().is_ok());
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert!(Brief::new("").validate().is_err());
        assert!(Brief::new("   ").validate().is_err());
    }

    #[test]
    fn test_deserialize_request_body() {
        let json = r#"{
            "topic": "heat pumps",
            "angle": "they work in the cold",
            "audience": "homeowners",
            "tone": "friendly",
            "word_count": "600"
        }"#;
        let brief: Brief = serde_json::from_str(json).unwrap();
        assert_eq!(brief.word_count, "600");
        assert_eq!(brief.audience, "homeowners");
    }
}
