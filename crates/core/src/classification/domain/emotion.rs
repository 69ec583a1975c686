use std::fmt;

/// The closed emotion vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Surprise,
        EmotionLabel::Neutral,
    ];

    /// Stable ASCII key, for hosts that persist or match on labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// Localized display string, rendered onto frames.
    pub fn display_name(&self) -> &'static str {
        match self {
            EmotionLabel::Angry => "Enojado",
            EmotionLabel::Disgust => "Disgusto",
            EmotionLabel::Fear => "Miedo",
            EmotionLabel::Happy => "Feliz",
            EmotionLabel::Sad => "Triste",
            EmotionLabel::Surprise => "Sorprendido",
            EmotionLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome of classifying one face crop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub label: EmotionLabel,
    /// In [0, 1]. Fixed at 1.0 on successful inference — the model's
    /// default configuration exposes no calibrated per-class
    /// confidence — and 0.5 on the fallback path.
    pub confidence: f64,
}

impl Classification {
    /// Safe low-confidence default returned whenever inference fails.
    pub fn fallback() -> Self {
        Self {
            label: EmotionLabel::Neutral,
            confidence: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_seven_labels() {
        assert_eq!(EmotionLabel::ALL.len(), 7);
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = EmotionLabel::ALL.iter().map(|l| l.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn test_display_uses_localized_name() {
        assert_eq!(EmotionLabel::Happy.to_string(), "Feliz");
        assert_eq!(EmotionLabel::Angry.to_string(), "Enojado");
    }

    #[test]
    fn test_fallback_is_low_confidence_neutral() {
        let fb = Classification::fallback();
        assert_eq!(fb.label, EmotionLabel::Neutral);
        assert!((fb.confidence - 0.5).abs() < 1e-9);
    }
}
