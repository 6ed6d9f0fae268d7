use std::cmp::Ordering;
use std::fmt;

use tutor_realtime_types::perception::EmotionScore;
use tutor_realtime_types::InferenceMessage;

/// How many top emotions make it into a summary.
pub const SUMMARY_LEN: usize = 3;

/// The display-ready reduction of one inference message: the top emotions
/// by descending score, or empty when no face was detected. Empty means
/// "nothing to show", not an error.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct EmotionSummary {
    top: Vec<EmotionScore>,
}

impl EmotionSummary {
    pub fn scores(&self) -> &[EmotionScore] {
        &self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    /// Comma-separated emotion names, e.g. `"joy, fear, calm"`.
    pub fn display(&self) -> String {
        self.top
            .iter()
            .map(|emotion| emotion.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for EmotionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Reduce one inference message to its summary. Only the most recent
/// message ever matters; there is no smoothing across messages.
pub fn summarize(message: &InferenceMessage) -> EmotionSummary {
    let Some(face) = message.face() else {
        return EmotionSummary::default();
    };
    let Some(prediction) = face.predictions().first() else {
        return EmotionSummary::default();
    };
    let mut emotions = prediction.emotions().to_vec();
    // Stable sort: ties keep their original wire order.
    emotions.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(Ordering::Equal)
    });
    emotions.truncate(SUMMARY_LEN);
    EmotionSummary { top: emotions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_realtime_types::perception::{FaceChannel, FacePrediction};

    fn message_with(emotions: Vec<EmotionScore>) -> InferenceMessage {
        InferenceMessage::new(Some(FaceChannel::new(vec![FacePrediction::new(emotions)])))
    }

    #[test]
    fn no_face_is_the_empty_summary() {
        let summary = summarize(&InferenceMessage::new(None));
        assert!(summary.is_empty());
        assert_eq!(summary.display(), "");
    }

    #[test]
    fn no_predictions_is_the_empty_summary() {
        let message = InferenceMessage::new(Some(FaceChannel::new(vec![])));
        assert!(summarize(&message).is_empty());
    }

    #[test]
    fn empty_emotion_list_is_the_empty_summary() {
        let message = message_with(vec![]);
        assert_eq!(summarize(&message).display(), "");
    }

    #[test]
    fn takes_top_three_by_descending_score() {
        // The worked example from the backend contract.
        let message = message_with(vec![
            EmotionScore::new("joy", 0.9),
            EmotionScore::new("anger", 0.1),
            EmotionScore::new("fear", 0.4),
            EmotionScore::new("calm", 0.2),
        ]);
        assert_eq!(summarize(&message).display(), "joy, fear, calm");
    }

    #[test]
    fn fewer_than_three_emotions_keeps_them_all() {
        let message = message_with(vec![
            EmotionScore::new("joy", 0.2),
            EmotionScore::new("calm", 0.8),
        ]);
        assert_eq!(summarize(&message).display(), "calm, joy");
    }

    #[test]
    fn ties_preserve_wire_order() {
        let message = message_with(vec![
            EmotionScore::new("first", 0.5),
            EmotionScore::new("second", 0.5),
            EmotionScore::new("third", 0.5),
            EmotionScore::new("fourth", 0.5),
        ]);
        assert_eq!(summarize(&message).display(), "first, second, third");
    }

    #[test]
    fn only_the_first_prediction_counts() {
        let message = InferenceMessage::new(Some(FaceChannel::new(vec![
            FacePrediction::new(vec![EmotionScore::new("joy", 0.9)]),
            FacePrediction::new(vec![EmotionScore::new("anger", 1.0)]),
        ])));
        assert_eq!(summarize(&message).display(), "joy");
    }
}
