//! Inbound inference messages pushed by the emotion backend.
//!
//! Every field below the top level is optional on the wire: the backend
//! omits `face` entirely when no face was detected in the last frame.

/// One inference message, shaped as
/// `{ face?: { predictions?: [ { emotions?: [ { name, score } ] } ] } }`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct InferenceMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    face: Option<FaceChannel>,
}

impl InferenceMessage {
    pub fn new(face: Option<FaceChannel>) -> Self {
        Self { face }
    }

    pub fn face(&self) -> Option<&FaceChannel> {
        self.face.as_ref()
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct FaceChannel {
    #[serde(default)]
    predictions: Vec<FacePrediction>,
}

impl FaceChannel {
    pub fn new(predictions: Vec<FacePrediction>) -> Self {
        Self { predictions }
    }

    pub fn predictions(&self) -> &[FacePrediction] {
        &self.predictions
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct FacePrediction {
    #[serde(default)]
    emotions: Vec<EmotionScore>,
}

impl FacePrediction {
    pub fn new(emotions: Vec<EmotionScore>) -> Self {
        Self { emotions }
    }

    pub fn emotions(&self) -> &[EmotionScore] {
        &self.emotions
    }
}

/// A single named emotion with its confidence score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmotionScore {
    name: String,
    score: f32,
}

impl EmotionScore {
    pub fn new(name: &str, score: f32) -> Self {
        Self {
            name: name.to_string(),
            score,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> f32 {
        self.score
    }
}
