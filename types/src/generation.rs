//! Request and response bodies for the explainer-video generation backend.

/// Body of `POST /generate`: the topic text plus the current emotion
/// context as a display string (may be empty).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerateRequest {
    text: String,
    emotions: String,
}

impl GenerateRequest {
    pub fn new(text: &str, emotions: &str) -> Self {
        Self {
            text: text.to_string(),
            emotions: emotions.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn emotions(&self) -> &str {
        &self.emotions
    }
}

/// Success body of `POST /generate`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GenerateResponse {
    video_id: String,
}

impl GenerateResponse {
    pub fn new(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_expected_body() {
        let request = GenerateRequest::new("explain entropy", "");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"text": "explain entropy", "emotions": ""})
        );
    }

    #[test]
    fn response_parses_video_id() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"video_id":"abc123"}"#).unwrap();
        assert_eq!(response.video_id(), "abc123");
    }
}
