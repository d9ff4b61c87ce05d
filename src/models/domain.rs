use serde::{Deserialize, Serialize};

/// Profile assigned by the matching backend
///
/// The backend owns every field; this side only relays and renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoulMateProfile {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// Backend reply to a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoulMateResult {
    pub token: String,
    pub profile: SoulMateProfile,
}

/// Stored result as returned by token lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoulMateResultWithDate {
    pub token: String,
    pub profile: SoulMateProfile,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Backend reply to a conversion tracking call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub pixel_tracked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_date_parses_backend_shape() {
        let json = r#"{
            "token": "abc123",
            "profile": {"id": 2, "name": "Luna Costa", "description": "d", "image_url": "u"},
            "created_at": "2025-01-01T10:00:00"
        }"#;
        let result: SoulMateResultWithDate = serde_json::from_str(json).unwrap();
        assert_eq!(result.profile.name, "Luna Costa");
        assert_eq!(result.created_at.as_deref(), Some("2025-01-01T10:00:00"));
    }

    #[test]
    fn test_conversion_ack_defaults() {
        let ack: ConversionAck = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(ack.success);
        assert!(!ack.pixel_tracked);
    }
}
