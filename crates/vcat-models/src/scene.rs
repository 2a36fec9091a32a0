//! Scene manifest types and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Maximum accepted length of a scene URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum accepted length of a campaign identifier.
pub const MAX_CAMPAIGN_ID_LENGTH: usize = 128;

/// One input video segment.
///
/// The ordinal of a scene is its index in the manifest; it is the only
/// ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Remote source URL
    pub url: String,
    /// Declared duration in seconds (informational; the encoder decides)
    pub duration: f64,
}

/// Body of `POST /concat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcatRequest {
    /// Scenes in playback order
    pub scenes: Vec<Scene>,
    /// Caller-side output hint, carried for log correlation only
    pub output_path: String,
    /// Campaign the artifact belongs to
    pub campaign_id: String,
}

/// Reasons a manifest is rejected before a job is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifestError {
    #[error("At least one scene is required")]
    NoScenes,

    #[error("Too many scenes: {count} (max {max})")]
    TooManyScenes { count: usize, max: usize },

    #[error("Scene {ordinal}: {reason}")]
    InvalidSceneUrl { ordinal: usize, reason: String },

    #[error("Scene {ordinal}: duration must be a finite, non-negative number")]
    InvalidDuration { ordinal: usize },

    #[error("Invalid campaign_id: {0}")]
    InvalidCampaignId(String),
}

impl ConcatRequest {
    /// Validate the manifest.
    pub fn validate(&self, max_scenes: usize) -> Result<(), ManifestError> {
        if self.scenes.is_empty() {
            return Err(ManifestError::NoScenes);
        }

        if self.scenes.len() > max_scenes {
            return Err(ManifestError::TooManyScenes {
                count: self.scenes.len(),
                max: max_scenes,
            });
        }

        for (ordinal, scene) in self.scenes.iter().enumerate() {
            validate_scene_url(&scene.url)
                .map_err(|reason| ManifestError::InvalidSceneUrl { ordinal, reason })?;

            if !scene.duration.is_finite() || scene.duration < 0.0 {
                return Err(ManifestError::InvalidDuration { ordinal });
            }
        }

        validate_campaign_id(&self.campaign_id)
    }

    /// Number of scenes in the manifest.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Sum of the declared scene durations.
    pub fn declared_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration).sum()
    }
}

/// Check that a scene source is an absolute http(s) URL with a host.
pub fn validate_scene_url(raw: &str) -> Result<Url, String> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        ));
    }

    let url = Url::parse(raw.trim()).map_err(|e| format!("malformed URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err("URL has no host".to_string());
    }

    Ok(url)
}

/// The campaign id becomes one storage path segment, so it must not
/// be able to escape or split that segment.
fn validate_campaign_id(campaign_id: &str) -> Result<(), ManifestError> {
    let trimmed = campaign_id.trim();

    if trimmed.is_empty() {
        return Err(ManifestError::InvalidCampaignId(
            "must not be empty".to_string(),
        ));
    }

    if campaign_id.len() > MAX_CAMPAIGN_ID_LENGTH {
        return Err(ManifestError::InvalidCampaignId(format!(
            "exceeds {} characters",
            MAX_CAMPAIGN_ID_LENGTH
        )));
    }

    if trimmed.len() != campaign_id.len() {
        return Err(ManifestError::InvalidCampaignId(
            "has leading or trailing whitespace".to_string(),
        ));
    }

    // "." would be dropped by URL normalization, so the public URL would
    // point at a different object
    if campaign_id == "." || campaign_id == ".." {
        return Err(ManifestError::InvalidCampaignId(
            "must not be a relative path segment".to_string(),
        ));
    }

    if campaign_id.contains(['/', '\\'])
        || campaign_id.contains("..")
        || campaign_id.chars().any(char::is_control)
    {
        return Err(ManifestError::InvalidCampaignId(
            "contains path separators or control characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(urls: &[&str]) -> ConcatRequest {
        ConcatRequest {
            scenes: urls
                .iter()
                .map(|u| Scene {
                    url: u.to_string(),
                    duration: 5.0,
                })
                .collect(),
            output_path: "campaigns/final.mp4".to_string(),
            campaign_id: "camp-42".to_string(),
        }
    }

    #[test]
    fn test_valid_manifest() {
        let req = request(&["https://cdn.example.com/a.mp4", "http://cdn.example.com/b.mp4"]);
        assert!(req.validate(10).is_ok());
        assert_eq!(req.scene_count(), 2);
        assert!((req.declared_duration() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let req = request(&[]);
        assert_eq!(req.validate(10), Err(ManifestError::NoScenes));
    }

    #[test]
    fn test_too_many_scenes_rejected() {
        let req = request(&["https://a.example/1.mp4"; 3]);
        assert_eq!(
            req.validate(2),
            Err(ManifestError::TooManyScenes { count: 3, max: 2 })
        );
    }

    #[test]
    fn test_bad_urls_report_ordinal() {
        for bad in ["not a url", "ftp://host/a.mp4", "file:///etc/passwd", "https://"] {
            let req = request(&["https://ok.example/a.mp4", bad]);
            match req.validate(10) {
                Err(ManifestError::InvalidSceneUrl { ordinal, .. }) => assert_eq!(ordinal, 1),
                other => panic!("expected InvalidSceneUrl for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bad_duration_rejected() {
        let mut req = request(&["https://ok.example/a.mp4"]);
        req.scenes[0].duration = f64::NAN;
        assert_eq!(req.validate(10), Err(ManifestError::InvalidDuration { ordinal: 0 }));

        req.scenes[0].duration = -1.0;
        assert!(req.validate(10).is_err());
    }

    #[test]
    fn test_campaign_id_rules() {
        let mut req = request(&["https://ok.example/a.mp4"]);
        for bad in [
            "",
            "   ",
            ".",
            "..",
            " camp-42",
            "camp-42 ",
            "../etc",
            "a/b",
            "a\\b",
            "tab\there",
        ] {
            req.campaign_id = bad.to_string();
            assert!(
                matches!(req.validate(10), Err(ManifestError::InvalidCampaignId(_))),
                "{bad:?} should be rejected"
            );
        }

        for good in ["3f2b8c1e-9a77-4e0c-b1e6-2f7f5d1e8a90", "spring.sale", ".hidden"] {
            req.campaign_id = good.to_string();
            assert!(req.validate(10).is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn test_deserialize_request() {
        let json = r#"{
            "scenes": [{"url": "https://cdn.example.com/a.mp4", "duration": 5}],
            "output_path": "out.mp4",
            "campaign_id": "c1"
        }"#;
        let req: ConcatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.scenes.len(), 1);
        assert_eq!(req.scenes[0].duration, 5.0);
    }
}
