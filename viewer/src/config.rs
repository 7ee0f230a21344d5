use crate::upload::UploadLimits;
use std::env;
use tubecore::SessionConfig;

const ENDPOINT_VAR: &str = "TUBECOUNT_DETECT_URL";
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9000/detect";

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub endpoint: String,
    pub limits: UploadLimits,
    pub session: SessionConfig,
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::with_endpoint(env::var(ENDPOINT_VAR).ok())
    }

    fn with_endpoint(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            endpoint,
            limits: UploadLimits::default(),
            session: SessionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_endpoint_falls_back_to_local_stub() {
        assert_eq!(ViewerConfig::with_endpoint(Some("  ".into())).endpoint, DEFAULT_ENDPOINT);
        assert_eq!(ViewerConfig::with_endpoint(None).endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn explicit_endpoint_is_trimmed() {
        let config = ViewerConfig::with_endpoint(Some(" https://example.test/detect \n".into()));
        assert_eq!(config.endpoint, "https://example.test/detect");
    }
}
