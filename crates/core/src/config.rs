// Binding Configuration
//
// Created once at startup and shared read-only by registration and every
// handler. Replaces process-global logger/client state.

use serde::Deserialize;

/// Reserved wire name serving the signature document
pub const DEFAULT_SIGNATURE_METHOD: &str = "get_signature";

/// What to do when two declared methods map to the same wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Fail registration
    #[default]
    Reject,
    /// Log a warning; the later declaration wins
    Overwrite,
}

impl std::str::FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(CollisionPolicy::Reject),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            other => Err(format!("unknown collision policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Wire name of the signature handler
    pub signature_method: String,
    pub collision_policy: CollisionPolicy,
    /// Include raw request bodies in invocation logs
    pub log_payloads: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            signature_method: DEFAULT_SIGNATURE_METHOD.to_string(),
            collision_policy: CollisionPolicy::default(),
            log_payloads: true,
        }
    }
}

impl BindConfig {
    /// Load overrides from the environment
    ///
    /// # Environment Variables
    ///
    /// - `SVCBIND_SIGNATURE_METHOD`: signature wire name (default: get_signature)
    /// - `SVCBIND_COLLISION_POLICY`: `reject` or `overwrite` (default: reject)
    /// - `SVCBIND_LOG_PAYLOADS`: `true` or `false` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let signature_method = std::env::var("SVCBIND_SIGNATURE_METHOD")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.signature_method);

        let collision_policy = std::env::var("SVCBIND_COLLISION_POLICY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.collision_policy);

        let log_payloads = std::env::var("SVCBIND_LOG_PAYLOADS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.log_payloads);

        Self {
            signature_method,
            collision_policy,
            log_payloads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BindConfig::default();
        assert_eq!(config.signature_method, "get_signature");
        assert_eq!(config.collision_policy, CollisionPolicy::Reject);
        assert!(config.log_payloads);
    }

    #[test]
    fn test_collision_policy_parse() {
        assert_eq!(
            "Overwrite".parse::<CollisionPolicy>(),
            Ok(CollisionPolicy::Overwrite)
        );
        assert_eq!("reject".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Reject));
        assert!("last-wins".parse::<CollisionPolicy>().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: BindConfig =
            serde_json::from_str(r#"{"collision_policy": "overwrite"}"#).unwrap();
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
        assert_eq!(config.signature_method, "get_signature");
    }
}
