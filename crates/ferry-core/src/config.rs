use std::fmt;

use secrecy::SecretString;

/// Variable names the resolver requires. Absence of any is a startup-time
/// failure; a run never starts on partial configuration.
pub const KEY_IMAGE_NAMESPACE: &str = "IMAGE_NAMESPACE";
pub const KEY_REGION: &str = "REGION";
pub const KEY_PRODUCTION_SERVICE_NAME: &str = "PRODUCTION_SERVICE_NAME";
pub const KEY_STAGING_SERVICE_NAME: &str = "STAGING_SERVICE_NAME";
pub const KEY_CLOUD_CREDENTIAL: &str = "CLOUD_CREDENTIAL";
pub const KEY_CLOUD_PROJECT_ID: &str = "CLOUD_PROJECT_ID";
pub const KEY_REGISTRY_USER: &str = "REGISTRY_USER";
pub const KEY_REGISTRY_PASSWORD: &str = "REGISTRY_PASSWORD";

pub const REQUIRED_KEYS: [&str; 8] = [
    KEY_IMAGE_NAMESPACE,
    KEY_REGION,
    KEY_PRODUCTION_SERVICE_NAME,
    KEY_STAGING_SERVICE_NAME,
    KEY_CLOUD_CREDENTIAL,
    KEY_CLOUD_PROJECT_ID,
    KEY_REGISTRY_USER,
    KEY_REGISTRY_PASSWORD,
];

/// Immutable configuration for one pipeline run.
///
/// Resolved once at startup and passed to each component explicitly; no
/// component reads ambient process state. `cloud_credential` and
/// `registry_password` are wrapped in [`SecretString`] so they cannot leak
/// through debug output.
#[derive(Clone)]
pub struct EngineConfig {
    pub image_namespace: String,
    pub region: String,
    pub production_service: String,
    pub staging_service: String,
    pub cloud_project_id: String,
    pub cloud_credential: SecretString,
    pub registry_user: String,
    pub registry_password: SecretString,
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("image_namespace", &self.image_namespace)
            .field("region", &self.region)
            .field("production_service", &self.production_service)
            .field("staging_service", &self.staging_service)
            .field("cloud_project_id", &self.cloud_project_id)
            .field("cloud_credential", &"[REDACTED]")
            .field("registry_user", &self.registry_user)
            .field("registry_password", &"[REDACTED]")
            .finish()
    }
}

impl EngineConfig {
    /// Resolve configuration through a name→value lookup.
    ///
    /// Collects every absent required key before failing, so one failure
    /// reports the complete set of missing names rather than the first.
    /// An empty or whitespace-only value counts as absent.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut missing = Vec::new();
        let mut require = |key: &str| match lookup(key) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(key.to_owned());
                String::new()
            }
        };

        let image_namespace = require(KEY_IMAGE_NAMESPACE);
        let region = require(KEY_REGION);
        let production_service = require(KEY_PRODUCTION_SERVICE_NAME);
        let staging_service = require(KEY_STAGING_SERVICE_NAME);
        let cloud_credential = require(KEY_CLOUD_CREDENTIAL);
        let cloud_project_id = require(KEY_CLOUD_PROJECT_ID);
        let registry_user = require(KEY_REGISTRY_USER);
        let registry_password = require(KEY_REGISTRY_PASSWORD);

        if !missing.is_empty() {
            return Err(crate::Error::MissingConfiguration { names: missing });
        }

        Ok(Self {
            image_namespace,
            region,
            production_service,
            staging_service,
            cloud_project_id,
            cloud_credential: SecretString::from(cloud_credential),
            registry_user,
            registry_password: SecretString::from(registry_password),
        })
    }

    /// Resolve from process environment variables.
    pub fn from_env() -> crate::Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Names of required keys the lookup does not satisfy.
    ///
    /// Used by diagnostics that want per-key results without constructing
    /// a full record.
    pub fn missing_keys(lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        REQUIRED_KEYS
            .iter()
            .filter(|key| !matches!(lookup(key), Some(v) if !v.trim().is_empty()))
            .map(|key| (*key).to_owned())
            .collect()
    }
}
