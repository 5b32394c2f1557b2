//! Update checks.
//!
//! [`UpdateChecker`] is a plain state machine: it decides whether a check may
//! start and records outcomes. The network side lives in `remote.rs` and
//! reports back through [`UpdateChecker::finish_check`] and
//! [`UpdateChecker::finish_download`].
//!
//! Nothing is downloaded until the user asks for it.

pub mod remote;

use serde::Serialize;
use serde_json::Value;

use crate::error::{LeptonError, LeptonResult};

/// Minisign public key from the `plugins.updater` config block.
///
/// Downloads are signature-checked against this key, so a build without one
/// can look for updates but never install them.
pub fn signing_key(updater_config: Option<&Value>) -> Option<&str> {
    updater_config?
        .get("pubkey")?
        .as_str()
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Details of an available release, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub version: String,
    pub current_version: String,
    pub notes: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum UpdateState {
    Idle,
    Checking,
    Available(UpdateInfo),
    NotAvailable,
    Error(String),
    Downloading,
    Downloaded,
}

/// Why a check did not start. None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSkip {
    /// Debug build.
    DevBuild,
    /// Prerelease or alpha version.
    Prerelease,
    /// `autoUpdate` is off.
    Disabled,
    /// A check is already in flight.
    AlreadyInProgress,
    /// An update is being or has been downloaded.
    Downloading,
}

impl std::fmt::Display for CheckSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckSkip::DevBuild => write!(f, "development build"),
            CheckSkip::Prerelease => write!(f, "prerelease version"),
            CheckSkip::Disabled => write!(f, "auto-update disabled in configuration"),
            CheckSkip::AlreadyInProgress => write!(f, "check already in progress"),
            CheckSkip::Downloading => write!(f, "update download in progress"),
        }
    }
}

/// Which builds may check for updates at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePolicy {
    pub dev_build: bool,
    pub prerelease: bool,
    pub enabled: bool,
}

impl UpdatePolicy {
    /// Policy for the running binary.
    pub fn detect(version: &str, enabled: bool) -> Self {
        Self {
            dev_build: cfg!(debug_assertions),
            prerelease: is_prerelease(version),
            enabled,
        }
    }

    pub fn gate(&self) -> Result<(), CheckSkip> {
        if self.dev_build {
            return Err(CheckSkip::DevBuild);
        }
        if self.prerelease {
            return Err(CheckSkip::Prerelease);
        }
        if !self.enabled {
            return Err(CheckSkip::Disabled);
        }
        Ok(())
    }
}

/// Semver prerelease, or anything mentioning `alpha`.
pub fn is_prerelease(version: &str) -> bool {
    let version = version.trim().trim_start_matches('v');
    if version.contains("alpha") {
        return true;
    }
    semver::Version::parse(version)
        .map(|v| !v.pre.is_empty())
        .unwrap_or(false)
}

#[derive(Debug)]
pub struct UpdateChecker {
    policy: UpdatePolicy,
    state: UpdateState,
}

impl UpdateChecker {
    pub fn new(policy: UpdatePolicy) -> Self {
        Self {
            policy,
            state: UpdateState::Idle,
        }
    }

    pub fn state(&self) -> &UpdateState {
        &self.state
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Move to `Checking` if allowed. On `Err` the state is unchanged.
    pub fn begin_check(&mut self) -> Result<(), CheckSkip> {
        self.policy.gate()?;
        match self.state {
            UpdateState::Checking => Err(CheckSkip::AlreadyInProgress),
            UpdateState::Downloading | UpdateState::Downloaded => Err(CheckSkip::Downloading),
            _ => {
                self.state = UpdateState::Checking;
                Ok(())
            },
        }
    }

    /// Record the outcome of the check started by `begin_check`.
    ///
    /// Returns the new state, or `None` when no check was in flight.
    pub fn finish_check(
        &mut self,
        result: LeptonResult<Option<UpdateInfo>>,
    ) -> Option<&UpdateState> {
        if self.state != UpdateState::Checking {
            return None;
        }

        self.state = match result {
            Ok(Some(info)) => {
                log::info!(
                    "[UPDATER] Update available: {} -> {}",
                    info.current_version,
                    info.version
                );
                UpdateState::Available(info)
            },
            Ok(None) => {
                log::debug!("[UPDATER] update-not-available");
                UpdateState::NotAvailable
            },
            Err(err) => {
                log::warn!("[UPDATER] Update check failed: {}", err);
                UpdateState::Error(err.to_string())
            },
        };
        Some(&self.state)
    }

    /// The settled `Available` info, if any.
    pub fn available(&self) -> Option<&UpdateInfo> {
        match &self.state {
            UpdateState::Available(info) => Some(info),
            _ => None,
        }
    }

    /// Start a user-requested download of the available update.
    pub fn begin_download(&mut self) -> LeptonResult<UpdateInfo> {
        let info = self
            .available()
            .cloned()
            .ok_or_else(|| LeptonError::UpdateCheck("no update is available".to_string()))?;
        self.state = UpdateState::Downloading;
        Ok(info)
    }

    pub fn finish_download(&mut self, result: LeptonResult<()>) -> &UpdateState {
        if self.state == UpdateState::Downloading {
            self.state = match result {
                Ok(()) => UpdateState::Downloaded,
                Err(err) => {
                    log::warn!("[UPDATER] Download failed: {}", err);
                    UpdateState::Error(err.to_string())
                },
            };
        }
        &self.state
    }

    pub fn is_downloaded(&self) -> bool {
        self.state == UpdateState::Downloaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTION: UpdatePolicy = UpdatePolicy {
        dev_build: false,
        prerelease: false,
        enabled: true,
    };

    fn info() -> UpdateInfo {
        UpdateInfo {
            version: "1.11.0".to_string(),
            current_version: "1.10.0".to_string(),
            notes: Some("Bug fixes".to_string()),
            date: None,
        }
    }

    #[test]
    fn test_prerelease_detection() {
        assert!(is_prerelease("1.10.0-alpha.2"));
        assert!(is_prerelease("1.10.0-beta.1"));
        assert!(is_prerelease("v2.0.0-rc.1"));
        assert!(is_prerelease("1.10.alpha"));
        assert!(!is_prerelease("1.10.0"));
        assert!(!is_prerelease("v1.10.0"));
        assert!(!is_prerelease("not a version"));
    }

    #[test]
    fn test_gated_builds_never_enter_checking() {
        let cases = [
            (UpdatePolicy { dev_build: true, ..PRODUCTION }, CheckSkip::DevBuild),
            (UpdatePolicy { prerelease: true, ..PRODUCTION }, CheckSkip::Prerelease),
            (UpdatePolicy { enabled: false, ..PRODUCTION }, CheckSkip::Disabled),
        ];
        for (policy, expected) in cases {
            let mut checker = UpdateChecker::new(policy);
            assert_eq!(checker.begin_check(), Err(expected));
            assert_eq!(checker.state(), &UpdateState::Idle);
        }
    }

    #[test]
    fn test_single_in_flight_check() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        assert_eq!(checker.begin_check(), Ok(()));
        assert_eq!(checker.begin_check(), Err(CheckSkip::AlreadyInProgress));
        assert_eq!(checker.state(), &UpdateState::Checking);
    }

    #[test]
    fn test_available_is_exposed_without_download() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        assert!(checker.available().is_none());
        checker.begin_check().unwrap();
        checker.finish_check(Ok(Some(info())));

        assert_eq!(checker.available(), Some(&info()));
        assert_eq!(checker.state(), &UpdateState::Available(info()));
    }

    #[test]
    fn test_not_available() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        checker.begin_check().unwrap();
        assert_eq!(checker.finish_check(Ok(None)), Some(&UpdateState::NotAvailable));
        assert!(checker.available().is_none());
    }

    #[test]
    fn test_error_is_retryable() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        checker.begin_check().unwrap();
        let state = checker
            .finish_check(Err(LeptonError::UpdateCheck("offline".to_string())))
            .cloned();
        assert!(matches!(state, Some(UpdateState::Error(ref detail)) if detail.contains("offline")));

        assert_eq!(checker.begin_check(), Ok(()));
        checker.finish_check(Ok(Some(info())));
        assert!(checker.available().is_some());
    }

    #[test]
    fn test_finish_without_check_is_ignored() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        assert_eq!(checker.finish_check(Ok(Some(info()))), None);
        assert_eq!(checker.state(), &UpdateState::Idle);
    }

    #[test]
    fn test_download_requires_available() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        assert!(checker.begin_download().is_err());
        assert_eq!(checker.state(), &UpdateState::Idle);
    }

    #[test]
    fn test_download_flow() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        checker.begin_check().unwrap();
        checker.finish_check(Ok(Some(info())));

        assert_eq!(checker.begin_download().unwrap(), info());
        assert_eq!(checker.state(), &UpdateState::Downloading);
        assert_eq!(checker.begin_check(), Err(CheckSkip::Downloading));

        assert_eq!(checker.finish_download(Ok(())), &UpdateState::Downloaded);
        assert!(checker.is_downloaded());
        assert_eq!(checker.begin_check(), Err(CheckSkip::Downloading));
    }

    #[test]
    fn test_failed_download_allows_new_check() {
        let mut checker = UpdateChecker::new(PRODUCTION);
        checker.begin_check().unwrap();
        checker.finish_check(Ok(Some(info())));
        checker.begin_download().unwrap();
        checker.finish_download(Err(LeptonError::UpdateCheck("signature".to_string())));

        assert!(matches!(checker.state(), UpdateState::Error(_)));
        assert_eq!(checker.begin_check(), Ok(()));
    }

    #[test]
    fn test_state_serializes_tagged() {
        let json = serde_json::to_value(UpdateState::Available(info())).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["detail"]["currentVersion"], "1.10.0");
        let json = serde_json::to_value(UpdateState::Idle).unwrap();
        assert_eq!(json["status"], "idle");
    }

    #[test]
    fn test_signing_key_requires_non_empty_pubkey() {
        let configured = serde_json::json!({ "pubkey": " dW50cnVzdGVk " });
        assert_eq!(signing_key(Some(&configured)), Some("dW50cnVzdGVk"));

        let blank = serde_json::json!({ "pubkey": "", "endpoints": [] });
        assert_eq!(signing_key(Some(&blank)), None);
        assert_eq!(signing_key(Some(&serde_json::json!({}))), None);
        assert_eq!(signing_key(None), None);
    }
}
