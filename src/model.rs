//! Records shared between pipeline stages.
use serde::Serialize;
use std::collections::BTreeSet;

/// Maintainer identity reused across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MaintainerProfile {
    pub name: String,
    pub email: String,
    pub launchpad_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpg_key_id: Option<String>,
}

impl MaintainerProfile {
    /// `Name <email>` as used by control and changelog files.
    pub fn maintainer_line(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// A saved profile is only reusable if every required field is present
    /// and the email still validates.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.launchpad_username.trim().is_empty()
            && crate::validate::is_valid_email(&self.email)
    }
}

/// The package being built in this run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSpec {
    pub name: String,
    pub version: String,
    pub description: String,
    pub dependencies: BTreeSet<String>,
}

impl PackageSpec {
    /// `name-version`, the workspace directory name.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// `name_version`, the Debian artifact stem.
    pub fn artifact_stem(&self) -> String {
        format!("{}_{}", self.name, self.version)
    }

    /// `ppa:user/name` for `add-apt-repository`.
    pub fn ppa_ref(&self, launchpad_username: &str) -> String {
        format!("ppa:{}/{}", launchpad_username, self.name)
    }

    /// Public PPA page on Launchpad.
    pub fn ppa_homepage(&self, launchpad_username: &str) -> String {
        format!(
            "https://launchpad.net/~{}/+archive/ubuntu/{}",
            launchpad_username, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> PackageSpec {
        PackageSpec {
            name: "hello".to_string(),
            version: "1.2.3".to_string(),
            description: "Hello".to_string(),
            dependencies: BTreeSet::new(),
        }
    }

    #[test]
    fn derived_names() {
        let spec = spec();
        assert_eq!(spec.dir_name(), "hello-1.2.3");
        assert_eq!(spec.artifact_stem(), "hello_1.2.3");
        assert_eq!(spec.ppa_ref("alice"), "ppa:alice/hello");
        assert_eq!(
            spec.ppa_homepage("alice"),
            "https://launchpad.net/~alice/+archive/ubuntu/hello"
        );
    }

    #[test]
    fn profile_completeness() {
        let mut profile = MaintainerProfile {
            name: "Alice".to_string(),
            email: "alice@example.org".to_string(),
            launchpad_username: "alice".to_string(),
            gpg_key_id: None,
        };
        assert!(profile.is_complete());
        assert_eq!(profile.maintainer_line(), "Alice <alice@example.org>");
        profile.email = "alice@localhost".to_string();
        assert!(!profile.is_complete());
    }
}
