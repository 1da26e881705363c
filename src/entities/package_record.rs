use crate::entities::pip_list_response::PipListEntry;

/// Registry host used for project links when nothing else is configured
pub const DEFAULT_REGISTRY: &str = "pypi.org";

/// A package installed in the virtual environment.
///
/// `latest_version` is empty when the package is already current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub installed_version: String,
    pub latest_version: String,
}

impl PackageRecord {
    pub fn new(
        name: impl Into<String>,
        installed_version: impl Into<String>,
        latest_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            installed_version: installed_version.into(),
            latest_version: latest_version.into(),
        }
    }

    /// Checks if a newer version was reported for this package
    pub fn has_update_available(&self) -> bool {
        !self.latest_version.is_empty()
    }

    /// The latest version, absent when the package is current
    pub fn latest(&self) -> Option<&str> {
        if self.has_update_available() {
            Some(&self.latest_version)
        } else {
            None
        }
    }

    /// Project webpage on the given registry host
    pub fn project_url(&self, registry: &str) -> String {
        format!("https://{}/project/{}/", registry.trim_end_matches('/'), self.name)
    }

    /// Gets the version line shown under the package name
    pub fn version_summary(&self) -> String {
        match self.latest() {
            Some(latest) => format!("{} -> {}", self.installed_version, latest),
            None => self.installed_version.clone(),
        }
    }

    /// Case-insensitive key used to order every stored collection
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl From<PipListEntry> for PackageRecord {
    fn from(entry: PipListEntry) -> Self {
        Self {
            name: entry.name,
            installed_version: entry.version,
            latest_version: entry.latest_version.unwrap_or_default(),
        }
    }
}
