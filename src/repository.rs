use crate::entities::package_record::PackageRecord;
use crate::helpers::{self, ListMode};
use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where pip lives inside a virtual environment
#[cfg(windows)]
const PIP_RELATIVE_PATH: &str = "Scripts/pip.exe";
#[cfg(not(windows))]
const PIP_RELATIVE_PATH: &str = "bin/pip";

/// Reasons a virtual environment cannot be listed. The messages are shown
/// to the user as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("No virtual environment provided.")]
    NoEnvironment,
    #[error("pip command not found: '{}'.", .0.display())]
    PipNotFound(PathBuf),
}

/// Trait for package repository operations
pub trait PackageRepository {
    fn list_uptodate(&self) -> Vec<PackageRecord>;
    fn list_outdated(&self) -> Vec<PackageRecord>;
    fn update_package(&self, package_name: &str) -> Result<()>;
}

/// The pip executable of one virtual environment
#[derive(Debug, Clone)]
pub struct PipRepository {
    pip: PathBuf,
}

impl PipRepository {
    /// Finds pip in the given virtual environment root
    pub fn locate(venv: Option<&Path>) -> Result<Self, LookupError> {
        let venv = match venv {
            Some(venv) if !venv.as_os_str().is_empty() => venv,
            _ => return Err(LookupError::NoEnvironment),
        };

        let pip = venv.join(PIP_RELATIVE_PATH);
        if !pip.is_file() {
            return Err(LookupError::PipNotFound(pip));
        }

        Ok(Self { pip })
    }

    pub fn pip_path(&self) -> &Path {
        &self.pip
    }
}

impl PackageRepository for PipRepository {
    fn list_uptodate(&self) -> Vec<PackageRecord> {
        helpers::pip_list(&self.pip, ListMode::UpToDate)
    }

    fn list_outdated(&self) -> Vec<PackageRecord> {
        helpers::pip_list(&self.pip, ListMode::Outdated)
    }

    fn update_package(&self, package_name: &str) -> Result<()> {
        helpers::pip_install_upgrade(&self.pip, package_name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    /// Creates `<venv>/bin/pip` as a shell script printing canned listings
    #[cfg(unix)]
    pub(crate) fn fake_venv(uptodate_json: &str, outdated_json: &str) -> tempfile::TempDir {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();

        let script = format!(
            "#!/bin/sh\n\
             case \"$*\" in\n\
             *--uptodate*) printf '%s' '{uptodate_json}' ;;\n\
             *--outdated*) printf '%s' '{outdated_json}' ;;\n\
             install*) [ \"$3\" = \"--disable-pip-version-check\" ] && [ \"$4\" = \"broken\" ] && {{ echo 'ERROR: No matching distribution found for broken' >&2; exit 1; }} ; exit 0 ;;\n\
             *) exit 2 ;;\n\
             esac\n"
        );
        let pip = bin.join("pip");
        fs::write(&pip, script).unwrap();
        fs::set_permissions(&pip, fs::Permissions::from_mode(0o755)).unwrap();
        dir
    }

    #[test]
    fn test_locate_without_environment() {
        assert_eq!(
            PipRepository::locate(None).unwrap_err(),
            LookupError::NoEnvironment
        );
        assert_eq!(
            PipRepository::locate(Some(Path::new(""))).unwrap_err(),
            LookupError::NoEnvironment
        );
        assert_eq!(
            LookupError::NoEnvironment.to_string(),
            "No virtual environment provided."
        );
    }

    #[test]
    fn test_locate_missing_pip() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipRepository::locate(Some(dir.path())).unwrap_err();
        let expected = dir.path().join(PIP_RELATIVE_PATH);
        assert_eq!(err, LookupError::PipNotFound(expected.clone()));
        assert_eq!(
            err.to_string(),
            format!("pip command not found: '{}'.", expected.display())
        );
    }

    #[test]
    fn test_locate_finds_pip() {
        let dir = tempfile::tempdir().unwrap();
        let pip = dir.path().join(PIP_RELATIVE_PATH);
        fs::create_dir_all(pip.parent().unwrap()).unwrap();
        fs::write(&pip, "").unwrap();

        let repository = PipRepository::locate(Some(dir.path())).unwrap();
        assert_eq!(repository.pip_path(), pip);
    }

    #[cfg(unix)]
    #[test]
    fn test_lists_through_pip() {
        let venv = fake_venv(
            r#"[{"name": "flask", "version": "3.0"}]"#,
            r#"[{"name": "requests", "version": "2.0", "latest_version": "2.31", "latest_filetype": "wheel"}]"#,
        );
        let repository = PipRepository::locate(Some(venv.path())).unwrap();

        assert_eq!(
            repository.list_uptodate(),
            vec![PackageRecord::new("flask", "3.0", "")]
        );
        assert_eq!(
            repository.list_outdated(),
            vec![PackageRecord::new("requests", "2.0", "2.31")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_uptodate_listing_never_carries_latest_version() {
        let venv = fake_venv(
            r#"[{"name": "flask", "version": "3.0", "latest_version": "9.9", "latest_filetype": "wheel"}]"#,
            "[]",
        );
        let repository = PipRepository::locate(Some(venv.path())).unwrap();

        let uptodate = repository.list_uptodate();
        assert_eq!(uptodate, vec![PackageRecord::new("flask", "3.0", "")]);
        assert!(!uptodate[0].has_update_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_unparseable_listing_is_empty() {
        let venv = fake_venv("not json", "");
        let repository = PipRepository::locate(Some(venv.path())).unwrap();
        assert!(repository.list_uptodate().is_empty());
        assert!(repository.list_outdated().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_update_package() {
        let venv = fake_venv("[]", "[]");
        let repository = PipRepository::locate(Some(venv.path())).unwrap();

        assert!(repository.update_package("requests").is_ok());

        let err = repository.update_package("broken").unwrap_err();
        assert!(err.to_string().contains("No matching distribution found"));
    }
}
