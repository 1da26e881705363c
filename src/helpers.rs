use crate::entities::package_record::PackageRecord;
use crate::entities::pip_list_response::PipListResponse;
use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Which half of the environment a `pip list` run should report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    UpToDate,
    Outdated,
}

impl ListMode {
    fn flag(self) -> &'static str {
        match self {
            ListMode::UpToDate => "--uptodate",
            ListMode::Outdated => "--outdated",
        }
    }
}

/// Runs `pip list` in one mode and parses whatever it printed.
///
/// Listing is best effort: a failed spawn, a non-zero exit or output we
/// cannot read all come back as an empty list.
pub fn pip_list(pip: &Path, mode: ListMode) -> Vec<PackageRecord> {
    log::debug!("running {} list {}", pip.display(), mode.flag());

    let output = match Command::new(pip)
        .args([
            "list",
            mode.flag(),
            "--format=json",
            "--disable-pip-version-check",
        ])
        .output()
    {
        Ok(output) => output,
        Err(err) => {
            log::warn!("could not run {}: {}", pip.display(), err);
            return Vec::new();
        }
    };

    if !output.status.success() {
        log::warn!(
            "{} list {} exited with {}",
            pip.display(),
            mode.flag(),
            output.status
        );
        return Vec::new();
    }

    let mut records = parse_pip_list(&String::from_utf8_lossy(&output.stdout));
    if mode == ListMode::UpToDate {
        // Only the outdated listing knows about newer releases
        for record in &mut records {
            record.latest_version.clear();
        }
    }
    records
}

/// Runs `pip install --upgrade` for a single package
pub fn pip_install_upgrade(pip: &Path, package_name: &str) -> Result<()> {
    log::info!("upgrading {} with {}", package_name, pip.display());

    let output = Command::new(pip)
        .args([
            "install",
            "--upgrade",
            "--disable-pip-version-check",
            package_name,
        ])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("no error output");
        return Err(anyhow::anyhow!(
            "pip install --upgrade {} failed: {}",
            package_name,
            reason.trim()
        ));
    }

    Ok(())
}

/// Parses `pip list` output, JSON first and the column layout second
pub fn parse_pip_list(output: &str) -> Vec<PackageRecord> {
    match serde_json::from_str::<PipListResponse>(output) {
        Ok(entries) => entries.into_iter().map(PackageRecord::from).collect(),
        Err(err) => {
            log::debug!("pip output is not JSON ({}), trying columns", err);
            parse_pip_columns(output)
        }
    }
}

/// Parses the legacy column layout:
///
/// ```text
/// Package  Version Latest Type
/// -------- ------- ------ -----
/// requests 2.0     2.31   wheel
/// ```
///
/// Without the header and dashed separator the text is not trusted and
/// nothing is returned.
fn parse_pip_columns(output: &str) -> Vec<PackageRecord> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());

    let has_header = lines
        .next()
        .map(|line| line.split_whitespace().take(2).eq(["Package", "Version"]))
        .unwrap_or(false);
    let has_separator = lines
        .next()
        .map(|line| line.trim_start().starts_with('-'))
        .unwrap_or(false);
    if !has_header || !has_separator {
        return Vec::new();
    }

    lines
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let version = fields.next()?;
            let latest = fields.next().unwrap_or("");
            // Editable installs put a path in the third column
            let latest = if latest.contains(['/', '\\']) { "" } else { latest };
            Some(PackageRecord::new(name, version, latest))
        })
        .collect()
}

/// Orders records by case-insensitive name
pub fn sort_by_name(records: &mut [PackageRecord]) {
    records.sort_by_cached_key(PackageRecord::sort_key);
}
