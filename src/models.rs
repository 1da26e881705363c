use crate::entities::package_record::PackageRecord;
use crate::helpers::sort_by_name;
use crate::repository::{PackageRepository, PipRepository};
use std::collections::HashSet;
use std::path::Path;

/// Which part of the environment is on display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    UpToDate,
    Outdated,
}

impl Selection {
    pub const VARIANTS: [Selection; 3] = [Selection::All, Selection::UpToDate, Selection::Outdated];

    pub fn title(self) -> &'static str {
        match self {
            Selection::All => "All",
            Selection::UpToDate => "Up to date",
            Selection::Outdated => "Outdated",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Selection::All => 0,
            Selection::UpToDate => 1,
            Selection::Outdated => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::VARIANTS[(self.index() + 1) % Self::VARIANTS.len()]
    }

    pub fn previous(self) -> Self {
        Self::VARIANTS[(self.index() + Self::VARIANTS.len() - 1) % Self::VARIANTS.len()]
    }
}

/// The package lists of one virtual environment and the filtered view of them
#[derive(Debug)]
pub struct PackageCollections {
    all: Vec<PackageRecord>,
    uptodate: Vec<PackageRecord>,
    outdated: Vec<PackageRecord>,
    selected: Selection,
    filtered: Vec<PackageRecord>,
    // Search term `filtered` was last built with
    applied_search: String,
    needs_recompute: bool,
    case_sensitive: bool,
}

impl Default for PackageCollections {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PackageCollections {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            all: Vec::new(),
            uptodate: Vec::new(),
            outdated: Vec::new(),
            selected: Selection::All,
            filtered: Vec::new(),
            applied_search: String::new(),
            needs_recompute: true,
            case_sensitive,
        }
    }

    /// Reloads every list from pip in the given virtual environment.
    ///
    /// Returns an empty string on success, otherwise a message for the
    /// status line. A failed lookup leaves all lists empty.
    pub fn resync(&mut self, venv: Option<&Path>) -> String {
        match PipRepository::locate(venv) {
            Ok(repository) => {
                log::debug!("listing packages with {}", repository.pip_path().display());
                self.resync_with(&repository);
                String::new()
            }
            Err(err) => {
                log::warn!("{}", err);
                self.replace(Vec::new(), Vec::new());
                err.to_string()
            }
        }
    }

    /// Reloads every list from an already located repository
    pub fn resync_with(&mut self, repository: &dyn PackageRepository) {
        let uptodate = repository.list_uptodate();
        let outdated = repository.list_outdated();
        log::debug!(
            "resync found {} up-to-date and {} outdated packages",
            uptodate.len(),
            outdated.len()
        );
        self.replace(uptodate, outdated);
    }

    fn replace(&mut self, mut uptodate: Vec<PackageRecord>, mut outdated: Vec<PackageRecord>) {
        // A package can only be one of the two
        let outdated_names: HashSet<&str> = outdated.iter().map(|p| p.name.as_str()).collect();
        uptodate.retain(|p| !outdated_names.contains(p.name.as_str()));

        let mut all: Vec<PackageRecord> = outdated.iter().chain(uptodate.iter()).cloned().collect();
        sort_by_name(&mut all);
        sort_by_name(&mut uptodate);
        sort_by_name(&mut outdated);

        self.all = all;
        self.uptodate = uptodate;
        self.outdated = outdated;
        self.selected = Selection::All;
        self.invalidate();
    }

    #[cfg(test)]
    pub(crate) fn with_records(uptodate: Vec<PackageRecord>, outdated: Vec<PackageRecord>) -> Self {
        let mut collections = Self::default();
        collections.replace(uptodate, outdated);
        collections
    }

    /// Changes the category on display
    pub fn select(&mut self, selection: Selection) {
        if self.selected != selection {
            self.selected = selection;
            self.invalidate();
        }
    }

    pub fn selected(&self) -> Selection {
        self.selected
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        if self.case_sensitive != case_sensitive {
            self.case_sensitive = case_sensitive;
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.needs_recompute = true;
    }

    /// Produces the records to display for the selected category and the
    /// given search term. Rebuilt only when the category or term changed.
    pub fn compute_filtered(&mut self, search: &str) -> &[PackageRecord] {
        if search != self.applied_search {
            self.applied_search = search.to_string();
            self.invalidate();
        }

        if self.needs_recompute {
            let source = self.collection(self.selected);
            let filtered: Vec<PackageRecord> = if search.is_empty() {
                source.to_vec()
            } else if self.case_sensitive {
                source
                    .iter()
                    .filter(|p| p.name.contains(search))
                    .cloned()
                    .collect()
            } else {
                let search_lower = search.to_lowercase();
                source
                    .iter()
                    .filter(|p| p.name.to_lowercase().contains(&search_lower))
                    .cloned()
                    .collect()
            };
            self.filtered = filtered;
            self.needs_recompute = false;
        }

        &self.filtered
    }

    /// One of the three stored lists
    pub fn collection(&self, selection: Selection) -> &[PackageRecord] {
        match selection {
            Selection::All => &self.all,
            Selection::UpToDate => &self.uptodate,
            Selection::Outdated => &self.outdated,
        }
    }

    pub fn count(&self, selection: Selection) -> usize {
        self.collection(selection).len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    struct FakeRepository {
        uptodate: Vec<PackageRecord>,
        outdated: Vec<PackageRecord>,
    }

    impl PackageRepository for FakeRepository {
        fn list_uptodate(&self) -> Vec<PackageRecord> {
            self.uptodate.clone()
        }

        fn list_outdated(&self) -> Vec<PackageRecord> {
            self.outdated.clone()
        }

        fn update_package(&self, _package_name: &str) -> Result<()> {
            Ok(())
        }
    }

    fn names(records: &[PackageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn example_collections() -> PackageCollections {
        let repository = FakeRepository {
            uptodate: vec![
                PackageRecord::new("flask", "3.0", ""),
                PackageRecord::new("Zeta", "1.0", ""),
                PackageRecord::new("alpha", "0.1", ""),
            ],
            outdated: vec![
                PackageRecord::new("requests", "2.0", "2.31"),
                PackageRecord::new("requests-toolbelt", "0.9", "1.0"),
            ],
        };
        let mut collections = PackageCollections::default();
        collections.resync_with(&repository);
        collections
    }

    #[test]
    fn test_resync_example() {
        let repository = FakeRepository {
            uptodate: vec![PackageRecord::new("flask", "3.0", "")],
            outdated: vec![PackageRecord::new("requests", "2.0", "2.31")],
        };
        let mut collections = PackageCollections::default();
        collections.select(Selection::UpToDate);
        collections.resync_with(&repository);

        assert_eq!(collections.selected(), Selection::All);
        assert_eq!(names(collections.collection(Selection::All)), ["flask", "requests"]);
        assert_eq!(names(collections.collection(Selection::UpToDate)), ["flask"]);
        assert_eq!(names(collections.collection(Selection::Outdated)), ["requests"]);

        collections.select(Selection::Outdated);
        assert_eq!(
            collections.compute_filtered(""),
            [PackageRecord::new("requests", "2.0", "2.31")]
        );
    }

    #[test]
    fn test_all_is_sorted_union_without_duplicates() {
        let repository = FakeRepository {
            uptodate: vec![
                PackageRecord::new("requests", "2.0", ""),
                PackageRecord::new("Flask", "3.0", ""),
            ],
            outdated: vec![PackageRecord::new("requests", "2.0", "2.31")],
        };
        let mut collections = PackageCollections::default();
        collections.resync_with(&repository);

        assert_eq!(names(collections.collection(Selection::All)), ["Flask", "requests"]);
        assert_eq!(names(collections.collection(Selection::UpToDate)), ["Flask"]);
        assert!(collections.collection(Selection::All)[1].has_update_available());
    }

    #[test]
    fn test_sorting_ignores_case() {
        let collections = example_collections();
        assert_eq!(
            names(collections.collection(Selection::UpToDate)),
            ["alpha", "flask", "Zeta"]
        );
        assert_eq!(
            names(collections.collection(Selection::All)),
            ["alpha", "flask", "requests", "requests-toolbelt", "Zeta"]
        );
    }

    #[test]
    fn test_empty_search_returns_all() {
        let mut collections = example_collections();
        let all = collections.collection(Selection::All).to_vec();
        assert_eq!(collections.compute_filtered(""), all.as_slice());
    }

    #[test]
    fn test_search_narrows_by_substring() {
        let mut collections = example_collections();
        assert_eq!(
            names(collections.compute_filtered("req")),
            ["requests", "requests-toolbelt"]
        );
        assert_eq!(names(collections.compute_filtered("toolbelt")), ["requests-toolbelt"]);
        // Widening the term again starts from the full category
        assert_eq!(names(collections.compute_filtered("")).len(), 5);
    }

    #[test]
    fn test_search_is_case_sensitive_by_default() {
        let mut collections = example_collections();
        assert!(collections.compute_filtered("zeta").is_empty());
        assert_eq!(names(collections.compute_filtered("Zeta")), ["Zeta"]);

        collections.set_case_sensitive(false);
        assert_eq!(names(collections.compute_filtered("zeta")), ["Zeta"]);
    }

    #[test]
    fn test_failed_resync_leaves_everything_empty() {
        let mut collections = example_collections();
        let message = collections.resync(None);

        assert_eq!(message, "No virtual environment provided.");
        assert!(collections.is_empty());
        assert!(collections.compute_filtered("").is_empty());
        assert!(collections.compute_filtered("anything").is_empty());
    }

    #[test]
    fn test_resync_with_missing_pip() {
        let dir = tempfile::tempdir().unwrap();
        let mut collections = PackageCollections::default();
        let message = collections.resync(Some(dir.path()));

        assert!(message.starts_with("pip command not found: '"));
        assert!(collections.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_resync_through_pip() {
        let venv = crate::repository::tests::fake_venv(
            r#"[{"name": "flask", "version": "3.0"}]"#,
            r#"[{"name": "requests", "version": "2.0", "latest_version": "2.31", "latest_filetype": "wheel"}]"#,
        );
        let mut collections = PackageCollections::default();

        assert_eq!(collections.resync(Some(venv.path())), "");
        assert_eq!(names(collections.compute_filtered("")), ["flask", "requests"]);
    }

    #[test]
    fn test_switching_category_is_not_stale() {
        let mut collections = example_collections();

        collections.select(Selection::UpToDate);
        assert_eq!(names(collections.compute_filtered("")), ["alpha", "flask", "Zeta"]);

        collections.select(Selection::Outdated);
        assert_eq!(
            names(collections.compute_filtered("")),
            ["requests", "requests-toolbelt"]
        );
    }

    #[test]
    fn test_empty_result_is_cached() {
        let repository = FakeRepository {
            uptodate: vec![PackageRecord::new("flask", "3.0", "")],
            outdated: Vec::new(),
        };
        let mut collections = PackageCollections::default();
        collections.resync_with(&repository);
        collections.select(Selection::Outdated);

        assert!(collections.compute_filtered("").is_empty());
        assert!(!collections.needs_recompute);
        assert!(collections.compute_filtered("").is_empty());
        assert!(!collections.needs_recompute);

        collections.select(Selection::All);
        assert!(collections.needs_recompute);
        assert_eq!(names(collections.compute_filtered("")), ["flask"]);
    }
}
