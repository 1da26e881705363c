use crate::config::Config;
use crate::entities::package_record::PackageRecord;
use crate::models::{PackageCollections, Selection};
use crate::repository::{PackageRepository, PipRepository};
use anyhow::Result;
use ratatui::widgets::ListState;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Modal state for the application
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    None,
    UpdateConfirmation,
    /// Drawn once before the blocking pip run starts
    Updating,
}

/// Application state and business logic
pub struct App {
    pub view: PackageCollections,
    pub list_state: ListState,
    pub should_quit: bool,
    pub search_query: String,
    pub is_searching: bool,
    pub status_messages: VecDeque<(String, Instant)>,
    pub venv: Option<PathBuf>,
    pub registry: String,
    status_timeout: Duration,
    pub pending_update: Option<PackageRecord>,
    pub modal_state: ModalState,
}

impl App {
    /// Creates a new application instance and loads the environment's packages
    pub fn new(config: &Config, venv: Option<PathBuf>) -> Self {
        let mut app = Self::with_collections(
            config,
            venv,
            PackageCollections::new(config.case_sensitive_search),
        );
        app.refresh_packages();
        app
    }

    fn with_collections(config: &Config, venv: Option<PathBuf>, view: PackageCollections) -> Self {
        let mut app = Self {
            view,
            list_state: ListState::default(),
            should_quit: false,
            search_query: String::new(),
            is_searching: false,
            status_messages: VecDeque::new(),
            venv,
            registry: config.registry.clone(),
            status_timeout: Duration::from_secs(config.status_timeout_secs),
            pending_update: None,
            modal_state: ModalState::None,
        };
        app.reset_selection();
        app
    }

    /// Reloads the package lists from the virtual environment
    pub fn refresh_packages(&mut self) {
        self.refresh_packages_keeping(None);
    }

    /// Reloads the package lists, selecting the named package afterwards if
    /// it is still on display
    fn refresh_packages_keeping(&mut self, package_name: Option<&str>) {
        let message = self.view.resync(self.venv.as_deref());
        if message.is_empty() {
            self.add_status_message(format!(
                "Loaded {} packages ({} outdated)",
                self.view.count(Selection::All),
                self.view.count(Selection::Outdated)
            ));
        } else {
            self.add_status_message(message);
        }

        let position = package_name.and_then(|name| {
            self.display_items()
                .iter()
                .position(|package| package.name == name)
        });
        match position {
            Some(index) => self.list_state.select(Some(index)),
            None => self.reset_selection(),
        }
    }

    /// Gets the current list of packages to display
    pub fn display_items(&mut self) -> &[PackageRecord] {
        self.view.compute_filtered(&self.search_query)
    }

    fn items_len(&mut self) -> usize {
        self.display_items().len()
    }

    /// Selects the first item, or nothing when the list is empty
    fn reset_selection(&mut self) {
        if self.items_len() > 0 {
            self.list_state.select(Some(0));
        } else {
            self.list_state.select(None);
        }
    }

    /// Moves to the next item in the list
    pub fn next(&mut self) {
        let items_len = self.items_len();
        if items_len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i >= items_len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Moves to the previous item in the list
    pub fn previous(&mut self) {
        let items_len = self.items_len();
        if items_len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) => items_len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Moves down by a page (10 items)
    pub fn page_down(&mut self) {
        let items_len = self.items_len();
        if items_len == 0 {
            return;
        }

        let page_size = 10;
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state
            .select(Some((current + page_size).min(items_len - 1)));
    }

    /// Moves up by a page (10 items)
    pub fn page_up(&mut self) {
        if self.items_len() == 0 {
            return;
        }

        let page_size = 10;
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(current.saturating_sub(page_size)));
    }

    /// Moves to the first item
    pub fn first(&mut self) {
        if self.items_len() > 0 {
            self.list_state.select(Some(0));
        }
    }

    /// Moves to the last item
    pub fn go_to_last(&mut self) {
        let items_len = self.items_len();
        if items_len > 0 {
            self.list_state.select(Some(items_len - 1));
        }
    }

    /// Gets the currently selected package
    pub fn get_selected_package(&mut self) -> Option<PackageRecord> {
        let selected = self.list_state.selected()?;
        self.display_items().get(selected).cloned()
    }

    /// Shows another category of packages
    pub fn select_category(&mut self, selection: Selection) {
        if self.view.selected() != selection {
            self.view.select(selection);
            self.reset_selection();
        }
    }

    pub fn next_category(&mut self) {
        self.select_category(self.view.selected().next());
    }

    pub fn previous_category(&mut self) {
        self.select_category(self.view.selected().previous());
    }

    /// Switches search between case-sensitive and case-insensitive matching
    pub fn toggle_case_sensitive(&mut self) {
        let case_sensitive = !self.view.is_case_sensitive();
        self.view.set_case_sensitive(case_sensitive);
        self.reset_selection();
        self.add_status_message(if case_sensitive {
            "Search is case-sensitive".to_string()
        } else {
            "Search ignores case".to_string()
        });
    }

    /// Starts search mode
    pub fn start_search(&mut self) {
        self.is_searching = true;
        self.search_query.clear();
        self.reset_selection();
    }

    /// Ends search mode and keeps the selected package selected
    pub fn end_search(&mut self) {
        let selected_package_name = self.get_selected_package().map(|pkg| pkg.name);

        self.is_searching = false;
        self.search_query.clear();

        let position = selected_package_name.and_then(|name| {
            self.display_items()
                .iter()
                .position(|package| package.name == name)
        });
        match position {
            Some(index) => self.list_state.select(Some(index)),
            None => self.reset_selection(),
        }
    }

    /// Adds a character to the search query
    pub fn add_search_char(&mut self, c: char) {
        if self.is_searching {
            self.search_query.push(c);
            self.reset_selection();
        }
    }

    /// Removes the last character from the search query
    pub fn remove_search_char(&mut self) {
        if self.is_searching && self.search_query.pop().is_some() {
            self.reset_selection();
        }
    }

    /// Opens the selected package's project page in the system browser
    pub fn open_selected_webpage(&mut self) {
        let Some(package) = self.get_selected_package() else {
            return;
        };

        let url = package.project_url(&self.registry);
        match webbrowser::open(&url) {
            Ok(()) => self.add_status_message(format!("Opened {}", url)),
            Err(err) => {
                log::warn!("could not open {}: {}", url, err);
                self.add_status_message(format!("❌ Could not open {}: {}", url, err));
            }
        }
    }

    /// Asks for confirmation before updating the selected package
    pub fn update_selected_package(&mut self) {
        let Some(package) = self.get_selected_package() else {
            return;
        };

        if package.has_update_available() {
            self.pending_update = Some(package);
            self.modal_state = ModalState::UpdateConfirmation;
        } else {
            self.add_status_message(format!("{} is already up to date", package.name));
        }
    }

    /// Confirms the update; it runs after the next frame is drawn
    pub fn confirm_update(&mut self) {
        if self.pending_update.is_some() {
            self.modal_state = ModalState::Updating;
        }
    }

    /// Cancels the update
    pub fn cancel_update(&mut self) {
        self.pending_update = None;
        self.modal_state = ModalState::None;
        self.add_status_message("Update cancelled".to_string());
    }

    /// Runs a confirmed update, then reloads the package lists
    pub fn run_pending_update(&mut self) {
        if self.modal_state != ModalState::Updating {
            return;
        }
        self.modal_state = ModalState::None;
        let Some(package) = self.pending_update.take() else {
            return;
        };

        match self.upgrade(&package) {
            Ok(()) => {
                self.refresh_packages_keeping(Some(package.name.as_str()));
                self.add_status_message(format!(
                    "✅ {} updated to {}",
                    package.name, package.latest_version
                ));
            }
            Err(err) => {
                log::error!("update of {} failed: {:#}", package.name, err);
                self.add_status_message(format!("❌ Failed to update {}: {}", package.name, err));
            }
        }
    }

    fn upgrade(&self, package: &PackageRecord) -> Result<()> {
        let repository = PipRepository::locate(self.venv.as_deref())?;
        repository.update_package(&package.name)
    }

    /// Sets the quit flag
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Adds a status message that will be displayed in the status bar
    pub fn add_status_message(&mut self, message: String) {
        self.status_messages.push_back((message, Instant::now()));
        // Keep only the last 5 messages
        while self.status_messages.len() > 5 {
            self.status_messages.pop_front();
        }
    }

    /// Gets the current status message to display
    pub fn get_current_status(&mut self) -> Option<String> {
        let now = Instant::now();
        while let Some((_, timestamp)) = self.status_messages.front() {
            if now.duration_since(*timestamp) > self.status_timeout {
                self.status_messages.pop_front();
            } else {
                break;
            }
        }

        self.status_messages.back().map(|(msg, _)| msg.clone())
    }
}
