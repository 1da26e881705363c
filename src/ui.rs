use crate::app::{App, ModalState};
use crate::entities::package_record::PackageRecord;
use crate::models::Selection;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
};
use std::time::Duration;

const OUTDATED_COLOUR: Color = Color::Rgb(220, 80, 80);

/// Renders the loading screen shown while pip is queried for the first time
pub fn render_loading_screen(f: &mut Frame, loading_dots: usize, elapsed: Duration) {
    let area = f.area();

    let ascii_art = [
        "██████╗ ██╗██████╗ ",
        "██╔══██╗██║██╔══██╗",
        "██████╔╝██║██████╔╝",
        "██╔═══╝ ██║██╔═══╝ ",
        "██║     ██║██║     ",
        "╚═╝     ╚═╝╚═╝     ",
    ];

    let vertical_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(ascii_art.len() as u16),
            Constraint::Length(5),
            Constraint::Percentage(30),
        ])
        .split(area);

    let ascii_lines: Vec<Line> = ascii_art
        .iter()
        .map(|line| {
            Line::from(Span::styled(
                *line,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    f.render_widget(
        Paragraph::new(ascii_lines).alignment(Alignment::Center),
        vertical_layout[1],
    );

    let dots = match loading_dots {
        1 => ".  ",
        2 => ".. ",
        3 => "...",
        _ => "   ",
    };

    let elapsed_secs = elapsed.as_secs();
    let elapsed_display = if elapsed_secs > 0 {
        format!(" ({}s)", elapsed_secs)
    } else {
        String::new()
    };

    let loading_text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("🐍 ", Style::default()),
            Span::styled(
                "Asking pip about your packages",
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                dots,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(elapsed_display, Style::default().fg(Color::Gray)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press 'q' to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(
        Paragraph::new(loading_text).alignment(Alignment::Center),
        vertical_layout[2],
    );
}

/// Renders the main UI
pub fn render_ui(f: &mut Frame, app: &mut App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[1]);

    render_category_tabs(f, app, main_chunks[0]);
    render_package_list(f, app, content_chunks[0]);
    render_package_details(f, app, content_chunks[1]);
    render_status_bar(f, app, main_chunks[2]);

    match app.modal_state {
        ModalState::UpdateConfirmation => render_update_confirmation_modal(f, app),
        ModalState::Updating => render_updating_modal(f, app),
        ModalState::None => {}
    }
}

/// Renders the All / Up to date / Outdated selector with package counts
fn render_category_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Selection::VARIANTS
        .iter()
        .map(|selection| {
            Line::from(format!(
                " {} ({}) ",
                selection.title(),
                app.view.count(*selection)
            ))
        })
        .collect();

    let venv = app
        .venv
        .as_ref()
        .map(|venv| venv.display().to_string())
        .unwrap_or_else(|| "no virtual environment".to_string());

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(venv))
        .select(app.view.selected().index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

/// Renders the package list on the left panel
fn render_package_list(f: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.is_searching {
        let matches = app.display_items().len();
        if matches == 0 {
            format!("Packages (Search: {}) - No results", app.search_query)
        } else {
            format!("Packages (Search: {})", app.search_query)
        }
    } else {
        "Packages".to_string()
    };

    let list_items: Vec<ListItem> = app
        .display_items()
        .iter()
        .map(|package| {
            ListItem::new(Line::from(vec![
                Span::styled(package.name.clone(), get_package_style(package)),
                Span::styled(
                    format!("  {}", package.version_summary()),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let items_list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(items_list, area, &mut app.list_state);
}

/// Gets the appropriate style for a package based on its status
fn get_package_style(package: &PackageRecord) -> Style {
    if package.has_update_available() {
        Style::default().fg(OUTDATED_COLOUR)
    } else {
        Style::default().fg(Color::Green)
    }
}

/// Renders the package details on the right panel
fn render_package_details(f: &mut Frame, app: &mut App, area: Rect) {
    let details = match app.get_selected_package() {
        Some(package) => create_package_details_text(&package, &app.registry),
        None if app.view.is_empty() => Text::from("No packages to show"),
        None => Text::from("No package selected"),
    };

    let details_paragraph = Paragraph::new(details)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Package Details"),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(details_paragraph, area);

    render_help_text(f, area);
}

/// Creates the detailed text for a package
fn create_package_details_text(package: &PackageRecord, registry: &str) -> Text<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let (latest_text, latest_colour) = match package.latest() {
        Some(latest) => (format!("{} (update available)", latest), OUTDATED_COLOUR),
        None => ("up to date".to_string(), Color::Green),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name: ", bold),
            Span::raw(package.name.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Installed Version: ", bold),
            Span::raw(package.installed_version.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Latest Version: ", bold),
            Span::styled(latest_text, Style::default().fg(latest_colour)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Webpage: ", bold),
            Span::styled(
                package.project_url(registry),
                Style::default().fg(Color::Blue),
            ),
        ]),
        Line::from(""),
        Line::from(""),
    ];

    lines.extend(create_action_hints(package));

    Text::from(lines)
}

/// Creates action hints based on package state
fn create_action_hints(package: &PackageRecord) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![Span::styled(
            "⚡ Actions:",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Cyan),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::raw("    ◦ "),
            Span::styled(
                "webpage",
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" (press 'o' to open)", Style::default().fg(Color::Gray)),
        ]),
    ];

    if let Some(latest) = package.latest() {
        lines.push(Line::from(vec![
            Span::raw("    ◦ "),
            Span::styled(
                "update",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" (press 'u' to update to {})", latest),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }

    lines
}

/// Renders help text at the bottom of the details panel
fn render_help_text(f: &mut Frame, area: Rect) {
    let help_text = "Navigate: ↑/↓ | Category: Tab 1/2/3 | Search: / (case: c) | Actions: o/u | Reload: r | Quit: q";
    let help_paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::Gray));

    let help_area = area.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    let help_rect = Rect {
        x: help_area.x,
        y: help_area.bottom().saturating_sub(1),
        width: help_area.width,
        height: 1,
    };

    f.render_widget(help_paragraph, help_rect);
}

/// Renders the status bar at the bottom of the screen
fn render_status_bar(f: &mut Frame, app: &mut App, area: Rect) {
    let status_text = if let Some(message) = app.get_current_status() {
        message
    } else {
        "Navigate: ↑/↓ PgUp/PgDn Home/End | Category: Tab | Search: / | Quit: q".to_string()
    };

    let status_paragraph = Paragraph::new(status_text)
        .style(Style::default().bg(Color::Blue).fg(Color::White))
        .wrap(Wrap { trim: true });

    f.render_widget(status_paragraph, area);
}

/// Centers a fixed-size modal in the frame and clears what is behind it
fn modal_area(f: &mut Frame, width: u16, height: u16) -> Rect {
    let area = f.area();
    let width = width.min(area.width);
    let height = height.min(area.height);
    let rect = Rect {
        x: (area.width - width) / 2,
        y: (area.height - height) / 2,
        width,
        height,
    };
    f.render_widget(Clear, rect);
    rect
}

/// Renders the update confirmation modal
fn render_update_confirmation_modal(f: &mut Frame, app: &App) {
    let Some(package) = app.pending_update.as_ref() else {
        return;
    };
    let area = modal_area(f, 56, 8);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Update '{}' from {} to {}?",
                package.name, package.installed_version, package.latest_version
            ),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "pip install --upgrade runs in the virtual environment.",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Y",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to confirm, ", Style::default().fg(Color::Gray)),
            Span::styled(
                "N",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to cancel", Style::default().fg(Color::Gray)),
        ]),
    ];

    let modal_block = Block::default()
        .title("Confirm Update")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let content_paragraph = Paragraph::new(content)
        .block(modal_block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(content_paragraph, area);
}

/// Renders the modal shown while pip upgrades a package
fn render_updating_modal(f: &mut Frame, app: &App) {
    let package_name = app
        .pending_update
        .as_ref()
        .map(|package| package.name.as_str())
        .unwrap_or("package");
    let area = modal_area(f, 50, 5);

    let modal_block = Block::default()
        .title(format!("Updating {}", package_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .style(Style::default().bg(Color::Black));

    let content_paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Waiting for pip to finish...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(modal_block)
    .alignment(Alignment::Center);
    f.render_widget(content_paragraph, area);
}
