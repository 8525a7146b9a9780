//! Drawing

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
};

use crate::app::{App, View};

/// Draw the UI
pub fn draw_ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_tabs(frame, chunks[0], app);

    match app.view {
        View::Library => draw_library_view(frame, chunks[1], app),
        View::Settings => draw_settings_view(frame, chunks[1], app),
    }

    draw_footer(frame, chunks[2], app);
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = app.tabs.iter().map(|tab| Line::from(tab.label())).collect();

    let tabs = Tabs::new(titles)
        .select(app.tab)
        .block(Block::default().borders(Borders::ALL).title("GameDeck"))
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn draw_library_view(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let items: Vec<ListItem> = app
        .visible_games()
        .into_iter()
        .map(|game| {
            let prefix = if game.favorite { "★ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::raw(game.title.clone()),
                Span::styled(
                    format!("  [{}]", game.platform.as_str()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = if app.query.is_empty() {
        format!("Games ({})", items.len())
    } else {
        format!("Games ({}) matching \"{}\"", items.len(), app.query)
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], &mut app.games_state);

    draw_game_info(frame, chunks[1], app);
}

fn field<'a>(name: &'a str, value: impl Into<String>) -> Line<'a> {
    Line::from(vec![
        Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value.into()),
    ])
}

fn draw_game_info(frame: &mut Frame, area: Rect, app: &App) {
    let content = match app.selected_game() {
        Some(game) => {
            let mut lines = vec![
                field("Title: ", game.title.as_str()),
                field("Platform: ", game.platform.display_name()),
            ];

            if let Some(app_id) = &game.steam_app_id {
                lines.push(field("Steam app: ", app_id.as_str()));
            }
            if let Some(path) = game.rom_path() {
                lines.push(field("Path: ", path));
            }
            if let Some(emulator_id) = &game.emulator_id {
                let name = app
                    .library
                    .settings()
                    .emulator(emulator_id)
                    .map(|emulator| emulator.name.clone())
                    .unwrap_or_else(|| format!("{} (missing)", emulator_id));
                lines.push(field("Emulator: ", name));
            }

            Text::from(lines)
        }
        None => Text::raw("No game selected"),
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Game Info"))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_settings_view(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let os = app.os();
    let settings = app.library.settings();

    let emulators: Vec<ListItem> = settings
        .emulators
        .iter()
        .map(|(id, emulator)| {
            let marker = if emulator.needs_configuration(os) {
                Span::styled(
                    format!("  needs {} path", os),
                    Style::default().fg(Color::Yellow),
                )
            } else {
                Span::styled("  ok", Style::default().fg(Color::Green))
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<10} {:<20} {:<6}", id, emulator.name, emulator.platform.as_str())),
                marker,
            ]))
        })
        .collect();

    let folders: Vec<ListItem> = settings
        .game_folders
        .iter()
        .map(|folder| {
            ListItem::new(format!(
                "{:<16} {:<6} {}  ({})",
                folder.name,
                folder.platform.as_str(),
                folder.path,
                folder.emulator_id.as_deref().unwrap_or("-")
            ))
        })
        .collect();

    frame.render_widget(
        List::new(emulators).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Emulators ({})", os)),
        ),
        chunks[0],
    );
    frame.render_widget(
        List::new(folders).block(Block::default().borders(Borders::ALL).title("Game Folders")),
        chunks[1],
    );
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.searching {
        "Type to search  [Enter] Done  [Esc] Clear"
    } else {
        match app.view {
            View::Library => {
                "[↑↓] Navigate  [←→] Tabs  [Enter] Launch  [F] Favorite  [/] Search  [R] Rescan  [Tab] Settings  [Q] Quit"
            }
            View::Settings => "[Tab] Back  [Q] Quit",
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, chunks[0]);
    frame.render_widget(status, chunks[1]);
}
