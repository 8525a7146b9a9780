//! Terminal UI state and event loop

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gamedeck_config::OsKey;
use gamedeck_emulator::{GameLauncher, resolve_launch};
use gamedeck_library::{Collection, Game, Library};
use ratatui::{Terminal, backend::CrosstermBackend, widgets::ListState};
use std::io;
use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::ui;

/// Current view/screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Library,
    Settings,
}

/// Application state
pub struct App {
    /// Persisted library
    pub library: Library,

    /// Process launcher for this OS
    launcher: GameLauncher,

    /// Current view
    pub view: View,

    /// Filter tabs, in display order
    pub tabs: Vec<Collection>,

    /// Selected tab
    pub tab: usize,

    /// Title filter
    pub query: String,

    /// Typing into the search box
    pub searching: bool,

    /// Ids of the games currently shown
    pub visible: Vec<String>,

    /// Games list state
    pub games_state: ListState,

    /// Status message
    pub status: String,

    /// Should quit
    pub should_quit: bool,
}

impl App {
    pub fn new(library: Library) -> Self {
        let mut app = Self {
            library,
            launcher: GameLauncher::new(),
            view: View::Library,
            tabs: Collection::tabs(),
            tab: 0,
            query: String::new(),
            searching: false,
            visible: Vec::new(),
            games_state: ListState::default(),
            status: "Ready".to_string(),
            should_quit: false,
        };
        app.refresh();
        app
    }

    pub fn os(&self) -> OsKey {
        self.launcher.os()
    }

    pub fn collection(&self) -> Collection {
        self.tabs[self.tab]
    }

    /// Recompute the visible games, keeping the selection in range
    pub fn refresh(&mut self) {
        self.visible = self
            .library
            .filter_games(self.collection(), &self.query)
            .into_iter()
            .map(|game| game.id.clone())
            .collect();

        let selected = match self.games_state.selected() {
            _ if self.visible.is_empty() => None,
            Some(i) => Some(i.min(self.visible.len() - 1)),
            None => Some(0),
        };
        self.games_state.select(selected);
    }

    /// Games currently shown, in list order
    pub fn visible_games(&self) -> Vec<&Game> {
        self.visible
            .iter()
            .filter_map(|id| self.library.game(id))
            .collect()
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.games_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|id| self.library.game(id))
    }

    /// Handle input
    pub async fn handle_input(&mut self, key: KeyCode) -> Result<()> {
        if self.searching {
            self.handle_search_input(key);
            return Ok(());
        }

        match self.view {
            View::Library => self.handle_library_input(key).await?,
            View::Settings => self.handle_settings_input(key),
        }
        Ok(())
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.searching = false;
                self.query.clear();
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => {
                self.query.pop();
            }
            KeyCode::Char(c) => self.query.push(c),
            _ => return,
        }
        self.refresh();
    }

    async fn handle_library_input(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.select_prev_game(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next_game(),
            KeyCode::Left | KeyCode::Char('h') => self.prev_tab(),
            KeyCode::Right | KeyCode::Char('l') => self.next_tab(),
            KeyCode::Enter => self.launch_selected_game(),
            KeyCode::Char('f') => self.toggle_favorite()?,
            KeyCode::Char('r') => self.rescan().await?,
            KeyCode::Char('/') => {
                self.searching = true;
                self.status = "Searching".to_string();
            }
            KeyCode::Tab => self.view = View::Settings,
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_settings_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('b') => self.view = View::Library,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    pub fn next_tab(&mut self) {
        self.tab = (self.tab + 1) % self.tabs.len();
        self.games_state.select(None);
        self.refresh();
    }

    pub fn prev_tab(&mut self) {
        self.tab = if self.tab == 0 {
            self.tabs.len() - 1
        } else {
            self.tab - 1
        };
        self.games_state.select(None);
        self.refresh();
    }

    /// Select previous game
    fn select_prev_game(&mut self) {
        if self.visible.is_empty() {
            return;
        }

        let i = match self.games_state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.games_state.select(Some(i));
    }

    /// Select next game
    fn select_next_game(&mut self) {
        if self.visible.is_empty() {
            return;
        }

        let i = match self.games_state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.games_state.select(Some(i));
    }

    /// Toggle favorite for selected game
    pub fn toggle_favorite(&mut self) -> Result<()> {
        let Some(id) = self.selected_game().map(|game| game.id.clone()) else {
            return Ok(());
        };

        let favorite = self.library.toggle_favorite(&id)?;
        self.status = if favorite {
            "Added to favorites".to_string()
        } else {
            "Removed from favorites".to_string()
        };
        self.refresh();
        Ok(())
    }

    /// Launch selected game. Failures end up in the status line.
    fn launch_selected_game(&mut self) {
        let Some(game) = self.selected_game() else {
            return;
        };

        let title = game.title.clone();
        let result = resolve_launch(game, self.library.settings(), self.launcher.os())
            .and_then(|target| self.launcher.launch(&target));

        self.status = match result {
            Ok(result) => {
                info!("Launched {} with PID {}", title, result.pid);
                reap(result.child, title.clone());
                format!("Launched {}", title)
            }
            Err(e) => {
                error!("Failed to launch {}: {}", title, e);
                format!("Error: {}", e)
            }
        };
    }

    /// Re-scan every folder
    pub async fn rescan(&mut self) -> Result<()> {
        let report = self.library.rescan().await?;

        let errors = report.errors();
        self.status = if errors.is_empty() {
            format!("Found {} games", report.games_found())
        } else {
            format!(
                "Found {} games, {} problems (see log)",
                report.games_found(),
                errors.len()
            )
        };
        self.refresh();
        Ok(())
    }
}

/// Wait for a launched game off the UI thread so it does not linger as a
/// zombie once it exits
fn reap(mut child: Child, title: String) -> JoinHandle<io::Result<ExitStatus>> {
    tokio::task::spawn_blocking(move || {
        let status = child.wait()?;
        debug!("{} exited with {}", title, status);
        Ok(status)
    })
}

/// Run the TUI until the user quits
pub async fn run(library: Library) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(library);
    let result = event_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw_ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_input(key.code).await?;
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
