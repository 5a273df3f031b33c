//! Berth TUI (Terminal User Interface)
//!
//! Renders the registry snapshot in tabs and maps keys onto registry
//! operations. The app holds nothing but selection state; every table is
//! read from the registry on each frame.

use crate::container::{ContainerStatus, RunOptions};
use crate::error::Result;
use crate::ids::ResourceId;
use crate::image::catalog;
use crate::registry::Registry;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
};
use std::io;

const TABS: [&str; 6] = [
    "Containers",
    "Images",
    "Networks",
    "Volumes",
    "Scenarios",
    "History",
];

const CONTAINERS: usize = 0;
const IMAGES: usize = 1;
const NETWORKS: usize = 2;
const VOLUMES: usize = 3;
const SCENARIOS: usize = 4;
const HISTORY: usize = 5;

/// TUI application state
pub struct App {
    registry: Registry,
    /// Current tab index
    current_tab: usize,
    /// Selection per tab
    table_states: [TableState; TABS.len()],
    should_quit: bool,
    show_help: bool,
    /// Result of the last action
    status_message: Option<String>,
}

impl App {
    /// Create a new TUI application over a registry
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            current_tab: CONTAINERS,
            table_states: Default::default(),
            should_quit: false,
            show_help: false,
            status_message: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

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

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Handle key press
    pub fn handle_key(&mut self, key: KeyCode) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
            KeyCode::Tab | KeyCode::Right => {
                self.current_tab = (self.current_tab + 1) % TABS.len();
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.current_tab = (self.current_tab + TABS.len() - 1) % TABS.len();
            }
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => self.handle_enter(),
            KeyCode::Char('s') => self.handle_start(),
            KeyCode::Char('S') => self.handle_stop(),
            KeyCode::Char('d') | KeyCode::Delete => self.handle_delete(),
            KeyCode::Char('p') => self.handle_pull(),
            KeyCode::Char('r') => self.handle_run(),
            KeyCode::Char('R') => {
                self.registry.reset_all();
                self.status_message = Some("Reset to default networks".to_string());
            }
            KeyCode::Char('c') if self.current_tab == HISTORY => {
                self.registry.clear_history();
                self.status_message = Some("History cleared".to_string());
            }
            _ => {}
        }

        self.clamp_selection();
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn tab_len(&self, tab: usize) -> usize {
        let graph = self.registry.graph();
        match tab {
            CONTAINERS => graph.containers().len(),
            IMAGES => graph.images().len(),
            NETWORKS => graph.networks().len(),
            VOLUMES => graph.volumes().len(),
            SCENARIOS => self.registry.scenarios().len(),
            HISTORY => self.registry.command_log().len(),
            _ => 0,
        }
    }

    fn selected(&self) -> Option<usize> {
        self.table_states[self.current_tab].selected()
    }

    fn select_previous(&mut self) {
        let state = &mut self.table_states[self.current_tab];
        let i = state.selected().map_or(0, |i| i.saturating_sub(1));
        state.select(Some(i));
    }

    fn select_next(&mut self) {
        let len = self.tab_len(self.current_tab);
        if len == 0 {
            return;
        }

        let state = &mut self.table_states[self.current_tab];
        let i = state.selected().map_or(0, |i| (i + 1).min(len - 1));
        state.select(Some(i));
    }

    /// Keep selections inside tables that shrank
    fn clamp_selection(&mut self) {
        for tab in 0..TABS.len() {
            let len = self.tab_len(tab);
            let state = &mut self.table_states[tab];
            match state.selected() {
                Some(_) if len == 0 => state.select(None),
                Some(i) if i >= len => state.select(Some(len - 1)),
                _ => {}
            }
        }
    }

    /// Id of the selected row on the current resource tab
    fn selected_id(&self) -> Option<ResourceId> {
        let i = self.selected()?;
        let graph = self.registry.graph();
        match self.current_tab {
            CONTAINERS => graph.containers().iter().nth(i).map(|c| c.id.clone()),
            IMAGES => graph.images().iter().nth(i).map(|c| c.id.clone()),
            NETWORKS => graph.networks().iter().nth(i).map(|c| c.id.clone()),
            VOLUMES => graph.volumes().iter().nth(i).map(|c| c.id.clone()),
            _ => None,
        }
    }

    fn report<T>(&mut self, result: Result<T>, success: impl FnOnce(T) -> String) {
        self.status_message = Some(match result {
            Ok(value) => success(value),
            Err(e) => format!("Error: {}", e),
        });
    }

    fn handle_enter(&mut self) {
        match self.current_tab {
            CONTAINERS => {
                if let Some(id) = self.selected_id() {
                    let result = self.registry.toggle_container(&id);
                    self.report(result, |c| format!("Container {} is now {}", c.name, c.status));
                }
            }
            SCENARIOS => {
                let Some(id) = self
                    .selected()
                    .and_then(|i| self.registry.scenarios().iter().nth(i))
                    .map(|s| s.id.clone())
                else {
                    return;
                };
                let result = self.registry.load_scenario(&id);
                self.report(result, |snapshot| {
                    format!("Loaded scenario {} ({})", id, snapshot.stats())
                });
            }
            _ => {}
        }
    }

    fn handle_start(&mut self) {
        if self.current_tab != CONTAINERS {
            return;
        }
        if let Some(id) = self.selected_id() {
            let result = self.registry.start_container(&id);
            self.report(result, |c| format!("Started container {}", c.name));
        }
    }

    fn handle_stop(&mut self) {
        if self.current_tab != CONTAINERS {
            return;
        }
        if let Some(id) = self.selected_id() {
            let result = self.registry.stop_container(&id);
            self.report(result, |c| format!("Stopped container {}", c.name));
        }
    }

    fn handle_delete(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };

        let result = match self.current_tab {
            CONTAINERS => self.registry.remove_container(&id),
            IMAGES => self.registry.remove_image(&id),
            NETWORKS => self.registry.remove_network(&id),
            VOLUMES => self.registry.remove_volume(&id),
            _ => return,
        };
        let kind = TABS[self.current_tab].to_lowercase();
        self.report(result, |_| format!("Removed {}", kind.trim_end_matches('s')));
    }

    /// Pull the first catalog image not yet present
    fn handle_pull(&mut self) {
        let Some(next) = catalog::available(self.registry.graph().images()).first().copied() else {
            self.status_message = Some("Every catalog image is already pulled".to_string());
            return;
        };
        let result = self.registry.add_image(next.name, next.tag);
        self.report(result, |image| format!("Pulled {}", image.reference()));
    }

    /// Run a container from the selected image with its default options
    fn handle_run(&mut self) {
        if self.current_tab != IMAGES {
            return;
        }
        let Some(image) = self.selected_id().and_then(|id| self.registry.image(&id)) else {
            return;
        };

        let reference = image.reference();
        let options = RunOptions::for_image(&image.name);
        let result = self.registry.create_container(&reference, options);
        self.report(result, |c| format!("Started container {}", c.name));
    }

    /// Render UI
    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Tabs
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_tabs(f, chunks[1]);

        match self.current_tab {
            CONTAINERS => self.render_containers(f, chunks[2]),
            IMAGES => self.render_images(f, chunks[2]),
            NETWORKS => self.render_networks(f, chunks[2]),
            VOLUMES => self.render_volumes(f, chunks[2]),
            SCENARIOS => self.render_scenarios(f, chunks[2]),
            HISTORY => self.render_history(f, chunks[2]),
            _ => {}
        }

        self.render_status_bar(f, chunks[3]);

        if self.show_help {
            self.render_help(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let scenario = self
            .registry
            .active_scenario()
            .map(|id| format!(" | scenario: {}", id))
            .unwrap_or_default();

        let title = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                "Berth",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" - container engine playground"),
            Span::styled(scenario, Style::default().fg(Color::Magenta)),
        ])])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );
        f.render_widget(title, area);
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Navigation"))
            .select(self.current_tab)
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn render_table(
        &mut self,
        f: &mut Frame,
        area: Rect,
        tab: usize,
        header: Vec<&'static str>,
        rows: Vec<Row<'static>>,
        widths: Vec<Constraint>,
    ) {
        let header = Row::new(header)
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .bottom_margin(1);

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(TABS[tab]))
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▶ ");

        f.render_stateful_widget(table, area, &mut self.table_states[tab]);
    }

    fn render_containers(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .registry
            .graph()
            .containers()
            .iter()
            .map(|c| {
                let status_color = match c.status {
                    ContainerStatus::Running => Color::Green,
                    ContainerStatus::Stopped => Color::Red,
                };
                Row::new(vec![
                    Cell::from(c.id.to_string()),
                    Cell::from(c.name.clone()),
                    Cell::from(c.image.clone()),
                    Cell::from(c.status.to_string()).style(Style::default().fg(status_color)),
                    Cell::from(c.ports.clone().unwrap_or_default()),
                    Cell::from(c.network.clone()),
                    Cell::from(c.volumes.join(", ")),
                ])
            })
            .collect();

        self.render_table(
            f,
            area,
            CONTAINERS,
            vec!["ID", "Name", "Image", "Status", "Ports", "Network", "Volumes"],
            rows,
            vec![
                Constraint::Length(14),
                Constraint::Percentage(15),
                Constraint::Percentage(20),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Percentage(15),
                Constraint::Min(10),
            ],
        );
    }

    fn render_images(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .registry
            .graph()
            .images()
            .iter()
            .map(|i| {
                Row::new(vec![
                    i.id.to_string(),
                    i.name.clone(),
                    i.tag.clone(),
                    i.size.clone(),
                    i.layers.to_string(),
                ])
            })
            .collect();

        self.render_table(
            f,
            area,
            IMAGES,
            vec!["ID", "Repository", "Tag", "Size", "Layers"],
            rows,
            vec![
                Constraint::Length(14),
                Constraint::Percentage(30),
                Constraint::Percentage(20),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        );
    }

    fn render_networks(&mut self, f: &mut Frame, area: Rect) {
        let graph = self.registry.graph();
        let rows: Vec<Row> = graph
            .networks()
            .iter()
            .map(|n| {
                Row::new(vec![
                    n.id.to_string(),
                    n.name.clone(),
                    n.driver.to_string(),
                    if n.is_default { "default" } else { "user" }.to_string(),
                    graph.member_names(&n.name).join(", "),
                ])
            })
            .collect();

        self.render_table(
            f,
            area,
            NETWORKS,
            vec!["ID", "Name", "Driver", "Scope", "Containers"],
            rows,
            vec![
                Constraint::Length(14),
                Constraint::Percentage(20),
                Constraint::Length(9),
                Constraint::Length(8),
                Constraint::Min(10),
            ],
        );
    }

    fn render_volumes(&mut self, f: &mut Frame, area: Rect) {
        let graph = self.registry.graph();
        let rows: Vec<Row> = graph
            .volumes()
            .iter()
            .map(|v| {
                Row::new(vec![
                    v.id.to_string(),
                    v.name.clone(),
                    v.driver.to_string(),
                    v.size.clone(),
                    graph
                        .containers()
                        .names_where(|c| c.uses_volume(&v.name))
                        .join(", "),
                ])
            })
            .collect();

        self.render_table(
            f,
            area,
            VOLUMES,
            vec!["ID", "Name", "Driver", "Size", "Used by"],
            rows,
            vec![
                Constraint::Length(14),
                Constraint::Percentage(25),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Min(10),
            ],
        );
    }

    fn render_scenarios(&mut self, f: &mut Frame, area: Rect) {
        let active = self.registry.active_scenario().map(str::to_string);
        let rows: Vec<Row> = self
            .registry
            .scenarios()
            .iter()
            .map(|s| {
                let marker = if active.as_deref() == Some(s.id.as_str()) { "●" } else { "" };
                Row::new(vec![
                    marker.to_string(),
                    s.name.clone(),
                    s.difficulty.to_string(),
                    s.description.clone(),
                ])
            })
            .collect();

        self.render_table(
            f,
            area,
            SCENARIOS,
            vec!["", "Scenario", "Level", "Description"],
            rows,
            vec![
                Constraint::Length(2),
                Constraint::Percentage(20),
                Constraint::Length(13),
                Constraint::Min(10),
            ],
        );
    }

    fn render_history(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .registry
            .command_log()
            .entries()
            .map(|e| {
                Row::new(vec![
                    e.sequence.to_string(),
                    e.timestamp.format("%H:%M:%S").to_string(),
                    e.command.clone(),
                ])
            })
            .collect();

        self.render_table(
            f,
            area,
            HISTORY,
            vec!["#", "Time", "Command"],
            rows,
            vec![
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Min(20),
            ],
        );
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status = match &self.status_message {
            Some(msg) => msg.clone(),
            None => format!("{} | Tab: Switch | ?: Help | q: Quit", self.registry.stats()),
        };

        let style = if status.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let status_bar = Paragraph::new(status)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .style(style);

        f.render_widget(status_bar, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let area = centered_rect(60, 70, f.area());

        f.render_widget(Clear, area);

        let keys = [
            ("Tab / ← →", "Switch tabs"),
            ("↑ ↓ / j k", "Navigate list"),
            ("Enter", "Toggle container / load scenario"),
            ("s / S", "Start / stop container"),
            ("d / Del", "Remove selected resource"),
            ("p", "Pull next catalog image"),
            ("r", "Run selected image"),
            ("R", "Reset everything"),
            ("c", "Clear history (History tab)"),
            ("? / F1", "Show this help"),
            ("q", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "Keyboard Shortcuts",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        help_text.extend(keys.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{:<11}", key), Style::default().fg(Color::Cyan)),
                Span::raw(*action),
            ])
        }));
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::Gray),
        )));

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help")
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .alignment(Alignment::Left);

        f.render_widget(help, area);
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(Registry::with_generator(SequentialIds::new()))
    }

    #[test]
    fn test_load_scenario_from_tab() {
        let mut app = app();
        app.handle_key(KeyCode::BackTab);
        app.handle_key(KeyCode::BackTab);
        assert_eq!(app.current_tab, SCENARIOS);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.registry().active_scenario(), Some("web-db"));
        assert!(app.status_message().unwrap().starts_with("Loaded scenario web-db"));
    }

    #[test]
    fn test_delete_running_container_reports_error() {
        let mut app = app();
        app.registry.load_scenario("hello-world").unwrap();

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('d'));
        assert!(app.status_message().unwrap().starts_with("Error"));

        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.status_message(), Some("Removed container"));
        assert!(app.registry().graph().containers().is_empty());
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn test_pull_and_run_from_images_tab() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.status_message(), Some("Pulled nginx:latest"));

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('r'));
        let web = app.registry().find_container("nginx-0001").unwrap();
        assert_eq!(web.ports.as_deref(), Some("8080:80"));
    }

    #[test]
    fn test_render_every_tab() {
        let mut app = app();
        app.registry.load_scenario("microservices").unwrap();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        for _ in 0..TABS.len() {
            terminal.draw(|f| app.ui(f)).unwrap();
            app.handle_key(KeyCode::Tab);
        }
        app.handle_key(KeyCode::Char('?'));
        terminal.draw(|f| app.ui(f)).unwrap();
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.should_quit());
    }
}
