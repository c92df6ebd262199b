use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent};
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::services::RequestService;
use crate::state::{reduce, Action, AppState, View};
use crate::ui::key_mapper::KeyMapper;
use crate::ui::renderer::{draw, RenderContext};

const INPUT_POLL: Duration = Duration::from_millis(100);

/// The interactive application: input, state and the request service.
pub struct TuiApp {
    state: AppState,
    key_mapper: KeyMapper,
    requests: RequestService,
    completions: UnboundedReceiver<Action>,
    context: RenderContext,
    auto_load_history: bool,
}

impl TuiApp {
    pub fn new(
        state: AppState,
        requests: RequestService,
        completions: UnboundedReceiver<Action>,
        context: RenderContext,
    ) -> Self {
        Self {
            state,
            key_mapper: KeyMapper::new(),
            requests,
            completions,
            context,
            auto_load_history: false,
        }
    }

    /// Load both history lists whenever the History view is opened
    pub fn with_auto_load_history(mut self, enabled: bool) -> Self {
        self.auto_load_history = enabled;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        let previous_view = self.state.view;
        let (next, effects) = reduce(std::mem::take(&mut self.state), action);
        self.state = next;
        self.requests.run_all(effects);

        if self.auto_load_history
            && self.state.view == View::History
            && previous_view != View::History
            && self.state.is_logged_in()
        {
            debug!("Auto-loading history");
            self.dispatch(Action::LoadChatHistory);
            self.dispatch(Action::LoadSymptomHistory);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(action) = self.key_mapper.map_key(key, &self.state) {
            self.dispatch(action);
        }
    }

    /// Apply every completion that has arrived since the last frame
    pub fn drain_completions(&mut self) {
        while let Ok(action) = self.completions.try_recv() {
            self.dispatch(action);
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        info!("TUI started on {:?}", self.state.view);
        loop {
            terminal.draw(|f| draw(f, &self.state, &self.context))?;

            if event::poll(INPUT_POLL)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            self.drain_completions();

            if self.state.should_quit {
                break;
            }
        }
        info!("TUI exiting with {} request(s) in flight", self.state.in_flight());
        Ok(())
    }
}

/// Take over the terminal, run the app and restore the terminal.
///
/// Must be called from inside a multi-threaded tokio runtime.
pub fn run_tui_app(mut app: TuiApp) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = tokio::task::block_in_place(|| app.run(&mut terminal));

    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}
