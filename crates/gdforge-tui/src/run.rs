//! Terminal lifecycle and the main run loop

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use gdforge_providers::GenerationClient;
use gdforge_session::EditorSession;

use crate::app::App;
use crate::event::EventLoop;
use crate::view;

/// Takes over the terminal and runs the editor until the user quits.
///
/// The terminal is restored before returning, success or failure, so a
/// run-loop error still lands on a usable shell.
pub async fn run(session: EditorSession, client: Arc<dyn GenerationClient>) -> Result<()> {
    let mut events = EventLoop::new();
    let mut app = App::new(session, client, events.sender());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventLoop,
) -> Result<()> {
    loop {
        terminal.draw(|frame| view::draw(frame, app))?;

        let Some(event) = events.next().await else {
            // every sender is gone; nothing can ever wake us again
            return Ok(());
        };
        app.handle(event);

        if app.should_quit() {
            info!("Editor closed");
            return Ok(());
        }
    }
}
