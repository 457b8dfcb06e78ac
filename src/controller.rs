//! Application controller.
//!
//! This module orchestrates the main application loop:
//! - Terminal initialization and cleanup
//! - Event polling and handling
//! - Dispatching queued prompts to the gateway worker
//! - Rendering

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::event::{apply_action, handle_event, poll_event};
use crate::gateway::TextGenerator;
use crate::model::AppState;
use crate::ui::glyphs::Glyphs;
use crate::ui::render;
use crate::worker::GatewayWorker;

/// Reply recorded when the worker thread has gone away.
const WORKER_STOPPED: &str = "Error: gateway worker stopped";

/// The main application controller.
pub struct App {
    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state
    state: AppState,
    /// Background LLM caller
    worker: GatewayWorker,
    /// Event poll timeout
    tick_rate: Duration,
    /// Symbol set for the terminal
    glyphs: Glyphs,
}

impl App {
    /// Creates a new application with the given state.
    pub fn new(
        state: AppState,
        generator: Box<dyn TextGenerator + Send>,
        glyphs: Glyphs,
    ) -> Result<Self> {
        let worker = GatewayWorker::spawn(generator).context("Failed to start gateway worker")?;

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state,
            worker,
            tick_rate: Duration::from_millis(50),
            glyphs,
        })
    }

    /// Runs the main application loop.
    pub fn run(&mut self) -> Result<()> {
        info!("Session started");

        loop {
            pump_requests(&mut self.state, &self.worker);

            self.terminal.draw(|frame| {
                render(frame, &self.state, &self.glyphs);
            })?;
            self.state.tick = self.state.tick.wrapping_add(1);

            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(event, &self.state.mode, self.state.show_help);
                if !apply_action(&mut self.state, action) {
                    break;
                }
            }
        }

        info!("Session ended");
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Moves replies into the transcripts and starts the next queued prompt.
///
/// At most one prompt is with the worker at any time.
pub fn pump_requests(state: &mut AppState, worker: &GatewayWorker) {
    while let Some(reply) = worker.try_recv() {
        state.complete_request(reply);
    }

    while let Some(prompt) = state.next_request() {
        debug!("Dispatching prompt ({} chars)", prompt.len());
        if worker.submit(prompt) {
            break;
        }
        state.complete_request(WORKER_STOPPED.to_string());
    }
}

/// Runs the interactive session until the user quits.
pub fn run_app(
    state: AppState,
    generator: Box<dyn TextGenerator + Send>,
    glyphs: Glyphs,
) -> Result<()> {
    let mut app = App::new(state, generator, glyphs)?;
    app.run()
}
