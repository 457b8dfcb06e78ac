//! Keyboard event handling.
//!
//! Each key maps to one explicit action; only the state touched by that
//! action changes.
//!
//! Normal mode:
//! - `Tab` / `Shift-Tab`: switch between the visualization and analysis lists
//! - `j` / `k` (or arrows): move in the focused list
//! - `Space` / `Enter`: toggle the item under the cursor
//! - `h` / `l` (or `←` / `→`, `-` / `+`): move the k-mer slider
//! - `r`: run the selected analyses
//! - `i`: type a sidebar question (`Enter` asks, `Esc` leaves)
//! - `PageUp` / `PageDown`: scroll the analysis transcript
//! - `:`: enter command mode
//!   - `:open <file>`: load a genome
//!   - `:k <2-6>`: set the k-mer size
//!   - `:q` or `:quit`: quit the application
//!   - `:h` or `:help`: show help
//! - `?`: show help

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::model::{AppMode, AppState};

/// Lines moved by one PageUp/PageDown.
const SCROLL_STEP: usize = 10;

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    /// Quit the application
    Quit,
    /// Switch focus between the two lists
    SwitchFocus,
    /// Move the list cursor up
    MoveUp,
    /// Move the list cursor down
    MoveDown,
    /// Toggle the item under the cursor
    Toggle,
    /// Decrease the k-mer size
    KmerDecrease,
    /// Increase the k-mer size
    KmerIncrease,
    /// Queue the selected analyses
    RunAnalyses,
    /// Start typing a sidebar question
    EnterQuestionMode,
    /// Add character to the question
    QuestionChar(char),
    /// Backspace in the question
    QuestionBackspace,
    /// Ask the question
    SubmitQuestion,
    /// Stop typing, keep the draft
    LeaveQuestionMode,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to command buffer
    CommandChar(char),
    /// Execute current command
    ExecuteCommand,
    /// Cancel command mode
    CancelCommand,
    /// Backspace in command mode
    CommandBackspace,
    /// Scroll the transcript back
    ScrollUp,
    /// Scroll the transcript forward
    ScrollDown,
    /// Show the help overlay
    ShowHelp,
    /// Dismiss the help overlay
    DismissHelp,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for terminal events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app mode.
pub fn handle_event(event: Event, mode: &AppMode, show_help: bool) -> Action {
    match event {
        // Windows reports both press and release
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            handle_key_event(key_event, mode, show_help)
        }
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current application mode.
fn handle_key_event(key: KeyEvent, mode: &AppMode, show_help: bool) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Command(_) => handle_command_mode(key),
        AppMode::Question => handle_question_mode(key),
    }
}

/// Handles key events in normal mode.
fn handle_normal_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => Action::SwitchFocus,

        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,

        KeyCode::Char(' ') | KeyCode::Enter => Action::Toggle,

        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('-') => Action::KmerDecrease,
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('+') => Action::KmerIncrease,

        KeyCode::Char('r') => Action::RunAnalyses,
        KeyCode::Char('i') => Action::EnterQuestionMode,

        KeyCode::PageUp => Action::ScrollUp,
        KeyCode::PageDown => Action::ScrollDown,

        KeyCode::Char(':') => Action::EnterCommandMode,
        KeyCode::Char('?') => Action::ShowHelp,

        _ => Action::None,
    }
}

/// Handles key events in command mode.
fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Handles key events while typing a question.
fn handle_question_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::SubmitQuestion,
        KeyCode::Esc => Action::LeaveQuestionMode,
        KeyCode::Backspace => Action::QuestionBackspace,
        KeyCode::PageUp => Action::ScrollUp,
        KeyCode::PageDown => Action::ScrollDown,
        KeyCode::Char(c) => Action::QuestionChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns `true` if the application should continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::SwitchFocus => {
            state.focus_next();
        }
        Action::MoveUp => {
            state.move_up();
        }
        Action::MoveDown => {
            state.move_down();
        }
        Action::Toggle => {
            state.toggle_current();
        }
        Action::KmerDecrease => {
            state.kmer_decrease();
        }
        Action::KmerIncrease => {
            state.kmer_increase();
        }
        Action::RunAnalyses => {
            state.run_selected_analyses();
        }
        Action::EnterQuestionMode => {
            state.enter_question_mode();
        }
        Action::QuestionChar(c) => {
            state.question_input(c);
        }
        Action::QuestionBackspace => {
            state.question_backspace();
        }
        Action::SubmitQuestion => {
            state.submit_question();
        }
        Action::LeaveQuestionMode => {
            state.leave_question_mode();
        }
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::CommandChar(c) => {
            state.command_input(c);
        }
        Action::ExecuteCommand => {
            state.execute_command();
        }
        Action::CancelCommand => {
            state.cancel_command();
        }
        Action::CommandBackspace => {
            state.command_backspace();
        }
        Action::ScrollUp => {
            state.scroll_up(SCROLL_STEP);
        }
        Action::ScrollDown => {
            state.scroll_down(SCROLL_STEP);
        }
        Action::ShowHelp => {
            state.show_help = true;
        }
        Action::DismissHelp => {
            state.dismiss_help();
        }
        Action::Resize(_, _) => {
            // Layout is recomputed on every draw
        }
    }

    !state.should_quit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::model::Focus;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_normal_mode_navigation() {
        let mode = AppMode::Normal;

        assert_eq!(handle_key_event(key(KeyCode::Char('j')), &mode, false), Action::MoveDown);
        assert_eq!(handle_key_event(key(KeyCode::Char('k')), &mode, false), Action::MoveUp);
        assert_eq!(handle_key_event(key(KeyCode::Down), &mode, false), Action::MoveDown);
        assert_eq!(handle_key_event(key(KeyCode::Tab), &mode, false), Action::SwitchFocus);
        assert_eq!(handle_key_event(key(KeyCode::Char(' ')), &mode, false), Action::Toggle);
    }

    #[test]
    fn test_kmer_slider_keys() {
        let mode = AppMode::Normal;
        assert_eq!(handle_key_event(key(KeyCode::Char('h')), &mode, false), Action::KmerDecrease);
        assert_eq!(handle_key_event(key(KeyCode::Right), &mode, false), Action::KmerIncrease);
        assert_eq!(handle_key_event(key(KeyCode::Char('+')), &mode, false), Action::KmerIncrease);
    }

    #[test]
    fn test_enter_command_mode() {
        let mode = AppMode::Normal;
        assert_eq!(
            handle_key_event(key(KeyCode::Char(':')), &mode, false),
            Action::EnterCommandMode
        );
    }

    #[test]
    fn test_command_mode_input() {
        let mode = AppMode::Command(String::new());

        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &mode, false), Action::CommandChar('q'));
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, false), Action::ExecuteCommand);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, false), Action::CancelCommand);
    }

    #[test]
    fn test_question_mode_input() {
        let mode = AppMode::Question;

        // Letters that are shortcuts in normal mode are typed verbatim
        assert_eq!(handle_key_event(key(KeyCode::Char('r')), &mode, false), Action::QuestionChar('r'));
        assert_eq!(handle_key_event(key(KeyCode::Char('j')), &mode, false), Action::QuestionChar('j'));
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, false), Action::SubmitQuestion);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, false), Action::LeaveQuestionMode);
        assert_eq!(handle_key_event(key(KeyCode::Backspace), &mode, false), Action::QuestionBackspace);
    }

    #[test]
    fn test_ctrl_c_quit() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(ctrl_c, &AppMode::Normal, false), Action::Quit);
        assert_eq!(handle_key_event(ctrl_c, &AppMode::Question, false), Action::Quit);
        assert_eq!(handle_key_event(ctrl_c, &AppMode::Normal, true), Action::Quit);
    }

    #[test]
    fn test_dismiss_help() {
        let mode = AppMode::Normal;
        assert_eq!(handle_key_event(key(KeyCode::Char('x')), &mode, true), Action::DismissHelp);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, true), Action::DismissHelp);
    }

    #[test]
    fn test_apply_actions() {
        let mut state = AppState::new(&UiConfig::default());

        assert!(apply_action(&mut state, Action::SwitchFocus));
        assert_eq!(state.focus, Focus::Analyses);
        apply_action(&mut state, Action::MoveDown);
        apply_action(&mut state, Action::Toggle);
        assert_eq!(state.analyses.selected_items().len(), 1);

        apply_action(&mut state, Action::EnterQuestionMode);
        apply_action(&mut state, Action::QuestionChar('h'));
        apply_action(&mut state, Action::QuestionChar('i'));
        apply_action(&mut state, Action::QuestionBackspace);
        assert_eq!(state.question, "h");
        apply_action(&mut state, Action::LeaveQuestionMode);
        assert_eq!(state.mode, AppMode::Normal);
        assert_eq!(state.question, "h");

        assert!(!apply_action(&mut state, Action::Quit));
    }
}
