//! Session state for the genome assistant.
//!
//! This module contains all data structures for representing:
//! - Chat messages and the two transcripts (analysis, sidebar Q&A)
//! - Widget state (checklists, k-mer slider, question box)
//! - The LLM request queue
//! - Application state
//!
//! `AppState` is created when the session starts and dropped when it ends;
//! nothing here is persisted.

use std::collections::VecDeque;
use std::path::Path;

use log::{info, warn};

use crate::config::UiConfig;
use crate::error::AnalysisError;
use crate::formats::{load_upload, Upload};
use crate::prompt::{build_analysis_prompt, build_freeform_prompt, AnalysisCategory, VisualizationKind};
use crate::stats::{codon_usage, composition, kmer_frequency, ChartSpec, KMER_SIZE_RANGE};

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn label(self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// An append-only, ordered list of chat messages.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// Identifies one of the two transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    /// Main analysis results
    Analysis,
    /// Sidebar Q&A
    Sidebar,
}

/// A prompt waiting for (or awaiting) an LLM reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmRequest {
    /// Transcript that receives the exchange
    pub target: TranscriptKind,
    /// Text sent to the endpoint
    pub prompt: String,
    /// User message recorded in the transcript
    pub user_content: String,
    /// Shown while the request is in flight
    pub activity: String,
}

/// A multi-select list with a cursor.
#[derive(Debug, Clone)]
pub struct Checklist<T> {
    items: Vec<T>,
    selected: Vec<bool>,
    pub cursor: usize,
}

impl<T: Copy + PartialEq> Checklist<T> {
    pub fn new(items: &[T]) -> Self {
        Self {
            items: items.to_vec(),
            selected: vec![false; items.len()],
            cursor: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    /// Toggles the item under the cursor and returns it.
    pub fn toggle_current(&mut self) -> Option<T> {
        let item = *self.items.get(self.cursor)?;
        self.selected[self.cursor] = !self.selected[self.cursor];
        Some(item)
    }

    pub fn select(&mut self, item: T) {
        if let Some(i) = self.items.iter().position(|&x| x == item) {
            self.selected[i] = true;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Selected items in list order.
    pub fn selected_items(&self) -> Vec<T> {
        self.items
            .iter()
            .zip(&self.selected)
            .filter(|(_, &on)| on)
            .map(|(&item, _)| item)
            .collect()
    }
}

/// Which list receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Visualizations,
    Analyses,
}

impl Focus {
    pub fn toggled(self) -> Self {
        match self {
            Focus::Visualizations => Focus::Analyses,
            Focus::Analyses => Focus::Visualizations,
        }
    }
}

/// Application mode for handling different input states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Widget navigation
    #[default]
    Normal,
    /// Command input mode (after pressing ':')
    Command(String),
    /// Typing into the sidebar question box
    Question,
}

/// Severity of the status line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// A chart slot: the chart itself, or why it could not be drawn.
pub type ChartResult = Result<ChartSpec, AnalysisError>;

/// The complete application state.
#[derive(Debug)]
pub struct AppState {
    /// The loaded genome, if any
    pub upload: Option<Upload>,
    /// Visualization multi-select
    pub visualizations: Checklist<VisualizationKind>,
    /// Analysis multi-select
    pub analyses: Checklist<AnalysisCategory>,
    /// K-mer slider value
    pub kmer_size: usize,
    /// Charts for the selected visualizations, in menu order
    pub charts: Vec<(VisualizationKind, ChartResult)>,
    /// Analysis results transcript
    pub analysis_transcript: Transcript,
    /// Sidebar Q&A transcript
    pub sidebar_transcript: Transcript,
    /// Sidebar question being typed
    pub question: String,
    /// Lines scrolled back from the bottom of the analysis transcript
    pub analysis_scroll: usize,
    /// Lines scrolled back from the bottom of the sidebar transcript
    pub sidebar_scroll: usize,
    /// Focused checklist
    pub focus: Focus,
    /// Current application mode
    pub mode: AppMode,
    /// Requests waiting for the gateway
    pub pending: VecDeque<LlmRequest>,
    /// The request currently awaiting a reply
    pub in_flight: Option<LlmRequest>,
    /// Whether the help overlay is shown
    pub show_help: bool,
    /// Whether the application should quit
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<(StatusLevel, String)>,
    /// Redraw counter, drives the busy spinner
    pub tick: usize,
}

impl AppState {
    /// Creates a new session with nothing loaded.
    pub fn new(config: &UiConfig) -> Self {
        let kmer_size = config
            .kmer_size
            .clamp(*KMER_SIZE_RANGE.start(), *KMER_SIZE_RANGE.end());
        Self {
            upload: None,
            visualizations: Checklist::new(&VisualizationKind::ALL),
            analyses: Checklist::new(&AnalysisCategory::ALL),
            kmer_size,
            charts: Vec::new(),
            analysis_transcript: Transcript::default(),
            sidebar_transcript: Transcript::default(),
            question: String::new(),
            analysis_scroll: 0,
            sidebar_scroll: 0,
            focus: Focus::default(),
            mode: AppMode::Normal,
            pending: VecDeque::new(),
            in_flight: None,
            show_help: false,
            should_quit: false,
            status_message: Some((
                StatusLevel::Info,
                "Open a genome with :open <file>  (:help for keys)".to_string(),
            )),
            tick: 0,
        }
    }

    fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status_message = Some((level, message.into()));
    }

    /// Replaces the loaded genome and redraws the charts.
    pub fn set_upload(&mut self, upload: Upload) {
        self.upload = Some(upload);
        self.set_status(StatusLevel::Info, "Genome sequence uploaded successfully!");
        self.recompute_charts();
    }

    /// Reads a genome file. On failure the previous genome stays loaded.
    pub fn open_file(&mut self, path: &Path) {
        match load_upload(path) {
            Ok(upload) => self.set_upload(upload),
            Err(e) => {
                let err = AnalysisError::from(e);
                warn!("{}", err);
                self.set_status(StatusLevel::Error, err.to_string());
            }
        }
    }

    /// Recomputes the charts of every selected visualization.
    pub fn recompute_charts(&mut self) {
        self.charts.clear();
        let Some(upload) = &self.upload else {
            return;
        };
        let sequence = upload.sequence.as_str();

        for kind in self.visualizations.selected_items() {
            let chart = match kind {
                VisualizationKind::Composition => Ok(composition(sequence).chart()),
                VisualizationKind::KmerFrequency => kmer_frequency(sequence, self.kmer_size)
                    .map(|k| k.chart())
                    .map_err(AnalysisError::from),
                VisualizationKind::CodonUsage => codon_usage(sequence)
                    .map(|c| c.chart())
                    .map_err(AnalysisError::from),
            };
            self.charts.push((kind, chart));
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.toggled();
    }

    pub fn move_up(&mut self) {
        match self.focus {
            Focus::Visualizations => self.visualizations.move_up(),
            Focus::Analyses => self.analyses.move_up(),
        }
    }

    pub fn move_down(&mut self) {
        match self.focus {
            Focus::Visualizations => self.visualizations.move_down(),
            Focus::Analyses => self.analyses.move_down(),
        }
    }

    /// Toggles the item under the cursor of the focused list.
    ///
    /// Only visualization changes redraw the charts.
    pub fn toggle_current(&mut self) {
        match self.focus {
            Focus::Visualizations => {
                if self.visualizations.toggle_current().is_some() {
                    self.recompute_charts();
                }
            }
            Focus::Analyses => {
                self.analyses.toggle_current();
            }
        }
    }

    /// Sets the k-mer size, clamped to the slider range.
    pub fn set_kmer_size(&mut self, k: usize) {
        let k = k.clamp(*KMER_SIZE_RANGE.start(), *KMER_SIZE_RANGE.end());
        if k == self.kmer_size {
            return;
        }
        self.kmer_size = k;
        if self
            .visualizations
            .selected_items()
            .contains(&VisualizationKind::KmerFrequency)
        {
            self.recompute_charts();
        }
    }

    pub fn kmer_increase(&mut self) {
        self.set_kmer_size(self.kmer_size + 1);
    }

    pub fn kmer_decrease(&mut self) {
        self.set_kmer_size(self.kmer_size.saturating_sub(1));
    }

    /// Queues one request per selected analysis, in menu order.
    pub fn run_selected_analyses(&mut self) {
        let categories = self.analyses.selected_items();
        if categories.is_empty() {
            self.set_status(StatusLevel::Warning, "Select at least one analysis type");
            return;
        }
        let Some(upload) = &self.upload else {
            self.set_status(StatusLevel::Warning, "Upload a genome sequence first");
            return;
        };

        let requests: Vec<LlmRequest> = categories
            .into_iter()
            .map(|category| {
                let prompt = build_analysis_prompt(category, &upload.raw);
                LlmRequest {
                    target: TranscriptKind::Analysis,
                    user_content: prompt.clone(),
                    prompt,
                    activity: format!("Performing {}...", category.label()),
                }
            })
            .collect();

        info!("Queued {} analyses", requests.len());
        self.pending.extend(requests);
    }

    /// Queues the sidebar question. Blank questions are ignored.
    pub fn submit_question(&mut self) {
        if self.question.trim().is_empty() {
            return;
        }
        let question = std::mem::take(&mut self.question);
        let prompt = build_freeform_prompt(&question, self.upload.is_some());
        self.pending.push_back(LlmRequest {
            target: TranscriptKind::Sidebar,
            prompt,
            user_content: question,
            activity: "Thinking...".to_string(),
        });
        self.sidebar_scroll = 0;
    }

    fn transcript_mut(&mut self, kind: TranscriptKind) -> &mut Transcript {
        match kind {
            TranscriptKind::Analysis => &mut self.analysis_transcript,
            TranscriptKind::Sidebar => &mut self.sidebar_transcript,
        }
    }

    /// Whether a request is awaiting its reply.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts the next queued request, if none is in flight.
    ///
    /// Records the user message and returns the prompt to send.
    pub fn next_request(&mut self) -> Option<String> {
        if self.in_flight.is_some() {
            return None;
        }
        let request = self.pending.pop_front()?;
        let user = ChatMessage::user(request.user_content.clone());
        self.transcript_mut(request.target).push(user);
        match request.target {
            TranscriptKind::Analysis => self.analysis_scroll = 0,
            TranscriptKind::Sidebar => self.sidebar_scroll = 0,
        }
        let prompt = request.prompt.clone();
        self.in_flight = Some(request);
        Some(prompt)
    }

    /// Records the reply of the in-flight request.
    pub fn complete_request(&mut self, reply: String) {
        let Some(request) = self.in_flight.take() else {
            warn!("Dropping a reply with no request in flight");
            return;
        };
        self.transcript_mut(request.target)
            .push(ChatMessage::assistant(reply));
    }

    /// Scrolls the analysis transcript (or the sidebar in question mode).
    pub fn scroll_up(&mut self, lines: usize) {
        if self.mode == AppMode::Question {
            self.sidebar_scroll = self.sidebar_scroll.saturating_add(lines);
        } else {
            self.analysis_scroll = self.analysis_scroll.saturating_add(lines);
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        if self.mode == AppMode::Question {
            self.sidebar_scroll = self.sidebar_scroll.saturating_sub(lines);
        } else {
            self.analysis_scroll = self.analysis_scroll.saturating_sub(lines);
        }
    }

    /// Enters question mode.
    pub fn enter_question_mode(&mut self) {
        self.mode = AppMode::Question;
    }

    pub fn question_input(&mut self, c: char) {
        self.question.push(c);
    }

    pub fn question_backspace(&mut self) {
        self.question.pop();
    }

    /// Leaves question mode, keeping the draft.
    pub fn leave_question_mode(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Executes the current command.
    pub fn execute_command(&mut self) {
        if let AppMode::Command(cmd) = std::mem::take(&mut self.mode) {
            let cmd = cmd.trim();
            let (name, arg) = match cmd.split_once(char::is_whitespace) {
                Some((name, arg)) => (name, arg.trim()),
                None => (cmd, ""),
            };
            match name {
                "q" | "quit" => self.should_quit = true,
                "h" | "help" => self.show_help = true,
                "o" | "open" if !arg.is_empty() => self.open_file(Path::new(arg)),
                "o" | "open" => self.set_status(StatusLevel::Warning, "Usage: :open <file>"),
                "k" => match arg.parse::<usize>() {
                    Ok(k) if KMER_SIZE_RANGE.contains(&k) => self.set_kmer_size(k),
                    _ => self.set_status(StatusLevel::Warning, "K-mer size must be 2-6"),
                },
                "r" | "run" => self.run_selected_analyses(),
                _ => self.set_status(StatusLevel::Warning, format!("Unknown command: {}", cmd)),
            }
        }
        self.mode = AppMode::Normal;
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Dismisses the help overlay.
    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }
}
