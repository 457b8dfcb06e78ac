//! TUI rendering module.
//!
//! This module handles all visual rendering using ratatui:
//! - Left column: visualization and analysis checklists, k-mer slider,
//!   sequence preview
//! - Centre: charts above the analysis transcript
//! - Right: sidebar Q&A transcript and question box
//! - Status bar with mode, messages and queue state

pub mod glyphs;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{AppMode, AppState, ChatRole, Checklist, Focus, StatusLevel, Transcript, TranscriptKind};
use crate::prompt::{AnalysisCategory, VisualizationKind};
use crate::stats::{ChartKind, ChartSpec, SequenceSummary, KMER_SIZE_RANGE};
use glyphs::{spinner_frame, Glyphs};

/// Width of the left control column.
const CONTROL_PANEL_WIDTH: u16 = 34;
/// Width of the sidebar.
const SIDEBAR_WIDTH: u16 = 44;
/// Height of the title bar.
const TITLE_BAR_HEIGHT: u16 = 1;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
/// Height of the question box (including borders).
const QUESTION_BOX_HEIGHT: u16 = 5;

/// Color scheme for sequence letters.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState, glyphs: &Glyphs) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_BAR_HEIGHT),
            Constraint::Min(10),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(CONTROL_PANEL_WIDTH),
            Constraint::Min(30),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .split(main_layout[1]);

    render_title_bar(frame, glyphs, main_layout[0]);
    render_controls(frame, state, glyphs, body[0]);
    render_main_area(frame, state, glyphs, body[1]);
    render_sidebar(frame, state, glyphs, body[2]);
    render_status_bar(frame, state, main_layout[2]);

    if state.show_help {
        render_help(frame, area);
    }
}

fn render_title_bar(frame: &mut Frame, glyphs: &Glyphs, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            format!(" {}Viral Genome Analysis Assistant ", glyphs.title_icon),
            Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " Upload a viral genome, chart its composition, and ask a local LLM about it",
            Style::default().fg(Color::Gray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

/// Border style of a panel, highlighted when it has focus.
fn panel_border(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn render_controls(frame: &mut Frame, state: &AppState, glyphs: &Glyphs, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(VisualizationKind::ALL.len() as u16 + 2),
            Constraint::Length(state.analyses.items().len() as u16 + 2),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(area);

    let normal = state.mode == AppMode::Normal;
    render_checklist(
        frame,
        &state.visualizations,
        VisualizationKind::label,
        "Select Visualizations",
        normal && state.focus == Focus::Visualizations,
        glyphs,
        layout[0],
    );
    render_checklist(
        frame,
        &state.analyses,
        AnalysisCategory::label,
        "Select Analysis Types (r: run)",
        normal && state.focus == Focus::Analyses,
        glyphs,
        layout[1],
    );
    render_kmer_slider(frame, state, glyphs, layout[2]);
    render_sequence_panel(frame, state, layout[3]);
}

fn render_checklist<T: Copy + PartialEq>(
    frame: &mut Frame,
    list: &Checklist<T>,
    label: impl Fn(T) -> &'static str,
    title: &str,
    active: bool,
    glyphs: &Glyphs,
    area: Rect,
) {
    let lines: Vec<Line> = list
        .items()
        .iter()
        .enumerate()
        .map(|(i, &item)| {
            let at_cursor = active && i == list.cursor;
            let mark = if list.is_selected(i) { glyphs.checked } else { glyphs.unchecked };
            let pointer = if at_cursor { glyphs.cursor } else { " " };
            let style = if at_cursor {
                Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{} {} {}", pointer, mark, label(item)), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(active))
        .title(title.to_string());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Draws the slider track with the knob at the current k.
fn slider_line(kmer_size: usize, glyphs: &Glyphs) -> String {
    let marks: Vec<&str> = KMER_SIZE_RANGE
        .map(|k| if k == kmer_size { glyphs.slider_knob } else { glyphs.slider_track })
        .collect();
    format!(
        "{} {} {}  k={}",
        KMER_SIZE_RANGE.start(),
        marks.join(glyphs.slider_track.repeat(3).as_str()),
        KMER_SIZE_RANGE.end(),
        kmer_size
    )
}

fn render_kmer_slider(frame: &mut Frame, state: &AppState, glyphs: &Glyphs, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("K-mer Size (h/l)");
    frame.render_widget(
        Paragraph::new(slider_line(state.kmer_size, glyphs)).block(block),
        area,
    );
}

fn render_sequence_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Sequence Preview");

    let lines: Vec<Line> = match &state.upload {
        None => vec![
            Line::from("No genome loaded."),
            Line::from(""),
            Line::from(":open <file.fasta|.txt|.gb>"),
        ],
        Some(upload) => {
            let summary = SequenceSummary::from_sequence(&upload.sequence);
            let mut lines = vec![
                Line::from(Span::styled(
                    upload.file_name(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("Format: {}", upload.format)),
            ];
            if let Some(id) = &upload.record_id {
                lines.push(Line::from(format!("Record: {}", id)));
            }
            lines.push(Line::from(format!("Length: {}", summary.length)));
            lines.push(Line::from(format!("GC: {:.2}%", summary.gc_percent)));
            lines.push(Line::from(""));

            let scheme = DnaColorScheme;
            let preview: Vec<Span> = upload
                .preview()
                .chars()
                .map(|c| Span::styled(c.to_string(), Style::default().fg(scheme.get_color(c))))
                .collect();
            lines.push(Line::from(preview));
            lines
        }
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_main_area(frame: &mut Frame, state: &AppState, glyphs: &Glyphs, area: Rect) {
    if state.charts.is_empty() {
        render_transcript(
            frame,
            state,
            TranscriptKind::Analysis,
            "Analysis Results (PgUp/PgDn)",
            glyphs,
            area,
        );
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_charts(frame, state, glyphs, layout[0]);
    render_transcript(
        frame,
        state,
        TranscriptKind::Analysis,
        "Analysis Results (PgUp/PgDn)",
        glyphs,
        layout[1],
    );
}

fn render_charts(frame: &mut Frame, state: &AppState, glyphs: &Glyphs, area: Rect) {
    let count = state.charts.len() as u32;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for ((kind, chart), slot) in state.charts.iter().zip(slots.iter()) {
        match chart {
            Ok(spec) if spec.bars.is_empty() || spec.total() == 0 => {
                let block = Block::default().borders(Borders::ALL).title(spec.title.clone());
                frame.render_widget(Paragraph::new("Nothing to count.").block(block), *slot);
            }
            Ok(spec) => match spec.kind {
                ChartKind::Proportion => render_proportion_chart(frame, spec, glyphs, *slot),
                ChartKind::Bar => render_bar_chart(frame, spec, *slot),
            },
            Err(e) => {
                let color = if e.is_warning() { Color::Yellow } else { Color::Red };
                let block = Block::default().borders(Borders::ALL).title(kind.label());
                let text = Paragraph::new(Span::styled(e.to_string(), Style::default().fg(color)))
                    .block(block)
                    .wrap(Wrap { trim: true });
                frame.render_widget(text, *slot);
            }
        }
    }
}

/// One line per category: label, filled share, percentage and count.
pub fn proportion_lines(spec: &ChartSpec, bar_width: usize, glyphs: &Glyphs) -> Vec<Line<'static>> {
    let total = spec.total();
    let scheme = DnaColorScheme;

    spec.bars
        .iter()
        .map(|(label, value)| {
            let share = if total == 0 { 0.0 } else { *value as f64 / total as f64 };
            let filled = (share * bar_width as f64).round() as usize;
            let color = label.chars().next().map(|c| scheme.get_color(c)).unwrap_or(Color::Gray);
            Line::from(vec![
                Span::styled(format!("{:>2} ", label), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(glyphs.bar_fill.repeat(filled), Style::default().fg(color)),
                Span::raw(" ".repeat(bar_width.saturating_sub(filled))),
                Span::raw(format!(" {:>5.1}% ({})", share * 100.0, value)),
            ])
        })
        .collect()
}

fn render_proportion_chart(frame: &mut Frame, spec: &ChartSpec, glyphs: &Glyphs, area: Rect) {
    // Border, label and percentage columns
    let bar_width = (area.width as usize).saturating_sub(2 + 3 + 18).max(1);
    let block = Block::default().borders(Borders::ALL).title(spec.title.clone());
    frame.render_widget(
        Paragraph::new(proportion_lines(spec, bar_width, glyphs)).block(block),
        area,
    );
}

fn render_bar_chart(frame: &mut Frame, spec: &ChartSpec, area: Rect) {
    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .text_value(value.to_string())
        })
        .collect();

    let bar_width = spec.max_label_width().max(3) as u16;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ({} vs {})", spec.title, spec.y_label, spec.x_label));

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(BarGroup::default().bars(&bars))
        .max(spec.max_value());
    frame.render_widget(chart, area);
}

/// Renders transcript messages as wrapped lines, plus a pending indicator.
pub fn transcript_lines(
    transcript: &Transcript,
    pending_activity: Option<&str>,
    width: usize,
    glyphs: &Glyphs,
    tick: usize,
) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for message in transcript.messages() {
        let color = match message.role {
            ChatRole::User => Color::Cyan,
            ChatRole::Assistant if message.content.starts_with("Error:") => Color::Red,
            ChatRole::Assistant => Color::Green,
        };
        lines.push(Line::from(Span::styled(
            message.role.label().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for wrapped in textwrap::wrap(&message.content, width) {
            lines.push(Line::from(wrapped.into_owned()));
        }
        lines.push(Line::from(""));
    }

    if let Some(activity) = pending_activity {
        lines.push(Line::from(vec![
            Span::styled(
                ChatRole::Assistant.label().to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {} {}", spinner_frame(glyphs, tick), activity)),
        ]));
    }

    lines
}

/// Top line to show so the view ends `scroll_back` lines above the bottom.
pub fn scroll_offset(total_lines: usize, visible_lines: usize, scroll_back: usize) -> u16 {
    let offset = total_lines
        .saturating_sub(visible_lines)
        .saturating_sub(scroll_back);
    offset.min(u16::MAX as usize) as u16
}

fn render_transcript(
    frame: &mut Frame,
    state: &AppState,
    kind: TranscriptKind,
    title: &str,
    glyphs: &Glyphs,
    area: Rect,
) {
    let (transcript, scroll_back, active) = match kind {
        TranscriptKind::Analysis => (&state.analysis_transcript, state.analysis_scroll, state.mode != AppMode::Question),
        TranscriptKind::Sidebar => (&state.sidebar_transcript, state.sidebar_scroll, state.mode == AppMode::Question),
    };
    let pending = state
        .in_flight
        .as_ref()
        .filter(|r| r.target == kind)
        .map(|r| r.activity.as_str());

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let mut lines = transcript_lines(transcript, pending, inner_width, glyphs, state.tick);

    if lines.is_empty() && kind == TranscriptKind::Sidebar {
        lines = sidebar_intro(inner_width);
    }

    let offset = scroll_offset(lines.len(), inner_height, scroll_back);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(active && scroll_back > 0))
        .title(title.to_string());
    frame.render_widget(Paragraph::new(lines).block(block).scroll((offset, 0)), area);
}

fn sidebar_intro(width: usize) -> Vec<Line<'static>> {
    let text = "Need help? Ask anything about the analysis results, viral genomics, \
                how to use this tool, or computational biology.\n\n\
                Supported files: FASTA (.fasta), plain text (.txt), GenBank (.gb).";
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|l| Line::from(Span::styled(l.into_owned(), Style::default().fg(Color::Gray))))
        .collect()
}

fn render_sidebar(frame: &mut Frame, state: &AppState, glyphs: &Glyphs, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(QUESTION_BOX_HEIGHT)])
        .split(area);

    render_transcript(
        frame,
        state,
        TranscriptKind::Sidebar,
        "Ask a Question",
        glyphs,
        layout[0],
    );

    let typing = state.mode == AppMode::Question;
    let mut text = state.question.clone();
    if typing {
        text.push_str(glyphs.cursor);
    }
    let title = if typing {
        "Your question (Enter: ask, Esc: leave)"
    } else {
        "Your question (i: type)"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(typing))
        .title(title);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        layout[1],
    );
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
        AppMode::Question => ("QUESTION", String::new()),
    };

    let (level, message) = match &state.status_message {
        Some((level, message)) => (*level, message.as_str()),
        None => (StatusLevel::Info, ""),
    };
    let bg = match level {
        StatusLevel::Info => Color::Cyan,
        StatusLevel::Warning => Color::Yellow,
        StatusLevel::Error => Color::Red,
    };

    let queue_info = match (&state.in_flight, state.pending.len()) {
        (None, 0) => format!("k={} | idle ", state.kmer_size),
        (_, queued) => format!(
            "k={} | waiting for model, {} queued ",
            state.kmer_size, queued
        ),
    };

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };

    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Black).bg(bg)),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + queue_info.len())),
            Style::default().bg(bg),
        ),
        Span::styled(
            queue_info,
            Style::default().fg(Color::Black).bg(bg).add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

/// Centered rectangle of at most `width` x `height`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = [
        "Tab            switch between lists",
        "j/k, arrows    move in list",
        "Space, Enter   toggle item",
        "h/l, -/+       k-mer size",
        "r              run selected analyses",
        "i              type a question (Enter asks)",
        "PgUp/PgDn      scroll transcript",
        ":open <file>   load a genome (.fasta .txt .gb)",
        ":k <2-6>       set k-mer size",
        ":q             quit (Ctrl+C also quits)",
        "",
        "Press any key to close",
    ];
    let lines: Vec<Line> = help.iter().map(|l| Line::from(*l)).collect();
    let rect = centered_rect(54, help.len() as u16 + 2, area);

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help")),
        rect,
    );
}
