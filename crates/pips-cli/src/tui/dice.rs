//! Interactive dice view: die face, roll action, statistics, and history.
//!
//! The view owns the [`RollController`] and drives its timer from the event
//! loop: every tick calls [`DiceView::tick`], which completes an in-flight
//! roll once its deadline has passed. A subscription on the controller marks
//! the view dirty after each mutation so the loop only redraws when needed.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pips_core::model::face::render_grid;
use pips_core::roller::{FaceSource, RandomFaces};
use pips_core::{RollController, RollEvent, RollRecord, StatsSnapshot, Tier};
use rand::rngs::StdRng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::debug;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
const SPINNER_FRAME: Duration = Duration::from_millis(100);
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Actions the event loop must handle outside the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceAction {
    Quit,
}

pub struct DiceView<S = RandomFaces<StdRng>> {
    controller: RollController<S>,
    dirty: Rc<Cell<bool>>,
    history_state: ListState,
    status_msg: Option<(String, Instant)>,
    opened_at: Instant,
}

impl<S: FaceSource> DiceView<S> {
    pub fn new(mut controller: RollController<S>) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        controller.subscribe(move |event, view| {
            if let RollEvent::Completed(record) = event {
                debug!(value = record.value.get(), history = view.history.len(), "redraw after roll");
            }
            flag.set(true);
        });
        Self {
            controller,
            dirty,
            history_state: ListState::default(),
            status_msg: None,
            opened_at: Instant::now(),
        }
    }

    pub const fn controller(&self) -> &RollController<S> {
        &self.controller
    }

    /// Whether the screen needs a redraw.
    ///
    /// Always true while rolling so the spinner animates.
    pub fn needs_redraw(&self) -> bool {
        self.dirty.get() || self.controller.is_rolling() || self.status_msg.is_some()
    }

    pub fn mark_drawn(&self) {
        self.dirty.set(false);
    }

    /// Force a redraw on the next loop iteration.
    pub fn invalidate(&self) {
        self.dirty.set(true);
    }

    /// Advance the roll timer.
    pub fn tick(&mut self, now: Instant) -> Option<RollRecord> {
        let expired = self
            .status_msg
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= STATUS_TTL);
        if expired {
            self.status_msg = None;
            self.dirty.set(true);
        }

        let record = self.controller.poll(now)?;
        self.history_state.select(None);
        Some(record)
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<DiceAction> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(DiceAction::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(DiceAction::Quit)
            }
            KeyCode::Char(' ' | 'r') | KeyCode::Enter => {
                self.controller.request_roll(now);
                None
            }
            KeyCode::Char('c') => {
                if !self.controller.history().is_empty() {
                    self.controller.clear_history();
                    self.history_state.select(None);
                    self.set_status("History cleared", now);
                }
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            _ => None,
        }
    }

    fn select_next(&mut self) {
        let len = self.controller.history().len();
        if len == 0 {
            return;
        }
        let i = self
            .history_state
            .selected()
            .map_or(0, |i| (i + 1).min(len - 1));
        self.history_state.select(Some(i));
        self.dirty.set(true);
    }

    fn select_prev(&mut self) {
        if self.controller.history().is_empty() {
            return;
        }
        let i = self
            .history_state
            .selected()
            .map_or(0, |i| i.saturating_sub(1));
        self.history_state.select(Some(i));
        self.dirty.set(true);
    }

    fn set_status(&mut self, msg: &str, now: Instant) {
        self.status_msg = Some((msg.to_string(), now));
        self.dirty.set(true);
    }

    fn spinner(&self) -> &'static str {
        let frame = self.opened_at.elapsed().as_millis() / SPINNER_FRAME.as_millis();
        SPINNER[usize::try_from(frame % SPINNER.len() as u128).unwrap_or(0)]
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(9),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(rows[0], buf);
        self.render_die(rows[1], buf);

        let stats = self.controller.stats();
        if let Some(stats) = stats {
            let panels = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(rows[2]);
            render_stats(&stats, panels[0], buf);
            self.render_history(panels[1], buf);
        } else {
            self.render_history(rows[2], buf);
        }

        self.render_keys(rows[3], buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let text = vec![
            Line::from(Span::styled(
                "🎲 Dice Roll Simulator",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Roll the dice and track your gaming history",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_die(&self, area: Rect, buf: &mut Buffer) {
        let rolling = self.controller.is_rolling();
        let current = self.controller.current();
        let border = if rolling {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let mut lines: Vec<Line> = Vec::with_capacity(8);
        lines.push(Line::from(Span::styled("┌───────┐", border)));
        for row in render_grid(current.get()) {
            lines.push(Line::from(vec![
                Span::styled("│ ", border),
                Span::styled(row, Style::default().fg(tier_color(current.tier()))),
                Span::styled(" │", border),
            ]));
        }
        lines.push(Line::from(Span::styled("└───────┘", border)));
        lines.push(Line::from(vec![
            Span::raw("You rolled: "),
            Span::styled(
                current.to_string(),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
        ]));

        let button = if rolling {
            Span::styled(
                format!("{} Rolling...", self.spinner()),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::styled(
                "[ Roll Dice ]",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        };
        lines.push(Line::from(button));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(area, buf);
    }

    fn render_history(&mut self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" 📝 Roll History ");
        let history = self.controller.history();

        if history.is_empty() {
            Paragraph::new("No rolls yet. Roll the dice to start!")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block)
                .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = history
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let ordinal = history.ordinal(index).unwrap_or_default();
                let color = tier_color(record.value.tier());
                ListItem::new(Line::from(vec![
                    Span::styled(format!("[{}]", record.value), Style::default().fg(color)),
                    Span::raw(format!("  Roll #{ordinal:<4}")),
                    Span::styled(record.time_of_day(), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray));
        StatefulWidget::render(list, area, buf, &mut self.history_state);
    }

    fn render_keys(&self, area: Rect, buf: &mut Buffer) {
        let key = Style::default().fg(Color::Yellow);
        let mut spans = Vec::new();
        if self.controller.is_rolling() {
            spans.push(Span::styled("space", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(" rolling  ", Style::default().fg(Color::DarkGray)));
        } else {
            spans.push(Span::styled("space", key));
            spans.push(Span::raw(" roll  "));
        }
        if !self.controller.history().is_empty() {
            spans.push(Span::styled("c", key));
            spans.push(Span::raw(" clear  "));
            spans.push(Span::styled("j/k", key));
            spans.push(Span::raw(" scroll  "));
        }
        spans.push(Span::styled("q", key));
        spans.push(Span::raw(" quit"));

        if let Some((msg, _)) = &self.status_msg {
            spans.push(Span::raw("  |  "));
            spans.push(Span::styled(msg.as_str(), Style::default().fg(Color::Cyan)));
        }

        Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .render(area, buf);
    }
}

fn render_stats(stats: &StatsSnapshot, area: Rect, buf: &mut Buffer) {
    let label = Style::default().fg(Color::DarkGray);
    let value = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled("Total Rolls  ", label),
            Span::styled(stats.count.to_string(), value(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Average      ", label),
            Span::styled(stats.average.to_string(), value(Color::Magenta)),
        ]),
        Line::from(vec![
            Span::styled("Highest      ", label),
            Span::styled(stats.max.to_string(), value(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled("Lowest       ", label),
            Span::styled(stats.min.to_string(), value(Color::Gray)),
        ]),
    ];
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" 📊 Statistics "))
        .render(area, buf);
}

const fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::High => Color::Magenta,
        Tier::Mid => Color::Cyan,
        Tier::Low => Color::Gray,
    }
}
