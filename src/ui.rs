pub mod charting;
pub mod layout;
pub mod screen;
pub mod stats_view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};
use type_defender::{
    corpus::LENGTH_SLOTS,
    matcher::highlight_len,
    session::SessionState,
    spawn::PlayField,
    tracker::SessionSummary,
    util::scale_to_cells,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::layout::{
        toggle_label, FrameLayout, PAUSE_LABEL, QUIT_LABEL, RESUME_LABEL, STATS_LABEL,
    },
    App, AppState,
};

/// Everything the play screen draws, borrowed from the game after a tick.
pub struct PlayView<'a> {
    pub state: &'a SessionState,
    pub high_score: u32,
    pub field: PlayField,
    pub wpm: f64,
    pub last_session: Option<&'a SessionSummary>,
}

impl<'a> PlayView<'a> {
    pub fn from_app(app: &'a App) -> Self {
        Self {
            state: app.game.state(),
            high_score: app.game.high_score(),
            field: app.game.field(),
            wpm: app.game.tracker().snapshot().net_wpm(),
            last_session: app.last_session.as_ref(),
        }
    }

    fn render_targets(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let word_style = Style::default().add_modifier(Modifier::BOLD);
        let hit_style = Style::default().patch(word_style).fg(Color::Green);

        let extent = f64::from(self.field.height.saturating_sub(self.field.hud_margin)).max(1.0);
        let width = f64::from(self.field.width.max(1));
        let cols = f64::from(area.width);

        for target in self.state.targets.iter() {
            let Some(row) = scale_to_cells(target.y.clamp(0.0, extent - 1.0), extent, area.height)
            else {
                continue;
            };
            let col = (target.x / width * cols).floor();
            if col >= cols {
                continue;
            }

            // Words sliding off the left edge lose their leading characters.
            let skip = if col < 0.0 { (-col) as usize } else { 0 };
            let lit = highlight_len(target, &self.state.active_input).saturating_sub(skip);
            let visible: Vec<char> = target.text.chars().skip(skip).collect();
            if visible.is_empty() {
                continue;
            }
            let head: String = visible.iter().take(lit).collect();
            let tail: String = visible.iter().skip(lit).collect();

            let x = area.x + col.max(0.0) as u16;
            let y = area.y + row;
            let room = usize::from(area.right() - x);
            let (next_x, _) = buf.set_stringn(x, y, &head, room, hit_style);
            let room = usize::from(area.right().saturating_sub(next_x));
            buf.set_stringn(next_x, y, &tail, room, word_style);
        }
    }

    fn render_hud(&self, layout: &FrameLayout, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let state = self.state;

        let block = Block::bordered().title(Span::styled(" type defender ", dim_style));
        let inner = block.inner(layout.hud);
        block.render(layout.hud, buf);

        let on_track = state.active_input.is_empty()
            || state
                .targets
                .iter()
                .any(|t| t.text.starts_with(&state.active_input));
        let input_style = Style::default()
            .patch(bold_style)
            .fg(if on_track { Color::Green } else { Color::Red });
        let lives_style = if state.lives <= 1 {
            Style::default().patch(bold_style).fg(Color::Red)
        } else {
            bold_style
        };
        let sep = || Span::styled("  │  ", dim_style);

        let line = Line::from(vec![
            Span::styled("level ", dim_style),
            Span::styled(state.level.to_string(), bold_style),
            sep(),
            Span::styled("> ", dim_style),
            Span::styled(state.active_input.clone(), input_style),
            Span::styled("_", dim_style),
            sep(),
            Span::styled("score ", dim_style),
            Span::styled(state.score.to_string(), bold_style),
            sep(),
            Span::styled("best ", dim_style),
            Span::styled(self.high_score.to_string(), bold_style),
            sep(),
            Span::styled("lives ", dim_style),
            Span::styled(state.lives.to_string(), lives_style),
            sep(),
            Span::styled("wpm ", dim_style),
            Span::styled(format!("{:.1}", self.wpm), bold_style),
        ]);
        let text_area = Rect {
            width: inner
                .width
                .saturating_sub(PAUSE_LABEL.width() as u16 + 2),
            ..inner
        };
        Paragraph::new(line).render(text_area, buf);

        if !state.paused {
            draw_label(
                buf,
                layout.pause_button,
                PAUSE_LABEL,
                Style::default().patch(bold_style).fg(Color::Yellow),
            );
        }
    }

    fn render_menu(&self, layout: &FrameLayout, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let button_style = Style::default().patch(bold_style).fg(Color::Yellow);

        Clear.render(layout.menu, buf);
        Block::bordered()
            .title(Span::styled(" paused ", bold_style))
            .title_alignment(Alignment::Center)
            .render(layout.menu, buf);

        if let Some(last) = self.last_session {
            Paragraph::new(Span::styled(
                format!(
                    "last game: {} pts, {:.1} wpm, {:.0}% acc",
                    last.score, last.net_wpm, last.char_accuracy_pct
                ),
                dim_style,
            ))
            .alignment(Alignment::Center)
            .render(layout.banner, buf);
        }

        for (rect, label) in [
            (layout.resume_button, RESUME_LABEL),
            (layout.stats_button, STATS_LABEL),
            (layout.quit_button, QUIT_LABEL),
        ] {
            draw_label(buf, rect, label, button_style);
        }

        Paragraph::new(Span::styled("word lengths", dim_style))
            .alignment(Alignment::Center)
            .render(layout.toggles_caption, buf);

        for (slot, rect) in layout.length_toggles.iter().enumerate().take(LENGTH_SLOTS) {
            let style = if self.state.selection.is_selected(slot) {
                Style::default().patch(bold_style).fg(Color::Green)
            } else {
                dim_style
            };
            draw_label(buf, *rect, &toggle_label(slot), style);
        }

        Paragraph::new(Span::styled(
            "(r)esume / (s)tats / (q)uit / (2-8) lengths",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(layout.hint, buf);
    }
}

/// Write a button label into its hotspot. Clipped-away hotspots draw nothing.
fn draw_label(buf: &mut Buffer, rect: Rect, label: &str, style: Style) {
    if rect.is_empty() {
        return;
    }
    buf.set_stringn(rect.x, rect.y, label, usize::from(rect.width), style);
}

impl Widget for PlayView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = FrameLayout::new(area);
        self.render_targets(layout.field, buf);
        self.render_hud(&layout, buf);
        if self.state.paused {
            self.render_menu(&layout, buf);
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Playing => PlayView::from_app(self).render(area, buf),
            AppState::Stats => self.stats_view.render(area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use type_defender::session::SessionConfig;
    use type_defender::target::TargetSpec;

    fn state_with(words: &[(&str, f64, f64)]) -> SessionState {
        let config = SessionConfig::default();
        let mut state = SessionState::initial(&config, config.selection);
        state.paused = false;
        state.pending_spawn = false;
        for (i, (text, x, y)) in words.iter().enumerate() {
            state.targets.insert(TargetSpec {
                text: text.to_string(),
                speed: 4,
                y: *y,
                x: *x,
                lane: i,
            });
        }
        state
    }

    fn view(state: &SessionState) -> PlayView<'_> {
        PlayView {
            state,
            high_score: 900,
            field: PlayField::default(),
            wpm: 0.0,
            last_session: None,
        }
    }

    fn render(view: PlayView<'_>, area: Rect) -> Buffer {
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        buffer
    }

    fn text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area().width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn target_is_scaled_into_the_field() {
        let state = state_with(&[("cat", 500.0, 325.0)]);
        let buffer = render(view(&state), Rect::new(0, 0, 80, 24));
        // 325 / 650 of 21 rows, 500 / 1000 of 80 columns
        assert_eq!(row_text(&buffer, 10).trim(), "cat");
        assert_eq!(buffer[(40, 10)].symbol(), "c");
    }

    #[test]
    fn offscreen_targets_are_not_drawn() {
        let state = state_with(&[("far", 1500.0, 100.0)]);
        let buffer = render(view(&state), Rect::new(0, 0, 80, 24));
        assert!(!text(&buffer).contains("far"));
    }

    #[test]
    fn target_leaving_the_left_edge_is_clipped() {
        let state = state_with(&[("horse", -25.0, 0.0)]);
        let buffer = render(view(&state), Rect::new(0, 0, 80, 24));
        assert!(row_text(&buffer, 0).starts_with("rse"));
    }

    #[test]
    fn typed_prefix_is_highlighted() {
        let mut state = state_with(&[("cat", 500.0, 325.0)]);
        state.active_input = "ca".into();
        let buffer = render(view(&state), Rect::new(0, 0, 80, 24));
        assert_eq!(buffer[(40, 10)].fg, Color::Green);
        assert_eq!(buffer[(41, 10)].fg, Color::Green);
        assert_ne!(buffer[(42, 10)].fg, Color::Green);
    }

    #[test]
    fn hud_shows_level_score_best_and_lives() {
        let mut state = state_with(&[]);
        state.level = 4;
        state.score = 450;
        state.lives = 3;
        state.active_input = "ho".into();
        let buffer = render(view(&state), Rect::new(0, 0, 100, 24));
        let hud = row_text(&buffer, 22);
        assert!(hud.contains("level 4"));
        assert!(hud.contains("> ho_"));
        assert!(hud.contains("score 450"));
        assert!(hud.contains("best 900"));
        assert!(hud.contains("lives 3"));
        assert!(hud.contains(PAUSE_LABEL));
    }

    #[test]
    fn pause_menu_lists_buttons_and_lengths() {
        let mut state = state_with(&[]);
        state.paused = true;
        let area = Rect::new(0, 0, 80, 24);
        let buffer = render(view(&state), area);
        let rendered = text(&buffer);
        assert!(rendered.contains("paused"));
        assert!(rendered.contains(RESUME_LABEL));
        assert!(rendered.contains(STATS_LABEL));
        assert!(rendered.contains(QUIT_LABEL));
        assert!(rendered.contains("[2] [3] [4] [5] [6] [7] [8+]"));
        assert!(!rendered.contains(PAUSE_LABEL));

        let layout = FrameLayout::new(area);
        let selected = layout.length_toggles[1];
        assert_eq!(buffer[(selected.x, selected.y)].fg, Color::Green);
        let unselected = layout.length_toggles[0];
        assert_ne!(buffer[(unselected.x, unselected.y)].fg, Color::Green);
    }

    #[test]
    fn pause_menu_mentions_last_game() {
        let mut state = state_with(&[]);
        state.paused = true;
        let summary = SessionSummary {
            net_wpm: 31.46,
            gross_wpm: 35.0,
            kpm: 180.0,
            word_accuracy_pct: 90.0,
            char_accuracy_pct: 95.2,
            error_rate_pct: 4.8,
            score: 450,
            words_typed: 20,
            correct_words: 20,
            incorrect_words: 2,
            chars_typed: 90,
            correct_keystrokes: 86,
            backspace_count: 4,
            longest_streak: 9,
            avg_word_length: 4.5,
            avg_word_time_sec: 1.9,
            total_time_sec: 38.1,
            words_shown: 26,
            words_missed: 6,
        };
        let mut v = view(&state);
        v.last_session = Some(&summary);
        let buffer = render(v, Rect::new(0, 0, 80, 24));
        assert!(text(&buffer).contains("last game: 450 pts, 31.5 wpm, 95% acc"));
    }

    #[test]
    fn extreme_sizes_render_without_panic() {
        let mut state = state_with(&[("cat", 10.0, 0.0), ("horse", 990.0, 650.0)]);
        for paused in [false, true] {
            state.paused = paused;
            for area in [
                Rect::new(0, 0, 1, 1),
                Rect::new(0, 0, 10, 5),
                Rect::new(0, 0, 200, 5),
                Rect::new(0, 0, 20, 50),
                Rect::new(0, 0, 300, 120),
            ] {
                let buffer = render(view(&state), area);
                assert_eq!(*buffer.area(), area);
            }
        }
    }
}
