use itertools::{Itertools, MinMaxResult};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};
use type_defender::stats::COLUMN_COUNT;
use type_defender::tracker::SessionSummary;
use type_defender::util::{mean, std_dev};

use crate::ui::charting::{compute_chart_params, format_label};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// One column of the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum StatColumn {
    #[strum(serialize = "Net WPM")]
    NetWpm,
    #[strum(serialize = "Gross WPM")]
    GrossWpm,
    #[strum(serialize = "Keys per minute")]
    Kpm,
    #[strum(serialize = "Word accuracy %")]
    WordAccuracy,
    #[strum(serialize = "Keystroke accuracy %")]
    CharAccuracy,
    #[strum(serialize = "Error rate %")]
    ErrorRate,
    Score,
    #[strum(serialize = "Words typed")]
    WordsTyped,
    #[strum(serialize = "Correct words")]
    CorrectWords,
    #[strum(serialize = "Incorrect words")]
    IncorrectWords,
    #[strum(serialize = "Characters typed")]
    CharsTyped,
    #[strum(serialize = "Correct keystrokes")]
    CorrectKeystrokes,
    Backspaces,
    #[strum(serialize = "Longest streak")]
    LongestStreak,
    #[strum(serialize = "Average word length")]
    AvgWordLength,
    #[strum(serialize = "Average word time (s)")]
    AvgWordTime,
    #[strum(serialize = "Session length (s)")]
    TotalTime,
    #[strum(serialize = "Words shown")]
    WordsShown,
    #[strum(serialize = "Words missed")]
    WordsMissed,
}

impl StatColumn {
    pub const ALL: [StatColumn; COLUMN_COUNT] = [
        StatColumn::NetWpm,
        StatColumn::GrossWpm,
        StatColumn::Kpm,
        StatColumn::WordAccuracy,
        StatColumn::CharAccuracy,
        StatColumn::ErrorRate,
        StatColumn::Score,
        StatColumn::WordsTyped,
        StatColumn::CorrectWords,
        StatColumn::IncorrectWords,
        StatColumn::CharsTyped,
        StatColumn::CorrectKeystrokes,
        StatColumn::Backspaces,
        StatColumn::LongestStreak,
        StatColumn::AvgWordLength,
        StatColumn::AvgWordTime,
        StatColumn::TotalTime,
        StatColumn::WordsShown,
        StatColumn::WordsMissed,
    ];

    pub fn value(self, row: &SessionSummary) -> f64 {
        match self {
            StatColumn::NetWpm => row.net_wpm,
            StatColumn::GrossWpm => row.gross_wpm,
            StatColumn::Kpm => row.kpm,
            StatColumn::WordAccuracy => row.word_accuracy_pct,
            StatColumn::CharAccuracy => row.char_accuracy_pct,
            StatColumn::ErrorRate => row.error_rate_pct,
            StatColumn::Score => f64::from(row.score),
            StatColumn::WordsTyped => f64::from(row.words_typed),
            StatColumn::CorrectWords => f64::from(row.correct_words),
            StatColumn::IncorrectWords => f64::from(row.incorrect_words),
            StatColumn::CharsTyped => f64::from(row.chars_typed),
            StatColumn::CorrectKeystrokes => f64::from(row.correct_keystrokes),
            StatColumn::Backspaces => f64::from(row.backspace_count),
            StatColumn::LongestStreak => f64::from(row.longest_streak),
            StatColumn::AvgWordLength => row.avg_word_length,
            StatColumn::AvgWordTime => row.avg_word_time_sec,
            StatColumn::TotalTime => row.total_time_sec,
            StatColumn::WordsShown => f64::from(row.words_shown),
            StatColumn::WordsMissed => f64::from(row.words_missed),
        }
    }

    /// Columns where a smaller number is the better session.
    pub fn lower_is_better(self) -> bool {
        matches!(
            self,
            StatColumn::ErrorRate
                | StatColumn::IncorrectWords
                | StatColumn::Backspaces
                | StatColumn::AvgWordTime
                | StatColumn::WordsMissed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub best: f64,
}

/// The statistics screen: the loaded table plus which column is charted.
#[derive(Debug, Clone, Default)]
pub struct StatsView {
    rows: Vec<SessionSummary>,
    column: usize,
}

impl StatsView {
    pub fn open(rows: Vec<SessionSummary>) -> Self {
        Self { rows, column: 0 }
    }

    pub fn rows(&self) -> &[SessionSummary] {
        &self.rows
    }

    pub fn column(&self) -> StatColumn {
        StatColumn::ALL[self.column]
    }

    pub fn next_column(&mut self) {
        self.column = (self.column + 1) % COLUMN_COUNT;
    }

    pub fn prev_column(&mut self) {
        self.column = (self.column + COLUMN_COUNT - 1) % COLUMN_COUNT;
    }

    fn values(&self) -> Vec<f64> {
        let column = self.column();
        self.rows.iter().map(|row| column.value(row)).collect()
    }

    /// Chart points: (1-based session number, value).
    pub fn series(&self) -> Vec<(f64, f64)> {
        self.values()
            .into_iter()
            .enumerate()
            .map(|(i, v)| ((i + 1) as f64, v))
            .collect()
    }

    pub fn summary(&self) -> Option<ColumnSummary> {
        let values = self.values();
        let best = match values.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(v) => v,
            MinMaxResult::MinMax(lo, hi) => {
                if self.column().lower_is_better() {
                    lo
                } else {
                    hi
                }
            }
        };
        Some(ColumnSummary {
            mean: mean(&values)?,
            std_dev: std_dev(&values)?,
            best,
        })
    }
}

impl Widget for &StatsView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Min(1),    // chart
                Constraint::Length(1), // summary
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ])
            .split(area);

        let column = self.column();
        Paragraph::new(Span::styled(
            format!("{column} ({} sessions)", self.rows.len()),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let legend = Paragraph::new(Span::styled(
            "(←/→) column / (b)ack / (esc) back",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        legend.render(chunks[4], buf);

        let Some(summary) = self.summary() else {
            Paragraph::new(Span::styled("no sessions recorded yet", dim_style))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
            return;
        };

        let points = self.series();
        let (sessions, top) = compute_chart_params(&points);
        let datasets = vec![Dataset::default()
            .marker(Marker::Braille)
            .style(magenta_style)
            .graph_type(GraphType::Line)
            .data(&points)];

        let chart = Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title("session")
                    .bounds([1.0, sessions])
                    .labels(vec![
                        Span::styled("1", bold_style),
                        Span::styled(format_label(sessions), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, top])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(format_label(top), bold_style),
                    ]),
            );
        chart.render(chunks[1], buf);

        let stats = Line::from(vec![
            Span::styled("mean ", dim_style),
            Span::styled(format!("{:.2}", summary.mean), bold_style),
            Span::styled("   std dev ", dim_style),
            Span::styled(format!("{:.2}", summary.std_dev), bold_style),
            Span::styled("   best ", dim_style),
            Span::styled(format_label(summary.best), bold_style),
        ]);
        Paragraph::new(stats)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(net_wpm: f64, error_rate_pct: f64) -> SessionSummary {
        SessionSummary {
            net_wpm,
            gross_wpm: 0.0,
            kpm: 0.0,
            word_accuracy_pct: 0.0,
            char_accuracy_pct: 0.0,
            error_rate_pct,
            score: 0,
            words_typed: 0,
            correct_words: 0,
            incorrect_words: 0,
            chars_typed: 0,
            correct_keystrokes: 0,
            backspace_count: 0,
            longest_streak: 0,
            avg_word_length: 0.0,
            avg_word_time_sec: 0.0,
            total_time_sec: 0.0,
            words_shown: 0,
            words_missed: 0,
        }
    }

    fn rendered(view: &StatsView) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn columns_cycle_both_ways() {
        let mut view = StatsView::default();
        assert_eq!(view.column(), StatColumn::NetWpm);
        view.prev_column();
        assert_eq!(view.column(), StatColumn::WordsMissed);
        view.next_column();
        view.next_column();
        assert_eq!(view.column(), StatColumn::GrossWpm);
    }

    #[test]
    fn summary_uses_the_selected_column() {
        let mut view = StatsView::open(vec![row(10.0, 8.0), row(20.0, 2.0), row(30.0, 5.0)]);
        let s = view.summary().unwrap();
        assert_eq!(s.mean, 20.0);
        assert_eq!(s.best, 30.0);
        assert!((s.std_dev - 8.16496580927726).abs() < 1e-9);

        for _ in 0..5 {
            view.next_column();
        }
        assert_eq!(view.column(), StatColumn::ErrorRate);
        assert_eq!(view.summary().unwrap().best, 2.0);
        assert_eq!(view.series(), vec![(1.0, 8.0), (2.0, 2.0), (3.0, 5.0)]);
    }

    #[test]
    fn empty_table_has_no_summary() {
        let view = StatsView::default();
        assert_eq!(view.summary(), None);
        assert!(rendered(&view).contains("no sessions recorded yet"));
    }

    #[test]
    fn renders_chart_and_summary() {
        let view = StatsView::open(vec![row(12.0, 0.0), row(18.0, 0.0)]);
        let text = rendered(&view);
        assert!(text.contains("Net WPM (2 sessions)"));
        assert!(text.contains("mean 15.00"));
        assert!(text.contains("best 18"));
    }

    #[test]
    fn every_column_has_a_label() {
        for column in StatColumn::ALL {
            assert!(!column.to_string().is_empty());
        }
        assert_eq!(StatColumn::Kpm.to_string(), "Keys per minute");
        assert_eq!(StatColumn::Score.to_string(), "Score");
    }
}
