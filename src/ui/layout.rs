use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use type_defender::corpus::{LengthSelection, LENGTH_SLOTS};
use type_defender::Hotspot;
use unicode_width::UnicodeWidthStr;

pub const HUD_HEIGHT: u16 = 3;
pub const MENU_WIDTH: u16 = 46;
pub const MENU_HEIGHT: u16 = 9;

pub const PAUSE_LABEL: &str = "[ Pause ]";
pub const RESUME_LABEL: &str = "[ Resume ]";
pub const STATS_LABEL: &str = "[ Stats ]";
pub const QUIT_LABEL: &str = "[ Quit ]";

const BUTTON_GAP: u16 = 2;
const TOGGLE_GAP: u16 = 1;

pub fn toggle_label(slot: usize) -> String {
    format!("[{}]", LengthSelection::slot_label(slot))
}

/// Screen regions of one frame. Rendering and mouse hit-testing both read
/// from here, so a click always lands on what was drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub area: Rect,
    pub field: Rect,
    pub hud: Rect,
    pub pause_button: Rect,
    pub menu: Rect,
    pub resume_button: Rect,
    pub stats_button: Rect,
    pub quit_button: Rect,
    /// Top row of the menu, for a note about the last game.
    pub banner: Rect,
    /// Row above the toggles, for the "word lengths" caption.
    pub toggles_caption: Rect,
    pub length_toggles: Vec<Rect>,
    pub hint: Rect,
}

impl FrameLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(HUD_HEIGHT)])
            .split(area);
        let (field, hud) = (chunks[0], chunks[1]);

        let pause_width = PAUSE_LABEL.width() as u16;
        let pause_button = Rect::new(
            hud.right().saturating_sub(pause_width + 2),
            hud.y + 1,
            pause_width,
            1,
        )
        .intersection(area);

        let menu = Rect::new(
            area.x + area.width.saturating_sub(MENU_WIDTH) / 2,
            field.y + field.height.saturating_sub(MENU_HEIGHT) / 2,
            MENU_WIDTH.min(area.width),
            MENU_HEIGHT.min(field.height),
        );
        let inner = Rect::new(
            menu.x + 1,
            menu.y + 1,
            menu.width.saturating_sub(2),
            menu.height.saturating_sub(2),
        );
        let row = |offset: u16| {
            Rect::new(inner.x, inner.y + offset, inner.width, 1).intersection(inner)
        };

        let buttons = centered_row(
            inner,
            inner.y + 1,
            &[RESUME_LABEL, STATS_LABEL, QUIT_LABEL],
            BUTTON_GAP,
        );
        let toggle_labels: Vec<String> = (0..LENGTH_SLOTS).map(toggle_label).collect();
        let toggle_refs: Vec<&str> = toggle_labels.iter().map(String::as_str).collect();
        let length_toggles = centered_row(inner, inner.y + 4, &toggle_refs, TOGGLE_GAP);

        Self {
            area,
            field,
            hud,
            pause_button,
            menu,
            resume_button: buttons[0],
            stats_button: buttons[1],
            quit_button: buttons[2],
            banner: row(0),
            toggles_caption: row(3),
            length_toggles,
            hint: row(6),
        }
    }

    /// Regions that react to a click, in priority order.
    pub fn hotspots(&self, paused: bool) -> Vec<(Rect, Hotspot)> {
        let mut spots = Vec::new();
        if paused {
            spots.push((self.resume_button, Hotspot::Resume));
            spots.push((self.stats_button, Hotspot::Stats));
            spots.push((self.quit_button, Hotspot::Quit));
            spots.extend(
                self.length_toggles
                    .iter()
                    .enumerate()
                    .map(|(slot, rect)| (*rect, Hotspot::LengthToggle(slot))),
            );
        } else {
            spots.push((self.pause_button, Hotspot::Pause));
        }
        spots
    }

    pub fn hit_test(&self, paused: bool, column: u16, row: u16) -> Option<Hotspot> {
        let pos = Position::new(column, row);
        self.hotspots(paused)
            .into_iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, hotspot)| hotspot)
    }
}

/// Lay `labels` out left to right, centred in `bounds` on row `y`.
fn centered_row(bounds: Rect, y: u16, labels: &[&str], gap: u16) -> Vec<Rect> {
    let widths: Vec<u16> = labels.iter().map(|l| l.width() as u16).collect();
    let total = widths.iter().sum::<u16>() + gap * (labels.len().saturating_sub(1) as u16);
    let mut x = bounds.x + bounds.width.saturating_sub(total) / 2;

    widths
        .into_iter()
        .map(|w| {
            let rect = Rect::new(x, y, w, 1).intersection(bounds);
            x += w + gap;
            rect
        })
        .collect()
}
