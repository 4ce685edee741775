use tracing::{debug, info};

use super::common::{truncate_label, UiColors, UiContext, UiKind, UiRequest};
use super::UiStrategy;
use crate::controller::LogicalEvent;
use crate::gpu::{Canvas, Rect, SCREEN_HEIGHT, SCREEN_WIDTH};

const VISIBLE_ROWS: usize = 12;
const ROW_H: f32 = 30.0;
const LIST_X: f32 = 20.0;
const LIST_W: f32 = 340.0;
const LIST_TOP: f32 = 40.0;
const ROW_CHARS: usize = 24;
const PANEL_X: f32 = LIST_X + LIST_W + 20.0;

const FLASH_FRAMES: u8 = 8;

/// Scrolling list on the left, details of the highlighted game on the right
#[derive(Debug, Default)]
pub struct ListMenu {
    cursor: usize,
    scroll: usize,
    labels: Vec<String>,
    flash: u8,
}

impl ListMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    // Keeps the cursor row inside the visible window
    fn follow_cursor(&mut self) {
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + VISIBLE_ROWS {
            self.scroll = self.cursor + 1 - VISIBLE_ROWS;
        }
    }
}

impl UiStrategy for ListMenu {
    fn kind(&self) -> UiKind {
        UiKind::ListDesc
    }

    fn initialize(&mut self, ctx: &UiContext<'_>) {
        self.labels = ctx
            .catalog
            .iter()
            .map(|game| truncate_label(&game.name, ROW_CHARS).into_owned())
            .collect();
        info!("List menu initialized with {} rows", self.labels.len());
    }

    fn activate(&mut self, ctx: &UiContext<'_>) {
        self.flash = 0;
        if self.cursor >= ctx.catalog.len() {
            self.cursor = ctx.catalog.len().saturating_sub(1);
        }
        self.scroll = self.scroll.min(ctx.catalog.len().saturating_sub(VISIBLE_ROWS));
        self.follow_cursor();
        debug!("List menu active, cursor at {}", self.cursor);
    }

    fn render(&mut self, ctx: &UiContext<'_>, canvas: &mut Canvas<'_>) {
        canvas.fill_rect(Rect::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT), UiColors::MAIN_BG);

        let end = (self.scroll + VISIBLE_ROWS).min(ctx.catalog.len());
        for index in self.scroll..end {
            let row = Rect::new(
                LIST_X,
                LIST_TOP + (index - self.scroll) as f32 * ROW_H,
                LIST_W,
                ROW_H - 2.0,
            );
            if index == self.cursor {
                let color = if self.flash > 0 {
                    UiColors::SELECTED
                } else {
                    UiColors::ACTIVE
                };
                canvas.fill_rect(row, color);
            } else {
                canvas.fill_rect(row, UiColors::INNER_BG);
            }

            let label = match self.labels.get(index) {
                Some(label) => label.clone(),
                None => ctx
                    .catalog
                    .get(index)
                    .map(|game| truncate_label(&game.name, ROW_CHARS).into_owned())
                    .unwrap_or_default(),
            };
            canvas.label(row.x + 6.0, row.y + 6.0, &label, UiColors::TEXT);
        }

        let panel = Rect::new(PANEL_X, LIST_TOP, SCREEN_WIDTH - PANEL_X - 20.0, 200.0);
        canvas.fill_rect(panel, UiColors::EXTREME_BG);
        canvas.outline(panel, 1.0, UiColors::BORDER);
        match ctx.catalog.get(self.cursor) {
            Some(game) => {
                canvas.label(panel.x + 10.0, panel.y + 10.0, &game.name, UiColors::TEXT);
                canvas.label(panel.x + 10.0, panel.y + 40.0, &game.product, UiColors::TEXT_DIM);
                let disc = format!("Disc {}", game.disc);
                canvas.label(panel.x + 10.0, panel.y + 70.0, &disc, UiColors::TEXT_DIM);
            }
            None => {
                let empty = "No games found";
                canvas.label(panel.x + 10.0, panel.y + 10.0, empty, UiColors::TEXT_DIM);
            }
        }

        self.flash = self.flash.saturating_sub(1);
    }

    fn handle_event(&mut self, ctx: &UiContext<'_>, event: LogicalEvent) -> UiRequest {
        let len = ctx.catalog.len();
        if event == LogicalEvent::ButtonY {
            return UiRequest::CycleNext;
        }
        if len == 0 {
            return UiRequest::Stay;
        }

        let last = len - 1;
        match event {
            LogicalEvent::Up => self.cursor = self.cursor.saturating_sub(1),
            LogicalEvent::Down => self.cursor = (self.cursor + 1).min(last),
            LogicalEvent::Left => self.cursor = self.cursor.saturating_sub(VISIBLE_ROWS),
            LogicalEvent::Right => self.cursor = (self.cursor + VISIBLE_ROWS).min(last),
            // back to the top
            LogicalEvent::ButtonB => self.cursor = 0,
            LogicalEvent::ButtonA => {
                if let Some(game) = ctx.catalog.get(self.cursor) {
                    info!("Selected {} ({})", game.name, game.product);
                    self.flash = FLASH_FRAMES;
                }
            }
            _ => {}
        }
        self.follow_cursor();
        UiRequest::Stay
    }
}
