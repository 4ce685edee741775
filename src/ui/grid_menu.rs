use std::borrow::Cow;
use tracing::{debug, info};

use super::common::{page_start, truncate_label, UiColors, UiContext, UiKind, UiRequest};
use super::UiStrategy;
use crate::controller::LogicalEvent;
use crate::gpu::{Canvas, Rect, SCREEN_HEIGHT, SCREEN_WIDTH};

const COLUMNS: usize = 3;
const ROWS: usize = 3;
const PAGE: usize = COLUMNS * ROWS;

const MARGIN_X: f32 = 32.0;
const MARGIN_TOP: f32 = 40.0;
const GAP: f32 = 12.0;
const TILE_W: f32 = (SCREEN_WIDTH - 2.0 * MARGIN_X - (COLUMNS as f32 - 1.0) * GAP) / COLUMNS as f32;
const TILE_H: f32 = 120.0;
const TILE_CHARS: usize = 18;

// Frames the selection flash stays visible
const FLASH_FRAMES: u8 = 8;

/// Paged 3x3 grid of tiles, one game per tile
#[derive(Debug, Default)]
pub struct GridMenu {
    cursor: usize,
    labels: Vec<String>,
    flash: u8,
}

impl GridMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn tile_rect(slot: usize) -> Rect {
        let col = (slot % COLUMNS) as f32;
        let row = (slot / COLUMNS) as f32;
        Rect::new(
            MARGIN_X + col * (TILE_W + GAP),
            MARGIN_TOP + row * (TILE_H + GAP),
            TILE_W,
            TILE_H,
        )
    }

    fn label<'a>(&'a self, ctx: &'a UiContext<'_>, index: usize) -> Cow<'a, str> {
        match self.labels.get(index) {
            Some(label) => Cow::Borrowed(label.as_str()),
            None => ctx
                .catalog
                .get(index)
                .map(|game| truncate_label(&game.name, TILE_CHARS))
                .unwrap_or(Cow::Borrowed("")),
        }
    }

    fn move_cursor(&mut self, event: LogicalEvent, len: usize) {
        let last = len - 1;
        self.cursor = match event {
            LogicalEvent::Left => self.cursor.saturating_sub(1),
            LogicalEvent::Right => (self.cursor + 1).min(last),
            LogicalEvent::Up if self.cursor >= COLUMNS => self.cursor - COLUMNS,
            LogicalEvent::Down if self.cursor + COLUMNS <= last => self.cursor + COLUMNS,
            // page back / page forward
            LogicalEvent::ButtonB => self.cursor.saturating_sub(PAGE),
            LogicalEvent::ButtonX => (self.cursor + PAGE).min(last),
            _ => self.cursor,
        };
    }
}

impl UiStrategy for GridMenu {
    fn kind(&self) -> UiKind {
        UiKind::Grid3
    }

    fn initialize(&mut self, ctx: &UiContext<'_>) {
        self.labels = ctx
            .catalog
            .iter()
            .map(|game| truncate_label(&game.name, TILE_CHARS).into_owned())
            .collect();
        info!("Grid menu initialized with {} tiles", self.labels.len());
    }

    fn activate(&mut self, ctx: &UiContext<'_>) {
        self.flash = 0;
        if self.cursor >= ctx.catalog.len() {
            self.cursor = ctx.catalog.len().saturating_sub(1);
        }
        debug!("Grid menu active, cursor at {}", self.cursor);
    }

    fn render(&mut self, ctx: &UiContext<'_>, canvas: &mut Canvas<'_>) {
        canvas.fill_rect(Rect::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT), UiColors::MAIN_BG);

        let first = page_start(self.cursor, PAGE);
        let last = (first + PAGE).min(ctx.catalog.len());
        for index in first..last {
            let rect = Self::tile_rect(index - first);
            canvas.fill_rect(rect, UiColors::INNER_BG);
            if index == self.cursor {
                let color = if self.flash > 0 {
                    UiColors::SELECTED
                } else {
                    UiColors::ACTIVE
                };
                canvas.outline(rect, 3.0, color);
            }
            let label = self.label(ctx, index);
            canvas.label(rect.x + 8.0, rect.y + rect.h - 24.0, &label, UiColors::TEXT);
        }

        if ctx.catalog.is_empty() {
            canvas.label(MARGIN_X, MARGIN_TOP, "No games found", UiColors::TEXT_DIM);
        } else {
            let pages = ctx.catalog.len().div_ceil(PAGE);
            let footer = format!("Page {}/{}", first / PAGE + 1, pages);
            canvas.label(MARGIN_X, SCREEN_HEIGHT - 32.0, &footer, UiColors::TEXT_DIM);
        }

        self.flash = self.flash.saturating_sub(1);
    }

    fn handle_event(&mut self, ctx: &UiContext<'_>, event: LogicalEvent) -> UiRequest {
        match event {
            LogicalEvent::None => UiRequest::Stay,
            LogicalEvent::ButtonY => UiRequest::CycleNext,
            LogicalEvent::ButtonA => {
                if let Some(game) = ctx.catalog.get(self.cursor) {
                    info!("Selected {} ({})", game.name, game.product);
                    self.flash = FLASH_FRAMES;
                }
                UiRequest::Stay
            }
            LogicalEvent::Start => UiRequest::Stay,
            other => {
                if !ctx.catalog.is_empty() {
                    self.move_cursor(other, ctx.catalog.len());
                }
                UiRequest::Stay
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, GameEntry};
    use crate::gpu::testing::CollectingGpu;
    use crate::gpu::DepthCounter;

    fn catalog(count: usize) -> Catalog {
        Catalog::new(
            (0..count)
                .map(|i| GameEntry {
                    name: format!("Game {}", i),
                    product: format!("T-{}", i),
                    disc: "1/1".to_string(),
                })
                .collect(),
        )
    }

    fn press(menu: &mut GridMenu, ctx: &UiContext<'_>, events: &[LogicalEvent]) {
        for event in events {
            menu.handle_event(ctx, *event);
        }
    }

    #[test]
    fn test_grid_navigation() {
        let catalog = catalog(20);
        let ctx = UiContext::new(&catalog);
        let mut menu = GridMenu::new();
        press(&mut menu, &ctx, &[LogicalEvent::Right, LogicalEvent::Down]);
        assert_eq!(menu.cursor(), 4);
        press(&mut menu, &ctx, &[LogicalEvent::Up, LogicalEvent::Up]);
        assert_eq!(menu.cursor(), 1);
        press(&mut menu, &ctx, &[LogicalEvent::Left, LogicalEvent::Left]);
        assert_eq!(menu.cursor(), 0);
    }

    #[test]
    fn test_grid_paging_clamps() {
        let catalog = catalog(20);
        let ctx = UiContext::new(&catalog);
        let mut menu = GridMenu::new();
        press(
            &mut menu,
            &ctx,
            &[LogicalEvent::ButtonX, LogicalEvent::ButtonX, LogicalEvent::ButtonX],
        );
        assert_eq!(menu.cursor(), 19);
        press(&mut menu, &ctx, &[LogicalEvent::Down]);
        assert_eq!(menu.cursor(), 19);
        press(&mut menu, &ctx, &[LogicalEvent::ButtonB]);
        assert_eq!(menu.cursor(), 10);
    }

    #[test]
    fn test_y_cycles_strategy() {
        let catalog = catalog(3);
        let ctx = UiContext::new(&catalog);
        let mut menu = GridMenu::new();
        assert_eq!(menu.handle_event(&ctx, LogicalEvent::ButtonY), UiRequest::CycleNext);
        assert_eq!(menu.handle_event(&ctx, LogicalEvent::ButtonA), UiRequest::Stay);
    }

    #[test]
    fn test_empty_catalog_ignores_navigation() {
        let catalog = Catalog::default();
        let ctx = UiContext::new(&catalog);
        let mut menu = GridMenu::new();
        press(&mut menu, &ctx, &[LogicalEvent::Right, LogicalEvent::Down, LogicalEvent::ButtonA]);
        assert_eq!(menu.cursor(), 0);
    }

    #[test]
    fn test_render_shows_current_page_only() {
        let catalog = catalog(12);
        let ctx = UiContext::new(&catalog);
        let mut menu = GridMenu::new();
        menu.initialize(&ctx);
        press(&mut menu, &ctx, &[LogicalEvent::ButtonX]);

        let mut gpu = CollectingGpu::default();
        let mut depth = DepthCounter::default();
        menu.render(&ctx, &mut Canvas::new(&mut gpu, &mut depth));

        let labels = gpu.labels();
        assert!(labels.contains(&"Game 9"));
        assert!(labels.contains(&"Game 11"));
        assert!(!labels.contains(&"Game 0"));
        assert!(labels.contains(&"Page 2/2"));
    }

    #[test]
    fn test_render_without_initialize_falls_back() {
        let catalog = catalog(2);
        let ctx = UiContext::new(&catalog);
        let mut menu = GridMenu::new();
        let mut gpu = CollectingGpu::default();
        let mut depth = DepthCounter::default();
        menu.render(&ctx, &mut Canvas::new(&mut gpu, &mut depth));
        assert!(gpu.labels().contains(&"Game 1"));
    }

    #[test]
    fn test_activate_is_idempotent() {
        let catalog = catalog(5);
        let ctx = UiContext::new(&catalog);
        let mut menu = GridMenu::new();
        press(&mut menu, &ctx, &[LogicalEvent::Right, LogicalEvent::ButtonA]);
        menu.activate(&ctx);
        let once = (menu.cursor, menu.flash);
        menu.activate(&ctx);
        assert_eq!((menu.cursor, menu.flash), once);
        assert_eq!(menu.cursor(), 1);
    }
}
