//! # Menu User Interface Module
//!
//! Several complete presentation modes share one frame loop. Each mode is a
//! [`UiStrategy`]: it owns its own cursor and display state, draws itself into the
//! open display list and decides what a [`LogicalEvent`] means for it. The loop
//! never knows which mode is active; it asks the [`StrategyRegistry`].
//!
//! ## Lifecycle
//!
//! ```text
//! initialize ──► activate ──► (handle_event ──► render)* ──► activate on next switch
//! ```
//!
//! `initialize` is one-time setup and only runs for the default mode during startup.
//! `activate` runs on every switch, including the first, and must be idempotent:
//! startup calls it twice for the default mode.
//!
//! ## Strategy Set
//! The set of modes is closed ([`UiKind`]) and [`Strategy`] dispatches over it with a
//! plain `match`. The registry itself is generic so other strategy types can be
//! plugged in where needed.

pub mod common;
pub mod grid_menu;
pub mod list_menu;

use tracing::{debug, info};

use crate::controller::LogicalEvent;
use crate::gpu::Canvas;

pub use common::{UiColors, UiContext, UiKind, UiRequest};
pub use grid_menu::GridMenu;
pub use list_menu::ListMenu;

/// One swappable presentation mode
pub trait UiStrategy {
    fn kind(&self) -> UiKind;

    /// One-time setup; expensive work goes here
    fn initialize(&mut self, ctx: &UiContext<'_>);

    /// Resets transient display state; runs on every switch to this strategy
    fn activate(&mut self, ctx: &UiContext<'_>);

    /// Pushes this frame's geometry; the translucent list is open
    fn render(&mut self, ctx: &UiContext<'_>, canvas: &mut Canvas<'_>);

    fn handle_event(&mut self, ctx: &UiContext<'_>, event: LogicalEvent) -> UiRequest;
}

// UI errors
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("Strategy registry needs at least one strategy")]
    EmptyRegistry,
}

/// Every built-in presentation mode
pub enum Strategy {
    Grid3(GridMenu),
    ListDesc(ListMenu),
}

impl Strategy {
    pub fn build(kind: UiKind) -> Self {
        match kind {
            UiKind::Grid3 => Strategy::Grid3(GridMenu::new()),
            UiKind::ListDesc => Strategy::ListDesc(ListMenu::new()),
        }
    }
}

impl UiStrategy for Strategy {
    fn kind(&self) -> UiKind {
        match self {
            Strategy::Grid3(s) => s.kind(),
            Strategy::ListDesc(s) => s.kind(),
        }
    }

    fn initialize(&mut self, ctx: &UiContext<'_>) {
        match self {
            Strategy::Grid3(s) => s.initialize(ctx),
            Strategy::ListDesc(s) => s.initialize(ctx),
        }
    }

    fn activate(&mut self, ctx: &UiContext<'_>) {
        match self {
            Strategy::Grid3(s) => s.activate(ctx),
            Strategy::ListDesc(s) => s.activate(ctx),
        }
    }

    fn render(&mut self, ctx: &UiContext<'_>, canvas: &mut Canvas<'_>) {
        match self {
            Strategy::Grid3(s) => s.render(ctx, canvas),
            Strategy::ListDesc(s) => s.render(ctx, canvas),
        }
    }

    fn handle_event(&mut self, ctx: &UiContext<'_>, event: LogicalEvent) -> UiRequest {
        match self {
            Strategy::Grid3(s) => s.handle_event(ctx, event),
            Strategy::ListDesc(s) => s.handle_event(ctx, event),
        }
    }
}

/// Fixed, ordered table of strategies plus the index of the active one
///
/// Invariant: `current < strategies.len()` at all times.
pub struct StrategyRegistry<S = Strategy> {
    strategies: Vec<S>,
    current: usize,
}

impl StrategyRegistry<Strategy> {
    /// Registry with every built-in strategy in [`UiKind::ALL`] order
    pub fn standard() -> Self {
        Self {
            strategies: UiKind::ALL.iter().map(|kind| Strategy::build(*kind)).collect(),
            current: 0,
        }
    }
}

impl<S: UiStrategy> StrategyRegistry<S> {
    pub fn new(strategies: Vec<S>) -> Result<Self, UiError> {
        if strategies.is_empty() {
            return Err(UiError::EmptyRegistry);
        }
        debug!("Creating strategy registry with {} strategies", strategies.len());
        Ok(Self {
            strategies,
            current: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.current
    }

    pub fn active(&self) -> &S {
        &self.strategies[self.current]
    }

    pub fn active_mut(&mut self) -> &mut S {
        &mut self.strategies[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.strategies.get(index)
    }

    pub fn position(&self, kind: UiKind) -> Option<usize> {
        self.strategies.iter().position(|s| s.kind() == kind)
    }

    /// Makes `index` the active strategy and activates it
    ///
    /// Out-of-range indices are ignored and leave the active strategy untouched.
    /// Returns whether the switch happened.
    pub fn switch_to(&mut self, index: usize, ctx: &UiContext<'_>) -> bool {
        if index >= self.strategies.len() {
            debug!(
                "Ignoring switch to strategy {} ({} registered)",
                index,
                self.strategies.len()
            );
            return false;
        }

        self.current = index;
        let strategy = &mut self.strategies[index];
        info!("Switching UI to {} ({})", strategy.kind(), index);
        // activate only, initialize is a startup concern
        strategy.activate(ctx);
        true
    }

    pub fn set_default(&mut self, ctx: &UiContext<'_>) {
        self.switch_to(0, ctx);
    }

    /// Advances to the next strategy, wrapping to the first after the last
    pub fn cycle_next(&mut self, ctx: &UiContext<'_>) {
        let mut next = self.current + 1;
        if next >= self.strategies.len() {
            next = 0;
        }
        self.switch_to(next, ctx);
    }

    /// Applies a request returned by the active strategy
    pub fn apply(&mut self, request: UiRequest, ctx: &UiContext<'_>) {
        match request {
            UiRequest::Stay => {}
            UiRequest::CycleNext => self.cycle_next(ctx),
            UiRequest::SwitchTo(kind) => match self.position(kind) {
                Some(index) => {
                    self.switch_to(index, ctx);
                }
                None => debug!("Ignoring switch to unregistered strategy {}", kind),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    struct Probe {
        kind: UiKind,
        inits: usize,
        activations: usize,
    }

    impl Probe {
        fn new(kind: UiKind) -> Self {
            Self {
                kind,
                inits: 0,
                activations: 0,
            }
        }
    }

    impl UiStrategy for Probe {
        fn kind(&self) -> UiKind {
            self.kind
        }
        fn initialize(&mut self, _ctx: &UiContext<'_>) {
            self.inits += 1;
        }
        fn activate(&mut self, _ctx: &UiContext<'_>) {
            self.activations += 1;
        }
        fn render(&mut self, _ctx: &UiContext<'_>, _canvas: &mut Canvas<'_>) {}
        fn handle_event(&mut self, _ctx: &UiContext<'_>, _event: LogicalEvent) -> UiRequest {
            UiRequest::Stay
        }
    }

    fn registry(count: usize) -> StrategyRegistry<Probe> {
        let probes = (0..count)
            .map(|i| Probe::new(UiKind::ALL[i % UiKind::ALL.len()]))
            .collect();
        StrategyRegistry::new(probes).unwrap()
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert!(matches!(
            StrategyRegistry::<Probe>::new(Vec::new()),
            Err(UiError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_switch_activates_without_initializing() {
        let catalog = Catalog::default();
        let ctx = UiContext::new(&catalog);
        let mut reg = registry(2);
        assert!(reg.switch_to(1, &ctx));
        assert_eq!(reg.active_index(), 1);
        assert_eq!(reg.active().activations, 1);
        assert_eq!(reg.active().inits, 0);
        assert_eq!(reg.get(0).unwrap().activations, 0);
    }

    #[test]
    fn test_out_of_range_switch_is_ignored() {
        let catalog = Catalog::default();
        let ctx = UiContext::new(&catalog);
        let mut reg = registry(2);
        reg.switch_to(1, &ctx);
        for index in [2, 3, usize::MAX] {
            assert!(!reg.switch_to(index, &ctx));
            assert_eq!(reg.active_index(), 1);
        }
        assert_eq!(reg.active().activations, 1);
    }

    #[test]
    fn test_cycle_from_last_wraps_to_first() {
        let catalog = Catalog::default();
        let ctx = UiContext::new(&catalog);
        let mut reg = registry(2);
        reg.switch_to(1, &ctx);
        reg.cycle_next(&ctx);
        assert_eq!(reg.active_index(), 0);
        assert_eq!(reg.active().activations, 1);
    }

    #[test]
    fn test_cycle_count_times_returns_to_start() {
        let catalog = Catalog::default();
        let ctx = UiContext::new(&catalog);
        for count in 1..=5 {
            let mut reg = registry(count);
            for start in 0..count {
                reg.switch_to(start, &ctx);
                let mut seen = Vec::new();
                for _ in 0..count {
                    reg.cycle_next(&ctx);
                    assert!(reg.active_index() < count);
                    seen.push(reg.active_index());
                }
                assert_eq!(reg.active_index(), start, "count={}", count);
                seen.sort_unstable();
                assert_eq!(seen, (0..count).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_set_default_selects_first() {
        let catalog = Catalog::default();
        let ctx = UiContext::new(&catalog);
        let mut reg = registry(3);
        reg.switch_to(2, &ctx);
        reg.set_default(&ctx);
        assert_eq!(reg.active_index(), 0);
    }

    #[test]
    fn test_apply_requests() {
        let catalog = Catalog::default();
        let ctx = UiContext::new(&catalog);
        let mut reg = registry(2);
        reg.apply(UiRequest::Stay, &ctx);
        assert_eq!(reg.active_index(), 0);
        reg.apply(UiRequest::SwitchTo(UiKind::ListDesc), &ctx);
        assert_eq!(reg.active_index(), 1);
        reg.apply(UiRequest::CycleNext, &ctx);
        assert_eq!(reg.active_index(), 0);
    }

    #[test]
    fn test_standard_registry_order() {
        let reg = StrategyRegistry::standard();
        assert_eq!(reg.len(), UiKind::ALL.len());
        assert_eq!(reg.active().kind(), UiKind::Grid3);
        assert_eq!(reg.position(UiKind::ListDesc), Some(1));
    }
}
