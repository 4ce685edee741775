//! # Startup Sequencer
//!
//! Brings up everything the menu needs before the first frame, in a fixed order:
//!
//! 1. drive recovery (see [`crate::storage`])
//! 2. small and large texture pools
//! 3. bulk DAT load
//! 4. list load
//! 5. graphics helpers (not part of the result)
//! 6. default strategy selection, its one-time initialize, and a second activate
//!
//! Every counted step runs even when an earlier one failed; the outcomes are
//! collected into a [`StartupReport`] and the caller decides from the aggregate.
//! Nothing is retried.

pub mod host;

use std::fmt;
use tracing::{error, info, warn};

use crate::catalog::{Catalog, CatalogError};
use crate::storage::{recover_drive, DiscDrive, DiscType, PollPolicy};
use crate::ui::{StrategyRegistry, UiContext, UiStrategy};

pub use host::{HostServices, HostSettings};

// Startup service errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to allocate {name} pool of {bytes} bytes")]
    PoolAllocation { name: &'static str, bytes: usize },

    #[error("Missing data file {0}")]
    MissingData(String),

    #[error("Failed to read data file {path}: {source}")]
    DataRead {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    List(#[from] CatalogError),

    #[error("{0}")]
    Other(String),
}

/// Collaborators the sequencer calls, in call order
pub trait StartupServices {
    fn create_small_pool(&mut self) -> Result<(), ServiceError>;

    fn create_large_pool(&mut self) -> Result<(), ServiceError>;

    /// Loads every DAT file, returns how many were loaded
    fn load_dats(&mut self) -> Result<usize, ServiceError>;

    fn read_list(&mut self) -> Result<Catalog, ServiceError>;

    /// Drawing helper setup; its outcome is not counted
    fn init_graphics(&mut self);
}

/// Steps whose outcome is part of the startup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Gpu,
    DriveRecovery,
    SmallPool,
    LargePool,
    DatLoad,
    ListLoad,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Gpu => write!(f, "GPU"),
            Subsystem::DriveRecovery => write!(f, "drive recovery"),
            Subsystem::SmallPool => write!(f, "small texture pool"),
            Subsystem::LargePool => write!(f, "large texture pool"),
            Subsystem::DatLoad => write!(f, "DAT load"),
            Subsystem::ListLoad => write!(f, "list load"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub subsystem: Subsystem,
    /// Error message when the step failed
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    outcomes: Vec<Outcome>,
    disc: Option<DiscType>,
}

impl StartupReport {
    pub fn record<T, E: fmt::Display>(&mut self, subsystem: Subsystem, result: &Result<T, E>) {
        let error = match result {
            Ok(_) => {
                info!("{} ok", subsystem);
                None
            }
            Err(e) => {
                error!("{} failed: {}", subsystem, e);
                Some(e.to_string())
            }
        };
        self.outcomes.push(Outcome { subsystem, error });
    }

    /// Appends the outcomes of a later report
    pub fn absorb(&mut self, other: StartupReport) {
        self.outcomes.extend(other.outcomes);
        if other.disc.is_some() {
            self.disc = other.disc;
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    /// Aggregate result, the number of failed steps
    pub fn result(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.result() == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Media type seen by drive recovery, if it completed
    pub fn disc(&self) -> Option<DiscType> {
        self.disc
    }
}

/// What startup hands to the frame loop
#[derive(Debug)]
pub struct Startup {
    pub report: StartupReport,
    pub catalog: Catalog,
}

pub struct StartupSequencer {
    services: Box<dyn StartupServices>,
    drive: Box<dyn DiscDrive>,
    policy: PollPolicy,
}

impl StartupSequencer {
    pub fn new(
        services: Box<dyn StartupServices>,
        drive: Box<dyn DiscDrive>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            services,
            drive,
            policy,
        }
    }

    pub fn run<S: UiStrategy>(&mut self, registry: &mut StrategyRegistry<S>) -> Startup {
        let mut report = StartupReport::default();

        info!("Recovering optical drive");
        let drive = recover_drive(self.drive.as_mut(), self.policy);
        report.record(Subsystem::DriveRecovery, &drive);
        report.disc = drive.ok();

        let small = self.services.create_small_pool();
        report.record(Subsystem::SmallPool, &small);
        let large = self.services.create_large_pool();
        report.record(Subsystem::LargePool, &large);

        let dats = self.services.load_dats();
        if let Ok(count) = dats {
            info!("Loaded {} DAT files", count);
        }
        report.record(Subsystem::DatLoad, &dats);

        let list = self.services.read_list();
        report.record(Subsystem::ListLoad, &list);
        let catalog = list.unwrap_or_default();

        self.services.init_graphics();

        let ctx = UiContext::new(&catalog);
        registry.set_default(&ctx);
        registry.active_mut().initialize(&ctx);
        registry.active_mut().activate(&ctx);

        if report.is_success() {
            info!("Startup complete, {} games listed", catalog.len());
        } else {
            warn!("Startup finished with {} failed steps", report.result());
        }

        Startup { report, catalog }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GameEntry;
    use crate::controller::LogicalEvent;
    use crate::gpu::Canvas;
    use crate::storage::SimulatedDrive;
    use crate::ui::{Strategy, UiKind, UiRequest};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    #[derive(Default)]
    struct FakeServices {
        log: Log,
        fail: Option<&'static str>,
    }

    impl FakeServices {
        fn step(&self, name: &'static str) -> Result<(), ServiceError> {
            self.log.borrow_mut().push(name);
            if self.fail == Some(name) {
                Err(ServiceError::Other(format!("{} broke", name)))
            } else {
                Ok(())
            }
        }
    }

    impl StartupServices for FakeServices {
        fn create_small_pool(&mut self) -> Result<(), ServiceError> {
            self.step("small")
        }
        fn create_large_pool(&mut self) -> Result<(), ServiceError> {
            self.step("large")
        }
        fn load_dats(&mut self) -> Result<usize, ServiceError> {
            self.step("dats").map(|_| 2)
        }
        fn read_list(&mut self) -> Result<Catalog, ServiceError> {
            self.step("list")?;
            Ok(Catalog::new(vec![GameEntry {
                name: "Test".into(),
                product: "T-1".into(),
                disc: "1/1".into(),
            }]))
        }
        fn init_graphics(&mut self) {
            self.log.borrow_mut().push("graphics");
        }
    }

    // Counts lifecycle calls
    struct Counting {
        kind: UiKind,
        inits: usize,
        activations: usize,
    }

    impl Counting {
        fn new(kind: UiKind) -> Self {
            Self {
                kind,
                inits: 0,
                activations: 0,
            }
        }
    }

    impl UiStrategy for Counting {
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

    fn sequencer(fail: Option<&'static str>, log: &Log) -> StartupSequencer {
        let services = FakeServices {
            log: log.clone(),
            fail,
        };
        StartupSequencer::new(
            Box::new(services),
            Box::new(SimulatedDrive::new(2, DiscType::Gdrom)),
            PollPolicy::Bounded(10),
        )
    }

    #[test]
    fn test_all_steps_succeed() {
        let log = Log::default();
        let mut registry = StrategyRegistry::standard();
        let startup = sequencer(None, &log).run(&mut registry);

        assert_eq!(startup.report.result(), 0);
        assert_eq!(startup.report.exit_code(), 0);
        assert_eq!(startup.report.disc(), Some(DiscType::Gdrom));
        assert_eq!(startup.catalog.len(), 1);
        assert_eq!(*log.borrow(), vec!["small", "large", "dats", "list", "graphics"]);
        assert_eq!(registry.active().kind(), UiKind::Grid3);
    }

    #[test]
    fn test_default_strategy_initialized_once_and_activated_twice() {
        let log = Log::default();
        let mut registry = StrategyRegistry::new(vec![
            Counting::new(UiKind::Grid3),
            Counting::new(UiKind::ListDesc),
        ])
        .unwrap();
        sequencer(None, &log).run(&mut registry);

        assert_eq!(registry.active_index(), 0);
        let default = registry.get(0).unwrap();
        assert_eq!((default.inits, default.activations), (1, 2));
        let other = registry.get(1).unwrap();
        assert_eq!((other.inits, other.activations), (0, 0));
    }

    #[test]
    fn test_failed_steps_still_select_default_strategy() {
        let log = Log::default();
        let mut registry = StrategyRegistry::new(vec![
            Counting::new(UiKind::Grid3),
            Counting::new(UiKind::ListDesc),
        ])
        .unwrap();
        let startup = sequencer(Some("dats"), &log).run(&mut registry);

        assert_eq!(startup.report.result(), 1);
        let default = registry.get(0).unwrap();
        assert_eq!((default.inits, default.activations), (1, 2));
    }

    #[test]
    fn test_each_failure_is_counted_and_later_steps_still_run() {
        for step in ["small", "large", "dats", "list"] {
            let log = Log::default();
            let mut registry = StrategyRegistry::standard();
            let startup = sequencer(Some(step), &log).run(&mut registry);

            assert_eq!(startup.report.result(), 1, "{}", step);
            assert_eq!(startup.report.exit_code(), 1);
            assert_eq!(log.borrow().len(), 5);
        }
    }

    #[test]
    fn test_failed_list_leaves_empty_catalog() {
        let log = Log::default();
        let mut registry = StrategyRegistry::<Strategy>::standard();
        let startup = sequencer(Some("list"), &log).run(&mut registry);
        assert!(startup.catalog.is_empty());
        let failed: Vec<_> = startup.report.failures().map(|o| o.subsystem).collect();
        assert_eq!(failed, vec![Subsystem::ListLoad]);
    }

    #[test]
    fn test_unsettled_drive_is_a_failure() {
        let log = Log::default();
        let mut sequencer = StartupSequencer::new(
            Box::new(FakeServices {
                log: log.clone(),
                fail: None,
            }),
            Box::new(SimulatedDrive::new(100, DiscType::Gdrom)),
            PollPolicy::Bounded(5),
        );
        let startup = sequencer.run(&mut StrategyRegistry::standard());
        assert_eq!(startup.report.result(), 1);
        assert_eq!(startup.report.disc(), None);
        assert_eq!(
            startup.report.failures().next().map(|o| o.subsystem),
            Some(Subsystem::DriveRecovery)
        );
    }
}
