use color_eyre::{eyre::eyre, Result};
use discmenu::config::AppConfig;
use discmenu::controller::{GamepadSampler, InputTranslator, NoController, PeripheralSampler};
use discmenu::gpu::HeadlessGpu;
use discmenu::scheduler::{FrameLoop, FrameStats, LoopOutcome};
use discmenu::startup::{HostServices, StartupSequencer};
use discmenu::storage::SimulatedDrive;
use discmenu::ui::StrategyRegistry;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    setup()?;

    let config_path = AppConfig::default_path();
    let config = AppConfig::load_or_create(&config_path)
        .map_err(|e| eyre!("Failed to load configuration: {}", e))?;
    setup_logging(config.log_level());
    info!("Using configuration at {}", config_path.display());

    let sampler: Box<dyn PeripheralSampler> = match GamepadSampler::create() {
        Ok(sampler) => Box::new(sampler.initialize()),
        Err(e) => {
            warn!("{}, running without controller input", e);
            Box::new(NoController)
        }
    };

    let frame_loop = FrameLoop::create(
        StrategyRegistry::standard(),
        sampler,
        InputTranslator::new(config.translator_settings()),
        Box::new(HeadlessGpu::new(config.headless_settings())),
        config.pvr_params(),
        FrameStats::new(config.stats_interval()),
    );

    let mut sequencer = StartupSequencer::new(
        Box::new(HostServices::new(config.host_settings())),
        Box::new(SimulatedDrive::new(
            config.drive.settle_after_polls,
            config.drive.disc,
        )),
        config.poll_policy(),
    );

    match frame_loop.start(&mut sequencer) {
        LoopOutcome::Running(running) => {
            // only returns on a GPU failure
            let err = match running.run() {
                Ok(never) => match never {},
                Err(e) => e,
            };
            Err(eyre!("Frame loop failed: {}", err))
        }
        LoopOutcome::Halted(halted) => {
            for outcome in halted.report().failures() {
                error!(
                    "{}: {}",
                    outcome.subsystem,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
            std::process::exit(halted.exit_code());
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    Ok(())
}

fn setup_logging(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
