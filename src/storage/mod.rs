//! # Optical Drive Recovery
//!
//! The drive may still be spinning up, or be left in a stale state by whatever ran
//! before us. Before any file is opened the drive is brought to a known state:
//!
//! ```text
//! PollingBeforeReset ──► Resetting ──► PollingAfterReset ──► Ready
//! ```
//!
//! Both polling phases spin until the drive reports a settled status (paused,
//! standby or playing). By default there is no timeout; a [`PollPolicy::Bounded`]
//! policy turns a drive that never settles into [`RecoveryError::NeverSettled`].
//!
//! The drive itself is borrowed per step rather than stored in the machine so
//! the caller keeps ownership of the hardware handle.

pub mod simulated;

use serde::{Deserialize, Serialize};
use statum::{machine, state};
use std::fmt;
use tracing::{debug, info, warn};

pub use simulated::SimulatedDrive;

/// Drive status as reported by the status query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStatus {
    ReadFail,
    Busy,
    Paused,
    Standby,
    Playing,
    Seeking,
    Scanning,
    Open,
    NoDisc,
    Retry,
    Error,
}

impl DriveStatus {
    /// Paused, standby and playing mean the drive accepts commands
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            DriveStatus::Paused | DriveStatus::Standby | DriveStatus::Playing
        )
    }
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriveStatus::ReadFail => "READ_FAIL",
            DriveStatus::Busy => "BUSY",
            DriveStatus::Paused => "PAUSED",
            DriveStatus::Standby => "STANDBY",
            DriveStatus::Playing => "PLAYING",
            DriveStatus::Seeking => "SEEKING",
            DriveStatus::Scanning => "SCANNING",
            DriveStatus::Open => "OPEN",
            DriveStatus::NoDisc => "NO_DISC",
            DriveStatus::Retry => "RETRY",
            DriveStatus::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Media type in the drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscType {
    CdDa,
    CdRom,
    CdRomXa,
    CdI,
    Gdrom,
    #[default]
    Unknown,
}

impl fmt::Display for DiscType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscType::CdDa => "CD-DA",
            DiscType::CdRom => "CD-ROM",
            DiscType::CdRomXa => "CD-ROM XA",
            DiscType::CdI => "CD-i",
            DiscType::Gdrom => "GD-ROM",
            DiscType::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// One answer of the status query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveReport {
    pub status: DriveStatus,
    pub disc: DiscType,
}

// Drive errors
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Drive re-initialization failed: {0}")]
    ReinitFailed(String),
}

/// Hardware interface of the optical drive
pub trait DiscDrive {
    fn status(&mut self) -> DriveReport;

    /// Issues the drive re-initialization command
    fn reinitialize(&mut self) -> Result<(), DriveError>;

    /// Drops file handles opened before the re-initialization
    fn reset_handles(&mut self);
}

/// How long a polling phase may spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    #[default]
    Unbounded,
    Bounded(u64),
}

impl PollPolicy {
    pub fn from_max_polls(max_polls: Option<u64>) -> Self {
        match max_polls {
            Some(n) => PollPolicy::Bounded(n),
            None => PollPolicy::Unbounded,
        }
    }

    fn exhausted(self, polls: u64) -> bool {
        match self {
            PollPolicy::Unbounded => false,
            PollPolicy::Bounded(max) => polls >= max,
        }
    }
}

// Recovery errors
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("Drive never settled after {polls} polls, last status {last}")]
    NeverSettled { polls: u64, last: DriveStatus },
}

#[state]
#[derive(Debug, Clone)]
pub enum RecoveryState {
    PollingBeforeReset,
    Resetting,
    PollingAfterReset,
    Ready,
}

#[machine]
#[derive(Debug)]
pub struct DriveRecovery<S: RecoveryState> {
    policy: PollPolicy,

    // Polls spent in the current phase
    polls: u64,

    last: Option<DriveReport>,
}

impl<S: RecoveryState> DriveRecovery<S> {
    pub fn polls(&self) -> u64 {
        self.polls
    }

    // Spins on the status query until the drive settles or the policy runs out
    fn wait_settled(&mut self, drive: &mut dyn DiscDrive) -> Result<DriveReport, RecoveryError> {
        self.polls = 0;
        loop {
            let report = drive.status();
            self.polls += 1;

            if self.last.map(|r| r.status) != Some(report.status) {
                debug!("Drive status {} after {} polls", report.status, self.polls);
            }
            self.last = Some(report);

            if report.status.is_settled() {
                return Ok(report);
            }
            if self.policy.exhausted(self.polls) {
                return Err(RecoveryError::NeverSettled {
                    polls: self.polls,
                    last: report.status,
                });
            }
            std::hint::spin_loop();
        }
    }
}

impl DriveRecovery<PollingBeforeReset> {
    pub fn create(policy: PollPolicy) -> Self {
        debug!("Creating drive recovery with {:?} polling", policy);
        Self::new(policy, 0, None)
    }

    pub fn settle(
        mut self,
        drive: &mut dyn DiscDrive,
    ) -> Result<DriveRecovery<Resetting>, RecoveryError> {
        let report = self.wait_settled(drive)?;
        info!("Drive settled ({}) before reset", report.status);
        Ok(self.transition())
    }
}

impl DriveRecovery<Resetting> {
    /// Re-initializes the drive and clears stale handles
    ///
    /// A failed re-initialization is logged; the following settle-wait decides
    /// whether the drive is usable.
    pub fn reset(self, drive: &mut dyn DiscDrive) -> DriveRecovery<PollingAfterReset> {
        info!("Re-initializing drive");
        if let Err(e) = drive.reinitialize() {
            warn!("{}", e);
        }
        drive.reset_handles();
        self.transition()
    }
}

impl DriveRecovery<PollingAfterReset> {
    pub fn settle(
        mut self,
        drive: &mut dyn DiscDrive,
    ) -> Result<DriveRecovery<Ready>, RecoveryError> {
        let report = self.wait_settled(drive)?;
        info!("Drive settled ({}) after reset", report.status);
        Ok(self.transition())
    }
}

impl DriveRecovery<Ready> {
    pub fn disc(&self) -> DiscType {
        self.last.map(|r| r.disc).unwrap_or_default()
    }
}

/// Runs the whole recovery sequence and returns the detected media type
pub fn recover_drive(
    drive: &mut dyn DiscDrive,
    policy: PollPolicy,
) -> Result<DiscType, RecoveryError> {
    let ready = DriveRecovery::create(policy)
        .settle(drive)?
        .reset(drive)
        .settle(drive)?;

    let disc = ready.disc();
    info!("Drive ready, disc type {}", disc);
    Ok(disc)
}
