use tracing::debug;

use super::{DiscDrive, DiscType, DriveError, DriveReport, DriveStatus};

/// Host stand-in for the optical drive
///
/// Reports `Busy` for a fixed number of polls after power-on and after every
/// re-initialization, then `Standby` with the configured media type.
#[derive(Debug, Clone)]
pub struct SimulatedDrive {
    busy_polls: u64,
    remaining: u64,
    disc: DiscType,
    reinits: u32,
    handle_resets: u32,
}

impl SimulatedDrive {
    pub fn new(busy_polls: u64, disc: DiscType) -> Self {
        Self {
            busy_polls,
            remaining: busy_polls,
            disc,
            reinits: 0,
            handle_resets: 0,
        }
    }

    pub fn reinits(&self) -> u32 {
        self.reinits
    }

    pub fn handle_resets(&self) -> u32 {
        self.handle_resets
    }
}

impl DiscDrive for SimulatedDrive {
    fn status(&mut self) -> DriveReport {
        if self.remaining > 0 {
            self.remaining -= 1;
            return DriveReport {
                status: DriveStatus::Busy,
                disc: DiscType::Unknown,
            };
        }
        DriveReport {
            status: DriveStatus::Standby,
            disc: self.disc,
        }
    }

    fn reinitialize(&mut self) -> Result<(), DriveError> {
        self.reinits += 1;
        self.remaining = self.busy_polls;
        debug!("Simulated drive spinning up for {} polls", self.busy_polls);
        Ok(())
    }

    fn reset_handles(&mut self) {
        self.handle_resets += 1;
    }
}
