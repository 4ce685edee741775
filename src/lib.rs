//! Game launcher menu core: controller input, swappable menu strategies, a
//! GPU-paced frame loop and the boot sequence that brings the drive and data up.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod gpu;
pub mod scheduler;
pub mod startup;
pub mod storage;
pub mod ui;
