//! Host probes behind `/local` and `/speed`

mod disk;
mod speedtest;

pub use disk::{disk_usage, DiskUsage};
pub use speedtest::{megabits_per_second, SpeedReport, Speedtest};
