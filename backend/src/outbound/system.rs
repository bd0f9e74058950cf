//! Host and process statistics gathered through `sysinfo`.
//!
//! Figures the platform cannot report come back as zero rather than as an
//! error, so the admin dashboard always renders.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use sysinfo::{Disk, Disks, Pid, System};
use tracing::warn;

use crate::domain::ports::{CapacityStats, CpuStats, ProcessMemory, SystemProbe, SystemStats};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// [`SystemProbe`] backed by a shared, refreshed-on-demand [`System`].
#[derive(Clone)]
pub struct SysinfoSystemProbe {
    system: Arc<Mutex<System>>,
}

impl Default for SysinfoSystemProbe {
    fn default() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Used and total megabytes from byte counts.
fn capacity(total_bytes: u64, available_bytes: u64) -> CapacityStats {
    CapacityStats::new(
        megabytes(total_bytes.saturating_sub(available_bytes)),
        megabytes(total_bytes),
    )
}

/// CPU figures from the one-minute load and the core count.
fn cpu_stats(load_average: f64, cores: usize) -> CpuStats {
    let cores = cores.max(1);
    CpuStats {
        usage: (load_average / cores as f64 * 100.0).clamp(0.0, 100.0),
        cores,
        load_average,
    }
}

/// Capacity of the root filesystem, or of every disk when `/` is not listed.
fn disk_capacity(disks: &[Disk]) -> CapacityStats {
    let root = disks
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"));
    let (total, available) = match root {
        Some(disk) => (disk.total_space(), disk.available_space()),
        None => disks.iter().fold((0, 0), |(total, available), disk| {
            (total + disk.total_space(), available + disk.available_space())
        }),
    };
    capacity(total, available)
}

impl SysinfoSystemProbe {
    fn with_system<T>(&self, read: impl FnOnce(&mut System) -> T) -> T {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        read(&mut system)
    }
}

#[async_trait]
impl SystemProbe for SysinfoSystemProbe {
    async fn system_stats(&self) -> SystemStats {
        let (memory, cores) = self.with_system(|system| {
            system.refresh_memory();
            system.refresh_cpu();
            (
                capacity(system.total_memory(), system.available_memory()),
                system.cpus().len(),
            )
        });
        let disks = Disks::new_with_refreshed_list();
        SystemStats {
            cpu: cpu_stats(System::load_average().one, cores),
            memory,
            disk: disk_capacity(disks.list()),
        }
    }

    async fn process_memory(&self) -> Option<ProcessMemory> {
        let pid: Pid = sysinfo::get_current_pid()
            .inspect_err(|error| warn!(%error, "current process id unavailable"))
            .ok()?;
        self.with_system(|system| {
            system.refresh_process(pid);
            system.process(pid).map(|process| ProcessMemory {
                resident_kb: process.memory() / 1024,
                virtual_kb: process.virtual_memory() / 1024,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const GIB: u64 = 1024 * 1024 * 1024;

    #[rstest]
    fn capacity_counts_unavailable_bytes_as_used() {
        let memory = capacity(2 * GIB, GIB);
        assert!((memory.total - 2048.0).abs() < 1e-9);
        assert!((memory.used - 1024.0).abs() < 1e-9);
        assert!((memory.percentage - 50.0).abs() < 1e-9);
    }

    #[rstest]
    fn capacity_of_nothing_is_zero() {
        assert_eq!(capacity(0, 0), CapacityStats::default());
    }

    #[rstest]
    #[case(2.0, 4, 50.0)]
    #[case(9.0, 4, 100.0)]
    #[case(0.5, 0, 50.0)]
    fn cpu_usage_is_load_per_core(#[case] load: f64, #[case] cores: usize, #[case] usage: f64) {
        let cpu = cpu_stats(load, cores);
        assert!(cpu.cores >= 1);
        assert!((cpu.usage - usage).abs() < 1e-9);
    }

    #[rstest]
    #[tokio::test]
    async fn host_figures_are_reported() {
        let host = SysinfoSystemProbe::default();
        let stats = host.system_stats().await;
        assert!(stats.cpu.cores >= 1);
        assert!(stats.memory.total >= stats.memory.used);
        assert!((0.0..=100.0).contains(&stats.memory.percentage));
    }

    #[rstest]
    #[tokio::test]
    async fn own_process_memory_is_visible() {
        let host = SysinfoSystemProbe::default();
        let memory = host.process_memory().await.expect("process memory");
        assert!(memory.resident_kb > 0);
    }
}
