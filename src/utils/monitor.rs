//! Per-phase build report: wall time, how many items a phase produced and
//! how many bytes of HTML it handled. With the `cli` feature the process
//! resident memory is sampled through sysinfo as well.

use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub phase: &'static str,
    pub items: usize,
    pub bytes: usize,
    pub elapsed: Duration,
    pub memory_mb: Option<u64>,
}

#[cfg(feature = "cli")]
struct ProcessProbe {
    system: Mutex<System>,
    pid: Pid,
}

#[cfg(feature = "cli")]
impl ProcessProbe {
    fn current() -> Option<Self> {
        let pid = sysinfo::get_current_pid().ok()?;
        Some(Self {
            system: Mutex::new(System::new()),
            pid,
        })
    }

    fn memory_mb(&self) -> Option<u64> {
        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        system.process(self.pid).map(|p| p.memory() / 1024 / 1024)
    }
}

pub struct BuildMonitor {
    enabled: bool,
    started: Instant,
    phase_started: Mutex<Instant>,
    phases: Mutex<Vec<PhaseReport>>,
    #[cfg(feature = "cli")]
    probe: Option<ProcessProbe>,
}

impl BuildMonitor {
    pub fn new(enabled: bool) -> Self {
        #[cfg(feature = "cli")]
        let probe = if enabled {
            let probe = ProcessProbe::current();
            if probe.is_none() {
                tracing::warn!("Could not determine current PID, memory stats disabled");
            }
            probe
        } else {
            None
        };

        let now = Instant::now();
        Self {
            enabled,
            started: now,
            phase_started: Mutex::new(now),
            phases: Mutex::new(Vec::new()),
            #[cfg(feature = "cli")]
            probe,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "cli")]
    fn memory_mb(&self) -> Option<u64> {
        self.probe.as_ref()?.memory_mb()
    }

    #[cfg(not(feature = "cli"))]
    fn memory_mb(&self) -> Option<u64> {
        None
    }

    /// Close the running phase and start timing the next one.
    pub fn record(&self, phase: &'static str, items: usize, bytes: usize) {
        if !self.enabled {
            return;
        }

        let elapsed = match self.phase_started.lock() {
            Ok(mut started) => {
                let elapsed = started.elapsed();
                *started = Instant::now();
                elapsed
            }
            Err(_) => return,
        };

        let report = PhaseReport {
            phase,
            items,
            bytes,
            elapsed,
            memory_mb: self.memory_mb(),
        };
        tracing::info!(
            "📊 {} - {} items, {} bytes in {:?}{}",
            report.phase,
            report.items,
            report.bytes,
            report.elapsed,
            report
                .memory_mb
                .map(|mb| format!(", memory {}MB", mb))
                .unwrap_or_default()
        );

        if let Ok(mut phases) = self.phases.lock() {
            phases.push(report);
        }
    }

    pub fn phases(&self) -> Vec<PhaseReport> {
        self.phases
            .lock()
            .map(|phases| phases.clone())
            .unwrap_or_default()
    }

    pub fn log_summary(&self) {
        if !self.enabled {
            return;
        }

        let phases = self.phases();
        let peak = phases.iter().filter_map(|p| p.memory_mb).max();
        tracing::info!(
            "📊 Build finished - {} phases in {:?}{}",
            phases.len(),
            self.started.elapsed(),
            peak.map(|mb| format!(", peak memory {}MB", mb))
                .unwrap_or_default()
        );
    }
}

impl Default for BuildMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
