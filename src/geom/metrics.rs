//! Opt-in timing hooks for wing construction.
//!
//! Timing is only collected with the `mesh_engine_metrics` feature. Without
//! it every call compiles down to running the closure.

/// Phases of wing construction that are timed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Airfoil station sampling.
    Sampling,
    /// Side surface generation between profiles.
    Loft,
    /// Cap polygon triangulation.
    Triangulation,
    /// Welding, culling and orientation repair.
    Welding,
    /// Edge topology and diagnostics.
    Diagnostics,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeomTimingReport {
    pub sampling_ns: u64,
    pub loft_ns: u64,
    pub triangulation_ns: u64,
    pub welding_ns: u64,
    pub diagnostics_ns: u64,
}

impl GeomTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.sampling_ns
            .saturating_add(self.loft_ns)
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.welding_ns)
            .saturating_add(self.diagnostics_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing geometry operations.
///
/// Call [`begin`](Self::begin), wrap work in [`time`](Self::time), then read
/// the report with [`end`](Self::end). `end` returns `None` when the feature
/// is disabled.
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(feature = "mesh_engine_metrics")]
    report: GeomTimingReport,
}

impl GeomMetrics {
    pub fn begin(&mut self) {
        #[cfg(feature = "mesh_engine_metrics")]
        {
            self.report = GeomTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(feature = "mesh_engine_metrics")]
        {
            Some(self.report.clone())
        }
        #[cfg(not(feature = "mesh_engine_metrics"))]
        {
            None
        }
    }

    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(feature = "mesh_engine_metrics")]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(feature = "mesh_engine_metrics"))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(feature = "mesh_engine_metrics")]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Sampling => &mut self.report.sampling_ns,
            TimingBucket::Loft => &mut self.report.loft_ns,
            TimingBucket::Triangulation => &mut self.report.triangulation_ns,
            TimingBucket::Welding => &mut self.report.welding_ns,
            TimingBucket::Diagnostics => &mut self.report.diagnostics_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
