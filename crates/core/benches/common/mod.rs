use std::env;
use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;

/// Grid sizes and sampling for the assembler bench, picked by `TABLEGRID_BENCH_TIER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerTier {
    Quick,
    Full,
}

impl AssemblerTier {
    pub fn from_env() -> Self {
        match env::var("TABLEGRID_BENCH_TIER").as_deref() {
            Ok("full") => AssemblerTier::Full,
            _ => AssemblerTier::Quick,
        }
    }

    /// Square grid sizes (rows = cols) to assemble.
    pub fn grid_sizes(self) -> &'static [usize] {
        match self {
            AssemblerTier::Quick => &[4, 16],
            AssemblerTier::Full => &[4, 16, 48, 96],
        }
    }

    /// Sample count and measurement time for `group`.
    pub fn configure<M: Measurement>(self, group: &mut BenchmarkGroup<'_, M>) {
        let (samples, seconds) = match self {
            AssemblerTier::Quick => (20, 2),
            AssemblerTier::Full => (50, 5),
        };
        group.sample_size(samples);
        group.measurement_time(Duration::from_secs(seconds));
    }
}
