#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![forbid(unsafe_code)]
//! Shared test setup for the rtti crates.
//!
//! Tests opt in with `#[rtti_testhelpers::test]`, which installs the tracing
//! subscriber once per process and wraps the test body in a span named after
//! the test. Set `RTTI_LOG` to a [`Targets`] directive (`rtti_core=trace`)
//! to see descriptor builds and forward-placeholder hand-outs.

pub use rtti_testhelpers_macros::test;

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter used by [`setup`].
pub const LOG_ENV: &str = "RTTI_LOG";

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::INFO));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_timer(Uptime)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Installs the process-wide tracing subscriber.
///
/// Safe to call from every test; only the first call does any work.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

/// Enters a span named after the running test.
///
/// Returned by value so the generated test body keeps it alive until the
/// end of the test.
pub fn enter_test(name: &'static str) -> tracing::span::EnteredSpan {
    tracing::info_span!("test", name).entered()
}

/// Counts lifecycle events of a test fixture type.
///
/// Meant to live in a `static` next to the fixture; the fixture bumps the
/// counters from its `Default`, `Clone` and `Drop` impls.
#[derive(Debug)]
pub struct LifecycleCounter {
    constructed: AtomicUsize,
    copied: AtomicUsize,
    dropped: AtomicUsize,
}

/// Point-in-time copy of a [`LifecycleCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    /// Number of default constructions.
    pub constructed: usize,
    /// Number of clones.
    pub copied: usize,
    /// Number of drops.
    pub dropped: usize,
}

impl Lifecycle {
    /// Constructions plus copies not yet matched by a drop.
    pub fn alive(&self) -> isize {
        (self.constructed + self.copied) as isize - self.dropped as isize
    }
}

impl LifecycleCounter {
    /// A counter with every count at zero.
    pub const fn new() -> Self {
        Self {
            constructed: AtomicUsize::new(0),
            copied: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Records a default construction.
    pub fn construct(&self) {
        self.constructed.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a clone.
    pub fn copy(&self) {
        self.copied.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a drop.
    pub fn drop_one(&self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }

    /// Reads all counts.
    pub fn snapshot(&self) -> Lifecycle {
        Lifecycle {
            constructed: self.constructed.load(Ordering::SeqCst),
            copied: self.copied.load(Ordering::SeqCst),
            dropped: self.dropped.load(Ordering::SeqCst),
        }
    }
}

impl Default for LifecycleCounter {
    fn default() -> Self {
        Self::new()
    }
}
