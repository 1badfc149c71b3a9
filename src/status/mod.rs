mod countdown;
mod null;

pub use countdown::CountdownStatusSurface;
pub use null::NullStatusSurface;

use async_trait::async_trait;

/// Initial content handed to the surface at activation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownContent {
    pub total_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissalPolicy {
    Immediate,
    Default,
}

/// Opaque handle for one surface activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Glanceable companion surface mirroring the scheduler's state. A pure sink:
/// nothing flows back into the scheduler.
#[async_trait]
pub trait LiveStatusSurface: Send + Sync + 'static {
    async fn request(&self, initial: CountdownContent) -> anyhow::Result<SurfaceHandle>;

    async fn end(&self, handle: SurfaceHandle, policy: DismissalPolicy);
}
