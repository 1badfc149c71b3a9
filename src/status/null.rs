use async_trait::async_trait;

use super::{CountdownContent, DismissalPolicy, LiveStatusSurface, SurfaceHandle};

/// Stand-in surface for builds or configurations without a live status
/// capability. Accepts every request and renders nothing.
pub struct NullStatusSurface;

#[async_trait]
impl LiveStatusSurface for NullStatusSurface {
    async fn request(&self, _initial: CountdownContent) -> anyhow::Result<SurfaceHandle> {
        Ok(SurfaceHandle::new(0))
    }

    async fn end(&self, _handle: SurfaceHandle, _policy: DismissalPolicy) {}
}
