mod debug_handle;
mod device_handle;
mod event_handle;
mod scene_handle;

pub use debug_handle::*;
pub use device_handle::*;
pub use event_handle::*;
pub use scene_handle::*;

use std::sync::Arc;

use crate::bus::HubBus;

#[derive(Clone)]
pub struct HubState {
    pub bus: Arc<HubBus>,
}
