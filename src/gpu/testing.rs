//! In-memory GPU for unit tests

use super::{Gpu, GpuError, ListKind, Primitive, PvrParams};

/// Accepts every call and keeps the submitted primitives
#[derive(Default)]
pub(crate) struct CollectingGpu {
    pub primitives: Vec<Primitive>,
}

impl CollectingGpu {
    pub fn labels(&self) -> Vec<&str> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Gpu for CollectingGpu {
    fn init(&mut self, _params: &PvrParams) -> Result<(), GpuError> {
        Ok(())
    }
    fn wait_ready(&mut self) -> Result<(), GpuError> {
        Ok(())
    }
    fn scene_begin(&mut self) -> Result<(), GpuError> {
        Ok(())
    }
    fn list_begin(&mut self, _list: ListKind) -> Result<(), GpuError> {
        Ok(())
    }
    fn submit(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }
    fn list_finish(&mut self) -> Result<(), GpuError> {
        Ok(())
    }
    fn scene_finish(&mut self) -> Result<(), GpuError> {
        Ok(())
    }
}
