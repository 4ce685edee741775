use super::{Color, Gpu, Primitive, Rect};

pub const SCREEN_WIDTH: f32 = 640.0;
pub const SCREEN_HEIGHT: f32 = 480.0;

const DEPTH_BASE: f32 = 1.0;
const DEPTH_STEP: f32 = 0.01;

/// Per-frame z allocator
///
/// Every primitive gets a slightly larger z than the one before so later draws
/// sit on top. Reset at the start of every frame.
#[derive(Debug, Clone)]
pub struct DepthCounter {
    next: f32,
}

impl Default for DepthCounter {
    fn default() -> Self {
        Self { next: DEPTH_BASE }
    }
}

impl DepthCounter {
    pub fn reset(&mut self) {
        self.next = DEPTH_BASE;
    }

    pub fn next(&mut self) -> f32 {
        let z = self.next;
        self.next += DEPTH_STEP;
        z
    }
}

/// Drawing surface handed to a UI strategy while the frame's list is open
pub struct Canvas<'a> {
    gpu: &'a mut dyn Gpu,
    depth: &'a mut DepthCounter,
    primitives: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(gpu: &'a mut dyn Gpu, depth: &'a mut DepthCounter) -> Self {
        Self {
            gpu,
            depth,
            primitives: 0,
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let z = self.depth.next();
        self.push(Primitive::Quad { rect, z, color });
    }

    /// Four thin quads around `rect`
    pub fn outline(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness;
        self.fill_rect(Rect::new(rect.x, rect.y, rect.w, t), color);
        self.fill_rect(Rect::new(rect.x, rect.y + rect.h - t, rect.w, t), color);
        self.fill_rect(Rect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t), color);
        self.fill_rect(Rect::new(rect.x + rect.w - t, rect.y + t, t, rect.h - 2.0 * t), color);
    }

    pub fn label(&mut self, x: f32, y: f32, text: &str, color: Color) {
        if text.is_empty() {
            return;
        }
        let z = self.depth.next();
        self.push(Primitive::Label {
            x,
            y,
            z,
            color,
            text: text.to_string(),
        });
    }

    /// Primitives pushed through this canvas so far
    pub fn primitives(&self) -> usize {
        self.primitives
    }

    fn push(&mut self, primitive: Primitive) {
        self.primitives += 1;
        self.gpu.submit(primitive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::testing::CollectingGpu;

    #[test]
    fn test_depth_increases_and_resets() {
        let mut depth = DepthCounter::default();
        let a = depth.next();
        let b = depth.next();
        assert!(b > a);
        depth.reset();
        assert_eq!(depth.next(), a);
    }

    #[test]
    fn test_canvas_orders_primitives_by_depth() {
        let mut gpu = CollectingGpu::default();
        let mut depth = DepthCounter::default();
        {
            let mut canvas = Canvas::new(&mut gpu, &mut depth);
            canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color(0xff00_0000));
            canvas.label(1.0, 1.0, "hi", Color(0xffff_ffff));
            canvas.label(1.0, 1.0, "", Color(0xffff_ffff));
            assert_eq!(canvas.primitives(), 2);
        }
        assert_eq!(gpu.primitives.len(), 2);
        assert!(gpu.primitives[1].z() > gpu.primitives[0].z());
    }

    #[test]
    fn test_outline_is_four_quads() {
        let mut gpu = CollectingGpu::default();
        let mut depth = DepthCounter::default();
        let mut canvas = Canvas::new(&mut gpu, &mut depth);
        canvas.outline(Rect::new(10.0, 10.0, 100.0, 50.0), 2.0, Color(0xffff_0000));
        assert_eq!(canvas.primitives(), 4);
    }
}
