//! # Ledge Render
//!
//! Rendering boundary for the Ledge engine.
//!
//! The simulation never draws. It schedules [`DrawableId`]s into a render
//! queue, and this crate turns finished queues into draws:
//! - **Drawables**: objects with a priority that draw at a position and scale
//! - **Resources**: opaque texture and buffer handles found by id
//! - **Context**: per-context binding cache, rebuilt after context loss
//! - **Exchange**: the mutex-guarded hand-off of frames between threads

pub mod buffer;
pub mod context;
pub mod drawable;
pub mod exchange;
pub mod texture;

pub use buffer::{Buffer, BufferId, BufferLibrary};
pub use context::{ContextStats, DrawCommand, RenderContext};
pub use drawable::{DrawableLibrary, DrawableObject, Sprite};
pub use exchange::FrameExchange;
pub use texture::{Texture, TextureId, TextureLibrary};

use std::time::Duration;

use ledge_core::render_queue::{DrawableId, RenderQueue};
use thiserror::Error;

/// Renderer errors
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Texture {0} not found")]
    TextureNotFound(u32),

    #[error("Buffer {0} not found")]
    BufferNotFound(u32),

    #[error("Texture {0} is not resident in the context")]
    NotResident(u32),

    #[error("The {library} library is full ({capacity} entries)")]
    LibraryFull {
        library: &'static str,
        capacity: usize,
    },
}

/// Result type for renderer operations
pub type RendererResult<T> = Result<T, RendererError>;

/// Outcome of drawing one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Elements drawn successfully
    pub drawn: u32,
    /// Draw calls issued to the context
    pub draw_calls: u32,
    /// Binds that changed state
    pub texture_binds: u32,
    /// Elements whose drawable is not registered
    pub missing: u32,
    /// Elements whose drawable failed to draw
    pub failed: u32,
}

/// Draws finished frames through a [`RenderContext`]
#[derive(Debug)]
pub struct Renderer {
    context: RenderContext,
    drawables: DrawableLibrary,
    /// Frame currently being drawn, swapped with the exchange
    frame: RenderQueue,
    frames_drawn: u64,
}

impl Renderer {
    /// Create a renderer that draws frames of up to `queue_capacity` elements
    pub fn new(context: RenderContext, drawables: DrawableLibrary, queue_capacity: usize) -> Self {
        Self {
            context,
            drawables,
            frame: RenderQueue::new(queue_capacity),
            frames_drawn: 0,
        }
    }

    /// Draw every element of `frame` in queue order
    ///
    /// Finished queues are sorted by priority, so queue order is priority
    /// order. Elements without a registered drawable are skipped.
    pub fn draw_frame(&mut self, frame: &RenderQueue) -> FrameStats {
        let _span = tracing::debug_span!("draw_frame", elements = frame.len()).entered();
        debug_assert!(
            frame.elements().is_sorted_by_key(|element| element.priority),
            "frame was not finished before drawing"
        );

        self.context.begin_frame();
        let mut stats = FrameStats::default();
        for element in frame.elements() {
            let Some(drawable) = self.drawables.get_mut(element.drawable) else {
                log::trace!("No drawable registered as {:?}", element.drawable);
                stats.missing += 1;
                continue;
            };
            match drawable.draw(
                &mut self.context,
                element.position.x,
                element.position.y,
                element.scale.x,
                element.scale.y,
            ) {
                Ok(()) => stats.drawn += 1,
                Err(err) => {
                    log::debug!("Drawable {:?} failed: {err}", element.drawable);
                    stats.failed += 1;
                }
            }
        }

        let context_stats = self.context.stats();
        stats.draw_calls = context_stats.draw_calls;
        stats.texture_binds = context_stats.texture_binds;
        self.frames_drawn += 1;
        stats
    }

    /// Wait up to `timeout` for a frame from `exchange` and draw it
    pub fn render_next(&mut self, exchange: &FrameExchange, timeout: Duration) -> Option<FrameStats> {
        let mut frame = std::mem::replace(&mut self.frame, RenderQueue::new(0));
        let stats = exchange
            .take(&mut frame, timeout)
            .then(|| self.draw_frame(&frame));
        self.frame = frame;
        stats
    }

    /// Recover from a lost graphics context
    ///
    /// Returns how many resources were uploaded again.
    pub fn context_lost(&mut self) -> usize {
        self.context.invalidate();
        self.context.restore()
    }

    pub fn register(&mut self, id: DrawableId, drawable: impl DrawableObject + 'static) {
        if self.drawables.insert(id, drawable).is_some() {
            log::debug!("Replaced drawable {id:?}");
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }

    pub fn drawables(&self) -> &DrawableLibrary {
        &self.drawables
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn renderer() -> Renderer {
        let mut context = RenderContext::default();
        context.textures_mut().allocate(TextureId(1), "hero").unwrap();
        context.textures_mut().allocate(TextureId(2), "tiles").unwrap();
        context.upload_pending();

        let mut renderer = Renderer::new(context, DrawableLibrary::new(), 16);
        renderer.register(DrawableId(10), Sprite::new(TextureId(1), Vec2::splat(32.0)));
        renderer.register(DrawableId(20), Sprite::new(TextureId(2), Vec2::splat(16.0)));
        renderer.register(DrawableId(21), Sprite::new(TextureId(2), Vec2::splat(16.0)));
        renderer
    }

    fn queue(draws: &[(u32, i32)]) -> RenderQueue {
        let mut queue = RenderQueue::new(16);
        for &(id, priority) in draws {
            queue.schedule(DrawableId(id), priority, Vec2::new(id as f32, 0.0), Vec2::ONE);
        }
        queue.finish_frame();
        queue
    }

    #[test]
    fn test_draws_in_priority_order() {
        let mut renderer = renderer();
        let stats = renderer.draw_frame(&queue(&[(10, 5), (20, 1), (21, 1)]));
        assert_eq!(stats.drawn, 3);
        assert_eq!(stats.draw_calls, 3);
        // The two tile draws share a bind
        assert_eq!(stats.texture_binds, 2);

        let xs: Vec<f32> = renderer
            .context()
            .commands()
            .iter()
            .map(|command| command.position.x)
            .collect();
        assert_eq!(xs, vec![20.0, 21.0, 10.0]);
    }

    #[test]
    fn test_missing_drawable_is_skipped() {
        let mut renderer = renderer();
        let stats = renderer.draw_frame(&queue(&[(99, 0), (10, 1)]));
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.drawn, 1);
    }

    #[test]
    fn test_context_loss() {
        let mut renderer = renderer();
        renderer.context_mut().invalidate();
        let stats = renderer.draw_frame(&queue(&[(10, 0)]));
        assert_eq!(stats.failed, 1);

        renderer.context_lost();
        let stats = renderer.draw_frame(&queue(&[(10, 0)]));
        assert_eq!(stats.drawn, 1);
        assert_eq!(renderer.context().generation(), 2);
    }

    #[test]
    fn test_render_from_exchange() {
        let mut renderer = renderer();
        let exchange = FrameExchange::new(16);
        assert!(renderer.render_next(&exchange, Duration::from_millis(1)).is_none());

        exchange.publish(&mut queue(&[(20, 0)]));
        let stats = renderer.render_next(&exchange, Duration::from_millis(1)).unwrap();
        assert_eq!(stats.drawn, 1);
        assert_eq!(renderer.frames_drawn(), 1);
    }
}
