//! Render Context
//!
//! Stand-in for one graphics context: it owns the resources uploaded to it,
//! caches bound state so redundant binds are skipped, and records the draws
//! issued during a frame. Losing the context throws away every upload and
//! the binding cache; [`RenderContext::restore`] uploads everything again.

use glam::Vec2;

use crate::buffer::BufferLibrary;
use crate::texture::{TextureId, TextureLibrary};
use crate::{RendererError, RendererResult};

/// One recorded quad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Texture bound when the quad was drawn, 0 for none
    pub gl_texture: u32,
    pub position: Vec2,
    pub size: Vec2,
}

/// Per-frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStats {
    pub draw_calls: u32,
    /// Binds that changed state
    pub texture_binds: u32,
    /// Binds skipped because the texture was already bound
    pub redundant_binds: u32,
}

#[derive(Debug)]
pub struct RenderContext {
    textures: TextureLibrary,
    buffers: BufferLibrary,
    bound_texture: Option<u32>,
    next_gl_name: u32,
    /// Bumped every time the context is lost
    generation: u32,
    commands: Vec<DrawCommand>,
    max_commands: usize,
    stats: ContextStats,
}

impl RenderContext {
    /// Create a context recording up to `max_commands` draws per frame
    pub fn new(textures: TextureLibrary, buffers: BufferLibrary, max_commands: usize) -> Self {
        Self {
            textures,
            buffers,
            bound_texture: None,
            next_gl_name: 1,
            generation: 0,
            commands: Vec::with_capacity(max_commands),
            max_commands,
            stats: ContextStats::default(),
        }
    }

    fn generate_name(&mut self) -> u32 {
        let name = self.next_gl_name;
        self.next_gl_name += 1;
        name
    }

    /// Upload every declared texture and buffer that is not yet resident
    ///
    /// Returns how many resources were uploaded.
    pub fn upload_pending(&mut self) -> usize {
        let mut uploaded = 0;
        let mut next = self.next_gl_name;
        for texture in self.textures.unloaded() {
            texture.gl_name = next;
            texture.loaded = true;
            next += 1;
            uploaded += 1;
        }
        for buffer in self.buffers.unloaded() {
            buffer.gl_name = next;
            buffer.loaded = true;
            next += 1;
            uploaded += 1;
        }
        self.next_gl_name = next;
        if uploaded > 0 {
            log::debug!("Uploaded {uploaded} resource(s)");
        }
        uploaded
    }

    /// Upload one texture with known dimensions
    pub fn upload_texture(&mut self, id: TextureId, width: u32, height: u32) -> RendererResult<u32> {
        let gl_name = self.generate_name();
        self.textures.mark_loaded(id, gl_name, width, height)?;
        Ok(gl_name)
    }

    /// Bind `id` for the following draws
    ///
    /// Returns `true` when the bind changed state and `false` when the
    /// texture was already bound.
    pub fn bind_texture(&mut self, id: TextureId) -> RendererResult<bool> {
        let texture = self
            .textures
            .get(id)
            .ok_or(RendererError::TextureNotFound(id.0))?;
        if !texture.loaded {
            return Err(RendererError::NotResident(id.0));
        }
        if self.bound_texture == Some(texture.gl_name) {
            self.stats.redundant_binds += 1;
            return Ok(false);
        }
        self.bound_texture = Some(texture.gl_name);
        self.stats.texture_binds += 1;
        Ok(true)
    }

    /// Draw a quad with the currently bound texture
    pub fn draw_quad(&mut self, position: Vec2, size: Vec2) {
        self.stats.draw_calls += 1;
        if self.commands.len() < self.max_commands {
            self.commands.push(DrawCommand {
                gl_texture: self.bound_texture.unwrap_or(0),
                position,
                size,
            });
        }
    }

    /// Start recording a new frame; the binding cache carries over
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.stats = ContextStats::default();
    }

    /// Forget the binding cache and every upload after the context is lost
    pub fn invalidate(&mut self) {
        self.bound_texture = None;
        self.textures.invalidate_all();
        self.buffers.invalidate_all();
        self.generation += 1;
        log::warn!("Render context lost (generation {})", self.generation);
    }

    /// Re-upload everything after [`invalidate`](Self::invalidate)
    pub fn restore(&mut self) -> usize {
        self.upload_pending()
    }

    pub fn textures(&self) -> &TextureLibrary {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureLibrary {
        &mut self.textures
    }

    pub fn buffers(&self) -> &BufferLibrary {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut BufferLibrary {
        &mut self.buffers
    }

    pub fn bound_texture(&self) -> Option<u32> {
        self.bound_texture
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Draws recorded since the frame began
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn stats(&self) -> ContextStats {
        self.stats
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(TextureLibrary::default(), BufferLibrary::default(), 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RenderContext {
        let mut context = RenderContext::default();
        context.textures_mut().allocate(TextureId(1), "a").unwrap();
        context.textures_mut().allocate(TextureId(2), "b").unwrap();
        context.buffers_mut().allocate(128).unwrap();
        context
    }

    #[test]
    fn test_bind_cache() {
        let mut context = context();
        assert_eq!(context.upload_pending(), 3);

        assert!(context.bind_texture(TextureId(1)).unwrap());
        assert!(!context.bind_texture(TextureId(1)).unwrap());
        assert!(context.bind_texture(TextureId(2)).unwrap());
        assert_eq!(context.stats().texture_binds, 2);
        assert_eq!(context.stats().redundant_binds, 1);
    }

    #[test]
    fn test_bind_requires_upload() {
        let mut context = context();
        assert!(matches!(
            context.bind_texture(TextureId(1)),
            Err(RendererError::NotResident(1))
        ));
        assert!(matches!(
            context.bind_texture(TextureId(9)),
            Err(RendererError::TextureNotFound(9))
        ));
    }

    #[test]
    fn test_context_loss_and_restore() {
        let mut context = context();
        context.upload_pending();
        context.bind_texture(TextureId(1)).unwrap();
        let before = context.textures().get(TextureId(1)).unwrap().gl_name;

        context.invalidate();
        assert_eq!(context.bound_texture(), None);
        assert_eq!(context.textures().loaded_count(), 0);
        assert_eq!(context.generation(), 1);

        assert_eq!(context.restore(), 3);
        let after = context.textures().get(TextureId(1)).unwrap().gl_name;
        assert_ne!(after, before);
        // The cache was dropped, so the first bind changes state again
        assert!(context.bind_texture(TextureId(1)).unwrap());
    }

    #[test]
    fn test_draw_recording() {
        let mut context = context();
        context.upload_texture(TextureId(2), 16, 16).unwrap();
        context.bind_texture(TextureId(2)).unwrap();
        context.draw_quad(Vec2::new(1.0, 2.0), Vec2::splat(16.0));

        let gl_name = context.textures().get(TextureId(2)).unwrap().gl_name;
        assert_eq!(context.commands()[0].gl_texture, gl_name);
        assert_eq!(context.stats().draw_calls, 1);

        context.begin_frame();
        assert!(context.commands().is_empty());
        assert_eq!(context.stats().draw_calls, 0);
        assert_eq!(context.bound_texture(), Some(gl_name));
    }
}
