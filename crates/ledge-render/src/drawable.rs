//! Drawables
//!
//! Things the renderer knows how to draw. The simulation only ever holds a
//! [`DrawableId`]; the library maps it to the drawable itself.

use ahash::AHashMap;
use glam::Vec2;
use ledge_core::render_queue::DrawableId;

use crate::context::RenderContext;
use crate::texture::TextureId;
use crate::RendererResult;

/// Something that can draw itself at a position and scale
pub trait DrawableObject: Send {
    /// Default priority for scheduling; lower draws first
    fn priority(&self) -> i32 {
        0
    }

    /// Draw at `(x, y)` scaled by `(scale_x, scale_y)`
    fn draw(
        &mut self,
        context: &mut RenderContext,
        x: f32,
        y: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> RendererResult<()>;
}

/// A textured quad
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    pub size: Vec2,
    /// Offset of the quad's origin from the drawn position
    pub origin: Vec2,
    pub priority: i32,
}

impl Sprite {
    pub fn new(texture: TextureId, size: Vec2) -> Self {
        Self {
            texture,
            size,
            origin: Vec2::ZERO,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl DrawableObject for Sprite {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn draw(
        &mut self,
        context: &mut RenderContext,
        x: f32,
        y: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> RendererResult<()> {
        context.bind_texture(self.texture)?;
        let scale = Vec2::new(scale_x, scale_y);
        context.draw_quad(Vec2::new(x, y) - self.origin * scale, self.size * scale);
        Ok(())
    }
}

/// Drawables by id
#[derive(Default)]
pub struct DrawableLibrary {
    drawables: AHashMap<DrawableId, Box<dyn DrawableObject>>,
}

impl DrawableLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `drawable` under `id`, returning whatever it replaces
    pub fn insert(
        &mut self,
        id: DrawableId,
        drawable: impl DrawableObject + 'static,
    ) -> Option<Box<dyn DrawableObject>> {
        self.drawables.insert(id, Box::new(drawable))
    }

    pub fn remove(&mut self, id: DrawableId) -> Option<Box<dyn DrawableObject>> {
        self.drawables.remove(&id)
    }

    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut (dyn DrawableObject + 'static)> {
        self.drawables.get_mut(&id).map(|drawable| drawable.as_mut())
    }

    pub fn contains(&self, id: DrawableId) -> bool {
        self.drawables.contains_key(&id)
    }

    /// Priority registered for `id`
    pub fn priority(&self, id: DrawableId) -> Option<i32> {
        self.drawables.get(&id).map(|drawable| drawable.priority())
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}

impl std::fmt::Debug for DrawableLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableLibrary")
            .field("len", &self.drawables.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(texture: TextureId) -> RenderContext {
        let mut context = RenderContext::default();
        context.textures_mut().allocate(texture, "sprite").unwrap();
        context.upload_pending();
        context
    }

    #[test]
    fn test_sprite_scales_and_mirrors() {
        let mut context = context_with(TextureId(4));
        let mut sprite = Sprite::new(TextureId(4), Vec2::new(32.0, 16.0));
        sprite.origin = Vec2::new(16.0, 0.0);

        sprite.draw(&mut context, 100.0, 50.0, -1.0, 1.0).unwrap();
        let command = context.commands()[0];
        assert_eq!(command.position, Vec2::new(116.0, 50.0));
        assert_eq!(command.size, Vec2::new(-32.0, 16.0));
    }

    #[test]
    fn test_sprite_needs_resident_texture() {
        let mut context = RenderContext::default();
        let mut sprite = Sprite::new(TextureId(9), Vec2::ONE);
        assert!(sprite.draw(&mut context, 0.0, 0.0, 1.0, 1.0).is_err());
        assert_eq!(context.stats().draw_calls, 0);
    }

    #[test]
    fn test_library() {
        let mut library = DrawableLibrary::new();
        assert!(library
            .insert(DrawableId(1), Sprite::new(TextureId(1), Vec2::ONE).with_priority(5))
            .is_none());
        assert_eq!(library.priority(DrawableId(1)), Some(5));
        assert!(library.get_mut(DrawableId(2)).is_none());

        assert!(library
            .insert(DrawableId(1), Sprite::new(TextureId(2), Vec2::ONE))
            .is_some());
        assert_eq!(library.priority(DrawableId(1)), Some(0));
        assert!(library.remove(DrawableId(1)).is_some());
        assert!(library.is_empty());
    }
}
