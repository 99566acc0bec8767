//! Texture Handles
//!
//! Opaque descriptions of textures a level uses. The library is sized up
//! front and kept ordered by resource id so lookups are binary searches.

use std::cmp::Ordering;

use ledge_core::FixedCapacityContainer;

use crate::{RendererError, RendererResult};

/// Identifies a texture by the resource it is loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// One texture and its upload state
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub resource_id: TextureId,
    /// Debug label
    pub name: String,
    /// Handle assigned by the graphics context; 0 while not uploaded
    pub gl_name: u32,
    pub width: u32,
    pub height: u32,
    pub loaded: bool,
}

impl Texture {
    fn new(resource_id: TextureId, name: &str) -> Self {
        Self {
            resource_id,
            name: name.to_string(),
            gl_name: 0,
            width: 0,
            height: 0,
            loaded: false,
        }
    }

    fn forget_upload(&mut self) {
        self.gl_name = 0;
        self.loaded = false;
    }
}

fn by_resource(a: &Texture, b: &Texture) -> Ordering {
    a.resource_id.cmp(&b.resource_id)
}

/// Fixed-capacity set of textures found by resource id
#[derive(Debug)]
pub struct TextureLibrary {
    textures: FixedCapacityContainer<Texture>,
}

impl TextureLibrary {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        Self {
            textures: FixedCapacityContainer::with_comparator(capacity, by_resource),
        }
    }

    fn index_of(&self, resource_id: TextureId) -> Option<usize> {
        self.textures
            .find_by(true, |texture| texture.resource_id.cmp(&resource_id))
    }

    /// Declare a texture, or get the existing entry for `resource_id`
    pub fn allocate(&mut self, resource_id: TextureId, name: &str) -> RendererResult<&mut Texture> {
        let index = match self.index_of(resource_id) {
            Some(index) => index,
            None => {
                self.textures
                    .try_add(Texture::new(resource_id, name))
                    .map_err(|_| RendererError::LibraryFull {
                        library: "textures",
                        capacity: self.textures.capacity(),
                    })?;
                self.textures.sort(false);
                self.index_of(resource_id)
                    .ok_or(RendererError::TextureNotFound(resource_id.0))?
            }
        };
        self.textures
            .get_mut(index)
            .ok_or(RendererError::TextureNotFound(resource_id.0))
    }

    pub fn get(&self, resource_id: TextureId) -> Option<&Texture> {
        self.index_of(resource_id)
            .and_then(|index| self.textures.get(index))
    }

    /// Record that `resource_id` was uploaded as `gl_name`
    pub fn mark_loaded(
        &mut self,
        resource_id: TextureId,
        gl_name: u32,
        width: u32,
        height: u32,
    ) -> RendererResult<()> {
        let index = self
            .index_of(resource_id)
            .ok_or(RendererError::TextureNotFound(resource_id.0))?;
        if let Some(texture) = self.textures.get_mut(index) {
            texture.gl_name = gl_name;
            texture.width = width;
            texture.height = height;
            texture.loaded = true;
        }
        Ok(())
    }

    /// Forget every upload; the entries stay declared
    pub fn invalidate_all(&mut self) {
        self.textures.iter_mut().for_each(Texture::forget_upload);
    }

    /// Textures declared but not uploaded
    pub fn unloaded(&mut self) -> impl Iterator<Item = &mut Texture> {
        self.textures.iter_mut().filter(|texture| !texture.loaded)
    }

    /// Drop every entry, e.g. between levels
    pub fn clear(&mut self) {
        self.textures.clear();
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.textures.capacity()
    }

    pub fn loaded_count(&self) -> usize {
        self.textures.iter().filter(|texture| texture.loaded).count()
    }
}

impl Default for TextureLibrary {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
