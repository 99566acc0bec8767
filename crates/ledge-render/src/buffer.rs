//! Buffer Handles
//!
//! Vertex and index buffers shared by drawables, described the same way as
//! textures: an id, the context-assigned name and whether it is uploaded.

use ledge_core::FixedCapacityContainer;

use crate::{RendererError, RendererResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// One buffer and its upload state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buffer {
    pub id: BufferId,
    /// Handle assigned by the graphics context; 0 while not uploaded
    pub gl_name: u32,
    /// Size in bytes
    pub size: usize,
    pub loaded: bool,
}

/// Fixed-capacity set of buffers
///
/// Ids are handed out in increasing order, so the backing container stays
/// sorted without ever being re-sorted.
#[derive(Debug)]
pub struct BufferLibrary {
    buffers: FixedCapacityContainer<Buffer>,
    next_id: u32,
}

impl BufferLibrary {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: FixedCapacityContainer::new(capacity),
            next_id: 1,
        }
    }

    /// Declare a buffer of `size` bytes
    pub fn allocate(&mut self, size: usize) -> RendererResult<BufferId> {
        let id = BufferId(self.next_id);
        self.buffers
            .try_add(Buffer {
                id,
                gl_name: 0,
                size,
                loaded: false,
            })
            .map_err(|_| RendererError::LibraryFull {
                library: "buffers",
                capacity: self.buffers.capacity(),
            })?;
        self.next_id += 1;
        Ok(id)
    }

    fn index_of(&self, id: BufferId) -> Option<usize> {
        self.buffers.find_by(true, |buffer| buffer.id.cmp(&id))
    }

    pub fn get(&self, id: BufferId) -> Option<&Buffer> {
        self.index_of(id).and_then(|index| self.buffers.get(index))
    }

    /// Record that `id` was uploaded as `gl_name`
    pub fn mark_loaded(&mut self, id: BufferId, gl_name: u32) -> RendererResult<()> {
        let buffer = self
            .index_of(id)
            .and_then(|index| self.buffers.get_mut(index))
            .ok_or(RendererError::BufferNotFound(id.0))?;
        buffer.gl_name = gl_name;
        buffer.loaded = true;
        Ok(())
    }

    /// Forget every upload; the entries stay declared
    pub fn invalidate_all(&mut self) {
        for buffer in self.buffers.iter_mut() {
            buffer.gl_name = 0;
            buffer.loaded = false;
        }
    }

    /// Buffers declared but not uploaded
    pub fn unloaded(&mut self) -> impl Iterator<Item = &mut Buffer> {
        self.buffers.iter_mut().filter(|buffer| !buffer.loaded)
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl Default for BufferLibrary {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_find() {
        let mut library = BufferLibrary::new(4);
        let a = library.allocate(256).unwrap();
        let b = library.allocate(512).unwrap();
        assert_ne!(a, b);
        assert_eq!(library.get(b).unwrap().size, 512);
        assert!(library.get(BufferId(99)).is_none());
    }

    #[test]
    fn test_load_and_invalidate() {
        let mut library = BufferLibrary::new(2);
        let id = library.allocate(64).unwrap();
        library.mark_loaded(id, 3).unwrap();
        assert!(library.get(id).unwrap().loaded);

        library.invalidate_all();
        assert_eq!(library.unloaded().count(), 1);
        assert!(matches!(
            library.mark_loaded(BufferId(50), 1),
            Err(RendererError::BufferNotFound(50))
        ));
    }

    #[test]
    fn test_capacity() {
        let mut library = BufferLibrary::new(1);
        library.allocate(1).unwrap();
        assert!(matches!(
            library.allocate(1),
            Err(RendererError::LibraryFull { library: "buffers", .. })
        ));
    }
}
