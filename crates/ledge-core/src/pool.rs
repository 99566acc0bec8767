//! Object Pools
//!
//! A pool builds all of its instances once, up front, and then only moves
//! them in and out. Pools never grow: running one dry is a sizing bug and is
//! treated as fatal.

use std::any::TypeId;
use std::sync::Arc;

use glam::Vec2;

use crate::container::FixedCapacityContainer;
use crate::game_object::GameComponent;
use crate::memory::PoolStats;
use crate::{CoreError, CoreResult};

/// Clean-up run on every instance as it returns to its pool
pub type Scrubber<T> = fn(&mut T);

/// Fixed set of pre-built instances
pub struct ObjectPool<T> {
    name: &'static str,
    available: FixedCapacityContainer<T>,
    scrubber: Option<Scrubber<T>>,
    stats: Option<Arc<PoolStats>>,
}

impl<T> ObjectPool<T> {
    /// Pool size used by [`ObjectPool::with_factory`]
    pub const DEFAULT_SIZE: usize = 32;

    /// Create a pool of `size` instances built by `factory`
    pub fn new(name: &'static str, size: usize, factory: impl FnMut() -> T) -> Self {
        let mut pool = Self {
            name,
            available: FixedCapacityContainer::new(size),
            scrubber: None,
            stats: None,
        };
        pool.fill(factory);
        pool
    }

    /// Create a pool of [`DEFAULT_SIZE`](Self::DEFAULT_SIZE) instances
    pub fn with_factory(name: &'static str, factory: impl FnMut() -> T) -> Self {
        Self::new(name, Self::DEFAULT_SIZE, factory)
    }

    /// Run `scrubber` on every instance as it is released
    pub fn with_scrubber(mut self, scrubber: Scrubber<T>) -> Self {
        self.scrubber = Some(scrubber);
        self
    }

    /// Record checkouts into `stats`
    pub fn with_stats(mut self, stats: Arc<PoolStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    fn fill(&mut self, mut factory: impl FnMut() -> T) {
        while !self.available.is_full() {
            self.available.add(factory());
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total instances owned by the pool
    pub fn capacity(&self) -> usize {
        self.available.capacity()
    }

    /// Instances ready to be allocated
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Instances currently checked out
    pub fn allocated_count(&self) -> usize {
        self.available.capacity() - self.available.len()
    }

    /// Check out an instance, failing when the pool is empty
    pub fn try_allocate(&mut self) -> CoreResult<T> {
        let object = self.available.remove_last().ok_or(CoreError::PoolExhausted {
            pool: self.name,
            capacity: self.available.capacity(),
        })?;
        if let Some(stats) = &self.stats {
            stats.record_allocate();
        }
        Ok(object)
    }

    /// Check out an instance
    ///
    /// # Panics
    /// Panics when the pool is empty.
    pub fn allocate(&mut self) -> T {
        match self.try_allocate() {
            Ok(object) => object,
            Err(err) => {
                log::error!("ObjectPool::allocate: {err}");
                panic!("ObjectPool::allocate: {err}");
            }
        }
    }

    /// Return an instance, scrubbing it first
    ///
    /// Fails if the pool is already full, which means something was released
    /// twice or released into the wrong pool.
    pub fn try_release(&mut self, mut object: T) -> CoreResult<()> {
        if self.available.is_full() {
            return Err(CoreError::PoolOverflow {
                pool: self.name,
                capacity: self.available.capacity(),
            });
        }
        if let Some(scrub) = self.scrubber {
            scrub(&mut object);
        }
        self.available.add(object);
        if let Some(stats) = &self.stats {
            stats.record_release();
        }
        Ok(())
    }

    /// Return an instance, scrubbing it first
    ///
    /// # Panics
    /// Panics when the pool is already full.
    pub fn release(&mut self, object: T) {
        if let Err(err) = self.try_release(object) {
            log::error!("ObjectPool::release: {err}");
            panic!("ObjectPool::release: {err}");
        }
    }
}

/// Pool of scratch vectors, zeroed on release
pub struct VectorPool {
    pool: ObjectPool<Vec2>,
}

fn zero_vector(vector: &mut Vec2) {
    *vector = Vec2::ZERO;
}

impl VectorPool {
    /// Create a pool of `size` zero vectors
    pub fn new(size: usize) -> Self {
        Self {
            pool: ObjectPool::new("vectors", size, || Vec2::ZERO).with_scrubber(zero_vector),
        }
    }

    /// Check out a zeroed vector
    ///
    /// # Panics
    /// Panics when the pool is empty.
    pub fn allocate(&mut self) -> Vec2 {
        self.pool.allocate()
    }

    /// Check out a vector initialized to `(x, y)`
    pub fn allocate_set(&mut self, x: f32, y: f32) -> Vec2 {
        let mut vector = self.pool.allocate();
        vector.x = x;
        vector.y = y;
        vector
    }

    /// Check out a vector, failing when the pool is empty
    pub fn try_allocate(&mut self) -> CoreResult<Vec2> {
        self.pool.try_allocate()
    }

    /// Return a vector
    pub fn release(&mut self, vector: Vec2) {
        self.pool.release(vector);
    }

    /// Vectors currently checked out
    pub fn allocated_count(&self) -> usize {
        self.pool.allocated_count()
    }

    /// Vectors ready to be allocated
    pub fn available_count(&self) -> usize {
        self.pool.available_count()
    }

    /// Total vectors owned by the pool
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}

/// Pool of boxed components of one concrete kind, reset on release
pub struct GameComponentPool {
    kind: TypeId,
    pool: ObjectPool<Box<dyn GameComponent>>,
}

fn reset_component(component: &mut Box<dyn GameComponent>) {
    component.reset();
}

impl GameComponentPool {
    /// Create a pool of `size` components of kind `C`
    pub fn new<C: GameComponent>(size: usize, mut factory: impl FnMut() -> C) -> Self {
        let pool = ObjectPool::new(std::any::type_name::<C>(), size, || {
            Box::new(factory()) as Box<dyn GameComponent>
        })
        .with_scrubber(reset_component);

        Self {
            kind: TypeId::of::<C>(),
            pool,
        }
    }

    /// Record checkouts into `stats`
    pub fn with_stats(self, stats: Arc<PoolStats>) -> Self {
        Self {
            kind: self.kind,
            pool: self.pool.with_stats(stats),
        }
    }

    /// Concrete component type held by this pool
    pub fn kind(&self) -> TypeId {
        self.kind
    }

    /// Name of the concrete component type
    pub fn name(&self) -> &'static str {
        self.pool.name()
    }

    /// Check out a freshly reset component
    ///
    /// # Panics
    /// Panics when the pool is empty.
    pub fn allocate(&mut self) -> Box<dyn GameComponent> {
        self.pool.allocate()
    }

    /// Check out a component, failing when the pool is empty
    pub fn try_allocate(&mut self) -> CoreResult<Box<dyn GameComponent>> {
        self.pool.try_allocate()
    }

    /// Reset and return a component
    ///
    /// # Panics
    /// Panics if the component is of another kind or the pool is full.
    pub fn release(&mut self, component: Box<dyn GameComponent>) {
        if component.kind() != self.kind {
            log::error!(
                "GameComponentPool::release: {} returned to pool of {}",
                component.name(),
                self.pool.name()
            );
            panic!("GameComponentPool::release: component returned to the wrong pool");
        }
        self.pool.release(component);
    }

    /// Components currently checked out
    pub fn allocated_count(&self) -> usize {
        self.pool.allocated_count()
    }

    /// Components ready to be allocated
    pub fn available_count(&self) -> usize {
        self.pool.available_count()
    }

    /// Total components owned by the pool
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}
