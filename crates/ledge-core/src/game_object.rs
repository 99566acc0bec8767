//! Game Objects
//!
//! A game object is a shared state record plus a phase-ordered list of
//! components. Components never hold references to one another: they read
//! and write the [`ObjectState`] of their own object and reach everything
//! else through the [`SystemRegistry`] in their [`ComponentContext`].

use std::any::{Any, TypeId};
use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::manager::{CommitSummary, PhasedObjectManager, Removal};
use crate::object::{ObjectHandle, Phase, Phased, Resettable, Updatable};
use crate::registry::SystemRegistry;
use crate::CoreResult;

/// What an object is currently doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    #[default]
    Invalid,
    Idle,
    Move,
    Attack,
    HitReact,
    Death,
    Hide,
    Frozen,
}

/// Animation selected for an object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationKind {
    #[default]
    Idle,
    Move,
    Jump,
    Fall,
    Attack,
    HitReact,
    Death,
}

/// Current animation and how long it has been playing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    pub kind: AnimationKind,
    /// Seconds since `kind` was selected
    pub elapsed: f32,
}

/// Alignment used by attack and damage rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Neutral,
    Player,
    Enemy,
}

bitflags! {
    /// Surfaces an object touched during the last collision pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ContactFlags: u8 {
        const GROUND = 0b0001;
        const CEILING = 0b0010;
        const LEFT_WALL = 0b0100;
        const RIGHT_WALL = 0b1000;
    }
}

/// Shared record of one game object, read and written by its components
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Velocity the object is trying to reach
    pub target_velocity: Vec2,
    /// Rate, per axis, at which velocity approaches `target_velocity`
    pub acceleration: Vec2,
    /// Velocity change accumulated this frame, consumed by movement
    pub impulse: Vec2,
    pub facing_direction: Vec2,
    pub current_action: ActionType,
    pub life: i32,
    pub width: f32,
    pub height: f32,
    pub contacts: ContactFlags,
    /// Game time of the last ground contact
    pub last_touched_floor_time: f32,
    pub animation: AnimationState,
    /// Distance from the camera focus beyond which the object sleeps;
    /// negative means always active
    pub activation_radius: f32,
    pub team: Team,
    pub is_player: bool,
    /// Set by components to have the object removed at the next commit
    pub marked_for_removal: bool,
}

impl ObjectState {
    /// Radius value for objects that never sleep
    pub const ALWAYS_ACTIVE: f32 = -1.0;

    /// Whether the object touched the ground in the last collision pass
    pub fn touching_ground(&self) -> bool {
        self.contacts.contains(ContactFlags::GROUND)
    }

    /// Whether the object faces towards `point` horizontally
    pub fn facing(&self, point: Vec2) -> bool {
        let dx = point.x - self.position.x;
        dx == 0.0 || dx.signum() == self.facing_direction.x.signum()
    }

    /// Center of the object's bounding box
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height) * 0.5
    }
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            impulse: Vec2::ZERO,
            facing_direction: Vec2::X,
            current_action: ActionType::Invalid,
            life: 1,
            width: 32.0,
            height: 32.0,
            contacts: ContactFlags::empty(),
            last_touched_floor_time: 0.0,
            animation: AnimationState::default(),
            activation_radius: Self::ALWAYS_ACTIVE,
            team: Team::Neutral,
            is_player: false,
            marked_for_removal: false,
        }
    }
}

impl Resettable for ObjectState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything a component may touch during its update
pub struct ComponentContext<'a> {
    /// State of the object the component belongs to
    pub object: &'a mut ObjectState,
    pub systems: &'a mut SystemRegistry,
}

/// Type-erased access to a concrete component
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of behavior attached to a game object
///
/// Components are pooled, so [`Resettable::reset`] must restore the exact
/// state of a freshly built instance.
pub trait GameComponent: AsAny + Phased + Resettable + Send {
    /// Run one frame of behavior
    fn update(&mut self, time_delta: f32, context: &mut ComponentContext<'_>);

    /// Name used in diagnostics
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<'a> dyn GameComponent + 'a {
    /// Concrete type of this component
    pub fn kind(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Whether this component is a `C`
    pub fn is<C: GameComponent>(&self) -> bool {
        self.kind() == TypeId::of::<C>()
    }

    /// View as a concrete component
    pub fn downcast_ref<C: GameComponent>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    /// View mutably as a concrete component
    pub fn downcast_mut<C: GameComponent>(&mut self) -> Option<&mut C> {
        self.as_any_mut().downcast_mut::<C>()
    }
}

impl fmt::Debug for dyn GameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameComponent")
            .field("name", &self.name())
            .field("phase", &self.phase())
            .finish()
    }
}

impl Phased for Box<dyn GameComponent> {
    fn phase(&self) -> Phase {
        (**self).phase()
    }
}

impl Resettable for Box<dyn GameComponent> {
    fn reset(&mut self) {
        (**self).reset();
    }
}

impl<'a> Updatable<ComponentContext<'a>> for Box<dyn GameComponent> {
    fn update(&mut self, time_delta: f32, context: &mut ComponentContext<'a>) {
        GameComponent::update(&mut **self, time_delta, context);
    }
}

/// Shared state plus phase-ordered components
pub struct GameObject {
    pub state: ObjectState,
    components: PhasedObjectManager<Box<dyn GameComponent>>,
}

impl GameObject {
    /// Create an object with room for `max_components` components
    pub fn new(max_components: usize) -> Self {
        Self {
            state: ObjectState::default(),
            components: PhasedObjectManager::new(max_components),
        }
    }

    /// Attach a component at the next commit
    ///
    /// # Panics
    /// Panics when the object is out of component slots.
    pub fn add(&mut self, component: Box<dyn GameComponent>) -> ObjectHandle {
        self.components.add(component)
    }

    /// Attach a component at the next commit, failing when out of slots
    pub fn try_add(&mut self, component: Box<dyn GameComponent>) -> CoreResult<ObjectHandle> {
        self.components.try_add(component)
    }

    /// Detach a component; see [`ObjectManager::remove`](crate::ObjectManager::remove)
    pub fn remove(&mut self, handle: ObjectHandle) -> Removal<Box<dyn GameComponent>> {
        self.components.remove(handle)
    }

    /// Apply queued component changes, passing detached components to `on_removed`
    pub fn commit_updates_with(
        &mut self,
        on_removed: impl FnMut(Box<dyn GameComponent>),
    ) -> CommitSummary {
        self.components.commit_updates_with(on_removed)
    }

    /// Apply queued component changes, dropping detached components
    pub fn commit_updates(&mut self) -> CommitSummary {
        self.components.commit_updates()
    }

    /// Run every active component in ascending phase order
    pub fn update(&mut self, time_delta: f32, systems: &mut SystemRegistry) {
        let mut context = ComponentContext {
            object: &mut self.state,
            systems,
        };
        self.components.update(time_delta, &mut context);
    }

    /// First component running in `phase`
    pub fn find_by_phase(&self, phase: Phase) -> Option<&dyn GameComponent> {
        self.components.find(phase).map(|component| &**component)
    }

    /// First active component of type `C`
    pub fn find<C: GameComponent>(&self) -> Option<&C> {
        self.components
            .iter()
            .find_map(|component| component.downcast_ref::<C>())
    }

    /// First active component of type `C`, mutably
    pub fn find_mut<C: GameComponent>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find_map(|component| component.downcast_mut::<C>())
    }

    /// Active components in execution order
    pub fn components(&self) -> impl Iterator<Item = &dyn GameComponent> {
        self.components.iter().map(|component| &**component)
    }

    /// Number of active components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of components waiting for the next commit
    pub fn pending_component_count(&self) -> usize {
        self.components.pending_len()
    }

    /// Detach every active and pending component, passing each to `f`
    pub fn drain_components(&mut self, f: impl FnMut(Box<dyn GameComponent>)) {
        self.components.clear_with(f);
    }
}

impl Updatable<SystemRegistry> for GameObject {
    fn update(&mut self, time_delta: f32, systems: &mut SystemRegistry) {
        GameObject::update(self, time_delta, systems);
    }
}

impl Resettable for GameObject {
    /// Restore default state, dropping any component still attached
    ///
    /// Components that should go back to their pools must be drained first.
    fn reset(&mut self) {
        let mut dropped = 0;
        self.components.clear_with(|_| dropped += 1);
        if dropped > 0 {
            log::warn!("GameObject reset dropped {dropped} attached component(s)");
        }
        self.state.reset();
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("state", &self.state)
            .field("components", &self.component_count())
            .field("pending", &self.pending_component_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;

    /// Appends its tag to the object's width so execution order is observable
    #[derive(Debug)]
    struct Tracer {
        tag: f32,
        phase: Phase,
    }

    impl Phased for Tracer {
        fn phase(&self) -> Phase {
            self.phase
        }
    }

    impl Resettable for Tracer {
        fn reset(&mut self) {}
    }

    impl GameComponent for Tracer {
        fn update(&mut self, _time_delta: f32, context: &mut ComponentContext<'_>) {
            context.object.width = context.object.width * 10.0 + self.tag;
        }
    }

    fn tracer(tag: f32, phase: Phase) -> Box<dyn GameComponent> {
        Box::new(Tracer { tag, phase })
    }

    #[test]
    fn test_components_run_in_phase_order() {
        let mut systems = SystemRegistry::new(&EngineConfig::default());
        let mut object = GameObject::new(8);
        object.state.width = 0.0;
        object.add(tracer(3.0, Phase::Draw));
        object.add(tracer(1.0, Phase::Think));
        object.add(tracer(2.0, Phase::Movement));

        object.update(0.016, &mut systems);
        assert_eq!(object.state.width, 0.0);

        object.commit_updates();
        object.update(0.016, &mut systems);
        assert_eq!(object.state.width, 123.0);
    }

    #[test]
    fn test_find_by_phase_and_type() {
        let mut object = GameObject::new(4);
        object.add(tracer(1.0, Phase::Think));
        object.commit_updates();

        assert!(object.find_by_phase(Phase::Think).is_some_and(|c| c.is::<Tracer>()));
        assert!(object.find_by_phase(Phase::Draw).is_none());
        assert_eq!(object.find::<Tracer>().map(|t| t.tag), Some(1.0));
    }

    #[test]
    fn test_kind_sees_through_the_box() {
        let component = tracer(1.0, Phase::Think);
        assert_eq!(component.kind(), TypeId::of::<Tracer>());
        assert!(component.name().ends_with("Tracer"));
    }

    #[test]
    fn test_drain_and_reset() {
        let mut object = GameObject::new(4);
        object.add(tracer(1.0, Phase::Think));
        object.commit_updates();
        object.add(tracer(2.0, Phase::Draw));
        object.state.life = 0;

        let mut drained = 0;
        object.drain_components(|_| drained += 1);
        assert_eq!(drained, 2);

        object.reset();
        assert_eq!(object.state, ObjectState::default());
        object.reset();
        assert_eq!(object.component_count(), 0);
    }

    #[test]
    fn test_facing() {
        let mut state = ObjectState::default();
        state.position = Vec2::new(10.0, 0.0);
        assert!(state.facing(Vec2::new(20.0, 0.0)));
        assert!(!state.facing(Vec2::new(0.0, 0.0)));
        state.facing_direction = Vec2::NEG_X;
        assert!(state.facing(Vec2::new(0.0, 0.0)));
    }
}
