use glam::Vec2;

use crate::game_object::{ActionType, ComponentContext, GameComponent};
use crate::object::{Phase, Phased, Resettable};
use crate::render_queue::DrawableId;

/// Schedules the object's drawable on the render queue every frame
///
/// Hidden objects and objects without a drawable are skipped. The drawable
/// is mirrored horizontally when the object faces left.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderComponent {
    drawable: Option<DrawableId>,
    priority: i32,
    scale: Vec2,
    /// Offset from the object's position to the drawable's origin
    offset: Vec2,
}

impl RenderComponent {
    pub fn drawable(&self) -> Option<DrawableId> {
        self.drawable
    }

    pub fn set_drawable(&mut self, drawable: DrawableId) {
        self.drawable = Some(drawable);
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }
}

impl Default for RenderComponent {
    fn default() -> Self {
        Self {
            drawable: None,
            priority: 0,
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }
}

impl Phased for RenderComponent {
    fn phase(&self) -> Phase {
        Phase::Draw
    }
}

impl Resettable for RenderComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameComponent for RenderComponent {
    fn update(&mut self, _time_delta: f32, context: &mut ComponentContext<'_>) {
        let Some(drawable) = self.drawable else {
            return;
        };
        let object = &*context.object;
        if object.current_action == ActionType::Hide {
            return;
        }

        let mut scale = self.scale;
        if object.facing_direction.x < 0.0 {
            scale.x = -scale.x;
        }
        context
            .systems
            .render_queue
            .schedule(drawable, self.priority, object.position + self.offset, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{registry, step};
    use crate::game_object::ObjectState;

    #[test]
    fn test_schedules_drawable() {
        let mut systems = registry();
        let mut object = ObjectState {
            position: Vec2::new(10.0, 20.0),
            facing_direction: Vec2::NEG_X,
            ..ObjectState::default()
        };
        let mut render = RenderComponent::default();
        render.set_drawable(DrawableId(7));
        render.set_priority(3);
        render.set_offset(Vec2::new(-1.0, 0.0));

        step(&mut render, 0.016, &mut object, &mut systems);
        let elements = systems.render_queue.elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].drawable, DrawableId(7));
        assert_eq!(elements[0].priority, 3);
        assert_eq!(elements[0].position, Vec2::new(9.0, 20.0));
        assert_eq!(elements[0].scale, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_skips_hidden_and_empty() {
        let mut systems = registry();
        let mut object = ObjectState::default();
        let mut render = RenderComponent::default();

        step(&mut render, 0.016, &mut object, &mut systems);
        render.set_drawable(DrawableId(1));
        object.current_action = ActionType::Hide;
        step(&mut render, 0.016, &mut object, &mut systems);
        assert!(systems.render_queue.is_empty());
    }
}
