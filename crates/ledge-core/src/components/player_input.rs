use crate::channel::{ChannelId, ChannelValue};
use crate::game_object::{ActionType, ComponentContext, ContactFlags, GameComponent};
use crate::input::Button;
use crate::object::{Phase, Phased, Resettable};

/// Channel that receives the game time of every player jump
pub const JUMP_CHANNEL: &str = "player_jump";

/// Turns button state into movement intent for the player object
///
/// Left and right set the target horizontal velocity and facing. A jump
/// press is honored while the player is on the ground, or left it less than
/// `ground_grace` seconds ago, and each press jumps at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInputComponent {
    max_speed: f32,
    acceleration: f32,
    jump_impulse: f32,
    ground_grace: f32,
    jump_channel: Option<ChannelId>,
    /// Press count of the press that produced the last jump
    consumed_jump: Option<u32>,
}

impl PlayerInputComponent {
    pub const DEFAULT_MAX_SPEED: f32 = 150.0;
    pub const DEFAULT_ACCELERATION: f32 = 600.0;
    pub const DEFAULT_JUMP_IMPULSE: f32 = 400.0;
    pub const DEFAULT_GROUND_GRACE: f32 = 0.1;

    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = max_speed;
    }

    pub fn set_jump_impulse(&mut self, jump_impulse: f32) {
        self.jump_impulse = jump_impulse;
    }

    fn publish_jump(&mut self, context: &mut ComponentContext<'_>, time: f32) {
        if self.jump_channel.is_none() {
            match context.systems.channels.register(JUMP_CHANNEL) {
                Ok(id) => self.jump_channel = Some(id),
                Err(err) => log::warn!("Jump not published: {err}"),
            }
        }
        if let Some(id) = self.jump_channel {
            context.systems.channels.set(id, ChannelValue::Float(time));
        }
    }
}

impl Default for PlayerInputComponent {
    fn default() -> Self {
        Self {
            max_speed: Self::DEFAULT_MAX_SPEED,
            acceleration: Self::DEFAULT_ACCELERATION,
            jump_impulse: Self::DEFAULT_JUMP_IMPULSE,
            ground_grace: Self::DEFAULT_GROUND_GRACE,
            jump_channel: None,
            consumed_jump: None,
        }
    }
}

impl Phased for PlayerInputComponent {
    fn phase(&self) -> Phase {
        Phase::Think
    }
}

impl Resettable for PlayerInputComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameComponent for PlayerInputComponent {
    fn update(&mut self, _time_delta: f32, context: &mut ComponentContext<'_>) {
        let object = &mut *context.object;
        if matches!(
            object.current_action,
            ActionType::Death | ActionType::Frozen | ActionType::HitReact
        ) {
            object.target_velocity.x = 0.0;
            return;
        }

        let input = &context.systems.input;
        let time = context.systems.time.game_time();
        let frame_delta = context.systems.time.frame_delta();

        let axis = input.horizontal_axis();
        object.target_velocity.x = axis * self.max_speed;
        object.acceleration.x = self.acceleration;
        if axis != 0.0 {
            object.facing_direction.x = axis.signum();
        }
        if object.current_action != ActionType::Attack {
            object.current_action = if axis != 0.0 {
                ActionType::Move
            } else {
                ActionType::Idle
            };
        }

        let jump = input.button(Button::Jump);
        if !jump.pressed() {
            self.consumed_jump = None;
        }
        let grounded = object.touching_ground()
            || time - object.last_touched_floor_time <= self.ground_grace;
        let fresh_press = self.consumed_jump != Some(jump.press_count());
        if jump.triggered(time, frame_delta) && grounded && fresh_press {
            self.consumed_jump = Some(jump.press_count());
            object.impulse.y += self.jump_impulse;
            object.contacts.remove(ContactFlags::GROUND);
            // Leaving the ground ends the grace window
            object.last_touched_floor_time = f32::NEG_INFINITY;
            self.publish_jump(context, time);
        }
    }
}
