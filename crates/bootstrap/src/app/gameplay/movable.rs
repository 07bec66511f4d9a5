use engine::{InputAction, InputSnapshot, TileGrid};

/// Below this speed (px/s) an axis snaps to rest instead of decaying.
pub(crate) const MIN_SPEED: f32 = 16.0;
pub(crate) const DRAG: f32 = 0.95;
pub(crate) const INPUT_SPEED: f32 = 192.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Vec2 {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Vec2 {
    pub(crate) const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorSprite {
    Droid,
    IllegalOpcode,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Movable {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) radius: f32,
    pub(crate) sprite: ActorSprite,
    pub(crate) frame: u32,
}

impl Movable {
    pub(crate) fn at_rest(position: Vec2, radius: f32, sprite: ActorSprite) -> Self {
        Self {
            position,
            velocity: Vec2::default(),
            radius,
            sprite,
            frame: 1,
        }
    }

    pub(crate) fn apply_drag(&mut self) {
        self.velocity.x = drag_axis(self.velocity.x);
        self.velocity.y = drag_axis(self.velocity.y);
    }

    /// Held directions overwrite velocity on their axis. When both keys of
    /// an axis are held, down and right win.
    pub(crate) fn steer(&mut self, input: &InputSnapshot) {
        if input.is_down(InputAction::MoveUp) {
            self.velocity.y = -INPUT_SPEED;
        }
        if input.is_down(InputAction::MoveDown) {
            self.velocity.y = INPUT_SPEED;
        }
        if input.is_down(InputAction::MoveLeft) {
            self.velocity.x = -INPUT_SPEED;
        }
        if input.is_down(InputAction::MoveRight) {
            self.velocity.x = INPUT_SPEED;
        }

        if self.velocity.x < 0.0 {
            self.frame = 0;
        } else if self.velocity.x > 0.0 {
            self.frame = 1;
        }
    }

    /// Moves by `velocity * delta`, sliding along walls. Returns the
    /// displacement actually applied.
    pub(crate) fn integrate(&mut self, delta_seconds: f32, grid: &TileGrid) -> Vec2 {
        let mut step = Vec2::new(
            self.velocity.x * delta_seconds,
            self.velocity.y * delta_seconds,
        );
        let Vec2 { x, y } = self.position;

        if collides(grid, x + step.x, y + step.y, self.radius) {
            if !collides(grid, x + step.x, y, self.radius) {
                step.y = 0.0;
                self.velocity.y = 0.0;
            } else if !collides(grid, x, y + step.y, self.radius) {
                step.x = 0.0;
                self.velocity.x = 0.0;
            } else {
                step = Vec2::default();
                self.velocity = Vec2::default();
            }
        }

        self.position.x += step.x;
        self.position.y += step.y;
        step
    }

    /// Picks the frame that looks toward world x `target_x`.
    pub(crate) fn face_towards(&mut self, target_x: f32) {
        self.frame = if target_x < self.position.x { 0 } else { 1 };
    }
}

fn drag_axis(velocity: f32) -> f32 {
    if velocity.abs() < MIN_SPEED {
        0.0
    } else {
        velocity * DRAG
    }
}

/// True when a box of half-extent `half_size` around (x, y) touches a
/// blocking tile or leaves the grid.
pub(crate) fn collides(grid: &TileGrid, x: f32, y: f32, half_size: f32) -> bool {
    !grid.is_area_walkable(x - half_size, y - half_size, x + half_size, y + half_size)
}
