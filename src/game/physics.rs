//! Physics Integrator
//!
//! Advances one body by one tick: gravity, friction, integration, then
//! floor, platform and stage-bound resolution. y is up, the floor is y = 0.
//!
//! Pure numeric transform with saturating clamps; nothing here can fail.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE, apply_bp, fixed_abs, fixed_mul, from_centi, from_int};
use crate::game::combat::KNOCKDOWN_TICKS;
use crate::core::vec2::FixedVec2;
use crate::game::state::{Body, BossState, PlayerState, WeaponState};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Downward acceleration (units/s²)
pub const GRAVITY: Fixed = from_int(40);
/// Terminal fall speed (units/s)
pub const MAX_FALL_SPEED: Fixed = from_int(24);
/// Jump launch speed (units/s)
pub const JUMP_VELOCITY: Fixed = from_int(14);
/// Grounded walk speed (units/s)
pub const WALK_SPEED: Fixed = from_int(6);
/// Airborne steering speed (units/s)
pub const AIR_STEER_SPEED: Fixed = from_centi(480);
/// Per-tick horizontal decay on the ground (0.80)
pub const GROUND_FRICTION_BP: u32 = 8_000;
/// Per-tick horizontal decay in the air (0.98)
pub const AIR_FRICTION_BP: u32 = 9_800;
/// Horizontal speeds below this snap to zero (1/1024)
pub const VELOCITY_DEAD_ZONE: Fixed = FIXED_ONE / 1024;
/// Minimum speed toward a bound that causes a wall-splat
pub const WALL_SPLAT_SPEED: Fixed = from_int(10);
/// Ticks pinned after a wall-splat
pub const WALL_PIN_TICKS: u16 = 45;
/// Flat wall impact damage
pub const WALL_SPLAT_DAMAGE: Fixed = from_int(5);
/// Farthest anchor the scythe chain can hook
pub const GRAPPLE_RANGE: Fixed = from_int(7);
/// Shortest usable rope
pub const MIN_GRAPPLE_LENGTH: Fixed = from_int(1);
/// Speed on letting go of the chain
pub const GRAPPLE_RELEASE_SPEED: Fixed = from_int(18);

// =============================================================================
// STAGE
// =============================================================================

/// One-way platform. Solid from above only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Left edge
    pub left: Fixed,
    /// Right edge
    pub right: Fixed,
    /// Standing height
    pub top: Fixed,
}

impl Platform {
    /// Create a platform from whole units.
    pub const fn from_ints(left: i32, right: i32, top: i32) -> Self {
        Self {
            left: from_int(left),
            right: from_int(right),
            top: from_int(top),
        }
    }

    #[inline]
    fn spans(&self, x: Fixed) -> bool {
        x >= self.left && x <= self.right
    }
}

/// Static stage geometry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Bounds are x ∈ [-half_width, half_width]
    pub half_width: Fixed,
    /// One-way platforms
    pub platforms: Vec<Platform>,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            half_width: from_int(12),
            platforms: vec![
                Platform::from_ints(-9, -5, 3),
                Platform::from_ints(5, 9, 3),
            ],
        }
    }
}

impl Stage {
    /// Highest surface a descending body crosses this tick, if any.
    fn landing_surface(&self, x: Fixed, prev_y: Fixed, new_y: Fixed) -> Option<Fixed> {
        let mut surface = None;
        if new_y <= 0 {
            surface = Some(0);
        }
        for platform in &self.platforms {
            if platform.spans(x) && prev_y >= platform.top && new_y <= platform.top {
                surface = Some(surface.map_or(platform.top, |s: Fixed| s.max(platform.top)));
            }
        }
        surface
    }

    /// Nearest platform corner above `from` within chain range. Ties go
    /// to the first platform listed.
    pub fn grapple_anchor(&self, from: FixedVec2) -> Option<FixedVec2> {
        let mut best: Option<(Fixed, FixedVec2)> = None;
        for platform in &self.platforms {
            if platform.top <= from.y {
                continue;
            }
            for x in [platform.left, platform.right] {
                let corner = FixedVec2::new(x, platform.top);
                let distance = (corner - from).length();
                if !(MIN_GRAPPLE_LENGTH..=GRAPPLE_RANGE).contains(&distance) {
                    continue;
                }
                if best.map_or(true, |(d, _)| distance < d) {
                    best = Some((distance, corner));
                }
            }
        }
        best.map(|(_, corner)| corner)
    }

    /// Whether a grounded body at `position` still has support.
    fn supports(&self, x: Fixed, y: Fixed) -> bool {
        y <= 0 || self.platforms.iter().any(|p| p.top == y && p.spans(x))
    }
}

// =============================================================================
// INTEGRATION
// =============================================================================

/// What happened to a body this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhysicsOutcome {
    /// Went from airborne to grounded
    pub landed: bool,
    /// Bound crossed: -1 left, +1 right, 0 none
    pub wall_side: i8,
    /// Horizontal speed toward the crossed bound, before friction
    pub impact_speed: Fixed,
    /// A wall-splat pinned the player (players only)
    pub splatted: bool,
    /// The swing hit the floor or a bound and the chain let go
    pub grapple_dropped: bool,
}

/// Integrate a body for one tick and resolve floor and platforms.
///
/// Horizontal bounds are reported in the outcome, not resolved; the caller
/// decides between a clamp and a wall-splat.
pub fn integrate_body(body: &mut Body, half_width: Fixed, dt: Fixed, stage: &Stage) -> PhysicsOutcome {
    let mut outcome = PhysicsOutcome::default();
    let was_grounded = body.on_ground;

    // Leaving the ground: jump impulse or walked off a platform
    if body.on_ground && (body.velocity.y > 0 || !stage.supports(body.position.x, body.position.y)) {
        body.on_ground = false;
    }

    let impact_vx = body.velocity.x;

    if body.on_ground {
        body.velocity.y = 0;
        body.velocity.x = apply_bp(body.velocity.x, GROUND_FRICTION_BP);
    } else {
        body.velocity.y = (body.velocity.y - fixed_mul(GRAVITY, dt)).max(-MAX_FALL_SPEED);
        body.velocity.x = apply_bp(body.velocity.x, AIR_FRICTION_BP);
    }
    if fixed_abs(body.velocity.x) < VELOCITY_DEAD_ZONE {
        body.velocity.x = 0;
    }

    let prev_y = body.position.y;
    body.position.x = body.position.x.saturating_add(fixed_mul(body.velocity.x, dt));
    body.position.y = body.position.y.saturating_add(fixed_mul(body.velocity.y, dt));

    if !body.on_ground && body.velocity.y <= 0 {
        if let Some(surface) = stage.landing_surface(body.position.x, prev_y, body.position.y) {
            body.position.y = surface;
            body.velocity.y = 0;
            body.on_ground = true;
        }
    }
    outcome.landed = body.on_ground && !was_grounded;

    let bound = stage.half_width - half_width;
    if body.position.x > bound {
        outcome.wall_side = 1;
        outcome.impact_speed = impact_vx.max(0);
    } else if body.position.x < -bound {
        outcome.wall_side = -1;
        outcome.impact_speed = (-impact_vx).max(0);
    }

    outcome
}

// =============================================================================
// SCYTHE CHAIN
// =============================================================================

/// Rigid rope from a fixed anchor to the player's feet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grapple {
    /// Hook point
    pub anchor: FixedVec2,
    /// Rope length, fixed at attach time
    pub length: Fixed,
}

/// Hook the chain onto `anchor`. The player leaves the ground and keeps
/// only the tangential part of its velocity on the first swing tick.
pub fn start_grapple(player: &mut PlayerState, anchor: FixedVec2) {
    let length = (player.body.position - anchor).length().max(MIN_GRAPPLE_LENGTH);
    player.grapple = Some(Grapple { anchor, length });
    player.body.on_ground = false;
}

/// Let go of the chain. The player is flung along its swing at
/// [`GRAPPLE_RELEASE_SPEED`]; at rest, straight away from the anchor.
pub fn release_grapple(player: &mut PlayerState) -> bool {
    let Some(grapple) = player.grapple.take() else {
        return false;
    };
    let direction = if player.body.velocity == FixedVec2::ZERO {
        player.body.position - grapple.anchor
    } else {
        player.body.velocity
    };
    player.body.velocity = direction.with_length(GRAPPLE_RELEASE_SPEED);
    true
}

/// One pendulum step. Gravity acts, the radial part of the velocity is
/// removed, and the moved position is projected back onto the rope.
///
/// Returns false and leaves the body untouched when the step would reach
/// the floor or a stage bound.
fn swing(body: &mut Body, grapple: &Grapple, half_width: Fixed, dt: Fixed, stage: &Stage) -> bool {
    let mut velocity = body.velocity;
    velocity.y -= fixed_mul(GRAVITY, dt);

    let radial = (body.position - grapple.anchor).with_length(FIXED_ONE);
    velocity = velocity - radial.scale(velocity.dot(radial));

    let moved = body.position + velocity.scale(dt);
    let position = grapple.anchor + (moved - grapple.anchor).with_length(grapple.length);

    let bound = stage.half_width - half_width;
    if position.y <= 0 || fixed_abs(position.x) > bound {
        return false;
    }
    body.position = position;
    body.velocity = velocity;
    body.on_ground = false;
    true
}

fn clamp_to_bound(body: &mut Body, half_width: Fixed, side: i8, stage: &Stage) {
    let bound = stage.half_width - half_width;
    body.position.x = if side > 0 { bound } else { -bound };
    body.velocity.x = 0;
}

/// Integrate a player for one tick.
///
/// Landing resets the juggle count and disarms tech. A fast bound contact
/// pins the player (the caller applies the impact damage).
pub fn integrate_player(player: &mut PlayerState, dt: Fixed, stage: &Stage) -> PhysicsOutcome {
    if player.on_wall {
        // Pinned players hold position until the wall timer expires
        player.body.velocity = Default::default();
        return PhysicsOutcome::default();
    }

    let mut grapple_dropped = false;
    if let Some(grapple) = player.grapple {
        if swing(&mut player.body, &grapple, PlayerState::HALF_WIDTH, dt, stage) {
            return PhysicsOutcome::default();
        }
        player.grapple = None;
        grapple_dropped = true;
    }

    let mut outcome = integrate_body(&mut player.body, PlayerState::HALF_WIDTH, dt, stage);
    outcome.grapple_dropped = grapple_dropped;

    if outcome.landed {
        player.juggle_count = 0;
        player.tech_eligible = false;
        player.tech_timer = 0;
        if player.knocked_down {
            player.knocked_down = false;
            player.action.enter(WeaponState::Stagger, KNOCKDOWN_TICKS);
            player.current_move = None;
        }
    }

    if outcome.wall_side != 0 {
        clamp_to_bound(&mut player.body, PlayerState::HALF_WIDTH, outcome.wall_side, stage);
        if outcome.impact_speed >= WALL_SPLAT_SPEED && !player.is_defeated() {
            player.body.velocity = Default::default();
            player.on_wall = true;
            player.wall_dir = outcome.wall_side;
            player.wall_timer = WALL_PIN_TICKS;
            player.tech_eligible = false;
            player.tech_timer = 0;
            outcome.splatted = true;
        }
    }

    outcome
}

/// Integrate the boss for one tick. Bounds always clamp.
pub fn integrate_boss(boss: &mut BossState, dt: Fixed, stage: &Stage) -> PhysicsOutcome {
    let outcome = integrate_body(&mut boss.body, BossState::HALF_WIDTH, dt, stage);
    if outcome.wall_side != 0 {
        clamp_to_bound(&mut boss.body, BossState::HALF_WIDTH, outcome.wall_side, stage);
    }
    outcome
}

// =============================================================================
// TESTS
// =============================================================================
