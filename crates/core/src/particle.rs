//! Particles that drift through the flow field.

use crate::frame::SpriteTarget;
use crate::grid::VectorGrid;
use crate::prng::Xorshift64;
use crate::vector::{clamp_magnitude, Vector2};
use std::collections::VecDeque;

/// Bounded history of past positions; the oldest entry is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    capacity: usize,
    points: VecDeque<Vector2>,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Vector2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Vector2> + '_ {
        self.points.iter().copied()
    }
}

/// A single particle. Owned by the simulation, never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vector2,
    velocity: Vector2,
    tag: usize,
    trail: Option<Trail>,
}

/// Wraps one axis back into `[0, size)`, correcting a single overflow.
fn wrap_axis(value: f64, size: f64) -> f64 {
    if value >= size {
        value - size
    } else if value < 0.0 {
        let wrapped = value + size;
        // a tiny negative value can round up to exactly `size`
        if wrapped >= size {
            0.0
        } else {
            wrapped
        }
    } else {
        value
    }
}

impl Particle {
    pub fn new(position: Vector2, velocity: Vector2, tag: usize) -> Self {
        Self {
            position,
            velocity,
            tag,
            trail: None,
        }
    }

    /// Random position in `[0, world.x) × [0, world.y)`, zero velocity, and a
    /// tag drawn uniformly from `0..palette_len`.
    ///
    /// # Panics
    ///
    /// Panics if `palette_len` is 0.
    pub fn spawn(
        rng: &mut Xorshift64,
        world: Vector2,
        palette_len: usize,
        trail_capacity: usize,
    ) -> Self {
        let position = Vector2::new(rng.next_range(0.0, world.x), rng.next_range(0.0, world.y));
        let tag = rng.next_usize(palette_len);
        Self::new(position, Vector2::ZERO, tag).with_trail(trail_capacity)
    }

    /// Enables a trail of `capacity` positions; 0 disables it.
    pub fn with_trail(mut self, capacity: usize) -> Self {
        self.trail = (capacity > 0).then(|| Trail::new(capacity));
        self
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn tag(&self) -> usize {
        self.tag
    }

    pub fn trail(&self) -> Option<&Trail> {
        self.trail.as_ref()
    }

    /// Records the current position in the trail, then advances by the
    /// velocity and wraps each axis into the world independently.
    pub fn move_step(&mut self, world: Vector2) {
        if let Some(trail) = &mut self.trail {
            trail.push(self.position);
        }
        let next = self.position + self.velocity;
        self.position = Vector2::new(wrap_axis(next.x, world.x), wrap_axis(next.y, world.y));
    }

    /// Adds `accel` to the velocity and caps its magnitude at `max_velocity`.
    pub fn accelerate(&mut self, accel: Vector2, max_velocity: f64) {
        self.velocity = clamp_magnitude(self.velocity + accel, max_velocity);
    }

    /// One integration step: move, then steer by the cell now occupied.
    pub fn update(&mut self, grid: &VectorGrid, world: Vector2, max_velocity: f64) {
        self.move_step(world);
        if let Some(cell) = grid.cell_at(self.position.x, self.position.y) {
            self.accelerate(cell.acceleration, max_velocity);
        }
    }

    /// Draws the trail (oldest first, fading in) and then the particle.
    pub fn draw(&self, target: &mut dyn SpriteTarget, trail_opacity: f64) {
        if let Some(trail) = &self.trail {
            let steps = (trail.len() + 1) as f64;
            for (i, point) in trail.iter().enumerate() {
                let opacity = trail_opacity * (i + 1) as f64 / steps;
                target.draw_sprite(self.tag, point, opacity);
            }
        }
        target.draw_sprite(self.tag, self.position, 1.0);
    }
}
