//! The simulation context: noise, grid, particles and the worker pool.
//!
//! Each [`Simulation::tick`] runs three phases in strict order:
//! 1. refresh the grid (or rebuild everything on reset),
//! 2. update particles concurrently, one shard per worker, joined before
//!    continuing,
//! 3. draw particles sequentially in population order and hand a copy of the
//!    frame to the attached [`FrameSink`], if any.

use crate::config::FlowConfig;
use crate::error::EngineError;
use crate::frame::{Frame, FrameBuffer, Painter, SpriteSheet};
use crate::grid::{FlowParams, VectorGrid};
use crate::noise_field::NoiseField;
use crate::particle::Particle;
use crate::prng::{clock_seed, Xorshift64};
use crate::shard::shard_slices;
use crate::vector::Vector2;
use log::{debug, info};

const FIELD_OVERLAY_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Host input consumed once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Edge-triggered: rebuild the field and respawn all particles.
    pub reset: bool,
    /// The host should stop calling `tick`. The simulation ignores it.
    pub quit: bool,
}

impl TickInput {
    pub fn reset() -> Self {
        Self {
            reset: true,
            quit: false,
        }
    }
}

/// Kind of the most recent tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    /// The field advanced and particles followed it.
    Running,
    /// The tick rebuilt the field and respawned the particles; the grid holds
    /// zero accelerations until the next `Running` tick.
    Resetting,
}

/// Receiver of rendered frames, such as an animation recorder.
pub trait FrameSink: Send {
    /// Whether a frame with this index would be accepted.
    fn wants_frame(&self, index: usize) -> bool;

    /// Hands over a frame. Returns `false` if it was rejected.
    fn submit(&mut self, frame: Frame, index: usize) -> bool;
}

/// Owns every piece of mutable simulation state.
pub struct Simulation {
    config: FlowConfig,
    world: Vector2,
    flow: FlowParams,
    seed: u64,
    rng: Xorshift64,
    noise: NoiseField,
    grid: VectorGrid,
    particles: Vec<Particle>,
    sprites: SpriteSheet,
    pool: rayon::ThreadPool,
    depth: f64,
    state: SimState,
    ticks: u64,
    sink: Option<Box<dyn FrameSink>>,
    next_frame: usize,
}

fn spawn_population(rng: &mut Xorshift64, config: &FlowConfig) -> Vec<Particle> {
    let world = config.world();
    (0..config.particles)
        .map(|_| Particle::spawn(rng, world, config.palette.len(), config.trail_length))
        .collect()
}

impl Simulation {
    /// Validates `config`, seeds the field and spawns the population.
    ///
    /// Returns `EngineError::ThreadPool` if the worker pool cannot start.
    pub fn new(config: FlowConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(clock_seed);
        let mut rng = Xorshift64::new(seed);
        let noise = NoiseField::new(rng.next_u32());
        let grid = VectorGrid::build(config.width as f64, config.height as f64, config.scale)?;
        let particles = spawn_population(&mut rng, &config);
        let sprites = SpriteSheet::new(&config.palette, config.particle_size)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("flowfield-worker-{i}"))
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

        info!(
            "simulation ready: {}x{} world, {}x{} grid, {} particles on {} workers, seed {seed}",
            config.width,
            config.height,
            grid.cols(),
            grid.rows(),
            particles.len(),
            config.workers
        );

        Ok(Self {
            world: config.world(),
            flow: config.flow_params(),
            seed,
            rng,
            noise,
            grid,
            particles,
            sprites,
            pool,
            depth: 0.0,
            state: SimState::Running,
            ticks: 0,
            sink: None,
            next_frame: 0,
            config,
        })
    }

    /// A frame buffer of the world's size, filled with the background.
    pub fn new_frame_buffer(&self) -> Result<FrameBuffer, EngineError> {
        FrameBuffer::new(self.config.width, self.config.height, self.config.background)
    }

    /// Routes every subsequent frame to `sink` while it accepts frames.
    pub fn attach_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sink = Some(sink);
        self.next_frame = 0;
    }

    pub fn detach_sink(&mut self) -> Option<Box<dyn FrameSink>> {
        self.sink.take()
    }

    /// Advances one tick and draws into `frame`.
    ///
    /// Returns `EngineError::DimensionMismatch` if `frame` is not the size of
    /// the world.
    pub fn tick(&mut self, input: TickInput, frame: &mut FrameBuffer) -> Result<(), EngineError> {
        if frame.width() != self.config.width || frame.height() != self.config.height {
            return Err(EngineError::DimensionMismatch {
                lhs_w: frame.width(),
                lhs_h: frame.height(),
                rhs_w: self.config.width,
                rhs_h: self.config.height,
            });
        }

        if input.reset {
            self.reset()?;
        } else {
            self.state = SimState::Running;
            self.depth += self.config.delta_z;
            let (grid, noise, depth, flow) = (&mut self.grid, &self.noise, self.depth, &self.flow);
            self.pool.install(|| grid.tick(noise, depth, flow));
        }

        self.update_particles();
        self.draw(frame);
        self.submit_frame(frame);
        self.ticks += 1;
        Ok(())
    }

    /// Reseeds the noise, rebuilds the grid and respawns every particle.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.state = SimState::Resetting;
        self.noise.reseed(self.rng.next_u32());
        self.grid = VectorGrid::build(self.world.x, self.world.y, self.config.scale)?;
        self.particles = spawn_population(&mut self.rng, &self.config);
        self.depth = 0.0;
        debug!("reset: noise seed {} at tick {}", self.noise.seed(), self.ticks);
        Ok(())
    }

    fn update_particles(&mut self) {
        let grid = &self.grid;
        let world = self.world;
        let max_velocity = self.config.max_velocity;
        let shards = shard_slices(&mut self.particles, self.config.workers);
        self.pool.scope(|scope| {
            for shard in shards {
                scope.spawn(move |_| {
                    for particle in shard.iter_mut() {
                        particle.update(grid, world, max_velocity);
                    }
                });
            }
        });
    }

    fn draw(&self, frame: &mut FrameBuffer) {
        if self.config.clear_each_frame {
            frame.clear(self.config.background);
        }
        if self.config.draw_field {
            for cell in self.grid.cells() {
                let tip = cell.position + cell.acceleration.normalize_or_zero() * self.grid.scale();
                frame.draw_line(cell.position, tip, FIELD_OVERLAY_COLOR);
            }
        }
        let mut painter = Painter::new(frame, &self.sprites);
        for particle in &self.particles {
            particle.draw(&mut painter, self.config.trail_opacity);
        }
    }

    fn submit_frame(&mut self, frame: &FrameBuffer) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if sink.wants_frame(self.next_frame) && sink.submit(frame.snapshot(), self.next_frame) {
            self.next_frame += 1;
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Seed the run was started with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frames_submitted(&self) -> usize {
        self.next_frame
    }

    pub fn grid(&self) -> &VectorGrid {
        &self.grid
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
