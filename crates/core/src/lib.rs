#![deny(unsafe_code)]
//! Core of the flowfield visualizer.
//!
//! Provides the noise-driven [`VectorGrid`], [`Particle`] integration with
//! toroidal wrapping, shard partitioning for the parallel update, the
//! [`FrameBuffer`]/[`SpriteTarget`] drawing surface, [`FlowConfig`], and the
//! [`Simulation`] that ties them together once per host tick.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod noise_field;
pub mod params;
pub mod particle;
pub mod prng;
pub mod shard;
pub mod simulation;
pub mod vector;

pub use color::Srgb;
pub use config::FlowConfig;
pub use error::EngineError;
pub use frame::{Frame, FrameBuffer, Painter, SpriteSheet, SpriteTarget};
pub use grid::{Cell, FlowParams, VectorGrid};
pub use noise_field::NoiseField;
pub use particle::{Particle, Trail};
pub use prng::Xorshift64;
pub use simulation::{FrameSink, SimState, Simulation, TickInput};
pub use vector::Vector2;
