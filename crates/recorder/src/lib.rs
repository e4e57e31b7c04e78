#![deny(unsafe_code)]
//! Off-line frame capture for the flowfield visualizer.
//!
//! [`FrameRecorder`] takes owned frame copies from the simulation without
//! blocking it, dithers them to a [`FixedPalette`] on a worker pool, and
//! writes a looping GIF once every frame has arrived. [`snapshot`] writes a
//! single frame as PNG.

pub mod dither;
pub mod encode;
pub mod error;
pub mod palette;
pub mod recorder;

#[cfg(feature = "png")]
pub mod snapshot;

pub use dither::{dither, IndexedFrame};
pub use error::RecordError;
pub use palette::FixedPalette;
pub use recorder::{FrameRecorder, Recording, RecorderSettings, RecordingHandle, MIN_DELAY_CS};
