//! Headless host loop.
//!
//! Plays the role of a window's event loop: polls an [`InputSource`] once per
//! tick, drives the simulation into a frame buffer it owns, and stops on quit
//! or once an attached recording has every frame it needs.

use crate::error::CliError;
use flowfield_core::{FrameBuffer, Simulation, TickInput};
use flowfield_recorder::{RecordError, RecordingHandle};
use log::{info, warn};

/// Source of per-tick reset and quit signals.
pub trait InputSource {
    fn poll(&mut self, tick: u64) -> TickInput;
}

/// Input replayed from a script: resets at fixed ticks, quit after a limit.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    resets: Vec<u64>,
    quit_at: Option<u64>,
}

impl ScriptedInput {
    pub fn new(resets: Vec<u64>, quit_at: Option<u64>) -> Self {
        Self { resets, quit_at }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> TickInput {
        TickInput {
            reset: self.resets.contains(&tick),
            quit: self.quit_at.is_some_and(|limit| tick >= limit),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Frames in the written animation, if a recording completed.
    pub recorded_frames: Option<usize>,
}

/// Ticks `sim` until the input asks to quit or the recording target is met.
///
/// A completed recording is awaited and its errors are fatal. A recording
/// cut short by quit is abandoned with a warning.
pub fn run<I, W>(
    sim: &mut Simulation,
    frame: &mut FrameBuffer,
    input: &mut I,
    recording: Option<(RecordingHandle<W>, usize)>,
) -> Result<RunSummary, CliError>
where
    I: InputSource,
{
    loop {
        let tick_input = input.poll(sim.ticks());
        if tick_input.quit {
            info!("quit requested at tick {}", sim.ticks());
            break;
        }
        sim.tick(tick_input, frame)?;

        if let Some((handle, target)) = &recording {
            if sim.frames_submitted() >= *target || handle.is_finished() {
                break;
            }
        }
    }

    let ticks = sim.ticks();
    let Some((handle, _)) = recording else {
        return Ok(RunSummary {
            ticks,
            recorded_frames: None,
        });
    };

    // dropping the sink closes the channel if frames are still missing
    drop(sim.detach_sink());
    match handle.wait() {
        Ok(done) => Ok(RunSummary {
            ticks,
            recorded_frames: Some(done.frames),
        }),
        Err(RecordError::Incomplete { expected, received }) => {
            warn!("recording abandoned after {received} of {expected} frames");
            Ok(RunSummary {
                ticks,
                recorded_frames: None,
            })
        }
        Err(e) => Err(e.into()),
    }
}
