//! Bounded, indexed frame capture.
//!
//! [`FrameRecorder`] is the producer half: the simulation submits owned frame
//! copies tagged with their index. A dedicated recorder thread receives them
//! over a channel sized to the target frame count and dithers each one on a
//! rayon pool, in any order, into its index slot. The scope that spawns the
//! dithering jobs only returns when every job is done; after it, the full
//! animation is serialized exactly once. [`RecordingHandle`] is the
//! completion half the host polls to know when to exit.

use crate::dither::{dither, IndexedFrame};
use crate::encode::write_gif;
use crate::error::RecordError;
use crate::palette::FixedPalette;
use flowfield_core::{FlowConfig, Frame, FrameSink};
use log::{debug, info, warn};
use std::io::Write;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

const DEFAULT_TICKS_PER_SECOND: u32 = 60;
/// Shortest per-frame delay written, in hundredths of a second.
pub const MIN_DELAY_CS: u16 = 2;

/// What to record and how.
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Number of frames in the finished animation.
    pub frames: usize,
    /// Host tick rate; one frame is shown for one tick.
    pub ticks_per_second: u32,
    /// Lower bound on the per-frame delay in hundredths of a second; values
    /// below [`MIN_DELAY_CS`] are raised to it.
    pub min_delay: u16,
    /// Threads used for dithering.
    pub workers: usize,
    pub palette: FixedPalette,
}

impl RecorderSettings {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            min_delay: MIN_DELAY_CS,
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            palette: FixedPalette::cube27(),
        }
    }

    /// Frame count, tick rate and minimum delay taken from a run config.
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            ticks_per_second: config.ticks_per_second,
            min_delay: config.min_frame_delay,
            ..Self::new(config.record_frames)
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Per-frame delay: `100 / ticks_per_second`, never below `min_delay`
    /// or [`MIN_DELAY_CS`].
    pub fn delay_cs(&self) -> u16 {
        let per_tick = 100 / self.ticks_per_second.max(1);
        u16::try_from(per_tick)
            .unwrap_or(u16::MAX)
            .max(self.min_delay)
            .max(MIN_DELAY_CS)
    }
}

struct Order {
    index: usize,
    frame: Frame,
}

/// Producer half of a recording. Dropping it before all frames were
/// submitted abandons the recording.
pub struct FrameRecorder {
    target: usize,
    accepted: Vec<bool>,
    remaining: usize,
    sender: Option<SyncSender<Order>>,
}

/// The finished artifact handed back by [`RecordingHandle::wait`].
#[derive(Debug)]
pub struct Recording<W> {
    pub sink: W,
    pub frames: usize,
    pub delay_cs: u16,
}

/// Completion half of a recording.
pub struct RecordingHandle<W> {
    worker: JoinHandle<Result<Recording<W>, RecordError>>,
}

impl FrameRecorder {
    /// Starts the recorder thread writing to `sink`.
    ///
    /// Returns `RecordError::NoFrames` for a zero frame target.
    pub fn start<W>(
        sink: W,
        settings: RecorderSettings,
    ) -> Result<(FrameRecorder, RecordingHandle<W>), RecordError>
    where
        W: Write + Send + 'static,
    {
        if settings.frames == 0 {
            return Err(RecordError::NoFrames);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.workers.max(1))
            .thread_name(|i| format!("flowfield-dither-{i}"))
            .build()
            .map_err(|e| RecordError::ThreadPool(e.to_string()))?;

        let target = settings.frames;
        let (sender, receiver) = sync_channel(target);
        let worker = thread::Builder::new()
            .name("flowfield-recorder".into())
            .spawn(move || record(receiver, &pool, sink, &settings))?;

        info!("recording {target} frames");
        Ok((
            FrameRecorder {
                target,
                accepted: vec![false; target],
                remaining: target,
                sender: Some(sender),
            },
            RecordingHandle { worker },
        ))
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Frames accepted so far.
    pub fn accepted(&self) -> usize {
        self.target - self.remaining
    }

    /// True while `index` is in range, not yet accepted, and the recorder
    /// is still open.
    pub fn wants(&self, index: usize) -> bool {
        self.sender.is_some() && self.accepted.get(index) == Some(&false)
    }

    /// Hands `frame` over as frame `index`. Never blocks.
    ///
    /// Returns `false` (and drops the frame) if `index >= target`, the index
    /// was already submitted, or the recorder thread is gone.
    pub fn submit(&mut self, frame: Frame, index: usize) -> bool {
        if !self.wants(index) {
            return false;
        }
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(Order { index, frame }) {
            Ok(()) => {
                self.accepted[index] = true;
                self.remaining -= 1;
                debug!("frame {index} submitted, {} to go", self.remaining);
                if self.remaining == 0 {
                    // closing the channel lets the recorder thread finish
                    self.sender = None;
                    info!("all {} frames submitted", self.target);
                }
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!("recorder queue full, dropping frame {index}");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("recorder thread stopped, dropping frame {index}");
                self.sender = None;
                false
            }
        }
    }
}

impl FrameSink for FrameRecorder {
    fn wants_frame(&self, index: usize) -> bool {
        self.wants(index)
    }

    fn submit(&mut self, frame: Frame, index: usize) -> bool {
        FrameRecorder::submit(self, frame, index)
    }
}

impl<W> RecordingHandle<W> {
    /// True once the animation has been written or the recording failed.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Blocks until the recorder thread is done.
    pub fn wait(self) -> Result<Recording<W>, RecordError> {
        self.worker.join().map_err(|_| RecordError::WorkerPanicked)?
    }
}

fn record<W: Write>(
    receiver: Receiver<Order>,
    pool: &rayon::ThreadPool,
    mut sink: W,
    settings: &RecorderSettings,
) -> Result<Recording<W>, RecordError> {
    let slots: Mutex<Vec<Option<IndexedFrame>>> = Mutex::new(vec![None; settings.frames]);
    let palette = &settings.palette;

    pool.in_place_scope(|scope| {
        for order in receiver.iter() {
            let slots = &slots;
            scope.spawn(move |_| {
                debug!("dithering frame {}", order.index);
                let indexed = dither(&order.frame, palette);
                slots.lock().unwrap_or_else(PoisonError::into_inner)[order.index] = Some(indexed);
            });
        }
    });

    let slots = slots.into_inner().unwrap_or_else(PoisonError::into_inner);
    let received = slots.iter().filter(|s| s.is_some()).count();
    let frames: Vec<IndexedFrame> = slots.into_iter().flatten().collect();
    if received != settings.frames {
        return Err(RecordError::Incomplete {
            expected: settings.frames,
            received,
        });
    }
    check_sizes(&frames)?;

    let delay_cs = settings.delay_cs();
    write_gif(&mut sink, &frames, palette, delay_cs)?;
    info!("wrote {} frame animation ({delay_cs}cs per frame)", frames.len());
    Ok(Recording {
        sink,
        frames: frames.len(),
        delay_cs,
    })
}

fn check_sizes(frames: &[IndexedFrame]) -> Result<(), RecordError> {
    let Some(first) = frames.first() else {
        return Ok(());
    };
    match frames
        .iter()
        .enumerate()
        .find(|(_, f)| f.width() != first.width() || f.height() != first.height())
    {
        Some((index, f)) => Err(RecordError::FrameSize {
            index,
            width: f.width(),
            height: f.height(),
            expected_width: first.width(),
            expected_height: first.height(),
        }),
        None => Ok(()),
    }
}
