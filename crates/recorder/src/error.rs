//! Errors produced while capturing and serializing frames.

use thiserror::Error;

/// Anything that can go wrong between frame submission and the finished file.
///
/// All variants are fatal for a recording: no partial animation is written.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Writing to the output sink failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The PNG encoder rejected the snapshot.
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// The GIF writer rejected the animation or its output.
    #[error("gif error: {0}")]
    Gif(#[from] gif::EncodingError),

    /// A recording was requested with a target of zero frames.
    #[error("recording needs at least one frame")]
    NoFrames,

    /// The producer went away before every frame arrived.
    #[error("recording incomplete: received {received} of {expected} frames")]
    Incomplete { expected: usize, received: usize },

    /// A submitted frame did not match the size of the first frame.
    #[error("frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSize {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    /// Frame dimensions do not fit the output format.
    #[error("frame of {width}x{height} is too large to encode")]
    TooLarge { width: usize, height: usize },

    /// The dithering pool could not be created.
    #[error("failed to build recorder pool: {0}")]
    ThreadPool(String),

    /// The recorder thread panicked.
    #[error("recorder thread panicked")]
    WorkerPanicked,
}
