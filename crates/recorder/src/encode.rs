//! GIF serialization of dithered frames.
//!
//! Frames are already palette indices, so they are written as-is against a
//! global color table built from the fixed palette; no requantization.

use crate::dither::IndexedFrame;
use crate::error::RecordError;
use crate::palette::FixedPalette;
use gif::{Encoder, Repeat};
use std::borrow::Cow;
use std::io::Write;

/// Writes `frames` as a looping GIF with `delay_cs` hundredths of a second
/// per frame, then flushes `sink`.
pub fn write_gif<W: Write>(
    sink: &mut W,
    frames: &[IndexedFrame],
    palette: &FixedPalette,
    delay_cs: u16,
) -> Result<(), RecordError> {
    let Some(first) = frames.first() else {
        return Err(RecordError::NoFrames);
    };
    let (width, height) = gif_dimensions(first.width(), first.height())?;
    let color_table: Vec<u8> = palette.colors().iter().flatten().copied().collect();

    let mut encoder = Encoder::new(&mut *sink, width, height, &color_table)?;
    encoder.set_repeat(Repeat::Infinite)?;
    for frame in frames {
        let (w, h) = gif_dimensions(frame.width(), frame.height())?;
        let gif_frame = gif::Frame {
            width: w,
            height: h,
            delay: delay_cs,
            buffer: Cow::Borrowed(frame.indices()),
            ..gif::Frame::default()
        };
        encoder.write_frame(&gif_frame)?;
    }
    // writes the trailer
    encoder.into_inner()?;
    sink.flush()?;
    Ok(())
}

/// GIF stores dimensions as 16-bit values.
fn gif_dimensions(width: usize, height: usize) -> Result<(u16, u16), RecordError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(RecordError::TooLarge { width, height }),
    }
}
