//! Area-gated hand-off to an external payload decoder.
use log::debug;

use crate::config::DecodeGate;
use crate::models::{FinderPatternCandidate, Frame};

/// Something that can read a marker payload out of a frame.
///
/// Returning `None` (or an empty string) means nothing legible this frame; it is
/// not an error. Any `FnMut(&Frame) -> Option<String>` closure is a decoder.
pub trait PayloadDecoder {
    /// Attempt to decode the marker visible in `frame`
    fn decode(&mut self, frame: &Frame<'_>) -> Option<String>;
}

impl<F> PayloadDecoder for F
where
    F: FnMut(&Frame<'_>) -> Option<String>,
{
    fn decode(&mut self, frame: &Frame<'_>) -> Option<String> {
        self(frame)
    }
}

/// Decoder that never finds anything, for guidance-only scanning
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecoder;

impl PayloadDecoder for NoDecoder {
    fn decode(&mut self, _frame: &Frame<'_>) -> Option<String> {
        None
    }
}

/// Decoder that reports the same text every time it is asked, for dry runs and fixtures
#[derive(Debug, Clone, Default)]
pub struct FixedDecoder {
    text: Option<String>,
    calls: usize,
}

impl FixedDecoder {
    /// Always answer `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            calls: 0,
        }
    }

    /// Always answer `text`, or nothing when `None`
    pub fn from_option(text: Option<String>) -> Self {
        Self { text, calls: 0 }
    }

    /// How many times the decoder has been invoked
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PayloadDecoder for FixedDecoder {
    fn decode(&mut self, _frame: &Frame<'_>) -> Option<String> {
        self.calls += 1;
        self.text.clone()
    }
}

/// Invokes a decoder when the summed candidate area falls inside the gate
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeTrigger {
    gate: DecodeGate,
}

impl DecodeTrigger {
    /// Trigger with the given area window
    pub fn new(gate: DecodeGate) -> Self {
        Self { gate }
    }

    /// Sum of candidate areas, in original-image pixels
    pub fn total_area(candidates: &[FinderPatternCandidate]) -> f32 {
        candidates.iter().map(|c| c.area).sum()
    }

    /// Whether this candidate set warrants a decode attempt
    pub fn should_decode(&self, candidates: &[FinderPatternCandidate]) -> bool {
        !candidates.is_empty() && self.gate.admits(Self::total_area(candidates))
    }

    /// Call `decoder` at most once; non-empty text is returned
    pub fn run<D>(&self, frame: &Frame<'_>, candidates: &[FinderPatternCandidate], decoder: &mut D) -> Option<String>
    where
        D: PayloadDecoder + ?Sized,
    {
        if !self.should_decode(candidates) {
            return None;
        }
        let text = decoder.decode(frame).filter(|t| !t.is_empty());
        debug!(
            "decode attempt over total area {:.0}: {}",
            Self::total_area(candidates),
            if text.is_some() { "payload found" } else { "nothing legible" }
        );
        text
    }
}
