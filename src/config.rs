use crate::error::{Error, Result};

/// Whether entries without a usable codeword are kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode
{
    /// Spill uncodeable entries to the per-set copy array.
    Lossless,
    /// Drop uncodeable entries entirely. Smaller memory, biased selection.
    Lossy,
}

/// When the buffers of a covered set are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release
{
    /// Keep every buffer until the engine is dropped.
    Hold,
    /// Free a set's buffers as soon as it is covered.
    Eager,
}

/// Runtime knobs for seed selection.
#[derive(Debug, Clone)]
pub struct Config
{
    /// Number of seeds to select. `0` selects nothing.
    pub k: usize,
    /// Lossless or lossy treatment of uncodeable entries.
    pub mode: Mode,
    /// Release policy for covered sets.
    pub release: Release,
    /// Maximum codeword length, in bits, kept on the encoder's fast path.
    /// Longer codes spill to the copy array.
    pub inline_bits: u8,
    /// Worker count for the dedicated pool. `None` uses the global pool,
    /// sized to the hardware thread count.
    pub parallelism: Option<usize>,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            k: 0,
            mode: Mode::Lossless,
            release: Release::Hold,
            inline_bits: 32,
            parallelism: None,
        }
    }
}

impl Config
{
    pub(crate) fn validate(&self, num_vertices: usize) -> Result<()>
    {
        if self.k > num_vertices {
            return Err(Error::InvalidConfig(format!(
                "k = {} exceeds the vertex count {}",
                self.k, num_vertices
            )));
        }
        if self.inline_bits == 0 || self.inline_bits > 128 {
            return Err(Error::InvalidConfig(format!(
                "inline_bits = {} is outside 1..=128",
                self.inline_bits
            )));
        }
        if self.parallelism == Some(0) {
            return Err(Error::InvalidConfig(
                "parallelism = 0; at least one worker is required".into(),
            ));
        }
        Ok(())
    }
}
