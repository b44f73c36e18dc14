use super::encode::{expand_runs, EncodedRun};
use super::errors::CodecError;
use super::pixel::Pixel;
use super::Codec;
use crate::alphabet::Instruction;
use crate::carrier::Carrier;
use tracing::debug;

impl Codec<'_> {
    /// Decode pixels (starting at the embedding origin) into runs.
    ///
    /// `base` is the pixel just before the origin. Reading stops right after
    /// the end-of-program pixel; later pixels are never inspected.
    pub fn decode_runs(&self, pixels: &[Pixel], base: Pixel) -> Result<Vec<EncodedRun>, CodecError> {
        let mut runs: Vec<EncodedRun> = Vec::new();
        let mut previous = base;

        for (index, &pixel) in pixels.iter().enumerate() {
            let delta = pixel.delta_from(previous);
            previous = pixel;

            if delta.is_zero() {
                // Continuation: only valid directly after a stackable run
                match runs.last_mut() {
                    Some(run) if run.instruction.is_stackable() => run.count += 1,
                    _ => return Err(CodecError::CorruptStream { index, delta }),
                }
                continue;
            }

            let instruction = self
                .table()
                .instruction_for(delta)
                .map_err(|_| CodecError::CorruptStream { index, delta })?;
            runs.push(EncodedRun::single(instruction));

            if instruction == Instruction::EndOfProgram {
                debug!(runs = runs.len(), pixels = index + 1, "decoded pixel stream");
                return Ok(runs);
            }
        }

        Err(CodecError::UnterminatedStream {
            pixels: pixels.len(),
        })
    }

    /// Decode pixels into the flat token sequence, end marker included.
    pub fn decode(&self, pixels: &[Pixel], base: Pixel) -> Result<Vec<Instruction>, CodecError> {
        self.decode_runs(pixels, base).map(|runs| expand_runs(&runs))
    }

    /// Decode the program embedded in `carrier` at `origin`.
    pub fn extract(&self, carrier: &Carrier, origin: usize) -> Result<Vec<EncodedRun>, CodecError> {
        carrier.capacity_from(origin)?;
        self.decode_runs(carrier.pixels_from(origin), carrier.base_pixel(origin))
    }
}
