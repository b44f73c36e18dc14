use super::errors::CodecError;
use super::pixel::Pixel;
use super::Codec;
use crate::alphabet::Instruction;
use crate::carrier::Carrier;
use tracing::debug;

/// One instruction repeated `count` times in a row.
///
/// `count` is greater than one only for stackable instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedRun {
    pub instruction: Instruction,
    pub count: usize,
}

impl EncodedRun {
    pub fn single(instruction: Instruction) -> Self {
        EncodedRun {
            instruction,
            count: 1,
        }
    }
}

/// Collapse consecutive identical stackable instructions into runs.
///
/// Stops after the first [`Instruction::EndOfProgram`]; anything past it is
/// unreachable and not encoded.
pub fn compress_runs(tokens: &[Instruction]) -> Vec<EncodedRun> {
    let mut runs: Vec<EncodedRun> = Vec::new();

    for &instruction in tokens {
        match runs.last_mut() {
            Some(last) if last.instruction == instruction && instruction.is_stackable() => {
                last.count += 1;
            }
            _ => runs.push(EncodedRun::single(instruction)),
        }

        if instruction == Instruction::EndOfProgram {
            break;
        }
    }

    runs
}

/// Expand runs back into the flat token sequence.
pub fn expand_runs(runs: &[EncodedRun]) -> Vec<Instruction> {
    runs.iter()
        .flat_map(|run| std::iter::repeat(run.instruction).take(run.count))
        .collect()
}

fn is_terminated(runs: &[EncodedRun]) -> bool {
    runs.last()
        .is_some_and(|run| run.instruction == Instruction::EndOfProgram)
}

impl Codec<'_> {
    /// Number of pixels [`encode`](Self::encode) will emit for `tokens`: one
    /// per token up to and including the end marker.
    pub fn required_pixels(tokens: &[Instruction]) -> usize {
        tokens
            .iter()
            .position(|&i| i == Instruction::EndOfProgram)
            .map_or(tokens.len(), |end| end + 1)
    }

    /// Encode a terminated token sequence as pixels, starting from `base`.
    ///
    /// Each run emits `previous + delta` followed by `count - 1` copies of
    /// that pixel (zero-delta continuations).
    pub fn encode(&self, tokens: &[Instruction], base: Pixel) -> Result<Vec<Pixel>, CodecError> {
        let runs = compress_runs(tokens);
        if !is_terminated(&runs) {
            return Err(CodecError::MissingEndOfProgram);
        }
        Ok(self.encode_runs(&runs, base))
    }

    /// Encode already-compressed runs. The caller guarantees termination.
    pub fn encode_runs(&self, runs: &[EncodedRun], base: Pixel) -> Vec<Pixel> {
        let total = runs.iter().map(|run| run.count).sum();
        let mut pixels = Vec::with_capacity(total);
        let mut previous = base;

        for run in runs {
            let pixel = previous.offset(self.table().vector_for(run.instruction));
            pixels.extend(std::iter::repeat(pixel).take(run.count));
            previous = pixel;
        }

        pixels
    }

    /// Write `tokens` into `carrier`, starting at pixel `origin`.
    ///
    /// The carrier is left untouched unless the whole stream fits. Returns
    /// the number of pixels written.
    pub fn inject(
        &self,
        carrier: &mut Carrier,
        origin: usize,
        tokens: &[Instruction],
    ) -> Result<usize, CodecError> {
        let available = carrier.capacity_from(origin)?;
        let required = Self::required_pixels(tokens);
        if required > available {
            return Err(CodecError::InsufficientCapacity {
                required,
                available,
            });
        }

        let runs = compress_runs(tokens);
        if !is_terminated(&runs) {
            return Err(CodecError::MissingEndOfProgram);
        }

        let base = carrier.base_pixel(origin);
        let pixels = self.encode_runs(&runs, base);
        debug!(
            runs = runs.len(),
            pixels = pixels.len(),
            origin,
            available,
            "encoded program into carrier"
        );
        carrier.overwrite(origin, &pixels)?;

        Ok(pixels.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DeltaTable;
    use Instruction::*;

    #[test]
    fn test_compress_stacks_only_stackable_instructions() {
        let tokens = [
            Increment, Increment, Increment, Output, Output, MoveLeft, MoveLeft, EndOfProgram,
        ];
        let runs = compress_runs(&tokens);

        assert_eq!(
            runs,
            vec![
                EncodedRun {
                    instruction: Increment,
                    count: 3
                },
                EncodedRun::single(Output),
                EncodedRun::single(Output),
                EncodedRun {
                    instruction: MoveLeft,
                    count: 2
                },
                EncodedRun::single(EndOfProgram),
            ]
        );
        assert_eq!(expand_runs(&runs), tokens.to_vec());
    }

    #[test]
    fn test_compress_stops_at_end_marker() {
        let runs = compress_runs(&[Increment, EndOfProgram, Decrement, EndOfProgram]);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn test_stacked_increments_use_continuation_pixels() {
        let table = DeltaTable::standard();
        let codec = Codec::new(&table);
        let base = Pixel::new(100, 100, 100, 255);
        let tokens = [Increment, Increment, Increment, Increment, Increment, EndOfProgram];

        let pixels = codec.encode(&tokens, base).unwrap();

        // 5 increment pixels + 1 end marker
        assert_eq!(pixels.len(), 6);
        let first = base.offset(table.vector_for(Increment));
        assert!(pixels[..5].iter().all(|&p| p == first));
        assert_eq!(pixels[5], first.offset(table.vector_for(EndOfProgram)));
    }

    #[test]
    fn test_consecutive_outputs_each_get_a_full_delta() {
        let table = DeltaTable::standard();
        let codec = Codec::new(&table);
        let base = Pixel::new(40, 40, 40, 255);

        let pixels = codec.encode(&[Output, Output, EndOfProgram], base).unwrap();

        let delta = table.vector_for(Output);
        assert_eq!(pixels[0], base.offset(delta));
        assert_eq!(pixels[1], pixels[0].offset(delta));
        assert_ne!(pixels[0], pixels[1]);
    }

    #[test]
    fn test_encode_requires_end_marker() {
        let table = DeltaTable::standard();
        let codec = Codec::new(&table);
        assert_eq!(
            codec.encode(&[Increment, Output], Pixel::SENTINEL),
            Err(CodecError::MissingEndOfProgram)
        );
        assert_eq!(
            codec.encode(&[], Pixel::SENTINEL),
            Err(CodecError::MissingEndOfProgram)
        );
    }

    #[test]
    fn test_required_pixels() {
        assert_eq!(Codec::required_pixels(&[Increment, Increment, EndOfProgram]), 3);
        assert_eq!(Codec::required_pixels(&[EndOfProgram, Output]), 1);
        assert_eq!(Codec::required_pixels(&[Output]), 1);
    }
}
