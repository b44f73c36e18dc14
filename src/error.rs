//! Crate-level error type
//!
//! Each layer has its own error enum; [`Error`] wraps all of them so callers
//! that drive a whole pipeline (load image → decode → load → run) can use a
//! single `?`.

use crate::alphabet::SourceLocation;
use crate::carrier::CarrierError;
use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::interpreter::{LoadError, RuntimeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// A load error traced back to where the bracket was written
    #[error("{error} ({location})")]
    Source {
        error: LoadError,
        location: SourceLocation,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the failure is caused by malformed program data (a corrupt
    /// pixel stream or unbalanced brackets) rather than I/O or limits.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::Codec(
                CodecError::CorruptStream { .. }
                    | CodecError::UnknownDelta(_)
                    | CodecError::UnterminatedStream { .. }
            ) | Error::Load(_)
                | Error::Source { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
