use thiserror::Error;

/// Errors raised while assembling a garden.  Ticking never fails.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// A plant names a species with no profile in the table.
    #[error("no plant profile for species '{0}'")]
    UnknownSpecies(String),

    /// Two plants in the seed list share an id.
    #[error("duplicate plant id '{0}'")]
    DuplicatePlantId(String),

    /// A profile breaks `0 <= min < max <= 100` or has a non-positive rate.
    #[error("invalid profile for '{species}': {reason}")]
    InvalidProfile { species: String, reason: String },
}
