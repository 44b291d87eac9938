//! Typed failures raised by the engine.
//!
//! Only caller-correctable problems live here. A communication strategy running out of
//! candidates is not an error: it surfaces as `None` and the simulator recovers locally.

use thiserror::Error;

/// Errors returned (wrapped in [`anyhow::Error`]) by generation, simulation and reconstruction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenError {
    /// A parameter constraint was violated; the payload names the constraint.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The simulator was handed an empty list of applications.
    #[error("cannot simulate over an empty landscape")]
    EmptyLandscape,

    /// An imported landscape has no class that could serve as entry point.
    #[error("application {0} has no classes")]
    NoClasses(String),

    /// A class that could be called has no methods to call.
    #[error("class {0} has no methods")]
    NoMethods(String),

    /// A generated tree broke one of its structural invariants.
    #[error("structural invariant violated: {0}")]
    StructuralInvariant(String),
}

impl GenError {
    /// Creates an invalid-parameter error for the given constraint.
    pub fn invalid(constraint: impl Into<String>) -> anyhow::Error {
        Self::InvalidParameter(constraint.into()).into()
    }
}
