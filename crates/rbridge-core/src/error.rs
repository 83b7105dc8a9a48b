//! Bridge error taxonomy.
//!
//! Engine-level failures propagate through the `Engine` variant; everything
//! else is a conversion or lifetime-discipline error raised on this side of
//! the bridge. No operation retries internally: rooting is released on every
//! exit path by the scope guards in [`crate::protect`].

use rbridge_engine::EngineError;

/// Errors raised by bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A wrapper was applied to a handle of the wrong heap type.
    #[error("unexpected object type: expected {expected}, found {actual}")]
    UnexpectedType {
        /// The type the wrapper requires.
        expected: &'static str,
        /// The heap's actual type name.
        actual: String,
    },

    /// A scalar was requested from a vector whose length is not one.
    #[error("cannot convert a vector of length {0} to a scalar")]
    ScalarLength(usize),

    /// A non-nullable scalar was requested but the element is missing.
    #[error("missing value where a {kind} scalar is required")]
    MissingScalar {
        /// The requested scalar kind.
        kind: &'static str,
    },

    /// A keyed conversion hit a duplicate name and duplicates are disallowed.
    #[error("duplicate key '{0}' in keyed conversion")]
    DuplicateKey(String),

    /// A keyed conversion hit an empty or missing name and those are
    /// disallowed.
    #[error("empty or missing key in keyed conversion")]
    EmptyKey,

    /// Construction names do not match the number of values.
    #[error("names length does not match the number of values")]
    BadNamesLength,

    /// An environment binding was given an empty name.
    #[error("environment binding names must be non-empty")]
    EmptyBindingName,

    /// A value sequence does not qualify for frame construction.
    #[error("not eligible for data frame construction: {0}")]
    NotEligibleFrame(String),

    /// The value kind has no foreign representation.
    #[error("unsupported value: {0}")]
    Unsupported(String),

    /// The object kind has no host representation.
    #[error("object cannot be represented as a host value: {0}")]
    NotRepresentable(String),

    /// A shelter id was used before being registered.
    #[error("unknown shelter '{0}'")]
    UnknownShelter(String),

    /// A handle was destroyed through a shelter that does not record it.
    #[error("object is not recorded in the shelter")]
    NotInShelter,

    /// An engine-level failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Bridge operation result.
pub type BridgeResult<T> = Result<T, BridgeError>;
