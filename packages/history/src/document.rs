use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value that can be versioned by the history engine.
///
/// The engine never looks inside a document. It only needs structural
/// equality (for the no-op dedup on push) and a lossless serialized form
/// so that dedup still holds after a reload.
pub trait Document: Clone + PartialEq + Serialize + DeserializeOwned {}

impl<T> Document for T where T: Clone + PartialEq + Serialize + DeserializeOwned {}
