//! Compile errors.
//!
//! Every stage reports failures as an `Error`: a specific `ErrorImpl`
//! variant plus the source `Position` it refers to. `ErrorKind` groups the
//! variants by the stage that raises them.

pub mod errors;
