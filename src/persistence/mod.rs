//! The binary on-disk format: two magic-tagged variants (`MVEC` for
//! brute-force, `MHNS` for the proximity graph) sharing a header skeleton.
//!
//! All integers are big-endian, floats are IEEE-754 single precision, and
//! strings use a two-byte length prefix followed by UTF-8 bytes.

pub mod codec;
pub mod format;

pub use codec::{load, save_brute_force};
#[cfg(feature = "hnsw")]
pub use codec::save_graph;
pub use format::FORMAT_VERSION;
