//! Filesystem operations for birdforge.
//!
//! All generated artifacts are written through [`atomic_write`] so that a
//! crash, a render failure, or a full disk never leaves a truncated config
//! file for BIRD to load.

mod atomic;

pub use atomic::atomic_write;
