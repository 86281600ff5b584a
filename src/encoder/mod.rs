//! Encoder seam
//!
//! The host encoder consumes a live stream and emits container chunks while
//! active. Profile selection walks an ordered preference list down to a
//! guaranteed-supported bare container.

pub mod backend;
pub mod synthetic;

pub use backend::{
    select_profile, Encoder, EncoderError, EncoderFactory, EncodingProfile, DEFAULT_PROFILES,
};
pub use synthetic::{SyntheticEncoder, SyntheticEncoderFactory};
