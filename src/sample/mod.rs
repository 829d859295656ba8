//! Sampling interface for drawing models from d-DNNF circuits

pub mod probability;
pub mod sampler;

pub use self::sampler::Sampler;
