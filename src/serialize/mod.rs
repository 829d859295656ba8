//! Readers for serialized circuits

pub mod nnf;

pub use self::nnf::Header;
