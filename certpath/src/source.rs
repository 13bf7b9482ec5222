//! Sources of candidate issuer certificates and trust verdicts

pub mod cert_source;
pub mod trust_store;

pub use crate::{source::cert_source::*, source::trust_store::*};
