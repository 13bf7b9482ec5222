//! Interfaces of the collaborators consulted while building certification paths

pub mod pki_environment_traits;

pub use crate::environment::pki_environment_traits::*;
