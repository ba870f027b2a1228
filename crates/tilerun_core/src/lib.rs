//! Engine-agnostic primitives shared by the simulation and its hosts.

pub mod input;
pub mod time;
