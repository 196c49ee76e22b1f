//! Mock capabilities and step handlers for coordinator tests.
//!
//! In-memory stand-ins for the external fleet manager, log sink, and the
//! build/upload collaborators, with call recording so tests can assert
//! what the coordinator did and did not touch.
#![allow(dead_code)]

pub mod mock_fleet;

pub use mock_fleet::*;
