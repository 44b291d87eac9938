#![deny(
    // This is overly strict, of course. The intent is somewhat of a "quality seal," less to fix everything, and more to force us to add inline allows, which are even more needlessly verbose, but give us a mechanism to say "we think this is okay, but you might want to take a second look here."
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]
#![allow(clippy::module_name_repetitions)]

//! # tg-gen – synthetic software landscapes and call traces
//!
//! tg-gen fabricates applications made of nested packages, classes and methods, then simulates a
//! call trace walking them, producing a tree of timed spans that looks like the output of an
//! instrumented program.
//!
//! ## Pipeline overview
//! 1. Landscape generation ([`generate_landscape`](crate::landscape::generate_landscape)) – Build
//!    each application's package tree bottom-up, layer by layer, from size and shape parameters.
//! 2. Cohesive linking ([`link_cohesive`](crate::strategy::link_cohesive)) – For the cohesive
//!    communication style only, wire one class of every package to one class of the next package.
//! 3. Trace simulation ([`simulate`](crate::simulation::simulate)) – Drive a bounded call stack
//!    over the landscape, picking each next class with a [`CommunicationStyle`].
//! 4. Transport ([`clean`](crate::transport::clean) /
//!    [`reconstruct`](crate::transport::reconstruct)) – Convert live trees to and from a
//!    parent-free shape that can be serialized.
//!
//! Every stage draws randomness from an explicit, optionally seeded generator, so runs with the
//! same seed are reproducible and concurrent runs never share a random stream.

pub mod errors;
pub mod landscape;
pub mod model;
pub mod names;
pub mod params;
pub mod simulation;
pub mod strategy;
pub mod transport;
pub mod utils;

pub use errors::GenError;
pub use landscape::{
    generate,
    generate_landscape,
    generate_many,
};
pub use model::{
    Application,
    LandscapeStats,
    Span,
};
pub use params::{
    CommunicationStyle,
    GenerationParams,
    TraceParams,
};
pub use simulation::{
    simulate,
    simulate_detailed,
    SimulationOutcome,
};
pub use transport::{
    clean,
    reconstruct,
    reconstruct_landscape,
    CleanApplication,
    LandscapeImport,
};
