#![deny(
    // This is overly strict, of course. The intent is somewhat of a "quality seal," less to fix everything, and more to force us to add inline allows, which are even more needlessly verbose, but give us a mechanism to say "we think this is okay, but you might want to take a second look here."
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]

//! # tg-core – shared plumbing for the trace generator
//!
//! Everything here is ambient: logging setup and the construction of the explicit pseudorandom
//! handles that the engine threads through every call.

pub mod logging;
pub mod rng;
