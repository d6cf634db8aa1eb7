//! Shared `no_std` building blocks for the driver crates.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod sync;
