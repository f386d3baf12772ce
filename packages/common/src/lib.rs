//! Common - Shared Types and Utilities for Universal Gateway Contracts
//!
//! This package provides shared type definitions and utility functions
//! used across the Universal Gateway smart contracts.

pub mod asset;

pub use asset::{Asset, AssetInfo};
