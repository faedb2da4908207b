//! # Equipment interface crate.
//!
//! Provides the common equipment and telecommand interfaces for the intake
//! control software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommand definitions and parsing
pub mod tc;

/// Interface definitions for equipment (motors and sensors)
pub mod eqpt;
