//! Integration tests module
//!
//! This module organizes all integration tests for flac-bridge.

pub mod config_test;
pub mod cue_test;
pub mod decoder_test;
