//! Fugata CLI library.
//!
//! This crate provides the core functionality for the Fugata CLI:
//! spec loading, score generation commands, and report writing.

pub mod cli_args;
pub mod commands;
pub mod input;
