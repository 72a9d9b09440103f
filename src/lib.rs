//! Stackpanel: a terminal control panel for Docker stacks managed by Portainer.
//!
//! This library exposes the core modules for use by the binary and by tests.

pub mod model;
pub mod error;
pub mod config;
pub mod cli;
pub mod logging;
pub mod portainer;
pub mod reconcile;
pub mod orchestrator;
pub mod stack_controller;
pub mod view;
pub mod app;
