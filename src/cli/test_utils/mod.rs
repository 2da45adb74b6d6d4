//! Test utilities and mock implementations for CLI testing
//!
//! Provides mock adapter implementations and fixture runners so commands can
//! be exercised without a remote API or a terminal.

pub mod mocks;

pub use mocks::{
    ManualClock, MockApiClient, MockBackup, MockEndpoint, MockResource, RecordingOutput,
    ScriptedPrompter,
};
