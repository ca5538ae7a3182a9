//! Application setup, lifecycle state and input shortcuts.

/// App construction: plugins, resources, events and system scheduling.
pub mod app_setup;

/// Loading and running states and the transition between them.
pub mod app_state;

/// Keyboard shortcuts for camera targets, epoch stepping and view toggles.
pub mod shortcuts;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
