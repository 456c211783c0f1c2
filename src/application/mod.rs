// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Coordinates the other layers for each user action.
//
//   config.rs     - LabConfig: defaults, JSON file, validation
//   session.rs    - the model slot plus every operation on it
//   controller.rs - Request → Response, failures as status text
//
// Rules for this layer:
//   - No ML math or tensor code here (that's Layer 5)
//   - No argument parsing or stdin handling (that's Layer 1)
//   - No file formats or HTTP (that's Layer 6)
//
// Reference: Rust Book §7 (Module System)

/// Session configuration
pub mod config;

/// Model slot and lifecycle operations
pub mod session;

/// Request dispatch and response rendering
pub mod controller;
