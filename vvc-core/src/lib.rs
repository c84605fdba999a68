//! `vvc_core` -- typed Rust client for the VibrationVIEW automation object.
//!
//! VibrationVIEW is a vibration-controller application that exposes a COM
//! automation object (`VibrationVIEW.TestControl`) for external control.
//! This crate wraps that object as typed method calls: open and run
//! tests, read channel and sensor configuration (including TEDS), pull
//! measurement vectors, drive recording, and manage the host window.
//!
//! Every operation forwards to the host and blocks until it answers; the
//! crate owns no test logic, caches nothing, and never retries.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `VvError` taxonomy via `thiserror` |
//! | [`host`] | `TestControl` capability trait mirroring the host object |
//! | [`client`] | `VibrationView` facade: validation, conversion, lifecycle |
//! | [`fake`] | Scripted in-memory host double for host-free testing |
//! | [`types`], [`vector`], [`teds`] | Owned value snapshots |
//! | `com` | Windows-only `IDispatch` adapter to the live host |
//!
//! # Example
//!
//! ```no_run
//! use vvc_core::VibrationView;
//!
//! let mut vv = VibrationView::connect();
//! if !vv.is_connected() {
//!     eprintln!("VibrationVIEW is not running");
//!     return;
//! }
//! println!("version {}", vv.software_version().unwrap());
//! vv.open_test(r"C:\VibrationVIEW\Profiles\Sine.vsp").unwrap();
//! vv.start_test().unwrap();
//! ```

pub mod client;
pub mod errors;
pub mod fake;
pub mod host;
pub mod teds;
pub mod types;
pub mod vector;

#[cfg(windows)]
pub mod com;

pub use client::VibrationView;
pub use errors::VvError;
pub use host::TestControl;
pub use teds::{TedsProperty, TedsRecord};
pub use types::{TestStatus, TestType, WindowState, REAR_INPUT_CHANNELS};
pub use vector::{VectorData, VectorId};
