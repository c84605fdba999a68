//! The host capability trait.
//!
//! [`TestControl`] mirrors the operation set of the VibrationVIEW
//! automation object (`VibrationVIEW.TestControl`), one method per host
//! operation, with host-native shapes: raw `i32` vector ids, raw channel
//! indices, bare strings and floats.  Validation and conversion into the
//! owned snapshot types live one level up in [`crate::client`].
//!
//! Two implementations exist:
//!
//! - `ComTestControl` (`cfg(windows)`) -- late-bound `IDispatch` calls
//!   into the live host process;
//! - [`crate::fake::FakeTestControl`] -- an in-memory scripted double,
//!   used by the test suites and available to downstream callers.

use crate::errors::VvError;
use crate::types::WindowState;

/// Result alias used throughout the host boundary.
pub type HostResult<T> = Result<T, VvError>;

/// Capability set of the VibrationVIEW automation object.
///
/// Implementations forward each call to their backing store (live COM
/// object or scripted state) and report failures through the [`VvError`]
/// taxonomy; they perform no argument validation of their own.
pub trait TestControl {
    // -- Basic control --

    /// Open a test profile and immediately start it.
    fn run_test(&mut self, path: &str) -> HostResult<()>;

    /// Open a test profile without starting it.
    fn open_test(&mut self, path: &str) -> HostResult<()>;

    /// Open a test profile in the host's editor.
    fn edit_test(&mut self, path: &str) -> HostResult<()>;

    /// Abort any open edit session.
    fn abort_edit(&mut self) -> HostResult<()>;

    /// Start the currently loaded test.
    fn start_test(&mut self) -> HostResult<()>;

    /// Stop the running test.
    fn stop_test(&mut self) -> HostResult<()>;

    /// Resume a stopped test from where it left off.
    fn resume_test(&mut self) -> HostResult<()>;

    /// Save the current live data to `path`.
    fn save_data(&mut self, path: &str) -> HostResult<()>;

    /// Send a raw menu command id to the host.
    fn menu_command(&mut self, id: i32) -> HostResult<()>;

    // -- Window management --

    fn minimize(&mut self) -> HostResult<()>;
    fn maximize(&mut self) -> HostResult<()>;
    fn restore(&mut self) -> HostResult<()>;
    fn activate(&mut self) -> HostResult<()>;

    /// Snapshot of the host's main window.  The automation object has no
    /// window-state getter, so the real adapter reads this from the
    /// platform window manager.
    fn window_state(&mut self) -> HostResult<WindowState>;

    // -- Status --

    /// Stop-code text and stop-code index, as the host reports them.
    fn status(&mut self) -> HostResult<(String, i32)>;

    /// Test is running.
    fn running(&mut self) -> HostResult<bool>;

    /// Test is starting but not yet at level.
    fn starting(&mut self) -> HostResult<bool>;

    /// Test schedule is changing levels.
    fn changing_level(&mut self) -> HostResult<bool>;

    /// Schedule timer is in hold.
    fn hold_level(&mut self) -> HostResult<bool>;

    /// Test is running open loop.
    fn open_loop(&mut self) -> HostResult<bool>;

    /// Test has aborted.
    fn aborted(&mut self) -> HostResult<bool>;

    /// A stopped test may be resumed.
    fn can_resume_test(&mut self) -> HostResult<bool>;

    /// Host and front-end hardware are up.
    fn is_ready(&mut self) -> HostResult<bool>;

    // -- Data retrieval --
    //
    // The host sizes its reply by the size of the array it is handed, so
    // every array read takes the caller-determined length.

    /// Live input channel readings.
    fn channel(&mut self, len: usize) -> HostResult<Vec<f64>>;

    /// Demand value per control loop.
    fn demand(&mut self, len: usize) -> HostResult<Vec<f64>>;

    /// Control value per control loop.
    fn control(&mut self, len: usize) -> HostResult<Vec<f64>>;

    /// Drive output value per control loop.
    fn output(&mut self, len: usize) -> HostResult<Vec<f64>>;

    /// Rear-panel input readings.
    fn rear_input(&mut self, len: usize) -> HostResult<Vec<f64>>;

    /// Raw data vector samples for a host vector id.
    fn vector(&mut self, id: i32, len: usize) -> HostResult<Vec<f64>>;

    /// Required array length for a host vector id.
    fn vector_length(&mut self, id: i32) -> HostResult<usize>;

    /// Display label for a host vector id.
    fn vector_label(&mut self, id: i32) -> HostResult<String>;

    /// Unit string for a host vector id.
    fn vector_unit(&mut self, id: i32) -> HostResult<String>;

    /// Report field value by field name.
    fn report_field(&mut self, field: &str) -> HostResult<String>;

    // -- Hardware and channel configuration --

    fn hardware_input_channels(&mut self) -> HostResult<u32>;
    fn hardware_output_channels(&mut self) -> HostResult<u32>;
    fn hardware_serial_number(&mut self) -> HostResult<u32>;
    fn software_version(&mut self) -> HostResult<String>;

    fn channel_label(&mut self, channel: u32) -> HostResult<String>;
    fn channel_unit(&mut self, channel: u32) -> HostResult<String>;
    fn control_label(&mut self, control_loop: u32) -> HostResult<String>;
    fn control_unit(&mut self, control_loop: u32) -> HostResult<String>;
    fn rear_input_label(&mut self, channel: u32) -> HostResult<String>;
    fn rear_input_unit(&mut self, channel: u32) -> HostResult<String>;

    fn input_sensitivity(&mut self, channel: u32) -> HostResult<f64>;
    fn input_engineering_scale(&mut self, channel: u32) -> HostResult<f64>;
    fn input_serial_number(&mut self, channel: u32) -> HostResult<String>;
    fn input_cal_date(&mut self, channel: u32) -> HostResult<String>;

    fn input_capacitor_coupled(&mut self, channel: u32) -> HostResult<bool>;
    fn set_input_capacitor_coupled(&mut self, channel: u32, value: bool) -> HostResult<()>;
    fn input_accel_power_source(&mut self, channel: u32) -> HostResult<bool>;
    fn set_input_accel_power_source(&mut self, channel: u32, value: bool) -> HostResult<()>;
    fn input_differential(&mut self, channel: u32) -> HostResult<bool>;
    fn set_input_differential(&mut self, channel: u32, value: bool) -> HostResult<()>;

    /// Set power source, capacitor coupling, and differential mode in one
    /// call.
    fn input_mode(
        &mut self,
        channel: u32,
        accel_power_source: bool,
        capacitor_coupled: bool,
        differential: bool,
    ) -> HostResult<()>;

    /// Write a channel's calibration record.
    fn input_calibration(
        &mut self,
        channel: u32,
        sensitivity: f64,
        serial_number: &str,
        cal_date: &str,
    ) -> HostResult<()>;

    fn hardware_supports_capacitor_coupled(&mut self, channel: u32) -> HostResult<bool>;
    fn hardware_supports_accel_power_source(&mut self, channel: u32) -> HostResult<bool>;
    fn hardware_supports_differential(&mut self, channel: u32) -> HostResult<bool>;

    /// Load an input configuration file on the host.
    fn set_input_configuration_file(&mut self, path: &str) -> HostResult<()>;

    // -- TEDS --

    /// Ordered `(name, value)` property pairs of the transducer's
    /// embedded data sheet for one input channel.
    fn teds(&mut self, channel: u32) -> HostResult<Vec<(String, String)>>;

    // -- Sine sweep control --

    fn sweep_up(&mut self) -> HostResult<()>;
    fn sweep_down(&mut self) -> HostResult<()>;
    fn sweep_step_up(&mut self) -> HostResult<()>;
    fn sweep_step_down(&mut self) -> HostResult<()>;
    fn sweep_hold(&mut self) -> HostResult<()>;
    fn sweep_resonance_hold(&mut self) -> HostResult<()>;

    // -- Tunable properties --

    /// Host test-type discriminant (see [`crate::types::TestType`]).
    fn test_type(&mut self) -> HostResult<i32>;
    fn set_test_type(&mut self, value: i32) -> HostResult<()>;

    fn sine_frequency(&mut self) -> HostResult<f64>;
    fn set_sine_frequency(&mut self, value: f64) -> HostResult<()>;

    fn system_check_frequency(&mut self) -> HostResult<f64>;
    fn set_system_check_frequency(&mut self, value: f64) -> HostResult<()>;

    fn system_check_output_voltage(&mut self) -> HostResult<f64>;
    fn set_system_check_output_voltage(&mut self, value: f64) -> HostResult<()>;

    /// Demand output multiplier in dB.
    fn demand_multiplier(&mut self) -> HostResult<f64>;
    fn set_demand_multiplier(&mut self, value: f64) -> HostResult<()>;

    /// Linear sine sweep multiplier.
    fn sweep_multiplier(&mut self) -> HostResult<f64>;
    fn set_sweep_multiplier(&mut self, value: f64) -> HostResult<()>;

    // -- Recording --

    fn record_start(&mut self) -> HostResult<()>;
    fn record_stop(&mut self) -> HostResult<()>;
    fn record_pause(&mut self) -> HostResult<()>;

    /// Filename of the most recent recording, as reported by the host.
    fn record_filename(&mut self) -> HostResult<String>;
}
