//! The automation client facade.
//!
//! [`VibrationView`] owns the connection handle, validates arguments,
//! converts host-native shapes into the owned snapshot types, and maps
//! every failure into the [`VvError`] taxonomy.  It holds no other state:
//! nothing is cached, every readback re-queries the host, and no call
//! polls for a host state transition -- test control is fire-and-forget
//! and the status queries are the caller's tool for sequencing.

use log::{debug, error};

use crate::errors::VvError;
use crate::host::TestControl;
use crate::teds::TedsRecord;
use crate::types::{TestStatus, TestType, WindowState, REAR_INPUT_CHANNELS};
use crate::vector::{VectorData, VectorId};

/// Result alias for the public client surface.
pub type Result<T> = std::result::Result<T, VvError>;

/// Client handle to a VibrationVIEW automation object.
///
/// One instance owns one handle for its lifetime.  Operations take
/// `&mut self`; the handle is never shared, so independent instances can
/// be used (and tested) in isolation.  Access from multiple threads must
/// be serialized by the caller.
///
/// Construction never fails: a failed attach leaves the handle empty and
/// every subsequent operation reports [`VvError::Connectivity`].  Probe
/// with [`is_connected`](Self::is_connected) or
/// [`software_version`](Self::software_version) after construction.
pub struct VibrationView {
    host: Option<Box<dyn TestControl>>,
}

impl VibrationView {
    /// Attach to a running VibrationVIEW instance.
    ///
    /// A single attach attempt, fail-fast: the host is never launched and
    /// the attach is never retried.  On any platform other than Windows
    /// the handle is always empty.
    pub fn connect() -> Self {
        Self {
            host: Self::attach_host(),
        }
    }

    #[cfg(windows)]
    fn attach_host() -> Option<Box<dyn TestControl>> {
        match crate::com::ComTestControl::attach() {
            Ok(host) => {
                debug!("attached to VibrationVIEW automation object");
                Some(Box::new(host))
            }
            Err(e) => {
                error!("failed to attach to VibrationVIEW: {e}");
                None
            }
        }
    }

    #[cfg(not(windows))]
    fn attach_host() -> Option<Box<dyn TestControl>> {
        error!("VibrationVIEW COM automation requires Windows");
        None
    }

    /// Build a client around any [`TestControl`] implementation.
    ///
    /// This is the substitution seam: inject
    /// [`FakeTestControl`](crate::fake::FakeTestControl) to exercise the
    /// full client surface without the host installed.
    pub fn with_host(host: impl TestControl + 'static) -> Self {
        Self {
            host: Some(Box::new(host)),
        }
    }

    /// Whether a handle is currently held.  Does not round-trip to the
    /// host; use [`is_ready`](Self::is_ready) for a live probe.
    pub fn is_connected(&self) -> bool {
        self.host.is_some()
    }

    /// Release the handle.  Idempotent: closing an already-closed client
    /// does nothing.  Every operation after close reports
    /// [`VvError::Connectivity`].
    pub fn close(&mut self) {
        if self.host.take().is_some() {
            debug!("released VibrationVIEW handle");
        }
    }

    fn host_mut(&mut self) -> Result<&mut (dyn TestControl + 'static)> {
        self.host.as_deref_mut().ok_or_else(|| {
            VvError::Connectivity("not attached to a running VibrationVIEW instance".to_owned())
        })
    }

    // -- Validation helpers --

    fn checked_path<'p>(operation: &str, path: &'p str) -> Result<&'p str> {
        if path.is_empty() {
            Err(VvError::Argument(format!("{operation}: path is empty")))
        } else {
            Ok(path)
        }
    }

    fn checked_value(operation: &str, value: f64) -> Result<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(VvError::Argument(format!(
                "{operation}: value must be finite, got {value}"
            )))
        }
    }

    /// Bounds-check an input channel index against the live hardware
    /// count.  Re-queried on every call; channel counts are host state.
    fn checked_input_channel(&mut self, operation: &str, channel: u32) -> Result<u32> {
        let count = self.host_mut()?.hardware_input_channels()?;
        if channel >= count {
            return Err(VvError::Argument(format!(
                "{operation}: channel index {channel} out of range for {count} input channels"
            )));
        }
        Ok(channel)
    }

    fn checked_output_loop(&mut self, operation: &str, control_loop: u32) -> Result<u32> {
        let count = self.host_mut()?.hardware_output_channels()?;
        if control_loop >= count {
            return Err(VvError::Argument(format!(
                "{operation}: loop index {control_loop} out of range for {count} output channels"
            )));
        }
        Ok(control_loop)
    }

    fn checked_rear_input(operation: &str, channel: u32) -> Result<u32> {
        if channel >= REAR_INPUT_CHANNELS {
            return Err(VvError::Argument(format!(
                "{operation}: rear input index {channel} out of range for {REAR_INPUT_CHANNELS} channels"
            )));
        }
        Ok(channel)
    }

    // -- Connection probes --

    /// Host software version string.
    pub fn software_version(&mut self) -> Result<String> {
        self.host_mut()?.software_version()
    }

    /// Whether the host and its front-end hardware are up.
    pub fn is_ready(&mut self) -> Result<bool> {
        self.host_mut()?.is_ready()
    }

    // -- Test control --

    /// Open a test profile and immediately start it.
    pub fn run_test(&mut self, path: &str) -> Result<()> {
        let path = Self::checked_path("RunTest", path)?;
        self.host_mut()?.run_test(path)
    }

    /// Open a test profile without starting it.
    pub fn open_test(&mut self, path: &str) -> Result<()> {
        let path = Self::checked_path("OpenTest", path)?;
        self.host_mut()?.open_test(path)
    }

    /// Open a test profile in the host's test editor.
    pub fn edit_test(&mut self, path: &str) -> Result<()> {
        let path = Self::checked_path("EditTest", path)?;
        self.host_mut()?.edit_test(path)
    }

    /// Abort any open edit session.
    pub fn abort_edit(&mut self) -> Result<()> {
        self.host_mut()?.abort_edit()
    }

    /// Start the currently loaded test.
    pub fn start_test(&mut self) -> Result<()> {
        self.host_mut()?.start_test()
    }

    /// Stop the running test.
    pub fn stop_test(&mut self) -> Result<()> {
        self.host_mut()?.stop_test()
    }

    /// Resume a stopped test from where it left off.
    pub fn resume_test(&mut self) -> Result<()> {
        self.host_mut()?.resume_test()
    }

    /// Whether a stopped test may be resumed.
    pub fn can_resume_test(&mut self) -> Result<bool> {
        self.host_mut()?.can_resume_test()
    }

    /// Save current live data to a host-side file.
    pub fn save_data(&mut self, path: &str) -> Result<()> {
        let path = Self::checked_path("SaveData", path)?;
        self.host_mut()?.save_data(path)
    }

    /// Send a raw menu command id to the host.
    pub fn menu_command(&mut self, id: i32) -> Result<()> {
        self.host_mut()?.menu_command(id)
    }

    // -- Status --

    /// Stop-code snapshot.
    pub fn status(&mut self) -> Result<TestStatus> {
        let (stop_code, stop_code_index) = self.host_mut()?.status()?;
        Ok(TestStatus {
            stop_code,
            stop_code_index,
        })
    }

    pub fn is_running(&mut self) -> Result<bool> {
        self.host_mut()?.running()
    }

    /// Test is starting but not yet at level.
    pub fn is_starting(&mut self) -> Result<bool> {
        self.host_mut()?.starting()
    }

    /// Test schedule is changing levels.
    pub fn is_changing_level(&mut self) -> Result<bool> {
        self.host_mut()?.changing_level()
    }

    /// Schedule timer is in hold.
    pub fn is_hold_level(&mut self) -> Result<bool> {
        self.host_mut()?.hold_level()
    }

    pub fn is_open_loop(&mut self) -> Result<bool> {
        self.host_mut()?.open_loop()
    }

    pub fn is_aborted(&mut self) -> Result<bool> {
        self.host_mut()?.aborted()
    }

    // -- Data retrieval --
    //
    // The host sizes each reply by the size of the array it is handed, so
    // the facade pre-sizes every read from the live hardware counts.

    /// Live reading per input channel.
    pub fn channel_readings(&mut self) -> Result<Vec<f64>> {
        let host = self.host_mut()?;
        let len = host.hardware_input_channels()? as usize;
        host.channel(len)
    }

    /// Demand value per control loop.
    pub fn demand(&mut self) -> Result<Vec<f64>> {
        let host = self.host_mut()?;
        let len = host.hardware_output_channels()? as usize;
        host.demand(len)
    }

    /// Control value per control loop.
    pub fn control(&mut self) -> Result<Vec<f64>> {
        let host = self.host_mut()?;
        let len = host.hardware_output_channels()? as usize;
        host.control(len)
    }

    /// Drive output value per control loop.
    pub fn output(&mut self) -> Result<Vec<f64>> {
        let host = self.host_mut()?;
        let len = host.hardware_output_channels()? as usize;
        host.output(len)
    }

    /// Readings from the rear-panel input bank.
    pub fn rear_input(&mut self) -> Result<Vec<f64>> {
        self.host_mut()?.rear_input(REAR_INPUT_CHANNELS as usize)
    }

    /// One host data vector with its display metadata, as a single
    /// owned snapshot.
    pub fn vector(&mut self, id: VectorId) -> Result<VectorData> {
        let host = self.host_mut()?;
        let len = host.vector_length(id.raw())?;
        let samples = host.vector(id.raw(), len)?;
        let label = host.vector_label(id.raw())?;
        let unit = host.vector_unit(id.raw())?;
        Ok(VectorData {
            label,
            unit,
            samples,
        })
    }

    /// Required sample count for a host vector.
    pub fn vector_length(&mut self, id: VectorId) -> Result<usize> {
        self.host_mut()?.vector_length(id.raw())
    }

    /// Display label for a host vector.
    pub fn vector_label(&mut self, id: VectorId) -> Result<String> {
        self.host_mut()?.vector_label(id.raw())
    }

    /// Unit string for a host vector.
    pub fn vector_unit(&mut self, id: VectorId) -> Result<String> {
        self.host_mut()?.vector_unit(id.raw())
    }

    /// Report field value by field name.
    pub fn report_field(&mut self, field: &str) -> Result<String> {
        if field.is_empty() {
            return Err(VvError::Argument("ReportField: field name is empty".into()));
        }
        self.host_mut()?.report_field(field)
    }

    // -- Hardware and channel configuration --

    /// Number of hardware input channels.
    pub fn hardware_input_channels(&mut self) -> Result<u32> {
        self.host_mut()?.hardware_input_channels()
    }

    /// Number of hardware output channels.
    pub fn hardware_output_channels(&mut self) -> Result<u32> {
        self.host_mut()?.hardware_output_channels()
    }

    /// Front-end hardware serial number.
    pub fn hardware_serial_number(&mut self) -> Result<u32> {
        self.host_mut()?.hardware_serial_number()
    }

    /// Display label of an input channel (0-based index).
    pub fn channel_label(&mut self, channel: u32) -> Result<String> {
        let channel = self.checked_input_channel("ChannelLabel", channel)?;
        self.host_mut()?.channel_label(channel)
    }

    /// Unit string of an input channel (0-based index).
    pub fn channel_unit(&mut self, channel: u32) -> Result<String> {
        let channel = self.checked_input_channel("ChannelUnit", channel)?;
        self.host_mut()?.channel_unit(channel)
    }

    /// Display label of a control loop (0-based index).
    pub fn control_label(&mut self, control_loop: u32) -> Result<String> {
        let control_loop = self.checked_output_loop("ControlLabel", control_loop)?;
        self.host_mut()?.control_label(control_loop)
    }

    /// Unit string of a control loop (0-based index).
    pub fn control_unit(&mut self, control_loop: u32) -> Result<String> {
        let control_loop = self.checked_output_loop("ControlUnit", control_loop)?;
        self.host_mut()?.control_unit(control_loop)
    }

    /// Display label of a rear-panel input.
    pub fn rear_input_label(&mut self, channel: u32) -> Result<String> {
        let channel = Self::checked_rear_input("RearInputLabel", channel)?;
        self.host_mut()?.rear_input_label(channel)
    }

    /// Unit string of a rear-panel input.
    pub fn rear_input_unit(&mut self, channel: u32) -> Result<String> {
        let channel = Self::checked_rear_input("RearInputUnit", channel)?;
        self.host_mut()?.rear_input_unit(channel)
    }

    /// Sensitivity of an input channel, in mV per engineering unit.
    pub fn input_sensitivity(&mut self, channel: u32) -> Result<f64> {
        let channel = self.checked_input_channel("InputSensitivity", channel)?;
        self.host_mut()?.input_sensitivity(channel)
    }

    /// Engineering scale factor of an input channel.
    pub fn input_engineering_scale(&mut self, channel: u32) -> Result<f64> {
        let channel = self.checked_input_channel("InputEngineeringScale", channel)?;
        self.host_mut()?.input_engineering_scale(channel)
    }

    /// Serial number recorded for an input channel's transducer.
    pub fn input_serial_number(&mut self, channel: u32) -> Result<String> {
        let channel = self.checked_input_channel("InputSerialNumber", channel)?;
        self.host_mut()?.input_serial_number(channel)
    }

    /// Calibration date recorded for an input channel.
    pub fn input_cal_date(&mut self, channel: u32) -> Result<String> {
        let channel = self.checked_input_channel("InputCalDate", channel)?;
        self.host_mut()?.input_cal_date(channel)
    }

    pub fn input_capacitor_coupled(&mut self, channel: u32) -> Result<bool> {
        let channel = self.checked_input_channel("InputCapacitorCoupled", channel)?;
        self.host_mut()?.input_capacitor_coupled(channel)
    }

    pub fn set_input_capacitor_coupled(&mut self, channel: u32, value: bool) -> Result<()> {
        let channel = self.checked_input_channel("InputCapacitorCoupled", channel)?;
        self.host_mut()?.set_input_capacitor_coupled(channel, value)
    }

    pub fn input_accel_power_source(&mut self, channel: u32) -> Result<bool> {
        let channel = self.checked_input_channel("InputAccelPowerSource", channel)?;
        self.host_mut()?.input_accel_power_source(channel)
    }

    pub fn set_input_accel_power_source(&mut self, channel: u32, value: bool) -> Result<()> {
        let channel = self.checked_input_channel("InputAccelPowerSource", channel)?;
        self.host_mut()?.set_input_accel_power_source(channel, value)
    }

    pub fn input_differential(&mut self, channel: u32) -> Result<bool> {
        let channel = self.checked_input_channel("InputDifferential", channel)?;
        self.host_mut()?.input_differential(channel)
    }

    pub fn set_input_differential(&mut self, channel: u32, value: bool) -> Result<()> {
        let channel = self.checked_input_channel("InputDifferential", channel)?;
        self.host_mut()?.set_input_differential(channel, value)
    }

    /// Set power source, capacitor coupling, and differential mode of an
    /// input channel in one call.
    pub fn input_mode(
        &mut self,
        channel: u32,
        accel_power_source: bool,
        capacitor_coupled: bool,
        differential: bool,
    ) -> Result<()> {
        let channel = self.checked_input_channel("InputMode", channel)?;
        self.host_mut()?
            .input_mode(channel, accel_power_source, capacitor_coupled, differential)
    }

    /// Write an input channel's calibration record.
    pub fn input_calibration(
        &mut self,
        channel: u32,
        sensitivity: f64,
        serial_number: &str,
        cal_date: &str,
    ) -> Result<()> {
        let channel = self.checked_input_channel("InputCalibration", channel)?;
        let sensitivity = Self::checked_value("InputCalibration", sensitivity)?;
        self.host_mut()?
            .input_calibration(channel, sensitivity, serial_number, cal_date)
    }

    pub fn hardware_supports_capacitor_coupled(&mut self, channel: u32) -> Result<bool> {
        let channel = self.checked_input_channel("HardwareSupportsCapacitorCoupled", channel)?;
        self.host_mut()?.hardware_supports_capacitor_coupled(channel)
    }

    pub fn hardware_supports_accel_power_source(&mut self, channel: u32) -> Result<bool> {
        let channel = self.checked_input_channel("HardwareSupportsAccelPowerSource", channel)?;
        self.host_mut()?.hardware_supports_accel_power_source(channel)
    }

    pub fn hardware_supports_differential(&mut self, channel: u32) -> Result<bool> {
        let channel = self.checked_input_channel("HardwareSupportsDifferential", channel)?;
        self.host_mut()?.hardware_supports_differential(channel)
    }

    /// Load an input configuration file on the host.
    pub fn set_input_configuration_file(&mut self, path: &str) -> Result<()> {
        let path = Self::checked_path("InputConfigurationFile", path)?;
        self.host_mut()?.set_input_configuration_file(path)
    }

    // -- TEDS --

    /// TEDS records for one channel, or for every hardware input channel.
    ///
    /// Always returns one record per requested channel, keyed by 1-based
    /// channel number; a channel whose sheet cannot be read gets its
    /// host-reported error embedded in the record instead of failing the
    /// whole sweep.
    pub fn teds(&mut self, channel: Option<u32>) -> Result<Vec<TedsRecord>> {
        let count = self.host_mut()?.hardware_input_channels()?;
        let channels: Vec<u32> = match channel {
            Some(ch) => {
                if ch >= count {
                    return Err(VvError::Argument(format!(
                        "Teds: channel index {ch} out of range for {count} input channels"
                    )));
                }
                vec![ch]
            }
            None => (0..count).collect(),
        };

        let host = self.host_mut()?;
        let mut records = Vec::with_capacity(channels.len());
        for ch in channels {
            match host.teds(ch) {
                Ok(pairs) => records.push(TedsRecord::from_pairs(ch + 1, pairs)),
                // Feature gating is a property of the host version, not
                // of one channel; it fails the whole request.
                Err(e @ VvError::UnavailableFeature { .. }) => return Err(e),
                Err(e) => records.push(TedsRecord::from_error(ch + 1, e.to_string())),
            }
        }
        Ok(records)
    }

    // -- Sine sweep control --

    /// Sweep up from the current sine frequency.
    pub fn sweep_up(&mut self) -> Result<()> {
        self.host_mut()?.sweep_up()
    }

    /// Sweep down from the current sine frequency.
    pub fn sweep_down(&mut self) -> Result<()> {
        self.host_mut()?.sweep_down()
    }

    /// Sweep up to the next integer frequency.
    pub fn sweep_step_up(&mut self) -> Result<()> {
        self.host_mut()?.sweep_step_up()
    }

    /// Sweep down to the next integer frequency.
    pub fn sweep_step_down(&mut self) -> Result<()> {
        self.host_mut()?.sweep_step_down()
    }

    /// Hold the sweep at the current frequency.
    pub fn sweep_hold(&mut self) -> Result<()> {
        self.host_mut()?.sweep_hold()
    }

    /// Hold the sweep on the tracked resonance.
    pub fn sweep_resonance_hold(&mut self) -> Result<()> {
        self.host_mut()?.sweep_resonance_hold()
    }

    // -- Tunable properties --

    /// Currently loaded test type.
    pub fn test_type(&mut self) -> Result<TestType> {
        let raw = self.host_mut()?.test_type()?;
        TestType::from_host("TestType", raw)
    }

    pub fn set_test_type(&mut self, value: TestType) -> Result<()> {
        self.host_mut()?.set_test_type(value.raw())
    }

    pub fn sine_frequency(&mut self) -> Result<f64> {
        self.host_mut()?.sine_frequency()
    }

    pub fn set_sine_frequency(&mut self, value: f64) -> Result<()> {
        let value = Self::checked_value("SineFrequency", value)?;
        self.host_mut()?.set_sine_frequency(value)
    }

    pub fn system_check_frequency(&mut self) -> Result<f64> {
        self.host_mut()?.system_check_frequency()
    }

    pub fn set_system_check_frequency(&mut self, value: f64) -> Result<()> {
        let value = Self::checked_value("SystemCheckFrequency", value)?;
        self.host_mut()?.set_system_check_frequency(value)
    }

    pub fn system_check_output_voltage(&mut self) -> Result<f64> {
        self.host_mut()?.system_check_output_voltage()
    }

    pub fn set_system_check_output_voltage(&mut self, value: f64) -> Result<()> {
        let value = Self::checked_value("SystemCheckOutputVoltage", value)?;
        self.host_mut()?.set_system_check_output_voltage(value)
    }

    /// Demand output multiplier in dB.
    pub fn demand_multiplier(&mut self) -> Result<f64> {
        self.host_mut()?.demand_multiplier()
    }

    pub fn set_demand_multiplier(&mut self, value: f64) -> Result<()> {
        let value = Self::checked_value("DemandMultiplier", value)?;
        self.host_mut()?.set_demand_multiplier(value)
    }

    /// Linear sine sweep multiplier.
    pub fn sweep_multiplier(&mut self) -> Result<f64> {
        self.host_mut()?.sweep_multiplier()
    }

    pub fn set_sweep_multiplier(&mut self, value: f64) -> Result<()> {
        let value = Self::checked_value("SweepMultiplier", value)?;
        self.host_mut()?.set_sweep_multiplier(value)
    }

    // -- Recording --

    /// Start recording on the host.
    pub fn record_start(&mut self) -> Result<()> {
        self.host_mut()?.record_start()
    }

    /// Stop recording on the host.
    pub fn record_stop(&mut self) -> Result<()> {
        self.host_mut()?.record_stop()
    }

    /// Pause recording on the host.
    pub fn record_pause(&mut self) -> Result<()> {
        self.host_mut()?.record_pause()
    }

    /// Filename of the most recent recording.  The file lives on the
    /// host side; no durability guarantee is made here.
    pub fn record_filename(&mut self) -> Result<String> {
        self.host_mut()?.record_filename()
    }

    // -- Window management --

    /// Minimize the host's main window.
    pub fn minimize(&mut self) -> Result<()> {
        self.host_mut()?.minimize()
    }

    /// Maximize the host's main window.
    pub fn maximize(&mut self) -> Result<()> {
        self.host_mut()?.maximize()
    }

    /// Restore the host's main window.
    pub fn restore(&mut self) -> Result<()> {
        self.host_mut()?.restore()
    }

    /// Bring the host's main window to the foreground.
    pub fn activate(&mut self) -> Result<()> {
        self.host_mut()?.activate()
    }

    /// Snapshot of the host's main window state.
    pub fn window_state(&mut self) -> Result<WindowState> {
        self.host_mut()?.window_state()
    }
}

impl Drop for VibrationView {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTestControl;

    #[test]
    fn test_close_is_idempotent() {
        let mut vv = VibrationView::with_host(FakeTestControl::new());
        assert!(vv.is_connected());
        vv.close();
        vv.close();
        assert!(!vv.is_connected());
    }

    #[test]
    fn test_every_call_after_close_is_connectivity() {
        let mut vv = VibrationView::with_host(FakeTestControl::new());
        vv.close();
        assert!(matches!(vv.start_test(), Err(VvError::Connectivity(_))));
        assert!(matches!(vv.software_version(), Err(VvError::Connectivity(_))));
        assert!(matches!(vv.channel_label(0), Err(VvError::Connectivity(_))));
        assert!(matches!(vv.teds(None), Err(VvError::Connectivity(_))));
        assert!(matches!(vv.minimize(), Err(VvError::Connectivity(_))));
    }

    #[test]
    fn test_empty_path_rejected_before_host() {
        let mut vv = VibrationView::with_host(FakeTestControl::new());
        assert!(matches!(vv.open_test(""), Err(VvError::Argument(_))));
        assert!(matches!(vv.run_test(""), Err(VvError::Argument(_))));
        assert!(matches!(vv.save_data(""), Err(VvError::Argument(_))));
        assert!(matches!(
            vv.set_input_configuration_file(""),
            Err(VvError::Argument(_))
        ));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut vv = VibrationView::with_host(FakeTestControl::new());
        assert!(matches!(
            vv.set_sine_frequency(f64::NAN),
            Err(VvError::Argument(_))
        ));
        assert!(matches!(
            vv.set_demand_multiplier(f64::INFINITY),
            Err(VvError::Argument(_))
        ));
    }
}
