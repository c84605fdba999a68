//! Windows-only adapter to the live VibrationVIEW automation object.
//!
//! [`ComApartment`] wraps `CoInitializeEx` / `CoUninitialize` in an RAII
//! pattern so the COM apartment is correctly initialised and cleaned up,
//! even on panic or early return.  [`ComTestControl`] attaches to the
//! running host through [`dispatch::DispatchObject`] and implements the
//! [`TestControl`] capability trait over late-bound calls.
//!
//! The `PhantomData<*const ()>` field enforces `!Send` + `!Sync` at
//! compile time: the apartment, and therefore the adapter, stays on the
//! thread that created it.

pub mod dispatch;
pub mod window;

use windows::core::BSTR;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

use crate::errors::VvError;
use crate::host::{HostResult, TestControl};
use crate::types::WindowState;

use dispatch::{
    byref_bstr, byref_i32, variant_bool, variant_f64, variant_i32, variant_str, variant_to_bool,
    variant_to_f64, variant_to_i32, variant_to_string, variant_to_u32, DispatchObject,
    OwnedSafeArray,
};

/// ProgID the host registers its automation object under.
const PROGID: &str = "VibrationVIEW.TestControl";

/// TEDS sheets carry at most this many property rows.
const TEDS_ROWS: usize = 32;

/// RAII wrapper that calls `CoUninitialize` on `Drop` when appropriate.
///
/// Instantiate **once per thread** via [`ComApartment::init`].  The guard
/// tracks whether `CoInitializeEx` actually succeeded (vs.
/// `RPC_E_CHANGED_MODE`) and only calls `CoUninitialize` when a balancing
/// call is required per MSDN.
#[must_use = "ComApartment must be kept alive for the duration of COM usage"]
pub struct ComApartment {
    should_uninit: bool,
    _not_send: std::marker::PhantomData<*const ()>,
}

impl ComApartment {
    /// Initialise (or join) the thread's STA COM apartment.
    ///
    /// Returns `Ok` for `S_OK`, `S_FALSE`, and `RPC_E_CHANGED_MODE`
    /// (thread already has an MTA; COM is usable but we must NOT call
    /// `CoUninitialize` since we did not successfully initialise).
    pub fn init() -> Result<Self, VvError> {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };

        let hresult_value = hr.0 as u32;
        match hresult_value {
            // S_OK (newly initialised) or S_FALSE (already initialised).
            0x0 | 0x1 => Ok(Self {
                should_uninit: true,
                _not_send: std::marker::PhantomData,
            }),
            // RPC_E_CHANGED_MODE -- thread already has an MTA apartment.
            0x8001_0106 => {
                log::warn!(
                    "CoInitializeEx: RPC_E_CHANGED_MODE -- thread already has MTA apartment, \
                     using existing apartment instead of STA"
                );
                Ok(Self {
                    should_uninit: false,
                    _not_send: std::marker::PhantomData,
                })
            }
            _ => Err(VvError::Connectivity(format!(
                "CoInitializeEx failed: HRESULT 0x{hresult_value:08X}"
            ))),
        }
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.should_uninit {
            unsafe { CoUninitialize() };
        }
    }
}

/// Live-host implementation of [`TestControl`].
///
/// Holds the COM apartment for the thread it was created on; dropping the
/// adapter releases the automation object before the apartment closes.
pub struct ComTestControl {
    // Declared before `_apartment` so the dispatch handle drops first.
    object: DispatchObject,
    _apartment: ComApartment,
}

impl ComTestControl {
    /// Attach to the running VibrationVIEW instance.
    ///
    /// A single attempt, fail-fast: the host is never launched and the
    /// attach is never retried.
    pub fn attach() -> Result<Self, VvError> {
        let apartment = ComApartment::init()?;
        let object = DispatchObject::attach(PROGID)?;
        Ok(Self {
            object,
            _apartment: apartment,
        })
    }

    // -- Small forwarding helpers --

    fn verb(&self, operation: &str) -> HostResult<()> {
        self.object.call(operation, Vec::new())?;
        Ok(())
    }

    fn get_bool(&self, operation: &str) -> HostResult<bool> {
        variant_to_bool(operation, &self.object.get(operation)?)
    }

    fn get_f64(&self, operation: &str) -> HostResult<f64> {
        variant_to_f64(operation, &self.object.get(operation)?)
    }

    fn put_f64(&self, operation: &str, value: f64) -> HostResult<()> {
        self.object.put(operation, variant_f64(value))
    }

    fn call_with_path(&self, operation: &str, path: &str) -> HostResult<()> {
        self.object.call(operation, vec![variant_str(path)])?;
        Ok(())
    }

    fn channel_string(&self, operation: &str, channel: u32) -> HostResult<String> {
        let result = self
            .object
            .call(operation, vec![variant_i32(channel as i32)])?;
        variant_to_string(operation, &result)
    }

    fn channel_f64(&self, operation: &str, channel: u32) -> HostResult<f64> {
        let result = self
            .object
            .call(operation, vec![variant_i32(channel as i32)])?;
        variant_to_f64(operation, &result)
    }

    fn channel_bool(&self, operation: &str, channel: u32) -> HostResult<bool> {
        let result = self
            .object
            .call(operation, vec![variant_i32(channel as i32)])?;
        variant_to_bool(operation, &result)
    }

    fn channel_bool_put(&self, operation: &str, channel: u32, value: bool) -> HostResult<()> {
        self.object.call(
            operation,
            vec![variant_i32(channel as i32), variant_bool(value)],
        )?;
        Ok(())
    }

    /// Array read: hand the host a zeroed by-ref array of `len` elements
    /// and read back what it filled in.
    fn read_f64_bank(&self, operation: &str, len: usize) -> HostResult<Vec<f64>> {
        let mut array = OwnedSafeArray::f64_vector(operation, len)?;
        let byref = array.as_byref_variant();
        self.object.call(operation, vec![byref])?;
        array.read_f64(operation)
    }
}

impl TestControl for ComTestControl {
    // -- Basic control --

    fn run_test(&mut self, path: &str) -> HostResult<()> {
        self.call_with_path("RunTest", path)
    }

    fn open_test(&mut self, path: &str) -> HostResult<()> {
        self.call_with_path("OpenTest", path)
    }

    fn edit_test(&mut self, path: &str) -> HostResult<()> {
        self.call_with_path("EditTest", path)
    }

    fn abort_edit(&mut self) -> HostResult<()> {
        self.verb("AbortEdit")
    }

    fn start_test(&mut self) -> HostResult<()> {
        self.verb("StartTest")
    }

    fn stop_test(&mut self) -> HostResult<()> {
        self.verb("StopTest")
    }

    fn resume_test(&mut self) -> HostResult<()> {
        self.verb("ResumeTest")
    }

    fn save_data(&mut self, path: &str) -> HostResult<()> {
        self.call_with_path("SaveData", path)
    }

    fn menu_command(&mut self, id: i32) -> HostResult<()> {
        self.object.call("MenuCommand", vec![variant_i32(id)])?;
        Ok(())
    }

    // -- Window management --

    fn minimize(&mut self) -> HostResult<()> {
        self.verb("Minimize")
    }

    fn maximize(&mut self) -> HostResult<()> {
        self.verb("Maximize")
    }

    fn restore(&mut self) -> HostResult<()> {
        self.verb("Restore")
    }

    fn activate(&mut self) -> HostResult<()> {
        self.verb("Activate")
    }

    fn window_state(&mut self) -> HostResult<WindowState> {
        window::host_window_state()
    }

    // -- Status --

    fn status(&mut self) -> HostResult<(String, i32)> {
        let mut stop_code = BSTR::default();
        let mut stop_code_index = 0i32;
        {
            let args = vec![byref_bstr(&mut stop_code), byref_i32(&mut stop_code_index)];
            self.object.call("Status", args)?;
        }
        Ok((stop_code.to_string(), stop_code_index))
    }

    fn running(&mut self) -> HostResult<bool> {
        self.get_bool("Running")
    }

    fn starting(&mut self) -> HostResult<bool> {
        self.get_bool("Starting")
    }

    fn changing_level(&mut self) -> HostResult<bool> {
        self.get_bool("ChangingLevel")
    }

    fn hold_level(&mut self) -> HostResult<bool> {
        self.get_bool("HoldLevel")
    }

    fn open_loop(&mut self) -> HostResult<bool> {
        self.get_bool("OpenLoop")
    }

    fn aborted(&mut self) -> HostResult<bool> {
        self.get_bool("Aborted")
    }

    fn can_resume_test(&mut self) -> HostResult<bool> {
        self.get_bool("CanResumeTest")
    }

    fn is_ready(&mut self) -> HostResult<bool> {
        self.get_bool("IsReady")
    }

    // -- Data retrieval --

    fn channel(&mut self, len: usize) -> HostResult<Vec<f64>> {
        self.read_f64_bank("Channel", len)
    }

    fn demand(&mut self, len: usize) -> HostResult<Vec<f64>> {
        self.read_f64_bank("Demand", len)
    }

    fn control(&mut self, len: usize) -> HostResult<Vec<f64>> {
        self.read_f64_bank("Control", len)
    }

    fn output(&mut self, len: usize) -> HostResult<Vec<f64>> {
        self.read_f64_bank("Output", len)
    }

    fn rear_input(&mut self, len: usize) -> HostResult<Vec<f64>> {
        self.read_f64_bank("RearInput", len)
    }

    fn vector(&mut self, id: i32, len: usize) -> HostResult<Vec<f64>> {
        // The host expects a rows x 1 matrix and fills it in place.
        let mut array = OwnedSafeArray::f64_matrix("Vector", len)?;
        let byref = array.as_byref_variant();
        self.object.call("Vector", vec![byref, variant_i32(id)])?;
        array.read_f64("Vector")
    }

    fn vector_length(&mut self, id: i32) -> HostResult<usize> {
        let result = self.object.call("VectorLength", vec![variant_i32(id)])?;
        let len = variant_to_i32("VectorLength", &result)?;
        Ok(len.max(0) as usize)
    }

    fn vector_label(&mut self, id: i32) -> HostResult<String> {
        let result = self.object.call("VectorLabel", vec![variant_i32(id)])?;
        variant_to_string("VectorLabel", &result)
    }

    fn vector_unit(&mut self, id: i32) -> HostResult<String> {
        let result = self.object.call("VectorUnit", vec![variant_i32(id)])?;
        variant_to_string("VectorUnit", &result)
    }

    fn report_field(&mut self, field: &str) -> HostResult<String> {
        let result = self.object.call("ReportField", vec![variant_str(field)])?;
        variant_to_string("ReportField", &result)
    }

    // -- Hardware and channel configuration --

    fn hardware_input_channels(&mut self) -> HostResult<u32> {
        variant_to_u32(
            "HardwareInputChannels",
            &self.object.get("HardwareInputChannels")?,
        )
    }

    fn hardware_output_channels(&mut self) -> HostResult<u32> {
        variant_to_u32(
            "HardwareOutputChannels",
            &self.object.get("HardwareOutputChannels")?,
        )
    }

    fn hardware_serial_number(&mut self) -> HostResult<u32> {
        variant_to_u32(
            "HardwareSerialNumber",
            &self.object.get("HardwareSerialNumber")?,
        )
    }

    fn software_version(&mut self) -> HostResult<String> {
        variant_to_string("SoftwareVersion", &self.object.get("SoftwareVersion")?)
    }

    fn channel_label(&mut self, channel: u32) -> HostResult<String> {
        self.channel_string("ChannelLabel", channel)
    }

    fn channel_unit(&mut self, channel: u32) -> HostResult<String> {
        self.channel_string("ChannelUnit", channel)
    }

    fn control_label(&mut self, control_loop: u32) -> HostResult<String> {
        self.channel_string("ControlLabel", control_loop)
    }

    fn control_unit(&mut self, control_loop: u32) -> HostResult<String> {
        self.channel_string("ControlUnit", control_loop)
    }

    fn rear_input_label(&mut self, channel: u32) -> HostResult<String> {
        self.channel_string("RearInputLabel", channel)
    }

    fn rear_input_unit(&mut self, channel: u32) -> HostResult<String> {
        self.channel_string("RearInputUnit", channel)
    }

    fn input_sensitivity(&mut self, channel: u32) -> HostResult<f64> {
        self.channel_f64("InputSensitivity", channel)
    }

    fn input_engineering_scale(&mut self, channel: u32) -> HostResult<f64> {
        self.channel_f64("InputEngineeringScale", channel)
    }

    fn input_serial_number(&mut self, channel: u32) -> HostResult<String> {
        self.channel_string("InputSerialNumber", channel)
    }

    fn input_cal_date(&mut self, channel: u32) -> HostResult<String> {
        self.channel_string("InputCalDate", channel)
    }

    fn input_capacitor_coupled(&mut self, channel: u32) -> HostResult<bool> {
        self.channel_bool("InputCapacitorCoupled", channel)
    }

    fn set_input_capacitor_coupled(&mut self, channel: u32, value: bool) -> HostResult<()> {
        self.channel_bool_put("InputCapacitorCoupled", channel, value)
    }

    fn input_accel_power_source(&mut self, channel: u32) -> HostResult<bool> {
        self.channel_bool("InputAccelPowerSource", channel)
    }

    fn set_input_accel_power_source(&mut self, channel: u32, value: bool) -> HostResult<()> {
        self.channel_bool_put("InputAccelPowerSource", channel, value)
    }

    fn input_differential(&mut self, channel: u32) -> HostResult<bool> {
        self.channel_bool("InputDifferential", channel)
    }

    fn set_input_differential(&mut self, channel: u32, value: bool) -> HostResult<()> {
        self.channel_bool_put("InputDifferential", channel, value)
    }

    fn input_mode(
        &mut self,
        channel: u32,
        accel_power_source: bool,
        capacitor_coupled: bool,
        differential: bool,
    ) -> HostResult<()> {
        self.object.call(
            "InputMode",
            vec![
                variant_i32(channel as i32),
                variant_bool(accel_power_source),
                variant_bool(capacitor_coupled),
                variant_bool(differential),
            ],
        )?;
        Ok(())
    }

    fn input_calibration(
        &mut self,
        channel: u32,
        sensitivity: f64,
        serial_number: &str,
        cal_date: &str,
    ) -> HostResult<()> {
        self.object.call(
            "InputCalibration",
            vec![
                variant_i32(channel as i32),
                variant_f64(sensitivity),
                variant_str(serial_number),
                variant_str(cal_date),
            ],
        )?;
        Ok(())
    }

    fn hardware_supports_capacitor_coupled(&mut self, channel: u32) -> HostResult<bool> {
        self.channel_bool("HardwareSupportsCapacitorCoupled", channel)
    }

    fn hardware_supports_accel_power_source(&mut self, channel: u32) -> HostResult<bool> {
        self.channel_bool("HardwareSupportsAccelPowerSource", channel)
    }

    fn hardware_supports_differential(&mut self, channel: u32) -> HostResult<bool> {
        self.channel_bool("HardwareSupportsDifferential", channel)
    }

    fn set_input_configuration_file(&mut self, path: &str) -> HostResult<()> {
        self.object
            .put("InputConfigurationFile", variant_str(path))
    }

    // -- TEDS --

    fn teds(&mut self, channel: u32) -> HostResult<Vec<(String, String)>> {
        let mut array = OwnedSafeArray::string_pairs("Teds", TEDS_ROWS)?;
        let byref = array.as_byref_variant();
        self.object
            .call("Teds", vec![variant_i32(channel as i32), byref])?;
        array.read_string_pairs("Teds")
    }

    // -- Sine sweep control --

    fn sweep_up(&mut self) -> HostResult<()> {
        self.verb("SweepUp")
    }

    fn sweep_down(&mut self) -> HostResult<()> {
        self.verb("SweepDown")
    }

    fn sweep_step_up(&mut self) -> HostResult<()> {
        self.verb("SweepStepUp")
    }

    fn sweep_step_down(&mut self) -> HostResult<()> {
        self.verb("SweepStepDown")
    }

    fn sweep_hold(&mut self) -> HostResult<()> {
        self.verb("SweepHold")
    }

    fn sweep_resonance_hold(&mut self) -> HostResult<()> {
        self.verb("SweepResonanceHold")
    }

    // -- Tunable properties --

    fn test_type(&mut self) -> HostResult<i32> {
        variant_to_i32("TestType", &self.object.get("TestType")?)
    }

    fn set_test_type(&mut self, value: i32) -> HostResult<()> {
        self.object.put("TestType", variant_i32(value))
    }

    fn sine_frequency(&mut self) -> HostResult<f64> {
        self.get_f64("SineFrequency")
    }

    fn set_sine_frequency(&mut self, value: f64) -> HostResult<()> {
        self.put_f64("SineFrequency", value)
    }

    fn system_check_frequency(&mut self) -> HostResult<f64> {
        self.get_f64("SystemCheckFrequency")
    }

    fn set_system_check_frequency(&mut self, value: f64) -> HostResult<()> {
        self.put_f64("SystemCheckFrequency", value)
    }

    fn system_check_output_voltage(&mut self) -> HostResult<f64> {
        self.get_f64("SystemCheckOutputVoltage")
    }

    fn set_system_check_output_voltage(&mut self, value: f64) -> HostResult<()> {
        self.put_f64("SystemCheckOutputVoltage", value)
    }

    // The host spells this property "DemandMultipler"; keep its spelling
    // on the wire.
    fn demand_multiplier(&mut self) -> HostResult<f64> {
        self.get_f64("DemandMultipler")
    }

    fn set_demand_multiplier(&mut self, value: f64) -> HostResult<()> {
        self.put_f64("DemandMultipler", value)
    }

    fn sweep_multiplier(&mut self) -> HostResult<f64> {
        self.get_f64("SweepMultiplier")
    }

    fn set_sweep_multiplier(&mut self, value: f64) -> HostResult<()> {
        self.put_f64("SweepMultiplier", value)
    }

    // -- Recording --

    fn record_start(&mut self) -> HostResult<()> {
        self.verb("RecordStart")
    }

    fn record_stop(&mut self) -> HostResult<()> {
        self.verb("RecordStop")
    }

    fn record_pause(&mut self) -> HostResult<()> {
        self.verb("RecordPause")
    }

    fn record_filename(&mut self) -> HostResult<String> {
        variant_to_string("RecordGetFilename", &self.object.get("RecordGetFilename")?)
    }
}
