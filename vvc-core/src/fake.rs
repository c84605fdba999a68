//! In-memory scripted host double.
//!
//! [`FakeTestControl`] implements [`TestControl`] over plain data: a
//! channel table, scripted vectors, and a small run-state machine driven
//! by the control verbs.  It exists so the whole client surface can be
//! exercised without the proprietary host installed -- the crate's own
//! integration tests run against it, and downstream callers can inject it
//! through [`crate::VibrationView::with_host`] for theirs.
//!
//! Every operation can also be scripted as unsupported (by host operation
//! name) to simulate an older host version.

use std::collections::{HashMap, HashSet};

use crate::errors::VvError;
use crate::host::{HostResult, TestControl};
use crate::types::WindowState;

/// Scripted configuration of one input channel.
#[derive(Debug, Clone)]
pub struct FakeChannel {
    pub label: String,
    pub unit: String,
    pub sensitivity: f64,
    pub engineering_scale: f64,
    pub serial_number: String,
    pub cal_date: String,
    pub capacitor_coupled: bool,
    pub accel_power_source: bool,
    pub differential: bool,
    pub supports_capacitor_coupled: bool,
    pub supports_accel_power_source: bool,
    pub supports_differential: bool,
    /// `(name, value)` sheet pairs; `None` reads as "no TEDS sensor".
    pub teds: Option<Vec<(String, String)>>,
    /// Current live reading reported through `Channel`.
    pub reading: f64,
}

impl Default for FakeChannel {
    fn default() -> Self {
        Self {
            label: "Acceleration".to_owned(),
            unit: "g".to_owned(),
            sensitivity: 10.0,
            engineering_scale: 1.0,
            serial_number: String::new(),
            cal_date: String::new(),
            capacitor_coupled: false,
            accel_power_source: false,
            differential: false,
            supports_capacitor_coupled: true,
            supports_accel_power_source: true,
            supports_differential: true,
            teds: None,
            reading: 0.0,
        }
    }
}

/// Scripted data vector.
#[derive(Debug, Clone)]
pub struct FakeVector {
    pub label: String,
    pub unit: String,
    pub samples: Vec<f64>,
}

/// Scripted in-memory stand-in for the live automation object.
#[derive(Debug, Clone)]
pub struct FakeTestControl {
    pub software_version: String,
    pub serial_number: u32,
    pub channels: Vec<FakeChannel>,
    pub output_channels: u32,
    pub vectors: HashMap<i32, FakeVector>,
    pub report_fields: HashMap<String, String>,

    unsupported: HashSet<String>,

    loaded_test: Option<String>,
    editing: bool,
    running: bool,
    starting: bool,
    changing_level: bool,
    hold_level: bool,
    open_loop: bool,
    aborted: bool,
    can_resume: bool,
    ready: bool,
    stop_code: (String, i32),

    test_type: i32,
    sine_frequency: f64,
    system_check_frequency: f64,
    system_check_output_voltage: f64,
    demand_multiplier: f64,
    sweep_multiplier: f64,

    recording: bool,
    record_filename: String,

    minimized: bool,
    maximized: bool,
    input_configuration_file: Option<String>,
}

impl Default for FakeTestControl {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTestControl {
    /// A demo-mode host: four input channels (channel 1 with a TEDS
    /// accelerometer), two output loops, and a sine spectrum scripted.
    pub fn new() -> Self {
        let mut channels = vec![FakeChannel::default(); 4];
        channels[0] = FakeChannel {
            sensitivity: 10.409000396728516,
            accel_power_source: true,
            serial_number: "5065".to_owned(),
            cal_date: "Mar 12, 2008".to_owned(),
            teds: Some(vec![
                ("Manufacturer".to_owned(), "Dytran Instruments".to_owned()),
                ("Model number".to_owned(), "3055".to_owned()),
                ("Serial no.".to_owned(), "5065".to_owned()),
                (
                    "Sensitivity @ ref. cond. (S ref)".to_owned(),
                    "10.41 mV/G".to_owned(),
                ),
                ("Calibration date".to_owned(), "2008-03-12T17:00:00Z".to_owned()),
            ]),
            ..FakeChannel::default()
        };

        let mut vectors = HashMap::new();
        vectors.insert(
            100,
            FakeVector {
                label: "Frequency".to_owned(),
                unit: "Hz".to_owned(),
                samples: vec![10.0, 20.0, 40.0, 80.0, 160.0],
            },
        );
        vectors.insert(
            101,
            FakeVector {
                label: "Ch1".to_owned(),
                unit: "g".to_owned(),
                samples: vec![0.0, 0.5, 1.0, 0.5, 0.0],
            },
        );

        Self {
            software_version: "11.0.23".to_owned(),
            serial_number: 0x00ff_ffff,
            channels,
            output_channels: 2,
            vectors,
            report_fields: HashMap::new(),
            unsupported: HashSet::new(),
            loaded_test: None,
            editing: false,
            running: false,
            starting: false,
            changing_level: false,
            hold_level: false,
            open_loop: false,
            aborted: false,
            can_resume: false,
            ready: true,
            stop_code: ("Stopped".to_owned(), 1),
            test_type: 1,
            sine_frequency: 100.0,
            system_check_frequency: 100.0,
            system_check_output_voltage: 0.1,
            demand_multiplier: 0.0,
            sweep_multiplier: 1.0,
            recording: false,
            record_filename: String::new(),
            minimized: false,
            maximized: false,
            input_configuration_file: None,
        }
    }

    /// A host with `inputs` default channels and `outputs` loops.
    pub fn with_channel_counts(inputs: u32, outputs: u32) -> Self {
        let mut fake = Self::new();
        fake.channels = vec![FakeChannel::default(); inputs as usize];
        fake.output_channels = outputs;
        fake
    }

    /// Script a host operation (by automation name, e.g. `"RecordStart"`)
    /// as not present in this host version.
    pub fn script_unsupported(&mut self, operation: &str) -> &mut Self {
        self.unsupported.insert(operation.to_owned());
        self
    }

    /// The test path the host currently has loaded, if any.
    pub fn loaded_test(&self) -> Option<&str> {
        self.loaded_test.as_deref()
    }

    fn guard(&self, operation: &'static str) -> HostResult<()> {
        if self.unsupported.contains(operation) {
            Err(VvError::unavailable(operation))
        } else {
            Ok(())
        }
    }

    fn channel_at(&self, operation: &'static str, channel: u32) -> HostResult<&FakeChannel> {
        self.channels.get(channel as usize).ok_or_else(|| {
            VvError::invocation(operation, format!("host rejected channel index {channel}"))
        })
    }

    fn channel_at_mut(
        &mut self,
        operation: &'static str,
        channel: u32,
    ) -> HostResult<&mut FakeChannel> {
        self.channels.get_mut(channel as usize).ok_or_else(|| {
            VvError::invocation(operation, format!("host rejected channel index {channel}"))
        })
    }

    fn loop_values(&self, len: usize, base: f64) -> Vec<f64> {
        (0..len).map(|i| base + i as f64 * 0.001).collect()
    }

    fn enter_running(&mut self) {
        self.running = true;
        self.starting = false;
        self.aborted = false;
        self.can_resume = false;
        self.stop_code = ("Running".to_owned(), 0);
    }
}

impl TestControl for FakeTestControl {
    // -- Basic control --

    fn run_test(&mut self, path: &str) -> HostResult<()> {
        self.guard("RunTest")?;
        self.loaded_test = Some(path.to_owned());
        self.enter_running();
        Ok(())
    }

    fn open_test(&mut self, path: &str) -> HostResult<()> {
        self.guard("OpenTest")?;
        self.loaded_test = Some(path.to_owned());
        self.running = false;
        self.aborted = false;
        self.stop_code = ("Stopped".to_owned(), 1);
        Ok(())
    }

    fn edit_test(&mut self, path: &str) -> HostResult<()> {
        self.guard("EditTest")?;
        self.loaded_test = Some(path.to_owned());
        self.editing = true;
        Ok(())
    }

    fn abort_edit(&mut self) -> HostResult<()> {
        self.guard("AbortEdit")?;
        self.editing = false;
        Ok(())
    }

    fn start_test(&mut self) -> HostResult<()> {
        self.guard("StartTest")?;
        if self.loaded_test.is_none() {
            return Err(VvError::invocation("StartTest", "no test loaded"));
        }
        self.enter_running();
        Ok(())
    }

    fn stop_test(&mut self) -> HostResult<()> {
        self.guard("StopTest")?;
        if self.running {
            self.can_resume = true;
        }
        self.running = false;
        self.starting = false;
        self.stop_code = ("Stopped by user".to_owned(), 2);
        Ok(())
    }

    fn resume_test(&mut self) -> HostResult<()> {
        self.guard("ResumeTest")?;
        if !self.can_resume {
            return Err(VvError::invocation("ResumeTest", "no test to resume"));
        }
        self.enter_running();
        Ok(())
    }

    fn save_data(&mut self, _path: &str) -> HostResult<()> {
        self.guard("SaveData")
    }

    fn menu_command(&mut self, _id: i32) -> HostResult<()> {
        self.guard("MenuCommand")
    }

    // -- Window management --

    fn minimize(&mut self) -> HostResult<()> {
        self.guard("Minimize")?;
        self.minimized = true;
        self.maximized = false;
        Ok(())
    }

    fn maximize(&mut self) -> HostResult<()> {
        self.guard("Maximize")?;
        self.minimized = false;
        self.maximized = true;
        Ok(())
    }

    fn restore(&mut self) -> HostResult<()> {
        self.guard("Restore")?;
        self.minimized = false;
        self.maximized = false;
        Ok(())
    }

    fn activate(&mut self) -> HostResult<()> {
        self.guard("Activate")?;
        self.minimized = false;
        Ok(())
    }

    fn window_state(&mut self) -> HostResult<WindowState> {
        Ok(WindowState {
            title: "VibrationVIEW".to_owned(),
            is_minimized: self.minimized,
            is_maximized: self.maximized,
            is_visible: true,
        })
    }

    // -- Status --

    fn status(&mut self) -> HostResult<(String, i32)> {
        Ok(self.stop_code.clone())
    }

    fn running(&mut self) -> HostResult<bool> {
        Ok(self.running)
    }

    fn starting(&mut self) -> HostResult<bool> {
        Ok(self.starting)
    }

    fn changing_level(&mut self) -> HostResult<bool> {
        Ok(self.changing_level)
    }

    fn hold_level(&mut self) -> HostResult<bool> {
        Ok(self.hold_level)
    }

    fn open_loop(&mut self) -> HostResult<bool> {
        Ok(self.open_loop)
    }

    fn aborted(&mut self) -> HostResult<bool> {
        Ok(self.aborted)
    }

    fn can_resume_test(&mut self) -> HostResult<bool> {
        Ok(self.can_resume)
    }

    fn is_ready(&mut self) -> HostResult<bool> {
        Ok(self.ready)
    }

    // -- Data retrieval --

    fn channel(&mut self, len: usize) -> HostResult<Vec<f64>> {
        Ok((0..len)
            .map(|i| self.channels.get(i).map_or(0.0, |c| c.reading))
            .collect())
    }

    fn demand(&mut self, len: usize) -> HostResult<Vec<f64>> {
        Ok(self.loop_values(len, 1.0))
    }

    fn control(&mut self, len: usize) -> HostResult<Vec<f64>> {
        Ok(self.loop_values(len, 0.99))
    }

    fn output(&mut self, len: usize) -> HostResult<Vec<f64>> {
        Ok(self.loop_values(len, 0.5))
    }

    fn rear_input(&mut self, len: usize) -> HostResult<Vec<f64>> {
        Ok(vec![0.0; len])
    }

    fn vector(&mut self, id: i32, len: usize) -> HostResult<Vec<f64>> {
        self.guard("Vector")?;
        let v = self
            .vectors
            .get(&id)
            .ok_or_else(|| VvError::invocation("Vector", format!("unknown vector id {id}")))?;
        let mut samples = v.samples.clone();
        samples.resize(len, 0.0);
        Ok(samples)
    }

    fn vector_length(&mut self, id: i32) -> HostResult<usize> {
        self.guard("VectorLength")?;
        self.vectors
            .get(&id)
            .map(|v| v.samples.len())
            .ok_or_else(|| VvError::invocation("VectorLength", format!("unknown vector id {id}")))
    }

    fn vector_label(&mut self, id: i32) -> HostResult<String> {
        self.vectors
            .get(&id)
            .map(|v| v.label.clone())
            .ok_or_else(|| VvError::invocation("VectorLabel", format!("unknown vector id {id}")))
    }

    fn vector_unit(&mut self, id: i32) -> HostResult<String> {
        self.vectors
            .get(&id)
            .map(|v| v.unit.clone())
            .ok_or_else(|| VvError::invocation("VectorUnit", format!("unknown vector id {id}")))
    }

    fn report_field(&mut self, field: &str) -> HostResult<String> {
        self.guard("ReportField")?;
        self.report_fields
            .get(field)
            .cloned()
            .ok_or_else(|| VvError::invocation("ReportField", format!("unknown field {field:?}")))
    }

    // -- Hardware and channel configuration --

    fn hardware_input_channels(&mut self) -> HostResult<u32> {
        Ok(self.channels.len() as u32)
    }

    fn hardware_output_channels(&mut self) -> HostResult<u32> {
        Ok(self.output_channels)
    }

    fn hardware_serial_number(&mut self) -> HostResult<u32> {
        Ok(self.serial_number)
    }

    fn software_version(&mut self) -> HostResult<String> {
        Ok(self.software_version.clone())
    }

    fn channel_label(&mut self, channel: u32) -> HostResult<String> {
        Ok(self.channel_at("ChannelLabel", channel)?.label.clone())
    }

    fn channel_unit(&mut self, channel: u32) -> HostResult<String> {
        Ok(self.channel_at("ChannelUnit", channel)?.unit.clone())
    }

    fn control_label(&mut self, control_loop: u32) -> HostResult<String> {
        if control_loop >= self.output_channels {
            return Err(VvError::invocation(
                "ControlLabel",
                format!("host rejected loop index {control_loop}"),
            ));
        }
        Ok("Control".to_owned())
    }

    fn control_unit(&mut self, control_loop: u32) -> HostResult<String> {
        if control_loop >= self.output_channels {
            return Err(VvError::invocation(
                "ControlUnit",
                format!("host rejected loop index {control_loop}"),
            ));
        }
        Ok("g".to_owned())
    }

    fn rear_input_label(&mut self, channel: u32) -> HostResult<String> {
        Ok(format!("Rear input {}", channel + 1))
    }

    fn rear_input_unit(&mut self, _channel: u32) -> HostResult<String> {
        Ok("V".to_owned())
    }

    fn input_sensitivity(&mut self, channel: u32) -> HostResult<f64> {
        Ok(self.channel_at("InputSensitivity", channel)?.sensitivity)
    }

    fn input_engineering_scale(&mut self, channel: u32) -> HostResult<f64> {
        Ok(self
            .channel_at("InputEngineeringScale", channel)?
            .engineering_scale)
    }

    fn input_serial_number(&mut self, channel: u32) -> HostResult<String> {
        Ok(self
            .channel_at("InputSerialNumber", channel)?
            .serial_number
            .clone())
    }

    fn input_cal_date(&mut self, channel: u32) -> HostResult<String> {
        Ok(self.channel_at("InputCalDate", channel)?.cal_date.clone())
    }

    fn input_capacitor_coupled(&mut self, channel: u32) -> HostResult<bool> {
        Ok(self
            .channel_at("InputCapacitorCoupled", channel)?
            .capacitor_coupled)
    }

    fn set_input_capacitor_coupled(&mut self, channel: u32, value: bool) -> HostResult<()> {
        self.channel_at_mut("InputCapacitorCoupled", channel)?
            .capacitor_coupled = value;
        Ok(())
    }

    fn input_accel_power_source(&mut self, channel: u32) -> HostResult<bool> {
        Ok(self
            .channel_at("InputAccelPowerSource", channel)?
            .accel_power_source)
    }

    fn set_input_accel_power_source(&mut self, channel: u32, value: bool) -> HostResult<()> {
        self.channel_at_mut("InputAccelPowerSource", channel)?
            .accel_power_source = value;
        Ok(())
    }

    fn input_differential(&mut self, channel: u32) -> HostResult<bool> {
        Ok(self.channel_at("InputDifferential", channel)?.differential)
    }

    fn set_input_differential(&mut self, channel: u32, value: bool) -> HostResult<()> {
        self.channel_at_mut("InputDifferential", channel)?
            .differential = value;
        Ok(())
    }

    fn input_mode(
        &mut self,
        channel: u32,
        accel_power_source: bool,
        capacitor_coupled: bool,
        differential: bool,
    ) -> HostResult<()> {
        let ch = self.channel_at_mut("InputMode", channel)?;
        ch.accel_power_source = accel_power_source;
        ch.capacitor_coupled = capacitor_coupled;
        ch.differential = differential;
        Ok(())
    }

    fn input_calibration(
        &mut self,
        channel: u32,
        sensitivity: f64,
        serial_number: &str,
        cal_date: &str,
    ) -> HostResult<()> {
        let ch = self.channel_at_mut("InputCalibration", channel)?;
        ch.sensitivity = sensitivity;
        ch.serial_number = serial_number.to_owned();
        ch.cal_date = cal_date.to_owned();
        Ok(())
    }

    fn hardware_supports_capacitor_coupled(&mut self, channel: u32) -> HostResult<bool> {
        Ok(self
            .channel_at("HardwareSupportsCapacitorCoupled", channel)?
            .supports_capacitor_coupled)
    }

    fn hardware_supports_accel_power_source(&mut self, channel: u32) -> HostResult<bool> {
        Ok(self
            .channel_at("HardwareSupportsAccelPowerSource", channel)?
            .supports_accel_power_source)
    }

    fn hardware_supports_differential(&mut self, channel: u32) -> HostResult<bool> {
        Ok(self
            .channel_at("HardwareSupportsDifferential", channel)?
            .supports_differential)
    }

    fn set_input_configuration_file(&mut self, path: &str) -> HostResult<()> {
        self.guard("InputConfigurationFile")?;
        self.input_configuration_file = Some(path.to_owned());
        Ok(())
    }

    // -- TEDS --

    fn teds(&mut self, channel: u32) -> HostResult<Vec<(String, String)>> {
        self.guard("Teds")?;
        let ch = self.channel_at("Teds", channel)?;
        ch.teds.clone().ok_or_else(|| {
            VvError::invocation("Teds", format!("no TEDS sensor on channel {}", channel + 1))
        })
    }

    // -- Sine sweep control --

    fn sweep_up(&mut self) -> HostResult<()> {
        self.guard("SweepUp")
    }

    fn sweep_down(&mut self) -> HostResult<()> {
        self.guard("SweepDown")
    }

    fn sweep_step_up(&mut self) -> HostResult<()> {
        self.guard("SweepStepUp")?;
        self.sine_frequency = self.sine_frequency.floor() + 1.0;
        Ok(())
    }

    fn sweep_step_down(&mut self) -> HostResult<()> {
        self.guard("SweepStepDown")?;
        self.sine_frequency = (self.sine_frequency.ceil() - 1.0).max(0.0);
        Ok(())
    }

    fn sweep_hold(&mut self) -> HostResult<()> {
        self.guard("SweepHold")?;
        self.hold_level = true;
        Ok(())
    }

    fn sweep_resonance_hold(&mut self) -> HostResult<()> {
        self.guard("SweepResonanceHold")
    }

    // -- Tunable properties --

    fn test_type(&mut self) -> HostResult<i32> {
        Ok(self.test_type)
    }

    fn set_test_type(&mut self, value: i32) -> HostResult<()> {
        self.test_type = value;
        Ok(())
    }

    fn sine_frequency(&mut self) -> HostResult<f64> {
        Ok(self.sine_frequency)
    }

    fn set_sine_frequency(&mut self, value: f64) -> HostResult<()> {
        self.sine_frequency = value;
        Ok(())
    }

    fn system_check_frequency(&mut self) -> HostResult<f64> {
        Ok(self.system_check_frequency)
    }

    fn set_system_check_frequency(&mut self, value: f64) -> HostResult<()> {
        self.system_check_frequency = value;
        Ok(())
    }

    fn system_check_output_voltage(&mut self) -> HostResult<f64> {
        Ok(self.system_check_output_voltage)
    }

    fn set_system_check_output_voltage(&mut self, value: f64) -> HostResult<()> {
        self.system_check_output_voltage = value;
        Ok(())
    }

    fn demand_multiplier(&mut self) -> HostResult<f64> {
        Ok(self.demand_multiplier)
    }

    fn set_demand_multiplier(&mut self, value: f64) -> HostResult<()> {
        self.demand_multiplier = value;
        Ok(())
    }

    fn sweep_multiplier(&mut self) -> HostResult<f64> {
        Ok(self.sweep_multiplier)
    }

    fn set_sweep_multiplier(&mut self, value: f64) -> HostResult<()> {
        self.sweep_multiplier = value;
        Ok(())
    }

    // -- Recording --

    fn record_start(&mut self) -> HostResult<()> {
        self.guard("RecordStart")?;
        self.recording = true;
        self.record_filename = "Recording0001.vfw".to_owned();
        Ok(())
    }

    fn record_stop(&mut self) -> HostResult<()> {
        self.guard("RecordStop")?;
        self.recording = false;
        Ok(())
    }

    fn record_pause(&mut self) -> HostResult<()> {
        self.guard("RecordPause")?;
        if !self.recording {
            return Err(VvError::invocation("RecordPause", "not recording"));
        }
        Ok(())
    }

    fn record_filename(&mut self) -> HostResult<String> {
        self.guard("RecordGetFilename")?;
        Ok(self.record_filename.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_requires_loaded_test() {
        let mut fake = FakeTestControl::new();
        assert!(matches!(
            fake.start_test(),
            Err(VvError::Invocation { .. })
        ));
        fake.open_test("Sine.vsp").unwrap();
        fake.start_test().unwrap();
        assert!(fake.running().unwrap());
    }

    #[test]
    fn test_stop_then_resume() {
        let mut fake = FakeTestControl::new();
        fake.run_test("Random.vrp").unwrap();
        fake.stop_test().unwrap();
        assert!(!fake.running().unwrap());
        assert!(fake.can_resume_test().unwrap());
        fake.resume_test().unwrap();
        assert!(fake.running().unwrap());
    }

    #[test]
    fn test_scripted_unsupported_operation() {
        let mut fake = FakeTestControl::new();
        fake.script_unsupported("RecordStart");
        assert!(matches!(
            fake.record_start(),
            Err(VvError::UnavailableFeature { ref operation }) if operation == "RecordStart"
        ));
    }

    #[test]
    fn test_window_verbs_drive_state() {
        let mut fake = FakeTestControl::new();
        fake.minimize().unwrap();
        assert!(fake.window_state().unwrap().is_minimized);
        fake.maximize().unwrap();
        let state = fake.window_state().unwrap();
        assert!(state.is_maximized && !state.is_minimized);
        fake.restore().unwrap();
        let state = fake.window_state().unwrap();
        assert!(!state.is_maximized && !state.is_minimized);
    }
}
