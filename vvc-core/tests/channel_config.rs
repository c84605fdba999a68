//! Channel configuration and TEDS behavior against the scripted double.
//!
//! The fixtures mirror a real front-end: most channels on defaults, the
//! first channel carrying a TEDS accelerometer with its own calibration
//! record.

use vvc_core::fake::{FakeChannel, FakeTestControl};
use vvc_core::{VibrationView, VvError};

/// Front-end with 8 channels; channel 1 carries a TEDS accelerometer,
/// channel 2 a bare IEPE accelerometer, the rest defaults.
fn instrumented_host() -> FakeTestControl {
    let mut fake = FakeTestControl::with_channel_counts(8, 2);
    fake.channels[0] = FakeChannel {
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
        ]),
        ..FakeChannel::default()
    };
    fake.channels[1] = FakeChannel {
        accel_power_source: true,
        ..FakeChannel::default()
    };
    fake
}

#[test]
fn channel_labels_and_units_round_trip_the_configuration() {
    let mut vv = VibrationView::with_host(instrumented_host());
    let count = vv.hardware_input_channels().unwrap();
    assert_eq!(count, 8);

    for ch in 0..count {
        assert_eq!(vv.channel_label(ch).unwrap(), "Acceleration");
        assert_eq!(vv.channel_unit(ch).unwrap(), "g");
    }
    assert_eq!(vv.input_sensitivity(0).unwrap(), 10.409000396728516);
    assert_eq!(vv.input_sensitivity(1).unwrap(), 10.0);
    assert_eq!(vv.input_serial_number(0).unwrap(), "5065");
    assert_eq!(vv.input_cal_date(0).unwrap(), "Mar 12, 2008");
    assert_eq!(vv.input_serial_number(1).unwrap(), "");
}

#[test]
fn teds_sweep_returns_one_record_per_channel_keyed_one_based() {
    let mut vv = VibrationView::with_host(instrumented_host());
    let records = vv.teds(None).unwrap();

    assert_eq!(records.len(), 8);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.channel, i as u32 + 1);
    }

    // Channel 1 reads its sheet.
    let first = &records[0];
    assert!(first.error.is_none());
    assert_eq!(first.property("Manufacturer"), Some("Dytran Instruments"));
    assert_eq!(first.property("Model number"), Some("3055"));

    // The bare channels report their fault in the record instead of
    // failing the sweep.
    for record in &records[1..] {
        assert!(record.properties.is_empty());
        assert!(record.error.as_deref().unwrap().contains("no TEDS sensor"));
    }
}

#[test]
fn teds_single_channel_request() {
    let mut vv = VibrationView::with_host(instrumented_host());

    let records = vv.teds(Some(0)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].channel, 1);
    assert!(records[0].error.is_none());

    let records = vv.teds(Some(5)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].channel, 6);
    assert!(records[0].error.is_some());
}

#[test]
fn teds_unsupported_by_host_version_fails_the_request() {
    let mut fake = instrumented_host();
    fake.script_unsupported("Teds");
    let mut vv = VibrationView::with_host(fake);
    assert!(matches!(
        vv.teds(None),
        Err(VvError::UnavailableFeature { .. })
    ));
}

#[test]
fn input_mode_round_trips_the_coupling_flags() {
    let mut vv = VibrationView::with_host(instrumented_host());

    vv.input_mode(2, true, true, false).unwrap();
    assert!(vv.input_accel_power_source(2).unwrap());
    assert!(vv.input_capacitor_coupled(2).unwrap());
    assert!(!vv.input_differential(2).unwrap());

    vv.set_input_differential(2, true).unwrap();
    assert!(vv.input_differential(2).unwrap());
    vv.set_input_capacitor_coupled(2, false).unwrap();
    assert!(!vv.input_capacitor_coupled(2).unwrap());
}

#[test]
fn input_calibration_round_trips_the_record() {
    let mut vv = VibrationView::with_host(instrumented_host());

    vv.input_calibration(3, 99.5, "A1234", "2026-08-07").unwrap();
    assert_eq!(vv.input_sensitivity(3).unwrap(), 99.5);
    assert_eq!(vv.input_serial_number(3).unwrap(), "A1234");
    assert_eq!(vv.input_cal_date(3).unwrap(), "2026-08-07");
}

#[test]
fn hardware_capability_flags_are_forwarded() {
    let mut fake = instrumented_host();
    fake.channels[4].supports_differential = false;
    let mut vv = VibrationView::with_host(fake);

    assert!(vv.hardware_supports_capacitor_coupled(4).unwrap());
    assert!(vv.hardware_supports_accel_power_source(4).unwrap());
    assert!(!vv.hardware_supports_differential(4).unwrap());
}

#[test]
fn input_configuration_file_requires_a_path() {
    let mut vv = VibrationView::with_host(instrumented_host());
    assert!(matches!(
        vv.set_input_configuration_file(""),
        Err(VvError::Argument(_))
    ));
    vv.set_input_configuration_file("front-end-8ch.vic").unwrap();
}

#[test]
fn control_loop_metadata_round_trips() {
    let mut vv = VibrationView::with_host(instrumented_host());
    assert_eq!(vv.hardware_output_channels().unwrap(), 2);
    assert_eq!(vv.control_label(0).unwrap(), "Control");
    assert_eq!(vv.control_unit(1).unwrap(), "g");
}

#[test]
fn rear_input_metadata_is_one_based_for_display() {
    let mut vv = VibrationView::with_host(instrumented_host());
    assert_eq!(vv.rear_input_label(0).unwrap(), "Rear input 1");
    assert_eq!(vv.rear_input_unit(0).unwrap(), "V");
}
