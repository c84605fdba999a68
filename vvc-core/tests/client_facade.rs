//! Facade behavior against the scripted host double.
//!
//! These are the host-free equivalents of the manual exercising scripts
//! that ship with the vendor API: every property the client guarantees is
//! checked here against `FakeTestControl`, since the real host cannot be
//! present in CI.

use vvc_core::fake::{FakeTestControl, FakeVector};
use vvc_core::{TestType, VectorId, VibrationView, VvError, REAR_INPUT_CHANNELS};

fn client() -> VibrationView {
    VibrationView::with_host(FakeTestControl::new())
}

// -- Connectivity lifecycle --

#[test]
fn close_twice_never_fails() {
    let mut vv = client();
    vv.close();
    vv.close();
    assert!(!vv.is_connected());
}

#[test]
fn every_operation_after_close_reports_connectivity() {
    let mut vv = client();
    vv.close();

    assert!(matches!(vv.software_version(), Err(VvError::Connectivity(_))));
    assert!(matches!(vv.open_test("Sine.vsp"), Err(VvError::Connectivity(_))));
    assert!(matches!(vv.start_test(), Err(VvError::Connectivity(_))));
    assert!(matches!(vv.status(), Err(VvError::Connectivity(_))));
    assert!(matches!(vv.channel_readings(), Err(VvError::Connectivity(_))));
    assert!(matches!(
        vv.vector(VectorId::FREQUENCY_AXIS),
        Err(VvError::Connectivity(_))
    ));
    assert!(matches!(vv.teds(None), Err(VvError::Connectivity(_))));
    assert!(matches!(vv.record_start(), Err(VvError::Connectivity(_))));
    assert!(matches!(vv.maximize(), Err(VvError::Connectivity(_))));
}

// Construction against an absent host: no platform fault, just an empty
// handle and connectivity errors.  Off Windows the attach can never
// succeed, which is exactly the disconnected-host fixture the real host
// cannot give us in CI.
#[cfg(not(windows))]
#[test]
fn connect_without_host_leaves_handle_empty() {
    let mut vv = VibrationView::connect();
    assert!(!vv.is_connected());
    assert!(matches!(vv.software_version(), Err(VvError::Connectivity(_))));
    assert!(matches!(vv.is_ready(), Err(VvError::Connectivity(_))));
}

// -- Argument validation --

#[test]
fn out_of_range_input_channel_is_an_argument_error() {
    let mut vv = client(); // 4 input channels

    assert!(matches!(vv.channel_label(4), Err(VvError::Argument(_))));
    assert!(matches!(vv.channel_unit(99), Err(VvError::Argument(_))));
    assert!(matches!(vv.input_sensitivity(4), Err(VvError::Argument(_))));
    assert!(matches!(vv.input_serial_number(4), Err(VvError::Argument(_))));
    assert!(matches!(
        vv.set_input_capacitor_coupled(4, true),
        Err(VvError::Argument(_))
    ));
    assert!(matches!(
        vv.input_mode(4, true, false, false),
        Err(VvError::Argument(_))
    ));
    assert!(matches!(vv.teds(Some(4)), Err(VvError::Argument(_))));
}

#[test]
fn out_of_range_output_loop_is_an_argument_error() {
    let mut vv = client(); // 2 output loops
    assert!(matches!(vv.control_label(2), Err(VvError::Argument(_))));
    assert!(matches!(vv.control_unit(7), Err(VvError::Argument(_))));
}

#[test]
fn out_of_range_rear_input_is_an_argument_error() {
    let mut vv = client();
    assert!(matches!(
        vv.rear_input_label(REAR_INPUT_CHANNELS),
        Err(VvError::Argument(_))
    ));
    assert!(vv.rear_input_label(REAR_INPUT_CHANNELS - 1).is_ok());
}

#[test]
fn last_valid_channel_is_accepted() {
    let mut vv = client();
    assert!(vv.channel_label(3).is_ok());
    assert!(vv.control_label(1).is_ok());
}

// -- Test control scenario --

#[test]
fn open_start_stop_round_trip() {
    let mut vv = client();

    vv.open_test(r"C:\VibrationVIEW\Profiles\Sine.vsp").unwrap();
    assert!(!vv.is_running().unwrap());

    vv.start_test().unwrap();
    assert!(vv.is_running().unwrap());
    let status = vv.status().unwrap();
    assert_eq!(status.stop_code, "Running");
    assert_eq!(status.stop_code_index, 0);

    vv.stop_test().unwrap();
    assert!(!vv.is_running().unwrap());
    assert!(vv.can_resume_test().unwrap());

    vv.resume_test().unwrap();
    assert!(vv.is_running().unwrap());
}

#[test]
fn run_test_starts_immediately() {
    let mut vv = client();
    vv.run_test("Random.vrp").unwrap();
    assert!(vv.is_running().unwrap());
}

#[test]
fn start_without_a_loaded_test_is_an_invocation_error() {
    let mut vv = client();
    match vv.start_test() {
        Err(VvError::Invocation { operation, .. }) => assert_eq!(operation, "StartTest"),
        other => panic!("expected InvocationError, got {other:?}"),
    }
}

// -- Data retrieval --

#[test]
fn readings_are_sized_by_the_hardware_counts() {
    let mut vv = client();
    assert_eq!(vv.channel_readings().unwrap().len(), 4);
    assert_eq!(vv.demand().unwrap().len(), 2);
    assert_eq!(vv.control().unwrap().len(), 2);
    assert_eq!(vv.output().unwrap().len(), 2);
    assert_eq!(vv.rear_input().unwrap().len(), REAR_INPUT_CHANNELS as usize);
}

#[test]
fn vector_carries_samples_label_and_unit() {
    let mut vv = client();
    let axis = vv.vector(VectorId::FREQUENCY_AXIS).unwrap();
    assert_eq!(axis.label, "Frequency");
    assert_eq!(axis.unit, "Hz");
    assert_eq!(axis.len(), vv.vector_length(VectorId::FREQUENCY_AXIS).unwrap());
    assert_eq!(axis.samples, vec![10.0, 20.0, 40.0, 80.0, 160.0]);
}

#[test]
fn unknown_vector_id_is_an_invocation_error() {
    let mut vv = client();
    assert!(matches!(
        vv.vector(VectorId(9999)),
        Err(VvError::Invocation { .. })
    ));
}

#[test]
fn scripted_vectors_are_visible_through_the_facade() {
    let mut fake = FakeTestControl::new();
    fake.vectors.insert(
        VectorId::spectrum(1).raw(),
        FakeVector {
            label: "Ch2".to_owned(),
            unit: "g".to_owned(),
            samples: vec![1.0, 2.0],
        },
    );
    let mut vv = VibrationView::with_host(fake);
    let spectrum = vv.vector(VectorId::spectrum(1)).unwrap();
    assert_eq!(spectrum.label, "Ch2");
    assert_eq!(spectrum.len(), 2);
}

// -- Tunable properties --

#[test]
fn test_type_round_trips_typed() {
    let mut vv = client();
    vv.set_test_type(TestType::Random).unwrap();
    assert_eq!(vv.test_type().unwrap(), TestType::Random);
}

#[test]
fn sine_frequency_round_trips() {
    let mut vv = client();
    vv.set_sine_frequency(440.0).unwrap();
    assert_eq!(vv.sine_frequency().unwrap(), 440.0);
    vv.sweep_step_up().unwrap();
    assert_eq!(vv.sine_frequency().unwrap(), 441.0);
}

#[test]
fn multipliers_round_trip() {
    let mut vv = client();
    vv.set_demand_multiplier(-3.0).unwrap();
    assert_eq!(vv.demand_multiplier().unwrap(), -3.0);
    vv.set_sweep_multiplier(2.0).unwrap();
    assert_eq!(vv.sweep_multiplier().unwrap(), 2.0);
}

// -- Unsupported host features --

#[test]
fn scripted_unsupported_operation_surfaces_as_unavailable_feature() {
    let mut fake = FakeTestControl::new();
    fake.script_unsupported("RecordStart");
    fake.script_unsupported("SweepResonanceHold");
    let mut vv = VibrationView::with_host(fake);

    match vv.record_start() {
        Err(VvError::UnavailableFeature { operation }) => assert_eq!(operation, "RecordStart"),
        other => panic!("expected UnavailableFeatureError, got {other:?}"),
    }
    assert!(matches!(
        vv.sweep_resonance_hold(),
        Err(VvError::UnavailableFeature { .. })
    ));
    // Operations the host does support keep working.
    vv.sweep_hold().unwrap();
}

// -- Recording --

#[test]
fn recording_round_trips_the_filename() {
    let mut vv = client();
    assert_eq!(vv.record_filename().unwrap(), "");
    vv.record_start().unwrap();
    let name = vv.record_filename().unwrap();
    assert!(!name.is_empty());
    vv.record_pause().unwrap();
    vv.record_stop().unwrap();
    assert_eq!(vv.record_filename().unwrap(), name);
}

#[test]
fn record_pause_without_recording_is_an_invocation_error() {
    let mut vv = client();
    assert!(matches!(
        vv.record_pause(),
        Err(VvError::Invocation { .. })
    ));
}

// -- Window management --

#[test]
fn window_verbs_round_trip_the_window_state() {
    let mut vv = client();

    vv.minimize().unwrap();
    assert!(vv.window_state().unwrap().is_minimized);

    vv.maximize().unwrap();
    let state = vv.window_state().unwrap();
    assert!(state.is_maximized);
    assert!(!state.is_minimized);

    vv.restore().unwrap();
    let state = vv.window_state().unwrap();
    assert!(!state.is_maximized);
    assert!(!state.is_minimized);

    vv.activate().unwrap();
    assert!(vv.window_state().unwrap().is_visible);
}

// -- Error display --

#[test]
fn error_messages_name_the_operation_and_kind() {
    let mut vv = client();
    vv.close();
    let err = vv.start_test().unwrap_err();
    assert!(err.to_string().starts_with("ConnectivityError"));

    let mut vv = client();
    let err = vv.channel_label(100).unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("ArgumentError"));
    assert!(text.contains("ChannelLabel"));
    assert!(text.contains("100"));
}
