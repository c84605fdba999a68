//! Standalone CLI tool for VibrationVIEW test control verbs.
//!
//! Every subcommand is a single forwarded call; sequencing (waiting for a
//! test to reach level, etc.) belongs to the caller's script, polling
//! `vvc-status`.

use clap::{Parser, Subcommand};
use vvc_core::{TestType, VibrationView, VvError};

#[derive(Parser)]
#[command(name = "vvc-test", about = "Drive VibrationVIEW test control")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a test profile without starting it
    Open { path: String },
    /// Open a test profile and start it
    Run { path: String },
    /// Open a test profile in the editor
    Edit { path: String },
    /// Abort an open edit session
    AbortEdit,
    /// Start the loaded test
    Start,
    /// Stop the running test
    Stop,
    /// Resume a stopped test
    Resume,
    /// Save live data to a host-side file
    Save { path: String },
    /// Set the test type (syscheck, sine, random, shock, transient, replay)
    SetType { test_type: String },
    /// Sweep up / down / hold
    SweepUp,
    SweepDown,
    SweepStepUp,
    SweepStepDown,
    SweepHold,
    SweepResonanceHold,
    /// Start recording
    RecordStart,
    /// Stop recording
    RecordStop,
    /// Pause recording
    RecordPause,
    /// Print the most recent recording's filename
    RecordFilename,
    /// Minimize, maximize, restore, or activate the host window
    Window { verb: String },
}

fn parse_test_type(name: &str) -> Result<TestType, VvError> {
    match name.to_ascii_lowercase().as_str() {
        "syscheck" | "systemcheck" => Ok(TestType::SystemCheck),
        "sine" => Ok(TestType::Sine),
        "random" => Ok(TestType::Random),
        "shock" => Ok(TestType::Shock),
        "transient" => Ok(TestType::Transient),
        "replay" | "fdr" => Ok(TestType::Replay),
        other => Err(VvError::Argument(format!("unknown test type {other:?}"))),
    }
}

fn run(vv: &mut VibrationView, command: Command) -> Result<(), VvError> {
    match command {
        Command::Open { path } => vv.open_test(&path),
        Command::Run { path } => vv.run_test(&path),
        Command::Edit { path } => vv.edit_test(&path),
        Command::AbortEdit => vv.abort_edit(),
        Command::Start => vv.start_test(),
        Command::Stop => vv.stop_test(),
        Command::Resume => vv.resume_test(),
        Command::Save { path } => vv.save_data(&path),
        Command::SetType { test_type } => vv.set_test_type(parse_test_type(&test_type)?),
        Command::SweepUp => vv.sweep_up(),
        Command::SweepDown => vv.sweep_down(),
        Command::SweepStepUp => vv.sweep_step_up(),
        Command::SweepStepDown => vv.sweep_step_down(),
        Command::SweepHold => vv.sweep_hold(),
        Command::SweepResonanceHold => vv.sweep_resonance_hold(),
        Command::RecordStart => vv.record_start(),
        Command::RecordStop => vv.record_stop(),
        Command::RecordPause => vv.record_pause(),
        Command::RecordFilename => {
            println!("{}", vv.record_filename()?);
            Ok(())
        }
        Command::Window { verb } => match verb.to_ascii_lowercase().as_str() {
            "minimize" => vv.minimize(),
            "maximize" => vv.maximize(),
            "restore" => vv.restore(),
            "activate" => vv.activate(),
            other => Err(VvError::Argument(format!("unknown window verb {other:?}"))),
        },
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut vv = VibrationView::connect();
    if !vv.is_connected() {
        eprintln!("vvc-test: VibrationVIEW is not running");
        std::process::exit(1);
    }

    if let Err(e) = run(&mut vv, args.command) {
        eprintln!("vvc-test: {e}");
        std::process::exit(1);
    }
}
