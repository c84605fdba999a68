//! Standalone CLI tool for dumping VibrationVIEW status as JSON.

use clap::Parser;
use vvc_core::VibrationView;

#[derive(Parser)]
#[command(name = "vvc-status", about = "Dump VibrationVIEW connection and test status as JSON")]
struct Args {
    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut vv = VibrationView::connect();
    if !vv.is_connected() {
        eprintln!("vvc-status: VibrationVIEW is not running");
        std::process::exit(1);
    }

    let report = (|| -> Result<serde_json::Value, vvc_core::VvError> {
        let status = vv.status()?;
        Ok(serde_json::json!({
            "software_version": vv.software_version()?,
            "hardware_serial_number": format!("{:06X}", vv.hardware_serial_number()?),
            "hardware_input_channels": vv.hardware_input_channels()?,
            "hardware_output_channels": vv.hardware_output_channels()?,
            "ready": vv.is_ready()?,
            "running": vv.is_running()?,
            "starting": vv.is_starting()?,
            "changing_level": vv.is_changing_level()?,
            "hold_level": vv.is_hold_level()?,
            "open_loop": vv.is_open_loop()?,
            "aborted": vv.is_aborted()?,
            "stop_code": status.stop_code,
            "stop_code_index": status.stop_code_index,
            "window": vv.window_state()?,
        }))
    })();

    match report {
        Ok(report) => {
            let json = if args.compact {
                serde_json::to_string(&report).unwrap()
            } else {
                serde_json::to_string_pretty(&report).unwrap()
            };
            println!("{json}");
        }
        Err(e) => {
            eprintln!("vvc-status: {e}");
            std::process::exit(1);
        }
    }
}
