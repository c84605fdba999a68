//! Standalone CLI tool for dumping the channel table (and optionally the
//! TEDS sheets) as JSON.

use clap::Parser;
use vvc_core::VibrationView;

#[derive(Parser)]
#[command(name = "vvc-channels", about = "Dump VibrationVIEW channel configuration as JSON")]
struct Args {
    /// Include TEDS data per channel
    #[arg(long)]
    teds: bool,

    /// Only this 0-based channel
    #[arg(long)]
    channel: Option<u32>,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut vv = VibrationView::connect();
    if !vv.is_connected() {
        eprintln!("vvc-channels: VibrationVIEW is not running");
        std::process::exit(1);
    }

    let report = (|| -> Result<serde_json::Value, vvc_core::VvError> {
        let count = vv.hardware_input_channels()?;
        let channels: Vec<u32> = match args.channel {
            Some(ch) => vec![ch],
            None => (0..count).collect(),
        };

        let mut rows = Vec::with_capacity(channels.len());
        for ch in channels {
            rows.push(serde_json::json!({
                "channel": ch + 1,
                "label": vv.channel_label(ch)?,
                "unit": vv.channel_unit(ch)?,
                "sensitivity": vv.input_sensitivity(ch)?,
                "engineering_scale": vv.input_engineering_scale(ch)?,
                "serial_number": vv.input_serial_number(ch)?,
                "cal_date": vv.input_cal_date(ch)?,
                "capacitor_coupled": vv.input_capacitor_coupled(ch)?,
                "accel_power_source": vv.input_accel_power_source(ch)?,
                "differential": vv.input_differential(ch)?,
            }));
        }

        let mut report = serde_json::json!({
            "hardware_input_channels": count,
            "channels": rows,
        });
        if args.teds {
            report["teds"] = serde_json::to_value(vv.teds(args.channel)?).unwrap();
        }
        Ok(report)
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
            eprintln!("vvc-channels: {e}");
            std::process::exit(1);
        }
    }
}
