//! Standalone CLI tool for dumping one host data vector as JSON.

use clap::Parser;
use vvc_core::{VectorId, VibrationView};

#[derive(Parser)]
#[command(name = "vvc-vector", about = "Dump a VibrationVIEW data vector as JSON")]
struct Args {
    /// Raw host vector id (e.g. 100 for the frequency axis, 101 for the
    /// channel 1 spectrum)
    #[arg(long)]
    id: i32,

    /// Print metadata only, no samples
    #[arg(long)]
    meta_only: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut vv = VibrationView::connect();
    if !vv.is_connected() {
        eprintln!("vvc-vector: VibrationVIEW is not running");
        std::process::exit(1);
    }

    let id = VectorId(args.id);
    let report = (|| -> Result<serde_json::Value, vvc_core::VvError> {
        if args.meta_only {
            Ok(serde_json::json!({
                "id": id,
                "label": vv.vector_label(id)?,
                "unit": vv.vector_unit(id)?,
                "length": vv.vector_length(id)?,
            }))
        } else {
            let data = vv.vector(id)?;
            Ok(serde_json::json!({
                "id": id,
                "label": data.label,
                "unit": data.unit,
                "length": data.len(),
                "samples": data.samples,
            }))
        }
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
            eprintln!("vvc-vector: {e}");
            std::process::exit(1);
        }
    }
}
