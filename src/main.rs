//! Acquisition binary: one bounded capture-and-correlate session per
//! invocation.
//!
//! Takes an optional single argument naming a configuration file; without it
//! the built-in deployment defaults are used. Exits 0 on a complete session,
//! or with the failing error class's distinct non-zero code.

use std::io::Write;
use std::time::Duration;

use cam_daq::prelude::*;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(err.exit_code());
    }
}

fn run() -> cam_daq::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => CaptureConfig::from_file(path)?,
        None => CaptureConfig::default(),
    };
    config.validate()?;

    print!("initializing...");
    std::io::stdout().flush().ok();

    let mut source = match SourceBuilder::from_config(&config).build() {
        Ok(source) => {
            println!("[OK]");
            source
        }
        Err(err) => {
            println!("[FAILED]");
            return Err(err);
        }
    };

    let mut trigger = GpioTrigger::open(
        config.gpio_line,
        Duration::from_millis(config.pulse_width_ms),
    )?;

    println!(
        "toggling GPIO {} twice.. then capturing {} frames",
        config.gpio_line, config.frame_count
    );

    let summary = run_session(&config, source.as_mut(), &mut trigger, &SystemClock)?;

    println!("Saved {} frames", summary.frames_written);
    println!("session path = {}", summary.directory.display());
    println!("t1 = {}", summary.record.t1);
    println!("t2 = {}", summary.record.t2);
    println!("t_diff = {} s", summary.record.t_diff);
    println!("t_total = {} s", summary.record.t_total);

    Ok(())
}
