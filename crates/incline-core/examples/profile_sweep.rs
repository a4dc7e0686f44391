//! Run every motion profile through the simulator and filter and report
//! tracking error.
//!
//! ```text
//! RUST_LOG=info cargo run --example profile_sweep
//! ```

use nalgebra::Vector3;

use incline_core::estimation::FilterConfig;
use incline_core::simulation::{MotionProfile, RunConfig, Runner, SensorConfig};
use incline_core::InclineError;

fn main() -> Result<(), InclineError> {
    env_logger::init();

    let profiles = [
        MotionProfile::static_orientation(0.2, -0.1, 0.0),
        MotionProfile::sinusoidal(),
        MotionProfile::linear_accel_world(Vector3::new(2.0, 0.0, 0.0), Vector3::zeros()),
        MotionProfile::angular_motion(),
        MotionProfile::MixedDemo,
        MotionProfile::high_freq_vibration(),
    ];

    let run = RunConfig::default();
    // Ignore the first second of convergence transient
    let settle = (1.0 / run.dt).round() as usize;

    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>8}",
        "profile", "roll rms", "pitch rms", "acc roll rms", "skipped"
    );
    for profile in profiles {
        let name = profile.name();
        let mut runner = Runner::from_configs(
            run.clone(),
            profile,
            SensorConfig::default(),
            FilterConfig::default(),
        )?;
        let result = runner.run()?;

        let (roll_rms, pitch_rms) = result.rms_error_from(settle);
        let acc_roll_rms = rms(&result.roll_meas_acc[settle..], &result.roll_true[settle..]);

        println!(
            "{:<20} {:>12.5} {:>12.5} {:>12.5} {:>8}",
            name, roll_rms, pitch_rms, acc_roll_rms, result.skipped_updates
        );

        let bias = runner.filter().bias();
        log::info!(
            "{name}: final bias estimate [{:.4}, {:.4}, {:.4}] rad/s",
            bias.x,
            bias.y,
            bias.z
        );
    }

    Ok(())
}

fn rms(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
    (sum / a.len() as f64).sqrt()
}
