//! Simulation run loop
//!
//! Ticks time, pulls ground truth from a motion profile into the
//! simulator, feeds the simulated gyro and accelerometer to the filter and
//! records every quantity as parallel time series.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::Rng;

use super::{
    roll_pitch_from_accel, InclinometerSim, MotionProfile, MotionSample, RunConfig, SensorConfig,
};
use crate::error::{InclineError, Result};
use crate::estimation::{FilterConfig, InclinometerEkf};

/// Output of one tick
#[derive(Debug, Clone)]
pub struct RunStep {
    /// Time at which the truth was sampled [s]
    pub time: f64,
    /// Ground truth
    pub truth: MotionSample,
    /// Raw accelerometer reading [m/s²]
    pub accel: Vector3<f64>,
    /// Raw gyroscope reading [rad/s]
    pub gyro: Vector3<f64>,
    /// Roll derived from this accelerometer sample alone [rad]
    pub roll_meas_acc: f64,
    /// Pitch derived from this accelerometer sample alone [rad]
    pub pitch_meas_acc: f64,
    /// Filter roll after this tick [rad]
    pub roll_est: f64,
    /// Filter pitch after this tick [rad]
    pub pitch_est: f64,
    /// Filter gyro bias after this tick [rad/s]
    pub bias_est: Vector3<f64>,
    /// Whether a measurement update was applied on this tick
    pub updated: bool,
}

/// Recorded time series, one entry per tick
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    pub t: Vec<f64>,
    pub roll_true: Vec<f64>,
    pub pitch_true: Vec<f64>,
    pub yaw_true: Vec<f64>,
    pub roll_meas_acc: Vec<f64>,
    pub pitch_meas_acc: Vec<f64>,
    pub roll_est: Vec<f64>,
    pub pitch_est: Vec<f64>,
    /// Raw accelerometer readings, N × 3
    pub accel: Vec<Vector3<f64>>,
    /// Raw gyroscope readings, N × 3
    pub gyro: Vec<Vector3<f64>>,
    /// Updates refused by the filter for numerical reasons
    pub skipped_updates: usize,
}

impl SimulationResult {
    /// Record a tick
    pub fn record(&mut self, step: &RunStep) {
        self.t.push(step.time);
        self.roll_true.push(step.truth.roll());
        self.pitch_true.push(step.truth.pitch());
        self.yaw_true.push(step.truth.yaw());
        self.roll_meas_acc.push(step.roll_meas_acc);
        self.pitch_meas_acc.push(step.pitch_meas_acc);
        self.roll_est.push(step.roll_est);
        self.pitch_est.push(step.pitch_est);
        self.accel.push(step.accel);
        self.gyro.push(step.gyro);
    }

    /// Get number of recorded ticks
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Time span covered by the records [s]
    pub fn duration(&self) -> f64 {
        match (self.t.first(), self.t.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// RMS (roll, pitch) error of the filter over ticks from index `from`
    pub fn rms_error_from(&self, from: usize) -> (f64, f64) {
        let rms = |est: &[f64], truth: &[f64]| {
            let n = est.len().saturating_sub(from);
            if n == 0 {
                return 0.0;
            }
            let sum: f64 = est[from..]
                .iter()
                .zip(&truth[from..])
                .map(|(e, t)| (e - t).powi(2))
                .sum();
            (sum / n as f64).sqrt()
        };

        (
            rms(&self.roll_est, &self.roll_true),
            rms(&self.pitch_est, &self.pitch_true),
        )
    }
}

/// Profile → simulator → filter loop
pub struct Runner<R = StdRng> {
    config: RunConfig,
    profile: MotionProfile,
    sensor: InclinometerSim<R>,
    filter: InclinometerEkf,
    time: f64,
    tick: usize,
    history: SimulationResult,
}

impl Runner<StdRng> {
    /// Build every part from configuration, seeding the sensor from `run.seed`
    pub fn from_configs(
        run: RunConfig,
        profile: MotionProfile,
        sensor: SensorConfig,
        filter: FilterConfig,
    ) -> Result<Self> {
        let sensor = InclinometerSim::seeded(sensor, run.seed)?;
        let filter = InclinometerEkf::new(filter)?;
        Self::new(run, profile, sensor, filter)
    }
}

impl<R: Rng> Runner<R> {
    pub fn new(
        config: RunConfig,
        profile: MotionProfile,
        sensor: InclinometerSim<R>,
        filter: InclinometerEkf,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            profile,
            sensor,
            filter,
            time: 0.0,
            tick: 0,
            history: SimulationResult::default(),
        })
    }

    /// Advance one tick: predict every tick, update every `update_every`
    ///
    /// An update refused with [`InclineError::NumericalError`] is skipped
    /// and counted; any other error is returned.
    pub fn step(&mut self) -> Result<RunStep> {
        let truth = self.profile.sample(self.time);
        self.sensor.apply_motion(&truth);

        let gyro = self.sensor.read_gyro();
        let accel = self.sensor.read_accel();
        let (roll_meas_acc, pitch_meas_acc) = roll_pitch_from_accel(&accel);

        self.filter.predict(&gyro, self.config.dt)?;

        let mut updated = false;
        if self.tick % self.config.update_every == 0 {
            match self.filter.update((roll_meas_acc, pitch_meas_acc)) {
                Ok(()) => updated = true,
                Err(InclineError::NumericalError(msg)) => {
                    log::warn!("t = {:.3} s: skipping update: {msg}", self.time);
                    self.history.skipped_updates += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let step = RunStep {
            time: self.time,
            truth,
            accel,
            gyro,
            roll_meas_acc,
            pitch_meas_acc,
            roll_est: self.filter.roll(),
            pitch_est: self.filter.pitch(),
            bias_est: self.filter.bias(),
            updated,
        };
        self.history.record(&step);

        self.tick += 1;
        self.time = self.tick as f64 * self.config.dt;

        Ok(step)
    }

    /// Run until the configured duration is covered
    pub fn run(&mut self) -> Result<&SimulationResult> {
        let steps = self.config.num_steps();
        log::debug!(
            "running '{}' for {} ticks at dt = {} s",
            self.profile.name(),
            steps,
            self.config.dt
        );

        while self.tick < steps {
            self.step()?;
        }

        let (roll_rms, pitch_rms) = self.history.rms_error_from(0);
        log::info!(
            "'{}' done: {} ticks, {} skipped updates, rms error roll {:.4} rad pitch {:.4} rad",
            self.profile.name(),
            self.history.len(),
            self.history.skipped_updates,
            roll_rms,
            pitch_rms
        );

        Ok(&self.history)
    }

    /// Reset time, history and filter; the sensor noise stream continues
    pub fn reset(&mut self) {
        self.filter.reset();
        self.time = 0.0;
        self.tick = 0;
        self.history = SimulationResult::default();
    }

    /// Get current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Schedule, validated at construction
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn sensor(&self) -> &InclinometerSim<R> {
        &self.sensor
    }

    pub fn filter(&self) -> &InclinometerEkf {
        &self.filter
    }

    /// Get recorded history
    pub fn history(&self) -> &SimulationResult {
        &self.history
    }

    /// Consume the runner, keeping only the recorded history
    pub fn into_result(self) -> SimulationResult {
        self.history
    }
}
