//! The single-owner polling loop tying the monitor to its collaborators.

use std::io::Write;

use embedded_hal::digital::OutputPin;

use crate::actuator::StressMotors;
use crate::clock::Clock;
use crate::monitor::{Evaluation, Monitor};
use crate::sensor::PulseSource;
use crate::telemetry::TelemetryLink;

pub struct ControlLoop<S, C, A, B, W> {
    monitor: Monitor,
    sensor: S,
    clock: C,
    motors: StressMotors<A, B>,
    telemetry: TelemetryLink<W>,
}

impl<S, C, A, B, W> ControlLoop<S, C, A, B, W>
where
    S: PulseSource,
    C: Clock,
    A: OutputPin,
    B: OutputPin,
    W: Write,
{
    pub fn new(
        monitor: Monitor,
        sensor: S,
        clock: C,
        mut motors: StressMotors<A, B>,
        out: W,
    ) -> anyhow::Result<Self> {
        let interval = monitor.config().telemetry_interval_ms;
        motors.apply(monitor.stress())?;

        Ok(ControlLoop {
            monitor,
            sensor,
            clock,
            motors,
            telemetry: TelemetryLink::new(out, interval),
        })
    }

    /// One loop iteration: sample, detect, and on window close classify and
    /// drive the motors; telemetry goes out whenever its period has elapsed.
    pub fn run_once(&mut self) -> anyhow::Result<Option<Evaluation>> {
        let raw = self.sensor.read()?;
        let now = self.clock.now_ms();

        let eval = self.monitor.process(raw, now);
        if let Some(e) = &eval {
            self.motors.apply(e.stress)?;
        }

        self.telemetry
            .poll(now, self.monitor.bpm(), self.monitor.stress())?;

        Ok(eval)
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn telemetry(&self) -> &TelemetryLink<W> {
        &self.telemetry
    }

    pub fn motors(&self) -> &StressMotors<A, B> {
        &self.motors
    }
}
