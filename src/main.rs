#[cfg(target_os = "espidf")]
fn main() -> Result<(), anyhow::Error> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<(), anyhow::Error> {
    simulator::run()
}

#[cfg(target_os = "espidf")]
mod firmware {
    use anyhow::anyhow;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::{delay::FreeRtos, peripherals::Peripherals};
    use esp_idf_svc::timer::EspTaskTimerService;
    use log::{error, warn};

    use stress_pulser::{
        board::{Board, TraceLink},
        clock::{Clock, SystemClock},
        control::ControlLoop,
        display, Monitor, MonitorConfig,
    };

    const LOOP_DELAY_MS: u32 = 2;
    const RENDER_INTERVAL_MS: u64 = 100;
    const TRACE_INTERVAL_MS: u64 = 1_000;

    pub fn run() -> Result<(), anyhow::Error> {
        // It is necessary to call this function once. Otherwise some patches to the runtime
        // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
        esp_idf_svc::sys::link_patches();

        // Logs stay on the console UART, telemetry has UART1 to itself
        esp_idf_svc::log::EspLogger::initialize_default();

        let peripherals = Peripherals::take()?;
        let sys_loop = EspSystemEventLoop::take()?;
        let timer_service = EspTaskTimerService::new()?;

        let mut board = Board::new(peripherals, sys_loop, timer_service)?;

        let mut tft = match board.display {
            Ok(tft) => tft,
            Err(e) => {
                error!("Display init failed, halting: {:?}", e);
                loop {
                    FreeRtos::delay_ms(1_000);
                }
            }
        };
        board.backlight.set_high()?;
        display::render_splash(&mut tft, "Waiting for pulse")
            .map_err(|_| anyhow!("draw splash"))?;

        let trace_link = board.eth.and_then(|eth| {
            TraceLink::connect(eth)
                .map_err(|e| warn!("No network, trace stream disabled: {:?}", e))
                .ok()
        });

        let mut ctl = ControlLoop::new(
            Monitor::new(MonitorConfig::default()),
            board.pulse,
            SystemClock::new(),
            board.motors,
            board.telemetry,
        )?;

        let mut last_render_ms = 0;
        let mut last_trace_ms = 0;
        loop {
            ctl.run_once()?;
            let now = ctl.clock().now_ms();

            if now - last_render_ms >= RENDER_INTERVAL_MS {
                last_render_ms = now;
                let monitor = ctl.monitor();
                display::render(&mut tft, monitor.waveform(), monitor.bpm(), monitor.stress())
                    .map_err(|_| anyhow!("draw status"))?;
            }

            if let Some(link) = &trace_link {
                if now - last_trace_ms >= TRACE_INTERVAL_MS {
                    last_trace_ms = now;
                    link.send(ctl.monitor(), now)?;
                }
            }

            FreeRtos::delay_ms(LOOP_DELAY_MS);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod simulator {
    //! Desktop run of the control loop against a synthetic pulse.
    //!
    //! Telemetry records go to stdout, logs to stderr (`RUST_LOG=info`).

    use std::io;

    use embedded_hal::digital::{ErrorType, OutputPin};
    use log::info;

    use stress_pulser::{
        actuator::StressMotors,
        clock::{Clock, SimClock},
        control::ControlLoop,
        sensor::SyntheticPulse,
        Monitor, MonitorConfig,
    };

    const STEP_MS: u64 = 10;
    const RUN_MS: u64 = 120_000;

    /// Calm, tense and racing rhythms, 40 s each.
    const PHASES: [(u64, &[u64]); 3] = [
        (40_000, &[820, 910, 760, 980, 840, 1020, 790]),
        (80_000, &[690, 760, 700, 770, 720]),
        (RUN_MS, &[620, 625, 621, 624]),
    ];

    struct LogPin(&'static str);

    impl ErrorType for LogPin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for LogPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            log::trace!("{} off", self.0);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            log::trace!("{} on", self.0);
            Ok(())
        }
    }

    pub fn run() -> Result<(), anyhow::Error> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();

        let clock = SimClock::new(0);
        let (_, first) = PHASES[0];
        let motors = StressMotors::new(LogPin("motor A"), LogPin("motor B"));
        let mut ctl = ControlLoop::new(
            Monitor::new(MonitorConfig::default()),
            SyntheticPulse::new(&clock, first),
            &clock,
            motors,
            io::stdout(),
        )?;

        for (end_ms, intervals) in PHASES {
            info!("Pulse phase until {} ms: {:?}", end_ms, intervals);
            ctl.sensor_mut().set_intervals(intervals);
            while clock.now_ms() < end_ms {
                clock.advance(STEP_MS);
                ctl.run_once()?;
            }
        }

        Ok(())
    }
}
