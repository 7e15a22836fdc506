//! ESP32-S3 bring-up: pulse ADC, motor outputs, telemetry UART, status
//! display and the optional Ethernet trace stream.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::sync::Arc;

use anyhow::anyhow;
use display_interface_spi::SPIInterface;
use esp_idf_svc::{
    eth::{AsyncEth, EspEth, EthDriver, SpiEth, SpiEthChipset},
    eventloop::EspSystemEventLoop,
    hal::{
        adc::{
            self,
            oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver},
        },
        delay::{self, BLOCK},
        gpio::{AnyIOPin, AnyOutputPin, Gpio18, Output, OutputPin, PinDriver},
        peripherals::Peripherals,
        prelude::*,
        spi,
        task::block_on,
        uart::{self, UartDriver},
    },
    timer::EspTaskTimerService,
};
use mipidsi::{
    models::ST7789,
    options::{ColorInversion, Orientation, Rotation},
    Builder,
};

use crate::{
    actuator::StressMotors,
    display::{DISPLAY_HEIGHT, DISPLAY_WIDTH},
    monitor::Monitor,
    sensor::PulseSource,
    trace,
};

pub const TELEMETRY_BAUD: u32 = 115_200;
pub const TRACE_PORT: u16 = 3333;

const W5500_MAC: [u8; 6] = [0x98, 0x76, 0xB6, 0x12, 0xF9, 0x93];

pub type OutPin<'d> = PinDriver<'d, AnyOutputPin, Output>;
type SharedSpi<'d> = Arc<spi::SpiDriver<'d>>;
pub type TraceEth<'d> = AsyncEth<EspEth<'d, SpiEth<SharedSpi<'d>>>>;

pub type TftDisplay<'d> = mipidsi::Display<
    SPIInterface<spi::SpiDeviceDriver<'d, SharedSpi<'d>>, OutPin<'d>>,
    ST7789,
    OutPin<'d>,
>;

/// Pulse sensor on the 12-bit ADC, reported on the 10-bit scale of the
/// analog front end the thresholds are tuned for.
pub struct AdcPulse<'d> {
    channel: AdcChannelDriver<'d, Gpio18, AdcDriver<'d, adc::ADC2>>,
}

impl PulseSource for AdcPulse<'_> {
    fn read(&mut self) -> anyhow::Result<u16> {
        Ok(self.channel.read_raw()? >> 2)
    }
}

/// Telemetry records on UART1. The console UART carries the log output,
/// so nothing but `"<bpm>,<level>"` lines ever reaches this port.
pub struct TelemetryUart<'d> {
    uart: UartDriver<'d>,
}

impl io::Write for TelemetryUart<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.uart.write(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.uart.wait_tx_done(BLOCK).map_err(io::Error::other)
    }
}

/// Broadcasts bincode trace frames over the W5500 once DHCP is up.
pub struct TraceLink<'d> {
    _eth: TraceEth<'d>,
    socket: UdpSocket,
}

impl<'d> TraceLink<'d> {
    pub fn connect(mut eth: TraceEth<'d>) -> anyhow::Result<Self> {
        let ip = block_on(async {
            eth.start().await?;
            log::info!("Trace link waiting for DHCP lease...");
            eth.wait_netif_up().await?;
            Ok::<_, anyhow::Error>(eth.eth().netif().get_ip_info()?.ip)
        })?;

        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, TRACE_PORT))?;
        socket.set_broadcast(true)?;
        log::info!("Streaming trace frames from {} to port {}", ip, TRACE_PORT);

        Ok(TraceLink { _eth: eth, socket })
    }

    /// Lost frames are only logged, the next snapshot supersedes them.
    pub fn send(&self, monitor: &Monitor, now_ms: u64) -> anyhow::Result<()> {
        let frame = trace::encode_snapshot(monitor, now_ms)?;
        if let Err(e) = self
            .socket
            .send_to(&frame, SocketAddrV4::new(Ipv4Addr::BROADCAST, TRACE_PORT))
        {
            log::warn!("Error sending trace frame: {:?}", e);
        }
        Ok(())
    }
}

pub struct Board<'d> {
    pub pulse: AdcPulse<'d>,
    pub motors: StressMotors<OutPin<'d>, OutPin<'d>>,
    pub telemetry: TelemetryUart<'d>,
    pub display: anyhow::Result<TftDisplay<'d>>,
    pub eth: Option<TraceEth<'d>>,
    pub backlight: OutPin<'d>,
    _tft_power: OutPin<'d>,
}

impl<'d> Board<'d> {
    pub fn new(
        peripherals: Peripherals,
        sys_loop: EspSystemEventLoop,
        timer_service: EspTaskTimerService,
    ) -> anyhow::Result<Self> {
        let pins = peripherals.pins;

        // Enable the TFT power rail
        let mut tft_power = PinDriver::output(pins.gpio7.downgrade_output())?;
        tft_power.set_high()?;

        log::info!("Initializing pulse ADC...");
        let adc_config = AdcChannelConfig {
            attenuation: adc::attenuation::DB_11,
            ..Default::default()
        };
        let adc_driver = AdcDriver::new(peripherals.adc2)?;
        let pulse = AdcPulse {
            channel: AdcChannelDriver::new(adc_driver, pins.gpio18, &adc_config)?,
        };

        let motors = StressMotors::new(
            PinDriver::output(pins.gpio5.downgrade_output())?,
            PinDriver::output(pins.gpio6.downgrade_output())?,
        );

        log::info!("Initializing telemetry UART...");
        let telemetry = TelemetryUart {
            uart: UartDriver::new(
                peripherals.uart1,
                pins.gpio8,
                pins.gpio9,
                Option::<AnyIOPin>::None,
                Option::<AnyIOPin>::None,
                &uart::config::Config::default().baudrate(Hertz(TELEMETRY_BAUD)),
            )?,
        };

        // Display and W5500 share one SPI bus
        let bus: SharedSpi<'d> = Arc::new(spi::SpiDriver::new(
            peripherals.spi2,
            pins.gpio36,
            pins.gpio35,
            Some(pins.gpio37),
            &spi::SpiDriverConfig::new().dma(spi::Dma::Auto(4096)),
        )?);

        log::info!("Initializing status display...");
        let display: anyhow::Result<TftDisplay<'d>> = (|| {
            let tft_spi = spi::SpiDeviceDriver::new(
                bus.clone(),
                Some(pins.gpio42),
                &spi::config::Config::new()
                    .baudrate(26.MHz().into())
                    .data_mode(spi::config::MODE_3),
            )?;
            let dc = PinDriver::output(pins.gpio40.downgrade_output())?;
            let rst = PinDriver::output(pins.gpio41.downgrade_output())?;

            Builder::new(ST7789, SPIInterface::new(tft_spi, dc))
                .display_size(DISPLAY_HEIGHT as u16, DISPLAY_WIDTH as u16)
                .orientation(Orientation::new().rotate(Rotation::Deg90))
                .display_offset(52, 40)
                .invert_colors(ColorInversion::Inverted)
                .reset_pin(rst)
                .init(&mut delay::Ets)
                .map_err(|_| anyhow!("ST7789 did not respond"))
        })();

        let eth = EthDriver::new_spi(
            bus,
            pins.gpio13,
            Some(pins.gpio10),
            Some(pins.gpio12),
            SpiEthChipset::W5500,
            20_u32.MHz().into(),
            Some(&W5500_MAC),
            None,
            sys_loop.clone(),
        )
        .and_then(EspEth::wrap)
        .and_then(|eth| AsyncEth::wrap(eth, sys_loop, timer_service))
        .map_err(|e| log::warn!("W5500 unavailable, no trace stream: {:?}", e))
        .ok();

        let backlight = PinDriver::output(pins.gpio45.downgrade_output())?;

        Ok(Board {
            pulse,
            motors,
            telemetry,
            display,
            eth,
            backlight,
            _tft_power: tft_power,
        })
    }
}
