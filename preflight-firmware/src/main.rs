//! Preflight - boot gate firmware
//!
//! Runs once at power-up on RP2040-based flight controllers: self-tests
//! the magnetometer, IMU and barometer, validates the RC calibration held
//! in the parameter table, and alerts the operator on a failing verdict.
//!
//! Board wiring:
//! - HMC5883L on I2C0 (GP4 SDA, GP5 SCL)
//! - SPL06 on I2C1 (GP6 SDA, GP7 SCL)
//! - ICM-42688 on SPI0 (GP18 SCK, GP19 MOSI, GP16 MISO, GP17 CS)
//! - Blue LED on GP25, amber LED on GP24
//! - Buzzer on GP8 (PWM slice 4, channel A)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::{i2c, pwm, spi};
use embassy_time::{Delay, Timer};
use {defmt_rtt as _, panic_probe as _};

use preflight_core::cli::split_args;
use preflight_core::gate::{run_preflight, BootDevices};
use preflight_core::traits::{LedId, StatusLeds};
use preflight_core::verdict::ExitStatus;
use preflight_drivers::indicator::{GpioLeds, PwmBuzzer};
use preflight_drivers::sensor::{BoardSensors, Hmc5883, Icm42688, MagCalibration, Spl06};

use crate::config::{parse_config, BootConfig};
use crate::log::DefmtLog;

mod config;
mod log;

/// Embedded boot configuration (compiled into firmware)
/// Edit params.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../params.toml");

/// Buzzer PWM period in timer ticks (125 MHz / 50_000 = 2.5 kHz)
const BUZZER_TOP: u16 = 49_999;

const HEARTBEAT_MS: u64 = 500;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Preflight firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let boot = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded {} parameters", config.params.len());
            config
        }
        Err(e) => {
            warn!("Failed to parse params.toml: {:?}, using defaults", e);
            BootConfig::default()
        }
    };

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = 400_000;
    let mag_bus = i2c::I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config.clone());
    let baro_bus = i2c::I2c::new_blocking(p.I2C1, p.PIN_7, p.PIN_6, i2c_config);

    let mut spi_config = spi::Config::default();
    spi_config.frequency = 1_000_000;
    let imu_bus = spi::Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let imu_cs = Output::new(p.PIN_17, Level::High);

    let mag_cal = MagCalibration::from_params(&boot.params);
    if mag_cal.is_none() {
        warn!("Magnetometer calibration parameters missing");
    }

    let mut sensors = BoardSensors::new(
        Some(Hmc5883::new(mag_bus, Delay, mag_cal)),
        Some(Icm42688::new(imu_bus, imu_cs, Delay)),
        Some(Spl06::new(baro_bus, Delay)),
    );

    let mut leds = GpioLeds::new_active_high(
        Output::new(p.PIN_25, Level::Low),
        Output::new(p.PIN_24, Level::Low),
    );

    let mut pwm_config = pwm::Config::default();
    pwm_config.top = BUZZER_TOP;
    let (buzzer_out, _) = pwm::Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, pwm_config).split();
    let mut alarm = buzzer_out.map(PwmBuzzer::new);
    if alarm.is_none() {
        warn!("Buzzer output unavailable, alarms will be silent");
    }

    let mut log = DefmtLog;
    let mut delay = Delay;

    let status = run_preflight(
        split_args(&boot.args),
        &boot.preflight,
        BootDevices {
            sensors: &mut sensors,
            params: &boot.params,
            log: &mut log,
            leds: &mut leds,
            alarm: &mut alarm,
            delay: &mut delay,
        },
    );

    info!("Preflight finished with exit status {}", status.code());

    match status {
        ExitStatus::Success => {
            // Heartbeat on blue while the vehicle is cleared to arm
            let mut on = false;
            loop {
                on = !on;
                leds.set(LedId::Blue, on);
                Timer::after_millis(HEARTBEAT_MS).await;
            }
        }
        ExitStatus::Failure => {
            // Both LEDs stay solid; nothing else runs
            loop {
                Timer::after_secs(1).await;
            }
        }
    }
}
