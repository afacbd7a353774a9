//! Kinesis - Audio-Reactive Kinetic Sculpture Firmware
//!
//! Main firmware binary for RP2040-based sculptures. A microphone on ADC0
//! is sampled from a high-priority executor, and a 1 ms control loop turns
//! loudness into a slew-limited PWM drive for the motor.
//!
//! Named after the Greek "kinesis" meaning "movement". The sculpture only
//! moves while the room around it is loud.
//!
//! Pinout (Raspberry Pi Pico):
//! - GPIO26 / ADC0: microphone (biased to mid-rail)
//! - GPIO2 / PWM1A: motor driver input
//! - GPIO0 / GPIO1: UART0 TX / RX to the host

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Duration;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use kinesis_core::audio::SampleRing;
use kinesis_drivers::motor::PwmMotor;

mod channels;
mod config;
mod tasks;

// Generated by build.rs from `[sampling] buffer_size`
include!(concat!(env!("OUT_DIR"), "/buffer_size.rs"));

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Rolling microphone buffer shared by the sampler and the control loop
static SAMPLES: SampleRing<BUFFER_SIZE> = SampleRing::new();

/// Executor for the sampler, preempting everything in thread mode
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 32]> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Kinesis firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Arm the watchdog first so a hang anywhere below still resets
    let mut watchdog = Watchdog::new(p.WATCHDOG);
    watchdog.pause_on_debug(true);
    watchdog.start(Duration::from_millis(config.watchdog_timeout_ms as u64));
    info!("Watchdog armed ({} ms)", config.watchdog_timeout_ms);

    // Motor PWM, switched off before anything else can drive it
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = config.pwm_top;
    let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, pwm_config);
    let (motor_pwm, _) = pwm.split();
    let motor_pwm = unwrap!(motor_pwm, "PWM channel A not configured");
    let motor = PwmMotor::new(motor_pwm, config.control.max_drive_hw);
    info!("Motor PWM initialized (top={})", config.pwm_top);

    // Microphone ADC
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let mic = Channel::new_pin(p.PIN_26, Pull::None);

    let (mut writer, reader) = unwrap!(
        SAMPLES.split(config.control.adc_max),
        "sample ring already split"
    );
    writer.prime(config.control.silence_baseline);
    info!("Sample ring: {} slots", SAMPLES.capacity());

    // Host serial link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.baud_rate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 32]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.baud_rate);

    // Sampler on the high-priority executor
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner
        .spawn(tasks::sampler_task(adc, mic, writer, config.sample_rate_hz))
        .unwrap();

    // Spawn tasks
    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::control_task(
            reader,
            motor,
            tasks::HwWatchdog(watchdog),
            config,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
