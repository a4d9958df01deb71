//! wifi-knob firmware for ESP32-C3.
//!
//! Brings up the OLED, pots, flash and radio, then ticks the connection
//! orchestrator every `POLL_INTERVAL_MS`. The network stack runner lives
//! in its own task so DHCP progresses while the UI loop sleeps.

#![no_std]
#![no_main]

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_net::{Runner, StackResources};
use embassy_time::{Instant, Timer};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::rng::Rng;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use esp_radio::wifi::WifiDevice;
use esp_storage::FlashStorage;
use static_cell::StaticCell;

use wifi_knob::board::{FlashStore, KnobInputs, OledSurface, StationRadio};
use wifi_knob::config::POLL_INTERVAL_MS;
use wifi_knob::ui::screens;
use wifi_knob::{Config, Context, Error, Orchestrator, Progress};

esp_bootloader_esp_idf::esp_app_desc!();

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Park the device after an unrecoverable bring-up failure.
async fn halt() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}

fn failure_reason(e: Error) -> &'static str {
    match e {
        Error::NoNetworksFound => "No networks found",
        Error::Radio(_) => "WiFi radio error",
        Error::Storage(_) => "Storage error",
        Error::Display => "Display error",
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    info!("wifi-knob starting");

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(
        timg0.timer0,
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT)
            .software_interrupt0,
    );

    // ── Display ────────────────────────────────────────────────────────────
    let i2c = match I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    ) {
        Ok(i2c) => i2c.with_sda(peripherals.GPIO8).with_scl(peripherals.GPIO9),
        Err(e) => {
            error!("I2C config rejected: {:?}", defmt::Debug2Format(&e));
            halt().await
        }
    };
    let surface = match OledSurface::init(i2c) {
        Ok(surface) => surface,
        Err(e) => {
            error!("SSD1306 allocation failed: {:?}", e);
            halt().await
        }
    };

    // ── Controls ───────────────────────────────────────────────────────────
    let button = Input::new(peripherals.GPIO2, InputConfig::default().with_pull(Pull::Up));
    let inputs = KnobInputs::new(peripherals.ADC1, peripherals.GPIO0, peripherals.GPIO1, button);

    // ── Credential store ───────────────────────────────────────────────────
    let store = FlashStore::new(FlashStorage::new(peripherals.FLASH));

    // ── WiFi + network stack ───────────────────────────────────────────────
    let radio = match esp_radio::init() {
        Ok(radio) => RADIO.init(radio),
        Err(e) => {
            error!("esp-radio init failed: {:?}", defmt::Debug2Format(&e));
            halt().await
        }
    };
    let (controller, interfaces) =
        match esp_radio::wifi::new(radio, peripherals.WIFI, Default::default()) {
            Ok(parts) => parts,
            Err(e) => {
                error!("wifi peripheral init failed: {:?}", defmt::Debug2Format(&e));
                halt().await
            }
        };

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::<3>::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).ok();

    let station = match StationRadio::new(controller, stack) {
        Ok(station) => station,
        Err(e) => {
            error!("WiFi start failed: {:?}", e);
            halt().await
        }
    };

    // ── Main loop ──────────────────────────────────────────────────────────
    let mut ctx = Context::new(station, store, inputs, surface, Config::new());
    let mut orchestrator = Orchestrator::new();
    let mut outcome_shown = false;

    loop {
        let now = Instant::now().as_millis();
        let frame = ctx.read_input(now);

        match orchestrator.poll(&mut ctx, frame, now) {
            Progress::Working => {}
            Progress::Ready(connection) => {
                if !outcome_shown {
                    info!("Online as {}", connection.ssid.as_str());
                    screens::online(&mut ctx.surface, connection.ssid.as_str(), connection.address);
                    ctx.present();
                    outcome_shown = true;
                }
            }
            Progress::Failed(e) => {
                if !outcome_shown {
                    error!("Connection cycle failed: {:?}", e);
                    screens::retry_prompt(&mut ctx.surface, failure_reason(e));
                    ctx.present();
                    outcome_shown = true;
                } else if frame.pressed {
                    orchestrator.restart();
                    outcome_shown = false;
                }
            }
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}
