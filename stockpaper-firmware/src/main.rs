//! Stockpaper - E-Paper Stock Ticker Firmware
//!
//! Wakes on a schedule, joins one of the configured networks, fetches a
//! quote and the local time, draws them on a 2.13" tri-color e-paper panel
//! and sleeps again. After too many failed cycles in a row it puts up a
//! "device off" frame and stays asleep.

#![no_std]
#![no_main]

extern crate alloc;

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{DMA_CH0, I2C0, PIO0};
use embassy_rp::pio::Pio;
use embassy_rp::spi::{self, Spi};
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Duration, Instant, Timer};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use stockpaper_core::{Device, RunController};
use stockpaper_drivers::battery::max17048::Max17048;
use stockpaper_drivers::display::canvas::TriColorCanvas;
use stockpaper_drivers::display::ssd1680::Ssd1680;
use stockpaper_drivers::link::CredentialLink;
use stockpaper_drivers::power::BoardPower;
use stockpaper_drivers::source::HttpDataSource;

use crate::board::{Cyw43Radio, CywLed, EpdSpi, SharedControl, TcpConnector};
use crate::config::load_config;

mod board;
mod config;

// Heap for response buffers and JSON decoding
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 32KB
const HEAP_SIZE: usize = 32 * 1024;

/// E-paper SPI clock
const EPD_SPI_HZ: u32 = 4_000_000;

/// Retry period when the embedded configuration is unusable
const CONFIG_FAULT_PERIOD: Duration = Duration::from_secs(60);

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

type Panel = Ssd1680<EpdSpi, Output<'static>, Output<'static>, Input<'static>, Delay>;
type Controller = RunController<
    CredentialLink<Cyw43Radio, Delay>,
    HttpDataSource<TcpConnector>,
    TriColorCanvas<Panel>,
    BoardPower<CywLed, Delay, Max17048<I2c<'static, I2C0, i2c::Async>>>,
>;

// Static cells (must live forever for task references)
static RADIO_STATE: StaticCell<cyw43::State> = StaticCell::new();
static CONTROL: StaticCell<SharedControl> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
static CONTROLLER: StaticCell<Controller> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Stockpaper firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Embedded configuration rejected: {}", e);
            loop {
                Timer::after(CONFIG_FAULT_PERIOD).await;
                error!("Rebuild with a valid device.toml");
            }
        }
    };

    // CYW43439 over PIO SPI
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let radio_spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = RADIO_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, radio_spi, fw).await;
    spawner.spawn(cyw43_task(runner)).unwrap();

    control.init(clm).await;
    info!("Radio initialized");

    // Network stack with DHCP
    let seed = Instant::now().as_ticks() ^ 0x5DEE_CE66_D1CE_4E5B;
    let (stack, net_runner) = embassy_net::new(
        net_device,
        NetConfig::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(net_runner)).unwrap();

    let control: &'static SharedControl = CONTROL.init(Mutex::new(control));

    // E-paper panel on SPI1
    let mut spi_config = spi::Config::default();
    spi_config.frequency = EPD_SPI_HZ;
    let epd_bus = Spi::new_txonly(p.SPI1, p.PIN_10, p.PIN_11, p.DMA_CH1, spi_config);
    let epd_spi = EpdSpi::new(epd_bus, Output::new(p.PIN_9, Level::High));
    let panel = Ssd1680::new(
        epd_spi,
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_12, Level::High),
        Input::new(p.PIN_13, Pull::Up),
        Delay,
    );

    // Fuel gauge on I2C0
    let gauge_bus = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());

    let device = Device {
        link: CredentialLink::new(
            Cyw43Radio::new(control, stack),
            Delay,
            config.schedule.connect_timeout_s,
        ),
        source: HttpDataSource::new(TcpConnector::new(stack), config.quote.provider.clone()),
        renderer: TriColorCanvas::new(panel),
        power: BoardPower::new(CywLed::new(control), Delay, Max17048::new(gauge_bus)),
    };

    info!("Entering run loop");
    let controller = CONTROLLER.init(RunController::new(device, config));
    controller.run().await
}

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
