mod config;
mod flash;
mod net;
mod radio;
mod system;
mod ws_client;

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::Timer;
use esp_hal::timer::timg::TimerGroup;
use linkboot::{bootstrap, pump, LinkManager, Orchestrator, ReadinessSignal, SessionManager};
use log::{error, info, LevelFilter};
use static_cell::StaticCell;

use self::{
    config::{compiled_settings, FATAL_RESET_DELAY, HEAP_SIZE, LINK_EVENTS},
    flash::FlashProvisioning,
    radio::EspStationDriver,
    system::EspSystemInfo,
    ws_client::WsTransport,
};

pub(crate) type LinkCell = Mutex<
    CriticalSectionRawMutex,
    LinkManager<'static, CriticalSectionRawMutex, EspStationDriver>,
>;
pub(crate) type SessionCell = Mutex<CriticalSectionRawMutex, SessionManager<WsTransport>>;

static LINK_READY: ReadinessSignal<CriticalSectionRawMutex> = ReadinessSignal::new();
static LINK: StaticCell<LinkCell> = StaticCell::new();
static SESSION: StaticCell<SessionCell> = StaticCell::new();

pub(crate) fn run() -> ! {
    esp_println::logger::init_logger(LevelFilter::Debug);

    let peripherals = esp_hal::init(esp_hal::Config::default());
    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(size: HEAP_SIZE);
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let storage = FlashProvisioning::new(peripherals.FLASH);

    let (driver, transport, network) = match radio::setup(peripherals.WIFI) {
        Ok(parts) => {
            let (stack, runner) = net::setup_stack(parts.device);
            (
                EspStationDriver::new(Ok(())),
                WsTransport::new(true),
                Some((parts.controller, stack, runner)),
            )
        }
        // Surfaced as a fatal error once the bootstrap initializes the link.
        Err(err) => (
            EspStationDriver::new(Err(err)),
            WsTransport::new(false),
            None,
        ),
    };

    let link: &'static LinkCell = LINK.init(Mutex::new(LinkManager::new(driver, &LINK_READY)));
    let session: &'static SessionCell = SESSION.init(Mutex::new(SessionManager::new(transport)));

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        if let Some((controller, stack, runner)) = network {
            spawner.must_spawn(net::net_task(runner));
            spawner.must_spawn(net::address_watch_task(stack));
            spawner.must_spawn(radio::radio_task(controller));
            spawner.must_spawn(ws_client::session_task(stack, session));
        }
        spawner.must_spawn(link_pump_task(link));
        spawner.must_spawn(boot_task(storage, link, session));
    });
}

#[embassy_executor::task]
async fn link_pump_task(link: &'static LinkCell) {
    pump::run_link_pump(LINK_EVENTS.receiver(), link).await
}

#[embassy_executor::task]
async fn boot_task(
    mut storage: FlashProvisioning<'static>,
    link: &'static LinkCell,
    session: &'static SessionCell,
) {
    let orchestrator = Orchestrator::new(link, session, &LINK_READY);
    let compiled = compiled_settings();
    match bootstrap::run(&mut storage, &EspSystemInfo, &compiled, &orchestrator).await {
        Ok(()) => info!("boot: session started, handing over to event tasks"),
        Err(err) => {
            error!(
                "boot: fatal {}; reset in {}s",
                err,
                FATAL_RESET_DELAY.as_secs()
            );
            Timer::after(FATAL_RESET_DELAY).await;
            esp_hal::system::software_reset();
        }
    }
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}
