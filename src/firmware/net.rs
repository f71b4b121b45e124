use embassy_net::{Runner, Stack, StackResources};
use esp_hal::rng::Rng;
use esp_radio::wifi::WifiDevice;
use linkboot::LinkEvent;
use log::info;
use static_cell::StaticCell;

use super::radio::publish_link_event;

pub(crate) fn setup_stack(
    device: WifiDevice<'static>,
) -> (Stack<'static>, Runner<'static, WifiDevice<'static>>) {
    static STACK_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    embassy_net::new(
        device,
        embassy_net::Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::<3>::new()),
        seed,
    )
}

#[embassy_executor::task]
pub(crate) async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Turns DHCP lease changes into `AddressAcquired` events.
#[embassy_executor::task]
pub(crate) async fn address_watch_task(stack: Stack<'static>) {
    loop {
        stack.wait_config_up().await;
        if let Some(cfg) = stack.config_v4() {
            info!("net: ipv4 {} gateway={:?}", cfg.address, cfg.gateway);
        }
        publish_link_event(LinkEvent::AddressAcquired);
        stack.wait_config_down().await;
        info!("net: ipv4 lease dropped");
    }
}
