use linkboot::SystemInfo;

const PLATFORM_VERSION: &str = concat!(
    "esp-hal 1.0 esp-radio 0.17 ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION")
);

pub(crate) struct EspSystemInfo;

impl SystemInfo for EspSystemInfo {
    fn free_heap_bytes(&self) -> usize {
        esp_alloc::HEAP.free()
    }

    fn platform_version(&self) -> &str {
        PLATFORM_VERSION
    }
}
