use esp_radio::wifi::{
    event::{self, EventExt},
    AuthMethod, ClientConfig, Config as WifiRuntimeConfig, InternalWifiError, ModeConfig,
    ScanMethod, WifiController, WifiDevice, WifiError,
};
use linkboot::{
    types::disconnect_reason_label, DriverError, LinkCredentials, LinkEvent, StationDriver,
};
use log::{error, info, warn};
use static_cell::StaticCell;

use super::config::{LINK_EVENTS, RADIO_COMMANDS};

pub(crate) enum RadioCommand {
    Configure(ModeConfig),
    Start,
    Associate,
}

pub(crate) struct RadioParts {
    pub(crate) controller: WifiController<'static>,
    pub(crate) device: WifiDevice<'static>,
}

pub(crate) fn setup(wifi: esp_hal::peripherals::WIFI<'static>) -> Result<RadioParts, DriverError> {
    static RADIO_CTRL: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

    let radio_ctrl = esp_radio::init().map_err(|err| {
        error!("radio: esp_radio::init err={:?}", err);
        DriverError::Init("esp_radio::init failed")
    })?;
    let radio_ctrl = RADIO_CTRL.init(radio_ctrl);
    let (controller, ifaces) = esp_radio::wifi::new(radio_ctrl, wifi, WifiRuntimeConfig::default())
        .map_err(|err| match err {
            WifiError::InvalidArguments => DriverError::Init("wifi invalid_args"),
            WifiError::Unsupported => DriverError::Init("wifi unsupported"),
            WifiError::NotInitialized => DriverError::Init("wifi not_initialized"),
            WifiError::InternalError(InternalWifiError::NoMem) => DriverError::Init("wifi no_mem"),
            _ => DriverError::Init("wifi other"),
        })?;

    Ok(RadioParts {
        controller,
        device: ifaces.sta,
    })
}

/// Station driver backed by the radio task. Calls only queue work, so they
/// never block the caller; outcomes come back as link events.
pub(crate) struct EspStationDriver {
    setup: Result<(), DriverError>,
    handlers_installed: bool,
}

impl EspStationDriver {
    pub(crate) fn new(setup: Result<(), DriverError>) -> Self {
        Self {
            setup,
            handlers_installed: false,
        }
    }
}

impl StationDriver for EspStationDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        self.setup?;
        if !self.handlers_installed {
            install_link_event_handlers();
            self.handlers_installed = true;
        }
        Ok(())
    }

    fn configure(&mut self, credentials: &LinkCredentials) -> Result<(), DriverError> {
        let mode = mode_config_from_credentials(credentials);
        queue(RadioCommand::Configure(mode)).map_err(DriverError::Config)
    }

    fn start(&mut self) -> Result<(), DriverError> {
        queue(RadioCommand::Start).map_err(DriverError::Start)
    }

    fn request_association(&mut self) -> Result<(), DriverError> {
        queue(RadioCommand::Associate).map_err(DriverError::Association)
    }
}

fn queue(command: RadioCommand) -> Result<(), &'static str> {
    RADIO_COMMANDS
        .try_send(command)
        .map_err(|_| "radio command queue full")
}

fn mode_config_from_credentials(credentials: &LinkCredentials) -> ModeConfig {
    let auth_method = if credentials.is_open_network() {
        AuthMethod::None
    } else {
        AuthMethod::Wpa2Personal
    };
    ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(credentials.identifier().into())
            .with_password(credentials.secret().into())
            .with_auth_method(auth_method)
            .with_scan_method(ScanMethod::AllChannels),
    )
}

pub(crate) fn publish_link_event(event: LinkEvent) {
    if LINK_EVENTS.try_send(event).is_err() {
        warn!("radio: link event queue full, dropped {:?}", event);
    }
}

fn install_link_event_handlers() {
    event::StaStart::update_handler(|_| {
        publish_link_event(LinkEvent::StationStart);
    });

    event::StaConnected::update_handler(|event| {
        let ssid_len = (event.ssid_len() as usize).min(event.ssid().len());
        let ssid = core::str::from_utf8(&event.ssid()[..ssid_len]).unwrap_or("<non_utf8>");
        info!(
            "radio: associated ssid={} channel={}",
            ssid,
            event.channel()
        );
        publish_link_event(LinkEvent::Associated);
    });

    event::StaDisconnected::update_handler(|event| {
        let reason = event.reason();
        info!(
            "radio: disconnected reason={} ({}) rssi={}",
            reason,
            disconnect_reason_label(reason),
            event.rssi()
        );
        publish_link_event(LinkEvent::LinkLost { reason });
    });
}

#[embassy_executor::task]
pub(crate) async fn radio_task(mut controller: WifiController<'static>) {
    let commands = RADIO_COMMANDS.receiver();
    loop {
        match commands.receive().await {
            RadioCommand::Configure(mode) => {
                if let Err(err) = controller.set_config(&mode) {
                    error!("radio: station config err={:?}", err);
                }
            }
            RadioCommand::Start => {
                if matches!(controller.is_started(), Ok(true)) {
                    continue;
                }
                if let Err(err) = controller.start_async().await {
                    error!("radio: station start err={:?}", err);
                }
            }
            RadioCommand::Associate => {
                // Failure also raises StaDisconnected, which drives the retry.
                if let Err(err) = controller.connect_async().await {
                    warn!("radio: connect err={:?}", err);
                }
            }
        }
    }
}
