use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel, signal::Signal,
};
use linkboot::{LinkEvent, SessionEndpoint};

use crate::firmware::radio::RadioCommand;

pub(crate) const LINK_EVENT_QUEUE: usize = 8;
pub(crate) const RADIO_COMMAND_QUEUE: usize = 4;

/// Radio callbacks and the address watcher publish here; the link pump is
/// the only consumer.
pub(crate) static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, LINK_EVENT_QUEUE> =
    Channel::new();
pub(crate) static RADIO_COMMANDS: Channel<
    CriticalSectionRawMutex,
    RadioCommand,
    RADIO_COMMAND_QUEUE,
> = Channel::new();
pub(crate) static SESSION_START: Signal<CriticalSectionRawMutex, SessionEndpoint> = Signal::new();
