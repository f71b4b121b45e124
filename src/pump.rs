//! Moves driver events into a link event sink, one at a time, in order.

use core::future::Future;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embassy_sync::mutex::Mutex;

use crate::link::LinkEventSink;
use crate::types::LinkEvent;

pub trait LinkEventSource {
    fn next_event(&mut self) -> impl Future<Output = LinkEvent>;
}

impl<M: RawMutex, const N: usize> LinkEventSource for Receiver<'_, M, LinkEvent, N> {
    fn next_event(&mut self) -> impl Future<Output = LinkEvent> {
        self.receive()
    }
}

/// Waits for one event and delivers it with the sink locked only for the
/// delivery itself.
pub async fn dispatch_next_link_event<M, S, L>(source: &mut S, sink: &Mutex<M, L>) -> LinkEvent
where
    M: RawMutex,
    S: LinkEventSource,
    L: LinkEventSink,
{
    let event = source.next_event().await;
    sink.lock().await.on_link_event(event);
    event
}

pub async fn run_link_pump<M, S, L>(mut source: S, sink: &Mutex<M, L>) -> !
where
    M: RawMutex,
    S: LinkEventSource,
    L: LinkEventSink,
{
    loop {
        dispatch_next_link_event(&mut source, sink).await;
    }
}
