use statig::prelude::*;

use crate::types::LinkEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

impl LinkState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum LinkInput {
    Connect,
    Station(LinkEvent),
}

/// Side effects requested by one dispatch. Applied by the manager after the
/// machine returns: readiness first, then association.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct LinkDispatch {
    pub(super) readiness: Option<bool>,
    pub(super) associate: bool,
}

impl LinkDispatch {
    fn ready(&mut self) {
        self.readiness = Some(true);
    }

    fn not_ready(&mut self) {
        self.readiness = Some(false);
    }

    fn not_ready_and_associate(&mut self) {
        self.readiness = Some(false);
        self.associate = true;
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct LinkMachine {
    pub(super) state: LinkState,
}

impl LinkMachine {
    pub(super) fn new() -> Self {
        Self {
            state: LinkState::Idle,
        }
    }

    fn enter(&mut self, state: LinkState) -> Outcome<State> {
        self.state = state;
        match state {
            LinkState::Idle => Transition(State::idle()),
            LinkState::Connecting => Transition(State::connecting()),
            LinkState::Connected => Transition(State::connected()),
            LinkState::Disconnected => Transition(State::disconnected()),
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl LinkMachine {
    #[state]
    fn idle(&mut self, context: &mut LinkDispatch, event: &LinkInput) -> Outcome<State> {
        match event {
            // Station not started yet; association waits for StationStart.
            LinkInput::Connect => self.enter(LinkState::Connecting),
            LinkInput::Station(LinkEvent::StationStart) => {
                context.not_ready_and_associate();
                self.enter(LinkState::Connecting)
            }
            LinkInput::Station(LinkEvent::Associated) => self.enter(LinkState::Connecting),
            LinkInput::Station(LinkEvent::AddressAcquired) => {
                context.ready();
                self.enter(LinkState::Connected)
            }
            LinkInput::Station(LinkEvent::LinkLost { .. }) => {
                context.not_ready();
                Handled
            }
        }
    }

    #[state]
    fn connecting(&mut self, context: &mut LinkDispatch, event: &LinkInput) -> Outcome<State> {
        match event {
            LinkInput::Connect | LinkInput::Station(LinkEvent::Associated) => Handled,
            LinkInput::Station(LinkEvent::StationStart) => {
                context.not_ready_and_associate();
                Handled
            }
            LinkInput::Station(LinkEvent::AddressAcquired) => {
                context.ready();
                self.enter(LinkState::Connected)
            }
            LinkInput::Station(LinkEvent::LinkLost { .. }) => {
                context.not_ready_and_associate();
                self.enter(LinkState::Disconnected)
            }
        }
    }

    #[state]
    fn connected(&mut self, context: &mut LinkDispatch, event: &LinkInput) -> Outcome<State> {
        match event {
            LinkInput::Connect | LinkInput::Station(LinkEvent::Associated) => Handled,
            LinkInput::Station(LinkEvent::StationStart) => {
                context.not_ready_and_associate();
                self.enter(LinkState::Connecting)
            }
            LinkInput::Station(LinkEvent::AddressAcquired) => {
                context.ready();
                Handled
            }
            LinkInput::Station(LinkEvent::LinkLost { .. }) => {
                context.not_ready_and_associate();
                self.enter(LinkState::Disconnected)
            }
        }
    }

    #[state]
    fn disconnected(&mut self, context: &mut LinkDispatch, event: &LinkInput) -> Outcome<State> {
        match event {
            LinkInput::Connect => {
                context.associate = true;
                self.enter(LinkState::Connecting)
            }
            LinkInput::Station(LinkEvent::StationStart) => {
                context.not_ready_and_associate();
                self.enter(LinkState::Connecting)
            }
            LinkInput::Station(LinkEvent::Associated) => self.enter(LinkState::Connecting),
            LinkInput::Station(LinkEvent::AddressAcquired) => {
                context.ready();
                self.enter(LinkState::Connected)
            }
            LinkInput::Station(LinkEvent::LinkLost { .. }) => {
                context.not_ready_and_associate();
                Handled
            }
        }
    }
}
