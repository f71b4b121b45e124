mod common;

use linkboot::{LinkEvent, LinkEventSink, LinkManager};
use proptest::prelude::*;

use common::{credentials, MockDriver, Signal};

#[derive(Clone, Copy, Debug)]
enum Step {
    Connect,
    Event(LinkEvent),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Connect),
        Just(Step::Event(LinkEvent::StationStart)),
        Just(Step::Event(LinkEvent::AddressAcquired)),
        any::<u8>().prop_map(|reason| Step::Event(LinkEvent::LinkLost { reason })),
    ]
}

proptest! {
    #[test]
    fn ready_iff_last_event_was_address_acquired(steps in prop::collection::vec(step(), 0..40)) {
        let signal = Signal::new();
        let mut link = LinkManager::new(MockDriver::default(), &signal);
        link.initialize().unwrap();
        let mut last_event = None;

        for step in steps {
            match step {
                Step::Connect => link.connect(credentials()).unwrap(),
                Step::Event(event) => {
                    link.on_link_event(event);
                    last_event = Some(event);
                }
            }
            prop_assert_eq!(
                signal.is_set(),
                last_event == Some(LinkEvent::AddressAcquired),
                "after {:?}",
                step
            );
        }
    }

    #[test]
    fn every_loss_requests_one_association(
        losses in 1usize..8,
        reason in any::<u8>(),
    ) {
        let signal = Signal::new();
        let mut link = LinkManager::new(MockDriver::default(), &signal);
        link.initialize().unwrap();
        link.connect(credentials()).unwrap();
        link.on_link_event(LinkEvent::StationStart);

        for _ in 0..losses {
            link.on_link_event(LinkEvent::AddressAcquired);
            link.on_link_event(LinkEvent::LinkLost { reason });
            prop_assert!(!signal.is_set());
        }
        prop_assert_eq!(link.association_attempts() as usize, losses + 1);
        prop_assert_eq!(link.driver().associations(), losses + 1);
    }
}
