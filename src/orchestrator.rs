use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::with_timeout;
use log::{info, warn};

use crate::config::{BootConfig, ReadinessPolicy};
use crate::error::BootError;
use crate::link::{LinkManager, StationDriver};
use crate::readiness::ReadinessSignal;
use crate::session::{MessageTransport, SessionManager};

/// Sequences link bring-up and session start. Runs once per boot.
pub struct Orchestrator<'a, 'r, M: RawMutex, D: StationDriver, T: MessageTransport> {
    link: &'a Mutex<M, LinkManager<'r, M, D>>,
    session: &'a Mutex<M, SessionManager<T>>,
    readiness: &'a ReadinessSignal<M>,
}

impl<'a, 'r, M, D, T> Orchestrator<'a, 'r, M, D, T>
where
    M: RawMutex,
    D: StationDriver,
    T: MessageTransport,
{
    pub fn new(
        link: &'a Mutex<M, LinkManager<'r, M, D>>,
        session: &'a Mutex<M, SessionManager<T>>,
        readiness: &'a ReadinessSignal<M>,
    ) -> Self {
        Self {
            link,
            session,
            readiness,
        }
    }

    /// Initializes and connects the link, waits for readiness, starts the
    /// session. Manager locks are never held across the wait.
    pub async fn run(&self, config: &BootConfig) -> Result<(), BootError> {
        {
            let mut link = self.link.lock().await;
            link.initialize()?;
            link.connect(config.credentials.clone())?;
        }

        self.wait_for_link(config.readiness).await?;
        info!("orchestrator: link ready, starting session");

        self.session.lock().await.start(config.endpoint.clone())?;
        Ok(())
    }

    async fn wait_for_link(&self, policy: ReadinessPolicy) -> Result<(), BootError> {
        match policy {
            ReadinessPolicy::WaitForever => {
                self.readiness.wait_until_set().await;
                Ok(())
            }
            ReadinessPolicy::Bounded(deadline) => {
                with_timeout(deadline, self.readiness.wait_until_set())
                    .await
                    .map_err(|_| {
                        warn!(
                            "orchestrator: link not ready after {}s",
                            deadline.as_secs()
                        );
                        BootError::LinkTimeout
                    })
            }
        }
    }
}
