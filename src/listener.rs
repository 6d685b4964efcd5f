// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

use crate::dispatcher::KeyDispatcher;
use crate::error::Error;
use crate::input::Driver;

/// Buffered key events between the hook and the dispatcher.
const EVENT_BUFFER: usize = 64;

/// Feeds key events from a driver into the dispatcher, in arrival order.
pub struct Listener {
    handle: JoinHandle<Result<(), Error>>,
}

impl Listener {
    /// Starts the driver and the dispatch task. The dispatcher is owned by that single
    /// task, so its state is never touched concurrently.
    pub fn new(dispatcher: KeyDispatcher, driver: Arc<dyn Driver>) -> Listener {
        Listener {
            handle: tokio::spawn(
                Listener::dispatch_events(dispatcher, driver).instrument(info_span!("listener")),
            ),
        }
    }

    /// Join will block until the driver stops.
    pub async fn join(&mut self) -> Result<(), Error> {
        (&mut self.handle)
            .await
            .map_err(|e| Error::Input(format!("listener task failed: {}", e)))?
    }

    async fn dispatch_events(
        mut dispatcher: KeyDispatcher,
        driver: Arc<dyn Driver>,
    ) -> Result<(), Error> {
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_BUFFER);
        let join_handle = driver.monitor_events(events_tx);

        info!(pool = dispatcher.pool_size(), "Listening for key presses.");

        while let Some(event) = events_rx.recv().await {
            let trigger = dispatcher.on_key_event(&event);
            debug!(event = ?event, trigger = ?trigger, "Handled key event.");
        }

        info!("Listener closing.");
        match join_handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!(err = %e, "Keyboard driver stopped with an error");
                Err(Error::Input(e.to_string()))
            }
            Err(e) => {
                error!(err = %e, "Error waiting for keyboard driver to stop");
                Err(Error::Input(e.to_string()))
            }
        }
    }
}
