// SPDX-License-Identifier: AGPL-3.0-or-later

use std::future::Future;

use anyhow::Result;
use log::{error, info};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot};
use tokio::task;
use tokio::task::JoinHandle;
use triggered::{Listener, Trigger};

/// Receives shutdown signal for services so they can react accordingly.
pub type Shutdown = JoinHandle<()>;

/// Sends a message to the manager as soon as a service is ready to do its work.
pub type ServiceReadySender = oneshot::Sender<()>;

/// Resolves when the service is ready, fails when the service stopped before that.
pub type ServiceReadyReceiver = oneshot::Receiver<()>;

/// This trait defines a generic async service function receiving a shared context, the shutdown
/// signal handler and a sender to announce that it is ready.
///
/// It is using the `async_trait` macro to avoid a more ugly trait signature as working with
/// generic, static, pinned and boxed async functions can look quite messy.
#[async_trait::async_trait]
pub trait Service<D>
where
    D: Clone + Send + Sync + 'static,
{
    async fn call(&self, context: D, shutdown: Shutdown, tx_ready: ServiceReadySender)
        -> Result<()>;
}

/// Implements our `Service` trait for a generic async function.
#[async_trait::async_trait]
impl<FN, F, D> Service<D> for FN
where
    // Function accepting a context, the shutdown signal and the ready sender, returning a future
    FN: Fn(D, Shutdown, ServiceReadySender) -> F + Sync,
    // A future
    F: Future<Output = Result<()>> + Send + 'static,
    // Generic context type
    D: Clone + Send + Sync + 'static,
{
    async fn call(
        &self,
        context: D,
        shutdown: Shutdown,
        tx_ready: ServiceReadySender,
    ) -> Result<()> {
        (self)(context, shutdown, tx_ready).await
    }
}

/// Wrapper around `Trigger` which sends a signal as soon as `Signal` gets dropped.
#[derive(Clone)]
struct Signal(Trigger);

impl Signal {
    /// Fires the signal manually.
    pub fn trigger(&self) {
        self.0.trigger();
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        // Fires the signal automatically on drop
        self.trigger();
    }
}

/// Service manager for orchestration of long-running concurrent processes.
///
/// The manager sends a shutdown signal to allow services to react to it gracefully.
///
/// Stopped services (because of a panic, error or successful return) will send an exit signal
/// which can be subscribed to via the `on_exit` method. Usually stopped services indicate system
/// failure and it is recommended to stop the application when this events occurs.
pub struct ServiceManager<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Shared, thread-safe context between services.
    context: D,

    /// Sender of exit signal.
    ///
    /// The manager catches returned errors or panics from services and sends the exit signal.
    exit_signal: Signal,

    /// Receiver of exit signal.
    exit_handle: Listener,

    /// Sender of shutdown signal.
    ///
    /// This needs to be a broadcast channel as we keep count of the subscribers and stop the
    /// service manager as soon as all of them have been dropped.
    shutdown_signal: broadcast::Sender<bool>,
}

impl<D> ServiceManager<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Returns a new instance of a service manager.
    pub fn new(context: D) -> Self {
        let (shutdown_signal, _) = broadcast::channel(16);
        let (exit_signal, exit_handle) = triggered::trigger();

        Self {
            context,
            exit_signal: Signal(exit_signal),
            exit_handle,
            shutdown_signal,
        }
    }

    /// Adds a new service to the manager.
    ///
    /// Errors returned and panics by the service will send an exit signal which can be subscribed
    /// to via the `on_exit` method. The returned receiver resolves once the service is ready.
    pub fn add<F: Service<D> + Send + Sync + Copy + 'static>(
        &mut self,
        name: &'static str,
        service: F,
    ) -> ServiceReadyReceiver {
        let (tx_ready, rx_ready) = oneshot::channel();

        // Sender and receiver for shutdown channel
        let shutdown_tx = self.shutdown_signal.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();

        // Wait for any signal from the shutdown channel
        let signal = task::spawn(async move {
            let _ = shutdown_rx.recv().await;
        });

        // Sender for exit signal
        let exit_signal = self.exit_signal.clone();

        // Reference to shared context
        let context = self.context.clone();

        task::spawn(async move {
            info!("Start {} service", name);

            // Run the service!
            let handle = service.call(context, signal, tx_ready).await;

            // Drop the shutdown sender of this service when we're done, this signals the shutdown
            // process that this service has finally stopped
            drop(shutdown_tx);

            // Handle potential errors which have been returned by the service
            if let Some(err) = handle.err() {
                error!("Error in {} service: {}", name, err);
                exit_signal.trigger();
            }

            // `exit_signal` goes out of scope and fires, also when this task panics or stops
        });

        rx_ready
    }

    /// Future which resolves as soon as a service returned an error, panicked or stopped.
    pub async fn on_exit(&self) {
        self.exit_handle.clone().await;
    }

    /// Informs all services about graceful shutdown and waits for them until they all stopped.
    pub async fn shutdown(self) {
        info!("Received shutdown signal");

        let mut rx = self.shutdown_signal.subscribe();

        // Broadcast graceful shutdown messages to all services. This can only fail when no
        // service is listening anymore
        let _ = self.shutdown_signal.send(true);

        // We drop our sender first to make sure _all_ senders get eventually closed, because the
        // recv() call otherwise sleeps forever
        drop(self.shutdown_signal);

        // When every sender has gone out of scope, the recv call will return with a `Closed`
        // error. This is our signal that all services have been finally shut down
        loop {
            if let Err(RecvError::Closed) = rx.recv().await {
                break;
            }
        }
    }
}
