use std::borrow::Cow;

/// Cooperative shutdown: anything holding a `ShutdownSignal` may ask the
/// serve loop to wind down. Signalling is best-effort; the first broadcast
/// wins and later ones are dropped.
#[derive(Clone)]
pub struct ShutdownSignal {
    shutdown_tx: async_broadcast::Sender<ShutdownMessage>,
}

#[derive(Clone, Debug)]
pub struct ShutdownMessage {
    pub reason: Cow<'static, str>,
}

impl ShutdownSignal {
    pub fn new(shutdown_tx: async_broadcast::Sender<ShutdownMessage>) -> Self {
        Self { shutdown_tx }
    }

    pub fn signal(&self, reason: impl Into<Cow<'static, str>>) {
        _ = self.shutdown_tx.try_broadcast(ShutdownMessage {
            reason: reason.into(),
        });
    }
}
