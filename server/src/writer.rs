//! Per-session outbound writer
//!
//! Every connection gets a bounded queue and one task draining it into the
//! socket. Broadcasting only enqueues, so a stalled client fills its own
//! queue and never blocks delivery to anyone else.

use crate::dispatcher::DispatcherHandle;
use crate::registry::SessionId;
use log::{debug, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outbound queue bound used when the config does not override it
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Drains `queue` into `sink`, one line per entry
///
/// Returns once every sender is dropped (after flushing what is queued)
/// or on the first write error. A write error also evicts the session,
/// since nothing more can reach it. The write side is shut down either way.
pub async fn run_writer<W>(
    mut sink: W,
    mut queue: mpsc::Receiver<String>,
    id: SessionId,
    dispatcher: DispatcherHandle,
    label: String,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = queue.recv().await {
        let mut data = line.into_bytes();
        data.push(b'\n');

        if let Err(e) = sink.write_all(&data).await {
            warn!("Failed to write to {}: {}", label, e);
            dispatcher.evict(id);
            break;
        }
    }

    if let Err(e) = sink.shutdown().await {
        debug!("Shutdown of {} failed: {}", label, e);
    }
    debug!("Writer for {} finished", label);
}

/// Creates a queue and spawns its writer task
pub fn spawn_writer<W>(
    sink: W,
    capacity: usize,
    id: SessionId,
    dispatcher: DispatcherHandle,
    label: String,
) -> (mpsc::Sender<String>, JoinHandle<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(run_writer(sink, rx, id, dispatcher, label));
    (tx, handle)
}
