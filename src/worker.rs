//! Background gateway worker.
//!
//! A single thread owns the text generator and answers prompts one at a
//! time, in submission order, so the UI thread can keep redrawing while a
//! reply is pending. The controller never has more than one prompt in
//! flight; the worker itself also processes its queue strictly serially.

use std::io;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{debug, info};

use crate::gateway::{invoke, TextGenerator};

/// Handle to the gateway thread.
pub struct GatewayWorker {
    prompts: Sender<String>,
    replies: Receiver<String>,
}

impl GatewayWorker {
    /// Starts the worker thread.
    pub fn spawn(generator: Box<dyn TextGenerator + Send>) -> io::Result<Self> {
        let (prompt_tx, prompt_rx) = channel::unbounded::<String>();
        let (reply_tx, reply_rx) = channel::unbounded::<String>();

        thread::Builder::new()
            .name("llm-gateway".to_string())
            .spawn(move || {
                for prompt in prompt_rx {
                    debug!("Worker picked up a prompt");
                    let reply = invoke(generator.as_ref(), &prompt);
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
                info!("Gateway worker stopped");
            })?;

        Ok(Self {
            prompts: prompt_tx,
            replies: reply_rx,
        })
    }

    /// Queues a prompt. Returns `false` if the worker is gone.
    pub fn submit(&self, prompt: String) -> bool {
        self.prompts.send(prompt).is_ok()
    }

    /// Returns a finished reply, if any, without blocking.
    pub fn try_recv(&self) -> Option<String> {
        self.replies.try_recv().ok()
    }

    /// Waits up to `timeout` for a finished reply.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<String> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
