use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// Receives training progress as a percentage in `[0, 100]`. Implementations must return
/// promptly: the training loop does not wait for the value to be consumed.
pub trait ProgressSink {
  fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
  fn report(&mut self, percent: f64) {
    self(percent)
  }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
  fn report(&mut self, _percent: f64) {}
}

/// Forwards reports over an unbounded channel to whichever task owns the receiver.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
  sender: UnboundedSender<f64>,
}

impl ChannelProgress {
  pub fn channel() -> (Self, UnboundedReceiver<f64>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self { sender }, receiver)
  }
}

impl ProgressSink for ChannelProgress {
  fn report(&mut self, percent: f64) {
    if self.sender.send(percent).is_err() {
      trace!(percent, "progress receiver gone, dropping report");
    }
  }
}
