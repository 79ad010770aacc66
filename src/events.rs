use serde::Serialize;
use tokio::sync::broadcast;

use crate::prelude::*;

/// State transitions the notification dispatcher subscribes to.
/// Published explicitly after the owning transaction commits.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
  BookingConfirmed { booking_id: i64, account_id: i64, total_amount: i64 },
  BookingCancelled { booking_id: i64, account_id: i64, was_confirmed: bool },
  WithdrawalRequested { withdrawal_id: i64, reseller_id: i64, amount: i64 },
  WithdrawalApproved { withdrawal_id: i64, reseller_id: i64, amount: i64 },
  WithdrawalRejected { withdrawal_id: i64, reseller_id: i64 },
  WithdrawalCompleted { withdrawal_id: i64, reseller_id: i64, amount: i64 },
}

#[derive(Clone)]
pub struct EventBus {
  tx: broadcast::Sender<Event>,
}

impl EventBus {
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity);
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Event> {
    self.tx.subscribe()
  }

  pub fn publish(&self, event: Event) {
    if let Err(err) = self.tx.send(event) {
      debug!("no event subscribers, dropped {:?}", err.0);
    }
  }
}

impl Default for EventBus {
  fn default() -> Self {
    Self::new(256)
  }
}
