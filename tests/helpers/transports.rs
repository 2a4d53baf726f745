use kinfolk_infra::{NotificationTransport, TransportError};
use std::{collections::VecDeque, sync::Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub destination: String,
    pub subject: String,
    pub body: String,
}

/// Records every notification and answers with the scripted outcomes in order.
/// Succeeds once the script is exhausted.
#[derive(Default)]
pub struct ScriptedTransport {
    pub sent: Mutex<Vec<SentNotification>>,
    outcomes: Mutex<VecDeque<Result<(), String>>>,
}

impl ScriptedTransport {
    pub fn failing_next(&self, error: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(error.to_string()));
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NotificationTransport for ScriptedTransport {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(SentNotification {
            destination: destination.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Err(e)) => Err(TransportError::Other(e)),
            _ => Ok(()),
        }
    }
}
