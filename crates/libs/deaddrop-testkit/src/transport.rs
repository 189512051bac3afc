use async_trait::async_trait;
use deaddrop_core::{ChannelId, DeliveryEnvelope};
use deaddrop_relay::{PushError, Transport};
use std::collections::VecDeque;
use std::sync::Mutex;

/// What the scripted transport does with one push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushBehavior {
    Succeed,
    Fail,
    /// Never completes, exercising the caller's push timeout.
    Hang,
}

/// Transport fake that records every push attempt and plays back a script
/// of per-push behaviors. Pushes beyond the end of the script succeed.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<PushBehavior>>,
    pushes: Mutex<Vec<(ChannelId, DeliveryEnvelope)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: impl IntoIterator<Item = PushBehavior>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            pushes: Mutex::new(Vec::new()),
        }
    }

    pub fn enqueue(&self, behavior: PushBehavior) {
        if let Ok(mut guard) = self.script.lock() {
            guard.push_back(behavior);
        }
    }

    /// Every push attempted so far, in order, including failed and hung
    /// ones.
    pub fn pushes(&self) -> Vec<(ChannelId, DeliveryEnvelope)> {
        self.pushes.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn push(
        &self,
        channel: &ChannelId,
        envelope: &DeliveryEnvelope,
    ) -> Result<(), PushError> {
        if let Ok(mut guard) = self.pushes.lock() {
            guard.push((channel.clone(), envelope.clone()));
        }
        let behavior = self
            .script
            .lock()
            .ok()
            .and_then(|mut guard| guard.pop_front())
            .unwrap_or(PushBehavior::Succeed);
        match behavior {
            PushBehavior::Succeed => Ok(()),
            PushBehavior::Fail => Err(PushError::failed("scripted failure")),
            PushBehavior::Hang => std::future::pending().await,
        }
    }
}
