use comet_types::{ComponentId, ObjectId};
use serde::{Deserialize, Serialize};

/// Acknowledgement for a batch of pushed objects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushAck {
    /// Objects the remote did not have before.
    pub accepted: Vec<ObjectId>,
    /// Objects the remote already held.
    pub already_present: usize,
}

/// Outcome of pushing one component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResult {
    /// The component id as recorded on the remote (remote scope, latest
    /// version).
    pub remote_id: ComponentId,
    pub ack: PushAck,
}
