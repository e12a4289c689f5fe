use crate::foundation::ApproverId;
use serde::{Deserialize, Serialize};

/// Human approval delivered to a running saga.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSignal {
    pub approver: ApproverId,
    pub received_at_nanos: u64,
}

impl ApprovalSignal {
    pub fn new(approver: impl Into<ApproverId>, received_at_nanos: u64) -> Self {
        Self { approver: approver.into(), received_at_nanos }
    }
}

/// Acknowledgement returned to whoever delivered an approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAck {
    Accepted,
    AlreadyApproved,
    AlreadyFinished,
    UnknownInstance,
}

impl SignalAck {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalAck::Accepted => "accepted",
            SignalAck::AlreadyApproved => "already_approved",
            SignalAck::AlreadyFinished => "already_finished",
            SignalAck::UnknownInstance => "unknown_instance",
        }
    }
}
