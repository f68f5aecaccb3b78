//! Channel-membership gate in front of every lookup.
//!
//! A user passes only when every configured channel reports a joined-like
//! status. Oracle failures never count as joined.

use serde::Serialize;
use std::sync::Arc;

use crate::admin::AdminConfig;
use crate::error::{BotError, Result};

/// Status reported by the membership oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Member,
    Moderator,
    Owner,
    Left,
    Kicked,
}

impl MemberStatus {
    pub fn is_joined(self) -> bool {
        matches!(self, Self::Member | Self::Moderator | Self::Owner)
    }
}

/// Answers "is user X a member of channel Y".
pub trait MembershipOracle: Send + Sync {
    fn get_membership(&self, channel: &str, user_id: i64) -> Result<MemberStatus>;
}

/// Outcome of checking a single channel.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipCheck {
    Joined,
    NotJoined,
    OracleError(BotError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "channels", rename_all = "lowercase")]
pub enum GateDecision {
    Allowed,
    /// Channels still to join, in configured order.
    Blocked(Vec<String>),
}

#[derive(Clone)]
pub struct SubscriptionGate {
    admin: AdminConfig,
    oracle: Arc<dyn MembershipOracle>,
}

impl SubscriptionGate {
    pub fn new(admin: AdminConfig, oracle: Arc<dyn MembershipOracle>) -> Self {
        Self { admin, oracle }
    }

    pub fn check_channel(&self, channel: &str, user_id: i64) -> MembershipCheck {
        match self.oracle.get_membership(channel, user_id) {
            Ok(status) if status.is_joined() => MembershipCheck::Joined,
            Ok(_) => MembershipCheck::NotJoined,
            Err(e) => MembershipCheck::OracleError(e),
        }
    }

    /// Read-only; calling it again is a recheck.
    pub fn evaluate(&self, user_id: i64) -> Result<GateDecision> {
        let channels = self.admin.force_channels()?;
        if channels.is_empty() {
            return Ok(GateDecision::Allowed);
        }

        let mut not_joined = Vec::new();
        for channel in channels {
            match self.check_channel(&channel, user_id) {
                MembershipCheck::Joined => {}
                MembershipCheck::NotJoined => not_joined.push(channel),
                // Fail closed: an unverifiable channel counts as not joined.
                MembershipCheck::OracleError(e) => {
                    log::warn!(
                        "[gate] membership check for {} in {} failed: {}",
                        user_id,
                        channel,
                        e
                    );
                    not_joined.push(channel);
                }
            }
        }

        if not_joined.is_empty() {
            Ok(GateDecision::Allowed)
        } else {
            Ok(GateDecision::Blocked(not_joined))
        }
    }
}
