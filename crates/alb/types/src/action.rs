//! Listener actions
//!
//! A listener carries exactly one default action. The variants are mutually
//! exclusive, so they are modelled as a sum type rather than a bag of
//! optional fields.

use crate::ids::TargetGroupId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application protocol spoken by a listener or target group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    /// Wire name, e.g. `HTTPS`
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
        }
    }

    /// Capitalized name used in logical ids, e.g. `Https`
    pub fn title(&self) -> &'static str {
        match self {
            Protocol::Http => "Http",
            Protocol::Https => "Https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redirect to the same host, path and query on another port/protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Redirect status, e.g. `HTTP_301`
    pub status_code: String,
    pub host: String,
    pub path: String,
    pub port: u16,
    pub query: String,
    pub protocol: Protocol,
}

/// Static response returned without contacting any backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedResponseConfig {
    pub status_code: u16,
    pub message_body: String,
}

/// Default action of a listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionSpec {
    /// Permanent redirect
    Redirect(RedirectConfig),

    /// Forward to a target group
    Forward {
        /// Target group receiving the traffic
        target_group: TargetGroupId,
    },

    /// Fixed response
    FixedResponse(FixedResponseConfig),
}

impl ActionSpec {
    /// Backend action type name
    pub fn kind(&self) -> &'static str {
        match self {
            ActionSpec::Redirect(_) => "redirect",
            ActionSpec::Forward { .. } => "forward",
            ActionSpec::FixedResponse(_) => "fixed-response",
        }
    }

    /// Target group this action forwards to, if any
    pub fn target_group(&self) -> Option<&TargetGroupId> {
        match self {
            ActionSpec::Forward { target_group } => Some(target_group),
            _ => None,
        }
    }
}
