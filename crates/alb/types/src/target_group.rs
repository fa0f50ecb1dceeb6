//! Target group templates

use crate::action::Protocol;
use crate::ids::VpcId;
use serde::{Deserialize, Serialize};

/// Kind of backend registered in a target group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Ip,
    Instance,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Ip => "ip",
            TargetType::Instance => "instance",
        }
    }
}

/// Template for a health-checked pool of backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupSpec {
    /// Name prefix; lanes append their suffix to it
    pub name: String,

    /// Network the targets live in
    pub vpc: VpcId,

    /// Port the load balancer uses to reach targets
    pub port: u16,

    /// Protocol the load balancer uses to reach targets
    pub protocol: Protocol,

    /// Target type
    pub target_type: TargetType,

    /// HTTP codes treated as healthy; empty means `200`
    pub healthy_http_codes: Vec<u16>,

    /// Health check path; unset or empty means `/`
    pub health_check_path: Option<String>,
}

impl TargetGroupSpec {
    pub fn new(name: impl Into<String>, vpc: VpcId) -> Self {
        Self {
            name: name.into(),
            vpc,
            port: 80,
            protocol: Protocol::Http,
            target_type: TargetType::Ip,
            healthy_http_codes: Vec::new(),
            health_check_path: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = target_type;
        self
    }

    pub fn with_healthy_http_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.healthy_http_codes = codes.into_iter().collect();
        self
    }

    pub fn with_health_check_path(mut self, path: impl Into<String>) -> Self {
        self.health_check_path = Some(path.into());
        self
    }

    /// Copy of this template whose name carries `suffix`
    pub fn renamed(&self, suffix: &str) -> Self {
        let mut copy = self.clone();
        copy.name = format!("{}{}", self.name, suffix);
        copy
    }
}
