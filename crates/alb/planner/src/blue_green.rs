//! Blue/green lane planning
//!
//! Turns one listener template and one target group template into two
//! symmetric, independently addressable lanes. Each lane gets its own
//! target group, its own allocator-issued port, and a listener forwarding
//! to its own target group. Which lane is live is decided elsewhere; this
//! module only guarantees the two lanes never share a port or a name.

use crate::actions::forward_action;
use crate::config::{LaneSuffixes, PlannerConfig};
use crate::context::PlanningContext;
use crate::error::{PlanError, Result};
use crate::listener::plan_listener;
use crate::ports::PortAllocator;
use crate::target_group::plan_target_group;
use alb_types::{Lane, ListenerResource, ListenerSpec, TargetGroupResource, TargetGroupSpec};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const OPERATION: &str = "create_blue_green";

/// Resources realized for one lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneResources {
    pub lane: Lane,
    pub target_group: TargetGroupResource,
    pub listener: ListenerResource,
}

/// Both lanes of one blue/green build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueGreenPair {
    pub blue: LaneResources,
    pub green: LaneResources,
}

impl BlueGreenPair {
    pub fn lane(&self, lane: Lane) -> &LaneResources {
        match lane {
            Lane::Blue => &self.blue,
            Lane::Green => &self.green,
        }
    }
}

/// Per-lane templates, after clone-and-rename
#[derive(Debug, Clone, PartialEq)]
pub struct LaneTemplates {
    pub lane: Lane,
    pub listener: ListenerSpec,
    pub target_group: TargetGroupSpec,
}

/// Plans blue/green lane pairs.
///
/// Owns the port allocator for its planning session, so every pair built by
/// the same orchestrator draws from one pool and ports are never reused.
#[derive(Debug, Clone)]
pub struct BlueGreenOrchestrator {
    ports: PortAllocator,
    suffixes: LaneSuffixes,
}

impl BlueGreenOrchestrator {
    pub fn new(ports: PortAllocator, suffixes: LaneSuffixes) -> Self {
        Self { ports, suffixes }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(
            PortAllocator::new(config.ports.range()),
            config.lanes.clone(),
        )
    }

    pub fn suffix(&self, lane: Lane) -> &str {
        match lane {
            Lane::Blue => &self.suffixes.blue,
            Lane::Green => &self.suffixes.green,
        }
    }

    /// Ports left in this orchestrator's pool
    pub fn remaining_ports(&self) -> usize {
        self.ports.remaining()
    }

    /// Clone both templates once per lane, suffixing their names
    pub fn lane_templates(
        &self,
        listener_template: &ListenerSpec,
        target_group_template: &TargetGroupSpec,
    ) -> [LaneTemplates; 2] {
        Lane::ALL.map(|lane| LaneTemplates {
            lane,
            listener: listener_template.renamed(self.suffix(lane)),
            target_group: target_group_template.renamed(self.suffix(lane)),
        })
    }

    /// Build both lanes.
    ///
    /// The listener template must leave port and action unset: both are
    /// lane-specific and assigned here. Target groups are created before
    /// the listeners that forward to them; within each step blue goes
    /// first. Any failure aborts the whole operation. Resources the sink
    /// already created stay recorded on the context; compensating for them
    /// is the sink's responsibility. A locked boundary fails before any
    /// resource is created or port drawn.
    #[instrument(
        skip(self, ctx, listener_template, target_group_template),
        fields(listener = %listener_template.name, target_group = %target_group_template.name)
    )]
    pub fn create_blue_green(
        &mut self,
        ctx: &mut PlanningContext<'_>,
        listener_template: &ListenerSpec,
        target_group_template: &TargetGroupSpec,
    ) -> Result<BlueGreenPair> {
        ctx.ensure_unlocked()?;
        if let Some(port) = listener_template.port {
            return Err(PlanError::precondition(
                OPERATION,
                format!(
                    "listener template {} already has port {}",
                    listener_template.name, port
                ),
            ));
        }
        if let Some(action) = &listener_template.action {
            return Err(PlanError::precondition(
                OPERATION,
                format!(
                    "listener template {} already has a {} action",
                    listener_template.name,
                    action.kind()
                ),
            ));
        }

        info!(
            blue_suffix = %self.suffixes.blue,
            green_suffix = %self.suffixes.green,
            ports_remaining = self.ports.remaining(),
            "Starting blue/green lane planning"
        );

        // Phase 1: Per-lane copies of both templates
        let [mut blue, mut green] = self.lane_templates(listener_template, target_group_template);

        // Phase 2: Target groups first, the forward actions reference them
        let blue_tg = plan_target_group(ctx, &blue.target_group)?;
        let green_tg = plan_target_group(ctx, &green.target_group)?;

        // Phase 3: Wire each listener to its own lane's target group
        blue.listener.action = Some(forward_action(&blue_tg.id));
        green.listener.action = Some(forward_action(&green_tg.id));

        // Phase 4: Distinct ports from the pool
        blue.listener.port = Some(self.ports.allocate()?);
        green.listener.port = Some(self.ports.allocate()?);

        // Phase 5: Listeners, blue then green
        let blue_listener = plan_listener(ctx, &blue.listener)?;
        let green_listener = plan_listener(ctx, &green.listener)?;

        info!(
            blue_port = blue_listener.port(),
            green_port = green_listener.port(),
            blue_target_group = %blue_tg.descriptor.name,
            green_target_group = %green_tg.descriptor.name,
            "Blue/green lanes planned"
        );

        Ok(BlueGreenPair {
            blue: LaneResources {
                lane: Lane::Blue,
                target_group: blue_tg,
                listener: blue_listener,
            },
            green: LaneResources {
                lane: Lane::Green,
                target_group: green_tg,
                listener: green_listener,
            },
        })
    }
}

impl Default for BlueGreenOrchestrator {
    fn default() -> Self {
        Self::new(PortAllocator::default(), LaneSuffixes::default())
    }
}
