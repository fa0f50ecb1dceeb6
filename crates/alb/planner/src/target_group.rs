//! Target group planning

use crate::context::PlanningContext;
use crate::error::Result;
use alb_types::{TargetGroupDescriptor, TargetGroupResource, TargetGroupSpec};
use tracing::{info, instrument};

/// Healthy code used when a template lists none
pub const DEFAULT_HEALTHY_CODE: u16 = 200;

/// Health check path used when a template sets none (or an empty one)
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/";

/// Apply defaults and normalize a template into a descriptor
pub fn describe(spec: &TargetGroupSpec) -> TargetGroupDescriptor {
    let health_matcher = if spec.healthy_http_codes.is_empty() {
        DEFAULT_HEALTHY_CODE.to_string()
    } else {
        spec.healthy_http_codes
            .iter()
            .map(|code| code.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };

    let health_check_path = match spec.health_check_path.as_deref() {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => DEFAULT_HEALTH_CHECK_PATH.to_string(),
    };

    TargetGroupDescriptor {
        logical_id: format!("{}TargetGroup", spec.name),
        name: spec.name.clone(),
        port: spec.port,
        protocol: spec.protocol,
        vpc: spec.vpc.clone(),
        target_type: spec.target_type,
        health_check_path,
        health_matcher,
    }
}

/// Create a target group through the context's sink and record it there
#[instrument(skip(ctx, spec), fields(target_group = %spec.name))]
pub fn plan_target_group(
    ctx: &mut PlanningContext<'_>,
    spec: &TargetGroupSpec,
) -> Result<TargetGroupResource> {
    ctx.ensure_unlocked()?;

    let descriptor = describe(spec);
    let id = ctx.sink().create_target_group(&descriptor)?;
    let resource = TargetGroupResource { id, descriptor };
    ctx.record_target_group(resource.clone());

    let descriptor = &resource.descriptor;
    info!(
        target_group_id = %resource.id,
        target_type = descriptor.target_type.as_str(),
        port = descriptor.port,
        health_check_path = %descriptor.health_check_path,
        health_matcher = %descriptor.health_matcher,
        "Target group planned"
    );

    Ok(resource)
}
