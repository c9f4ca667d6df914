//! Principal ARN parsing and resolution

use crate::error::{AccessInsightError, AccessInsightResult};
use crate::types::{PrincipalInfo, PrincipalKind};

/// Resolve principal information from an ARN (supports IAM role/user and STS
/// assumed-role).
///
/// Returns a validation error for unsupported principal types:
/// - Root users
/// - Service-linked roles
/// - Federated users
/// - Invalid ARN formats
pub fn resolve_principal(principal_arn: &str) -> AccessInsightResult<PrincipalInfo> {
    // splitn(6) keeps colons inside the resource part intact.
    // ARN format: arn:partition:service:region:account:resource
    let parts: Vec<&str> = principal_arn.splitn(6, ':').collect();
    if parts.len() < 6 || parts[0] != "arn" {
        return Err(AccessInsightError::validation(format!(
            "'{principal_arn}' is not a principal ARN"
        )));
    }
    let service = parts[2];
    let resource = parts[5];
    match service {
        "iam" => resolve_iam_principal(principal_arn, resource),
        "sts" => resolve_sts_principal(principal_arn, resource),
        _ => Err(AccessInsightError::validation(format!(
            "'{principal_arn}': only IAM and STS principals are supported"
        ))),
    }
}

fn resolve_iam_principal(arn: &str, resource: &str) -> AccessInsightResult<PrincipalInfo> {
    if resource == "root" {
        return Err(AccessInsightError::validation(
            "the account root user cannot be simulated",
        ));
    }

    let resource_parts: Vec<&str> = resource.split('/').collect();
    if resource_parts.len() < 2 {
        return Err(AccessInsightError::validation(format!(
            "'{arn}' is missing a resource type or name"
        )));
    }
    match resource_parts[0] {
        "role" => {
            let role_path = resource_parts[1..].join("/");
            if role_path.starts_with("aws-service-role/") {
                return Err(AccessInsightError::validation(
                    "service-linked roles are managed by AWS",
                ));
            }
            Ok(PrincipalInfo::new(PrincipalKind::Role, &role_path))
        }
        "user" => {
            let user_path = resource_parts[1..].join("/");
            Ok(PrincipalInfo::new(PrincipalKind::User, &user_path))
        }
        other => Err(AccessInsightError::validation(format!(
            "unsupported IAM resource type '{other}': only 'role' and 'user' are supported"
        ))),
    }
}

fn resolve_sts_principal(arn: &str, resource: &str) -> AccessInsightResult<PrincipalInfo> {
    let resource_parts: Vec<&str> = resource.split('/').collect();
    if resource_parts.len() < 3 {
        return Err(AccessInsightError::validation(format!(
            "'{arn}' is not a recognized STS principal ARN"
        )));
    }
    match resource_parts[0] {
        "assumed-role" => {
            let role_name = resource_parts[1];
            if role_name.starts_with("aws-service-role") {
                return Err(AccessInsightError::validation(
                    "service-linked roles are managed by AWS",
                ));
            }
            Ok(PrincipalInfo::new(PrincipalKind::Role, role_name))
        }
        "federated-user" => Err(AccessInsightError::validation(
            "federated users cannot be simulated",
        )),
        other => Err(AccessInsightError::validation(format!(
            "unsupported STS resource type '{other}': only 'assumed-role' is supported"
        ))),
    }
}

/// Extract the 12-digit account ID from an ARN (field 5 in colon-delimited
/// format).
pub fn extract_account_id(arn: &str) -> Option<String> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() >= 6 {
        let account_id = parts[4];
        if account_id.len() == 12 && account_id.chars().all(|c| c.is_ascii_digit()) {
            return Some(account_id.to_string());
        }
    }
    None
}

/// Map an identity ARN onto the IAM ARN the policy simulator expects.
/// IAM user and role ARNs pass through; an STS assumed-role ARN is rewritten
/// to its underlying IAM role ARN.
pub fn simulation_arn(identity_arn: &str) -> AccessInsightResult<String> {
    let info = resolve_principal(identity_arn)?;
    if identity_arn.starts_with("arn:aws:iam::") {
        return Ok(identity_arn.to_string());
    }
    let account_id = extract_account_id(identity_arn).ok_or_else(|| {
        AccessInsightError::validation(format!(
            "'{identity_arn}' does not carry a 12-digit account id"
        ))
    })?;
    match info.kind {
        PrincipalKind::Role => Ok(format!("arn:aws:iam::{account_id}:role/{}", info.name)),
        PrincipalKind::User => Ok(format!("arn:aws:iam::{account_id}:user/{}", info.name)),
    }
}
