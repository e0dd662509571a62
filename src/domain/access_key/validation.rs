//! Access key validation utilities

use super::entity::{AccessKeyDraft, AccessKeyPermission};
use crate::domain::actions;
use crate::domain::DomainError;

/// Validate the label of a creation request: required and non-empty
pub fn validate_label(label: Option<&str>) -> Result<(), DomainError> {
    match label {
        Some(l) if !l.is_empty() => Ok(()),
        _ => Err(DomainError::validation("Access key label is required")),
    }
}

/// Validate every action name carried by the given permission rules.
///
/// A rule with no action set (or an empty one) is a wildcard and passes;
/// any unknown action name fails the whole set.
pub fn validate_actions(permissions: &[AccessKeyPermission]) -> Result<(), DomainError> {
    for permission in permissions {
        if let Some(actions) = &permission.actions {
            if let Some(unknown) = actions::first_unknown_action(actions.iter().map(String::as_str))
            {
                return Err(DomainError::validation(format!(
                    "Unknown action: '{unknown}'"
                )));
            }
        }
    }
    Ok(())
}

/// Validate a replacement permission set: a key must keep at least one rule
pub fn validate_permission_set(permissions: &[AccessKeyPermission]) -> Result<(), DomainError> {
    if permissions.is_empty() {
        return Err(DomainError::validation(
            "Access key must have at least one permission",
        ));
    }
    validate_actions(permissions)
}

/// Validate a creation draft before any state is touched
pub fn validate_draft(draft: &AccessKeyDraft) -> Result<(), DomainError> {
    validate_label(draft.label.as_deref())?;
    if draft.id.is_some() {
        return Err(DomainError::validation(
            "Access key id must not be supplied on creation",
        ));
    }
    validate_permission_set(&draft.permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access_key::AccessKeyPermission;

    fn one_rule() -> Vec<AccessKeyPermission> {
        vec![AccessKeyPermission::new()]
    }

    #[test]
    fn test_label_required() {
        assert!(validate_label(Some("ci key")).is_ok());
        assert!(validate_label(Some("")).is_err());
        assert!(validate_label(None).is_err());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let rules = vec![AccessKeyPermission::new().with_actions(["GetDevice", "Bogus"])];
        let err = validate_actions(&rules).unwrap_err();
        assert!(err.to_string().contains("Bogus"));
    }

    #[test]
    fn test_wildcard_actions_pass() {
        // No action set at all
        assert!(validate_actions(&one_rule()).is_ok());
        // Present but empty is also fine at validation time
        let empty = vec![AccessKeyPermission::new().with_actions(Vec::<String>::new())];
        assert!(validate_actions(&empty).is_ok());
    }

    #[test]
    fn test_empty_permission_set_rejected() {
        assert!(validate_permission_set(&[]).is_err());
        assert!(validate_permission_set(&one_rule()).is_ok());
    }

    #[test]
    fn test_draft_with_id_rejected() {
        let mut draft = AccessKeyDraft::new("label").with_permission(AccessKeyPermission::new());
        assert!(validate_draft(&draft).is_ok());

        draft.id = Some(42);
        assert!(validate_draft(&draft).is_err());
    }

    #[test]
    fn test_draft_without_permissions_rejected() {
        let draft = AccessKeyDraft::new("label");
        assert!(validate_draft(&draft).is_err());
    }
}
