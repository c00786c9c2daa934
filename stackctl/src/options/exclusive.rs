//! Mutually exclusive option groups

use crate::errors::StackError;

/// Option groups of which at most one member may be supplied
pub const EXCLUSIVE_GROUPS: &[&[&str]] = &[
    &["template_body", "template_url"],
    &["disable_rollback", "on_failure"],
    &["stack_policy_body", "stack_policy_url"],
];

/// Reject the option set if any group has more than one member present.
///
/// Only presence is checked, never values. Every colliding group is
/// reported in a single error.
pub fn validate_exclusive(present: &[&str], groups: &[&[&str]]) -> Result<(), StackError> {
    let collisions: Vec<String> = groups
        .iter()
        .filter_map(|group| {
            let supplied: Vec<&str> = group
                .iter()
                .copied()
                .filter(|name| present.contains(name))
                .collect();
            (supplied.len() > 1).then(|| supplied.join(", "))
        })
        .collect();

    if collisions.is_empty() {
        return Ok(());
    }

    Err(StackError::ConfigError(format!(
        "mutually exclusive options supplied together: {}",
        collisions.join("; ")
    )))
}
