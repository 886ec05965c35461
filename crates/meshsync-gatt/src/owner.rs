//! Selective merge of owner identity updates.
//!
//! The phone may send a partial identity: empty fields mean "no change", so a
//! locally pinned id survives a remote update that omits it. The canonical
//! record is only mutated through this merge, never overwritten wholesale.

use meshsync_proto::User;

/// Merge `staged` into `canonical` field by field.
///
/// Non-empty staged fields overwrite the canonical value when they differ
/// byte-for-byte; empty staged fields leave the canonical value untouched.
/// Returns true if anything changed, which is the caller's cue to broadcast
/// the new identity and persist it. A write that changes nothing must produce
/// zero downstream side effects.
pub fn merge_owner(canonical: &mut User, staged: &User) -> bool {
    let mut changed = false;

    if !staged.long_name.is_empty() && staged.long_name != canonical.long_name {
        canonical.long_name = staged.long_name.clone();
        changed = true;
    }
    if !staged.short_name.is_empty() && staged.short_name != canonical.short_name {
        canonical.short_name = staged.short_name.clone();
        changed = true;
    }
    if !staged.id.is_empty() && staged.id != canonical.id {
        canonical.id = staged.id.clone();
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> User {
        User {
            id: "ABC".to_string(),
            long_name: "Old Long".to_string(),
            short_name: "OL".to_string(),
        }
    }

    #[test]
    fn empty_fields_preserve_canonical() {
        let mut owner = canonical();
        let staged = User {
            id: String::new(),
            long_name: "X".to_string(),
            short_name: String::new(),
        };
        assert!(merge_owner(&mut owner, &staged));
        assert_eq!(owner.id, "ABC");
        assert_eq!(owner.long_name, "X");
        assert_eq!(owner.short_name, "OL");
    }

    #[test]
    fn identical_values_report_no_change() {
        let mut owner = canonical();
        let staged = owner.clone();
        assert!(!merge_owner(&mut owner, &staged));
        assert_eq!(owner, canonical());
    }

    #[test]
    fn all_empty_reports_no_change() {
        let mut owner = canonical();
        assert!(!merge_owner(&mut owner, &User::default()));
        assert_eq!(owner, canonical());
    }

    #[test]
    fn changed_long_name_reports_change_once() {
        let mut owner = canonical();
        let staged = User {
            id: String::new(),
            long_name: "New Long".to_string(),
            short_name: String::new(),
        };
        assert!(merge_owner(&mut owner, &staged));
        // Re-applying the same staged value is now a no-op.
        assert!(!merge_owner(&mut owner, &staged));
    }
}
