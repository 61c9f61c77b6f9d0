//! Advisory "who is editing" indicator.
//!
//! There is no lock: every claim overwrites the previous one, and the
//! arbitrator only mirrors the most recent claimant for display.

use crate::protocol::EditorClaim;

#[derive(Debug, Default)]
pub struct EditorArbitrator {
    claim: Option<EditorClaim>,
}

impl EditorArbitrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&EditorClaim> {
        self.claim.as_ref()
    }

    /// Overwrite the claim unconditionally. Returns whether it changed.
    pub fn claim(
        &mut self,
        user_id: impl Into<String>,
        username: impl Into<String>,
        component_id: Option<String>,
    ) -> bool {
        self.set(Some(EditorClaim {
            user_id: user_id.into(),
            username: username.into(),
            component_id,
        }))
    }

    /// Replace the claim with whatever the hub reported (possibly none).
    pub fn set(&mut self, claim: Option<EditorClaim>) -> bool {
        if self.claim == claim {
            return false;
        }
        self.claim = claim;
        true
    }

    pub fn clear(&mut self) -> bool {
        self.claim.take().is_some()
    }

    /// Clear only if `user_id` holds the claim.
    pub fn clear_if_user(&mut self, user_id: &str) -> bool {
        if self.is_held_by(user_id) {
            self.claim = None;
            true
        } else {
            false
        }
    }

    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.claim.as_ref().is_some_and(|c| c.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_overwrites_without_negotiation() {
        let mut editor = EditorArbitrator::new();
        assert!(editor.claim("u1", "ana", Some("c1".into())));
        assert!(editor.claim("u2", "bob", None));

        let current = editor.current().unwrap();
        assert_eq!(current.user_id, "u2");
        assert_eq!(current.component_id, None);
    }

    #[test]
    fn identical_claim_reports_no_change() {
        let mut editor = EditorArbitrator::new();
        assert!(editor.claim("u1", "ana", Some("c1".into())));
        assert!(!editor.claim("u1", "ana", Some("c1".into())));
        assert!(editor.claim("u1", "ana", Some("c2".into())));
    }

    #[test]
    fn clear_if_user_only_matches_holder() {
        let mut editor = EditorArbitrator::new();
        editor.claim("u1", "ana", None);

        assert!(!editor.clear_if_user("u2"));
        assert!(editor.is_held_by("u1"));

        assert!(editor.clear_if_user("u1"));
        assert!(editor.current().is_none());
        assert!(!editor.clear_if_user("u1"));
    }

    #[test]
    fn set_none_clears() {
        let mut editor = EditorArbitrator::new();
        editor.claim("u1", "ana", None);
        assert!(editor.set(None));
        assert!(!editor.clear());
    }
}
