//! Derived view of a proposal snapshot.

use serde_json::Value;

use super::aggregate::Proposal;
use super::participant::ParticipantRoster;

/// Everything a client renders for one snapshot.
///
/// Always recomputed in full from the latest snapshot; there is no
/// incremental counter to drift out of sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalView {
    /// `None` when the store holds no proposal.
    pub proposal: Option<Proposal>,
    /// Participants whose flag is `true`.
    pub approved_count: usize,
    /// Roster size.
    pub total: usize,
    /// Every participant has approved.
    pub is_ready: bool,
}

impl ProposalView {
    /// View for a store location with no document.
    pub fn absent(roster: &ParticipantRoster) -> Self {
        Self::derive(None, roster)
    }

    /// Derives counts for a decoded proposal.
    pub fn derive(proposal: Option<Proposal>, roster: &ParticipantRoster) -> Self {
        let total = roster.len();
        let approved_count = proposal
            .as_ref()
            .map(|p| p.approvals().iter().filter(|a| a.approved).count())
            .unwrap_or(0);

        Self {
            is_ready: proposal.is_some() && approved_count == total,
            proposal,
            approved_count,
            total,
        }
    }

    /// Decodes a raw store snapshot and derives its view.
    pub fn from_snapshot(snapshot: Option<&Value>, roster: &ParticipantRoster) -> Self {
        let proposal = snapshot.and_then(|document| Proposal::from_document(document, roster));
        Self::derive(proposal, roster)
    }

    pub fn has_proposal(&self) -> bool {
        self.proposal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roster() -> ParticipantRoster {
        ParticipantRoster::default()
    }

    fn document(approvals: Value) -> Value {
        json!({
            "weSend": "2025 1st + WR A",
            "weReceive": "2026 2nd + RB B",
            "approvals": approvals,
            "createdAt": 1_760_000_000_000_i64
        })
    }

    #[test]
    fn absent_snapshot_has_no_approvals_and_is_not_ready() {
        let view = ProposalView::from_snapshot(None, &roster());
        assert!(!view.has_proposal());
        assert_eq!(view.approved_count, 0);
        assert_eq!(view.total, 5);
        assert!(!view.is_ready);
        assert_eq!(view, ProposalView::absent(&roster()));
    }

    #[test]
    fn null_snapshot_is_absent() {
        let view = ProposalView::from_snapshot(Some(&Value::Null), &roster());
        assert!(!view.has_proposal());
    }

    #[test]
    fn counts_true_flags_only() {
        let doc = document(json!({
            "JCort": true, "Troy": true, "Tristan": false, "Charmin": true, "Kade": false
        }));
        let view = ProposalView::from_snapshot(Some(&doc), &roster());
        assert_eq!(view.approved_count, 3);
        assert!(!view.is_ready);
    }

    #[test]
    fn ready_when_every_participant_approved() {
        let doc = document(json!({
            "JCort": true, "Troy": true, "Tristan": true, "Charmin": true, "Kade": true
        }));
        let view = ProposalView::from_snapshot(Some(&doc), &roster());
        assert_eq!(view.approved_count, 5);
        assert!(view.is_ready);
    }

    #[test]
    fn missing_key_blocks_readiness() {
        let doc = document(json!({
            "JCort": true, "Troy": true, "Tristan": true, "Charmin": true
        }));
        let view = ProposalView::from_snapshot(Some(&doc), &roster());
        assert_eq!(view.approved_count, 4);
        assert!(!view.is_ready);
    }

    #[test]
    fn extra_keys_do_not_count() {
        let doc = document(json!({
            "JCort": true, "Troy": true, "Tristan": true, "Charmin": true, "Mallory": true
        }));
        let view = ProposalView::from_snapshot(Some(&doc), &roster());
        assert_eq!(view.approved_count, 4);
        assert!(!view.is_ready);
    }
}
