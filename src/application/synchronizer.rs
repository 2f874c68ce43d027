//! ProposalSynchronizer - keeps every client in step with the shared proposal.
//!
//! The store holds the only authoritative copy. Commands become store writes;
//! store snapshots become freshly derived [`ProposalView`]s. Nothing is cached
//! here, so a client's view is always whatever the store last pushed.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{StorePath, Timestamp};
use crate::domain::proposal::{
    ParticipantId, ParticipantRoster, Proposal, ProposalError, ProposalView, APPROVALS_FIELD,
};
use crate::ports::{DocumentStore, SnapshotListener, StoreError, SubscriptionHandle};

/// Receives derived views of the shared proposal.
///
/// Calls for one subscription never overlap.
#[async_trait]
pub trait ProposalListener: Send + Sync {
    /// Called with the initial view and after every change.
    async fn on_view(&self, view: ProposalView);

    /// Called when the change stream fails. No reconnect is attempted.
    async fn on_error(&self, error: ProposalError);

    /// Listener name for logging.
    fn name(&self) -> &'static str;
}

/// Synchronizer for the single shared proposal.
pub struct ProposalSynchronizer {
    store: Arc<dyn DocumentStore>,
    path: StorePath,
    roster: ParticipantRoster,
}

impl ProposalSynchronizer {
    pub fn new(store: Arc<dyn DocumentStore>, path: StorePath, roster: ParticipantRoster) -> Self {
        Self {
            store,
            path,
            roster,
        }
    }

    pub fn roster(&self) -> &ParticipantRoster {
        &self.roster
    }

    /// Store location of the proposal document.
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Resolve a participant name against the roster.
    pub fn participant(&self, name: &str) -> Result<&ParticipantId, ProposalError> {
        self.roster
            .get(name)
            .ok_or_else(|| ProposalError::unknown_participant(name))
    }

    /// Replace whatever is stored with a new proposal, all approvals `false`.
    ///
    /// Last write wins: a concurrent create from another client may silently
    /// replace this one.
    ///
    /// # Errors
    ///
    /// - `Validation` if either description is blank; nothing is written
    /// - `StoreWrite` if the store does not acknowledge the write
    pub async fn create_proposal(
        &self,
        outbound: &str,
        inbound: &str,
    ) -> Result<Proposal, ProposalError> {
        let proposal = Proposal::new(outbound, inbound, &self.roster, Timestamp::now())?;

        self.store
            .write(&self.path, proposal.to_document())
            .await
            .map_err(|e| ProposalError::store_write(e.to_string()))?;

        tracing::info!(path = %self.path, "Trade proposal created");
        Ok(proposal)
    }

    /// Set one participant's approval flag, leaving every other field alone.
    ///
    /// The update is issued even if no proposal is stored; the resulting
    /// document then holds approvals only and decodes as incomplete.
    ///
    /// # Errors
    ///
    /// - `UnknownParticipant` if the id belongs to a different roster
    /// - `StoreWrite` if the store does not acknowledge the update
    pub async fn set_approval(
        &self,
        participant: &ParticipantId,
        approved: bool,
    ) -> Result<(), ProposalError> {
        if !self.roster.contains(participant) {
            return Err(ProposalError::unknown_participant(participant.as_str()));
        }

        let field = StorePath::parse(APPROVALS_FIELD)
            .and_then(|approvals| approvals.child(participant.as_str()))?;

        self.store
            .update_field(&self.path, &field, Value::Bool(approved))
            .await
            .map_err(|e| ProposalError::store_write(e.to_string()))?;

        tracing::info!(participant = %participant, approved, "Approval updated");
        Ok(())
    }

    /// Read the proposal straight from the store.
    ///
    /// Unlike a subscription's latest view this never lags behind the store.
    ///
    /// # Errors
    ///
    /// - `StoreRead` if the store cannot be reached
    pub async fn fetch_view(&self) -> Result<ProposalView, ProposalError> {
        let snapshot = self
            .store
            .read(&self.path)
            .await
            .map_err(|e| ProposalError::store_read(e.to_string()))?;
        Ok(ProposalView::from_snapshot(snapshot.as_ref(), &self.roster))
    }

    /// Deliver the current view to `listener`, then a new view on every change.
    ///
    /// # Errors
    ///
    /// - `StoreSubscription` if the store refuses the subscription
    pub async fn subscribe(
        &self,
        listener: Arc<dyn ProposalListener>,
    ) -> Result<SubscriptionHandle, ProposalError> {
        let name = listener.name();
        let forwarder = Arc::new(ViewForwarder {
            roster: self.roster.clone(),
            listener,
        });

        let handle = self
            .store
            .subscribe(&self.path, forwarder)
            .await
            .map_err(|e| ProposalError::store_subscription(e.to_string()))?;

        tracing::debug!(
            listener = name,
            subscription_id = %handle.id(),
            "Subscribed to proposal"
        );
        Ok(handle)
    }
}

/// Turns raw store snapshots into proposal views.
struct ViewForwarder {
    roster: ParticipantRoster,
    listener: Arc<dyn ProposalListener>,
}

#[async_trait]
impl SnapshotListener for ViewForwarder {
    async fn on_snapshot(&self, snapshot: Option<Value>) {
        let view = ProposalView::from_snapshot(snapshot.as_ref(), &self.roster);
        tracing::debug!(
            listener = self.listener.name(),
            present = view.has_proposal(),
            approved = view.approved_count,
            total = view.total,
            ready = view.is_ready,
            "Proposal snapshot"
        );
        self.listener.on_view(view).await;
    }

    async fn on_error(&self, error: StoreError) {
        tracing::warn!(
            listener = self.listener.name(),
            "Proposal subscription failed: {}",
            error
        );
        self.listener
            .on_error(ProposalError::store_subscription(error.to_string()))
            .await;
    }

    fn name(&self) -> &'static str {
        "ViewForwarder"
    }
}
