//! LiveBoard - the latest proposal view as seen by this process.
//!
//! One subscription feeds a `watch` channel that HTTP handlers read and
//! WebSocket connections follow. The board never computes anything itself;
//! every state it publishes comes straight from a store snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use super::synchronizer::{ProposalListener, ProposalSynchronizer};
use crate::domain::proposal::{ProposalError, ProposalView};
use crate::ports::SubscriptionHandle;

/// What the board currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardState {
    /// Subscribed, waiting for the first snapshot.
    Connecting,
    /// Following the store.
    Live(ProposalView),
    /// The change stream failed; `last` is the view from before the failure.
    Stale {
        last: Option<ProposalView>,
        reason: String,
    },
}

impl BoardState {
    /// Most recent view, live or stale.
    pub fn view(&self) -> Option<&ProposalView> {
        match self {
            BoardState::Connecting => None,
            BoardState::Live(view) => Some(view),
            BoardState::Stale { last, .. } => last.as_ref(),
        }
    }

    pub fn has_proposal(&self) -> bool {
        self.view().is_some_and(ProposalView::has_proposal)
    }

    pub fn is_live(&self) -> bool {
        matches!(self, BoardState::Live(_))
    }

    /// Short lowercase label used on the wire.
    pub fn status(&self) -> &'static str {
        match self {
            BoardState::Connecting => "connecting",
            BoardState::Live(_) => "live",
            BoardState::Stale { .. } => "stale",
        }
    }
}

/// Process-wide board following the shared proposal.
pub struct LiveBoard {
    state: watch::Receiver<BoardState>,
    subscription: Mutex<Option<SubscriptionHandle>>,
}

impl LiveBoard {
    /// Subscribe to `synchronizer` and start following the proposal.
    ///
    /// # Errors
    ///
    /// - `StoreSubscription` if the store refuses the subscription
    pub async fn attach(synchronizer: &ProposalSynchronizer) -> Result<Self, ProposalError> {
        let (tx, rx) = watch::channel(BoardState::Connecting);
        let handle = synchronizer
            .subscribe(Arc::new(BoardListener { state: tx }))
            .await?;

        tracing::info!(path = %synchronizer.path(), "Live board attached");
        Ok(Self {
            state: rx,
            subscription: Mutex::new(Some(handle)),
        })
    }

    pub fn current(&self) -> BoardState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn watch(&self) -> watch::Receiver<BoardState> {
        self.state.clone()
    }

    /// Cancel the subscription. The board keeps its last state.
    ///
    /// Calling this more than once is a no-op.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.subscription.lock().await.take() {
            handle.unsubscribe().await;
            tracing::info!("Live board detached");
        }
    }
}

struct BoardListener {
    state: watch::Sender<BoardState>,
}

#[async_trait]
impl ProposalListener for BoardListener {
    async fn on_view(&self, view: ProposalView) {
        self.state.send_replace(BoardState::Live(view));
    }

    async fn on_error(&self, error: ProposalError) {
        let reason = error.message();
        self.state.send_modify(|state| {
            let last = state.view().cloned();
            *state = BoardState::Stale { last, reason };
        });
    }

    fn name(&self) -> &'static str {
        "LiveBoard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryDocumentStore;
    use crate::domain::foundation::StorePath;
    use crate::domain::proposal::ParticipantRoster;
    use std::time::Duration;

    fn synchronizer(store: &InMemoryDocumentStore) -> ProposalSynchronizer {
        ProposalSynchronizer::new(
            Arc::new(store.clone()),
            StorePath::parse("dynasty5/currentTrade").unwrap(),
            ParticipantRoster::default(),
        )
    }

    async fn wait_for<F>(board: &LiveBoard, predicate: F) -> BoardState
    where
        F: Fn(&BoardState) -> bool,
    {
        let mut rx = board.watch();
        let state = tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| predicate(s)))
            .await
            .expect("timed out waiting for board state")
            .expect("board channel closed")
            .clone();
        state
    }

    #[test]
    fn connecting_state_has_no_view() {
        let state = BoardState::Connecting;
        assert!(state.view().is_none());
        assert!(!state.has_proposal());
        assert_eq!(state.status(), "connecting");
    }

    #[test]
    fn stale_state_keeps_last_view() {
        let view = ProposalView::absent(&ParticipantRoster::default());
        let state = BoardState::Stale {
            last: Some(view.clone()),
            reason: "gone".to_string(),
        };
        assert_eq!(state.view(), Some(&view));
        assert!(!state.is_live());
        assert_eq!(state.status(), "stale");
    }

    #[tokio::test]
    async fn attach_goes_live_with_initial_snapshot() {
        let store = InMemoryDocumentStore::new();
        let board = LiveBoard::attach(&synchronizer(&store)).await.unwrap();

        let state = wait_for(&board, BoardState::is_live).await;

        assert!(!state.has_proposal());
        assert_eq!(state.view().unwrap().total, 5);
    }

    #[tokio::test]
    async fn board_follows_created_proposal() {
        let store = InMemoryDocumentStore::new();
        let sync = synchronizer(&store);
        let board = LiveBoard::attach(&sync).await.unwrap();
        wait_for(&board, BoardState::is_live).await;

        sync.create_proposal("WR A", "RB B").await.unwrap();

        let state = wait_for(&board, BoardState::has_proposal).await;
        let proposal = state.view().unwrap().proposal.clone().unwrap();
        assert_eq!(proposal.description_outbound(), Some("WR A"));
        assert!(board.current().has_proposal());
    }

    #[tokio::test]
    async fn store_failure_marks_board_stale() {
        let store = InMemoryDocumentStore::new();
        let sync = synchronizer(&store);
        sync.create_proposal("A", "B").await.unwrap();
        let board = LiveBoard::attach(&sync).await.unwrap();
        wait_for(&board, BoardState::has_proposal).await;

        drop(sync);
        drop(store);

        let state = wait_for(&board, |s| matches!(s, BoardState::Stale { .. })).await;
        assert!(state.has_proposal());
    }

    #[tokio::test]
    async fn shutdown_freezes_board() {
        let store = InMemoryDocumentStore::new();
        let sync = synchronizer(&store);
        let board = LiveBoard::attach(&sync).await.unwrap();
        wait_for(&board, BoardState::is_live).await;

        board.shutdown().await;
        board.shutdown().await;
        sync.create_proposal("A", "B").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!board.current().has_proposal());
        assert_eq!(store.subscriber_count(), 0);
    }
}
