use shared::{validate_ballot, BallotRequest, BallotResponse, Roster, ValidationError, VoteMetadata};
use tracing::info;

use crate::store::{BallotOutcome, StoreError, VoteStore};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0} has already voted")]
    AlreadyVoted(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct BallotProcessor;

impl BallotProcessor {
    /// Validates a ballot against the roster and records one vote per
    /// nominated category. A voter with any vote on the ledger is refused.
    pub fn submit(
        store: &VoteStore,
        roster: &Roster,
        ballot: &BallotRequest,
        metadata: Option<VoteMetadata>,
    ) -> Result<BallotResponse, SubmitError> {
        let ballot = validate_ballot(ballot, roster)?;

        match store.record_ballot(&ballot.voter, &ballot.nominations, metadata)? {
            BallotOutcome::AlreadyVoted => Err(SubmitError::AlreadyVoted(ballot.voter)),
            BallotOutcome::Recorded { votes, cast_at } => {
                info!("🗳️ {} cast {} nominations", ballot.voter, votes);
                Ok(BallotResponse {
                    voter: ballot.voter,
                    recorded: votes,
                    cast_at,
                })
            }
        }
    }
}
