use std::collections::BTreeMap;
use crate::models::BallotRequest;
use crate::roster::Roster;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please pick who you are before voting")]
    EmptyVoter,
    #[error("{0} is not on the roster")]
    UnknownVoter(String),
    #[error("Please nominate someone in at least one category")]
    EmptyBallot,
    #[error("Empty category name")]
    EmptyCategory,
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Category listed twice: {0}")]
    DuplicateCategory(String),
    #[error("No nominee given for {0}")]
    EmptyCandidate(String),
    #[error("{candidate} is not on the roster (nominated for {category})")]
    UnknownCandidate { category: String, candidate: String },
}

/// Checks a ballot against the roster and returns it with every name trimmed.
pub fn validate_ballot(ballot: &BallotRequest, roster: &Roster) -> Result<BallotRequest, ValidationError> {
    let voter = ballot.voter.trim();
    if voter.is_empty() { return Err(ValidationError::EmptyVoter); }
    if !roster.is_member(voter) { return Err(ValidationError::UnknownVoter(voter.to_string())); }
    if ballot.nominations.is_empty() { return Err(ValidationError::EmptyBallot); }

    let mut nominations = BTreeMap::new();
    for (category, candidate) in &ballot.nominations {
        let (category, candidate) = (category.trim(), candidate.trim());
        if category.is_empty() { return Err(ValidationError::EmptyCategory); }
        if !roster.has_category(category) {
            return Err(ValidationError::UnknownCategory(category.to_string()));
        }
        if candidate.is_empty() { return Err(ValidationError::EmptyCandidate(category.to_string())); }
        if !roster.is_member(candidate) {
            return Err(ValidationError::UnknownCandidate {
                category: category.to_string(),
                candidate: candidate.to_string(),
            });
        }
        if nominations.insert(category.to_string(), candidate.to_string()).is_some() {
            return Err(ValidationError::DuplicateCategory(category.to_string()));
        }
    }

    Ok(BallotRequest {
        voter: voter.to_string(),
        nominations,
    })
}
