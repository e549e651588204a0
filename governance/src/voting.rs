//! Vote recording and tallying

use civitas_core::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub voter: Address,
    pub choice: VoteChoice,
    pub weight: u128,
    pub timestamp: u64,
}

/// Running totals for one proposal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalVotes {
    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
}

impl ProposalVotes {
    /// Votes that count toward quorum.
    pub fn quorum_votes(&self) -> u128 {
        self.for_votes.saturating_add(self.abstain_votes)
    }

    pub fn quorum_reached(&self, quorum: u128) -> bool {
        self.quorum_votes() >= quorum
    }

    pub fn vote_succeeded(&self) -> bool {
        self.for_votes > self.against_votes
    }

    pub fn total(&self) -> u128 {
        self.quorum_votes().saturating_add(self.against_votes)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VotingRecord {
    tally: ProposalVotes,
    votes: BTreeMap<Address, Vote>,
}

impl VotingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.votes.contains_key(voter)
    }

    /// Record a vote. Returns false if the voter already voted.
    pub fn add_vote(&mut self, vote: Vote) -> bool {
        if self.has_voted(&vote.voter) {
            return false;
        }
        match vote.choice {
            VoteChoice::For => self.tally.for_votes = self.tally.for_votes.saturating_add(vote.weight),
            VoteChoice::Against => {
                self.tally.against_votes = self.tally.against_votes.saturating_add(vote.weight)
            }
            VoteChoice::Abstain => {
                self.tally.abstain_votes = self.tally.abstain_votes.saturating_add(vote.weight)
            }
        }
        self.votes.insert(vote.voter, vote);
        true
    }

    pub fn tally(&self) -> ProposalVotes {
        self.tally
    }

    pub fn vote_of(&self, voter: &Address) -> Option<&Vote> {
        self.votes.get(voter)
    }

    pub fn voter_count(&self) -> usize {
        self.votes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(byte: u8, choice: VoteChoice, weight: u128) -> Vote {
        Vote {
            voter: Address::repeat_byte(byte),
            choice,
            weight,
            timestamp: 0,
        }
    }

    #[test]
    fn test_tally() {
        let mut record = VotingRecord::new();
        assert!(record.add_vote(vote(1, VoteChoice::For, 60)));
        assert!(record.add_vote(vote(2, VoteChoice::Against, 30)));
        assert!(record.add_vote(vote(3, VoteChoice::Abstain, 10)));

        let tally = record.tally();
        assert_eq!(tally.quorum_votes(), 70);
        assert_eq!(tally.total(), 100);
        assert!(tally.vote_succeeded());
        assert!(tally.quorum_reached(70));
        assert!(!tally.quorum_reached(71));
    }

    #[test]
    fn test_double_vote_ignored() {
        let mut record = VotingRecord::new();
        assert!(record.add_vote(vote(1, VoteChoice::For, 5)));
        assert!(!record.add_vote(vote(1, VoteChoice::Against, 5)));
        assert_eq!(record.tally().for_votes, 5);
        assert_eq!(record.tally().against_votes, 0);
        assert_eq!(record.voter_count(), 1);
    }

    #[test]
    fn test_tie_does_not_succeed() {
        let mut record = VotingRecord::new();
        record.add_vote(vote(1, VoteChoice::For, 5));
        record.add_vote(vote(2, VoteChoice::Against, 5));
        assert!(!record.tally().vote_succeeded());
    }
}
