//! The serialised entry point tying ownership, contests and the audit log
//! together.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    access::AccessRegistry,
    audit::{AuditDump, AuditLog, AuditRecord, AuditSink, ContestEvent, MemorySink},
    command::{Action, Command, CommandOutcome},
    common::{ContestId, ContestPolicy, OptionId, Principal, Timestamp},
    contest::{ContestStore, NewContest},
    tally::{self, Winner},
    visibility,
};

/// All contest state, plus the log it was built from.
///
/// Commands are executed one at a time and either commit completely (audit
/// record persisted, state updated, subscribers notified) or have no effect.
pub struct Ledger {
    genesis_owner: Principal,
    access: AccessRegistry,
    contests: ContestStore,
    audit: AuditLog,
}

impl Ledger {
    /// Bootstrap an empty ledger owned by `owner`.
    pub fn new(owner: Principal, policy: ContestPolicy, sink: Box<dyn AuditSink>) -> Result<Self> {
        Ok(Self {
            genesis_owner: owner.clone(),
            access: AccessRegistry::new(owner)?,
            contests: ContestStore::new(policy),
            audit: AuditLog::new(sink),
        })
    }

    /// Rebuild a ledger from its audit log.
    ///
    /// The chain must be intact, and every record must be reproduced exactly
    /// by re-executing it as a command against the records before it.
    /// Further records go to `sink`.
    pub fn replay(
        genesis_owner: Principal,
        policy: ContestPolicy,
        records: &[AuditRecord],
        sink: Box<dyn AuditSink>,
    ) -> Result<Self> {
        AuditLog::verify_chain(records)?;

        let mut ledger = Self::new(genesis_owner, policy, Box::new(MemorySink))?;
        for record in records {
            let command = Command::from_record(record, &policy);
            ledger.execute(command).map_err(|e| {
                Error::Corrupt(format!("record {} cannot be replayed: {e}", record.seq))
            })?;
            if ledger.audit.head_hash() != record.hash {
                return Err(Error::Corrupt(format!(
                    "record {} does not match its replay",
                    record.seq
                )));
            }
        }
        ledger.audit.replace_sink(sink);

        info!("Replayed {} audit records", records.len());
        Ok(ledger)
    }

    /// Rebuild and verify a ledger from a dump.
    pub fn from_dump(dump: &AuditDump) -> Result<Self> {
        Self::replay(
            dump.genesis_owner.clone(),
            dump.policy,
            &dump.records,
            Box::new(MemorySink),
        )
    }

    pub fn dump(&self) -> AuditDump {
        AuditDump {
            genesis_owner: self.genesis_owner.clone(),
            policy: *self.contests.policy(),
            records: self.audit.records().to_vec(),
        }
    }

    pub fn access(&self) -> &AccessRegistry {
        &self.access
    }

    pub fn contests(&self) -> &ContestStore {
        &self.contests
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn policy(&self) -> &ContestPolicy {
        self.contests.policy()
    }

    /// Execute one command from the submission layer.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome> {
        let Command {
            principal,
            timestamp,
            action,
        } = command;
        let name = action.name();
        let result = self.dispatch(&principal, timestamp, action);
        if let Err(e) = &result {
            debug!("Rejected {name} from {principal}: {e}");
        }
        result
    }

    fn dispatch(
        &mut self,
        caller: &Principal,
        now: Timestamp,
        action: Action,
    ) -> Result<CommandOutcome> {
        Ok(match action {
            Action::CreateContest(spec) => {
                let (contest_id, seq) = self.create_contest(caller, &spec, now)?;
                CommandOutcome::ContestCreated { contest_id, seq }
            }
            Action::AddOption { contest_id, label } => {
                let (option_id, seq) = self.add_option(caller, contest_id, &label, now)?;
                CommandOutcome::OptionAdded { option_id, seq }
            }
            Action::RegisterVoter { contest_id, voter } => CommandOutcome::Committed {
                seq: self.register_voter(caller, contest_id, &voter, now)?,
            },
            Action::Vote {
                contest_id,
                option_id,
            } => CommandOutcome::Committed {
                seq: self.vote(caller, contest_id, option_id, now)?,
            },
            Action::EndContest { contest_id } => CommandOutcome::Committed {
                seq: self.end_contest(caller, contest_id, now)?,
            },
            Action::Reveal { contest_id } => match self.reveal(caller, contest_id, now)? {
                Some(seq) => CommandOutcome::Committed { seq },
                None => CommandOutcome::Unchanged,
            },
            Action::TransferOwnership { new_owner } => CommandOutcome::Committed {
                seq: self.transfer_ownership(caller, &new_owner, now)?,
            },
        })
    }

    /// Create a contest, returning its ID and the audit sequence number.
    pub fn create_contest(
        &mut self,
        caller: &Principal,
        spec: &NewContest,
        now: Timestamp,
    ) -> Result<(ContestId, u64)> {
        self.check_clock(now)?;
        let event = self.contests.create_contest(&self.access, caller, spec, now)?;
        let contest_id = event
            .contest_id()
            .ok_or_else(|| Error::internal("contest creation produced no contest ID"))?;
        let seq = self.commit(caller, event, now)?;
        Ok((contest_id, seq))
    }

    /// Add an option, returning its ID and the audit sequence number.
    pub fn add_option(
        &mut self,
        caller: &Principal,
        contest_id: ContestId,
        label: &str,
        now: Timestamp,
    ) -> Result<(OptionId, u64)> {
        self.check_clock(now)?;
        let event = self
            .contests
            .add_option(&self.access, caller, contest_id, label, now)?;
        let option_id = event
            .option_id()
            .ok_or_else(|| Error::internal("adding an option produced no option ID"))?;
        let seq = self.commit(caller, event, now)?;
        Ok((option_id, seq))
    }

    pub fn register_voter(
        &mut self,
        caller: &Principal,
        contest_id: ContestId,
        voter: &Principal,
        now: Timestamp,
    ) -> Result<u64> {
        self.check_clock(now)?;
        let event = self
            .contests
            .register_voter(&self.access, caller, contest_id, voter)?;
        self.commit(caller, event, now)
    }

    pub fn vote(
        &mut self,
        caller: &Principal,
        contest_id: ContestId,
        option_id: OptionId,
        now: Timestamp,
    ) -> Result<u64> {
        self.check_clock(now)?;
        let event = self.contests.vote(caller, contest_id, option_id, now)?;
        self.commit(caller, event, now)
    }

    pub fn end_contest(
        &mut self,
        caller: &Principal,
        contest_id: ContestId,
        now: Timestamp,
    ) -> Result<u64> {
        self.check_clock(now)?;
        let event = self
            .contests
            .end_contest(&self.access, caller, contest_id, now)?;
        self.commit(caller, event, now)
    }

    /// Reveal a closed contest's ballots. `Ok(None)` if already revealed.
    pub fn reveal(
        &mut self,
        caller: &Principal,
        contest_id: ContestId,
        now: Timestamp,
    ) -> Result<Option<u64>> {
        self.check_clock(now)?;
        match visibility::reveal(&self.contests, &self.access, caller, contest_id, now)? {
            Some(event) => self.commit(caller, event, now).map(Some),
            None => Ok(None),
        }
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Principal,
        new_owner: &Principal,
        now: Timestamp,
    ) -> Result<u64> {
        self.check_clock(now)?;
        let event = self.access.transfer_ownership(caller, new_owner)?;
        self.commit(caller, event, now)
    }

    pub fn compute_winner(&self, contest_id: ContestId, now: Timestamp) -> Result<Winner> {
        tally::compute_winner(self.contests.get_contest(contest_id)?, now)
    }

    pub fn voter_choice(
        &self,
        caller: Option<&Principal>,
        contest_id: ContestId,
        voter: &Principal,
    ) -> Result<Option<OptionId>> {
        visibility::voter_choice(&self.contests, &self.access, caller, contest_id, voter)
    }

    /// Commands may not be timestamped before the last committed record.
    fn check_clock(&self, now: Timestamp) -> Result<()> {
        match self.audit.last_timestamp() {
            Some(last) if now < last => Err(Error::invalid(format!(
                "Timestamp {now} precedes the last committed transition at {last}"
            ))),
            _ => Ok(()),
        }
    }

    /// Persist, apply and publish a validated event.
    fn commit(&mut self, caller: &Principal, event: ContestEvent, now: Timestamp) -> Result<u64> {
        let record = self.audit.seal(now, caller.clone(), event);
        self.audit.persist(&record)?;
        match &record.event {
            ContestEvent::OwnershipTransferred { .. } => self.access.apply(&record.event)?,
            event => self.contests.apply(event)?,
        }
        info!(
            "Committed #{} {:?} by {}",
            record.seq,
            record.event.kind(),
            record.principal
        );
        let seq = record.seq;
        self.audit.push(record);
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };

    use chrono::{Duration, TimeZone, Utc};

    use crate::error::ErrorKind;
    use crate::model::audit::{AuditFilter, EventKind};
    use crate::model::common::Phase;

    const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn p(id: &str) -> Principal {
        Principal::from(id)
    }

    fn ledger(policy: ContestPolicy) -> Ledger {
        Ledger::new(p("owner"), policy, Box::new(MemorySink)).unwrap()
    }

    fn assert_tally_consistent(ledger: &Ledger) {
        for contest in ledger.contests().contests() {
            assert_eq!(contest.total_votes(), contest.ballot_count() as u64);
        }
    }

    /// Registration-gated contest: options A and B, voters V1..V3, V1 and V2
    /// vote B.
    fn registration_scenario() -> (Ledger, ContestId, Timestamp) {
        let mut ledger = ledger(ContestPolicy::registration_gated());
        let spec = NewContest {
            title: "Chair".to_string(),
            description: None,
            admin: None,
            start_offset_secs: Some(60),
            duration_secs: WEEK_SECS,
        };
        let (id, _) = ledger.create_contest(&p("owner"), &spec, t0()).unwrap();
        ledger.add_option(&p("owner"), id, "A", t0()).unwrap();
        ledger.add_option(&p("owner"), id, "B", t0()).unwrap();
        for voter in ["V1", "V2", "V3"] {
            ledger.register_voter(&p("owner"), id, &p(voter), t0()).unwrap();
        }

        let voting = t0() + Duration::hours(1);
        ledger.vote(&p("V1"), id, 2, voting).unwrap();
        ledger.vote(&p("V2"), id, 2, voting).unwrap();
        let end = ledger.contests().get_contest(id).unwrap().end_time;
        (ledger, id, end)
    }

    #[test]
    fn end_to_end_winner() {
        let (ledger, id, end) = registration_scenario();
        assert_tally_consistent(&ledger);

        let err = ledger.compute_winner(id, end).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PhaseError);

        let winner = ledger
            .compute_winner(id, end + Duration::seconds(1))
            .unwrap();
        assert_eq!(
            winner,
            Winner::Winner {
                option_id: 2,
                label: "B".to_string(),
                vote_count: 2,
            }
        );
        assert!(!ledger.contests().has_voted(id, &p("V3")).unwrap());
    }

    #[test]
    fn empty_contest_has_no_winner() {
        let mut ledger = ledger(ContestPolicy::admin_managed());
        let (id, _) = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap();
        let end = t0() + Duration::days(7);
        ledger.end_contest(&p("owner"), id, end).unwrap();
        assert_eq!(ledger.compute_winner(id, end).unwrap(), Winner::NoWinner);
    }

    #[test]
    fn zero_votes_no_winner_and_ties() {
        let mut ledger = ledger(ContestPolicy::admin_managed());
        let (id, _) = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap();
        for label in ["A", "B", "C"] {
            ledger.add_option(&p("owner"), id, label, t0()).unwrap();
        }
        let after = t0() + Duration::days(8);
        assert_eq!(ledger.compute_winner(id, after).unwrap(), Winner::NoWinner);

        let (tied, _) = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap();
        for label in ["A", "B", "C"] {
            ledger.add_option(&p("owner"), tied, label, t0()).unwrap();
        }
        ledger.vote(&p("x"), tied, 3, t0()).unwrap();
        ledger.vote(&p("y"), tied, 2, t0()).unwrap();
        assert_eq!(
            ledger.compute_winner(tied, after).unwrap(),
            Winner::Winner {
                option_id: 2,
                label: "B".to_string(),
                vote_count: 1,
            }
        );
    }

    #[test]
    fn double_vote_rejected() {
        let mut ledger = ledger(ContestPolicy::admin_managed());
        let (id, _) = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap();
        ledger.add_option(&p("owner"), id, "A", t0()).unwrap();
        ledger.vote(&p("v"), id, 1, t0()).unwrap();
        let records = ledger.audit().len();

        let err = ledger.vote(&p("v"), id, 1, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(ledger.contests().get_option(id, 1).unwrap().vote_count, 1);
        assert_eq!(ledger.audit().len(), records);
        assert_tally_consistent(&ledger);
    }

    #[test]
    fn reveal_round_trip() {
        let (mut ledger, id, end) = registration_scenario();

        // Before reveal, only the owner sees individual choices.
        let err = ledger.voter_choice(Some(&p("V3")), id, &p("V1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err = ledger.voter_choice(None, id, &p("V1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            ledger.voter_choice(Some(&p("owner")), id, &p("V1")).unwrap(),
            Some(2)
        );

        // Revealing requires a closed contest and a manager.
        let err = ledger.reveal(&p("owner"), id, end).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PhaseError);
        let closed = end + Duration::seconds(1);
        let err = ledger.reveal(&p("V1"), id, closed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        assert!(ledger.reveal(&p("owner"), id, closed).unwrap().is_some());
        assert!(ledger.contests().get_contest(id).unwrap().results_revealed());

        // Revealing again changes nothing.
        let records = ledger.audit().len();
        assert_eq!(ledger.reveal(&p("owner"), id, closed).unwrap(), None);
        assert_eq!(ledger.audit().len(), records);

        for _ in 0..2 {
            assert_eq!(ledger.voter_choice(None, id, &p("V1")).unwrap(), Some(2));
            assert_eq!(ledger.voter_choice(Some(&p("V3")), id, &p("V2")).unwrap(), Some(2));
            assert_eq!(ledger.voter_choice(None, id, &p("V3")).unwrap(), None);
        }
    }

    #[test]
    fn admin_sees_choices_before_reveal() {
        let mut ledger = ledger(ContestPolicy::admin_managed());
        let spec = NewContest::example().with_admin("delegate");
        let (id, _) = ledger.create_contest(&p("owner"), &spec, t0()).unwrap();
        ledger.add_option(&p("delegate"), id, "A", t0()).unwrap();
        ledger.vote(&p("v"), id, 1, t0()).unwrap();

        assert_eq!(
            ledger.voter_choice(Some(&p("delegate")), id, &p("v")).unwrap(),
            Some(1)
        );
        assert_eq!(
            ledger.voter_choice(Some(&p("delegate")), id, &p("nobody")).unwrap(),
            None
        );
        let err = ledger.voter_choice(Some(&p("v")), id, &p("v")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err = ledger.voter_choice(None, 9, &p("v")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn ownership_transfer() {
        let mut ledger = ledger(ContestPolicy::admin_managed());
        ledger
            .transfer_ownership(&p("owner"), &p("P2"), t0())
            .unwrap();
        assert!(ledger.access().is_owner(&p("P2")));

        let err = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let (id, _) = ledger
            .create_contest(&p("P2"), &NewContest::example(), t0())
            .unwrap();
        assert_eq!(id, 1);

        let err = ledger
            .transfer_ownership(&p("owner"), &p("owner"), t0())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let transfers = AuditFilter {
            kind: Some(EventKind::OwnershipTransferred),
            contest_id: None,
        };
        let record = ledger.audit().filter(&transfers).next().unwrap();
        assert_eq!(
            record.event,
            ContestEvent::OwnershipTransferred {
                old: p("owner"),
                new: p("P2"),
            }
        );
    }

    #[test]
    fn clock_must_not_go_backwards() {
        let mut ledger = ledger(ContestPolicy::admin_managed());
        ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap();
        let err = ledger
            .add_option(&p("owner"), 1, "A", t0() - Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        ledger.add_option(&p("owner"), 1, "A", t0()).unwrap();
    }

    #[test]
    fn execute_commands() {
        let mut ledger = ledger(ContestPolicy::admin_managed());
        let outcome = ledger
            .execute(Command::new(
                "owner",
                t0(),
                Action::CreateContest(NewContest::example()),
            ))
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::ContestCreated {
                contest_id: 1,
                seq: 1
            }
        );

        let outcome = ledger
            .execute(Command::new(
                "owner",
                t0(),
                Action::AddOption {
                    contest_id: 1,
                    label: "Yes".to_string(),
                },
            ))
            .unwrap();
        assert_eq!(outcome, CommandOutcome::OptionAdded { option_id: 1, seq: 2 });

        let vote = Command::new(
            "v",
            t0(),
            Action::Vote {
                contest_id: 1,
                option_id: 1,
            },
        );
        assert_eq!(
            ledger.execute(vote.clone()).unwrap(),
            CommandOutcome::Committed { seq: 3 }
        );
        assert_eq!(
            ledger.execute(vote).unwrap_err().kind(),
            ErrorKind::Conflict
        );

        let phase = ledger.contests().get_contest(1).unwrap().phase(t0());
        assert_eq!(phase, Phase::Open);
    }

    #[test]
    fn replay_reproduces_state() {
        let (mut ledger, id, end) = registration_scenario();
        let closed = end + Duration::seconds(1);
        ledger.end_contest(&p("owner"), id, closed).unwrap();
        ledger.reveal(&p("owner"), id, closed).unwrap();
        ledger
            .transfer_ownership(&p("owner"), &p("heir"), closed)
            .unwrap();

        let replayed = Ledger::from_dump(&ledger.dump()).unwrap();
        assert_eq!(replayed.audit().records(), ledger.audit().records());
        assert_eq!(replayed.contests().contests(), ledger.contests().contests());
        assert_eq!(replayed.access(), ledger.access());
        assert_eq!(
            replayed.compute_winner(id, closed).unwrap(),
            ledger.compute_winner(id, closed).unwrap()
        );
    }

    #[test]
    fn replay_rejects_forged_history() {
        let (ledger, _, _) = registration_scenario();

        // A vote by an unregistered principal, re-hashed into a consistent chain.
        let mut dump = ledger.dump();
        let last = dump.records.len() - 1;
        if let ContestEvent::VoteCast { voter, .. } = &mut dump.records[last].event {
            *voter = p("intruder");
        }
        dump.records[last].principal = p("intruder");
        dump.records[last].hash = dump.records[last].expected_hash();
        AuditLog::verify_chain(&dump.records).unwrap();
        assert!(matches!(Ledger::from_dump(&dump), Err(Error::Corrupt(_))));

        // Plain tampering fails the chain check.
        let mut dump = ledger.dump();
        dump.records[0].principal = p("intruder");
        assert!(matches!(Ledger::from_dump(&dump), Err(Error::Corrupt(_))));
    }

    /// A sink that can be made to fail before storing anything.
    struct FlakySink(Arc<AtomicBool>);

    impl AuditSink for FlakySink {
        fn append(&mut self, _record: &AuditRecord) -> io::Result<()> {
            if self.0.load(Ordering::SeqCst) {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            } else {
                Ok(())
            }
        }

        fn discards_failed_appends(&self) -> bool {
            true
        }
    }

    /// A sink that stores every record but reports one failure afterwards,
    /// like a write whose sync fails.
    struct WriteThenFailSink {
        stored: Arc<Mutex<Vec<AuditRecord>>>,
        fail_next: Arc<AtomicBool>,
    }

    impl AuditSink for WriteThenFailSink {
        fn append(&mut self, record: &AuditRecord) -> io::Result<()> {
            self.stored.lock().unwrap().push(record.clone());
            if self.fail_next.swap(false, Ordering::SeqCst) {
                Err(io::Error::new(io::ErrorKind::Other, "sync failed"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn storage_failure_has_no_effect() {
        let failing = Arc::new(AtomicBool::new(false));
        let sink = FlakySink(failing.clone());
        let mut ledger =
            Ledger::new(p("owner"), ContestPolicy::admin_managed(), Box::new(sink)).unwrap();
        let (id, _) = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap();
        ledger.add_option(&p("owner"), id, "A", t0()).unwrap();

        failing.store(true, Ordering::SeqCst);
        let err = ledger.vote(&p("v"), id, 1, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!ledger.contests().has_voted(id, &p("v")).unwrap());
        assert_eq!(ledger.contests().get_option(id, 1).unwrap().vote_count, 0);
        assert_eq!(ledger.audit().len(), 2);

        failing.store(false, Ordering::SeqCst);
        ledger.vote(&p("v"), id, 1, t0()).unwrap();
        assert_tally_consistent(&ledger);
    }

    #[test]
    fn unknown_storage_state_stops_commits() {
        let stored = Arc::new(Mutex::new(Vec::new()));
        let fail_next = Arc::new(AtomicBool::new(false));
        let sink = WriteThenFailSink {
            stored: stored.clone(),
            fail_next: fail_next.clone(),
        };
        let mut ledger =
            Ledger::new(p("owner"), ContestPolicy::admin_managed(), Box::new(sink)).unwrap();
        let (id, _) = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap();
        ledger.add_option(&p("owner"), id, "A", t0()).unwrap();

        fail_next.store(true, Ordering::SeqCst);
        let err = ledger.vote(&p("v"), id, 1, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        // Nothing may be sealed on top of a record the sink might hold.
        let err = ledger.vote(&p("v"), id, 1, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        let err = ledger
            .create_contest(&p("owner"), &NewContest::example(), t0())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(ledger.audit().len(), 2);
        assert!(!ledger.contests().has_voted(id, &p("v")).unwrap());

        let stored = stored.lock().unwrap();
        let seqs: Vec<u64> = stored.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        AuditLog::verify_chain(&stored).unwrap();
        Ledger::replay(
            p("owner"),
            ContestPolicy::admin_managed(),
            &stored,
            Box::new(MemorySink),
        )
        .unwrap();
    }
}
