use rocket::{serde::json::Json, Route, State};

use crate::{
    clock::SharedClock,
    config::SharedLedger,
    error::Result,
    model::{
        api::{
            auth::Caller,
            contest::{OptionSpec, OwnerSpec, VoteSpec, VoterSpec},
        },
        command::{Action, Command, CommandOutcome},
        common::ContestId,
        contest::NewContest,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        submit,
        create_contest,
        add_option,
        register_voter,
        vote,
        end_contest,
        reveal,
        transfer_ownership
    ]
}

/// Execute `action` on behalf of `caller`, timestamped by the host clock.
///
/// The timestamp is taken under the write lock, so commit order and
/// timestamp order agree.
async fn execute(
    caller: Caller,
    action: Action,
    ledger: &SharedLedger,
    clock: &SharedClock,
) -> Result<Json<CommandOutcome>> {
    let mut ledger = ledger.write().await;
    let command = Command::new(caller.0, clock.now(), action);
    ledger.execute(command).map(Json)
}

/// The generic command interface.
#[post("/commands", data = "<action>", format = "json")]
pub async fn submit(
    caller: Caller,
    action: Json<Action>,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    execute(caller, action.into_inner(), ledger, clock).await
}

#[post("/contests", data = "<spec>", format = "json")]
pub async fn create_contest(
    caller: Caller,
    spec: Json<NewContest>,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    let action = Action::CreateContest(spec.into_inner());
    execute(caller, action, ledger, clock).await
}

#[post("/contests/<contest_id>/options", data = "<spec>", format = "json")]
pub async fn add_option(
    caller: Caller,
    contest_id: ContestId,
    spec: Json<OptionSpec>,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    let action = Action::AddOption {
        contest_id,
        label: spec.into_inner().label,
    };
    execute(caller, action, ledger, clock).await
}

#[post("/contests/<contest_id>/voters", data = "<spec>", format = "json")]
pub async fn register_voter(
    caller: Caller,
    contest_id: ContestId,
    spec: Json<VoterSpec>,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    let action = Action::RegisterVoter {
        contest_id,
        voter: spec.into_inner().voter,
    };
    execute(caller, action, ledger, clock).await
}

#[post("/contests/<contest_id>/vote", data = "<spec>", format = "json")]
pub async fn vote(
    caller: Caller,
    contest_id: ContestId,
    spec: Json<VoteSpec>,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    let action = Action::Vote {
        contest_id,
        option_id: spec.option_id,
    };
    execute(caller, action, ledger, clock).await
}

#[post("/contests/<contest_id>/end")]
pub async fn end_contest(
    caller: Caller,
    contest_id: ContestId,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    execute(caller, Action::EndContest { contest_id }, ledger, clock).await
}

#[post("/contests/<contest_id>/reveal")]
pub async fn reveal(
    caller: Caller,
    contest_id: ContestId,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    execute(caller, Action::Reveal { contest_id }, ledger, clock).await
}

#[put("/owner", data = "<spec>", format = "json")]
pub async fn transfer_ownership(
    caller: Caller,
    spec: Json<OwnerSpec>,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<CommandOutcome>> {
    let action = Action::TransferOwnership {
        new_owner: spec.into_inner().owner,
    };
    execute(caller, action, ledger, clock).await
}
