use rocket::{serde::json::Json, Route, State};

use crate::{
    clock::SharedClock,
    config::SharedLedger,
    error::Result,
    model::{
        api::{
            auth::Caller,
            contest::{ChoiceDescription, ContestDescription, ContestSummary, OwnerSpec, VoterStatus},
        },
        common::{ContestId, OptionId, Principal},
        contest::ContestOption,
        tally::Winner,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        owner,
        contests,
        contest,
        option,
        voter_status,
        voter_choice,
        winner
    ]
}

#[get("/owner")]
pub async fn owner(ledger: &State<SharedLedger>) -> Json<OwnerSpec> {
    let ledger = ledger.read().await;
    Json(OwnerSpec {
        owner: ledger.access().owner().clone(),
    })
}

#[get("/contests")]
pub async fn contests(
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Json<Vec<ContestSummary>> {
    let now = clock.now();
    let ledger = ledger.read().await;
    let summaries = ledger
        .contests()
        .contests()
        .iter()
        .map(|contest| ContestSummary::new(contest, now))
        .collect();
    Json(summaries)
}

#[get("/contests/<contest_id>")]
pub async fn contest(
    contest_id: ContestId,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<ContestDescription>> {
    let now = clock.now();
    let ledger = ledger.read().await;
    let contest = ledger.contests().get_contest(contest_id)?;
    Ok(Json(ContestDescription::new(contest, now)))
}

#[get("/contests/<contest_id>/options/<option_id>")]
pub async fn option(
    contest_id: ContestId,
    option_id: OptionId,
    ledger: &State<SharedLedger>,
) -> Result<Json<ContestOption>> {
    let ledger = ledger.read().await;
    let option = ledger.contests().get_option(contest_id, option_id)?;
    Ok(Json(option.clone()))
}

#[get("/contests/<contest_id>/voters/<voter>")]
pub async fn voter_status(
    contest_id: ContestId,
    voter: Principal,
    ledger: &State<SharedLedger>,
) -> Result<Json<VoterStatus>> {
    let ledger = ledger.read().await;
    let contest = ledger.contests().get_contest(contest_id)?;
    Ok(Json(VoterStatus {
        is_registered: contest.is_registered(&voter),
        has_voted: contest.has_voted(&voter),
        voter,
    }))
}

/// Anonymous readers are allowed once the results are revealed.
#[get("/contests/<contest_id>/voters/<voter>/choice")]
pub async fn voter_choice(
    contest_id: ContestId,
    voter: Principal,
    caller: Option<Caller>,
    ledger: &State<SharedLedger>,
) -> Result<Json<ChoiceDescription>> {
    let ledger = ledger.read().await;
    let caller = caller.as_ref().map(Caller::principal);
    let option_id = ledger.voter_choice(caller, contest_id, &voter)?;
    Ok(Json(ChoiceDescription { voter, option_id }))
}

#[get("/contests/<contest_id>/winner")]
pub async fn winner(
    contest_id: ContestId,
    ledger: &State<SharedLedger>,
    clock: &State<SharedClock>,
) -> Result<Json<Winner>> {
    let now = clock.now();
    let ledger = ledger.read().await;
    ledger.compute_winner(contest_id, now).map(Json)
}
