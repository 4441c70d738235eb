// HTTP request handlers for the voting API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::app_state::SharedState;
use crate::ballots::{Ballot, VoteCheck};
use crate::engine::QuestionView;
use crate::errors::{ErrorKind, VotingError};
use crate::ledger::AccountStore;
use crate::models::*;
use crate::settlement::SettlementSummary;

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn reject(e: VotingError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match (&e, e.kind()) {
        (VotingError::QuestionNotFound(_), _) => StatusCode::NOT_FOUND,
        (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        (_, ErrorKind::State) => StatusCode::CONFLICT,
        (_, ErrorKind::Authorization) => StatusCode::FORBIDDEN,
        (_, ErrorKind::Transfer) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ErrorResponse::from(&e)))
}

fn bad_request(msg: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { success: false, error: msg, kind: None }),
    )
}

// ===== QUESTIONS =====

pub async fn create_question(
    State(state): State<SharedState>,
    Json(request): Json<CreateQuestionRequest>,
) -> ApiResult<CreateQuestionResponse> {
    let mut app = state.lock().await;
    let question_id = app
        .engine
        .create_question(&request.caller, request.text, request.start_time, request.end_time)
        .map_err(reject)?;

    Ok(Json(CreateQuestionResponse { success: true, question_id }))
}

pub async fn list_questions(State(state): State<SharedState>) -> Json<Vec<QuestionView>> {
    let app = state.lock().await;
    Json(app.engine.list_questions())
}

pub async fn get_question(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
) -> ApiResult<QuestionView> {
    let app = state.lock().await;
    app.engine.question(question_id).map(Json).map_err(reject)
}

pub async fn close_question(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
    Json(request): Json<CallerRequest>,
) -> ApiResult<CloseQuestionResponse> {
    let mut app = state.lock().await;
    let resolution = app
        .engine
        .close_question(&request.caller, question_id)
        .map_err(reject)?;

    Ok(Json(CloseQuestionResponse { success: true, question_id, resolution }))
}

// ===== BALLOTS =====

pub async fn vote(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<VoteResponse> {
    let mut app = state.lock().await;
    let ballot = app
        .engine
        .vote(&request.caller, question_id, request.option, request.amount)
        .map_err(reject)?
        .clone();
    let new_balance = app.engine.store().balance(&request.caller);

    Ok(Json(VoteResponse {
        success: true,
        question_id,
        option: ballot.option,
        stake: ballot.stake,
        receipt: ballot.receipt,
        new_balance,
    }))
}

pub async fn check_vote(
    State(state): State<SharedState>,
    Path((question_id, voter)): Path<(u64, String)>,
) -> ApiResult<VoteCheck> {
    let app = state.lock().await;
    app.engine.check_vote(question_id, &voter).map(Json).map_err(reject)
}

pub async fn get_ballots(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
) -> ApiResult<Vec<Ballot>> {
    let app = state.lock().await;
    let ballots = app.engine.ballots(question_id).map_err(reject)?;
    Ok(Json(ballots.into_iter().cloned().collect()))
}

pub async fn get_vote_counts(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
) -> ApiResult<VoteCountsResponse> {
    let app = state.lock().await;
    let engine = &app.engine;
    Ok(Json(VoteCountsResponse {
        question_id,
        yes: engine.get_yes_votes_count(question_id).map_err(reject)?,
        no: engine.get_no_votes_count(question_id).map_err(reject)?,
        abstain: engine.get_abstain_votes_count(question_id).map_err(reject)?,
    }))
}

// ===== RESOLUTION =====

pub async fn get_results(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
) -> ApiResult<ResultsResponse> {
    let app = state.lock().await;
    let yes_won = app.engine.get_voting_results(question_id).map_err(reject)?;
    let resolution = app.engine.resolution(question_id).map_err(reject)?.clone();
    Ok(Json(ResultsResponse { question_id, yes_won, resolution }))
}

pub async fn get_draw(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
) -> ApiResult<DrawResponse> {
    let app = state.lock().await;
    let is_draw = app.engine.is_question_draw(question_id).map_err(reject)?;
    Ok(Json(DrawResponse { question_id, is_draw }))
}

pub async fn get_tied_options(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
) -> ApiResult<TiedOptionsResponse> {
    let app = state.lock().await;
    let tied_options = app.engine.get_tied_options(question_id).map_err(reject)?;
    Ok(Json(TiedOptionsResponse { question_id, tied_options }))
}

// ===== SETTLEMENT =====

pub async fn claim_stake(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
    Json(request): Json<CallerRequest>,
) -> ApiResult<ClaimResponse> {
    let mut app = state.lock().await;
    let receipt = app
        .engine
        .claim_stake(&request.caller, question_id)
        .map_err(reject)?;
    let new_balance = app.engine.store().balance(&request.caller);

    Ok(Json(ClaimResponse {
        success: true,
        question_id,
        payout: receipt.payout,
        vault_share: receipt.vault_share,
        new_balance,
    }))
}

pub async fn get_settlement(
    State(state): State<SharedState>,
    Path(question_id): Path<u64>,
) -> ApiResult<SettlementSummary> {
    let app = state.lock().await;
    app.engine.settlement_summary(question_id).map(Json).map_err(reject)
}

pub async fn get_vault(State(state): State<SharedState>) -> Json<VaultResponse> {
    let app = state.lock().await;
    let vault = app.engine.vault();
    Json(VaultResponse {
        address: vault.address.clone(),
        balance: app.engine.vault_balance(),
        escrowed: vault.escrowed,
        total_credited: vault.total_credited(),
    })
}

// ===== ACCOUNTS =====

pub async fn fund_account(
    State(state): State<SharedState>,
    Json(request): Json<FundRequest>,
) -> ApiResult<BalanceResponse> {
    let mut app = state.lock().await;
    let balance = app
        .engine
        .store_mut()
        .fund(&request.address, request.amount)
        .map_err(|e| bad_request(e.to_string()))?;

    Ok(Json(BalanceResponse { address: request.address, balance }))
}

pub async fn get_balance(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Json<BalanceResponse> {
    let app = state.lock().await;
    let balance = app.engine.store().balance(&address);
    Json(BalanceResponse { address, balance })
}

pub async fn get_ledger_activity(State(state): State<SharedState>) -> Json<Value> {
    let app = state.lock().await;
    let ledger = app.engine.store();
    Json(json!({
        "stats": ledger.stats(),
        "recent": ledger.recent_transactions(50),
    }))
}

pub async fn health_check(State(state): State<SharedState>) -> Json<Value> {
    let app = state.lock().await;
    Json(json!({
        "status": "ok",
        "stake_amount": app.engine.stake_amount(),
        "questions": app.engine.list_questions().len(),
        "now": app.engine.now(),
    }))
}
