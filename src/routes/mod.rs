// Router wiring for the voting API

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // ===== QUESTIONS =====
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/:id", get(get_question))
        .route("/questions/:id/close", post(close_question))

        // ===== BALLOTS =====
        .route("/questions/:id/vote", post(vote))
        .route("/questions/:id/votes/:voter", get(check_vote))
        .route("/questions/:id/ballots", get(get_ballots))
        .route("/questions/:id/counts", get(get_vote_counts))

        // ===== RESOLUTION =====
        .route("/questions/:id/results", get(get_results))
        .route("/questions/:id/draw", get(get_draw))
        .route("/questions/:id/tied", get(get_tied_options))

        // ===== SETTLEMENT =====
        .route("/questions/:id/claim", post(claim_stake))
        .route("/questions/:id/settlement", get(get_settlement))
        .route("/vault", get(get_vault))

        // ===== ACCOUNTS =====
        .route("/accounts/fund", post(fund_account))
        .route("/balance/:address", get(get_balance))
        .route("/ledger", get(get_ledger_activity))

        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))

        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
