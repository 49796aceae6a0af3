use crate::handlers::{auction, bid, stream, user};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auctions", post(auction::create_auction).get(auction::list_auctions))
        .route("/auctions/:id", get(auction::get_auction))
        .route("/auctions/:id/start", post(auction::start_auction))
        .route("/auctions/:id/leaderboard", get(auction::get_leaderboard))
        .route("/auctions/:id/bids", post(bid::place_bid))
        .route("/auctions/:id/events", get(stream::auction_events))
        .route("/users/bulk", post(user::bulk_create_users))
        .route("/users/bots", get(user::list_bot_ids));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
