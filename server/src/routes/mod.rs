//! REST routing. Handlers translate between the HTTP contract and the
//! orchestrator commands and hold no logic of their own.

mod race_results;
mod raceplans;
mod races;
mod start_entries;
mod startlists;
mod time_events;

use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/raceplans", post(raceplans::create).get(raceplans::list))
        .route(
            "/raceplans/generate-raceplan-for-event",
            post(raceplans::generate),
        )
        .route(
            "/raceplans/{id}",
            get(raceplans::get_one)
                .put(raceplans::update)
                .delete(raceplans::delete),
        )
        .route("/races", post(races::create).get(races::list))
        .route(
            "/races/{id}",
            get(races::get_one).put(races::update).delete(races::delete),
        )
        .route(
            "/races/{race_id}/start-entries",
            post(start_entries::create).get(start_entries::list),
        )
        .route(
            "/races/{race_id}/start-entries/{id}",
            get(start_entries::get_one)
                .put(start_entries::update)
                .delete(start_entries::delete),
        )
        .route("/races/{race_id}/race-results", get(race_results::list))
        .route(
            "/races/{race_id}/race-results/{id}",
            get(race_results::get_one)
                .put(race_results::update)
                .delete(race_results::delete),
        )
        .route("/startlists", post(startlists::create).get(startlists::list))
        .route(
            "/startlists/generate-startlist-for-event",
            post(startlists::generate),
        )
        .route(
            "/startlists/{id}",
            get(startlists::get_one)
                .put(startlists::update)
                .delete(startlists::delete),
        )
        .route(
            "/time-events",
            post(time_events::create).get(time_events::list),
        )
        .route(
            "/time-events/{id}",
            get(time_events::get_one).delete(time_events::delete),
        )
}
