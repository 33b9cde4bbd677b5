use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use backend_application::AppState;
use backend_domain::{AccountKind, NearbyQuery, RegisterAccountRequest};

use crate::handlers::{
    account_handlers, item_handlers, ops_handlers, profile_handlers, retailer_handlers,
    transaction_handlers,
};

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(ops_handlers::root))
        .route(
            "/items",
            post(item_handlers::create_item).get(item_handlers::list_items),
        )
        .route(
            "/items/",
            post(item_handlers::create_item).get(item_handlers::list_items),
        )
        .route("/items/nearby", get(item_handlers::nearby_items))
        .route(
            "/items/:qr_code_id",
            get(item_handlers::get_item)
                .patch(item_handlers::update_item)
                .delete(item_handlers::delete_item),
        )
        .route(
            "/items/pickup/:qr_code_id/:tourist",
            post(item_handlers::pickup_item),
        )
        .route(
            "/items/dropoff/:qr_code_id/:business",
            post(item_handlers::dropoff_item),
        )
        .route(
            "/businesses/transactions",
            post(transaction_handlers::append_transaction_by_query)
                .get(transaction_handlers::list_transactions_by_query),
        )
        .route(
            "/businesses/:id/transactions",
            post(transaction_handlers::append_transaction)
                .get(transaction_handlers::list_transactions),
        )
        .route(
            "/businesses/:id/transactions/:transaction_id",
            delete(transaction_handlers::delete_transaction),
        )
        .route(
            "/retailers/create_item",
            post(retailer_handlers::create_retailer_item),
        )
        .route(
            "/retailers/scan_item_qr",
            post(retailer_handlers::scan_item_qr),
        )
        .route(
            "/accounts/:kind/:id/points",
            get(account_handlers::get_points).post(account_handlers::adjust_points),
        )
        .route("/login/profile", get(profile_handlers::login_profile))
        .route("/ops/health/live", get(ops_handlers::health_live))
        .route("/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        );

    let router = [AccountKind::Tourist, AccountKind::Business, AccountKind::Retailer]
        .into_iter()
        .fold(router, account_routes);

    router.with_state(state)
}

/// Registration, lookup, delete, list and proximity routes for one
/// account collection.
fn account_routes(router: Router<AppState>, kind: AccountKind) -> Router<AppState> {
    let base = format!("/{}", kind.collection());
    let mut router = router
        .route(
            &format!("{base}/register"),
            post(
                move |State(state): State<AppState>, Json(request): Json<RegisterAccountRequest>| {
                    account_handlers::register_account(state, kind, request)
                },
            ),
        )
        .route(
            &format!("{base}/:id"),
            get(
                move |State(state): State<AppState>, Path(id): Path<String>| {
                    account_handlers::get_account(state, kind, id)
                },
            )
            .delete(
                move |State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>| {
                    account_handlers::delete_account(state, headers, kind, id)
                },
            ),
        );

    if kind.has_address() {
        let list = get(move |State(state): State<AppState>| {
            account_handlers::list_accounts(state, kind)
        });
        router = router
            .route(&base, list.clone())
            .route(&format!("{base}/"), list)
            .route(
                &format!("{base}/nearby"),
                get(
                    move |State(state): State<AppState>, Query(query): Query<NearbyQuery>| {
                        account_handlers::nearby_accounts(state, kind, query)
                    },
                ),
            );
    }
    router
}
