// tests/engine_tests.rs
//
// End-to-end command scenarios driven through the service layer, the same
// surface the HTTP handlers call.

use chrono::{Duration, Utc};

use paltaxi_dispatch::{
    errors::DispatchError,
    models::{
        AvailabilityUpdate, ClientRegistration, DriverRegistration, FileComplaintRequest,
        GeoPoint, LoginRequest, RejectSettlementRequest, RideRequest, RideStatus,
        SettingsUpdate, SettlementRequest, SettlementStatus, UserStatus, VehicleInfo,
    },
    services::{
        complaint_service::ComplaintOperations, driver_service::DriverOperations,
        ride_service::RideOperations, settings_service::SettingsOperations,
        settlement_service::SettlementOperations, user_service::UserOperations,
    },
    state::AppState,
};

const PICKUP: GeoPoint = GeoPoint { lat: 23.140, lng: -82.356 };
const DESTINATION: GeoPoint = GeoPoint { lat: 23.009, lng: -82.404 };

async fn login(state: &AppState, username: &str, password: &str) -> String {
    state
        .user_service
        .login(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            role: None,
        })
        .await
        .expect("login should succeed")
        .token
}

async fn admin_token(state: &AppState) -> String {
    login(state, "admin", "admin").await
}

/// Register a client, activate it through the manager flow, log it in.
async fn onboard_client(state: &AppState, username: &str) -> (String, String) {
    let receipt = state
        .user_service
        .register_client(ClientRegistration {
            username: username.to_string(),
            password: "pw".to_string(),
            full_name: format!("Client {username}"),
            phone: "555-0001".to_string(),
            national_id: "90010112345".to_string(),
            id_card_front_url: None,
            id_card_back_url: None,
        })
        .await
        .unwrap();
    let id = receipt.id.unwrap();

    let admin = admin_token(state).await;
    state
        .user_service
        .set_user_status(&admin, &id, UserStatus::Active)
        .await
        .unwrap();

    let token = login(state, username, "pw").await;
    (id, token)
}

/// Register a driver, activate it, log it in and put it on duty.
async fn onboard_driver(state: &AppState, username: &str) -> (String, String) {
    let receipt = state
        .user_service
        .register_driver(DriverRegistration {
            username: username.to_string(),
            password: "pw".to_string(),
            full_name: format!("Driver {username}"),
            phone: "555-0002".to_string(),
            national_id: "85052267890".to_string(),
            vehicle: VehicleInfo::default(),
            id_card_front_url: None,
            id_card_back_url: None,
        })
        .await
        .unwrap();
    let id = receipt.id.unwrap();

    let admin = admin_token(state).await;
    state
        .user_service
        .set_user_status(&admin, &id, UserStatus::Active)
        .await
        .unwrap();

    let token = login(state, username, "pw").await;
    state
        .driver_service
        .set_availability(
            &token,
            AvailabilityUpdate {
                available: true,
                location: Some(PICKUP),
            },
        )
        .await
        .unwrap();

    (id, token)
}

fn crosstown_request() -> RideRequest {
    RideRequest {
        pickup_address: "Calle 23 y L, Vedado".to_string(),
        pickup_point: PICKUP,
        destination_address: "5ta Avenida, Miramar".to_string(),
        destination_point: DESTINATION,
        has_route_changes: false,
        preferred_driver_id: None,
    }
}

async fn driver_field<T>(
    state: &AppState,
    driver_id: &str,
    f: impl Fn(&paltaxi_dispatch::models::DriverUser) -> T + Send,
) -> T {
    state
        .store
        .read(|s| f(s.user(driver_id).unwrap().as_driver().unwrap()))
        .await
}

#[tokio::test]
async fn pending_accounts_cannot_log_in() {
    let state = AppState::in_memory().await;

    state
        .user_service
        .register_client(ClientRegistration {
            username: "maria".to_string(),
            password: "pw".to_string(),
            full_name: "Maria".to_string(),
            phone: "555".to_string(),
            national_id: "N/A".to_string(),
            id_card_front_url: None,
            id_card_back_url: None,
        })
        .await
        .unwrap();

    let err = state
        .user_service
        .login(LoginRequest {
            username: "maria".to_string(),
            password: "pw".to_string(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unauthorized(_)));
}

#[tokio::test]
async fn duplicate_username_is_refused_and_store_unchanged() {
    let state = AppState::in_memory().await;
    let (_, _) = onboard_client(&state, "ana").await;

    let before = state.store.read(|s| s.users.len()).await;
    let err = state
        .user_service
        .register_client(ClientRegistration {
            username: "ana".to_string(),
            password: "other".to_string(),
            full_name: "Second Ana".to_string(),
            phone: "555".to_string(),
            national_id: "N/A".to_string(),
            id_card_front_url: None,
            id_card_back_url: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::DuplicateUsername(name) if name == "ana"));
    assert_eq!(state.store.read(|s| s.users.len()).await, before);
}

#[tokio::test]
async fn ride_is_priced_at_request_time() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;

    let receipt = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap();
    let ride_id = receipt.id.unwrap();
    let ride = state.ride_service.get_ride(&client, &ride_id).await.unwrap();

    // Havana crosstown: haversine lands between 15 and 16.5 km.
    assert!(
        ride.distance_km > 15.0 && ride.distance_km < 16.5,
        "distance was {}",
        ride.distance_km
    );
    // Default tariff 60 CUP/km; price fixed from the distance.
    let expected_price = (ride.distance_km * 60.0 * 100.0).round() / 100.0;
    assert_eq!(ride.price, expected_price);
    let expected_eta = (ride.distance_km / 35.0 * 60.0).round() as u32;
    assert_eq!(ride.eta_min, expected_eta);

    assert_eq!(ride.status, RideStatus::Pending);
    assert!(ride.driver_id.is_none());

    // A later tariff change must not reprice the ride.
    let admin = admin_token(&state).await;
    state
        .settings_service
        .update_settings(
            &admin,
            SettingsUpdate {
                tariff_per_km: Some(120.0),
                ..SettingsUpdate::default()
            },
        )
        .await
        .unwrap();
    let same = state.ride_service.get_ride(&client, &ride_id).await.unwrap();
    assert_eq!(same.price, expected_price);
}

#[tokio::test]
async fn full_ride_lifecycle_credits_the_driver() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (driver_id, driver) = onboard_driver(&state, "pedro").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();

    let accepted = state
        .ride_service
        .accept_ride(&driver, &ride_id, Some(PICKUP))
        .await
        .unwrap();
    assert_eq!(accepted.status, RideStatus::Accepted);
    assert_eq!(accepted.driver_id.as_deref(), Some(driver_id.as_str()));
    assert!(accepted.accepted_at.is_some());

    // One active ride at a time.
    assert!(!driver_field(&state, &driver_id, |d| d.available).await);

    let completed = state
        .ride_service
        .complete_ride(&driver, &ride_id)
        .await
        .unwrap();
    assert_eq!(completed.status, RideStatus::Completed);
    assert!(completed.completed_at.is_some());

    // 10% commission: driver keeps price - price/10, rounded to cents.
    let expected = ((completed.price * 0.9) * 100.0).round() / 100.0;
    let earnings =
        driver_field(&state, &driver_id, |d| d.earnings_since_last_settlement).await;
    assert_eq!(earnings, expected);
}

#[tokio::test]
async fn losing_driver_gets_a_conflict_not_a_silent_noop() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (winner_id, winner) = onboard_driver(&state, "pedro").await;
    let (_, loser) = onboard_driver(&state, "miguel").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();

    state
        .ride_service
        .accept_ride(&winner, &ride_id, None)
        .await
        .unwrap();
    let err = state
        .ride_service
        .accept_ride(&loser, &ride_id, None)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::RideNotPending);

    let ride = state.ride_service.get_ride(&client, &ride_id).await.unwrap();
    assert_eq!(ride.driver_id.as_deref(), Some(winner_id.as_str()));
}

#[tokio::test]
async fn preferred_driver_is_advisory_but_exclusive() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (preferred_id, preferred) = onboard_driver(&state, "pedro").await;
    let (_, other) = onboard_driver(&state, "miguel").await;

    let mut req = crosstown_request();
    req.preferred_driver_id = Some(preferred_id.clone());
    let ride_id = state
        .ride_service
        .request_ride(&client, req)
        .await
        .unwrap()
        .id
        .unwrap();

    let err = state
        .ride_service
        .accept_ride(&other, &ride_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Conflict(_)));

    let ride = state
        .ride_service
        .accept_ride(&preferred, &ride_id, None)
        .await
        .unwrap();
    assert_eq!(ride.driver_id.as_deref(), Some(preferred_id.as_str()));
}

#[tokio::test]
async fn only_the_assigned_driver_completes() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (_, assigned) = onboard_driver(&state, "pedro").await;
    let (_, other) = onboard_driver(&state, "miguel").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();
    state
        .ride_service
        .accept_ride(&assigned, &ride_id, None)
        .await
        .unwrap();

    let err = state
        .ride_service
        .complete_ride(&other, &ride_id)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::NotAssignedDriver);
}

#[tokio::test]
async fn rejected_ride_never_gets_a_driver() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (_, driver) = onboard_driver(&state, "pedro").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();

    let rejected = state
        .ride_service
        .reject_ride(&driver, &ride_id)
        .await
        .unwrap();
    assert_eq!(rejected.status, RideStatus::Rejected);
    assert!(rejected.driver_id.is_none());

    // Terminal: neither accept nor a second reject works.
    let err = state
        .ride_service
        .accept_ride(&driver, &ride_id, None)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::RideNotPending);
}

#[tokio::test]
async fn complaint_at_the_threshold_expels_atomically() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (driver_id, driver) = onboard_driver(&state, "pedro").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();
    state
        .ride_service
        .accept_ride(&driver, &ride_id, None)
        .await
        .unwrap();
    state
        .ride_service
        .complete_ride(&driver, &ride_id)
        .await
        .unwrap();

    // Reputation 54 against the default threshold of 50.
    state
        .store
        .update(|s| {
            s.user_mut(&driver_id).unwrap().as_driver_mut().unwrap().reputation = 54;
        })
        .await;

    state
        .complaint_service
        .file_complaint(
            &client,
            FileComplaintRequest {
                ride_id: ride_id.clone(),
                message: "Took a long detour".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(driver_field(&state, &driver_id, |d| d.reputation).await, 46);
    assert_eq!(
        driver_field(&state, &driver_id, |d| d.base.status).await,
        UserStatus::Expelled
    );
    assert!(!driver_field(&state, &driver_id, |d| d.available).await);
    assert_eq!(driver_field(&state, &driver_id, |d| d.complaints_count).await, 1);
}

#[tokio::test]
async fn complaints_require_a_completed_ride_by_the_same_client() {
    let state = AppState::in_memory().await;
    let (_, ana) = onboard_client(&state, "ana").await;
    let (_, lucia) = onboard_client(&state, "lucia").await;
    let (_, driver) = onboard_driver(&state, "pedro").await;

    let ride_id = state
        .ride_service
        .request_ride(&ana, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();

    // Still pending: no driver, not completed.
    let err = state
        .complaint_service
        .file_complaint(
            &ana,
            FileComplaintRequest {
                ride_id: ride_id.clone(),
                message: "x".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Conflict(_)));

    state
        .ride_service
        .accept_ride(&driver, &ride_id, None)
        .await
        .unwrap();
    state
        .ride_service
        .complete_ride(&driver, &ride_id)
        .await
        .unwrap();

    // Not this client's ride.
    let err = state
        .complaint_service
        .file_complaint(
            &lucia,
            FileComplaintRequest {
                ride_id: ride_id.clone(),
                message: "x".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unauthorized(_)));
}

#[tokio::test]
async fn reputation_saturates_at_zero() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (driver_id, driver) = onboard_driver(&state, "pedro").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();
    state
        .ride_service
        .accept_ride(&driver, &ride_id, None)
        .await
        .unwrap();
    state
        .ride_service
        .complete_ride(&driver, &ride_id)
        .await
        .unwrap();

    for _ in 0..15 {
        state
            .complaint_service
            .file_complaint(
                &client,
                FileComplaintRequest {
                    ride_id: ride_id.clone(),
                    message: "again".to_string(),
                },
            )
            .await
            .unwrap();
    }

    assert_eq!(driver_field(&state, &driver_id, |d| d.reputation).await, 0);
    assert_eq!(driver_field(&state, &driver_id, |d| d.complaints_count).await, 15);
}

#[tokio::test]
async fn settlement_flow_resets_balance_on_approval_only() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (driver_id, driver) = onboard_driver(&state, "pedro").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();
    state
        .ride_service
        .accept_ride(&driver, &ride_id, None)
        .await
        .unwrap();
    state
        .ride_service
        .complete_ride(&driver, &ride_id)
        .await
        .unwrap();

    let owed = driver_field(&state, &driver_id, |d| d.earnings_since_last_settlement).await;
    assert!(owed > 0.0);

    // Evidence is mandatory.
    let err = state
        .settlement_service
        .request_settlement(
            &driver,
            SettlementRequest {
                evidence_url: "  ".to_string(),
                amount: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::MissingEvidence);

    let settlement_id = state
        .settlement_service
        .request_settlement(
            &driver,
            SettlementRequest {
                evidence_url: "https://evidence.example/transfer.jpg".to_string(),
                amount: None,
            },
        )
        .await
        .unwrap()
        .id
        .unwrap();

    // Rejection leaves the debt and the aging clock alone.
    let before = driver_field(&state, &driver_id, |d| d.last_settlement_at).await;
    let admin = admin_token(&state).await;
    let rejected = state
        .settlement_service
        .reject_settlement(
            &admin,
            &settlement_id,
            RejectSettlementRequest {
                reason: Some("blurry photo".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, SettlementStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("blurry photo"));
    assert_eq!(
        driver_field(&state, &driver_id, |d| d.earnings_since_last_settlement).await,
        owed
    );
    assert_eq!(
        driver_field(&state, &driver_id, |d| d.last_settlement_at).await,
        before
    );

    // Resolved settlements are immutable.
    let err = state
        .settlement_service
        .approve_settlement(&admin, &settlement_id)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::SettlementAlreadyReviewed);

    // Second request, approved this time: debt cleared, clock restarted.
    let second_id = state
        .settlement_service
        .request_settlement(
            &driver,
            SettlementRequest {
                evidence_url: "https://evidence.example/transfer2.jpg".to_string(),
                amount: None,
            },
        )
        .await
        .unwrap()
        .id
        .unwrap();
    let approved = state
        .settlement_service
        .approve_settlement(&admin, &second_id)
        .await
        .unwrap();
    assert_eq!(approved.status, SettlementStatus::Approved);
    assert_eq!(approved.amount, owed);
    assert!(approved.reviewed_at.is_some());
    assert_eq!(approved.reviewer_id.as_deref(), Some("u_admin"));

    assert_eq!(
        driver_field(&state, &driver_id, |d| d.earnings_since_last_settlement).await,
        0.0
    );
    assert!(driver_field(&state, &driver_id, |d| d.last_settlement_at).await > before);

    // Nothing left to settle now.
    let err = state
        .settlement_service
        .request_settlement(
            &driver,
            SettlementRequest {
                evidence_url: "https://evidence.example/transfer3.jpg".to_string(),
                amount: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::NoBalance);
}

#[tokio::test]
async fn aged_unpaid_balance_expels_on_next_sweep() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (driver_id, driver) = onboard_driver(&state, "pedro").await;

    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();
    state
        .ride_service
        .accept_ride(&driver, &ride_id, None)
        .await
        .unwrap();
    state
        .ride_service
        .complete_ride(&driver, &ride_id)
        .await
        .unwrap();

    // Backdate the last settlement beyond the 15-day period.
    state
        .store
        .update(|s| {
            let d = s.user_mut(&driver_id).unwrap().as_driver_mut().unwrap();
            d.last_settlement_at = Utc::now() - Duration::days(16);
        })
        .await;

    // Any settings change runs the sweep.
    let admin = admin_token(&state).await;
    state
        .settings_service
        .update_settings(&admin, SettingsUpdate::default())
        .await
        .unwrap();

    assert_eq!(
        driver_field(&state, &driver_id, |d| d.base.status).await,
        UserStatus::Expelled
    );
    assert!(!driver_field(&state, &driver_id, |d| d.available).await);
}

#[tokio::test]
async fn seed_accounts_cannot_be_deleted() {
    let state = AppState::in_memory().await;
    let admin = admin_token(&state).await;

    let err = state
        .user_service
        .delete_user(&admin, "u_gestor")
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::SeedAccountProtected);

    let err = state
        .user_service
        .delete_user(&admin, "u_admin")
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::SeedAccountProtected);
}

#[tokio::test]
async fn roles_gate_every_command() {
    let state = AppState::in_memory().await;
    let (_, client) = onboard_client(&state, "ana").await;
    let (_, driver) = onboard_driver(&state, "pedro").await;

    // A driver cannot request rides.
    let err = state
        .ride_service
        .request_ride(&driver, crosstown_request())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unauthorized(_)));

    // A client cannot accept them.
    let ride_id = state
        .ride_service
        .request_ride(&client, crosstown_request())
        .await
        .unwrap()
        .id
        .unwrap();
    let err = state
        .ride_service
        .accept_ride(&client, &ride_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unauthorized(_)));

    // Settlement review is staff-only.
    let err = state
        .settlement_service
        .approve_settlement(&client, "stl-000000-aaaaaa")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unauthorized(_)));

    // Settings mutation is staff-only.
    let err = state
        .settings_service
        .update_settings(&driver, SettingsUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unauthorized(_)));
}

#[tokio::test]
async fn ride_visibility_is_role_scoped() {
    let state = AppState::in_memory().await;
    let (_, ana) = onboard_client(&state, "ana").await;
    let (_, lucia) = onboard_client(&state, "lucia").await;
    let (preferred_id, _) = onboard_driver(&state, "pedro").await;
    let (_, miguel) = onboard_driver(&state, "miguel").await;

    state
        .ride_service
        .request_ride(&ana, crosstown_request())
        .await
        .unwrap();
    let mut reserved = crosstown_request();
    reserved.preferred_driver_id = Some(preferred_id);
    state
        .ride_service
        .request_ride(&lucia, reserved)
        .await
        .unwrap();

    // Each client sees only their own ride.
    assert_eq!(state.ride_service.list_rides(&ana).await.unwrap().len(), 1);
    assert_eq!(state.ride_service.list_rides(&lucia).await.unwrap().len(), 1);

    // Miguel only sees the open one; the other is reserved for Pedro.
    assert_eq!(state.ride_service.list_rides(&miguel).await.unwrap().len(), 1);

    // Staff see the whole board.
    let admin = admin_token(&state).await;
    assert_eq!(state.ride_service.list_rides(&admin).await.unwrap().len(), 2);
}
