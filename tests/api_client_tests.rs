mod common;

use common::spawn_backend;
use resortadmin::{
    AdminClient, AdminError, ApiClient, ApiConfig, ChannelNotifier, FoodItem, MemoryTokenStore,
    NotificationLevel, PaymentStatus, PaymentStatusUpdate, Role, TokenStore,
};
use std::sync::Arc;
use uuid::Uuid;

fn api_client(base_url: &str, tokens: Arc<dyn TokenStore>) -> ApiClient {
    ApiClient::new(ApiConfig::from_url(base_url).unwrap(), tokens).unwrap()
}

#[tokio::test]
async fn test_list_parses_envelope_and_normalises_ids() {
    let (url, _backend) = spawn_backend().await;
    let client = api_client(&url, Arc::new(MemoryTokenStore::new()));

    let food: Vec<FoodItem> = client.list().await.unwrap();
    let ids: Vec<&str> = food.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(food[0].name, "Masala Dosa");
    assert!(food.iter().all(|item| item.is_available));
}

#[tokio::test]
async fn test_bearer_token_is_read_per_request() {
    let (url, backend) = spawn_backend().await;
    let tokens = Arc::new(MemoryTokenStore::with_token("access_token", "secret"));
    let client = api_client(&url, tokens.clone());

    client.list::<FoodItem>().await.unwrap();
    client.clear_token().unwrap();
    client.list::<FoodItem>().await.unwrap();
    tokens.set("access_token", "rotated").unwrap();
    client.list::<FoodItem>().await.unwrap();

    assert_eq!(
        backend.auth_headers(),
        vec![
            Some("Bearer secret".to_string()),
            None,
            Some("Bearer rotated".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_every_request_carries_a_fresh_request_id() {
    let (url, backend) = spawn_backend().await;
    let client = api_client(&url, Arc::new(MemoryTokenStore::new()));

    client.list::<FoodItem>().await.unwrap();
    client.list::<FoodItem>().await.unwrap();

    let ids = backend.request_ids();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    for id in &ids {
        assert!(Uuid::parse_str(id).is_ok(), "not a uuid: {id}");
    }
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let (url, _backend) = spawn_backend().await;
    let client = api_client(&url, Arc::new(MemoryTokenStore::new()));

    let err = client.fetch::<Role>("99").await.unwrap_err();
    assert_eq!(
        err,
        AdminError::Api {
            status: 404,
            detail: "Role not found".to_string()
        }
    );
    assert_eq!(err.user_message(), "Role not found");
}

#[tokio::test]
async fn test_validation_list_is_joined() {
    let (url, _backend) = spawn_backend().await;
    let client = api_client(&url, Arc::new(MemoryTokenStore::new()));

    let role = Role {
        id: String::new(),
        name: String::new(),
        description: None,
        permissions: Vec::new(),
    };
    let err = client.create(&role).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(
        err.user_message(),
        "field required; value is not a valid list"
    );
}

#[tokio::test]
async fn test_unreachable_backend_reports_generic_message() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = api_client(&format!("http://{addr}"), Arc::new(MemoryTokenStore::new()));
    let err = client.list::<FoodItem>().await.unwrap_err();
    assert!(matches!(err, AdminError::Transport(_)));
    assert_eq!(err.user_message(), resortadmin::core::GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_payment_status_update_notifies_success() {
    let (url, backend) = spawn_backend().await;
    let (notifier, mut rx) = ChannelNotifier::new();
    let client = AdminClient::connect(
        ApiConfig::from_url(&url).unwrap(),
        Arc::new(MemoryTokenStore::new()),
    )
    .unwrap()
    .with_notifier(Arc::new(notifier));

    let order = client
        .update_payment_status(
            "42",
            PaymentStatusUpdate::new(PaymentStatus::PartiallyPaid).amount_paid(200.0),
        )
        .await
        .unwrap();

    assert_eq!(order.id, "42");
    assert_eq!(order.order_number, "PO-42");
    assert_eq!(order.payment_status, PaymentStatus::PartiallyPaid);
    assert_eq!(order.balance_due(), 300.0);
    assert_eq!(backend.payment_calls(), 1);

    let notification = rx.recv().await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Success);
    assert_eq!(notification.message, "Payment status set to partially_paid");
}

#[tokio::test]
async fn test_invalid_payment_update_never_reaches_backend() {
    let (url, backend) = spawn_backend().await;
    let (notifier, mut rx) = ChannelNotifier::new();
    let client = AdminClient::connect(
        ApiConfig::from_url(&url).unwrap(),
        Arc::new(MemoryTokenStore::new()),
    )
    .unwrap()
    .with_notifier(Arc::new(notifier));

    let err = client
        .update_payment_status("42", PaymentStatusUpdate::new(PaymentStatus::PartiallyPaid))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Validation(_)));
    assert_eq!(backend.payment_calls(), 0);

    let notification = rx.recv().await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.message, "A partial payment needs the amount paid");
}
