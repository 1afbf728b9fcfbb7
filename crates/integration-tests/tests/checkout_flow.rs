//! Checkout state machine end to end, against the simulated gateway and a
//! fake backend served over HTTP.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use anime_tribes_core::MemoryStorage;
use anime_tribes_integration_tests::{
    OrderBackend, customer, is_order_number, serve, shipping_address, straw_hat,
};
use anime_tribes_storefront::cart::CartStore;
use anime_tribes_storefront::checkout::{
    CardDetails, CheckoutError, CheckoutEvent, CheckoutFlow, CheckoutStep, PaymentMethod,
    PersonalInfo,
};
use anime_tribes_storefront::config::BackendConfig;
use anime_tribes_storefront::orders::{HttpOrderGateway, OrderError, SimulatedOrderGateway};
use secrecy::SecretString;

fn cart_with_hat() -> CartStore<MemoryStorage> {
    let mut cart = CartStore::open(MemoryStorage::new());
    cart.add(straw_hat()).unwrap();
    cart
}

fn customer_at_payment(cart: &CartStore<MemoryStorage>) -> CheckoutFlow {
    let mut flow = CheckoutFlow::for_customer(customer(), cart)
        .unwrap()
        .with_redirect_delay(Duration::ZERO);
    flow.submit_address(shipping_address()).unwrap();
    assert_eq!(flow.step(), CheckoutStep::Payment);
    flow
}

fn card(number: &str) -> PaymentMethod {
    PaymentMethod::CreditCard(CardDetails {
        number: SecretString::from(number.to_string()),
        holder_name: "A B".to_string(),
        expiry: "08/29".to_string(),
        cvv: SecretString::from("123".to_string()),
    })
}

#[tokio::test]
async fn test_wallet_checkout_places_order_and_empties_cart() {
    let mut cart = cart_with_hat();
    let mut flow = customer_at_payment(&cart);

    let event = flow
        .submit_payment(
            &PaymentMethod::DigitalWallet,
            &mut cart,
            &SimulatedOrderGateway::instant(),
        )
        .await
        .unwrap();

    assert_eq!(flow.step(), CheckoutStep::Confirmation);
    assert!(cart.is_empty());
    assert!(!flow.is_processing());

    let order_number = flow.order_number().unwrap();
    assert!(is_order_number(order_number.as_str()));

    let CheckoutEvent::OrderPlaced { redirect, .. } = event else {
        panic!("expected OrderPlaced");
    };
    assert_eq!(
        redirect.wait().await,
        format!("/track-order?id={order_number}")
    );
}

#[tokio::test]
async fn test_invalid_card_stays_on_payment() {
    let mut cart = cart_with_hat();
    let mut flow = customer_at_payment(&cart);

    let err = flow
        .submit_payment(
            &card("4111 1111 1111"),
            &mut cart,
            &SimulatedOrderGateway::instant(),
        )
        .await
        .unwrap_err();

    let CheckoutError::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    assert!(errors.has("cardNumber"));
    assert_eq!(flow.step(), CheckoutStep::Payment);
    assert_eq!(cart.count(), 2);
    assert!(!flow.is_processing());
    assert!(flow.order_number().is_none());
}

#[tokio::test]
async fn test_valid_card_is_accepted() {
    let mut cart = cart_with_hat();
    let mut flow = customer_at_payment(&cart);

    flow.submit_payment(
        &card("4111 1111 1111 1111"),
        &mut cart,
        &SimulatedOrderGateway::instant(),
    )
    .await
    .unwrap();

    assert_eq!(flow.step(), CheckoutStep::Confirmation);
}

#[test]
fn test_guest_code_gate() {
    let cart = cart_with_hat();
    let mut flow = CheckoutFlow::for_guest("1234", &cart).unwrap();
    flow.request_code("5551234567").unwrap();

    let err = flow.verify_code("0000").unwrap_err();
    assert!(matches!(err, CheckoutError::VerificationMismatch));
    assert_eq!(flow.step(), CheckoutStep::Phone);
    assert!(flow.verified_phone().is_none());

    flow.verify_code("1234").unwrap();
    assert_eq!(flow.step(), CheckoutStep::Personal);
    assert_eq!(flow.verified_phone(), Some("5551234567"));

    flow.submit_personal(&PersonalInfo {
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: "ab@animetribes.test".to_string(),
    })
    .unwrap();
    assert_eq!(flow.step(), CheckoutStep::Address);
    assert_eq!(
        flow.contact().and_then(|c| c.phone.as_deref()),
        Some("5551234567")
    );
    assert_eq!(flow.address_form().full_name, "A B");
}

#[tokio::test]
async fn test_http_gateway_sends_order_to_backend() {
    let backend = OrderBackend::new("ORD-482913", 0);
    let base_url = serve(backend.router()).await;
    let mut config = BackendConfig::new(base_url);
    config.api_token = Some(SecretString::from("tok_test_1".to_string()));
    let gateway = HttpOrderGateway::new(&config).unwrap();

    let mut cart = cart_with_hat();
    let mut flow = customer_at_payment(&cart);
    flow.submit_payment(&PaymentMethod::DigitalWallet, &mut cart, &gateway)
        .await
        .unwrap();

    assert_eq!(flow.order_number().unwrap().as_str(), "ORD-482913");

    let received = backend.received();
    assert_eq!(received.len(), 1);
    let order = &received[0];
    assert_eq!(
        order.idempotency_key.as_deref(),
        Some(flow.attempt_id().to_string().as_str())
    );
    assert_eq!(order.authorization.as_deref(), Some("Bearer tok_test_1"));
    assert_eq!(order.body["shippingAddress"]["zipCode"], "00000");
    assert_eq!(order.body["payment"]["method"], "digital-wallet");
    assert_eq!(order.body["lines"][0]["quantity"], 2);
    assert_eq!(order.body["summary"]["total"], 74.78);
}

#[tokio::test]
async fn test_backend_failure_is_retryable_with_same_key() {
    let backend = OrderBackend::new("ORD-100200", 1);
    let base_url = serve(backend.router()).await;
    let gateway = HttpOrderGateway::new(&BackendConfig::new(base_url)).unwrap();

    let mut cart = cart_with_hat();
    let mut flow = customer_at_payment(&cart);

    let err = flow
        .submit_payment(&PaymentMethod::DigitalWallet, &mut cart, &gateway)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::RemoteFailure(OrderError::Api { status: 503, .. })
    ));
    assert_eq!(flow.step(), CheckoutStep::Payment);
    assert!(!flow.is_processing());
    assert_eq!(cart.count(), 2);

    flow.submit_payment(&PaymentMethod::DigitalWallet, &mut cart, &gateway)
        .await
        .unwrap();
    assert_eq!(flow.step(), CheckoutStep::Confirmation);
    assert!(cart.is_empty());

    let keys: Vec<_> = backend
        .received()
        .into_iter()
        .map(|r| r.idempotency_key)
        .collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0], keys[1]);
}

#[tokio::test]
async fn test_malformed_order_id_is_a_remote_failure() {
    let backend = OrderBackend::new("12345", 0);
    let base_url = serve(backend.router()).await;
    let gateway = HttpOrderGateway::new(&BackendConfig::new(base_url)).unwrap();

    let mut cart = cart_with_hat();
    let mut flow = customer_at_payment(&cart);

    let err = flow
        .submit_payment(&PaymentMethod::DigitalWallet, &mut cart, &gateway)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::RemoteFailure(OrderError::InvalidOrderNumber(_))
    ));
    assert_eq!(cart.count(), 2);
}
