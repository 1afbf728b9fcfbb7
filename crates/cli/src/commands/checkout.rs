//! Non-interactive checkout.
//!
//! Walks the same steps a shopper would, filled from command arguments,
//! against the cart persisted in the state directory.

use anime_tribes_core::{Email, format_money};
use anime_tribes_storefront::cart::CartStore;
use anime_tribes_storefront::checkout::{
    CardDetails, CheckoutEvent, CheckoutFlow, OrderSummary, PaymentMethod, PersonalInfo,
    ShippingAddress,
};
use anime_tribes_storefront::config::StorefrontConfig;
use anime_tribes_storefront::orders::{
    HttpOrderGateway, OrderContact, OrderGateway, SimulatedOrderGateway,
};
use secrecy::SecretString;
use tracing::info;

use crate::CheckoutArgs;
use crate::storage::FileStorage;

/// Run checkout for the current cart.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a step rejects its input,
/// or the order cannot be placed.
pub async fn run(storage: FileStorage, args: CheckoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let mut cart = CartStore::open(storage);

    let summary = OrderSummary::compute(cart.lines());
    let flow = if args.guest {
        guest_flow(&config, &cart, &args)?
    } else {
        let contact = OrderContact {
            name: args.name.trim().to_owned(),
            email: Email::parse(&args.email)?,
            phone: args.phone.clone(),
        };
        CheckoutFlow::for_customer(contact, &cart)?
    };
    let mut flow = flow.with_redirect_delay(config.redirect_delay);

    let recipient = args
        .full_name
        .clone()
        .or_else(|| flow.contact().map(|c| c.name.clone()));
    let address = ShippingAddress {
        full_name: recipient.unwrap_or_default(),
        address_line1: args.address1.clone(),
        address_line2: args.address2.clone(),
        city: args.city.clone(),
        state: args.state.clone(),
        zip_code: args.zip.clone(),
        country: args.country.clone(),
    };
    flow.submit_address(address)?;

    let method = payment_method(&args);
    info!("Placing order for {}", format_money(summary.total));

    let event = if args.live {
        let gateway = HttpOrderGateway::new(&config.backend)?;
        place(&mut flow, &method, &mut cart, &gateway).await?
    } else {
        let gateway = SimulatedOrderGateway::new(config.simulated_order_delay);
        place(&mut flow, &method, &mut cart, &gateway).await?
    };

    if let CheckoutEvent::OrderPlaced {
        order_number,
        redirect,
    } = event
    {
        info!("Order placed: {order_number}");
        info!("Redirecting in {}s", redirect.delay.as_secs());
        let path = redirect.wait().await;
        info!("Track your order at {path}");
    }
    Ok(())
}

fn guest_flow(
    config: &StorefrontConfig,
    cart: &CartStore<FileStorage>,
    args: &CheckoutArgs,
) -> Result<CheckoutFlow, Box<dyn std::error::Error>> {
    let mut flow = CheckoutFlow::for_guest(config.verification_code.clone(), cart)?;

    let phone = args.phone.as_deref().unwrap_or_default();
    flow.request_code(phone)?;
    info!("Verification code sent to {phone}");
    flow.verify_code(args.code.as_deref().unwrap_or_default())?;

    flow.submit_personal(&PersonalInfo {
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        email: args.email.clone(),
    })?;
    Ok(flow)
}

fn payment_method(args: &CheckoutArgs) -> PaymentMethod {
    match &args.card_number {
        Some(number) => PaymentMethod::CreditCard(CardDetails {
            number: SecretString::from(number.clone()),
            holder_name: args.card_name.clone(),
            expiry: args.expiry.clone(),
            cvv: SecretString::from(args.cvv.clone()),
        }),
        None => PaymentMethod::DigitalWallet,
    }
}

async fn place<G: OrderGateway>(
    flow: &mut CheckoutFlow,
    method: &PaymentMethod,
    cart: &mut CartStore<FileStorage>,
    gateway: &G,
) -> Result<CheckoutEvent, Box<dyn std::error::Error>> {
    Ok(flow.submit_payment(method, cart, gateway).await?)
}
