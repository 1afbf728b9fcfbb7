//! Checkout state machine.
//!
//! A [`CheckoutFlow`] walks one checkout attempt through its steps:
//!
//! - signed-in customers: `address → payment → confirmation`
//! - guests: `phone → personal → address → payment → confirmation`
//!
//! Each submission either advances exactly one step or fails without
//! changing anything. Only the payment step talks to the outside world: it
//! hands the order to an [`OrderGateway`], and on success clears the cart
//! and lands on the terminal confirmation step.
//!
//! The flow is never persisted. Observers follow it through
//! [`CheckoutFlow::subscribe`].

mod forms;
mod payment;
mod summary;

pub use forms::{FieldError, FieldProblem, PersonalInfo, ShippingAddress, ValidationErrors};
pub use payment::{
    CardDetails, PaymentKind, PaymentMethod, PaymentSummary, format_card_number, format_expiry,
    normalize_card_number,
};
pub use summary::OrderSummary;

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use anime_tribes_core::Storage;

use crate::cart::CartStore;
use crate::error::add_breadcrumb;
use crate::orders::{OrderContact, OrderError, OrderGateway, OrderNumber, OrderRequest};

/// Length of a verification code.
const CODE_LENGTH: usize = 4;

/// Minimum characters in a phone number.
const MIN_PHONE_LENGTH: usize = 10;

/// Errors returned by checkout actions. None of them change the flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Missing or malformed form fields.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The verification code did not match.
    #[error("invalid verification code, please try again")]
    VerificationMismatch,

    /// Checkout cannot start or finish with an empty cart.
    #[error("your cart is empty")]
    EmptyCart,

    /// `back` from the first step or from confirmation.
    #[error("there is no previous step")]
    NoPreviousStep,

    /// The action belongs to a different step.
    #[error("cannot do that on the {0} step")]
    WrongStep(CheckoutStep),

    /// The order could not be placed.
    #[error("failed to place order, please try again")]
    RemoteFailure(#[source] OrderError),
}

impl From<ValidationErrors> for CheckoutError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// A named checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStep {
    Phone,
    Personal,
    Address,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Personal => "personal",
            Self::Address => "address",
            Self::Payment => "payment",
            Self::Confirmation => "confirmation",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sequence of steps a flow follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPath {
    Customer,
    Guest,
}

impl CheckoutPath {
    #[must_use]
    pub const fn first_step(self) -> CheckoutStep {
        match self {
            Self::Customer => CheckoutStep::Address,
            Self::Guest => CheckoutStep::Phone,
        }
    }

    /// Steps in order.
    #[must_use]
    pub const fn steps(self) -> &'static [CheckoutStep] {
        match self {
            Self::Customer => &[
                CheckoutStep::Address,
                CheckoutStep::Payment,
                CheckoutStep::Confirmation,
            ],
            Self::Guest => &[
                CheckoutStep::Phone,
                CheckoutStep::Personal,
                CheckoutStep::Address,
                CheckoutStep::Payment,
                CheckoutStep::Confirmation,
            ],
        }
    }
}

/// Navigation the caller should perform once `delay` has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub delay: Duration,
}

impl Redirect {
    /// Wait out the delay and return the target path.
    pub async fn wait(self) -> String {
        tokio::time::sleep(self.delay).await;
        self.path
    }
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// A verification code was (re)sent.
    CodeSent { phone: String },
    /// The flow moved to another step.
    StepChanged {
        from: CheckoutStep,
        to: CheckoutStep,
    },
    /// The order went through and the cart was cleared.
    OrderPlaced {
        order_number: OrderNumber,
        redirect: Redirect,
    },
}

/// Observable state of a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSnapshot {
    pub step: CheckoutStep,
    pub processing: bool,
    pub order_number: Option<OrderNumber>,
}

/// One checkout attempt.
pub struct CheckoutFlow {
    path: CheckoutPath,
    step: CheckoutStep,
    accepted_code: Option<String>,
    pending_phone: Option<String>,
    verified_phone: Option<String>,
    contact: Option<OrderContact>,
    address: Option<ShippingAddress>,
    processing: bool,
    order_number: Option<OrderNumber>,
    attempt_id: Uuid,
    redirect_delay: Duration,
    tx: watch::Sender<CheckoutSnapshot>,
}

impl CheckoutFlow {
    /// Default wait before leaving the confirmation step.
    pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(3);

    /// Start checkout for a signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to buy.
    pub fn for_customer<S: Storage>(
        contact: OrderContact,
        cart: &CartStore<S>,
    ) -> Result<Self, CheckoutError> {
        Self::start(CheckoutPath::Customer, None, Some(contact), cart)
    }

    /// Start checkout for a guest, who must verify a phone number first.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to buy.
    pub fn for_guest<S: Storage>(
        accepted_code: impl Into<String>,
        cart: &CartStore<S>,
    ) -> Result<Self, CheckoutError> {
        Self::start(CheckoutPath::Guest, Some(accepted_code.into()), None, cart)
    }

    fn start<S: Storage>(
        path: CheckoutPath,
        accepted_code: Option<String>,
        contact: Option<OrderContact>,
        cart: &CartStore<S>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let step = path.first_step();
        let (tx, _rx) = watch::channel(CheckoutSnapshot {
            step,
            processing: false,
            order_number: None,
        });
        let attempt_id = Uuid::new_v4();
        info!(%attempt_id, ?path, items = cart.count(), "Checkout started");

        Ok(Self {
            path,
            step,
            accepted_code,
            pending_phone: None,
            verified_phone: None,
            contact,
            address: None,
            processing: false,
            order_number: None,
            attempt_id,
            redirect_delay: Self::DEFAULT_REDIRECT_DELAY,
            tx,
        })
    }

    /// Override the wait before redirecting to order tracking.
    #[must_use]
    pub const fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn path(&self) -> CheckoutPath {
        self.path
    }

    /// Steps of this flow, in order.
    #[must_use]
    pub const fn steps(&self) -> &'static [CheckoutStep] {
        self.path.steps()
    }

    /// Whether the order is being placed right now.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.processing
    }

    /// The placed order, once on the confirmation step.
    #[must_use]
    pub const fn order_number(&self) -> Option<&OrderNumber> {
        self.order_number.as_ref()
    }

    /// Who the order is for, once known.
    #[must_use]
    pub const fn contact(&self) -> Option<&OrderContact> {
        self.contact.as_ref()
    }

    /// The phone number that passed verification.
    #[must_use]
    pub fn verified_phone(&self) -> Option<&str> {
        self.verified_phone.as_deref()
    }

    #[must_use]
    pub const fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.address.as_ref()
    }

    /// A fresh address form, prefilled with the contact's name.
    #[must_use]
    pub fn address_form(&self) -> ShippingAddress {
        self.address.clone().unwrap_or_else(|| {
            ShippingAddress::blank(self.contact.as_ref().map(|c| c.name.as_str()))
        })
    }

    /// Identifier of this attempt, sent as the order idempotency key.
    #[must_use]
    pub const fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Receive a snapshot after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutSnapshot> {
        self.tx.subscribe()
    }

    /// Send, or resend, a verification code to `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] for a phone number shorter than
    /// ten characters.
    pub fn request_code(&mut self, phone: &str) -> Result<CheckoutEvent, CheckoutError> {
        self.expect_step(CheckoutStep::Phone)?;

        let phone = phone.trim();
        let mut errors = ValidationErrors::new();
        errors.require("phone", phone);
        if errors.is_empty() && phone.chars().count() < MIN_PHONE_LENGTH {
            errors.invalid("phone", "please enter a valid phone number");
        }
        errors.into_result()?;

        self.pending_phone = Some(phone.to_owned());
        add_breadcrumb("checkout", "Verification code sent", None);
        Ok(CheckoutEvent::CodeSent {
            phone: phone.to_owned(),
        })
    }

    /// Check the code the guest typed in.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] if no code was requested or the
    /// input is not four digits, and [`CheckoutError::VerificationMismatch`]
    /// if it is the wrong code.
    pub fn verify_code(&mut self, code: &str) -> Result<CheckoutEvent, CheckoutError> {
        self.expect_step(CheckoutStep::Phone)?;

        let mut errors = ValidationErrors::new();
        let Some(phone) = self.pending_phone.clone() else {
            errors.require("phone", "");
            return Err(errors.into());
        };

        let code = code.trim();
        if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            errors.invalid("code", "please enter a valid 4-digit code");
            return Err(errors.into());
        }

        if self.accepted_code.as_deref() != Some(code) {
            warn!(attempt_id = %self.attempt_id, "Verification code mismatch");
            return Err(CheckoutError::VerificationMismatch);
        }

        self.verified_phone = Some(phone);
        Ok(self.advance())
    }

    /// Submit the guest's name and email.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] listing missing fields or a
    /// malformed email.
    pub fn submit_personal(&mut self, info: &PersonalInfo) -> Result<CheckoutEvent, CheckoutError> {
        self.expect_step(CheckoutStep::Personal)?;
        let email = info.validate()?;

        self.contact = Some(OrderContact {
            name: info.full_name(),
            email,
            phone: self.verified_phone.clone(),
        });
        Ok(self.advance())
    }

    /// Submit the shipping address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] listing missing fields.
    pub fn submit_address(
        &mut self,
        address: ShippingAddress,
    ) -> Result<CheckoutEvent, CheckoutError> {
        self.expect_step(CheckoutStep::Address)?;
        address.validate()?;

        self.address = Some(address);
        Ok(self.advance())
    }

    /// Submit payment and place the order.
    ///
    /// While the gateway call is in flight the flow reports
    /// `processing = true`. On success the cart is cleared and the flow
    /// lands on confirmation. On failure, or if the returned future is
    /// dropped before the gateway answers, nothing changes: the flow stays on
    /// payment with `processing = false`, the cart keeps its lines and the
    /// same attempt id is reused by the next submission.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] for bad card details,
    /// [`CheckoutError::EmptyCart`] if the cart was emptied meanwhile, and
    /// [`CheckoutError::RemoteFailure`] if the gateway fails.
    #[instrument(skip_all, fields(attempt_id = %self.attempt_id))]
    pub async fn submit_payment<S, G>(
        &mut self,
        method: &PaymentMethod,
        cart: &mut CartStore<S>,
        gateway: &G,
    ) -> Result<CheckoutEvent, CheckoutError>
    where
        S: Storage,
        G: OrderGateway,
    {
        self.expect_step(CheckoutStep::Payment)?;
        method.validate()?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (Some(contact), Some(address)) = (self.contact.clone(), self.address.clone()) else {
            return Err(CheckoutError::WrongStep(self.step));
        };
        let request = OrderRequest {
            contact,
            shipping_address: address,
            payment: method.summary(),
            lines: cart.lines().to_vec(),
            summary: OrderSummary::compute(cart.lines()),
        };

        self.processing = true;
        self.publish();
        add_breadcrumb("checkout", "Placing order", None);

        let attempt_key = self.attempt_id.to_string();
        let in_flight = InFlight::begin(self);
        let placed = match gateway.create_order(&request, &attempt_key).await {
            Ok(placed) => {
                in_flight.complete();
                placed
            }
            Err(e) => {
                drop(in_flight);
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Order placement failed");
                return Err(CheckoutError::RemoteFailure(e));
            }
        };

        if let Err(e) = cart.clear() {
            // The order exists; the shopper must still see it.
            tracing::error!(error = %e, order = %placed.order_number, "Failed to clear cart after order");
        }

        let order_number = placed.order_number;
        info!(order = %order_number, total = %request.summary.total, "Order placed");

        self.processing = false;
        self.order_number = Some(order_number.clone());
        self.move_to(CheckoutStep::Confirmation);

        Ok(CheckoutEvent::OrderPlaced {
            redirect: Redirect {
                path: order_number.tracking_path(),
                delay: self.redirect_delay,
            },
            order_number,
        })
    }

    /// Go back one step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoPreviousStep`] on the first step and on
    /// confirmation.
    pub fn back(&mut self) -> Result<CheckoutEvent, CheckoutError> {
        if self.step == CheckoutStep::Confirmation {
            return Err(CheckoutError::NoPreviousStep);
        }

        let previous = self
            .index()
            .checked_sub(1)
            .and_then(|i| self.steps().get(i))
            .copied()
            .ok_or(CheckoutError::NoPreviousStep)?;
        Ok(self.move_to(previous))
    }

    fn expect_step(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep(self.step))
        }
    }

    fn index(&self) -> usize {
        self.steps()
            .iter()
            .position(|s| *s == self.step)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> CheckoutEvent {
        let next = self
            .steps()
            .get(self.index() + 1)
            .copied()
            .unwrap_or(self.step);
        self.move_to(next)
    }

    fn move_to(&mut self, to: CheckoutStep) -> CheckoutEvent {
        let from = self.step;
        self.step = to;
        add_breadcrumb(
            "checkout",
            "Checkout step changed",
            Some(&[("from", from.as_str()), ("to", to.as_str())]),
        );
        self.publish();
        CheckoutEvent::StepChanged { from, to }
    }

    fn publish(&self) {
        self.tx.send_replace(CheckoutSnapshot {
            step: self.step,
            processing: self.processing,
            order_number: self.order_number.clone(),
        });
    }
}

/// Holds the flow while an order is being placed.
///
/// Unless [`InFlight::complete`] is called, dropping it clears `processing`
/// and republishes, so a failed or abandoned finalize leaves the flow on
/// payment, ready to resubmit.
struct InFlight<'a> {
    flow: &'a mut CheckoutFlow,
    done: bool,
}

impl<'a> InFlight<'a> {
    const fn begin(flow: &'a mut CheckoutFlow) -> Self {
        Self { flow, done: false }
    }

    fn complete(mut self) {
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        debug!(attempt_id = %self.flow.attempt_id, "Order placement did not complete");
        self.flow.processing = false;
        self.flow.publish();
    }
}
