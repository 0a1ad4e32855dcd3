//! Business-logic services that orchestrate across external clients.

pub mod checkout;

pub use checkout::CheckoutService;
