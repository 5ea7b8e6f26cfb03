pub mod auth;
pub mod checkout;
pub mod images;
pub mod payments;
