pub mod checkout;
pub mod event;
pub mod image;
pub mod ticket;
pub mod user;
