mod helpers;
mod mocks;

mod auth;
mod checkout;
mod misc;
mod orders;
