//! Domain models for the CMS aggregate

pub mod loan_account;
pub mod ledger;
pub mod product;
pub mod profile;
pub mod origin;
pub mod currency;
