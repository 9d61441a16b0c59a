pub mod amount;
pub mod bounty;
pub mod config;
pub mod document;
pub mod error;
pub mod hand;
pub mod knockout;
pub mod ledger;
pub mod lexer;
pub mod pot;
pub mod rollup;
pub mod summary;
