//! Keystone Properties website service
//!
//! Marketing pages, the contact form backed by the storage crate, an admin
//! JSON API over submissions, and the glue that turns a stored submission
//! into an outbound notification email.

pub mod admin;
pub mod config;
pub mod contact;
pub mod error;
pub mod mailer;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;
