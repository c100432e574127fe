//! # Blog Core
//!
//! The domain layer of the blog backend: posts, comments, hashtag tags and
//! the rules that govern them. This crate has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
