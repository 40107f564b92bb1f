//! # Zedis
//!
//! An in-memory Redis-style data store whose centerpiece is the sorted set:
//! a member index paired with a rank-indexed skip list, queried by score
//! ranges with inclusive, exclusive and infinite borders.
//!
//! Commands run through [`command::dispatch`] against a [`store::SharedStore`];
//! the `zedis` binary drives it from stdin through [`shell::run`].

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod resp;
pub mod shell;
pub mod store;
pub mod types;
