//! GitHub popularity board
//!
//! # Overview
//!
//! A popularity board lists the most starred repositories on GitHub together with the top
//! contributor of each one.
//! Given a page size (2, 10 or 100), the board fetches that many repositories from the
//! search API (sorted by star count in descending order) and then, concurrently, the top
//! contributor of every repository.
//! Both are joined into one row per repository, preserving the search order.
//! A repository whose contributor lookup fails is dropped from the board; when the lookup
//! was rejected because of rate limiting, the failure is additionally surfaced so a
//! presentation layer can show it.
//! The board only ever holds the rows of the latest refresh, nothing is persisted.

#[cfg(feature = "api")]
pub mod api;

#[cfg(feature = "aggregator")]
pub mod aggregator;

#[cfg(feature = "view")]
pub mod view;
