//! Observation pipeline for palwatch.
//!
//! This crate turns raw filesystem activity in a save directory into a
//! stream of typed events and a current world view.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `palwatch.yaml` plus
//!   `PALWATCH_*` environment overrides.
//! - [`watch`] -- Recursive watching and the debounce run loop.
//! - [`debounce`] -- Per-path quiet-period scheduling.
//! - [`classify`] -- Save file role classification.
//! - [`route`] -- [`ChangeRouter`]: settled changes to parse requests or
//!   lightweight events.
//! - [`provider`] -- [`SnapshotProvider`] trait and the external
//!   [`CommandProvider`].
//! - [`pipeline`] -- The serialized deep-parse worker.
//! - [`retention`] -- Snapshot files on disk and the diff baseline.
//! - [`world`] -- The shared current [`WorldState`](palwatch_types::WorldState).
//! - [`history`] -- Bounded newest-first event history.
//! - [`sink`] -- [`EventSink`]: where emitted events go.
//!
//! [`ChangeRouter`]: route::ChangeRouter
//! [`SnapshotProvider`]: provider::SnapshotProvider
//! [`CommandProvider`]: provider::CommandProvider
//! [`EventSink`]: sink::EventSink

pub mod classify;
pub mod config;
pub mod debounce;
pub mod history;
pub mod pipeline;
pub mod provider;
pub mod retention;
pub mod route;
pub mod sink;
pub mod watch;
pub mod world;
