//! The storage engine.
//!
//! This module contains the paged heap file layout (slotted pages, typed
//! records with a null bitmap), the buffer manager that caches pages in a
//! fixed pool of frames, and the catalog subsystem that stores table,
//! column, and sequence metadata inside the same paged heap.
//!
//! Start with [`config::Config`] and [`bufmgr::BufferManager`], run
//! [`bootstrap::initdb`] against a fresh data file, then use
//! [`catalog`] and [`access`] to create tables and move rows.

pub mod access;
pub mod boot;
pub mod bootstrap;
pub mod bufmgr;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod datum;
pub mod descriptor;
pub mod file;
pub mod page;
pub mod pool;
pub mod record;
