//! A small service woven at build time.
//!
//! `build.rs` runs the generator over `weave.json`, the model of
//! [`inventory::Inventory`], and the interceptors it renders are included
//! below.

pub mod inventory;

include!(concat!(env!("OUT_DIR"), "/aspectweave_interceptors.rs"));
