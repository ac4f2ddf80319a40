//! Shared test doubles for the reconciler suites.

#![allow(dead_code)]

pub mod fakes;
