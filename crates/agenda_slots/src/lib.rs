// --- File: crates/agenda_slots/src/lib.rs ---
//! Availability slots and public booking.
//!
//! [`logic::calculate_available_slots`] is the pure slot computation; the
//! handlers load settings and appointments from a
//! [`SchedulingStore`](agenda_common::SchedulingStore), apply the pre-filter
//! gate and call it.
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;
