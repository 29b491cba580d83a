pub mod doc;
/// Evolution WhatsApp gateway client.
pub mod evolution;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
/// Reminder due-window computation and the reminder pass.
pub mod logic;
pub mod routes;
