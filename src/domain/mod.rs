//! Domain layer: orders, their status table and the storage port.

pub mod command;
pub mod order;
pub mod ports;
pub mod status;
