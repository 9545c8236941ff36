//! Domain model: users, groups, expenses and the balance engine, plus the
//! storage ports the application layer is written against.

pub mod balance;
pub mod expense;
pub mod group;
pub mod money;
pub mod ports;
pub mod user;
