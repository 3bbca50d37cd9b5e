//! Persistence layer: the sea-orm entities for the back-office tables.

pub mod entities;
