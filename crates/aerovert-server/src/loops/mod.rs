//! Background loops.

pub mod refresh_loop;
