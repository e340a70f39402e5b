//! Background loops for continuous processing.

pub mod gnss_poll_loop;
