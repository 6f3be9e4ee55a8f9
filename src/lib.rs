//! # Symptom Checker Documentation
//!
//! Free text symptoms in, a plain explanation plus a doctor recommendation out.
//!
//! ## Notes
//!
//! ### Doctors
//! - Three doctors, matched by keyword in declaration order
//! - Anything else gets "No specific doctor recommendation."

pub mod user;

pub use server::start_server;
