//! # Frontend Contract
//!
//! Client logic/relevant structures.
//!
//! ## Overall Payloads
//!
//! Responses/requests between the frontend and backend. All JSON.
//!
//! ### Signup
//! To backend
//! - `{name, email, password}`
//!
//! From backend
//! - 201 `{message}` on success
//! - 400 `{message: "User already exists"}` when the email is taken
//!
//! ### Login
//! To backend
//! - `{email, password}`
//!
//! From backend
//! - 200 `{message, token, user: {id, name, email}}`
//! - 400 `{message}` for an unknown email or a wrong password
//!
//! ### Symptoms
//! To backend
//! - `{symptom}`, trimmed by the client first
//!
//! From backend
//! - 200 `{response}`: explanation, blank line, doctor recommendation
//! - 400/500 `{error}`
//!
//!
//!
//! ## Flow
//!
//! - Refuse to send an empty symptom, tell the user "Please enter symptoms!"
//! - Show a waiting message while the request is in flight
//! - Show `response` verbatim
//! - On login success keep the token locally for later requests, it lasts one hour
//! - Any non 2xx or network failure gets one generic "Something went wrong" alert,
//!   error kinds are not told apart
