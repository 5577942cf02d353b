//! Wire models shared by the document service and its clients.
//!
//! - `model`: the persisted entities as they appear on the wire.
//! - `requests`: payloads accepted by the HTTP surface.
//! - `responses`: the JSON envelope every successful response is wrapped in.

pub mod model;
pub mod requests;
pub mod responses;
