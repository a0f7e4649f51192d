//! Request handlers that sit between axum and the shop-core responder.

pub(crate) mod chat;
