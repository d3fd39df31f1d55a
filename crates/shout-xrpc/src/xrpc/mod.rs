//! XRPC transport and wire types.

pub(crate) mod client;
pub(crate) mod endpoints;
