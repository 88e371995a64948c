//! Mercado Bitcoin trade API (TAPI v3) client.
//!
//! Every trade operation is an HTTP POST to the fixed `/tapi/v3/` path.
//! The form-urlencoded body always carries a `tapi_method` tag and a fresh
//! `tapi_nonce`, and the request is authorized by two headers: `TAPI-ID`
//! (the key identifier) and `TAPI-MAC` (an HMAC-SHA512 over the signed
//! path and the exact encoded body).

pub mod client;
pub mod endpoints;
pub mod signer;
pub mod types;

pub use client::{TapiClient, DEFAULT_COIN_PAIR};
pub use signer::TapiHmacSigner;
pub use types::{
    AccountInfo, BalanceInfo, ListOrdersFilter, Operation, Order, OrderSide, OrderStatus,
    Orderbook, OrderbookEntry, TapiResponse,
};
