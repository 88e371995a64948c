//! Mercado Bitcoin API endpoints and method tags.

/// Production REST base URL (trade API and public data API).
pub const BASE_URL: &str = "https://www.mercadobitcoin.net";

/// Trade API path.
///
/// The signature covers this literal string, trailing slash included; the
/// request URL is derived from the same constant so the signed path and
/// the requested path can never diverge.
pub const TAPI_PATH: &str = "/tapi/v3/";

/// Public data API path prefix (day-summary lives under it).
pub const PUBLIC_API_PATH: &str = "/api";

/// TAPI method tags, sent as the `tapi_method` parameter.
pub mod methods {
    /// Account balances and withdrawal limits
    pub const GET_ACCOUNT_INFO: &str = "get_account_info";

    /// List orders for a coin pair
    pub const LIST_ORDERS: &str = "list_orders";

    /// Fetch a single order
    pub const GET_ORDER: &str = "get_order";

    /// Order book snapshot
    pub const LIST_ORDERBOOK: &str = "list_orderbook";

    /// Place a buy limit order
    pub const PLACE_BUY_ORDER: &str = "place_buy_order";

    /// Place a sell limit order
    pub const PLACE_SELL_ORDER: &str = "place_sell_order";

    /// Cancel an open order
    pub const CANCEL_ORDER: &str = "cancel_order";
}
