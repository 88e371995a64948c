//! Mercado Bitcoin TAPI wire types.
//!
//! Everything here mirrors the trade API envelope and payload shapes.
//! Monetary values arrive as decimal strings and are carried as
//! [`Decimal`]; timestamps arrive as epoch-second strings and are kept
//! verbatim. Orders are never cached locally: every query re-fetches from
//! the remote system of record.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::tapi::endpoints::methods;

/// Envelope status code denoting success.
pub const STATUS_SUCCESS: i32 = 100;

/// TAPI response envelope.
///
/// Any `status_code` other than [`STATUS_SUCCESS`] is an application-level
/// rejection carrying `error_message`; the payload shape under
/// `response_data` is operation-specific.
#[derive(Debug, Clone, Deserialize)]
pub struct TapiResponse<T> {
    /// Envelope status code (100 = success)
    pub status_code: i32,
    /// Server-supplied error message (present on failure)
    #[serde(default)]
    pub error_message: Option<String>,
    /// Operation-specific payload (present on success)
    pub response_data: Option<T>,
}

impl<T> TapiResponse<T> {
    /// Check if the envelope denotes success.
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_SUCCESS
    }
}

/// Wire encoding for TAPI booleans.
///
/// The API expects the string literals `"true"`/`"false"`, not a native
/// boolean rendering.
pub fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Order side, `order_type` on the wire (1 = buy, 2 = sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i32")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Get the TAPI integer code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Buy => 1,
            Self::Sell => 2,
        }
    }

    /// Parse from the TAPI integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            _ => None,
        }
    }

    /// Get the method tag used to place an order on this side.
    pub fn method_tag(&self) -> &'static str {
        match self {
            Self::Buy => methods::PLACE_BUY_ORDER,
            Self::Sell => methods::PLACE_SELL_ORDER,
        }
    }
}

impl TryFrom<i32> for OrderSide {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid order_type code: {code}"))
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order status (1 = pending, 2 = open, 3 = canceled, 4 = filled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i32")]
pub enum OrderStatus {
    /// Order received, not yet on the book
    Pending,
    /// Order resting on the book
    Open,
    /// Order canceled
    Canceled,
    /// Order fully filled
    Filled,
}

impl OrderStatus {
    /// Get the TAPI integer code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Pending => 1,
            Self::Open => 2,
            Self::Canceled => 3,
            Self::Filled => 4,
        }
    }

    /// Parse from the TAPI integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Pending),
            2 => Some(Self::Open),
            3 => Some(Self::Canceled),
            4 => Some(Self::Filled),
            _ => None,
        }
    }

    /// Check if the order is still working.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Open)
    }
}

impl TryFrom<i32> for OrderStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid order status code: {code}"))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Open => write!(f, "open"),
            Self::Canceled => write!(f, "canceled"),
            Self::Filled => write!(f, "filled"),
        }
    }
}

/// A fill executed against an order.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    /// Fill identifier
    pub operation_id: i64,
    /// Filled quantity
    pub quantity: Decimal,
    /// Execution price
    pub price: Decimal,
    /// Fee rate applied
    pub fee_rate: Decimal,
    /// Execution time (epoch seconds, as sent)
    pub executed_timestamp: String,
}

/// An order as returned by the TAPI.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    /// Order identifier
    pub order_id: i64,
    /// Coin pair (e.g., "BRLBTC")
    pub coin_pair: String,
    /// Buy or sell
    pub order_type: OrderSide,
    /// Current status
    pub status: OrderStatus,
    /// Whether the order has any fills
    pub has_fills: bool,
    /// Ordered quantity
    pub quantity: Decimal,
    /// Limit price
    pub limit_price: Decimal,
    /// Quantity executed so far
    pub executed_quantity: Decimal,
    /// Average execution price
    pub executed_price_avg: Decimal,
    /// Fee charged so far
    pub fee: Decimal,
    /// Creation time (epoch seconds, as sent)
    pub created_timestamp: String,
    /// Last update time (epoch seconds, as sent)
    pub updated_timestamp: String,
    /// Fill history
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// One resting order on a book side.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderbookEntry {
    /// Order identifier
    pub order_id: i64,
    /// Resting quantity
    pub quantity: Decimal,
    /// Limit price
    pub limit_price: Decimal,
    /// Whether the order belongs to the authenticated account
    pub is_owner: bool,
}

/// Order book snapshot for a coin pair.
#[derive(Debug, Clone, Deserialize)]
pub struct Orderbook {
    /// Buy side, best first
    pub bids: Vec<OrderbookEntry>,
    /// Sell side, best first
    pub asks: Vec<OrderbookEntry>,
    /// Most recent order id at snapshot time
    #[serde(default)]
    pub latest_order_id: Option<i64>,
}

/// Balance of a single asset.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceInfo {
    /// Amount available for trading
    pub available: Decimal,
    /// Total amount including holds
    pub total: Decimal,
    /// Amount locked in open orders (crypto assets only)
    #[serde(default)]
    pub amount_open_orders: Option<u64>,
}

/// Per-asset withdrawal limits.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalLimit {
    /// Remaining daily allowance
    pub available: Decimal,
    /// Daily limit
    pub total: Decimal,
}

/// `get_account_info` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    /// Balance per asset key (e.g., "brl", "btc")
    pub balance: HashMap<String, BalanceInfo>,
    /// Withdrawal limits per asset key
    #[serde(default)]
    pub withdrawal_limits: HashMap<String, WithdrawalLimit>,
}

/// `list_orders` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    /// Matching orders
    pub orders: Vec<Order>,
}

/// Payload wrapper for operations returning a single order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    /// The order
    pub order: Order,
}

/// `list_orderbook` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderbookResponse {
    /// The book snapshot
    pub orderbook: Orderbook,
}

/// Optional filters for `list_orders`.
///
/// Fields left unset are omitted from the wire parameters entirely; they
/// are never sent as null or empty values.
#[derive(Debug, Clone, Default)]
pub struct ListOrdersFilter {
    /// Restrict to one side
    pub order_type: Option<OrderSide>,
    /// Restrict to these statuses
    pub status_list: Option<Vec<OrderStatus>>,
    /// Restrict to orders with/without fills
    pub has_fills: Option<bool>,
    /// Lowest order id to include
    pub from_id: Option<i64>,
    /// Highest order id to include
    pub to_id: Option<i64>,
    /// Earliest creation time (epoch seconds)
    pub from_timestamp: Option<i64>,
    /// Latest creation time (epoch seconds)
    pub to_timestamp: Option<i64>,
}

impl ListOrdersFilter {
    /// Create an empty filter (no optional keys on the wire).
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one side.
    pub fn with_order_type(mut self, side: OrderSide) -> Self {
        self.order_type = Some(side);
        self
    }

    /// Restrict to these statuses.
    pub fn with_status_list(mut self, statuses: Vec<OrderStatus>) -> Self {
        self.status_list = Some(statuses);
        self
    }

    /// Restrict to orders with/without fills.
    pub fn with_has_fills(mut self, has_fills: bool) -> Self {
        self.has_fills = Some(has_fills);
        self
    }

    /// Restrict to an order-id range.
    pub fn with_id_range(mut self, from_id: i64, to_id: i64) -> Self {
        self.from_id = Some(from_id);
        self.to_id = Some(to_id);
        self
    }

    /// Restrict to a creation-time range (epoch seconds).
    pub fn with_timestamp_range(mut self, from_timestamp: i64, to_timestamp: i64) -> Self {
        self.from_timestamp = Some(from_timestamp);
        self.to_timestamp = Some(to_timestamp);
        self
    }

    /// Append the supplied filters to the wire parameters, in a stable
    /// order, skipping everything unset.
    pub(crate) fn append_to(&self, params: &mut Vec<(String, String)>) {
        if let Some(side) = self.order_type {
            params.push(("order_type".to_string(), side.code().to_string()));
        }
        if let Some(ref statuses) = self.status_list {
            // Serialized as JSON int array text, e.g. "[2,3]"
            let codes = statuses
                .iter()
                .map(|s| s.code().to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("status_list".to_string(), format!("[{codes}]")));
        }
        if let Some(has_fills) = self.has_fills {
            params.push(("has_fills".to_string(), bool_str(has_fills).to_string()));
        }
        if let Some(from_id) = self.from_id {
            params.push(("from_id".to_string(), from_id.to_string()));
        }
        if let Some(to_id) = self.to_id {
            params.push(("to_id".to_string(), to_id.to_string()));
        }
        if let Some(from_timestamp) = self.from_timestamp {
            params.push(("from_timestamp".to_string(), from_timestamp.to_string()));
        }
        if let Some(to_timestamp) = self.to_timestamp {
            params.push(("to_timestamp".to_string(), to_timestamp.to_string()));
        }
    }
}
