//! REST client for the Mercado Bitcoin trade API (TAPI v3).
//!
//! Every operation is one signed POST to the fixed `/tapi/v3/` path and
//! one response envelope. There is no session, no order cache and no
//! retry at this layer: failures surface as typed results and the caller
//! decides what to do with them.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info};

use crate::config::MercadoBitcoinConfig;
use crate::error::{ApiError, ApiResult};
use crate::tapi::endpoints::{methods, TAPI_PATH};
use crate::tapi::signer::{build_tapi_query, TapiHmacSigner};
use crate::tapi::types::{
    bool_str, AccountInfo, BalanceInfo, ListOrdersFilter, Order, OrderSide, Orderbook,
    OrderbookResponse, OrderResponse, OrdersResponse, TapiResponse,
};

/// Coin pair used when the caller does not name one.
pub const DEFAULT_COIN_PAIR: &str = "BRLBTC";

/// REST client for the TAPI.
///
/// Holds only immutable state (credentials and base URL); independently
/// constructed clients may be used concurrently, and a single instance is
/// safe to share since nothing is mutated after construction.
pub struct TapiClient {
    /// HTTP client
    http_client: reqwest::Client,
    /// Request signer
    signer: Arc<TapiHmacSigner>,
    /// Base URL
    base_url: String,
}

impl TapiClient {
    /// Create a new TAPI client.
    pub fn new(
        http_client: reqwest::Client,
        signer: Arc<TapiHmacSigner>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            signer,
            base_url: base_url.into(),
        }
    }

    /// Build a client from configuration, resolving credentials from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Fails fast with a configuration error when either credential is
    /// missing, before any network call.
    pub fn from_config(config: &MercadoBitcoinConfig) -> ApiResult<Self> {
        let tapi_id = config.auth.load_tapi_id().ok_or_else(|| {
            ApiError::Configuration(format!("{} is not set", config.auth.tapi_id_env))
        })?;
        let tapi_secret = config.auth.load_tapi_secret().ok_or_else(|| {
            ApiError::Configuration(format!("{} is not set", config.auth.tapi_secret_env))
        })?;
        let signer = TapiHmacSigner::new(tapi_id, tapi_secret)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.rest.timeout())
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::new(http_client, Arc::new(signer), config.base_url.clone()))
    }

    // =========================================================================
    // ACCOUNT OPERATIONS
    // =========================================================================

    /// Query account balances, optionally narrowed to `assets`.
    ///
    /// The narrowing happens client-side: the remote `assets` parameter is
    /// known to be unreliable, so the full balance map is fetched and
    /// filtered here regardless of what the server would return.
    pub async fn get_account_info(
        &self,
        assets: Option<&[&str]>,
    ) -> ApiResult<HashMap<String, BalanceInfo>> {
        info!("requesting account information");
        let params = self.base_params(methods::GET_ACCOUNT_INFO);
        let account_info: AccountInfo = self.execute_signed(params).await?;

        let mut balance = account_info.balance;
        if let Some(assets) = assets {
            balance.retain(|asset, _| assets.contains(&asset.as_str()));
        }
        Ok(balance)
    }

    // =========================================================================
    // ORDER OPERATIONS
    // =========================================================================

    /// List orders for a coin pair, optionally filtered.
    ///
    /// Unset filter fields are left off the wire entirely.
    pub async fn list_orders(
        &self,
        coin_pair: &str,
        filter: &ListOrdersFilter,
    ) -> ApiResult<Vec<Order>> {
        debug!("listing orders for {}", coin_pair);
        let mut params = self.base_params(methods::LIST_ORDERS);
        params.push(("coin_pair".to_string(), coin_pair.to_string()));
        filter.append_to(&mut params);

        let response: OrdersResponse = self.execute_signed(params).await?;
        Ok(response.orders)
    }

    /// Fetch a single order.
    pub async fn get_order(&self, coin_pair: &str, order_id: i64) -> ApiResult<Order> {
        debug!("fetching order {} on {}", order_id, coin_pair);
        let mut params = self.base_params(methods::GET_ORDER);
        params.push(("coin_pair".to_string(), coin_pair.to_string()));
        params.push(("order_id".to_string(), order_id.to_string()));

        let response: OrderResponse = self.execute_signed(params).await?;
        Ok(response.order)
    }

    /// Fetch the order book for a coin pair.
    ///
    /// `full` asks the server for the extended book depth; it travels as
    /// the string literal `"true"`/`"false"`.
    pub async fn list_orderbook(&self, coin_pair: &str, full: bool) -> ApiResult<Orderbook> {
        debug!("fetching orderbook for {} (full={})", coin_pair, full);
        let mut params = self.base_params(methods::LIST_ORDERBOOK);
        params.push(("coin_pair".to_string(), coin_pair.to_string()));
        params.push(("full".to_string(), bool_str(full).to_string()));

        let response: OrderbookResponse = self.execute_signed(params).await?;
        Ok(response.orderbook)
    }

    /// Place a limit order.
    ///
    /// The side selects the method tag (`place_buy_order` or
    /// `place_sell_order`). With `asynchronous` set, the server replies
    /// before the matching pass instead of after it.
    pub async fn place_order(
        &self,
        side: OrderSide,
        coin_pair: &str,
        quantity: Decimal,
        limit_price: Decimal,
        asynchronous: bool,
    ) -> ApiResult<Order> {
        info!(
            "placing {} order: {} {} @ {}",
            side, quantity, coin_pair, limit_price
        );
        let mut params = self.base_params(side.method_tag());
        params.push(("coin_pair".to_string(), coin_pair.to_string()));
        params.push(("quantity".to_string(), quantity.to_string()));
        params.push(("limit_price".to_string(), limit_price.to_string()));
        params.push(("async".to_string(), bool_str(asynchronous).to_string()));

        let response: OrderResponse = self.execute_signed(params).await?;
        Ok(response.order)
    }

    /// Cancel an open order.
    pub async fn cancel_order(
        &self,
        coin_pair: &str,
        order_id: i64,
        asynchronous: bool,
    ) -> ApiResult<Order> {
        info!("canceling order {} on {}", order_id, coin_pair);
        let mut params = self.base_params(methods::CANCEL_ORDER);
        params.push(("coin_pair".to_string(), coin_pair.to_string()));
        params.push(("order_id".to_string(), order_id.to_string()));
        params.push(("async".to_string(), bool_str(asynchronous).to_string()));

        let response: OrderResponse = self.execute_signed(params).await?;
        Ok(response.order)
    }

    // =========================================================================
    // INTERNAL METHODS
    // =========================================================================

    /// Start the wire parameters for a method: the tag first, then a nonce
    /// generated fresh for this call. Nonces are never reused across
    /// calls, even within the same batch.
    fn base_params(&self, method: &str) -> Vec<(String, String)> {
        vec![
            ("tapi_method".to_string(), method.to_string()),
            (
                "tapi_nonce".to_string(),
                TapiHmacSigner::tapi_nonce().to_string(),
            ),
        ]
    }

    /// Sign and execute one TAPI call, returning the unwrapped payload.
    async fn execute_signed<T: serde::de::DeserializeOwned>(
        &self,
        params: Vec<(String, String)>,
    ) -> ApiResult<T> {
        // The signature covers the exact string sent as the body: encode
        // once, sign it, send it.
        let body = build_tapi_query(&params);
        let signature = self.signer.sign(TAPI_PATH, &body);
        let url = format!("{}{}", self.base_url, TAPI_PATH);

        debug!("POST {}", TAPI_PATH);

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header(self.signer.id_header(), self.signer.tapi_id())
            .header(self.signer.mac_header(), signature)
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::Connection(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .unwrap_or("unknown reason")
                .to_string();
            error!("TAPI transport failure: HTTP {} {}", status.as_u16(), reason);
            return Err(ApiError::Status {
                code: status.as_u16(),
                reason,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Connection(format!("failed to read response: {e}")))?;

        let envelope: TapiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Parse(format!("failed to parse response: {e}")))?;

        if !envelope.is_success() {
            let message = envelope
                .error_message
                .unwrap_or_else(|| "unknown error".to_string());
            error!(
                "TAPI rejected the call [{}]: {}",
                envelope.status_code, message
            );
            return Err(map_api_error(envelope.status_code, message));
        }

        envelope
            .response_data
            .ok_or_else(|| ApiError::Parse("no response_data in successful envelope".to_string()))
    }
}

/// Map an envelope rejection onto the error taxonomy.
///
/// Rejections of the nonce, signature or identifier surface as
/// authentication errors so callers can tell "fix the credentials or
/// regenerate the nonce" apart from a bad request.
fn map_api_error(code: i32, message: String) -> ApiError {
    let lowered = message.to_lowercase();
    if lowered.contains("nonce")
        || lowered.contains("mac")
        || lowered.contains("tapi-id")
        || lowered.contains("tapi_id")
    {
        ApiError::Authentication { code, message }
    } else {
        ApiError::Api { code, message }
    }
}
