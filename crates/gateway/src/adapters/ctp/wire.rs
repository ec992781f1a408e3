//! CTP trader API records
//!
//! Field names serialize to the vendor spelling (`BrokerID`, `OrderRef`, ...)
//! so audit lines read like the broker's own logs. Single-character flags
//! are enums that serialize as their wire character.

use serde::{Deserialize, Serialize};

/// Request id passed with every session call and echoed in its responses
pub type RequestId = i32;

/// Longest order system id the exchange assigns
pub const MAX_ORDER_SYS_ID_LEN: usize = 20;

macro_rules! wire_flag {
    (
        $(#[$meta:meta])*
        $name:ident {
            #[default] $default:ident = $default_code:literal,
            $($variant:ident = $code:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "char", try_from = "char")]
        pub enum $name {
            #[default]
            $default,
            $($variant,)*
        }

        impl $name {
            /// Wire character
            pub fn code(self) -> char {
                match self {
                    Self::$default => $default_code,
                    $(Self::$variant => $code,)*
                }
            }
        }

        impl From<$name> for char {
            fn from(flag: $name) -> char {
                flag.code()
            }
        }

        impl TryFrom<char> for $name {
            type Error = String;

            fn try_from(code: char) -> Result<Self, Self::Error> {
                match code {
                    $default_code => Ok(Self::$default),
                    $($code => Ok(Self::$variant),)*
                    other => Err(format!("invalid {} code {:?}", stringify!($name), other)),
                }
            }
        }
    };
}

wire_flag! {
    /// `TThostFtdcOrderPriceTypeType`
    OrderPriceType {
        #[default] LimitPrice = '2',
        AnyPrice = '1',
        BestPrice = '3',
        LastPrice = '4',
    }
}

wire_flag! {
    /// `TThostFtdcDirectionType`
    WireDirection {
        #[default] Buy = '0',
        Sell = '1',
    }
}

wire_flag! {
    /// `TThostFtdcOffsetFlagType`
    OffsetFlag {
        #[default] Open = '0',
        Close = '1',
        ForceClose = '2',
        CloseToday = '3',
        CloseYesterday = '4',
        ForceOff = '5',
        LocalForceClose = '6',
    }
}

wire_flag! {
    /// `TThostFtdcHedgeFlagType`
    WireHedgeFlag {
        #[default] Speculation = '1',
        Arbitrage = '2',
        Hedge = '3',
        MarketMaker = '5',
    }
}

wire_flag! {
    /// `TThostFtdcOrderStatusType`
    WireOrderStatus {
        #[default] Unknown = 'a',
        AllTraded = '0',
        PartTradedQueueing = '1',
        PartTradedNotQueueing = '2',
        NoTradeQueueing = '3',
        NoTradeNotQueueing = '4',
        Canceled = '5',
        NotTouched = 'b',
        Touched = 'c',
    }
}

wire_flag! {
    /// `TThostFtdcOrderSubmitStatusType`
    OrderSubmitStatus {
        #[default] InsertSubmitted = '0',
        CancelSubmitted = '1',
        ModifySubmitted = '2',
        Accepted = '3',
        InsertRejected = '4',
        CancelRejected = '5',
        ModifyRejected = '6',
    }
}

wire_flag! {
    /// `TThostFtdcTimeConditionType`
    TimeCondition {
        #[default] GoodForDay = '3',
        ImmediateOrCancel = '1',
        GoodForSection = '2',
        GoodTillDate = '4',
        GoodTillCanceled = '5',
    }
}

wire_flag! {
    /// `TThostFtdcVolumeConditionType`
    VolumeCondition {
        #[default] AnyVolume = '1',
        MinVolume = '2',
        CompleteVolume = '3',
    }
}

wire_flag! {
    /// `TThostFtdcContingentConditionType`
    ContingentCondition {
        #[default] Immediately = '1',
        Touch = '2',
        TouchProfit = '3',
    }
}

wire_flag! {
    /// `TThostFtdcForceCloseReasonType`
    ForceCloseReason {
        #[default] NotForceClose = '0',
        LackDeposit = '1',
        ClientOverPositionLimit = '2',
        MemberOverPositionLimit = '3',
    }
}

wire_flag! {
    /// `TThostFtdcActionFlagType`
    ActionFlag {
        #[default] Delete = '0',
        Modify = '3',
    }
}

/// `CThostFtdcRspInfoField`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RspInfo {
    #[serde(rename = "ErrorID")]
    pub error_id: i32,
    #[serde(rename = "ErrorMsg")]
    pub error_msg: String,
}

impl RspInfo {
    pub fn is_error(&self) -> bool {
        self.error_id != 0
    }
}

/// Common trailer of every response callback
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RspHeader {
    pub info: Option<RspInfo>,
    pub request_id: RequestId,
    pub is_last: bool,
}

impl RspHeader {
    pub fn new(info: Option<RspInfo>, request_id: RequestId, is_last: bool) -> Self {
        Self {
            info,
            request_id,
            is_last,
        }
    }

    /// Broker error code, 0 when no error info was attached
    pub fn error_id(&self) -> i32 {
        self.info.as_ref().map_or(0, |info| info.error_id)
    }

    pub fn error_msg(&self) -> &str {
        self.info.as_ref().map_or("", |info| info.error_msg.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.error_id() != 0
    }
}

/// `CThostFtdcReqAuthenticateField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReqAuthenticate {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub user_product_info: String,
    pub auth_code: String,
    #[serde(rename = "AppID")]
    pub app_id: String,
}

/// `CThostFtdcRspAuthenticateField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RspAuthenticate {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub user_product_info: String,
    #[serde(rename = "AppID")]
    pub app_id: String,
}

/// `CThostFtdcReqUserLoginField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReqUserLogin {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub user_product_info: String,
}

/// `CThostFtdcRspUserLoginField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RspUserLogin {
    pub trading_day: String,
    pub login_time: String,
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub system_name: String,
    #[serde(rename = "FrontID")]
    pub front_id: i32,
    #[serde(rename = "SessionID")]
    pub session_id: i32,
    pub max_order_ref: String,
}

/// `CThostFtdcUserLogoutField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLogout {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
}

/// `CThostFtdcSettlementInfoConfirmField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettlementInfoConfirm {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    pub confirm_date: String,
    pub confirm_time: String,
}

/// `CThostFtdcInputOrderField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputOrder {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    pub order_ref: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub order_price_type: OrderPriceType,
    pub direction: WireDirection,
    pub comb_offset_flag: OffsetFlag,
    pub comb_hedge_flag: WireHedgeFlag,
    pub limit_price: f64,
    pub volume_total_original: i32,
    pub time_condition: TimeCondition,
    pub volume_condition: VolumeCondition,
    pub min_volume: i32,
    pub contingent_condition: ContingentCondition,
    pub stop_price: f64,
    pub force_close_reason: ForceCloseReason,
    pub is_auto_suspend: i32,
    #[serde(rename = "RequestID")]
    pub request_id: RequestId,
    #[serde(rename = "ExchangeID")]
    pub exchange_id: String,
}

/// `CThostFtdcInputOrderActionField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputOrderAction {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    pub order_action_ref: i32,
    pub order_ref: String,
    #[serde(rename = "RequestID")]
    pub request_id: RequestId,
    #[serde(rename = "FrontID")]
    pub front_id: i32,
    #[serde(rename = "SessionID")]
    pub session_id: i32,
    #[serde(rename = "ExchangeID")]
    pub exchange_id: String,
    #[serde(rename = "OrderSysID")]
    pub order_sys_id: String,
    pub action_flag: ActionFlag,
    pub limit_price: f64,
    pub volume_change: i32,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
}

/// `CThostFtdcQryOrderField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QryOrder {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    #[serde(rename = "ExchangeID")]
    pub exchange_id: String,
    #[serde(rename = "OrderSysID")]
    pub order_sys_id: String,
}

/// `CThostFtdcOrderField`, pushed on every order state change and returned
/// by order queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderField {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    pub order_ref: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub order_price_type: OrderPriceType,
    pub direction: WireDirection,
    pub comb_offset_flag: OffsetFlag,
    pub comb_hedge_flag: WireHedgeFlag,
    pub limit_price: f64,
    pub volume_total_original: i32,
    #[serde(rename = "RequestID")]
    pub request_id: RequestId,
    #[serde(rename = "ExchangeID")]
    pub exchange_id: String,
    #[serde(rename = "OrderSysID")]
    pub order_sys_id: String,
    pub order_submit_status: OrderSubmitStatus,
    pub trading_day: String,
    pub insert_date: String,
    pub insert_time: String,
    pub order_status: WireOrderStatus,
    pub volume_traded: i32,
    pub volume_total: i32,
    #[serde(rename = "FrontID")]
    pub front_id: i32,
    #[serde(rename = "SessionID")]
    pub session_id: i32,
    pub status_msg: String,
}

/// `CThostFtdcTradeField`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradeField {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    pub order_ref: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "ExchangeID")]
    pub exchange_id: String,
    #[serde(rename = "TradeID")]
    pub trade_id: String,
    pub direction: WireDirection,
    #[serde(rename = "OrderSysID")]
    pub order_sys_id: String,
    pub offset_flag: OffsetFlag,
    pub hedge_flag: WireHedgeFlag,
    pub price: f64,
    pub volume: i32,
    pub trade_date: String,
    pub trade_time: String,
    pub trading_day: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_serialize_as_wire_chars() {
        assert_eq!(serde_json::to_value(OrderPriceType::AnyPrice).unwrap(), "1");
        assert_eq!(serde_json::to_value(WireHedgeFlag::MarketMaker).unwrap(), "5");
        assert_eq!(serde_json::to_value(WireOrderStatus::Unknown).unwrap(), "a");

        let status: WireOrderStatus = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(status, WireOrderStatus::PartTradedQueueing);
        assert!(serde_json::from_str::<WireDirection>("\"9\"").is_err());
    }

    #[test]
    fn test_insert_defaults() {
        let req = InputOrder::default();
        assert_eq!(req.time_condition.code(), '3');
        assert_eq!(req.volume_condition.code(), '1');
        assert_eq!(req.contingent_condition.code(), '1');
        assert_eq!(req.force_close_reason.code(), '0');
        assert_eq!(req.comb_hedge_flag, WireHedgeFlag::Speculation);
    }

    #[test]
    fn test_records_use_vendor_field_names() {
        let order = OrderField {
            order_sys_id: "     123".to_string(),
            front_id: 1,
            ..Default::default()
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["OrderSysID"], "     123");
        assert_eq!(value["FrontID"], 1);
        assert_eq!(value["VolumeTotalOriginal"], 0);
        assert_eq!(value["OrderStatus"], "a");
    }

    #[test]
    fn test_login_request_hides_password() {
        let req = ReqUserLogin {
            password: "secret".to_string(),
            ..Default::default()
        };
        let line = serde_json::to_string(&req).unwrap();
        assert!(!line.contains("secret"));
    }

    #[test]
    fn test_header_without_info() {
        let header = RspHeader::new(None, 4, true);
        assert_eq!(header.error_id(), 0);
        assert_eq!(header.error_msg(), "");
        assert!(!header.is_error());
    }
}
