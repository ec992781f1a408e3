//! Client domain ⇄ CTP record translation
//!
//! Pure functions only: no locks, no I/O. Everything the functions need
//! (account ids, references, the current trading day) is passed in.

use super::wire::{
    ActionFlag, InputOrder, InputOrderAction, MAX_ORDER_SYS_ID_LEN, OffsetFlag, OrderField,
    OrderPriceType, OrderSubmitStatus, QryOrder, RequestId, TradeField, WireDirection,
    WireHedgeFlag, WireOrderStatus,
};
use crate::error::{GatewayError, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tradegate_core::{
    Direction, HedgeFlag, OffsetAction, Order, OrderDealNotify, OrderQuery, OrderStatus,
    OrderStatusNotify, OrderType, SubmitStatus, TimestampMs, join_instrument, split_instrument,
};

/// Source protocol name stamped on orders rebuilt from broker records
pub const MARKET: &str = "ctp";

/// Instrument class of everything traded through CTP
pub const INSTRUMENT_TYPE: &str = "future";

/// Exchange local time (China Standard Time)
const EXCHANGE_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Broker account fields copied onto every outbound record
#[derive(Debug, Clone, Copy)]
pub struct Account<'a> {
    pub broker_id: &'a str,
    pub investor_id: &'a str,
}

/// The parsed, validated trading terms of a client order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerms {
    pub order_type: OrderType,
    pub direction: Direction,
    pub hedge_flag: HedgeFlag,
    pub volume: i32,
}

impl OrderTerms {
    /// Parse the client strings of an order
    pub fn parse(order: &Order) -> Result<Self> {
        let order_type: OrderType = order.order_type.parse()?;
        let direction: Direction = order.dir.parse()?;
        let hedge_flag = HedgeFlag::parse_or_default(&order.hedge_flag)?;
        let volume = volume_from_amount(order.amount)?;

        Ok(Self {
            order_type,
            direction,
            hedge_flag,
            volume,
        })
    }
}

/// Whole number of contracts that fits the wire volume type
fn volume_from_amount(amount: Decimal) -> Result<i32> {
    if amount <= Decimal::ZERO || !amount.fract().is_zero() {
        return Err(GatewayError::Validation(format!(
            "amount must be a positive whole number, got {amount}"
        )));
    }
    amount
        .to_i32()
        .ok_or_else(|| GatewayError::Validation(format!("amount {amount} is too large")))
}

pub fn order_type_to_wire(order_type: OrderType) -> OrderPriceType {
    match order_type {
        OrderType::Limit => OrderPriceType::LimitPrice,
        OrderType::Market => OrderPriceType::AnyPrice,
    }
}

pub fn order_type_from_wire(price_type: OrderPriceType) -> OrderType {
    match price_type {
        OrderPriceType::AnyPrice => OrderType::Market,
        _ => OrderType::Limit,
    }
}

pub fn hedge_flag_to_wire(flag: HedgeFlag) -> WireHedgeFlag {
    match flag {
        HedgeFlag::Speculation => WireHedgeFlag::Speculation,
        HedgeFlag::Arbitrage => WireHedgeFlag::Arbitrage,
        HedgeFlag::Hedge => WireHedgeFlag::Hedge,
        HedgeFlag::MarketMaker => WireHedgeFlag::MarketMaker,
    }
}

pub fn hedge_flag_from_wire(flag: WireHedgeFlag) -> HedgeFlag {
    match flag {
        WireHedgeFlag::Speculation => HedgeFlag::Speculation,
        WireHedgeFlag::Arbitrage => HedgeFlag::Arbitrage,
        WireHedgeFlag::Hedge => HedgeFlag::Hedge,
        WireHedgeFlag::MarketMaker => HedgeFlag::MarketMaker,
    }
}

/// Direction to (buy/sell, offset flag)
pub fn direction_to_wire(direction: Direction) -> (WireDirection, OffsetFlag) {
    let side = if direction.is_buy() {
        WireDirection::Buy
    } else {
        WireDirection::Sell
    };
    let offset = match direction.action {
        OffsetAction::Open => OffsetFlag::Open,
        OffsetAction::Close => OffsetFlag::Close,
        OffsetAction::CloseToday => OffsetFlag::CloseToday,
        OffsetAction::CloseYesterday => OffsetFlag::CloseYesterday,
    };
    (side, offset)
}

/// Every close flavour other than today/yesterday reads back as `close`
pub fn direction_from_wire(side: WireDirection, offset: OffsetFlag) -> Direction {
    let action = match offset {
        OffsetFlag::Open => OffsetAction::Open,
        OffsetFlag::CloseToday => OffsetAction::CloseToday,
        OffsetFlag::CloseYesterday => OffsetAction::CloseYesterday,
        _ => OffsetAction::Close,
    };
    Direction::from_buy(action, side == WireDirection::Buy)
}

pub fn order_status_from_wire(status: WireOrderStatus) -> OrderStatus {
    match status {
        WireOrderStatus::PartTradedQueueing | WireOrderStatus::PartTradedNotQueueing => {
            OrderStatus::PartiallyFilled
        }
        WireOrderStatus::AllTraded => OrderStatus::FullyFilled,
        WireOrderStatus::Canceled => OrderStatus::Canceled,
        _ => OrderStatus::Unknown,
    }
}

pub fn submit_status_from_wire(status: OrderSubmitStatus) -> SubmitStatus {
    match status {
        OrderSubmitStatus::InsertSubmitted
        | OrderSubmitStatus::CancelSubmitted
        | OrderSubmitStatus::ModifySubmitted => SubmitStatus::Submitted,
        OrderSubmitStatus::Accepted => SubmitStatus::Accepted,
        OrderSubmitStatus::InsertRejected
        | OrderSubmitStatus::CancelRejected
        | OrderSubmitStatus::ModifyRejected => SubmitStatus::Rejected,
    }
}

/// `<investor>_<trading day>_<order sys id>`, empty while the exchange has
/// not assigned a sys id
pub fn outside_id(investor_id: &str, trading_day: &str, order_sys_id: &str) -> String {
    if order_sys_id.is_empty() {
        return String::new();
    }
    format!("{investor_id}_{trading_day}_{order_sys_id}")
}

/// `<investor>_<trading day>_<trade id>`
pub fn outside_trade_id(investor_id: &str, trading_day: &str, trade_id: &str) -> String {
    if trade_id.is_empty() {
        return String::new();
    }
    format!("{investor_id}_{trading_day}_{trade_id}")
}

/// Recover the order sys id: everything after the last underscore
pub fn order_sys_id_from_outside_id(outside_id: &str) -> Option<&str> {
    let (_, sys_id) = outside_id.rsplit_once('_')?;
    (!sys_id.is_empty() && sys_id.len() <= MAX_ORDER_SYS_ID_LEN).then_some(sys_id)
}

/// Build the insert record for a validated order
pub fn insert_order_to_wire(
    order: &Order,
    terms: &OrderTerms,
    account: Account<'_>,
    order_ref: &str,
    request_id: RequestId,
) -> InputOrder {
    let (direction, offset) = direction_to_wire(terms.direction);
    InputOrder {
        broker_id: account.broker_id.to_string(),
        investor_id: account.investor_id.to_string(),
        user_id: account.investor_id.to_string(),
        exchange_id: order.exchange.clone(),
        instrument_id: join_instrument(&order.symbol, &order.contract),
        order_ref: order_ref.to_string(),
        order_price_type: order_type_to_wire(terms.order_type),
        direction,
        comb_offset_flag: offset,
        comb_hedge_flag: hedge_flag_to_wire(terms.hedge_flag),
        limit_price: to_wire_price(order.price),
        volume_total_original: terms.volume,
        min_volume: 1,
        stop_price: 0.0,
        is_auto_suspend: 0,
        request_id,
        ..Default::default()
    }
}

/// Build the delete action for an acknowledged order
pub fn cancel_order_to_wire(
    order: &Order,
    account: Account<'_>,
    order_sys_id: &str,
    order_action_ref: i32,
    request_id: RequestId,
) -> InputOrderAction {
    InputOrderAction {
        broker_id: account.broker_id.to_string(),
        investor_id: account.investor_id.to_string(),
        user_id: account.investor_id.to_string(),
        order_action_ref,
        request_id,
        exchange_id: order.exchange.clone(),
        order_sys_id: order_sys_id.to_string(),
        instrument_id: join_instrument(&order.symbol, &order.contract),
        action_flag: ActionFlag::Delete,
        ..Default::default()
    }
}

/// Build the query record; filters that are missing or malformed are left open
pub fn query_to_wire(query: &OrderQuery, account: Account<'_>) -> QryOrder {
    QryOrder {
        broker_id: account.broker_id.to_string(),
        investor_id: account.investor_id.to_string(),
        exchange_id: query.exchange().unwrap_or_default().to_string(),
        instrument_id: query
            .instrument()
            .map(|(symbol, contract)| join_instrument(symbol, contract))
            .unwrap_or_default(),
        order_sys_id: query
            .outside_id()
            .and_then(order_sys_id_from_outside_id)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Overlay an echoed insert record onto the order the client sent
///
/// `base` is the correlated client order, or a default order when the
/// acknowledgement could not be correlated.
pub fn order_from_input(input: &InputOrder, base: Order, now_ms: TimestampMs) -> Order {
    let (symbol, contract) = split_instrument(&input.instrument_id);
    let direction = direction_from_wire(input.direction, input.comb_offset_flag);
    Order {
        market: MARKET.to_string(),
        exchange: input.exchange_id.clone(),
        instrument_type: INSTRUMENT_TYPE.to_string(),
        symbol: symbol.to_string(),
        contract: contract.to_string(),
        contract_id: contract.to_string(),
        order_type: order_type_from_wire(input.order_price_type).to_string(),
        dir: direction.to_string(),
        hedge_flag: hedge_flag_from_wire(input.comb_hedge_flag).to_string(),
        price: from_wire_price(input.limit_price),
        amount: Decimal::from(input.volume_total_original),
        total_price: Decimal::ZERO,
        ts: now_ms,
        ..base
    }
}

/// Rebuild the client view of an order push or query record
pub fn order_from_wire(field: &OrderField) -> (Order, OrderStatusNotify) {
    let (symbol, contract) = split_instrument(&field.instrument_id);
    let direction = direction_from_wire(field.direction, field.comb_offset_flag);
    let order = Order {
        market: MARKET.to_string(),
        exchange: field.exchange_id.clone(),
        instrument_type: INSTRUMENT_TYPE.to_string(),
        symbol: symbol.to_string(),
        contract: contract.to_string(),
        contract_id: contract.to_string(),
        order_type: order_type_from_wire(field.order_price_type).to_string(),
        dir: direction.to_string(),
        hedge_flag: hedge_flag_from_wire(field.comb_hedge_flag).to_string(),
        price: from_wire_price(field.limit_price),
        amount: Decimal::from(field.volume_total_original),
        total_price: Decimal::ZERO,
        ts: exchange_timestamp_ms(&field.insert_date, &field.insert_time),
        outside_id: outside_id(&field.investor_id, &field.trading_day, &field.order_sys_id),
    };
    let status = OrderStatusNotify {
        order_status: order_status_from_wire(field.order_status),
        submit_status: submit_status_from_wire(field.order_submit_status),
        amount: Decimal::from(field.volume_total_original),
        dealed_amount: Decimal::from(field.volume_traded),
    };
    (order, status)
}

/// Rebuild the client view of a trade push
pub fn deal_from_wire(trade: &TradeField) -> (Order, OrderDealNotify) {
    let (symbol, contract) = split_instrument(&trade.instrument_id);
    let direction = direction_from_wire(trade.direction, trade.offset_flag);
    let order = Order {
        market: MARKET.to_string(),
        exchange: trade.exchange_id.clone(),
        instrument_type: INSTRUMENT_TYPE.to_string(),
        symbol: symbol.to_string(),
        contract: contract.to_string(),
        contract_id: contract.to_string(),
        dir: direction.to_string(),
        hedge_flag: hedge_flag_from_wire(trade.hedge_flag).to_string(),
        outside_id: outside_id(&trade.investor_id, &trade.trading_day, &trade.order_sys_id),
        ..Default::default()
    };
    let deal = OrderDealNotify {
        price: from_wire_price(trade.price),
        amount: Decimal::from(trade.volume),
        trading_day: trade.trading_day.clone(),
        trade_id: outside_trade_id(&trade.investor_id, &trade.trading_day, &trade.trade_id),
        ts: exchange_timestamp_ms(&trade.trade_date, &trade.trade_time),
    };
    (order, deal)
}

/// Rebuild the order a cancel acknowledgement refers to
pub fn order_from_action(action: &InputOrderAction, trading_day: &str) -> Order {
    let (symbol, contract) = split_instrument(&action.instrument_id);
    Order {
        market: MARKET.to_string(),
        exchange: action.exchange_id.clone(),
        instrument_type: INSTRUMENT_TYPE.to_string(),
        symbol: symbol.to_string(),
        contract: contract.to_string(),
        contract_id: contract.to_string(),
        outside_id: outside_id(&action.investor_id, trading_day, &action.order_sys_id),
        ..Default::default()
    }
}

/// `YYYYMMDD` + `HH:MM:SS` exchange local time to Unix milliseconds, 0 if unparsable
pub fn exchange_timestamp_ms(date: &str, time: &str) -> TimestampMs {
    let Ok(date) = NaiveDate::parse_from_str(date, "%Y%m%d") else {
        return 0;
    };
    let Ok(time) = NaiveTime::parse_from_str(time, "%H:%M:%S") else {
        return 0;
    };
    let Some(offset) = FixedOffset::east_opt(EXCHANGE_UTC_OFFSET_SECS) else {
        return 0;
    };
    NaiveDateTime::new(date, time)
        .and_local_timezone(offset)
        .single()
        .map_or(0, |dt| dt.timestamp_millis())
}

fn to_wire_price(price: Decimal) -> f64 {
    price.to_f64().unwrap_or_default()
}

fn from_wire_price(price: f64) -> Decimal {
    Decimal::from_f64(price).unwrap_or_default()
}
