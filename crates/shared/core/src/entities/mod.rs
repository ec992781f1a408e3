mod hedge_flag;
mod notify;
mod order;
mod order_status;
mod order_type;
mod query;
mod side;

pub use hedge_flag::HedgeFlag;
pub use notify::{OrderDealNotify, OrderStatusNotify};
pub use order::Order;
pub use order_status::{OrderStatus, SubmitStatus};
pub use order_type::OrderType;
pub use query::OrderQuery;
pub use side::{Direction, OffsetAction, PositionSide};
