//! Order adapter: maps a generic [`Order`] onto the venue call for its
//! (type, side) pair.
//!
//! | type   | side | operation          |
//! |--------|------|--------------------|
//! | MARKET | BUY  | enter long         |
//! | MARKET | SELL | enter short        |
//! | LIMIT  | BUY  | enter long limit   |
//! | LIMIT  | SELL | enter short limit  |
//!
//! Any other pair is a configuration error and nothing is submitted.

use crate::domain::error::DispatchError;
use crate::domain::order::{EntryRequest, ExecutionResponse, Order, OrderSide, OrderType};
use crate::ports::venue_port::ExecutionVenue;
use log::info;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueOperation {
    EnterLong,
    EnterShort,
    EnterLongLimit,
    EnterShortLimit,
}

impl VenueOperation {
    fn apply(
        self,
        order: &Order,
        venue: &mut dyn ExecutionVenue,
    ) -> Result<ExecutionResponse, DispatchError> {
        let request = EntryRequest::from(order);
        match self {
            VenueOperation::EnterLong => Ok(venue.enter_long(&request)),
            VenueOperation::EnterShort => Ok(venue.enter_short(&request)),
            VenueOperation::EnterLongLimit => {
                let limit = limit_price(order)?;
                Ok(venue.enter_long_limit(&request, limit))
            }
            VenueOperation::EnterShortLimit => {
                let limit = limit_price(order)?;
                Ok(venue.enter_short_limit(&request, limit))
            }
        }
    }
}

fn limit_price(order: &Order) -> Result<f64, DispatchError> {
    order
        .limit_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| DispatchError::MissingLimitPrice {
            symbol: order.symbol.clone(),
        })
}

#[derive(Debug, Clone)]
pub struct OrderDispatcher {
    table: HashMap<(OrderType, OrderSide), VenueOperation>,
}

impl Default for OrderDispatcher {
    fn default() -> Self {
        let table = HashMap::from([
            ((OrderType::Market, OrderSide::Buy), VenueOperation::EnterLong),
            ((OrderType::Market, OrderSide::Sell), VenueOperation::EnterShort),
            ((OrderType::Limit, OrderSide::Buy), VenueOperation::EnterLongLimit),
            ((OrderType::Limit, OrderSide::Sell), VenueOperation::EnterShortLimit),
        ]);
        OrderDispatcher { table }
    }
}

impl OrderDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_for(&self, order_type: OrderType, side: OrderSide) -> Option<VenueOperation> {
        self.table.get(&(order_type, side)).copied()
    }

    /// Submit `order` through exactly one venue operation.
    pub fn dispatch(
        &self,
        order: &Order,
        venue: &mut dyn ExecutionVenue,
    ) -> Result<ExecutionResponse, DispatchError> {
        let operation = self.operation_for(order.order_type, order.side).ok_or_else(|| {
            DispatchError::UnsupportedOrderType {
                order_type: order.order_type,
                side: order.side,
                symbol: order.symbol.clone(),
            }
        })?;
        info!("submitting order to venue: {:?} via {:?}", order, operation);
        let response = operation.apply(order, venue)?;
        info!("order response: {:?}", response);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{ActiveOrder, OrderId, TimeInForce};

    #[derive(Default)]
    struct RecordingVenue {
        calls: Vec<(VenueOperation, String, i64, Option<f64>)>,
    }

    impl RecordingVenue {
        fn respond(
            &mut self,
            op: VenueOperation,
            req: &EntryRequest,
            limit: Option<f64>,
        ) -> ExecutionResponse {
            self.calls.push((op, req.symbol.clone(), req.quantity, limit));
            let (side, order_type) = match op {
                VenueOperation::EnterLong => (OrderSide::Buy, OrderType::Market),
                VenueOperation::EnterShort => (OrderSide::Sell, OrderType::Market),
                VenueOperation::EnterLongLimit => (OrderSide::Buy, OrderType::Limit),
                VenueOperation::EnterShortLimit => (OrderSide::Sell, OrderType::Limit),
            };
            ExecutionResponse {
                order_id: self.calls.len() as OrderId,
                symbol: req.symbol.clone(),
                side,
                order_type,
                quantity: req.quantity,
                accepted: true,
            }
        }
    }

    impl ExecutionVenue for RecordingVenue {
        fn cash(&self) -> f64 {
            0.0
        }
        fn equity(&self) -> f64 {
            0.0
        }
        fn shares(&self, _symbol: &str) -> i64 {
            0
        }
        fn positions(&self) -> Vec<(String, i64)> {
            vec![]
        }
        fn active_orders(&self) -> Vec<ActiveOrder> {
            vec![]
        }
        fn cancel_order(&mut self, _id: OrderId) -> bool {
            false
        }
        fn enter_long(&mut self, request: &EntryRequest) -> ExecutionResponse {
            self.respond(VenueOperation::EnterLong, request, None)
        }
        fn enter_short(&mut self, request: &EntryRequest) -> ExecutionResponse {
            self.respond(VenueOperation::EnterShort, request, None)
        }
        fn enter_long_limit(
            &mut self,
            request: &EntryRequest,
            limit_price: f64,
        ) -> ExecutionResponse {
            self.respond(VenueOperation::EnterLongLimit, request, Some(limit_price))
        }
        fn enter_short_limit(
            &mut self,
            request: &EntryRequest,
            limit_price: f64,
        ) -> ExecutionResponse {
            self.respond(VenueOperation::EnterShortLimit, request, Some(limit_price))
        }
    }

    fn order(order_type: OrderType, side: OrderSide, limit: Option<f64>) -> Order {
        Order {
            symbol: "VTI".into(),
            side,
            order_type,
            quantity: 5,
            limit_price: limit,
            time_in_force: TimeInForce::GoodTillCanceled,
        }
    }

    #[test]
    fn every_listed_pair_maps_to_one_operation() {
        let cases = [
            (OrderType::Market, OrderSide::Buy, VenueOperation::EnterLong),
            (OrderType::Market, OrderSide::Sell, VenueOperation::EnterShort),
            (OrderType::Limit, OrderSide::Buy, VenueOperation::EnterLongLimit),
            (OrderType::Limit, OrderSide::Sell, VenueOperation::EnterShortLimit),
        ];
        let dispatcher = OrderDispatcher::new();
        for (order_type, side, expected) in cases {
            let mut venue = RecordingVenue::default();
            let limit = (order_type == OrderType::Limit).then_some(101.25);
            let response = dispatcher
                .dispatch(&order(order_type, side, limit), &mut venue)
                .unwrap();
            assert_eq!(venue.calls.len(), 1);
            assert_eq!(venue.calls[0].0, expected);
            assert_eq!(venue.calls[0].2, 5);
            assert_eq!(venue.calls[0].3, limit);
            assert_eq!(response.side, side);
            assert_eq!(response.order_type, order_type);
        }
    }

    #[test]
    fn unlisted_type_is_rejected_without_submission() {
        let dispatcher = OrderDispatcher::new();
        for order_type in [OrderType::Stop, OrderType::StopLimit] {
            for side in [OrderSide::Buy, OrderSide::Sell] {
                let mut venue = RecordingVenue::default();
                let err = dispatcher
                    .dispatch(&order(order_type, side, Some(10.0)), &mut venue)
                    .unwrap_err();
                assert_eq!(
                    err,
                    DispatchError::UnsupportedOrderType {
                        order_type,
                        side,
                        symbol: "VTI".into(),
                    }
                );
                assert!(venue.calls.is_empty());
            }
        }
    }

    #[test]
    fn limit_without_price_is_rejected_without_submission() {
        let dispatcher = OrderDispatcher::new();
        let mut venue = RecordingVenue::default();
        let err = dispatcher
            .dispatch(&order(OrderType::Limit, OrderSide::Buy, None), &mut venue)
            .unwrap_err();
        assert_eq!(err, DispatchError::MissingLimitPrice { symbol: "VTI".into() });
        assert!(venue.calls.is_empty());
    }

    #[test]
    fn table_covers_market_and_limit_only() {
        let dispatcher = OrderDispatcher::new();
        for order_type in [OrderType::Market, OrderType::Limit] {
            for side in [OrderSide::Buy, OrderSide::Sell] {
                assert!(dispatcher.operation_for(order_type, side).is_some());
            }
        }
        assert_eq!(dispatcher.operation_for(OrderType::Stop, OrderSide::Sell), None);
        assert_eq!(dispatcher.operation_for(OrderType::StopLimit, OrderSide::Buy), None);
    }
}
