use alloy_primitives::{Address, B256};
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use otc_abi::IOtcSwap;
use otc_types::{Order, OrderEvent, OrderEventKind, OrderStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("log has no topics")]
    MissingTopic,
    #[error("unknown event signature {0}")]
    UnknownSignature(B256),
    #[error("log was removed by a reorg")]
    Removed,
    #[error("abi decoding failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),
}

pub fn event_signature(kind: OrderEventKind) -> B256 {
    match kind {
        OrderEventKind::Created => IOtcSwap::OrderCreated::SIGNATURE_HASH,
        OrderEventKind::Filled => IOtcSwap::OrderFilled::SIGNATURE_HASH,
        OrderEventKind::Canceled => IOtcSwap::OrderCanceled::SIGNATURE_HASH,
        OrderEventKind::CleanedUp => IOtcSwap::OrderCleanedUp::SIGNATURE_HASH,
        OrderEventKind::Retry => IOtcSwap::RetryOrder::SIGNATURE_HASH,
    }
}

fn kind_for_signature(signature: &B256) -> Option<OrderEventKind> {
    OrderEventKind::REPLAY_ORDER.into_iter().find(|kind| event_signature(*kind) == *signature)
}

/// Turns a raw contract log into a typed event.
pub fn decode_order_log(log: &Log) -> Result<OrderEvent, DecodeError> {
    if log.removed {
        return Err(DecodeError::Removed);
    }
    let data = &log.inner.data;
    let signature = data.topics().first().ok_or(DecodeError::MissingTopic)?;
    let kind = kind_for_signature(signature).ok_or(DecodeError::UnknownSignature(*signature))?;

    let event = match kind {
        OrderEventKind::Created => {
            let e = IOtcSwap::OrderCreated::decode_log_data(data, true)?;
            OrderEvent::Created(Order {
                id: e.orderId,
                maker: e.maker,
                taker: e.taker,
                sell_token: e.sellToken,
                sell_amount: e.sellAmount,
                buy_token: e.buyToken,
                buy_amount: e.buyAmount,
                timestamp: e.timestamp.saturating_to(),
                status: OrderStatus::Active,
                tries: 0,
                order_creation_fee: e.orderCreationFee,
            })
        }
        OrderEventKind::Filled => {
            let e = IOtcSwap::OrderFilled::decode_log_data(data, true)?;
            OrderEvent::Filled { id: e.orderId, taker: e.taker, timestamp: e.timestamp.saturating_to() }
        }
        OrderEventKind::Canceled => {
            let e = IOtcSwap::OrderCanceled::decode_log_data(data, true)?;
            OrderEvent::Canceled { id: e.orderId, timestamp: e.timestamp.saturating_to() }
        }
        OrderEventKind::CleanedUp => {
            let e = IOtcSwap::OrderCleanedUp::decode_log_data(data, true)?;
            OrderEvent::CleanedUp { id: e.orderId, timestamp: e.timestamp.saturating_to() }
        }
        OrderEventKind::Retry => {
            let e = IOtcSwap::RetryOrder::decode_log_data(data, true)?;
            OrderEvent::Retry {
                old_id: e.oldOrderId,
                new_id: e.newOrderId,
                maker: e.maker,
                tries: e.tries.saturating_to(),
                timestamp: e.timestamp.saturating_to(),
            }
        }
    };
    Ok(event)
}

#[cfg(test)]
pub(crate) fn rpc_log(address: Address, data: alloy_primitives::LogData) -> Log {
    Log { inner: alloy_primitives::Log { address, data }, ..Default::default() }
}

#[cfg(test)]
mod test {
    use alloy_primitives::U256;

    use super::*;

    const CONTRACT: Address = Address::repeat_byte(0xcc);

    #[test]
    fn test_decode_created() {
        let event = IOtcSwap::OrderCreated {
            orderId: U256::from(12),
            maker: Address::repeat_byte(1),
            taker: Address::ZERO,
            sellToken: Address::repeat_byte(2),
            sellAmount: U256::from(1_000),
            buyToken: Address::repeat_byte(3),
            buyAmount: U256::from(3_000),
            timestamp: U256::from(1_700_000_000u64),
            orderCreationFee: U256::from(7),
        };
        let log = rpc_log(CONTRACT, event.encode_log_data());

        match decode_order_log(&log).unwrap() {
            OrderEvent::Created(order) => {
                assert_eq!(order.id, U256::from(12));
                assert_eq!(order.sell_amount, U256::from(1_000));
                assert_eq!(order.timestamp, 1_700_000_000);
                assert_eq!(order.status, OrderStatus::Active);
                assert_eq!(order.order_creation_fee, U256::from(7));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_retry() {
        let event = IOtcSwap::RetryOrder {
            oldOrderId: U256::from(1),
            newOrderId: U256::from(2),
            maker: Address::repeat_byte(1),
            tries: U256::from(3),
            timestamp: U256::from(99),
        };
        let decoded = decode_order_log(&rpc_log(CONTRACT, event.encode_log_data())).unwrap();
        assert_eq!(
            decoded,
            OrderEvent::Retry { old_id: U256::from(1), new_id: U256::from(2), maker: Address::repeat_byte(1), tries: 3, timestamp: 99 }
        );
    }

    #[test]
    fn test_reject_foreign_and_removed_logs() {
        let foreign = alloy_primitives::LogData::new_unchecked(vec![B256::repeat_byte(9)], Default::default());
        assert!(matches!(decode_order_log(&rpc_log(CONTRACT, foreign)), Err(DecodeError::UnknownSignature(_))));

        let empty = alloy_primitives::LogData::new_unchecked(vec![], Default::default());
        assert!(matches!(decode_order_log(&rpc_log(CONTRACT, empty)), Err(DecodeError::MissingTopic)));

        let canceled = IOtcSwap::OrderCanceled { orderId: U256::from(1), maker: Address::ZERO, timestamp: U256::ZERO };
        let mut removed = rpc_log(CONTRACT, canceled.encode_log_data());
        removed.removed = true;
        assert!(matches!(decode_order_log(&removed), Err(DecodeError::Removed)));
    }

    #[test]
    fn test_signatures_are_distinct() {
        for kind in OrderEventKind::REPLAY_ORDER {
            assert_eq!(kind_for_signature(&event_signature(kind)), Some(kind));
        }
    }
}
