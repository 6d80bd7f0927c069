use alloy_sol_macro::sol;

sol! {
    #[sol(abi=true,rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IOtcSwap {
        event OrderCreated(
            uint256 indexed orderId,
            address indexed maker,
            address indexed taker,
            address sellToken,
            uint256 sellAmount,
            address buyToken,
            uint256 buyAmount,
            uint256 timestamp,
            uint256 orderCreationFee
        );
        event OrderFilled(
            uint256 indexed orderId,
            address indexed maker,
            address indexed taker,
            address sellToken,
            uint256 sellAmount,
            address buyToken,
            uint256 buyAmount,
            uint256 timestamp
        );
        event OrderCanceled(uint256 indexed orderId, address indexed maker, uint256 timestamp);
        event OrderCleanedUp(uint256 indexed orderId, address indexed maker, uint256 timestamp);
        event RetryOrder(uint256 indexed oldOrderId, uint256 indexed newOrderId, address indexed maker, uint256 tries, uint256 timestamp);

        function ORDER_EXPIRY() external view returns (uint256);
        function GRACE_PERIOD() external view returns (uint256);

        function fillOrder(uint256 orderId) external;
        function cancelOrder(uint256 orderId) external;
        function cleanUpOrders() external;
    }
}
