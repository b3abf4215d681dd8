use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    #[sol(rpc)]
    contract Faucet {
        function subscribe(address account) external payable;
        function claim(address account) external;
        function isSubscribed(address account) external view returns (bool);
        function subscriptionCost() external view returns (uint256);
    }

    #[sol(rpc)]
    contract Erc20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

pub fn subscribe_calldata(account: Address) -> Bytes {
    Faucet::subscribeCall { account }.abi_encode().into()
}

pub fn claim_calldata(account: Address) -> Bytes {
    Faucet::claimCall { account }.abi_encode().into()
}

pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    Erc20::transferCall { to, amount }.abi_encode().into()
}
