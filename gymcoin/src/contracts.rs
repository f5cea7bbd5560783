//! ABI bindings for the GymCoin token and UserProfile registry contracts.

use alloy_sol_types::sol;

sol! {
    /// GymCoin: ERC-20 style token bought and sold against ETH at
    /// owner-configured integer rates.
    interface IGymCoin {
        function balanceOf(address account) external view returns (uint256 balance);
        function sellRate() external view returns (uint256 rate);
        function buyRate() external view returns (uint256 rate);
        function divisor() external view returns (uint256 value);

        function buy(uint256 amount) external payable;
        function sell(uint256 amount) external;
        function transfer(address to, uint256 amount) external returns (bool success);
        function setRates(uint256 newSellRate, uint256 newBuyRate) external;
    }

    /// UserProfile: one username/email pair per wallet.
    interface IUserProfile {
        function registerUser(string username, string email) external;
        function updateProfile(string username, string email) external;
        function getUser(address wallet) external view returns (string username, string email, address account);
    }
}
