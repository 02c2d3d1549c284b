pub mod gateway;
pub mod imps;
pub mod upi;

pub use gateway::{GatewayClient, GatewayRegistry, GatewayResult, PayoutInstruction, StatusLookup};
pub use imps::ImpsClient;
pub use upi::UpiClient;
