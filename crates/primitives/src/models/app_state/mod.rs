pub mod app_config;
pub mod imps_details;
pub mod jwt_details;
pub mod reconciliation_details;
pub mod upi_details;

pub use app_config::*;
pub use imps_details::*;
pub use jwt_details::*;
pub use reconciliation_details::*;
pub use upi_details::*;
