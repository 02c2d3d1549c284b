pub mod db_pool;
pub mod logging;
pub mod scheduler;
pub mod server;
pub mod shutdown;
pub mod tasks;
