pub mod swagger_config;
