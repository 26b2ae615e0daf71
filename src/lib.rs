pub mod auth;
pub mod categories;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod date_time_provider;
pub mod db_utils;
pub mod entities;
pub mod goals;
pub mod money;
pub mod mpesa;
pub mod notifications;
pub mod reports;
pub mod response;
pub mod spending_limits;
pub mod state;
pub mod suggestions;
pub mod tokens;
pub mod transactions;
pub mod users;
pub mod validations;

#[cfg(test)]
pub mod test_utils;
