pub mod prelude;

pub mod categories;
pub mod goals;
pub mod notifications;
pub mod sea_orm_active_enums;
pub mod spending_limits;
pub mod transactions;
pub mod users;
