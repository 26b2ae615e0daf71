pub use super::categories::Entity as Categories;
pub use super::goals::Entity as Goals;
pub use super::notifications::Entity as Notifications;
pub use super::spending_limits::Entity as SpendingLimits;
pub use super::transactions::Entity as Transactions;
pub use super::users::Entity as Users;
