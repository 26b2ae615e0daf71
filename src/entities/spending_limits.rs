use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::LimitPeriod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "spending_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// `None` for a limit over all categories
    pub category_id: Option<Uuid>,
    /// Minor units (cents)
    pub limit_amount: i64,
    pub period: LimitPeriod,
    /// Hundredths, ie. 80 is a threshold of 0.80
    pub notification_threshold: i64,
    /// Spend recorded by the last evaluation, in minor units
    pub current_spent: i64,
    /// First day of the period window `current_spent` was evaluated in
    pub evaluated_from: Option<Date>,
    pub is_active: bool,
    pub created_on_utc: DateTimeUtc,
    pub updated_on_utc: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
