use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, DbConn, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait};
use uuid::Uuid;

use crate::{date_time_provider::DynDateTimeProvider, entities::{goals, prelude::*}, money::to_minor};

use {error::*, models::*};

pub mod error;
pub mod models;
pub mod routes;

#[cfg(test)]
mod test;

pub type DynGoalService = Arc<dyn GoalService + Send + Sync>;

#[async_trait]
pub trait GoalService {
    async fn get_goals(&self, user_id: Uuid) -> Result<Vec<GoalModel>>;
    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<GoalModel>;
    async fn create_goal(&self, user_id: Uuid, req: CreateGoalModel) -> Result<GoalModel>;
    async fn update_goal(&self, user_id: Uuid, goal_id: Uuid, req: UpdateGoalModel) -> Result<GoalModel>;
    /// Adds `amount` to the goal's saved amount; negative amounts withdraw
    async fn add_progress(&self, user_id: Uuid, goal_id: Uuid, amount: rust_decimal::Decimal) -> Result<GoalModel>;
    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<()>;
}

pub struct DbConnGoalService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
}

impl DbConnGoalService {
    pub fn new_dyn(db: DbConn, dt_provider: DynDateTimeProvider) -> DynGoalService {
        Arc::new(Self { db, dt_provider })
    }

    fn today(&self) -> NaiveDate {
        self.dt_provider.utc_now().date_naive()
    }
}

#[async_trait]
impl GoalService for DbConnGoalService {
    async fn get_goals(&self, user_id: Uuid) -> Result<Vec<GoalModel>> {
        let today = self.today();
        let goals = Goals::find()
            .filter(goals::Column::UserId.eq(user_id))
            .order_by_desc(goals::Column::CreatedOnUtc)
            .all(&self.db).await?;

        Ok(goals.into_iter().map(|goal| GoalModel::from_entity(goal, today)).collect())
    }

    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<GoalModel> {
        let goal = find_owned_goal(&self.db, user_id, goal_id).await?;
        Ok(GoalModel::from_entity(goal, self.today()))
    }

    async fn create_goal(&self, user_id: Uuid, req: CreateGoalModel) -> Result<GoalModel> {
        let now = self.dt_provider.utc_now();
        let valid = validate_goal(req, now.date_naive())?;

        let new_goal = goals::Model {
            id: Uuid::now_v7(),
            user_id,
            name: valid.name,
            target_amount: valid.target_amount,
            current_amount: 0,
            start_date: valid.start_date,
            deadline: valid.deadline,
            icon: valid.icon,
            created_on_utc: now,
        };
        Goals::insert(goals::ActiveModel {
            id: Set(new_goal.id),
            user_id: Set(new_goal.user_id),
            name: Set(new_goal.name.clone()),
            target_amount: Set(new_goal.target_amount),
            current_amount: Set(new_goal.current_amount),
            start_date: Set(new_goal.start_date),
            deadline: Set(new_goal.deadline),
            icon: Set(new_goal.icon.clone()),
            created_on_utc: Set(new_goal.created_on_utc),
        }).exec(&self.db).await?;

        Ok(GoalModel::from_entity(new_goal, now.date_naive()))
    }

    async fn update_goal(&self, user_id: Uuid, goal_id: Uuid, req: UpdateGoalModel) -> Result<GoalModel> {
        let today = self.today();
        let tx = self.db.begin().await?;
        let ex_goal = find_owned_goal(&tx, user_id, goal_id).await?;
        let req = UpdateGoalModel { start_date: req.start_date.or(Some(ex_goal.start_date)), ..req };
        let valid = validate_goal(req, today)?;

        let mut ex_goal = ex_goal.into_active_model();
        ex_goal.name = Set(valid.name);
        ex_goal.target_amount = Set(valid.target_amount);
        ex_goal.start_date = Set(valid.start_date);
        ex_goal.deadline = Set(valid.deadline);
        ex_goal.icon = Set(valid.icon);
        let updated = Goals::update(ex_goal).exec(&tx).await?;
        tx.commit().await?;

        Ok(GoalModel::from_entity(updated, today))
    }

    async fn add_progress(&self, user_id: Uuid, goal_id: Uuid, amount: rust_decimal::Decimal) -> Result<GoalModel> {
        let delta = to_minor(amount)
            .filter(|delta| *delta != 0)
            .ok_or(Error::InvalidProgressAmount(amount))?;

        let tx = self.db.begin().await?;
        let ex_goal = find_owned_goal(&tx, user_id, goal_id).await?;
        let current_amount = ex_goal.current_amount.checked_add(delta)
            .filter(|am| *am >= 0)
            .ok_or(Error::InvalidProgressAmount(amount))?;

        let mut ex_goal = ex_goal.into_active_model();
        ex_goal.current_amount = Set(current_amount);
        let updated = Goals::update(ex_goal).exec(&tx).await?;
        tx.commit().await?;

        Ok(GoalModel::from_entity(updated, self.today()))
    }

    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<()> {
        let res = Goals::delete_many()
            .filter(goals::Column::Id.eq(goal_id))
            .filter(goals::Column::UserId.eq(user_id))
            .exec(&self.db).await?;

        if res.rows_affected == 0 {
            return Err(Error::GoalNotFound(goal_id));
        }
        Ok(())
    }
}

struct ValidGoal {
    name: String,
    target_amount: i64,
    start_date: NaiveDate,
    deadline: Option<NaiveDate>,
    icon: String,
}

fn validate_goal(req: CreateGoalModel, today: NaiveDate) -> Result<ValidGoal> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    let target_amount = to_minor(req.target_amount)
        .filter(|am| *am > 0)
        .ok_or(Error::InvalidTargetAmount(req.target_amount))?;

    let start_date = req.start_date.unwrap_or(today);
    if req.deadline.is_some_and(|deadline| deadline < start_date) {
        return Err(Error::DeadlineBeforeStart);
    }

    Ok(ValidGoal {
        name,
        target_amount,
        start_date,
        deadline: req.deadline,
        icon: req.icon
            .filter(|icon| !icon.trim().is_empty())
            .unwrap_or(DEFAULT_GOAL_ICON.to_string()),
    })
}

async fn find_owned_goal(conn: &impl ConnectionTrait, user_id: Uuid, goal_id: Uuid) -> Result<goals::Model> {
    Goals::find_by_id(goal_id)
        .filter(goals::Column::UserId.eq(user_id))
        .one(conn).await?
        .ok_or(Error::GoalNotFound(goal_id))
}
