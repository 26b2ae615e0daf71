use rust_decimal_macros::dec;
use sea_orm::DbConn;
use uuid::Uuid;

use crate::test_utils::*;

use super::{error::Error, models::*, DbConnGoalService, GoalService};

async fn create_test_service() -> anyhow::Result<(DbConnGoalService, DbConn)> {
    let db = create_test_db().await?;
    let svc = DbConnGoalService { 
        db: db.clone(), 
        dt_provider: fixed_dt_provider(test_now(2024, 11, 10)),
    };
    Ok((svc, db))
}

fn vacation() -> CreateGoalModel {
    CreateGoalModel { 
        name: String::from("Vacation"), 
        target_amount: dec!(1000), 
        start_date: None, 
        deadline: Some(test_date(2024, 12, 10)), 
        icon: None,
    }
}

#[tokio::test]
async fn test_create_goal_defaults() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;
    let goal = svc.create_goal(*TEST_USER_1_ID, vacation()).await?;

    assert_eq!(dec!(0), goal.current_amount);
    assert_eq!(test_date(2024, 11, 10), goal.start_date);
    assert_eq!(DEFAULT_GOAL_ICON, goal.icon);
    assert_eq!(Some(30), goal.days_remaining);
    assert_eq!(dec!(1000), goal.remaining_amount);
    assert!(!goal.is_completed);

    Ok(())
}

#[tokio::test]
async fn test_add_progress() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;
    let goal = svc.create_goal(*TEST_USER_1_ID, vacation()).await?;

    let goal = svc.add_progress(*TEST_USER_1_ID, goal.id, dec!(250.5)).await?;
    assert_eq!(dec!(250.5), goal.current_amount);
    assert_eq!(dec!(25.05), goal.progress_percentage);
    assert_eq!(dec!(749.5), goal.remaining_amount);

    let goal = svc.add_progress(*TEST_USER_1_ID, goal.id, dec!(800)).await?;
    assert!(goal.is_completed);
    assert_eq!(dec!(-50.5), goal.remaining_amount);

    // Withdrawing more than was saved
    let res = svc.add_progress(*TEST_USER_1_ID, goal.id, dec!(-2000)).await;
    assert!(matches!(res, Err(Error::InvalidProgressAmount(_))));

    let res = svc.add_progress(*TEST_USER_1_ID, goal.id, dec!(0)).await;
    assert!(matches!(res, Err(Error::InvalidProgressAmount(_))));

    Ok(())
}

#[tokio::test]
async fn test_update_goal_keeps_progress() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;
    let goal = svc.create_goal(*TEST_USER_1_ID, vacation()).await?;
    svc.add_progress(*TEST_USER_1_ID, goal.id, dec!(100)).await?;

    let updated = svc.update_goal(*TEST_USER_1_ID, goal.id, UpdateGoalModel { 
        name: String::from("Trip"), 
        target_amount: dec!(400), 
        start_date: None, 
        deadline: None, 
        icon: Some(String::from("plane")),
    }).await?;

    assert_eq!("Trip", updated.name);
    assert_eq!(dec!(100), updated.current_amount);
    assert_eq!(dec!(25), updated.progress_percentage);
    assert_eq!(test_date(2024, 11, 10), updated.start_date);
    assert_eq!(None, updated.days_remaining);

    Ok(())
}

#[tokio::test]
async fn test_goal_validation() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;

    let mut req = vacation();
    req.target_amount = dec!(0);
    assert!(matches!(svc.create_goal(*TEST_USER_1_ID, req).await, Err(Error::InvalidTargetAmount(_))));

    let mut req = vacation();
    req.name = String::from(" ");
    assert!(matches!(svc.create_goal(*TEST_USER_1_ID, req).await, Err(Error::EmptyName)));

    let mut req = vacation();
    req.deadline = Some(test_date(2024, 11, 1));
    assert!(matches!(svc.create_goal(*TEST_USER_1_ID, req).await, Err(Error::DeadlineBeforeStart)));

    Ok(())
}

#[tokio::test]
async fn test_goals_are_private() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;
    let goal = svc.create_goal(*TEST_USER_1_ID, vacation()).await?;

    assert!(svc.get_goals(*TEST_USER_2_ID).await?.is_empty());
    let res = svc.get_goal(*TEST_USER_2_ID, goal.id).await;
    assert!(matches!(res, Err(Error::GoalNotFound(id)) if id == goal.id));
    let res = svc.delete_goal(*TEST_USER_2_ID, goal.id).await;
    assert!(matches!(res, Err(Error::GoalNotFound(_))));

    svc.delete_goal(*TEST_USER_1_ID, goal.id).await?;
    let res = svc.get_goal(*TEST_USER_1_ID, goal.id).await;
    assert!(matches!(res, Err(Error::GoalNotFound(_))));

    let missing = Uuid::now_v7();
    let res = svc.add_progress(*TEST_USER_1_ID, missing, dec!(5)).await;
    assert!(matches!(res, Err(Error::GoalNotFound(id)) if id == missing));

    Ok(())
}
