use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use sea_orm::{Database, DbConn, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    date_time_provider::{DynDateTimeProvider, MockDateTimeProvider}, 
    db_utils::create_tables, 
    entities::{categories, prelude::*, sea_orm_active_enums::TransactionType, transactions, users},
};

lazy_static! {
    pub static ref TEST_USER_1_ID: Uuid = Uuid::parse_str("be5ca263-2307-4e5a-acbd-3281fb81ea60").unwrap();
    pub static ref TEST_USER_2_ID: Uuid = Uuid::parse_str("e8411903-c326-4ffe-9dd0-cb766b9299e4").unwrap();
    pub static ref TEST_CAT_1_ID: Uuid = Uuid::parse_str("c8be0f8e-629e-46ce-9e76-e691caa0714b").unwrap();
    pub static ref TEST_CAT_2_ID: Uuid = Uuid::parse_str("0fd2a2ce-cce1-43c4-a69d-8b1b523f0127").unwrap();
    pub static ref TEST_DEFAULT_CAT_ID: Uuid = Uuid::parse_str("2dd9ffbe-5d15-401f-b637-7f3e2de9bf1f").unwrap();
    pub static ref TEST_USER_2_CAT_ID: Uuid = Uuid::parse_str("f017369e-9dd1-4434-b197-40361cc0dbcd").unwrap();
}

///
/// In-memory database with two users. User 1 owns "Food" and "Transport",
/// user 2 owns "Hobbies", and "Utilities" is a system-wide default.
/// 
pub async fn create_test_db() -> anyhow::Result<DbConn> {
    let db = Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;

    for (id, email) in [(*TEST_USER_1_ID, "user1@mail.com"), (*TEST_USER_2_ID, "user2@mail.com")] {
        let new_user = users::ActiveModel {
            id: Set(id),
            first_name: Set(String::from("Test")),
            last_name: Set(String::from("User")),
            email: Set(String::from(email)),
            password_hash: Set(String::from("password")),
            currency: Set(String::from("USD")),
            date_format: Set(String::from("MM/DD/YYYY")),
            photo: Set(None),
            created_on_utc: Set(Utc::now()),
        };
        Users::insert(new_user).exec(&db).await?;
    }

    let cats = [
        (*TEST_CAT_1_ID, Some(*TEST_USER_1_ID), "Food", false),
        (*TEST_CAT_2_ID, Some(*TEST_USER_1_ID), "Transport", false),
        (*TEST_USER_2_CAT_ID, Some(*TEST_USER_2_ID), "Hobbies", false),
        (*TEST_DEFAULT_CAT_ID, None, "Utilities", true),
    ];
    Categories::insert_many(cats.into_iter().map(|(id, user_id, name, is_default)| {
        categories::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            name: Set(String::from(name)),
            color: Set(String::from("#6c757d")),
            icon: Set(String::from("tag")),
            description: Set(None),
            is_default: Set(is_default),
        }
    })).exec(&db).await?;

    Ok(db)
}

pub async fn insert_test_tx(
    db: &DbConn, 
    user_id: Uuid, 
    category_id: Option<Uuid>, 
    amount: i64, 
    date: NaiveDate, 
    tx_type: TransactionType,
) -> anyhow::Result<Uuid> {
    let id = Uuid::now_v7();
    let tx = transactions::ActiveModel {
        id: Set(id),
        user_id: Set(user_id),
        category_id: Set(category_id),
        description: Set(String::from("test transaction")),
        amount: Set(amount),
        date: Set(date),
        tx_type: Set(tx_type),
        created_on_utc: Set(Utc::now()),
    };
    Transactions::insert(tx).exec(db).await?;
    Ok(id)
}

pub fn test_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn test_now(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

/// Date/time provider that always reports `now`
pub fn fixed_dt_provider(now: DateTime<Utc>) -> DynDateTimeProvider {
    let mut dt_provider = MockDateTimeProvider::new();
    dt_provider.expect_utc_now().returning(move || now);
    Arc::new(dt_provider)
}
