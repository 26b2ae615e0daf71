use sea_orm::{sea_query::TableCreateStatement, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Schema};
use uuid::Uuid;

use crate::entities::{categories, prelude::*};

///
/// Creates every table used by the server, skipping the ones that already exist
/// 
pub async fn create_tables(db: &impl ConnectionTrait) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut stmts: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(Users),
        schema.create_table_from_entity(Categories),
        schema.create_table_from_entity(Transactions),
        schema.create_table_from_entity(SpendingLimits),
        schema.create_table_from_entity(Notifications),
        schema.create_table_from_entity(Goals),
    ];

    for stmt in stmts.iter_mut() {
        stmt.if_not_exists();
        db.execute(backend.build(&*stmt)).await?;
    }

    Ok(())
}

///
/// Finds a category the user is allowed to use: either one they own,
/// or a system-wide default
/// 
pub async fn find_visible_category(
    conn: &impl ConnectionTrait, 
    user_id: Uuid, 
    category_id: Uuid
) -> Result<categories::Model, DbUtilsError> {
    let cat = Categories::find_by_id(category_id)
        .filter(visible_categories(user_id))
        .one(conn).await?;

    cat.ok_or(DbUtilsError::CategoryNotVisible(user_id, category_id))
}

/// Matches categories owned by the user and system-wide defaults
pub fn visible_categories(user_id: Uuid) -> Condition {
    Condition::any()
        .add(categories::Column::UserId.eq(user_id))
        .add(
            Condition::all()
                .add(categories::Column::UserId.is_null())
                .add(categories::Column::IsDefault.eq(true))
        )
}

#[derive(Debug, thiserror::Error)]
pub enum DbUtilsError {
    #[error("Database error occurred: {0}")]
    DbErr(#[from] sea_orm::DbErr),
    #[error("User {0} cannot use category {1}")]
    CategoryNotVisible(Uuid, Uuid),
}
