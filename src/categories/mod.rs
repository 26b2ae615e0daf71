use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use sea_orm::{prelude::{Expr, Uuid}, sea_query::{ExprTrait, Func}, ColumnTrait, Condition, ConnectionTrait, DbConn, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait};

use crate::{db_utils::visible_categories, entities::{categories, prelude::*, spending_limits, transactions}, spending_limits::DynSpendingLimitService};

use {error::*, models::*};

pub mod models;
pub mod error;

pub mod routes;

pub const GENERAL_CATEGORY_NAME: &str = "General";
pub const DEFAULT_CATEGORY_COLOR: &str = "#6c757d";
pub const DEFAULT_CATEGORY_ICON: &str = "fa-tag";

pub type DynCategoryService = Arc<dyn CategoryService + Send + Sync>;

#[async_trait]
pub trait CategoryService {
    /// The user's own categories together with the system-wide defaults
    async fn get_cats(&self, user_id: Uuid) -> Result<Vec<CategoryModel>>;
    async fn get_cat(&self, user_id: Uuid, cat_id: Uuid) -> Result<CategoryModel>;
    async fn create_cat(&self, user_id: Uuid, cat: CreateCategoryModel) -> Result<CategoryModel>;
    async fn update_cat(&self, user_id: Uuid, cat_id: Uuid, cat: UpdateCategoryModel) -> Result<CategoryModel>;
    async fn delete_cat(&self, user_id: Uuid, cat_id: Uuid) -> Result<()>;
    ///
    /// Deletes every listed category the user owns. Defaults and unknown
    /// ids are skipped. Returns the ids that were deleted.
    /// 
    async fn delete_cats(&self, user_id: Uuid, cat_ids: Vec<Uuid>) -> Result<Vec<Uuid>>;
}

pub struct DbConnCategoryService {
    db: DbConn,
    limit_svc: DynSpendingLimitService,
}

#[async_trait]
impl CategoryService for DbConnCategoryService {
    async fn get_cats(&self, user_id: Uuid) -> Result<Vec<CategoryModel>> {
        let cats = Categories::find().filter(visible_categories(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.db).await?;

        Ok(cats.into_iter().map(|cat| cat.into()).collect())
    }

    async fn get_cat(&self, user_id: Uuid, cat_id: Uuid) -> Result<CategoryModel> {
        let cat = Categories::find_by_id(cat_id)
            .filter(visible_categories(user_id))
            .one(&self.db).await?;

        cat.map(|cat| cat.into()).ok_or(Error::CategoryNotFound(cat_id))
    }

    async fn create_cat(&self, user_id: Uuid, create_cat: CreateCategoryModel) -> Result<CategoryModel> {
        // Create new transaction
        let tx = self.db.begin().await?;

        // Remove whitespacing from the cat name
        let fmt_cat_name = create_cat.name.trim().to_string();
        // Validate the category name
        self.validate_cat_name(user_id, None, &fmt_cat_name, &tx).await?;

        let new_cat = categories::Model {
            id: Uuid::now_v7(),
            user_id: Some(user_id),
            name: fmt_cat_name,
            color: create_cat.color.unwrap_or(DEFAULT_CATEGORY_COLOR.to_string()),
            icon: create_cat.icon.unwrap_or(DEFAULT_CATEGORY_ICON.to_string()),
            description: create_cat.description,
            is_default: false,
        };

        Categories::insert(new_cat_active_model(&new_cat)).exec(&tx).await?;
        tx.commit().await?;

        Ok(new_cat.into())
    }

    async fn update_cat(&self, user_id: Uuid, cat_id: Uuid, cat: UpdateCategoryModel) -> Result<CategoryModel> {
        let tx = self.db.begin().await?;

        // Find the category to update
        let ex_cat = Categories::find_by_id(cat_id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(&tx).await?
            .ok_or(Error::CategoryNotFound(cat_id))?;
        if ex_cat.is_default {
            return Err(Error::DefaultCategoryImmutable(cat_id));
        }

        let fmt_cat_name = cat.name.trim().to_string();
        self.validate_cat_name(user_id, Some(cat_id), &fmt_cat_name, &tx).await?;

        // Update the row with each value provided
        let mut ex_cat = ex_cat.into_active_model();
        ex_cat.name = Set(fmt_cat_name);
        if let Some(color) = cat.color { ex_cat.color = Set(color); }
        if let Some(icon) = cat.icon { ex_cat.icon = Set(icon); }
        ex_cat.description = Set(cat.description);
        let updated = Categories::update(ex_cat).exec(&tx).await?;
        tx.commit().await?;

        Ok(updated.into())
    }

    async fn delete_cat(&self, user_id: Uuid, cat_id: Uuid) -> Result<()> {
        // Create a new transaction
        let tx = self.db.begin().await?;
        // Find the category to delete among the user's own
        let cat = Categories::find_by_id(cat_id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(&tx).await?
            .ok_or(Error::CategoryNotFound(cat_id))?;
        if cat.is_default {
            return Err(Error::DefaultCategoryImmutable(cat_id));
        }

        let general = find_or_create_general_cat(&tx, user_id, &[cat_id]).await?;
        remove_cat(&tx, cat, general.id).await?;
        tx.commit().await?;

        self.reevaluate_limits(user_id).await;
        Ok(())
    }

    async fn delete_cats(&self, user_id: Uuid, cat_ids: Vec<Uuid>) -> Result<Vec<Uuid>> {
        if cat_ids.is_empty() {
            return Err(Error::NoCategoryIds);
        }

        let tx = self.db.begin().await?;
        let cats = Categories::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::IsDefault.eq(false))
            .filter(categories::Column::Id.is_in(cat_ids.clone()))
            .all(&tx).await?;

        if cats.is_empty() {
            return Ok(vec![]);
        }

        let general = find_or_create_general_cat(&tx, user_id, &cat_ids).await?;
        let mut deleted = Vec::with_capacity(cats.len());
        for cat in cats {
            deleted.push(cat.id);
            remove_cat(&tx, cat, general.id).await?;
        }
        tx.commit().await?;

        info!("Deleted {} categories for user {}", deleted.len(), user_id);
        self.reevaluate_limits(user_id).await;
        Ok(deleted)
    }
}

impl DbConnCategoryService {
    pub fn new_dyn(db: DbConn, limit_svc: DynSpendingLimitService) -> DynCategoryService {
        Arc::new(DbConnCategoryService { db, limit_svc })
    }

    async fn validate_cat_name(
        &self, 
        user_id: Uuid, 
        cat_id: Option<Uuid>,
        cat_name: &str, 
        tx: &impl ConnectionTrait
    ) -> Result<()> {
        if cat_name.is_empty() {
            return Err(Error::EmptyName);
        }

        // Check if there is a category that already exists
        // for the user, with the provided name
        let mut query = Categories::find().filter(
            Condition::all()
                .add(visible_categories(user_id))
                .add(Func::lower(Expr::col(categories::Column::Name)).eq(cat_name.to_lowercase()))
            );
        if let Some(cat_id) = cat_id {
            query = query.filter(categories::Column::Id.ne(cat_id));
        }

        // If a category matches, return NameReuse error
        if query.one(tx).await?.is_some() {
            return Err(Error::NameReuse(cat_name.to_string()));
        }

        Ok(())
    }    

    async fn reevaluate_limits(&self, user_id: Uuid) {
        if let Err(e) = self.limit_svc.evaluate_limits(user_id).await {
            error!("Could not evaluate spending limits for user {}: {}", user_id, e);
        }
    }
}

///
/// Finds the category that orphaned transactions are moved to: the user's own
/// "General", then a system-wide one, creating the user's own if neither exists.
/// Categories in `excluding` are never returned.
/// 
pub async fn find_or_create_general_cat(
    conn: &impl ConnectionTrait, 
    user_id: Uuid, 
    excluding: &[Uuid],
) -> Result<categories::Model> {
    let own = Categories::find()
        .filter(categories::Column::UserId.eq(user_id))
        .filter(categories::Column::Name.eq(GENERAL_CATEGORY_NAME))
        .filter(categories::Column::Id.is_not_in(excluding.iter().copied()))
        .one(conn).await?;
    if let Some(own) = own {
        return Ok(own);
    }

    let system = Categories::find()
        .filter(categories::Column::UserId.is_null())
        .filter(categories::Column::IsDefault.eq(true))
        .filter(categories::Column::Name.eq(GENERAL_CATEGORY_NAME))
        .one(conn).await?;
    if let Some(system) = system {
        return Ok(system);
    }

    let general = categories::Model {
        id: Uuid::now_v7(),
        user_id: Some(user_id),
        name: GENERAL_CATEGORY_NAME.to_string(),
        color: String::from("#808080"),
        icon: String::from("fa-folder"),
        description: Some(String::from("Default category for uncategorized transactions")),
        is_default: true,
    };
    Categories::insert(new_cat_active_model(&general)).exec(conn).await?;

    info!("Created General category for user {}", user_id);
    Ok(general)
}

///
/// Moves the category's transactions to `general_id`, deactivates the
/// spending limits tracking it and deletes the category
/// 
async fn remove_cat(conn: &impl ConnectionTrait, cat: categories::Model, general_id: Uuid) -> Result<()> {
    Transactions::update_many()
        .filter(transactions::Column::CategoryId.eq(cat.id))
        .col_expr(transactions::Column::CategoryId, Expr::value(general_id))
        .exec(conn).await?;

    SpendingLimits::update_many()
        .filter(spending_limits::Column::CategoryId.eq(cat.id))
        .filter(spending_limits::Column::IsActive.eq(true))
        .col_expr(spending_limits::Column::IsActive, Expr::value(false))
        .exec(conn).await?;

    Categories::delete(cat.into_active_model()).exec(conn).await?;
    Ok(())
}

fn new_cat_active_model(cat: &categories::Model) -> categories::ActiveModel {
    categories::ActiveModel {
        id: Set(cat.id),
        user_id: Set(cat.user_id),
        name: Set(cat.name.clone()),
        color: Set(cat.color.clone()),
        icon: Set(cat.icon.clone()),
        description: Set(cat.description.clone()),
        is_default: Set(cat.is_default),
    }
}
