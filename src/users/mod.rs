pub mod error;
pub mod models;
pub mod photo;
pub mod routes;


use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use sea_orm::{ColumnTrait, ConnectionTrait, DbConn, EntityTrait, IntoActiveModel, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use crate::{date_time_provider::DynDateTimeProvider, entities::{prelude::Users, users}, tokens::password_hasher::DynPasswordHasher, validations::{validate_email, validate_password}};

use {error::*, models::*, photo::to_profile_jpeg};

pub const SUPPORTED_DATE_FORMATS: [&str; 3] = ["MM/DD/YYYY", "DD/MM/YYYY", "YYYY-MM-DD"];

pub type DynUserService = Arc<dyn UserService + Send + Sync>;

#[async_trait]
pub trait UserService {
    async fn create_user(&self, req: CreateUserRequestModel) -> Result<UserResponseModel>;
    async fn get_user(&self, user_id: Uuid) -> Result<UserResponseModel>;
    async fn update_user(&self, user_id: Uuid, req: UpdateUserRequestModel) -> Result<UserResponseModel>;
    async fn change_password(&self, user_id: Uuid, req: ChangePasswordRequestModel) -> Result<()>;
    async fn get_preferences(&self, user_id: Uuid) -> Result<PreferencesModel>;
    async fn update_preferences(&self, user_id: Uuid, req: PreferencesModel) -> Result<PreferencesModel>;
    /// Stores the image as the user's profile photo, replacing any previous one
    async fn update_photo(&self, user_id: Uuid, image: Vec<u8>) -> Result<UserResponseModel>;
    /// The stored photo as JPEG bytes
    async fn get_photo(&self, user_id: Uuid) -> Result<Vec<u8>>;
}

pub struct DbConnUserService {
    db: DbConn,
    password_hasher: DynPasswordHasher,
    dt_provider: DynDateTimeProvider,
}

#[async_trait]
impl UserService for DbConnUserService {
    async fn create_user(&self, req: CreateUserRequestModel) -> Result<UserResponseModel> {
        validate_email(&req.email)?;
        validate_password(&req.password)?;
        let (first_name, last_name) = validate_names(&req.first_name, &req.last_name)?;

        let tx = self.db.begin().await?;

        // Check if there's a user that already has the existing email before continuing
        let fmt_email = req.email.trim().to_lowercase();
        ensure_email_free(&tx, &fmt_email, None).await?;

        let password_hash = self.password_hasher.hash_password(&req.password)?;
        let new_user = users::Model { 
            id: Uuid::now_v7(), 
            first_name,
            last_name,
            email: fmt_email, 
            password_hash, 
            currency: DEFAULT_CURRENCY.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            photo: None,
            created_on_utc: self.dt_provider.utc_now(),
        };
        Users::insert(users::ActiveModel {
            id: Set(new_user.id),
            first_name: Set(new_user.first_name.clone()),
            last_name: Set(new_user.last_name.clone()),
            email: Set(new_user.email.clone()),
            password_hash: Set(new_user.password_hash.clone()),
            currency: Set(new_user.currency.clone()),
            date_format: Set(new_user.date_format.clone()),
            photo: Set(None),
            created_on_utc: Set(new_user.created_on_utc),
        }).exec(&tx).await?;

        tx.commit().await?;

        info!("Registered user {}", new_user.id);
        Ok(new_user.into())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<UserResponseModel> {
        let user = Users::find_by_id(user_id).one(&self.db).await?;
        user.map(|user| user.into()).ok_or(Error::UserNotFound(user_id))
    }

    async fn update_user(&self, user_id: Uuid, req: UpdateUserRequestModel) -> Result<UserResponseModel> {
        validate_email(&req.email)?;
        let (first_name, last_name) = validate_names(&req.first_name, &req.last_name)?;
        let fmt_email = req.email.trim().to_lowercase();

        let tx = self.db.begin().await?;
        let user = Users::find_by_id(user_id).one(&tx).await?
            .ok_or(Error::UserNotFound(user_id))?;
        ensure_email_free(&tx, &fmt_email, Some(user_id)).await?;

        let mut user = user.into_active_model();
        user.first_name = Set(first_name);
        user.last_name = Set(last_name);
        user.email = Set(fmt_email);

        let user = Users::update(user).exec(&tx).await?;
        tx.commit().await?;

        Ok(user.into())
    }

    async fn change_password(&self, user_id: Uuid, req: ChangePasswordRequestModel) -> Result<()> {
        let user = Users::find_by_id(user_id).one(&self.db).await?
            .ok_or(Error::UserNotFound(user_id))?;

        if !self.password_hasher.verify_password(&req.current_password, &user.password_hash)? {
            return Err(Error::IncorrectPassword);
        }
        validate_password(&req.new_password)?;

        let password_hash = self.password_hasher.hash_password(&req.new_password)?;
        let mut user = user.into_active_model();
        user.password_hash = Set(password_hash);
        Users::update(user).exec(&self.db).await?;

        Ok(())
    }

    async fn get_preferences(&self, user_id: Uuid) -> Result<PreferencesModel> {
        let user = Users::find_by_id(user_id).one(&self.db).await?
            .ok_or(Error::UserNotFound(user_id))?;

        Ok(PreferencesModel { currency: user.currency, date_format: user.date_format })
    }

    async fn update_preferences(&self, user_id: Uuid, req: PreferencesModel) -> Result<PreferencesModel> {
        let currency = req.currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidCurrency(req.currency));
        }
        if !SUPPORTED_DATE_FORMATS.contains(&req.date_format.as_str()) {
            return Err(Error::InvalidDateFormat(req.date_format));
        }

        let user = Users::find_by_id(user_id).one(&self.db).await?
            .ok_or(Error::UserNotFound(user_id))?;
        let mut user = user.into_active_model();
        user.currency = Set(currency);
        user.date_format = Set(req.date_format);
        let user = Users::update(user).exec(&self.db).await?;

        Ok(PreferencesModel { currency: user.currency, date_format: user.date_format })
    }

    async fn update_photo(&self, user_id: Uuid, image: Vec<u8>) -> Result<UserResponseModel> {
        let user = Users::find_by_id(user_id).one(&self.db).await?
            .ok_or(Error::UserNotFound(user_id))?;
        let jpeg = to_profile_jpeg(&image)?;

        let mut user = user.into_active_model();
        user.photo = Set(Some(jpeg));
        let user = Users::update(user).exec(&self.db).await?;

        info!("Updated profile photo of user {}", user_id);
        Ok(user.into())
    }

    async fn get_photo(&self, user_id: Uuid) -> Result<Vec<u8>> {
        let user = Users::find_by_id(user_id).one(&self.db).await?
            .ok_or(Error::UserNotFound(user_id))?;

        user.photo.ok_or(Error::PhotoNotFound(user_id))
    }
}

impl DbConnUserService {
    pub fn new_dyn(db: DbConn, password_hasher: DynPasswordHasher, dt_provider: DynDateTimeProvider) -> DynUserService {
        Arc::new(Self { db, password_hasher, dt_provider })
    }
}

fn validate_names(first_name: &str, last_name: &str) -> Result<(String, String)> {
    let (first_name, last_name) = (first_name.trim(), last_name.trim());
    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::EmptyName);
    }
    Ok((first_name.to_string(), last_name.to_string()))
}

async fn ensure_email_free(conn: &impl ConnectionTrait, email: &str, except_user: Option<Uuid>) -> Result<()> {
    let mut query = Users::find().filter(users::Column::Email.eq(email));
    if let Some(user_id) = except_user {
        query = query.filter(users::Column::Id.ne(user_id));
    }

    if query.one(conn).await?.is_some() {
        return Err(Error::EmailInUse(email.to_string()));
    }
    Ok(())
}
