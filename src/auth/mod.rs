pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;


use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter};

use crate::{
    entities::{prelude::Users, users}, 
    tokens::{password_hasher::DynPasswordHasher, token_service::DynTokenService}, 
    users::{models::{CreateUserRequestModel, UserResponseModel}, DynUserService}, 
    validations::validate_email,
};

use {error::*, models::*};

pub type DynAuthService = Arc<dyn AuthService + Send + Sync>;

#[async_trait]
pub trait AuthService {
    async fn register(&self, req: CreateUserRequestModel) -> Result<UserResponseModel>;
    async fn login(&self, req: LoginModel) -> Result<LoginResponseModel>;
}

pub struct CoreAuthService {
    db: DbConn,
    user_svc: DynUserService,
    token_svc: DynTokenService,
    password_hasher: DynPasswordHasher,
}

impl CoreAuthService {
    pub fn new_dyn(
        db: DbConn, 
        user_svc: DynUserService, 
        token_svc: DynTokenService, 
        password_hasher: DynPasswordHasher,
    ) -> DynAuthService {
        Arc::new(Self { db, user_svc, token_svc, password_hasher })
    }
}

#[async_trait]
impl AuthService for CoreAuthService {
    async fn register(&self, req: CreateUserRequestModel) -> Result<UserResponseModel> {
        Ok(self.user_svc.create_user(req).await?)
    }

    async fn login(&self, req: LoginModel) -> Result<LoginResponseModel> {
        validate_email(&req.email)?;
        let fmt_email = req.email.trim().to_lowercase();

        let user = Users::find()
            .filter(users::Column::Email.eq(fmt_email.clone()))
            .one(&self.db).await?
            .ok_or(Error::InvalidCredentials)?;

        // Unknown emails and wrong passwords are indistinguishable to the caller
        if !self.password_hasher.verify_password(&req.password, &user.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        let token = self.token_svc.generate_access_token(user.id, &user.email)?;
        info!("User {} logged in", user.id);

        Ok(LoginResponseModel { token: token.contents, email: user.email })
    }
}
