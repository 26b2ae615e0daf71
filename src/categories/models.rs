use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};

use crate::entities::categories;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryModel {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub description: Option<String>,
    pub is_default: bool,
}

impl From<categories::Model> for CategoryModel {
    fn from(value: categories::Model) -> Self {
        CategoryModel { 
            id: value.id, 
            name: value.name, 
            color: value.color, 
            icon: value.icon, 
            description: value.description, 
            is_default: value.is_default,
        }
    }
}

///
/// Body for both creating and updating a category.
/// Missing colors and icons fall back to the defaults.
/// 
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryModel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub type UpdateCategoryModel = CreateCategoryModel;

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkDeleteCategoriesModel {
    #[serde(default)]
    pub ids: Vec<Uuid>,
}
