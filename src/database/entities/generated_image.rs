use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "generated_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub generation_timestamp: NaiveDateTime,
    pub generation_width: i32,
    pub generation_height: i32,
    pub generation_steps: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub generation_prompt: Option<String>,
    pub imgbb_url: String,
    pub imgbb_display_url: String,
    pub imgbb_title: Option<String>,
    pub imgbb_width: i32,
    pub imgbb_height: i32,
    pub imgbb_size: i64,    // 字节数
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
