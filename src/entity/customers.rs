use sea_orm::entity::prelude::*;

use crate::models::Alternates;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub email: String,
    /// Canonical form of `email`; unique per store, the identity matching key.
    pub email_normalized: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub alternative_names: Alternates,
    #[sea_orm(column_type = "JsonBinary")]
    pub alternative_emails: Alternates,
    #[sea_orm(column_type = "JsonBinary")]
    pub alternative_phones: Alternates,
    #[sea_orm(column_type = "JsonBinary")]
    pub alternative_addresses: Alternates,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stores::Entity",
        from = "Column::StoreId",
        to = "super::stores::Column::Id"
    )]
    Stores,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::returns::Entity")]
    Returns,
}

impl Related<super::stores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stores.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::returns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Returns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
