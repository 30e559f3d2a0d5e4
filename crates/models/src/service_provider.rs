use std::cmp::Ordering;

use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait, EntityTrait};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors, user};

/// Operational status of a provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

impl ProviderStatus {
    pub const ALLOWED: [&'static str; 3] = ["active", "inactive", "suspended"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Active => "active",
            ProviderStatus::Inactive => "inactive",
            ProviderStatus::Suspended => "suspended",
        }
    }

    /// Exact, case-sensitive match against the allowed values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProviderStatus::Active),
            "inactive" => Some(ProviderStatus::Inactive),
            "suspended" => Some(ProviderStatus::Suspended),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_provider")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owner; stamped at creation and never changed.
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: f64,
    pub status: ProviderStatus,
    pub is_verified: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ---------------------------------------------------------------------------
// Field catalogue used by list queries
// ---------------------------------------------------------------------------

/// Queryable field of a service provider, addressable by JSON or column name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    User,
    Name,
    Description,
    Category,
    Email,
    Phone,
    Address,
    Rating,
    Status,
    IsVerified,
    CreatedAt,
    UpdatedAt,
}

/// A field value cast to the field's storage type.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Uuid(Uuid),
    Text(String),
    Float(f64),
    Bool(bool),
    Time(DateTimeWithTimeZone),
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Id,
        Field::User,
        Field::Name,
        Field::Description,
        Field::Category,
        Field::Email,
        Field::Phone,
        Field::Address,
        Field::Rating,
        Field::Status,
        Field::IsVerified,
        Field::CreatedAt,
        Field::UpdatedAt,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let f = match name {
            "id" | "_id" => Field::Id,
            "user" | "user_id" | "userId" => Field::User,
            "name" => Field::Name,
            "description" => Field::Description,
            "category" => Field::Category,
            "email" => Field::Email,
            "phone" => Field::Phone,
            "address" => Field::Address,
            "rating" => Field::Rating,
            "status" => Field::Status,
            "isVerified" | "is_verified" => Field::IsVerified,
            "createdAt" | "created_at" => Field::CreatedAt,
            "updatedAt" | "updated_at" => Field::UpdatedAt,
            _ => return None,
        };
        Some(f)
    }

    /// Key under which the field appears in serialized records.
    pub fn json_name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::User => "user",
            Field::Name => "name",
            Field::Description => "description",
            Field::Category => "category",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Address => "address",
            Field::Rating => "rating",
            Field::Status => "status",
            Field::IsVerified => "isVerified",
            Field::CreatedAt => "createdAt",
            Field::UpdatedAt => "updatedAt",
        }
    }

    pub fn column(self) -> Column {
        match self {
            Field::Id => Column::Id,
            Field::User => Column::UserId,
            Field::Name => Column::Name,
            Field::Description => Column::Description,
            Field::Category => Column::Category,
            Field::Email => Column::Email,
            Field::Phone => Column::Phone,
            Field::Address => Column::Address,
            Field::Rating => Column::Rating,
            Field::Status => Column::Status,
            Field::IsVerified => Column::IsVerified,
            Field::CreatedAt => Column::CreatedAt,
            Field::UpdatedAt => Column::UpdatedAt,
        }
    }

    /// Cast a raw query-string value to this field's type.
    pub fn parse_value(self, raw: &str) -> Result<FieldValue, errors::ModelError> {
        let raw = raw.trim();
        let cast_err = || errors::ModelError::Validation(format!("invalid value `{}` for field {}", raw, self.json_name()));
        match self {
            Field::Id | Field::User => Uuid::parse_str(raw).map(FieldValue::Uuid).map_err(|_| cast_err()),
            Field::Rating => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(FieldValue::Float(v)),
                _ => Err(cast_err()),
            },
            Field::IsVerified => match raw {
                "true" | "1" => Ok(FieldValue::Bool(true)),
                "false" | "0" => Ok(FieldValue::Bool(false)),
                _ => Err(cast_err()),
            },
            Field::CreatedAt | Field::UpdatedAt => DateTime::parse_from_rfc3339(raw)
                .map(FieldValue::Time)
                .map_err(|_| cast_err()),
            Field::Name
            | Field::Description
            | Field::Category
            | Field::Email
            | Field::Phone
            | Field::Address
            | Field::Status => Ok(FieldValue::Text(raw.to_string())),
        }
    }

    pub fn value_of(self, m: &Model) -> FieldValue {
        let opt_text = |v: &Option<String>| v.clone().map(FieldValue::Text).unwrap_or(FieldValue::Null);
        match self {
            Field::Id => FieldValue::Uuid(m.id),
            Field::User => FieldValue::Uuid(m.user_id),
            Field::Name => FieldValue::Text(m.name.clone()),
            Field::Description => opt_text(&m.description),
            Field::Category => opt_text(&m.category),
            Field::Email => opt_text(&m.email),
            Field::Phone => opt_text(&m.phone),
            Field::Address => opt_text(&m.address),
            Field::Rating => FieldValue::Float(m.rating),
            Field::Status => FieldValue::Text(m.status.as_str().to_string()),
            Field::IsVerified => FieldValue::Bool(m.is_verified),
            Field::CreatedAt => FieldValue::Time(m.created_at),
            Field::UpdatedAt => FieldValue::Time(m.updated_at),
        }
    }
}

impl FieldValue {
    /// Ordering between values of the same kind; `None` across kinds or with `Null`.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (FieldValue::Time(a), FieldValue::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<FieldValue> for sea_orm::Value {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Null => sea_orm::Value::String(None),
            FieldValue::Uuid(u) => u.into(),
            FieldValue::Text(s) => s.into(),
            FieldValue::Float(f) => f.into(),
            FieldValue::Bool(b) => b.into(),
            FieldValue::Time(t) => t.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation and persistence
// ---------------------------------------------------------------------------

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let n = name.trim();
    if n.is_empty() {
        return Err(errors::ModelError::Validation("please add a name".into()));
    }
    if n.chars().count() > 100 {
        return Err(errors::ModelError::Validation("name can not be more than 100 characters".into()));
    }
    Ok(())
}

pub fn validate_description(d: &str) -> Result<(), errors::ModelError> {
    if d.chars().count() > 1000 {
        return Err(errors::ModelError::Validation("description can not be more than 1000 characters".into()));
    }
    Ok(())
}

pub fn validate_email(e: &str) -> Result<(), errors::ModelError> {
    if !e.contains('@') || e.trim().len() > 255 {
        return Err(errors::ModelError::Validation("please add a valid email".into()));
    }
    Ok(())
}

pub fn validate_phone(p: &str) -> Result<(), errors::ModelError> {
    if p.chars().count() > 32 {
        return Err(errors::ModelError::Validation("phone number can not be longer than 32 characters".into()));
    }
    Ok(())
}

pub fn validate_rating(r: f64) -> Result<(), errors::ModelError> {
    if !(0.0..=5.0).contains(&r) {
        return Err(errors::ModelError::Validation("rating must be between 0 and 5".into()));
    }
    Ok(())
}

/// Insert payload. The owner comes from the authenticated requester.
#[derive(Clone, Debug)]
pub struct NewServiceProvider {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: f64,
    pub status: ProviderStatus,
}

impl NewServiceProvider {
    pub fn validate(&self) -> Result<(), errors::ModelError> {
        validate_name(&self.name)?;
        if let Some(d) = &self.description { validate_description(d)?; }
        if let Some(e) = &self.email { validate_email(e)?; }
        if let Some(p) = &self.phone { validate_phone(p)?; }
        validate_rating(self.rating)
    }

    pub fn into_model(self, id: Uuid, now: DateTimeWithTimeZone) -> Model {
        Model {
            id,
            user_id: self.user_id,
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category,
            email: self.email.map(|e| e.trim().to_string()),
            phone: self.phone,
            address: self.address,
            rating: self.rating,
            status: self.status,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Clone, Debug, Default)]
pub struct ServiceProviderChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub status: Option<ProviderStatus>,
    pub is_verified: Option<bool>,
}

impl ServiceProviderChanges {
    pub fn validate(&self) -> Result<(), errors::ModelError> {
        if let Some(n) = &self.name { validate_name(n)?; }
        if let Some(d) = &self.description { validate_description(d)?; }
        if let Some(e) = &self.email { validate_email(e)?; }
        if let Some(p) = &self.phone { validate_phone(p)?; }
        if let Some(r) = self.rating { validate_rating(r)?; }
        Ok(())
    }

    pub fn apply_to(self, m: &mut Model, now: DateTimeWithTimeZone) {
        if let Some(v) = self.name { m.name = v.trim().to_string(); }
        if let Some(v) = self.description { m.description = Some(v); }
        if let Some(v) = self.category { m.category = Some(v); }
        if let Some(v) = self.email { m.email = Some(v.trim().to_string()); }
        if let Some(v) = self.phone { m.phone = Some(v); }
        if let Some(v) = self.address { m.address = Some(v); }
        if let Some(v) = self.rating { m.rating = v; }
        if let Some(v) = self.status { m.status = v; }
        if let Some(v) = self.is_verified { m.is_verified = v; }
        m.updated_at = now;
    }

    fn apply_to_active(self, am: &mut ActiveModel, now: DateTimeWithTimeZone) {
        if let Some(v) = self.name { am.name = Set(v.trim().to_string()); }
        if let Some(v) = self.description { am.description = Set(Some(v)); }
        if let Some(v) = self.category { am.category = Set(Some(v)); }
        if let Some(v) = self.email { am.email = Set(Some(v.trim().to_string())); }
        if let Some(v) = self.phone { am.phone = Set(Some(v)); }
        if let Some(v) = self.address { am.address = Set(Some(v)); }
        if let Some(v) = self.rating { am.rating = Set(v); }
        if let Some(v) = self.status { am.status = Set(v); }
        if let Some(v) = self.is_verified { am.is_verified = Set(v); }
        am.updated_at = Set(now);
    }
}

pub async fn create(db: &DatabaseConnection, input: NewServiceProvider) -> Result<Model, errors::ModelError> {
    input.validate()?;
    let m = input.into_model(Uuid::new_v4(), Utc::now().into());
    let am = ActiveModel {
        id: Set(m.id),
        user_id: Set(m.user_id),
        name: Set(m.name),
        description: Set(m.description),
        category: Set(m.category),
        email: Set(m.email),
        phone: Set(m.phone),
        address: Set(m.address),
        rating: Set(m.rating),
        status: Set(m.status),
        is_verified: Set(m.is_verified),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Apply changes to an existing row. `Ok(None)` when the row is gone.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    changes: ServiceProviderChanges,
) -> Result<Option<Model>, errors::ModelError> {
    changes.validate()?;
    let Some(existing) = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
    else {
        return Ok(None);
    };
    let mut am: ActiveModel = existing.into();
    changes.apply_to_active(&mut am, Utc::now().into());
    let updated = am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(Some(updated))
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
