use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Users

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserEntity {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    pub is_ristoratore: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct CreateUserEntity {
    pub username: String,
    pub password_hash: String,
}

// Products

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductEntity {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub image_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Coupons

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CouponEntity {
    pub id: i32,
    pub user_id: i32,
    pub code: String,
    pub discount: i32,
    pub description: String,
    pub is_active: bool,
    pub is_revealed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::coupons)]
pub struct CreateCouponEntity {
    pub user_id: i32,
    pub code: String,
    pub discount: i32,
    pub description: String,
}

// Carts

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartEntity {
    pub id: i32,
    pub user_id: i32,
    pub coupon_id: Option<i32>,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::carts)]
pub struct CreateCartEntity {
    pub user_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemEntity {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct CreateCartItemEntity {
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

// Fast foods

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::fast_foods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FastFoodEntity {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub user_id: i32,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub items: String,
    pub status: String,
    pub order_type: String,
    pub fast_food_id: Option<i32>,
    pub delivery_address: Option<String>,
    pub delivery_city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
pub struct CreateOrderEntity {
    pub user_id: i32,
    pub total_price: Decimal,
    pub items: String,
    pub status: String,
    pub order_type: String,
    pub fast_food_id: Option<i32>,
    pub delivery_address: Option<String>,
    pub delivery_city: Option<String>,
}

/// Order workflow states. Stored as text; any state may replace any other,
/// the set itself is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    OrdineRicevuto,
    InPreparazione,
    InConsegna,
    Consegnato,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::OrdineRicevuto,
        OrderStatus::InPreparazione,
        OrderStatus::InConsegna,
        OrderStatus::Consegnato,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrdineRicevuto => "ORDINE RICEVUTO",
            OrderStatus::InPreparazione => "IN PREPARAZIONE",
            OrderStatus::InConsegna => "IN CONSEGNA",
            OrderStatus::Consegnato => "CONSEGNATO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// How an order reaches the customer: courier delivery or on-site pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Delivery,
    InLoco,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Delivery => "DELIVERY",
            OrderType::InLoco => "IN LOCO",
        }
    }

    /// Parses the lowercase value submitted by order forms.
    pub fn parse_form_value(value: &str) -> Option<Self> {
        match value {
            "delivery" => Some(OrderType::Delivery),
            "in_loco" => Some(OrderType::InLoco),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn order_status_rejects_unknown_values() {
        assert_eq!(OrderStatus::parse("SPEDITO"), None);
        assert_eq!(OrderStatus::parse("ordine ricevuto"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn order_type_parses_form_values() {
        assert_eq!(
            OrderType::parse_form_value("delivery"),
            Some(OrderType::Delivery)
        );
        assert_eq!(
            OrderType::parse_form_value("in_loco"),
            Some(OrderType::InLoco)
        );
        assert_eq!(OrderType::parse_form_value("asporto"), None);
    }

    #[test]
    fn order_type_stores_canonical_values() {
        assert_eq!(OrderType::Delivery.as_str(), "DELIVERY");
        assert_eq!(OrderType::InLoco.as_str(), "IN LOCO");
    }
}
