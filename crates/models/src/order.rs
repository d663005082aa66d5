use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| ModelError::invalid("order status", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            _ => Err(ModelError::invalid("payment status", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub product_id: u64,
    pub product_name: String,
    #[serde(default)]
    pub product_image: String,
    pub quantity: u32,
    pub price: u64,
    pub subtotal: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub order_number: String,
    pub user_id: u64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total_amount: u64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: u64,
    pub product_name: String,
    #[serde(default)]
    pub product_image: String,
    pub quantity: u32,
    pub price: u64,
}

/// Create/update payload. Line subtotals and the order total are computed, never supplied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInput {
    pub user_id: u64,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItemInput>,
    pub payment_method: String,
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
}

fn default_payment_status() -> PaymentStatus { PaymentStatus::Unpaid }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Entity for Order {
    type Id = u64;
    const KIND: &'static str = "order";

    fn id(&self) -> &u64 { &self.id }
}

impl OrderInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        crate::user::validate_name(&self.customer_name)?;
        crate::user::validate_email(&self.customer_email)?;
        if self.items.is_empty() {
            return Err(ModelError::Validation("order needs at least one item".into()));
        }
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err(ModelError::Validation("item quantity must be >= 1".into()));
        }
        if self.payment_method.trim().is_empty() {
            return Err(ModelError::Validation("payment method required".into()));
        }
        Ok(())
    }
}

/// `ORD-<year><seq>` with the sequence zero-padded to four digits.
pub fn order_number(year: i32, seq: u64) -> String {
    format!("ORD-{year}{seq:04}")
}

fn build_items(items: Vec<OrderItemInput>) -> (Vec<OrderItem>, u64) {
    let mut total = 0u64;
    let lines = items
        .into_iter()
        .enumerate()
        .map(|(idx, i)| {
            let subtotal = i.price.saturating_mul(u64::from(i.quantity));
            total = total.saturating_add(subtotal);
            OrderItem {
                id: idx as u64 + 1,
                product_id: i.product_id,
                product_name: i.product_name,
                product_image: i.product_image,
                quantity: i.quantity,
                price: i.price,
                subtotal,
            }
        })
        .collect();
    (lines, total)
}

impl Order {
    pub fn from_input(id: u64, input: OrderInput, now: DateTime<Utc>) -> Self {
        let (items, total_amount) = build_items(input.items);
        Self {
            id,
            order_number: order_number(now.year(), id),
            user_id: input.user_id,
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            customer_phone: input.customer_phone,
            shipping_address: input.shipping_address,
            items,
            status: OrderStatus::Pending,
            total_amount,
            payment_method: input.payment_method,
            payment_status: input.payment_status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace customer, items and payment data; status, number and creation time are kept.
    pub fn apply(&mut self, input: OrderInput, now: DateTime<Utc>) {
        let (items, total_amount) = build_items(input.items);
        self.user_id = input.user_id;
        self.customer_name = input.customer_name;
        self.customer_email = input.customer_email;
        self.customer_phone = input.customer_phone;
        self.shipping_address = input.shipping_address;
        self.items = items;
        self.total_amount = total_amount;
        self.payment_method = input.payment_method;
        self.payment_status = input.payment_status;
        self.updated_at = now;
    }

    pub fn set_status(&mut self, update: &OrderStatusUpdate, now: DateTime<Utc>) {
        self.status = update.status;
        self.updated_at = now;
    }
}
