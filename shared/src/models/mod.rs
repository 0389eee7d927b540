//! Domain models

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartItem, CartItemRequest, CartLine};
pub use order::{
    Order, OrderItem, OrderStatus, OrderSummary, OrderWithItems, PlaceOrderRequest,
    PlaceOrderResponse, UnknownOrderStatus, UpdateOrderStatusRequest,
};
pub use product::{Product, ProductInput};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserProfile};
