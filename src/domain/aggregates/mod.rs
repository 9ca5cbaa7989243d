//! Aggregates module
pub mod address_book;
pub mod cart;
pub mod favorites;
pub mod order;
pub mod product;
pub mod stock_history;
pub mod user;

pub use address_book::{Address, AddressBook, AddressBookError};
pub use cart::{Cart, CartError, CartItem, CartTotals, LineKey};
pub use favorites::Favorites;
pub use order::{NewOrder, Order, OrderError, OrderStatus};
pub use product::{Product, ProductForm, DEFAULT_MINIMUM_STOCK};
pub use stock_history::{StockChange, StockHistory, STOCK_HISTORY_CAPACITY};
pub use user::{Session, User};
