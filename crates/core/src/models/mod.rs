//! API payloads and the forms that edit them.
//!
//! Every type here mirrors a JSON document of the backend API. Ids arrive
//! as `_id` (Mongo style) or `id`; both are accepted.

pub mod category;
pub mod customer;
pub mod order;
pub mod page;
pub mod platform;
pub mod product;
pub mod settings;
pub mod theme;
pub mod user;
mod validation;

pub use category::{Category, CategoryInput};
pub use customer::Customer;
pub use order::{NewOrder, Order, OrderCustomer, OrderItem, StatusUpdate};
pub use page::{
    MoveDirection, Page, PageEditError, PageInput, PageSection, RESERVED_SLUGS, SectionKind,
};
pub use platform::TenantSummary;
pub use product::{MAX_PRODUCT_IMAGES, Product, ProductInput, slugify};
pub use settings::{
    FooterColumn, FooterSettings, NavLink, NavbarSettings, SettingsTab, SocialLinks,
    StoreSettings,
};
pub use theme::{Theme, active_theme};
pub use user::{CurrentUser, StoreUser, UserInput};
pub use validation::ValidationError;
