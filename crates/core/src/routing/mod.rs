//! Route tables for the three application shells.
//!
//! A [`RouteTable`] is built from a [`Mode`](crate::tenant::Mode) and the
//! shop's under-construction flag, then used to resolve request paths:
//!
//! ```
//! use nepostore_core::routing::{Resolution, RouteTable, Screen};
//! use nepostore_core::tenant::Mode;
//!
//! let table = RouteTable::build(Mode::Shop, false, "https://app.nepostore.xyz");
//! let resolution = table.resolve("/product/42").unwrap();
//! assert_eq!(resolution.leaf(), Some(Screen::ProductDetail));
//! ```

mod pattern;
mod screen;
mod table;

pub use pattern::{PathPattern, RouteParams, Segment, WILDCARD_PARAM};
pub use screen::Screen;
pub use table::{Resolution, RouteError, RouteNode, RouteTable, RouteTarget};
