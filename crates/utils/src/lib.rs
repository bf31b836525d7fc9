//! Message transformation and dispatch engine for the Kayako email
//! duplicator.
//!
//! One inbound email becomes N independently addressed copies, each with
//! a fresh `Message-ID`, a tagged `Subject`, a rewritten `To`, the
//! [`DUP_MARKER_HEADER`] sentinel, and no threading headers, so a
//! downstream ticketing system opens a distinct ticket per copy instead
//! of collapsing them into one.

pub mod config;
pub mod duplicator;
pub mod handler;
pub mod handlers;
pub mod ident;
pub mod message;
pub mod mime;
pub mod transformers;

pub use config::*;
pub use duplicator::*;
pub use handler::*;
pub use handlers::*;
pub use ident::*;
pub use message::*;
pub use mime::*;
pub use transformers::*;
