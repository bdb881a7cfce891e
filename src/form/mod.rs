//! Schema-driven form engine
//!
//! A form is described by a [`FormDefinition`]: a tree of [`FieldSchema`]
//! nodes plus an optional environment → market selection block whose
//! dependent fields are seeded from a [`ConfigurationMap`]. A [`FormSession`]
//! owns the values of one open form, [`render`] projects them into a
//! descriptor tree and the [`SubmissionDispatcher`] routes the result to a
//! record store.

pub mod cascade;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod list;
pub mod path;
pub mod render;
pub mod schema;
pub mod seed;
pub mod session;
pub mod state;
pub mod validate;

pub use cascade::{CascadingResolver, ConfigurationMap, MarketDetails, SelectOption};
pub use definition::{CascadeSpec, FormDefinition};
pub use dispatch::{FailureReason, SubmissionDispatcher, SubmitOutcome};
pub use error::FormError;
pub use handle::SharedForm;
pub use list::{ItemId, ListStatus};
pub use path::PropertyPath;
pub use render::RenderNode;
pub use schema::{FieldKind, FieldSchema, SchemaError};
pub use session::{FormSession, SubmissionPayload};
pub use state::FormState;
pub use validate::{FieldIssue, RequiredFields, Validator};
