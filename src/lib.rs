//! Cascading field picker over object reference chains
//!
//! `fieldpath` is the core of a drill-down field selector: a consumer
//! picks one field on an object type; when that field is a reference, a
//! nested instance of the same selector offers the fields of the
//! referenced object, building a path of picks such as
//! `AccountId.OwnerId.Email`.
//!
//! # Architecture
//!
//! - **Self-similar composition**: a [`FieldSelector`] owns zero or one
//!   nested `FieldSelector`. Context flows top-down, picks bubble up.
//! - **Catalog as one value**: the name→field map and the ordered
//!   display options are always built together in a [`FieldCatalog`], so
//!   the two can never fall out of sync.
//! - **Collaborators behind traits**: field metadata comes from a
//!   [`CatalogLoader`]; failures surface through an [`ErrorPresenter`].
//!   Rendering, transport, and metadata storage stay with the host.

pub mod catalog;
pub mod error;
pub mod loader;
pub mod presenter;
pub mod selector;
pub mod types;

pub use catalog::FieldCatalog;
pub use error::{LoaderError, Result};
pub use loader::{CatalogLoader, StaticCatalogLoader};
pub use presenter::{reduce_errors, ErrorPresenter, TracingPresenter};
pub use selector::{
    CatalogRequest, FieldPathSegment, FieldSelector, FieldSelectorBuilder, SelectorState,
};
pub use types::{Field, FieldKind, PickOption, SelectedField};
