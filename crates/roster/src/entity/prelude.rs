//! Common re-exports for convenient entity usage.

pub use super::profile::{
    ActiveModel as ProfileActiveModel, Column as ProfileColumn, Entity as Profile,
    Model as ProfileModel,
};
