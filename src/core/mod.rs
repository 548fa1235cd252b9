pub mod avatar;
pub mod dom;
pub mod events;
pub mod fallback;
pub mod filter;
pub mod markup;
pub mod page;
pub mod photos;
pub mod renderer;
pub mod reveal;
pub mod site;

pub use crate::domain::model::{Cohort, CohortYear, LinkKind, Links, Person, RosterDocument};
pub use crate::domain::ports::{ConfigProvider, ImageProbe, ImageStatus, RosterSource, Storage};
pub use crate::utils::error::Result;
