//! Records and the values they hold.

pub mod blueprint;
pub mod handle;
pub mod names;
#[allow(clippy::module_inception)]
pub mod record;
pub mod value;

pub use blueprint::Blueprint;
pub use handle::Handle;
pub use record::Record;
pub use value::FieldValue;
