pub mod event;
pub mod event_save;
pub mod user;

pub use event::{Category, Event, EventChanges, NewEvent};
pub use event_save::EventSave;
pub use user::{NewUser, User, UserProfile};
