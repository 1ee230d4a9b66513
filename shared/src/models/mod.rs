//! Domain models for the Bloom platform

pub mod booking;
pub mod resource;
pub mod store;
pub mod subscription;
pub mod timeslot;
pub mod treatment;
pub mod user;

pub use booking::{Booking, BookingCreate, BookingStatus, BookingUpdate};
pub use resource::{Resource, ResourceCreate, ResourceType, ResourceUpdate};
pub use store::{DayHours, OperatingHours, Store, StoreCreate, StoreSettings, StoreUpdate};
pub use subscription::{
    SubscriptionCreate, SubscriptionHealth, SubscriptionUpdate, WebhookSubscription,
};
pub use timeslot::{Timeslot, intervals_overlap};
pub use treatment::{Price, RequiredLevel, Treatment, TreatmentCreate, TreatmentUpdate};
pub use user::{Role, SkillLevel, User};
