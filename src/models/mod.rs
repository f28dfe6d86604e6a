pub mod actor;
pub mod custody;
pub mod destination;
pub mod document;
pub mod enums;
pub mod filters;
pub mod notification;
pub mod shipment;

pub use actor::Actor;
pub use custody::CustodyEntry;
pub use destination::Destination;
pub use document::{Document, NewDocument};
pub use notification::Notification;
pub use shipment::{AttachmentMeta, NewShipment, Shipment};
