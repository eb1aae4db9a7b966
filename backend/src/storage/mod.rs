//! # Storage Module
//!
//! Handles all data persistence for the studio data layer.
//!
//! The stores never talk to a concrete backend. They depend on the
//! [`KeyValueStorage`] port, reached through the [`Storage`] handle which adds
//! typed JSON access and per-key locking. Two backends ship today:
//!
//! - **MemoryStorage**: in-process map, used by tests and ephemeral sessions
//! - **FileStorage**: a single JSON snapshot on disk, written atomically
//!
//! A network-backed implementation can replace either one without touching the
//! domain layer, since the call signatures are already asynchronous.
//!
//! ## Key Layout
//!
//! ```text
//! auth_token            session token (raw string)
//! auth_user             current User
//! user_<userId>         User registry entry
//! schedule              Vec<ScheduleClass>
//! groups                Vec<Group>
//! attendances           Vec<Attendance>
//! children_<userId>     Vec<Child>
//! bookings_<userId>     Vec<ClassBooking>
//! payments_<userId>     Vec<Payment>
//! ```

pub mod file;
pub mod handle;
pub mod keys;
pub mod memory;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use file::FileStorage;
pub use handle::Storage;
pub use memory::MemoryStorage;
pub use traits::KeyValueStorage;
