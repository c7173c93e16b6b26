//! Client-side state owned by the running application.
//!
//! DESIGN
//! ======
//! State is constructed explicitly at startup and injected into whatever
//! needs it; nothing here is a module-level global.

pub mod identity;
