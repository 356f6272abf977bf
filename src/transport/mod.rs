//! PS/2 bit and byte transport.

pub mod driver;
pub mod io;
pub mod raw;
