//! PS/2 mouse protocol on top of the transport.

pub mod driver;
pub mod raw;
pub mod report;
