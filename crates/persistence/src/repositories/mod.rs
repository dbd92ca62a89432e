//! Repository implementations for database operations.

pub mod device;

pub use device::DeviceRepository;
