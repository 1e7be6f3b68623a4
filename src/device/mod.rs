pub mod manager;

pub use manager::DeviceManager;

#[cfg(test)]
mod manager_test;
