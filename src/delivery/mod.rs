//! Delivery packaging: assembles all build artifacts on disk.

pub mod packager;

pub use packager::{package_delivery, BuildArtifacts, DeliveryPack};
