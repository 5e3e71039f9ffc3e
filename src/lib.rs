//! OtaServe - Firmware OTA delivery and device log ingestion
//! Server library

pub mod server;
