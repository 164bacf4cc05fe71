//! End-to-end flows across provisioning, upload, navigation, and
//! reconciliation over an in-memory database and a temporary upload root.

mod archive_test;
mod helpers;
mod reconciliation_test;
