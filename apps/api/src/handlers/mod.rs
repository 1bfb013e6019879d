pub mod access;
pub mod health;
pub mod permission_requests;
pub mod records;
pub mod recycle_bin;
pub mod users;

/// Optional reason supplied when moving something to the recycle bin.
#[derive(Debug, Default, serde::Deserialize)]
pub struct DeleteQuery {
    pub reason: Option<String>,
}
