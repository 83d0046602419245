use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct IndexSnapshot {
    pub schema_version: u32,
    pub state_count: usize,
    pub collision_buckets: usize,
    pub buckets: Vec<BucketSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketSnapshot {
    pub key: u64,
    pub handles: Vec<usize>,
}

impl IndexSnapshot {
    /// Render the snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
