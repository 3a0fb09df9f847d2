// Database module
// LanceDB holds the per-run vector index over document chunks

pub mod lancedb;
