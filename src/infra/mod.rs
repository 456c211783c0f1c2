// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that touches disk or network on behalf of the
// session:
//
//   artifact.rs     - Model artifact codec
//                     Manifest (config + shard list) plus Burn
//                     record bytes split into shards. Shared by
//                     both stores and by `train --export`.
//
//   local_store.rs  - The single locally saved model
//                     Save / load / remove / info under a fixed
//                     key inside the storage directory.
//
//   remote_store.rs - The hosted model
//                     HEAD check and HTTP(S) download through
//                     reqwest's blocking client.
//
//   metrics.rs      - Training metrics logging
//                     Per-epoch CSV rows for learning curves.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Records)

/// Model manifest and weight shards
pub mod artifact;

/// Locally persisted model
pub mod local_store;

/// Model published over HTTP
pub mod remote_store;

/// Training metrics CSV logger
pub mod metrics;
