// ============================================================
// Layer 5 — Clustering and Scoring
// ============================================================
// The evaluation collaborators, behind the domain traits:
//
//   kmeans.rs  — KMeans (Partitioner): matrix + cluster count
//                → one label per row, deterministic per seed
//
//   scores.rs  — NormalizedMutualInfo, ClusteringAccuracy
//                (AgreementScorer): two labelings → [0, 1]
//
// Plain Rust on FeatureMatrix; nothing here touches Burn.

/// Seeded k-means++ / Lloyd partitioner
pub mod kmeans;

/// NMI and Hungarian-matched clustering accuracy
pub mod scores;
