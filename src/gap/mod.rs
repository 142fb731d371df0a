//! Repricing and maturity gap analysis

mod buckets;
mod analysis;

pub use buckets::{get_bucket, BucketTable, NON_MATURITY, NON_SENSITIVE, SENTINEL_BOUND};
pub use analysis::{
    analyze_gaps, maturity_exposures, repricing_exposures, tabulate, BucketExposure, GapAnalysis, GapBucket,
    GapSide,
};
