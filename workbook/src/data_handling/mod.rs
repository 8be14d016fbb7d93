pub mod annotation;
pub mod history;
pub mod predictor;
pub mod prev_positives;
pub mod qc;
pub mod ref_sources;
