mod liveness;
mod upstream;

pub use liveness::LivenessCheck;
pub use upstream::UpstreamCheck;
