// Player valuation: fantasy points, CPU pick scoring, user recommendations.

pub mod cpu;
pub mod recommend;
pub mod scoring;
