pub mod promotion_graph;

pub use promotion_graph::PromotionGraph;
