mod greedy;

pub(crate) use greedy::GreedyParser;
