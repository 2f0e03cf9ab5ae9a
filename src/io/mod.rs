pub mod fasta;
pub mod genbank;
pub mod genome;
pub mod query_table;
pub mod regions;
pub mod report;

pub use genome::Genome;
pub use query_table::Query;
