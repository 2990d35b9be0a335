pub mod json_documents;
pub mod sparse_tree;
